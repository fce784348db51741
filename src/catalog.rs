//! Item catalog: the immutable table of merge tiers.
//!
//! Every droppable item is one of `N` tiers.  Two touching items of the same
//! tier fuse into the next one; the last tier has no successor.  The table is
//! built once at startup, validated, and stored as the [`ItemCatalog`]
//! resource.  Nothing mutates it afterwards.
//!
//! | Tier | Name       | Radius | Score |
//! |------|------------|--------|-------|
//! | 0    | PinkBow    | 22     | 2     |
//! | 1    | Cherry     | 26     | 4     |
//! | 2    | Orange     | 32     | 8     |
//! | 3    | Lemon      | 38     | 16    |
//! | 4    | Kiwi       | 46     | 32    |
//! | 5    | Tomato     | 56     | 64    |
//! | 6    | Peach      | 68     | 128   |
//! | 7    | Pineapple  | 82     | 256   |
//! | 8    | Coconut    | 98     | 512   |
//! | 9    | Watermelon | 115    | 1024  |

use crate::error::{GameError, GameResult};
use bevy::prelude::*;
use rand::Rng;

/// One row of the catalog.
#[derive(Debug, Clone)]
pub struct ItemTier {
    /// Position in the merge progression (0 = smallest).
    pub tier: u8,
    pub name: &'static str,
    /// Physics collider radius (world units).
    pub radius: f32,
    /// Flat fill colour; also used for merge sparks and the fallback face.
    pub color: Color,
    /// Points awarded when two items of this tier are consumed by a merge.
    pub score: u32,
    /// Optional image asset path, relative to `assets/`.
    pub image: Option<&'static str>,
    /// Physics radius divided by visual radius, in `(0, 1]`.
    ///
    /// Images of irregular shapes are drawn larger than their collider so
    /// contacts happen at the visible edge rather than the bounding circle.
    pub hitbox_ratio: f32,
    /// Short label drawn on the fallback face.
    pub glyph: &'static str,
}

impl ItemTier {
    /// Radius at which the item is drawn when its image is available.
    #[inline]
    pub fn visual_radius(&self) -> f32 {
        self.radius / self.hitbox_ratio
    }
}

/// Validated tier table.
#[derive(Resource, Debug, Clone)]
pub struct ItemCatalog {
    tiers: Vec<ItemTier>,
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
        }
    }
}

impl ItemCatalog {
    /// Build a catalog from `tiers`, rejecting any table [`Self::validate`]
    /// refuses.
    pub fn new(tiers: Vec<ItemTier>) -> GameResult<Self> {
        let catalog = Self { tiers };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check that tiers are numbered `0..N` in order, that every entry has
    /// usable geometry, and that radii never shrink from one tier to the next.
    pub fn validate(&self) -> GameResult<()> {
        if self.tiers.is_empty() {
            return Err(GameError::EmptyCatalog);
        }
        let mut previous: Option<&ItemTier> = None;
        for (index, entry) in self.tiers.iter().enumerate() {
            if entry.tier as usize != index {
                return Err(GameError::CatalogOrder {
                    index,
                    tier: entry.tier,
                });
            }
            let ratio_ok = entry.hitbox_ratio > 0.0 && entry.hitbox_ratio <= 1.0;
            if entry.radius <= 0.0 || !ratio_ok {
                return Err(GameError::InvalidTierGeometry {
                    tier: entry.tier,
                    radius: entry.radius,
                    hitbox_ratio: entry.hitbox_ratio,
                });
            }
            if let Some(prev) = previous.filter(|p| entry.radius < p.radius) {
                return Err(GameError::ShrinkingTier {
                    tier: entry.tier,
                    radius: entry.radius,
                    previous: prev.radius,
                });
            }
            previous = Some(entry);
        }
        Ok(())
    }

    /// Number of tiers (`N`).
    #[inline]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Look up a tier; `None` for out-of-range references.
    #[inline]
    pub fn get(&self, tier: u8) -> Option<&ItemTier> {
        self.tiers.get(tier as usize)
    }

    /// Tier produced by fusing two items of `tier`, or `None` at the top of
    /// the progression (and for unknown tiers).
    #[inline]
    pub fn successor(&self, tier: u8) -> Option<u8> {
        let next = tier as usize + 1;
        (next < self.tiers.len()).then_some(next as u8)
    }

    /// Visual radius of `tier`, or `0.0` for unknown tiers.
    #[inline]
    pub fn visual_radius(&self, tier: u8) -> f32 {
        self.get(tier).map_or(0.0, ItemTier::visual_radius)
    }

    /// Roll a tier uniformly from the lowest `pool` tiers.
    ///
    /// `pool` is clamped to `1..=N` so a misconfigured pool can never produce
    /// an out-of-range tier.
    pub fn roll_starting_tier<R: Rng + ?Sized>(&self, pool: u8, rng: &mut R) -> u8 {
        let upper = (pool as usize).clamp(1, self.tiers.len());
        rng.gen_range(0..upper) as u8
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemTier> {
        self.tiers.iter()
    }
}

/// Startup check of the installed catalog.
pub fn check_item_catalog(catalog: Res<ItemCatalog>) {
    match catalog.validate() {
        Ok(()) => info!("Item catalog: {} tiers", catalog.len()),
        Err(e) => warn!("Item catalog failed validation: {e}"),
    }
}

fn hex(rgb: u32) -> Color {
    Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// The shipped ten-tier progression.
pub fn default_tiers() -> Vec<ItemTier> {
    // (name, radius, colour, hitbox ratio, glyph)
    let rows: [(&'static str, f32, u32, f32, &'static str); 10] = [
        ("PinkBow", 22.0, 0xEC4899, 0.75, "Bw"),
        ("Cherry", 26.0, 0xDC2626, 0.85, "Ch"),
        ("Orange", 32.0, 0xEA580C, 0.90, "Or"),
        ("Lemon", 38.0, 0xFACC15, 0.85, "Le"),
        ("Kiwi", 46.0, 0x65A30D, 0.90, "Ki"),
        ("Tomato", 56.0, 0xE11D48, 0.90, "To"),
        ("Peach", 68.0, 0xF472B6, 0.90, "Pe"),
        ("Pineapple", 82.0, 0xF59E0B, 0.85, "Pi"),
        ("Coconut", 98.0, 0x78350F, 0.90, "Co"),
        ("Watermelon", 115.0, 0x10B981, 0.90, "Wm"),
    ];
    const IMAGES: [&str; 10] = [
        "items/00.png",
        "items/01.png",
        "items/02.png",
        "items/03.png",
        "items/04.png",
        "items/05.png",
        "items/06.png",
        "items/07.png",
        "items/08.png",
        "items/09.png",
    ];

    rows.iter()
        .zip(IMAGES)
        .enumerate()
        .map(|(i, (&(name, radius, rgb, hitbox_ratio, glyph), image))| ItemTier {
            tier: i as u8,
            name,
            radius,
            color: hex(rgb),
            // Score doubles every tier, starting at 2.
            score: 2 << i,
            image: Some(image),
            hitbox_ratio,
            glyph,
        })
        .collect()
}
