//! Drawing: item faces, the aimed preview, dashed lines and the HUD.
//!
//! Physics entities never carry visuals of their own.  Every item gets child
//! "face" entities instead, because a scaled `Transform` on the item itself
//! would also scale its collider.
//!
//! ## Faces
//!
//! Each tier is drawn either with its image (sized to the visual radius) or,
//! while the image is loading or after it failed, as a flat disc in the tier
//! colour at the physics radius with a short glyph on top.  [`ItemArt`]
//! tracks per-tier load state; faces are rebuilt once an image resolves.
//!
//! | System                     | Schedule | Purpose                                   |
//! |----------------------------|----------|-------------------------------------------|
//! | `track_item_art_system`    | Update   | Poll image load states, warn on failures  |
//! | `attach_item_face_system`  | Update   | Give new items (and resolved art) a face  |
//! | `sync_preview_system`      | Update   | Position / rebuild / show the ghost       |
//! | `guide_gizmo_system`       | Update   | Dashed deadline and drop guide            |
//! | `hud_system`               | Update   | Score, best and next-tier indicator       |

use crate::arena::Item;
use crate::best_score::BestScore;
use crate::catalog::ItemCatalog;
use crate::config::GameConfig;
use crate::particles::circle_mesh;
use crate::session::GameSession;
use bevy::asset::LoadState;
use bevy::prelude::*;

// ── Resources ────────────────────────────────────────────────────────────────

/// Shared meshes and materials for fallback faces.
#[derive(Resource)]
pub struct ItemPalette {
    /// Unit-radius disc, scaled per face.
    pub disc: Handle<Mesh>,
    /// One opaque material per tier.
    pub solid: Vec<Handle<ColorMaterial>>,
    /// One translucent material per tier for the preview ghost.
    pub ghost: Vec<Handle<ColorMaterial>>,
}

/// Load progress of a tier's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtStatus {
    Loading,
    Ready,
    /// Missing or undecodable; the fallback face is used for good.
    Failed,
    /// The tier has no image configured.
    Absent,
}

#[derive(Resource, Debug, Default)]
pub struct ItemArt {
    pub images: Vec<Option<Handle<Image>>>,
    pub status: Vec<ArtStatus>,
}

impl ItemArt {
    /// Image handle for `tier` if (and only if) it finished loading.
    pub fn ready_image(&self, tier: u8) -> Option<&Handle<Image>> {
        let i = tier as usize;
        match self.status.get(i) {
            Some(ArtStatus::Ready) => self.images.get(i).and_then(Option::as_ref),
            _ => None,
        }
    }

    /// Record a resolved load.  Returns `true` when the status actually
    /// changed, so callers warn about a failure once only.
    pub fn resolve(&mut self, tier: u8, loaded: bool) -> bool {
        let Some(status) = self.status.get_mut(tier as usize) else {
            return false;
        };
        if *status != ArtStatus::Loading {
            return false;
        }
        *status = if loaded {
            ArtStatus::Ready
        } else {
            ArtStatus::Failed
        };
        true
    }

    pub fn all_resolved(&self) -> bool {
        !self.status.contains(&ArtStatus::Loading)
    }
}

// ── Components ───────────────────────────────────────────────────────────────

/// On an item or the preview: how its current face children were built.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemFace {
    pub tier: u8,
    pub textured: bool,
}

/// Child entity that is part of a face; despawned on rebuild.
#[derive(Component)]
pub struct FacePart;

/// The ghost drawn at the drop site while aiming.
#[derive(Component)]
pub struct PreviewItem;

#[derive(Component)]
pub struct HudScoreText;

#[derive(Component)]
pub struct HudBestText;

/// Root of the "NEXT" indicator.
#[derive(Component)]
pub struct NextIndicator;

/// Coloured swatch inside the "NEXT" indicator.
#[derive(Component)]
pub struct NextSwatch;

// ── Plugin ───────────────────────────────────────────────────────────────────

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (setup_item_palette, load_item_art, setup_preview, setup_hud)
                .chain()
                .after(crate::config::load_game_config),
        )
        .add_systems(
            Update,
            (
                track_item_art_system,
                attach_item_face_system,
                sync_preview_system,
                guide_gizmo_system,
                hud_system,
            )
                .chain(),
        );
    }
}

// ── Startup ──────────────────────────────────────────────────────────────────

fn setup_item_palette(
    mut commands: Commands,
    catalog: Res<ItemCatalog>,
    config: Res<GameConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let disc = meshes.add(circle_mesh(1.0, 48));
    let solid = catalog
        .iter()
        .map(|t| materials.add(ColorMaterial::from_color(t.color)))
        .collect();
    let ghost = catalog
        .iter()
        .map(|t| materials.add(ColorMaterial::from_color(t.color.with_alpha(config.preview_alpha))))
        .collect();
    commands.insert_resource(ItemPalette { disc, solid, ghost });
}

fn load_item_art(mut commands: Commands, catalog: Res<ItemCatalog>, asset_server: Res<AssetServer>) {
    let mut art = ItemArt::default();
    for tier in catalog.iter() {
        match tier.image {
            Some(path) => {
                art.images.push(Some(asset_server.load(path)));
                art.status.push(ArtStatus::Loading);
            }
            None => {
                art.images.push(None);
                art.status.push(ArtStatus::Absent);
            }
        }
    }
    info!("Requested {} item images", art.images.iter().flatten().count());
    commands.insert_resource(art);
}

fn setup_preview(mut commands: Commands, config: Res<GameConfig>) {
    commands.spawn((
        PreviewItem,
        Transform::from_xyz(config.arena_width * 0.5, config.spawn_y(), 2.0),
        Visibility::Hidden,
    ));
}

/// Spawn the HUD: best and score at the top left, next tier at the top right.
fn setup_hud(mut commands: Commands, config: Res<GameConfig>) {
    let label = |text: &str| {
        (
            Text::new(text),
            TextFont {
                font_size: config.hud_font_size * 0.55,
                ..default()
            },
            TextColor(Color::srgb_u8(0xF4, 0x72, 0xB6)),
        )
    };
    let value = || {
        (
            Text::new("0"),
            TextFont {
                font_size: config.hud_font_size,
                ..default()
            },
            TextColor(Color::srgb_u8(0x33, 0x41, 0x55)),
        )
    };

    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            column_gap: Val::Px(16.0),
            ..default()
        })
        .with_children(|hud| {
            hud.spawn(Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                ..default()
            })
            .with_children(|col| {
                col.spawn(label("BEST"));
                col.spawn((value(), HudBestText));
            });
            hud.spawn(Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                ..default()
            })
            .with_children(|col| {
                col.spawn(label("SCORE"));
                col.spawn((value(), HudScoreText));
            });
        });

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(10.0),
                top: Val::Px(10.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(4.0),
                ..default()
            },
            Visibility::Hidden,
            NextIndicator,
        ))
        .with_children(|next| {
            next.spawn(label("NEXT"));
            next.spawn((
                Node {
                    width: Val::Px(40.0),
                    height: Val::Px(40.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(Color::WHITE),
                BorderColor::all(Color::srgb_u8(0xFB, 0xCF, 0xE8)),
                NextSwatch,
            ))
            .with_children(|swatch| {
                swatch.spawn((
                    Text::new(""),
                    TextFont {
                        font_size: 16.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            });
        });
}

// ── Faces ────────────────────────────────────────────────────────────────────

/// Spawn the face children of `parent` for `tier`.
///
/// Textured faces are drawn at the visual radius; fallback discs at the
/// physics radius, matching where the collider actually is.
#[allow(clippy::too_many_arguments)]
fn spawn_face(
    commands: &mut Commands,
    parent: Entity,
    tier: u8,
    ghost: bool,
    catalog: &ItemCatalog,
    palette: &ItemPalette,
    art: &ItemArt,
    alpha: f32,
) -> Option<ItemFace> {
    let def = catalog.get(tier)?;
    let image = art.ready_image(tier).cloned();
    let textured = image.is_some();

    commands.entity(parent).with_children(|p| {
        if let Some(image) = image {
            let size = Vec2::splat(def.visual_radius() * 2.0);
            p.spawn((
                FacePart,
                Sprite {
                    image,
                    custom_size: Some(size),
                    color: Color::WHITE.with_alpha(alpha),
                    ..default()
                },
            ));
            return;
        }
        let materials = if ghost { &palette.ghost } else { &palette.solid };
        if let Some(material) = materials.get(tier as usize) {
            p.spawn((
                FacePart,
                Mesh2d(palette.disc.clone()),
                MeshMaterial2d(material.clone()),
                Transform::from_scale(Vec3::new(def.radius, def.radius, 1.0)),
            ));
        }
        p.spawn((
            FacePart,
            Text2d::new(def.glyph),
            TextFont {
                font_size: def.radius * 0.8,
                ..default()
            },
            TextColor(Color::WHITE.with_alpha(alpha)),
            Transform::from_xyz(0.0, 0.0, 0.1),
        ));
    });

    Some(ItemFace { tier, textured })
}

fn clear_face(commands: &mut Commands, children: Option<&Children>, q_parts: &Query<(), With<FacePart>>) {
    for child in children.into_iter().flat_map(|c| c.iter()) {
        if q_parts.contains(child) {
            commands.entity(child).despawn();
        }
    }
}

pub fn track_item_art_system(
    mut art: ResMut<ItemArt>,
    asset_server: Res<AssetServer>,
    catalog: Res<ItemCatalog>,
) {
    if art.all_resolved() {
        return;
    }
    for tier in 0..art.images.len() {
        if art.status[tier] != ArtStatus::Loading {
            continue;
        }
        let Some(id) = art.images[tier].as_ref().map(Handle::id) else {
            continue;
        };
        match asset_server.load_state(id) {
            LoadState::Loaded => {
                art.resolve(tier as u8, true);
                debug!("Image for tier {tier} ready");
            }
            LoadState::Failed(err) => {
                art.resolve(tier as u8, false);
                let name = catalog.get(tier as u8).map_or("?", |t| t.name);
                warn!("Image for {name} failed to load ({err}); using the fallback face");
            }
            _ => {}
        }
    }
}

/// Give new items a face, and rebuild fallback faces whose image just became
/// ready.
#[allow(clippy::type_complexity)]
pub fn attach_item_face_system(
    mut commands: Commands,
    catalog: Res<ItemCatalog>,
    palette: Res<ItemPalette>,
    art: Res<ItemArt>,
    q_new: Query<(Entity, &Item), Without<ItemFace>>,
    q_faced: Query<(Entity, &ItemFace, Option<&Children>), With<Item>>,
    q_parts: Query<(), With<FacePart>>,
) {
    for (entity, item) in q_new.iter() {
        if let Some(face) = spawn_face(&mut commands, entity, item.tier, false, &catalog, &palette, &art, 1.0) {
            commands.entity(entity).insert(face);
        }
    }

    if !art.is_changed() {
        return;
    }
    for (entity, face, children) in q_faced.iter() {
        if face.textured || art.ready_image(face.tier).is_none() {
            continue;
        }
        clear_face(&mut commands, children, &q_parts);
        if let Some(face) = spawn_face(&mut commands, entity, face.tier, false, &catalog, &palette, &art, 1.0) {
            commands.entity(entity).insert(face);
        }
    }
}

/// Show the ghost at the clamped drop site while a drop is possible and
/// rebuild it when the current tier (or its art) changes.
#[allow(clippy::too_many_arguments)]
pub fn sync_preview_system(
    mut commands: Commands,
    session: Res<GameSession>,
    config: Res<GameConfig>,
    catalog: Res<ItemCatalog>,
    palette: Res<ItemPalette>,
    art: Res<ItemArt>,
    mut q_preview: Query<
        (Entity, &mut Transform, &mut Visibility, Option<&ItemFace>, Option<&Children>),
        With<PreviewItem>,
    >,
    q_parts: Query<(), With<FacePart>>,
) {
    let Ok((entity, mut transform, mut visibility, face, children)) = q_preview.single_mut() else {
        return;
    };

    *visibility = if session.can_drop() {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    transform.translation.x = session.preview_x;
    transform.translation.y = config.spawn_y();

    let wanted_textured = art.ready_image(session.current_tier).is_some();
    let stale = face.is_none_or(|f| f.tier != session.current_tier || f.textured != wanted_textured);
    if !stale {
        return;
    }
    clear_face(&mut commands, children, &q_parts);
    if let Some(face) = spawn_face(
        &mut commands,
        entity,
        session.current_tier,
        true,
        &catalog,
        &palette,
        &art,
        config.preview_alpha,
    ) {
        commands.entity(entity).insert(face);
    }
}

// ── Lines ────────────────────────────────────────────────────────────────────

/// Split `from → to` into `dash`-long segments separated by `gap`.
pub fn dash_segments(from: Vec2, to: Vec2, dash: f32, gap: f32) -> Vec<(Vec2, Vec2)> {
    let length = from.distance(to);
    if length <= 0.0 || dash <= 0.0 {
        return Vec::new();
    }
    let dir = (to - from) / length;
    let step = dash + gap.max(0.0);
    let mut segments = Vec::new();
    let mut t = 0.0;
    while t < length {
        let end = (t + dash).min(length);
        segments.push((from + dir * t, from + dir * end));
        t += step;
    }
    segments
}

/// Dashed deadline across the arena, and a dashed guide from the preview down
/// to the floor while aiming.
pub fn guide_gizmo_system(
    mut gizmos: Gizmos,
    session: Res<GameSession>,
    config: Res<GameConfig>,
    catalog: Res<ItemCatalog>,
) {
    let y = config.deadline_y();
    let deadline = Color::srgb_u8(0xFF, 0x8A, 0x80);
    for (a, b) in dash_segments(Vec2::new(0.0, y), Vec2::new(config.arena_width, y), 10.0, 10.0) {
        gizmos.line_2d(a, b, deadline);
    }

    if !session.can_drop() {
        return;
    }
    let x = session.preview_x;
    let top = config.spawn_y() - catalog.visual_radius(session.current_tier);
    let guide = Color::srgba(1.0, 1.0, 1.0, 0.5);
    for (a, b) in dash_segments(Vec2::new(x, top), Vec2::new(x, 0.0), 5.0, 5.0) {
        gizmos.line_2d(a, b, guide);
    }
}

// ── HUD ──────────────────────────────────────────────────────────────────────

#[allow(clippy::type_complexity)]
pub fn hud_system(
    session: Res<GameSession>,
    best: Res<BestScore>,
    catalog: Res<ItemCatalog>,
    mut q_score: Query<&mut Text, (With<HudScoreText>, Without<HudBestText>)>,
    mut q_best: Query<&mut Text, (With<HudBestText>, Without<HudScoreText>)>,
    mut q_next: Query<&mut Visibility, With<NextIndicator>>,
    mut q_swatch: Query<(&mut BackgroundColor, &Children), With<NextSwatch>>,
    mut q_glyph: Query<&mut Text, (Without<HudScoreText>, Without<HudBestText>)>,
) {
    if session.is_changed() {
        for mut text in q_score.iter_mut() {
            *text = Text::new(session.score.to_string());
        }
        for mut visibility in q_next.iter_mut() {
            *visibility = if session.is_playing {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
        if let Some(next) = catalog.get(session.next_tier) {
            for (mut bg, children) in q_swatch.iter_mut() {
                *bg = BackgroundColor(next.color);
                for child in children.iter() {
                    if let Ok(mut text) = q_glyph.get_mut(child) {
                        *text = Text::new(next.glyph);
                    }
                }
            }
        }
    }
    if best.is_changed() {
        for mut text in q_best.iter_mut() {
            *text = Text::new(best.0.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art_with(status: Vec<ArtStatus>) -> ItemArt {
        ItemArt {
            images: status.iter().map(|_| Some(Handle::default())).collect(),
            status,
        }
    }

    #[test]
    fn failure_is_reported_once() {
        let mut art = art_with(vec![ArtStatus::Loading, ArtStatus::Loading]);
        assert!(art.resolve(0, false));
        assert!(!art.resolve(0, false));
        assert!(!art.resolve(0, true), "a failed tier stays on the fallback");
        assert_eq!(art.status[0], ArtStatus::Failed);
        assert!(!art.all_resolved());
        assert!(art.resolve(1, true));
        assert!(art.all_resolved());
    }

    #[test]
    fn only_ready_tiers_expose_an_image() {
        let art = art_with(vec![ArtStatus::Ready, ArtStatus::Failed, ArtStatus::Loading]);
        assert!(art.ready_image(0).is_some());
        assert!(art.ready_image(1).is_none());
        assert!(art.ready_image(2).is_none());
        assert!(art.ready_image(9).is_none());
    }

    #[test]
    fn dashes_cover_the_line_without_overshoot() {
        let segments = dash_segments(Vec2::ZERO, Vec2::new(100.0, 0.0), 10.0, 10.0);
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], (Vec2::ZERO, Vec2::new(10.0, 0.0)));
        assert!(segments.iter().all(|(a, b)| b.x <= 100.0 && a.x < b.x));
    }

    #[test]
    fn short_tail_is_clipped() {
        let segments = dash_segments(Vec2::new(0.0, 30.0), Vec2::ZERO, 5.0, 5.0);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].1, Vec2::ZERO);
    }

    #[test]
    fn degenerate_lines_produce_nothing() {
        assert!(dash_segments(Vec2::ONE, Vec2::ONE, 5.0, 5.0).is_empty());
        assert!(dash_segments(Vec2::ZERO, Vec2::X, 0.0, 5.0).is_empty());
    }
}
