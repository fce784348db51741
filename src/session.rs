//! Per-session game state and the drop/turn state machine.
//!
//! [`GameSession`] is the single mutable aggregate for one play-through.  It
//! is replaced wholesale by [`GameSession::start`] on every (re)start, so no
//! field ever leaks from a finished game into the next one.
//!
//! ## Turn phases
//!
//! ```text
//!  Idle ──start──▶ Aiming ──try_drop──▶ Cooldown(t) ──tick(t ≤ 0)──▶ Aiming
//!                    ▲                                     │
//!                    └──────────── current ← next, roll next
//! ```
//!
//! The "dropping" step happens between [`GameSession::try_drop`] returning a
//! [`DropRequest`] and the caller inserting the body; the session has already
//! moved to `Cooldown` by then, so a second release in the same frame is
//! rejected.  Game over forces the phase back to `Idle`.

use crate::catalog::ItemCatalog;
use crate::config::GameConfig;
use bevy::prelude::*;
use rand::Rng;

/// Where the turn state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TurnPhase {
    /// No session running (title screen or after game over).
    #[default]
    Idle,
    /// Preview follows the pointer; a release drops the current item.
    Aiming,
    /// Seconds left before the next drop is accepted.
    Cooldown(f32),
}

/// What the caller must insert after a successful [`GameSession::try_drop`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropRequest {
    pub tier: u8,
    pub x: f32,
}

/// Score, current/next piece and play state for one session.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameSession {
    pub score: u32,
    pub current_tier: u8,
    pub next_tier: u8,
    pub phase: TurnPhase,
    /// Horizontal position of the aimed preview, always clamped.
    pub preview_x: f32,
    pub is_playing: bool,
    pub is_game_over: bool,
}

impl Default for GameSession {
    /// An idle session: nothing playing, nothing to drop.
    fn default() -> Self {
        Self {
            score: 0,
            current_tier: 0,
            next_tier: 0,
            phase: TurnPhase::Idle,
            preview_x: crate::constants::ARENA_WIDTH * 0.5,
            is_playing: false,
            is_game_over: false,
        }
    }
}

impl GameSession {
    /// Fresh playing session with randomized current/next tiers drawn from
    /// the lowest `starting_tier_pool` tiers and the preview centred.
    pub fn start<R: Rng + ?Sized>(catalog: &ItemCatalog, config: &GameConfig, rng: &mut R) -> Self {
        let current_tier = catalog.roll_starting_tier(config.starting_tier_pool, rng);
        let next_tier = catalog.roll_starting_tier(config.starting_tier_pool, rng);
        let mut session = Self {
            score: 0,
            current_tier,
            next_tier,
            phase: TurnPhase::Aiming,
            preview_x: config.arena_width * 0.5,
            is_playing: true,
            is_game_over: false,
        };
        session.preview_x = session.clamp_preview_x(session.preview_x, catalog, config);
        session
    }

    /// `true` while a release would actually drop something.
    #[inline]
    pub fn can_drop(&self) -> bool {
        self.is_playing && !self.is_game_over && self.phase == TurnPhase::Aiming
    }

    /// Clamp `x` so the current tier's visual radius (plus the wall margin)
    /// stays between the walls.
    pub fn clamp_preview_x(&self, x: f32, catalog: &ItemCatalog, config: &GameConfig) -> f32 {
        clamp_drop_x(x, catalog.visual_radius(self.current_tier), config)
    }

    /// Move the preview toward the pointer.  Ignored unless a session is live.
    pub fn aim(&mut self, pointer_x: f32, catalog: &ItemCatalog, config: &GameConfig) {
        if !self.is_playing || self.is_game_over {
            return;
        }
        self.preview_x = self.clamp_preview_x(pointer_x, catalog, config);
    }

    /// Consume the current piece if a drop is allowed right now.
    ///
    /// Returns `None` (and changes nothing) mid-cooldown, while idle, or after
    /// game over; those requests are not errors.
    pub fn try_drop(&mut self, config: &GameConfig) -> Option<DropRequest> {
        if !self.can_drop() {
            return None;
        }
        self.phase = TurnPhase::Cooldown(config.drop_cooldown_secs);
        Some(DropRequest {
            tier: self.current_tier,
            x: self.preview_x,
        })
    }

    /// Advance the cooldown by `dt` seconds.
    ///
    /// On expiry the queued next tier becomes current, a new next tier is
    /// rolled, the preview is re-clamped for the new size, and the phase
    /// returns to `Aiming`.  Returns `true` on the tick that re-arms.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        catalog: &ItemCatalog,
        config: &GameConfig,
        rng: &mut R,
    ) -> bool {
        let TurnPhase::Cooldown(remaining) = self.phase else {
            return false;
        };
        if !self.is_playing || self.is_game_over {
            return false;
        }
        let remaining = remaining - dt;
        if remaining > 0.0 {
            self.phase = TurnPhase::Cooldown(remaining);
            return false;
        }
        self.current_tier = self.next_tier;
        self.next_tier = catalog.roll_starting_tier(config.starting_tier_pool, rng);
        self.preview_x = self.clamp_preview_x(self.preview_x, catalog, config);
        self.phase = TurnPhase::Aiming;
        true
    }

    /// Add merge points.  Saturating so the score can never wrap downward.
    #[inline]
    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Enter the terminal state.  Returns the final score, or `None` if the
    /// session had already ended (so callers report it exactly once).
    pub fn end(&mut self) -> Option<u32> {
        if self.is_game_over {
            return None;
        }
        self.is_game_over = true;
        self.is_playing = false;
        self.phase = TurnPhase::Idle;
        Some(self.score)
    }
}

/// Clamp a drop-site X for an item drawn at `visual_radius`.
///
/// If the item is too wide to fit with the margin, it is centred.
pub fn clamp_drop_x(x: f32, visual_radius: f32, config: &GameConfig) -> f32 {
    let lo = visual_radius + config.preview_wall_margin;
    let hi = config.arena_width - visual_radius - config.preview_wall_margin;
    if lo > hi {
        return config.arena_width * 0.5;
    }
    x.clamp(lo, hi)
}
