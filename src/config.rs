//! Runtime game configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GameConfig>` to any system parameter list and read values
//! with `config.drop_cooldown_secs`, `config.deadline_y()`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use crate::error::{
    validate_non_negative, validate_positive, validate_unit_interval, GameError, GameResult,
};
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable arena, physics and gameplay configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Arena ────────────────────────────────────────────────────────────────
    pub arena_width: f32,
    pub arena_height: f32,
    pub wall_thickness: f32,
    pub ground_sink: f32,
    pub deadline_depth: f32,
    pub spawn_depth: f32,

    // ── Physics ──────────────────────────────────────────────────────────────
    pub gravity: f32,
    pub item_restitution: f32,
    pub item_friction: f32,
    pub item_density: f32,

    // ── Turn control ─────────────────────────────────────────────────────────
    pub drop_cooldown_secs: f32,
    pub starting_tier_pool: u8,
    pub preview_wall_margin: f32,

    // ── Game over ────────────────────────────────────────────────────────────
    pub rest_velocity_epsilon: f32,
    pub sweep_interval_secs: f32,

    // ── Merge sparks ─────────────────────────────────────────────────────────
    pub spark_count_min: u32,
    pub spark_count_max: u32,
    pub spark_speed_max: f32,
    pub spark_gravity: f32,
    pub spark_decay_per_sec: f32,
    pub spark_size_min: f32,
    pub spark_size_max: f32,

    // ── Rendering ────────────────────────────────────────────────────────────
    pub preview_alpha: f32,
    pub hud_font_size: f32,

    // ── Persistence ──────────────────────────────────────────────────────────
    pub best_score_path: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Arena
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            ground_sink: GROUND_SINK,
            deadline_depth: DEADLINE_DEPTH,
            spawn_depth: SPAWN_DEPTH,
            // Physics
            gravity: GRAVITY,
            item_restitution: ITEM_RESTITUTION,
            item_friction: ITEM_FRICTION,
            item_density: ITEM_DENSITY,
            // Turn control
            drop_cooldown_secs: DROP_COOLDOWN_SECS,
            starting_tier_pool: STARTING_TIER_POOL,
            preview_wall_margin: PREVIEW_WALL_MARGIN,
            // Game over
            rest_velocity_epsilon: REST_VELOCITY_EPSILON,
            sweep_interval_secs: SWEEP_INTERVAL_SECS,
            // Merge sparks
            spark_count_min: SPARK_COUNT_MIN,
            spark_count_max: SPARK_COUNT_MAX,
            spark_speed_max: SPARK_SPEED_MAX,
            spark_gravity: SPARK_GRAVITY,
            spark_decay_per_sec: SPARK_DECAY_PER_SEC,
            spark_size_min: SPARK_SIZE_MIN,
            spark_size_max: SPARK_SIZE_MAX,
            // Rendering
            preview_alpha: PREVIEW_ALPHA,
            hud_font_size: HUD_FONT_SIZE,
            // Persistence
            best_score_path: BEST_SCORE_PATH.to_string(),
        }
    }
}

impl GameConfig {
    /// World-space Y of the deadline line.
    #[inline]
    pub fn deadline_y(&self) -> f32 {
        self.arena_height - self.deadline_depth
    }

    /// World-space Y at which dropped items are inserted and the preview hangs.
    #[inline]
    pub fn spawn_y(&self) -> f32 {
        self.arena_height - self.spawn_depth
    }

    /// Centre of the arena in world space (camera target).
    #[inline]
    pub fn arena_center(&self) -> Vec2 {
        Vec2::new(self.arena_width * 0.5, self.arena_height * 0.5)
    }

    /// Reject values that would break the game rules or the physics setup.
    pub fn validate(&self) -> GameResult<()> {
        validate_positive("ARENA_WIDTH", self.arena_width)?;
        validate_positive("ARENA_HEIGHT", self.arena_height)?;
        validate_positive("WALL_THICKNESS", self.wall_thickness)?;
        validate_non_negative("DEADLINE_DEPTH", self.deadline_depth)?;
        validate_non_negative("SPAWN_DEPTH", self.spawn_depth)?;
        validate_non_negative("GRAVITY", self.gravity)?;
        validate_unit_interval("ITEM_RESTITUTION", self.item_restitution)?;
        validate_non_negative("ITEM_FRICTION", self.item_friction)?;
        validate_positive("ITEM_DENSITY", self.item_density)?;
        validate_non_negative("DROP_COOLDOWN_SECS", self.drop_cooldown_secs)?;
        validate_positive("STARTING_TIER_POOL", self.starting_tier_pool as f32)?;
        validate_non_negative("PREVIEW_WALL_MARGIN", self.preview_wall_margin)?;
        validate_positive("REST_VELOCITY_EPSILON", self.rest_velocity_epsilon)?;
        validate_positive("SWEEP_INTERVAL_SECS", self.sweep_interval_secs)?;
        validate_positive("SPARK_DECAY_PER_SEC", self.spark_decay_per_sec)?;
        validate_unit_interval("PREVIEW_ALPHA", self.preview_alpha)?;
        if self.spark_count_min > self.spark_count_max {
            return Err(GameError::UnsafeConstant {
                name: "SPARK_COUNT_MIN",
                value: self.spark_count_min as f32,
                safe_range: "[0, SPARK_COUNT_MAX]",
            });
        }
        if self.spark_size_min > self.spark_size_max {
            return Err(GameError::UnsafeConstant {
                name: "SPARK_SIZE_MIN",
                value: self.spark_size_min,
                safe_range: "[0, SPARK_SIZE_MAX]",
            });
        }
        if self.spawn_depth > self.deadline_depth {
            return Err(GameError::UnsafeConstant {
                name: "SPAWN_DEPTH",
                value: self.spawn_depth,
                safe_range: "[0, DEADLINE_DEPTH]",
            });
        }
        Ok(())
    }
}

/// Parse a TOML document into a validated [`GameConfig`].
///
/// Missing keys keep their defaults; a syntax error or an out-of-range value
/// is returned as an error string suitable for logging.
pub fn parse_game_config(contents: &str) -> Result<GameConfig, String> {
    let loaded = toml::from_str::<GameConfig>(contents).map_err(|e| e.to_string())?;
    loaded.validate().map_err(|e| e.to_string())?;
    Ok(loaded)
}

/// Startup system: attempt to load `assets/game.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Parse or validation errors are logged but do not abort the game.  A
/// missing file is silently ignored (defaults are already in place from
/// `insert_resource`).
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = "assets/game.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match parse_game_config(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded game config from {path}");
            }
            Err(e) => {
                warn!("Failed to load {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // Missing file: compiled defaults stay in place.
            info!("No {path} found; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn deadline_and_spawn_are_measured_from_the_top() {
        let config = GameConfig::default();
        assert_eq!(config.deadline_y(), ARENA_HEIGHT - DEADLINE_DEPTH);
        assert_eq!(config.spawn_y(), ARENA_HEIGHT - SPAWN_DEPTH);
        assert!(config.spawn_y() > config.deadline_y());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = parse_game_config("drop_cooldown_secs = 1.25\n").expect("valid toml");
        assert_eq!(config.drop_cooldown_secs, 1.25);
        assert_eq!(config.arena_width, ARENA_WIDTH);
        assert_eq!(config.starting_tier_pool, STARTING_TIER_POOL);
    }

    #[test]
    fn invalid_value_is_rejected() {
        let err = parse_game_config("sweep_interval_secs = 0.0\n").unwrap_err();
        assert!(err.contains("SWEEP_INTERVAL_SECS"), "got: {err}");
    }

    #[test]
    fn syntax_error_is_reported() {
        assert!(parse_game_config("drop_cooldown_secs = = 1").is_err());
    }

    #[test]
    fn inverted_spark_bounds_are_rejected() {
        let config = GameConfig {
            spark_count_min: 12,
            spark_count_max: 6,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
