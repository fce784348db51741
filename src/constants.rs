//! Centralised arena, physics and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameConfig::default`] reads every value from this file.
//!
//! ## Coordinate convention
//!
//! World units equal arena units.  The arena spans `x ∈ [0, ARENA_WIDTH]` and
//! `y ∈ [0, ARENA_HEIGHT]` with **y pointing up**: the ground is at `y = 0`
//! and the open top at `y = ARENA_HEIGHT`.  Depths below are measured
//! downward from the top edge, matching how the layout is usually described.

// ── Arena ─────────────────────────────────────────────────────────────────────

/// Logical arena width (world units).
pub const ARENA_WIDTH: f32 = 400.0;

/// Logical arena height (world units).
pub const ARENA_HEIGHT: f32 = 650.0;

/// Thickness of the side walls and the ground slab.
///
/// Walls sit entirely outside the arena so their inner faces are at `x = 0`
/// and `x = ARENA_WIDTH`.
pub const WALL_THICKNESS: f32 = 50.0;

/// How far the ground's top face is sunk below `y = 0`.
///
/// A small negative offset lets resting items visually overlap the bottom
/// edge of the playfield instead of floating on it.
pub const GROUND_SINK: f32 = 10.0;

/// Distance of the deadline line below the top edge.
///
/// An item resting with its centre above this line ends the game.
pub const DEADLINE_DEPTH: f32 = 150.0;

/// Distance of the drop site (where the preview hangs) below the top edge.
pub const SPAWN_DEPTH: f32 = 50.0;

// ── Physics ───────────────────────────────────────────────────────────────────

/// Downward gravitational acceleration (u/s²).
///
/// Tuned so a tier-0 item falls the full arena height in a little over one
/// second, which matches the "snappy" feel of the reference game.
pub const GRAVITY: f32 = 1000.0;

/// Restitution coefficient for item colliders. 0.0 = dead drop, 1.0 = elastic.
pub const ITEM_RESTITUTION: f32 = 0.2;

/// Friction coefficient for item colliders.
pub const ITEM_FRICTION: f32 = 0.1;

/// Collider density for items.  Larger tiers are heavier through area alone.
pub const ITEM_DENSITY: f32 = 1.0;

// ── Turn control ──────────────────────────────────────────────────────────────

/// Seconds after a drop during which further drops are rejected.
pub const DROP_COOLDOWN_SECS: f32 = 0.6;

/// Number of lowest tiers eligible for random current/next rolls.
pub const STARTING_TIER_POOL: u8 = 5;

/// Extra clearance kept between the preview's visual edge and a wall face.
pub const PREVIEW_WALL_MARGIN: f32 = WALL_THICKNESS / 2.0;

// ── Game over ─────────────────────────────────────────────────────────────────

/// Velocity band (u/s) inside which a body counts as "at rest".
///
/// Roughly 0.1 u per 60 Hz frame.  Raising it makes game over trigger on
/// bodies that are still slowly sliding; lowering it can make the check miss
/// bodies jittering on a crowded stack.
pub const REST_VELOCITY_EPSILON: f32 = 6.0;

/// Interval (s) of the corroborating game-over sweep.
pub const SWEEP_INTERVAL_SECS: f32 = 1.0;

// ── Merge sparks ──────────────────────────────────────────────────────────────

/// Inclusive bounds on the number of sparks emitted per merge.
pub const SPARK_COUNT_MIN: u32 = 6;
pub const SPARK_COUNT_MAX: u32 = 10;

/// Maximum initial radial speed of a spark (u/s).
pub const SPARK_SPEED_MAX: f32 = 300.0;

/// Downward acceleration applied to sparks (u/s²).
pub const SPARK_GRAVITY: f32 = 1800.0;

/// Life lost per second; sparks start at 1.0 so this is the inverse lifetime.
pub const SPARK_DECAY_PER_SEC: f32 = 3.0;

/// Spark radius range (world units).
pub const SPARK_SIZE_MIN: f32 = 5.0;
pub const SPARK_SIZE_MAX: f32 = 15.0;

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Opacity of the aimed preview item.
pub const PREVIEW_ALPHA: f32 = 0.8;

/// Font size for HUD text.
pub const HUD_FONT_SIZE: f32 = 22.0;

// ── Persistence ───────────────────────────────────────────────────────────────

/// Default location of the best-score file, relative to the working directory.
pub const BEST_SCORE_PATH: &str = "saves/best_score.toml";
