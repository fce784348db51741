//! Physics world adapter: the thin layer between game rules and Rapier.
//!
//! Rapier owns body dynamics, contact generation and the solver.  This module
//! only decides *what* goes into its world:
//!
//! | Function / system       | Purpose                                         |
//! |-------------------------|-------------------------------------------------|
//! | [`spawn_boundary`]      | Ground slab and two side walls (fixed bodies)   |
//! | [`spawn_item`]          | One dynamic circular item of a given tier       |
//! | [`despawn_items`]       | Remove a set of item bodies                     |
//! | [`BodySnapshot`]        | Plain-data view of a body for rule evaluation   |
//! | `apply_gravity_system`  | Push the configured gravity into Rapier         |
//!
//! The tier of a body lives in the game-owned [`Item`] component; Rapier never
//! sees it.  Stepping happens inside `RapierPhysicsPlugin` in `PostUpdate`, and
//! collision starts arrive as `CollisionEvent` messages because every item
//! collider enables `ActiveEvents::COLLISION_EVENTS`.

use crate::catalog::ItemCatalog;
use crate::config::GameConfig;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Components ────────────────────────────────────────────────────────────────

/// Tier tag of a droppable item body.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub tier: u8,
}

/// Set on a freshly dropped or freshly fused item until its first contact.
///
/// A dropped item is still falling from the drop site, which lies above the
/// deadline.  A fused item has not been moved by the solver yet.  Neither
/// counts towards game over.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Airborne;

/// Marker for the static arena boundary bodies.
#[derive(Component, Debug, Clone, Copy)]
pub struct Wall;

/// Plain-data view of a body at one instant.
///
/// Rule code (game-over detection in particular) works on slices of these so
/// it can be evaluated without an ECS world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub handle: Entity,
    /// `None` for non-item bodies such as walls.
    pub tier: Option<u8>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub is_static: bool,
}

impl BodySnapshot {
    /// Snapshot of a dynamic item body.
    pub fn item(handle: Entity, item: &Item, transform: &Transform, velocity: &Velocity) -> Self {
        Self {
            handle,
            tier: Some(item.tier),
            position: transform.translation.truncate(),
            velocity: velocity.linvel,
            is_static: false,
        }
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            spawn_boundary_system.after(crate::config::load_game_config),
        )
        .add_systems(PostStartup, apply_gravity_system);
    }
}

// ── Boundary ──────────────────────────────────────────────────────────────────

/// Startup system wrapper around [`spawn_boundary`].
pub fn spawn_boundary_system(mut commands: Commands, config: Res<GameConfig>) {
    spawn_boundary(&mut commands, &config);
    info!(
        "Arena boundary spawned ({}x{})",
        config.arena_width, config.arena_height
    );
}

/// Spawn the ground slab and both side walls.
///
/// Walls sit outside `[0, arena_width]` so their inner faces coincide with the
/// arena edges.  They are twice the arena height so items bouncing near the
/// top cannot slip over them; the ground is wider than the arena so corners
/// are closed.
pub fn spawn_boundary(commands: &mut Commands, config: &GameConfig) {
    let half_t = config.wall_thickness * 0.5;
    let ground_center = Vec2::new(
        config.arena_width * 0.5,
        -config.ground_sink - half_t,
    );
    let ground_half = Vec2::new(config.arena_width * 0.5 + 100.0, half_t);
    let wall_half = Vec2::new(half_t, config.arena_height);
    let left_center = Vec2::new(-half_t, config.arena_height * 0.5);
    let right_center = Vec2::new(config.arena_width + half_t, config.arena_height * 0.5);

    for (center, half) in [
        (ground_center, ground_half),
        (left_center, wall_half),
        (right_center, wall_half),
    ] {
        commands.spawn((
            Wall,
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y),
            Friction::coefficient(config.item_friction),
            Transform::from_translation(center.extend(0.0)),
        ));
    }
}

// ── Items ─────────────────────────────────────────────────────────────────────

/// Insert one dynamic item of `tier` centred on `position`.
///
/// Returns `None` without touching the world when `tier` is not in the
/// catalog.
pub fn spawn_item(
    commands: &mut Commands,
    catalog: &ItemCatalog,
    config: &GameConfig,
    tier: u8,
    position: Vec2,
) -> Option<Entity> {
    let def = catalog.get(tier)?;
    let entity = commands
        .spawn((
            Item { tier },
            RigidBody::Dynamic,
            Collider::ball(def.radius),
            Restitution::coefficient(config.item_restitution),
            Friction::coefficient(config.item_friction),
            ColliderMassProperties::Density(config.item_density),
            Velocity::zero(),
            ActiveEvents::COLLISION_EVENTS,
            Transform::from_translation(position.extend(0.0)),
            Visibility::default(),
        ))
        .id();
    Some(entity)
}

/// Remove every listed item body from the world.
pub fn despawn_items(commands: &mut Commands, items: impl IntoIterator<Item = Entity>) {
    for entity in items {
        commands.entity(entity).despawn();
    }
}

// ── Gravity ───────────────────────────────────────────────────────────────────

/// Apply the configured downward gravity to every Rapier context.
///
/// Runs in `PostStartup` so both the config file and the Rapier context
/// entity are in place.
pub fn apply_gravity_system(
    config: Res<GameConfig>,
    mut rapier_configs: Query<&mut RapierConfiguration>,
) {
    for mut cfg in rapier_configs.iter_mut() {
        cfg.gravity = Vec2::new(0.0, -config.gravity);
    }
}
