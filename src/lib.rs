//! DuoDuo Merge: a drop-and-merge arcade game on Bevy and Rapier.
//!
//! Items of ten tiers are dropped into a walled arena.  Two touching items of
//! the same tier fuse into the next tier at their midpoint and score points;
//! the session ends once an item settles above the deadline.
//!
//! Rapier owns the rigid-body simulation.  The game rules sit on top of it:
//! [`merge`] consumes collision events, [`game_over`] inspects body
//! snapshots, and [`session`] holds the turn state machine that
//! [`turn`] drives from pointer input.

use bevy::prelude::*;

pub mod arena;
pub mod best_score;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod game_over;
pub mod graphics;
pub mod menu;
pub mod merge;
pub mod particles;
pub mod rendering;
pub mod session;
pub mod turn;

/// Every gameplay and presentation plugin of the game.
///
/// Expects `GameConfig` and `ItemCatalog` resources, the Rapier plugin and
/// (for rendering) `DefaultPlugins` to be present.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        // MenuPlugin registers GameState, so it goes first.
        app.add_plugins(menu::MenuPlugin).add_plugins((
            arena::ArenaPlugin,
            turn::TurnPlugin,
            merge::MergePlugin,
            game_over::GameOverPlugin,
            particles::ParticlesPlugin,
            best_score::BestScorePlugin,
            rendering::RenderingPlugin,
        ))
        .add_systems(PreStartup, catalog::check_item_catalog);
    }
}
