use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;

use duoduo_merge::catalog::ItemCatalog;
use duoduo_merge::config::{self, GameConfig};
use duoduo_merge::constants::{ARENA_HEIGHT, ARENA_WIDTH};
use duoduo_merge::graphics;
use duoduo_merge::GamePlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "DuoDuo Merge".into(),
                resolution: WindowResolution::new(ARENA_WIDTH as u32, ARENA_HEIGHT as u32),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb_u8(0xFF, 0xF8, 0xE1)))
        // Compiled defaults; load_game_config overwrites them from
        // assets/game.toml (if present) in the Startup schedule.
        .insert_resource(GameConfig::default())
        .insert_resource(ItemCatalog::default())
        // One physics unit per pixel so radii, gravity and speeds in the
        // config are all in arena units.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins(GamePlugin)
        .add_systems(
            Startup,
            (
                // Load config first so every other startup system sees the final values.
                config::load_game_config,
                graphics::setup_camera.after(config::load_game_config),
            ),
        )
        .add_systems(Update, graphics::fit_camera_system)
        .run();
}
