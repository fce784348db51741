use crate::config::GameConfig;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Extra world units kept visible around the arena when fitting the camera.
const FIT_PADDING: f32 = 8.0;

/// Spawn the 2D camera centred on the arena.
pub fn setup_camera(mut commands: Commands, config: Res<GameConfig>) {
    let center = config.arena_center();
    commands.spawn((Camera2d, Transform::from_xyz(center.x, center.y, 0.0)));
    info!("Camera spawned at ({}, {})", center.x, center.y);
}

/// Orthographic scale that shows the whole `arena` inside `window`
/// (both in the same units: world units and logical pixels).
pub fn fit_scale(arena: Vec2, window: Vec2) -> f32 {
    if window.x <= 0.0 || window.y <= 0.0 {
        return 1.0;
    }
    let padded = arena + Vec2::splat(FIT_PADDING * 2.0);
    (padded.x / window.x).max(padded.y / window.y)
}

/// Keep the fixed logical arena fully visible whatever the window size.
pub fn fit_camera_system(
    config: Res<GameConfig>,
    q_window: Query<&Window, (With<PrimaryWindow>, Changed<Window>)>,
    mut q_projection: Query<&mut Projection, With<Camera2d>>,
) {
    let Ok(window) = q_window.single() else {
        return;
    };
    let scale = fit_scale(
        Vec2::new(config.arena_width, config.arena_height),
        Vec2::new(window.width(), window.height()),
    );
    for mut projection in q_projection.iter_mut() {
        if let Projection::Orthographic(ortho) = &mut *projection {
            ortho.scale = scale;
        }
    }
}
