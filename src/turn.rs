//! Pointer input and the turn loop around [`GameSession`].
//!
//! | System                | Schedule            | Purpose                                   |
//! |-----------------------|---------------------|-------------------------------------------|
//! | `start_session`       | `OnEnter(Playing)`  | Clear the arena and roll a fresh session  |
//! | `aim_system`          | `Update`            | Cursor / touch X → clamped preview X      |
//! | `drop_system`         | `Update`            | Release → `Airborne` item at the spawn Y  |
//! | `cooldown_system`     | `Update`            | Tick the drop cooldown, promote next tier |
//!
//! Everything except `start_session` runs only in `GameState::Playing`, and
//! before the Rapier step in `PostUpdate`.

use crate::arena::{despawn_items, spawn_item, Airborne, Item};
use crate::catalog::ItemCatalog;
use crate::config::GameConfig;
use crate::game_over::GameOverSweep;
use crate::menu::GameState;
use crate::particles::Spark;
use crate::session::{DropRequest, GameSession};
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Tracks whether the button/touch now being released was pressed during
/// play.  The click on PLAY or TRY AGAIN is pressed under the overlay, so its
/// release never drops an item.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PointerLatch {
    pub armed: bool,
}

impl PointerLatch {
    #[inline]
    pub fn press(&mut self) {
        self.armed = true;
    }

    /// Consume the latch.  `true` if the release completes an in-play press.
    #[inline]
    pub fn release(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }
}

pub struct TurnPlugin;

impl Plugin for TurnPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameSession>()
            .init_resource::<PointerLatch>()
            .add_systems(OnEnter(GameState::Playing), start_session)
            .add_systems(
                Update,
                (aim_system, drop_system, cooldown_system)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Reset everything a session owns and start a new one.
pub fn start_session(
    mut commands: Commands,
    catalog: Res<ItemCatalog>,
    config: Res<GameConfig>,
    q_items: Query<Entity, With<Item>>,
    q_sparks: Query<Entity, With<Spark>>,
    mut session: ResMut<GameSession>,
    mut latch: ResMut<PointerLatch>,
) {
    despawn_items(&mut commands, q_items.iter());
    for spark in q_sparks.iter() {
        commands.entity(spark).despawn();
    }
    *session = GameSession::start(&catalog, &config, &mut rand::thread_rng());
    *latch = PointerLatch::default();
    commands.insert_resource(GameOverSweep::new(config.sweep_interval_secs));
    info!(
        "New session: current tier {}, next tier {}",
        session.current_tier, session.next_tier
    );
}

/// World-space pointer position: the cursor if it is over the window,
/// otherwise the first active touch.
fn pointer_world_position(
    window: &Window,
    touches: &Touches,
    camera: &Camera,
    camera_transform: &GlobalTransform,
) -> Option<Vec2> {
    let screen = window
        .cursor_position()
        .or_else(|| touches.iter().next().map(|t| t.position()))?;
    camera.viewport_to_world_2d(camera_transform, screen).ok()
}

/// Move the preview toward the pointer.
pub fn aim_system(
    q_window: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform)>,
    touches: Res<Touches>,
    catalog: Res<ItemCatalog>,
    config: Res<GameConfig>,
    mut session: ResMut<GameSession>,
) {
    let (Ok(window), Ok((camera, camera_transform))) = (q_window.single(), q_camera.single())
    else {
        return;
    };
    if let Some(pointer) = pointer_world_position(window, &touches, camera, camera_transform) {
        if (pointer.x - session.preview_x).abs() > f32::EPSILON {
            session.aim(pointer.x, &catalog, &config);
        }
    }
}

/// Turn a left-button or touch release into a drop.
pub fn drop_system(
    mut commands: Commands,
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    catalog: Res<ItemCatalog>,
    config: Res<GameConfig>,
    mut latch: ResMut<PointerLatch>,
    mut session: ResMut<GameSession>,
) {
    if mouse.just_pressed(MouseButton::Left) || touches.any_just_pressed() {
        latch.press();
    }
    let released = mouse.just_released(MouseButton::Left) || touches.any_just_released();
    if !released || !latch.release() {
        return;
    }
    if let Some(request) = session.try_drop(&config) {
        execute_drop(&mut commands, &catalog, &config, request);
    }
}

/// Insert the body for an accepted drop at the clamped X and the spawn Y.
pub fn execute_drop(
    commands: &mut Commands,
    catalog: &ItemCatalog,
    config: &GameConfig,
    request: DropRequest,
) -> Option<Entity> {
    let position = Vec2::new(request.x, config.spawn_y());
    let entity = spawn_item(commands, catalog, config, request.tier, position)?;
    commands.entity(entity).insert(Airborne);
    debug!("Dropped tier {} at x = {:.1}", request.tier, request.x);
    Some(entity)
}

/// Count down the post-drop cooldown and promote the next tier when it ends.
pub fn cooldown_system(
    time: Res<Time>,
    catalog: Res<ItemCatalog>,
    config: Res<GameConfig>,
    mut session: ResMut<GameSession>,
) {
    if !matches!(session.phase, crate::session::TurnPhase::Cooldown(_)) {
        return;
    }
    session.tick(time.delta_secs(), &catalog, &config, &mut rand::thread_rng());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn_world() -> World {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());
        world.insert_resource(ItemCatalog::default());
        world.insert_resource(GameSession::default());
        world.insert_resource(PointerLatch::default());
        world.insert_resource(ButtonInput::<MouseButton>::default());
        world.insert_resource(Touches::default());
        world
    }

    fn airborne_items(world: &mut World) -> Vec<(u8, Vec2)> {
        world
            .query_filtered::<(&Item, &Transform), With<Airborne>>()
            .iter(world)
            .map(|(i, t)| (i.tier, t.translation.truncate()))
            .collect()
    }

    #[test]
    fn latch_only_fires_after_a_press() {
        let mut latch = PointerLatch::default();
        assert!(!latch.release());
        latch.press();
        assert!(latch.release());
        assert!(!latch.release(), "a release consumes the latch");
    }

    #[test]
    fn start_session_clears_items_and_sparks() {
        let mut world = turn_world();
        world.spawn((Item { tier: 4 }, Transform::default()));
        world.spawn((Item { tier: 2 }, Transform::default()));
        world.spawn((
            Spark {
                velocity: Vec2::ZERO,
                life: 0.5,
                size: 6.0,
                r: 1.0,
                g: 1.0,
                b: 1.0,
                material: None,
            },
            Transform::default(),
        ));
        {
            let mut session = world.resource_mut::<GameSession>();
            session.score = 900;
            session.is_game_over = true;
        }
        world.resource_mut::<PointerLatch>().press();

        let mut schedule = Schedule::default();
        schedule.add_systems(start_session);
        schedule.run(&mut world);

        assert_eq!(world.query::<&Item>().iter(&world).count(), 0);
        assert_eq!(world.query::<&Spark>().iter(&world).count(), 0);
        let session = world.resource::<GameSession>();
        assert_eq!(session.score, 0);
        assert!(session.is_playing);
        assert!(!session.is_game_over);
        assert!(session.current_tier < 5 && session.next_tier < 5);
        assert!(!world.resource::<PointerLatch>().armed);
        assert!(world.get_resource::<GameOverSweep>().is_some());
    }

    #[test]
    fn click_drops_an_airborne_item_at_spawn_height() {
        let mut world = turn_world();
        let mut schedule = Schedule::default();
        schedule.add_systems(start_session);
        schedule.run(&mut world);
        let (tier, x) = {
            let session = world.resource::<GameSession>();
            (session.current_tier, session.preview_x)
        };

        {
            let mut mouse = world.resource_mut::<ButtonInput<MouseButton>>();
            mouse.press(MouseButton::Left);
            mouse.release(MouseButton::Left);
        }
        let mut drops = Schedule::default();
        drops.add_systems(drop_system);
        drops.run(&mut world);

        let spawn_y = GameConfig::default().spawn_y();
        assert_eq!(airborne_items(&mut world), vec![(tier, Vec2::new(x, spawn_y))]);
        assert!(!world.resource::<GameSession>().can_drop());
    }

    #[test]
    fn release_without_in_play_press_is_ignored() {
        let mut world = turn_world();
        let mut schedule = Schedule::default();
        schedule.add_systems(start_session);
        schedule.run(&mut world);

        // The press happened under the overlay and was never seen here.
        {
            let mut mouse = world.resource_mut::<ButtonInput<MouseButton>>();
            mouse.press(MouseButton::Left);
            mouse.clear();
            mouse.release(MouseButton::Left);
        }
        let mut drops = Schedule::default();
        drops.add_systems(drop_system);
        drops.run(&mut world);

        assert!(airborne_items(&mut world).is_empty());
        assert!(world.resource::<GameSession>().can_drop());
    }

    #[test]
    fn idle_session_never_drops() {
        let mut world = turn_world();
        {
            let mut mouse = world.resource_mut::<ButtonInput<MouseButton>>();
            mouse.press(MouseButton::Left);
            mouse.release(MouseButton::Left);
        }
        let mut drops = Schedule::default();
        drops.add_systems(drop_system);
        drops.run(&mut world);

        assert!(airborne_items(&mut world).is_empty());
    }
}
