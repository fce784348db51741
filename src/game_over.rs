//! Game-over detection: an item settled above the deadline ends the session.
//!
//! Two cadences look at the same rule:
//!
//! | System                              | When            | Rest test          |
//! |-------------------------------------|-----------------|--------------------|
//! | [`frame_game_over_system`]          | every frame     | vertical speed     |
//! | [`periodic_game_over_sweep_system`] | every sweep tick| both axes          |
//!
//! The frame check catches a stack that has come to rest with a sideways
//! drift; the sweep is the stricter backstop.  Airborne items (dropped or
//! fused, and not yet touching anything) are excluded from both.

use crate::arena::{Airborne, BodySnapshot, Item};
use crate::config::GameConfig;
use crate::menu::GameState;
use crate::merge::merge_items_system;
use crate::session::GameSession;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Which velocity components must be near zero for a body to count as resting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestAxes {
    Vertical,
    Both,
}

/// Written once when a session ends.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverReached {
    pub final_score: u32,
}

/// Repeating timer driving the periodic sweep.
#[derive(Resource, Debug, Clone)]
pub struct GameOverSweep(pub Timer);

impl GameOverSweep {
    pub fn new(interval_secs: f32) -> Self {
        Self(Timer::from_seconds(interval_secs, TimerMode::Repeating))
    }
}

impl Default for GameOverSweep {
    fn default() -> Self {
        Self::new(crate::constants::SWEEP_INTERVAL_SECS)
    }
}

pub struct GameOverPlugin;

impl Plugin for GameOverPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<GameOverReached>()
            .init_resource::<GameOverSweep>()
            .add_systems(
                PostUpdate,
                (frame_game_over_system, periodic_game_over_sweep_system)
                    .chain()
                    .after(merge_items_system)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// `true` if `body` is an item strictly above `deadline_y` and at rest.
#[inline]
pub fn is_resting_above(body: &BodySnapshot, deadline_y: f32, epsilon: f32, axes: RestAxes) -> bool {
    if body.is_static || body.tier.is_none() || body.position.y <= deadline_y {
        return false;
    }
    let still_y = body.velocity.y.abs() < epsilon;
    match axes {
        RestAxes::Vertical => still_y,
        RestAxes::Both => still_y && body.velocity.x.abs() < epsilon,
    }
}

/// First body (in slice order) that is resting above the deadline.
///
/// Pure over the snapshot: the same input always yields the same answer.
pub fn detect_overflow(
    bodies: &[BodySnapshot],
    deadline_y: f32,
    epsilon: f32,
    axes: RestAxes,
) -> Option<Entity> {
    bodies
        .iter()
        .find(|b| is_resting_above(b, deadline_y, epsilon, axes))
        .map(|b| b.handle)
}

type SettledItems<'w, 's> =
    Query<'w, 's, (Entity, &'static Item, &'static Transform, &'static Velocity), Without<Airborne>>;

fn snapshots(q_items: &SettledItems) -> Vec<BodySnapshot> {
    q_items
        .iter()
        .map(|(entity, item, transform, velocity)| BodySnapshot::item(entity, item, transform, velocity))
        .collect()
}

fn declare_game_over(
    session: &mut GameSession,
    next_state: &mut NextState<GameState>,
    reached: &mut MessageWriter<GameOverReached>,
    culprit: Entity,
) {
    let Some(final_score) = session.end() else {
        return;
    };
    reached.write(GameOverReached { final_score });
    next_state.set(GameState::GameOver);
    info!("Game over: {culprit} settled above the deadline, final score {final_score}");
}

/// Per-frame check using the vertical speed only.
pub fn frame_game_over_system(
    config: Res<GameConfig>,
    q_items: SettledItems,
    mut session: ResMut<GameSession>,
    mut next_state: ResMut<NextState<GameState>>,
    mut reached: MessageWriter<GameOverReached>,
) {
    if !session.is_playing {
        return;
    }
    let bodies = snapshots(&q_items);
    if let Some(culprit) = detect_overflow(
        &bodies,
        config.deadline_y(),
        config.rest_velocity_epsilon,
        RestAxes::Vertical,
    ) {
        declare_game_over(&mut session, &mut next_state, &mut reached, culprit);
    }
}

/// Sweep on every tick of [`GameOverSweep`], requiring rest on both axes.
pub fn periodic_game_over_sweep_system(
    time: Res<Time>,
    config: Res<GameConfig>,
    mut sweep: ResMut<GameOverSweep>,
    q_items: SettledItems,
    mut session: ResMut<GameSession>,
    mut next_state: ResMut<NextState<GameState>>,
    mut reached: MessageWriter<GameOverReached>,
) {
    sweep.0.tick(time.delta());
    if !sweep.0.just_finished() || !session.is_playing {
        return;
    }
    let bodies = snapshots(&q_items);
    if let Some(culprit) = detect_overflow(
        &bodies,
        config.deadline_y(),
        config.rest_velocity_epsilon,
        RestAxes::Both,
    ) {
        declare_game_over(&mut session, &mut next_state, &mut reached, culprit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;
    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    const DEADLINE: f32 = 500.0;
    const EPS: f32 = 6.0;

    fn body(tier: Option<u8>, y: f32, velocity: Vec2) -> BodySnapshot {
        BodySnapshot {
            handle: Entity::PLACEHOLDER,
            tier,
            position: Vec2::new(200.0, y),
            velocity,
            is_static: false,
        }
    }

    #[test]
    fn resting_item_above_line_is_detected() {
        let bodies = [body(Some(1), 520.0, Vec2::ZERO)];
        assert!(detect_overflow(&bodies, DEADLINE, EPS, RestAxes::Both).is_some());
    }

    #[test]
    fn line_itself_is_not_above() {
        let bodies = [body(Some(1), DEADLINE, Vec2::ZERO)];
        assert!(detect_overflow(&bodies, DEADLINE, EPS, RestAxes::Vertical).is_none());
    }

    #[test]
    fn epsilon_is_strict() {
        let bodies = [body(Some(1), 520.0, Vec2::new(0.0, EPS))];
        assert!(detect_overflow(&bodies, DEADLINE, EPS, RestAxes::Vertical).is_none());
    }

    #[test]
    fn walls_and_static_bodies_are_ignored() {
        let mut wall = body(None, 600.0, Vec2::ZERO);
        let mut fixed_item = body(Some(2), 600.0, Vec2::ZERO);
        wall.is_static = true;
        fixed_item.is_static = true;
        assert!(detect_overflow(&[wall, fixed_item], DEADLINE, EPS, RestAxes::Both).is_none());
    }

    #[test]
    fn sideways_drift_only_passes_vertical_check() {
        let bodies = [body(Some(0), 540.0, Vec2::new(30.0, 0.0))];
        assert!(detect_overflow(&bodies, DEADLINE, EPS, RestAxes::Vertical).is_some());
        assert!(detect_overflow(&bodies, DEADLINE, EPS, RestAxes::Both).is_none());
    }

    #[test]
    fn detection_is_idempotent() {
        let bodies = [
            body(Some(4), 120.0, Vec2::ZERO),
            body(Some(1), 530.0, Vec2::new(1.0, -1.0)),
        ];
        let first = detect_overflow(&bodies, DEADLINE, EPS, RestAxes::Both);
        let second = detect_overflow(&bodies, DEADLINE, EPS, RestAxes::Both);
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    // ── ECS ──────────────────────────────────────────────────────────────────

    fn game_over_test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin));
        app.insert_state(GameState::Playing);
        app.add_message::<GameOverReached>();
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(200)));
        app.insert_resource(GameConfig::default());
        app.init_resource::<GameOverSweep>();

        let catalog = crate::catalog::ItemCatalog::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut session = GameSession::start(&catalog, &GameConfig::default(), &mut rng);
        session.award(36);
        app.insert_resource(session);
        app
    }

    #[test]
    fn sweep_ends_session_with_current_score() {
        let mut app = game_over_test_app();
        app.add_systems(Update, periodic_game_over_sweep_system);
        app.world_mut().spawn((
            Item { tier: 1 },
            Transform::from_xyz(200.0, 560.0, 0.0),
            Velocity::zero(),
        ));

        // Well short of the one-second interval.
        for _ in 0..3 {
            app.update();
        }
        assert!(app.world().resource::<GameSession>().is_playing);

        for _ in 0..4 {
            app.update();
        }
        let session = app.world().resource::<GameSession>();
        assert!(!session.is_playing);
        assert!(session.is_game_over);
        assert_eq!(session.score, 36);

        app.update();
        assert_eq!(
            *app.world().resource::<State<GameState>>().get(),
            GameState::GameOver
        );
    }

    #[test]
    fn airborne_item_does_not_end_the_game() {
        let mut app = game_over_test_app();
        app.add_systems(Update, frame_game_over_system);
        app.world_mut().spawn((
            Item { tier: 2 },
            Airborne,
            Transform::from_xyz(200.0, 600.0, 0.0),
            Velocity::zero(),
        ));

        app.update();

        assert!(app.world().resource::<GameSession>().is_playing);
    }

    #[test]
    fn frame_check_reports_once() {
        let mut app = game_over_test_app();
        app.add_systems(Update, frame_game_over_system);
        app.world_mut().spawn((
            Item { tier: 0 },
            Transform::from_xyz(100.0, 520.0, 0.0),
            Velocity::linear(Vec2::new(40.0, 0.0)),
        ));

        app.update();
        app.update();

        let messages = app.world().resource::<Messages<GameOverReached>>();
        let mut cursor = messages.get_cursor();
        let reported: Vec<u32> = cursor.read(messages).map(|m| m.final_score).collect();
        assert_eq!(reported, vec![36]);
    }
}
