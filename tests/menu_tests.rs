//! Headless tests for the [`GameState`] screen flow.
//!
//! These tests use [`MinimalPlugins`] (no window, no rendering, no physics)
//! so they run fast and deterministically in CI.
//!
//! Covered scenarios:
//! 1. Default initial state is `Title`, with the title overlay spawned.
//! 2. Pressing PLAY moves to `Playing` and removes the overlay.
//! 3. Entering `GameOver` shows the final-score overlay.
//! 4. TRY AGAIN returns to `Playing`.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use duoduo_merge::menu::{GameOverRoot, GameState, MenuPlugin, PlayButton, TitleRoot, TryAgainButton};
use duoduo_merge::session::GameSession;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Minimal headless app with the menu plugin.
///
/// Keyboard state is a bare resource (no `InputPlugin`) so nothing clears it
/// between frames.
fn menu_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(ButtonInput::<KeyCode>::default());
    app.insert_resource(GameSession::default());
    app.add_plugins(MenuPlugin);
    app
}

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

fn count<C: Component>(app: &mut App) -> usize {
    app.world_mut()
        .query_filtered::<Entity, With<C>>()
        .iter(app.world())
        .count()
}

fn press_button<C: Component>(app: &mut App) {
    let world = app.world_mut();
    let buttons: Vec<Entity> = world
        .query_filtered::<Entity, With<C>>()
        .iter(world)
        .collect();
    for button in buttons {
        world.entity_mut(button).insert(Interaction::Pressed);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn starts_on_title_screen() {
    let mut app = menu_app();
    app.update();
    assert_eq!(state(&app), GameState::Title);
    assert_eq!(count::<TitleRoot>(&mut app), 1);
    assert_eq!(count::<PlayButton>(&mut app), 1);
}

#[test]
fn play_button_starts_a_session() {
    let mut app = menu_app();
    app.update();

    press_button::<PlayButton>(&mut app);
    app.update(); // button system requests Playing
    app.update(); // StateTransition fires

    assert_eq!(state(&app), GameState::Playing);
    assert_eq!(count::<TitleRoot>(&mut app), 0);
}

#[test]
fn enter_key_also_starts() {
    let mut app = menu_app();
    app.update();

    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(KeyCode::Enter);
    app.update();
    app.update();

    assert_eq!(state(&app), GameState::Playing);
}

#[test]
fn game_over_overlay_shows_and_restarts() {
    let mut app = menu_app();
    app.update();
    app.world_mut().resource_mut::<GameSession>().score = 128;
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::GameOver);
    app.update();

    assert_eq!(state(&app), GameState::GameOver);
    assert_eq!(count::<GameOverRoot>(&mut app), 1);
    let texts: Vec<String> = app
        .world_mut()
        .query::<&Text>()
        .iter(app.world())
        .map(|t| t.0.clone())
        .collect();
    assert!(texts.iter().any(|t| t == "128"), "final score shown: {texts:?}");
    assert!(texts.iter().any(|t| t == "OOPS!"));

    press_button::<TryAgainButton>(&mut app);
    app.update();
    app.update();

    assert_eq!(state(&app), GameState::Playing);
    assert_eq!(count::<GameOverRoot>(&mut app), 0);
}
