//! Screen flow: `GameState` definition, title screen and game-over overlay.
//!
//! ## States
//!
//! | State      | Description                                        |
//! |------------|----------------------------------------------------|
//! | `Title`    | Initial state; Play button over the empty arena    |
//! | `Playing`  | A session is running; all gameplay systems active  |
//! | `GameOver` | World frozen under the "OOPS!" overlay             |
//!
//! ## Systems (registered by `MenuPlugin`)
//!
//! | System                    | Schedule                  | Purpose                    |
//! |---------------------------|---------------------------|----------------------------|
//! | `setup_title`             | `OnEnter(Title)`          | Spawn title overlay        |
//! | `cleanup_title`           | `OnExit(Title)`           | Despawn title overlay      |
//! | `title_button_system`     | `Update / in Title`       | Handle Play                |
//! | `setup_game_over`         | `OnEnter(GameOver)`       | Spawn final-score overlay  |
//! | `cleanup_game_over`       | `OnExit(GameOver)`        | Despawn final-score overlay|
//! | `game_over_button_system` | `Update / in GameOver`    | Handle Try Again           |
//!
//! Entering `Playing` from either overlay starts a fresh session (see
//! [`crate::turn::start_session`]).

use bevy::prelude::*;

mod common;
mod game_over;
mod title;

use common::*;
use game_over::{cleanup_game_over, game_over_button_system, setup_game_over};
use title::{cleanup_title, setup_title, title_button_system};

/// Top-level application state machine.
///
/// Gameplay systems run under `.run_if(in_state(GameState::Playing))`, so
/// drops, merges and game-over checks are inactive behind both overlays.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Title overlay; shown on startup.
    #[default]
    Title,
    /// Active session.
    Playing,
    /// An item settled above the deadline; final-score overlay shown.
    GameOver,
}

/// Root node of the title overlay.
#[derive(Component)]
pub struct TitleRoot;

/// Tags the "PLAY" button.
#[derive(Component)]
pub struct PlayButton;

/// Root node of the game-over overlay.
#[derive(Component)]
pub struct GameOverRoot;

/// Tags the "TRY AGAIN" button.
#[derive(Component)]
pub struct TryAgainButton;

/// Registers `GameState` and both overlays.
///
/// Must be added before any plugin that gates systems on `GameState`.
pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_systems(OnEnter(GameState::Title), setup_title)
            .add_systems(OnExit(GameState::Title), cleanup_title)
            .add_systems(
                Update,
                title_button_system.run_if(in_state(GameState::Title)),
            )
            .add_systems(OnEnter(GameState::GameOver), setup_game_over)
            .add_systems(OnExit(GameState::GameOver), cleanup_game_over)
            .add_systems(
                Update,
                game_over_button_system.run_if(in_state(GameState::GameOver)),
            );
    }
}

/// Request a new session when a button is pressed or Enter/Space is hit.
///
/// Shared by both overlays; the hover tint is applied to the button's label.
fn start_button_logic<B: Component>(
    buttons: &Query<(&Interaction, &Children), (Changed<Interaction>, With<B>)>,
    btn_text: &mut Query<&mut TextColor>,
    keys: &ButtonInput<KeyCode>,
    next_state: &mut NextState<GameState>,
) {
    let wants_start = keys.just_pressed(KeyCode::Enter)
        || keys.just_pressed(KeyCode::Space)
        || buttons.iter().any(|(i, _)| *i == Interaction::Pressed);

    if wants_start {
        next_state.set(GameState::Playing);
        return;
    }

    for (interaction, children) in buttons.iter() {
        let color = match interaction {
            Interaction::Hovered => button_hover_text(),
            Interaction::None => button_text(),
            Interaction::Pressed => continue,
        };
        for child in children.iter() {
            if let Ok(mut text_color) = btn_text.get_mut(child) {
                *text_color = TextColor(color);
            }
        }
    }
}
