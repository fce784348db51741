use super::*;
use crate::session::GameSession;

/// Spawn the game-over overlay over the frozen arena.
///
/// Shows the final score (the session score at the moment of detection) and
/// a "TRY AGAIN" button that starts a fresh session.
pub(super) fn setup_game_over(mut commands: Commands, session: Res<GameSession>) {
    commands
        .spawn((overlay_node(Color::srgba(0.0, 0.0, 0.0, 0.6)), GameOverRoot))
        .with_children(|overlay| {
            overlay.spawn((
                Text::new("OOPS!"),
                TextFont {
                    font_size: 60.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            overlay.spawn((
                Text::new("Too high!"),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.9)),
            ));

            spacer(overlay, 28.0);

            overlay
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(24.0)),
                        border: UiRect::all(Val::Px(4.0)),
                        min_width: Val::Px(240.0),
                        ..default()
                    },
                    BackgroundColor(Color::WHITE),
                    BorderColor::all(card_border()),
                ))
                .with_children(|card| {
                    card.spawn((
                        Text::new("FINAL SCORE"),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(card_label()),
                    ));
                    card.spawn((
                        Text::new(session.score.to_string()),
                        TextFont {
                            font_size: 48.0,
                            ..default()
                        },
                        TextColor(card_value()),
                    ));
                });

            spacer(overlay, 28.0);
            spawn_button(overlay, "TRY AGAIN", 22.0, TryAgainButton);
        });
}

pub(super) fn cleanup_game_over(mut commands: Commands, query: Query<Entity, With<GameOverRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

pub(super) fn game_over_button_system(
    buttons: Query<(&Interaction, &Children), (Changed<Interaction>, With<TryAgainButton>)>,
    mut btn_text: Query<&mut TextColor>,
    keys: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    start_button_logic(&buttons, &mut btn_text, &keys, &mut next_state);
}
