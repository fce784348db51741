use super::*;

/// Spawn the title overlay.
///
/// ```text
/// ┌──────────────────────┐
/// │    DuoDuo Merge      │
/// │                      │
/// │      [ PLAY ]        │
/// │                      │
/// │ Drop & merge items!  │
/// └──────────────────────┘
/// ```
pub(super) fn setup_title(mut commands: Commands) {
    commands
        .spawn((overlay_node(Color::srgba(0.0, 0.0, 0.0, 0.2)), TitleRoot))
        .with_children(|root| {
            root.spawn(Node {
                flex_direction: FlexDirection::Row,
                column_gap: Val::Px(8.0),
                ..default()
            })
            .with_children(|row| {
                row.spawn((
                    Text::new("DuoDuo"),
                    TextFont {
                        font_size: 48.0,
                        ..default()
                    },
                    TextColor(title_red()),
                ));
                row.spawn((
                    Text::new("Merge"),
                    TextFont {
                        font_size: 48.0,
                        ..default()
                    },
                    TextColor(title_teal()),
                ));
            });

            spacer(root, 36.0);
            spawn_button(root, "PLAY", 32.0, PlayButton);
            spacer(root, 36.0);

            root.spawn((
                Text::new("Drop & merge the cute items!"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(card_label()),
            ));
        });
}

pub(super) fn cleanup_title(mut commands: Commands, query: Query<Entity, With<TitleRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

pub(super) fn title_button_system(
    buttons: Query<(&Interaction, &Children), (Changed<Interaction>, With<PlayButton>)>,
    mut btn_text: Query<&mut TextColor>,
    keys: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    start_button_logic(&buttons, &mut btn_text, &keys, &mut next_state);
}
