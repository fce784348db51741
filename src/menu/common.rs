use bevy::prelude::*;

pub(super) fn button_bg() -> Color {
    Color::srgb_u8(0xF4, 0x72, 0xB6)
}
pub(super) fn button_border() -> Color {
    Color::WHITE
}
pub(super) fn button_text() -> Color {
    Color::WHITE
}
pub(super) fn button_hover_text() -> Color {
    Color::srgb_u8(0xFD, 0xF2, 0xF8)
}
pub(super) fn title_red() -> Color {
    Color::srgb_u8(0xFF, 0x6B, 0x6B)
}
pub(super) fn title_teal() -> Color {
    Color::srgb_u8(0x4E, 0xCD, 0xC4)
}
pub(super) fn card_border() -> Color {
    Color::srgb_u8(0xFB, 0xCF, 0xE8)
}
pub(super) fn card_label() -> Color {
    Color::srgb_u8(0xF4, 0x72, 0xB6)
}
pub(super) fn card_value() -> Color {
    Color::srgb_u8(0xEC, 0x48, 0x99)
}

pub(super) fn spacer(parent: &mut ChildSpawnerCommands<'_>, px: f32) {
    parent.spawn(Node {
        height: Val::Px(px),
        ..default()
    });
}

/// Full-arena overlay node with the given backdrop.
pub(super) fn overlay_node(backdrop: Color) -> (Node, BackgroundColor, ZIndex) {
    (
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            flex_direction: FlexDirection::Column,
            position_type: PositionType::Absolute,
            left: Val::Px(0.0),
            top: Val::Px(0.0),
            ..default()
        },
        BackgroundColor(backdrop),
        ZIndex(300),
    )
}

/// Pink pill button with a white label; `marker` identifies it.
pub(super) fn spawn_button(
    parent: &mut ChildSpawnerCommands<'_>,
    label: &str,
    font_size: f32,
    marker: impl Component,
) {
    parent
        .spawn((
            Button,
            Node {
                padding: UiRect::axes(Val::Px(36.0), Val::Px(16.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(4.0)),
                ..default()
            },
            BackgroundColor(button_bg()),
            BorderColor::all(button_border()),
            marker,
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font_size,
                    ..default()
                },
                TextColor(button_text()),
            ));
        });
}
