//! HUD and textbox dialog.
//!
//! The HUD mirrors the stamina resource: a row of heart icons, a stamina bar
//! whose filled width tracks the pool percentage, a potion glow, and an
//! action label. The textbox is a small data-driven dialog machine: instead
//! of result callbacks, an entry can carry a `FollowUp` describing what the
//! confirm key does next, which keeps multi-step dialogs (the door's
//! leave/stay confirmation) testable without any UI spawned.

use crate::player::Player;
use crate::settings::Settings;
use crate::stamina::Stamina;
use bevy::app::AppExit;
use bevy::prelude::*;

/// What pressing confirm does after the current entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowUp {
    /// Door prompt acknowledged: present the leave/stay choice.
    DoorChoice,
    /// Leave/stay answered: option 0 quits the application, option 1 clears
    /// the textbox.
    DoorResolve,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TextboxContent {
    Message(String),
    Choice(Vec<String>),
}

#[derive(Clone, Debug)]
pub struct TextboxEntry {
    pub speaker: String,
    pub content: TextboxContent,
    /// Blocking entries capture input: movement, rolling and jumping are
    /// suppressed until the entry is dismissed.
    pub blocking: bool,
    pub follow_up: Option<FollowUp>,
}

/// Result of advancing the textbox with the confirm key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextboxOutcome {
    None,
    /// The player confirmed leaving; the caller should exit the app.
    Quit,
}

/// The one live dialog entry, if any. Creating a new entry replaces the
/// current one.
#[derive(Resource, Default)]
pub struct Textbox {
    current: Option<TextboxEntry>,
    selected: usize,
}

impl Textbox {
    /// Show a plain, non-blocking message.
    pub fn create(&mut self, speaker: &str, text: &str) {
        self.current = Some(TextboxEntry {
            speaker: speaker.to_string(),
            content: TextboxContent::Message(text.to_string()),
            blocking: false,
            follow_up: None,
        });
        self.selected = 0;
    }

    /// Show a blocking message, optionally chaining a follow-up on confirm.
    pub fn create_blocking(&mut self, speaker: &str, text: &str, follow_up: Option<FollowUp>) {
        self.current = Some(TextboxEntry {
            speaker: speaker.to_string(),
            content: TextboxContent::Message(text.to_string()),
            blocking: true,
            follow_up,
        });
        self.selected = 0;
    }

    /// Show a blocking choice between `options`.
    pub fn create_choice(&mut self, speaker: &str, options: &[&str], follow_up: FollowUp) {
        self.current = Some(TextboxEntry {
            speaker: speaker.to_string(),
            content: TextboxContent::Choice(options.iter().map(ToString::to_string).collect()),
            blocking: true,
            follow_up: Some(follow_up),
        });
        self.selected = 0;
    }

    /// Dismiss the current entry.
    pub fn close(&mut self) {
        self.current = None;
    }

    /// Dismiss everything and reset selection.
    pub fn clear(&mut self) {
        self.current = None;
        self.selected = 0;
    }

    #[must_use]
    pub fn current(&self) -> Option<&TextboxEntry> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn showing_blocking(&self) -> bool {
        self.current.as_ref().is_some_and(|e| e.blocking)
    }

    /// Move the choice cursor. No-op on message entries.
    pub fn select_delta(&mut self, delta: i32) {
        let Some(TextboxEntry {
            content: TextboxContent::Choice(options),
            ..
        }) = &self.current
        else {
            return;
        };
        let count = options.len() as i32;
        if count > 0 {
            self.selected = (self.selected as i32 + delta).rem_euclid(count) as usize;
        }
    }

    /// Confirm the current entry: dismiss it and run its follow-up.
    pub fn advance(&mut self) -> TextboxOutcome {
        let Some(entry) = self.current.take() else {
            return TextboxOutcome::None;
        };
        let answer = self.selected;
        self.selected = 0;
        match entry.follow_up {
            Some(FollowUp::DoorChoice) => {
                self.create_choice(&entry.speaker, &["Leave", "Stay"], FollowUp::DoorResolve);
                TextboxOutcome::None
            }
            Some(FollowUp::DoorResolve) => {
                if answer == 0 {
                    TextboxOutcome::Quit
                } else {
                    self.clear();
                    TextboxOutcome::None
                }
            }
            None => TextboxOutcome::None,
        }
    }
}

// --- HUD ---

#[derive(Resource)]
pub struct HudAssets {
    pub font: Handle<Font>,
    pub heart_full: Handle<Image>,
    pub heart_empty: Handle<Image>,
}

#[derive(Component)]
pub struct HeartIcon(pub u32);

#[derive(Component)]
pub struct StaminaBarFill;

#[derive(Component)]
pub struct PotionGlow;

#[derive(Component)]
pub struct ActionLabel;

#[derive(Component)]
pub struct TextboxPanel;

#[derive(Component)]
pub struct TextboxText;

const STAMINA_BAR_WIDTH: f32 = 316.0;

/// Spawn the HUD hierarchy: hearts row, stamina bar, action label and the
/// (initially hidden) textbox panel.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_hud(mut commands: Commands, asset_server: Res<AssetServer>, settings: Res<Settings>) {
    let assets = HudAssets {
        font: asset_server.load("fonts/OpenSans.ttf"),
        heart_full: asset_server.load("textures/heart_full.png"),
        heart_empty: asset_server.load("textures/heart_empty.png"),
    };

    // hearts row, top-left
    commands
        .spawn(NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(5.0),
                top: Val::Px(5.0),
                flex_direction: FlexDirection::Row,
                column_gap: Val::Px(4.0),
                ..default()
            },
            ..default()
        })
        .with_children(|row| {
            for i in 0..settings.stamina.max_hearts {
                row.spawn((
                    ImageBundle {
                        style: Style {
                            width: Val::Px(32.0),
                            height: Val::Px(32.0),
                            ..default()
                        },
                        image: UiImage::new(assets.heart_full.clone()),
                        ..default()
                    },
                    HeartIcon(i),
                ));
            }
        });

    // potion glow behind the stamina bar
    commands.spawn((
        NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(60.0),
                width: Val::Px(360.0),
                height: Val::Px(64.0),
                ..default()
            },
            background_color: Color::srgba(0.9, 0.8, 0.2, 0.35).into(),
            visibility: Visibility::Hidden,
            ..default()
        },
        PotionGlow,
    ));

    // stamina bar: dark background with a bright proportional fill
    commands
        .spawn(NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(5.0),
                top: Val::Px(84.0),
                width: Val::Px(STAMINA_BAR_WIDTH + 4.0),
                height: Val::Px(24.0),
                padding: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            background_color: Color::srgb(0.15, 0.15, 0.15).into(),
            ..default()
        })
        .with_children(|bar| {
            bar.spawn((
                NodeBundle {
                    style: Style {
                        width: Val::Px(STAMINA_BAR_WIDTH),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                    background_color: Color::srgb(0.2, 0.8, 0.3).into(),
                    ..default()
                },
                StaminaBarFill,
            ));
        });

    // action label, bottom-right
    commands.spawn((
        TextBundle {
            text: Text::from_section(
                "",
                TextStyle {
                    font: assets.font.clone(),
                    font_size: 28.0,
                    color: Color::WHITE,
                },
            ),
            style: Style {
                position_type: PositionType::Absolute,
                right: Val::Px(20.0),
                bottom: Val::Px(20.0),
                ..default()
            },
            ..default()
        },
        ActionLabel,
    ));

    // textbox panel, bottom-center, hidden until an entry exists
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    left: Val::Percent(15.0),
                    right: Val::Percent(15.0),
                    bottom: Val::Px(40.0),
                    padding: UiRect::all(Val::Px(12.0)),
                    ..default()
                },
                background_color: Color::srgba(0.0, 0.0, 0.0, 0.8).into(),
                visibility: Visibility::Hidden,
                ..default()
            },
            TextboxPanel,
        ))
        .with_children(|panel| {
            panel.spawn((
                TextBundle {
                    text: Text::from_section(
                        "",
                        TextStyle {
                            font: assets.font.clone(),
                            font_size: 22.0,
                            color: Color::WHITE,
                        },
                    ),
                    ..default()
                },
                TextboxText,
            ));
        });

    commands.insert_resource(assets);
}

/// Swap heart icons between full and empty to match the current heart count.
#[allow(clippy::needless_pass_by_value)]
pub fn update_hearts(
    stamina: Res<Stamina>,
    assets: Res<HudAssets>,
    mut hearts: Query<(&HeartIcon, &mut UiImage)>,
) {
    for (icon, mut image) in &mut hearts {
        let texture = if icon.0 < stamina.hearts() {
            assets.heart_full.clone()
        } else {
            assets.heart_empty.clone()
        };
        if image.texture != texture {
            image.texture = texture;
        }
    }
}

/// Size the stamina fill proportionally and toggle the potion glow.
#[allow(clippy::needless_pass_by_value)]
pub fn update_stamina_bar(
    stamina: Res<Stamina>,
    mut fill: Query<&mut Style, With<StaminaBarFill>>,
    mut glow: Query<&mut Visibility, With<PotionGlow>>,
) {
    if let Ok(mut style) = fill.get_single_mut() {
        let fraction = (stamina.amount() / crate::stamina::MAX_STAMINA).clamp(0.0, 1.0);
        style.width = Val::Px(STAMINA_BAR_WIDTH * fraction);
    }
    if let Ok(mut visibility) = glow.get_single_mut() {
        *visibility = if stamina.potion_active {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// Show what the action button would do right now: advance blocking text,
/// or roll when one is affordable.
#[allow(clippy::needless_pass_by_value)]
pub fn update_action_label(
    stamina: Res<Stamina>,
    settings: Res<Settings>,
    textbox: Res<Textbox>,
    players: Query<&Player>,
    mut labels: Query<&mut Text, With<ActionLabel>>,
) {
    let Ok(mut text) = labels.get_single_mut() else {
        return;
    };
    let rolling = players.get_single().is_ok_and(Player::rolling);
    let label = if textbox.showing_blocking() {
        "Next"
    } else if !rolling && stamina.amount() >= settings.movement.roll_stamina_cost {
        "Roll"
    } else {
        ""
    };
    if text.sections[0].value != label {
        text.sections[0].value = label.to_string();
    }
}

/// Render the current textbox entry into the panel.
#[allow(clippy::needless_pass_by_value)]
pub fn update_textbox(
    textbox: Res<Textbox>,
    mut panels: Query<&mut Visibility, With<TextboxPanel>>,
    mut texts: Query<&mut Text, With<TextboxText>>,
) {
    let Ok(mut visibility) = panels.get_single_mut() else {
        return;
    };
    let Ok(mut text) = texts.get_single_mut() else {
        return;
    };
    match textbox.current() {
        None => *visibility = Visibility::Hidden,
        Some(entry) => {
            *visibility = Visibility::Visible;
            let body = match &entry.content {
                TextboxContent::Message(message) => message.clone(),
                TextboxContent::Choice(options) => options
                    .iter()
                    .enumerate()
                    .map(|(i, option)| {
                        if i == textbox.selected() {
                            format!("> {option}")
                        } else {
                            format!("  {option}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("   "),
            };
            text.sections[0].value = format!("{}: {}", entry.speaker, body);
        }
    }
}

/// Drive the textbox with the confirm key and choice arrows.
#[allow(clippy::needless_pass_by_value)]
pub fn textbox_input(
    settings: Res<Settings>,
    keys: Res<ButtonInput<KeyCode>>,
    mut textbox: ResMut<Textbox>,
    mut exit: EventWriter<AppExit>,
) {
    if textbox.current().is_none() {
        return;
    }
    if keys.just_pressed(settings.key_for("choice_left", KeyCode::ArrowLeft)) {
        textbox.select_delta(-1);
    }
    if keys.just_pressed(settings.key_for("choice_right", KeyCode::ArrowRight)) {
        textbox.select_delta(1);
    }
    if keys.just_pressed(settings.key_for("confirm", KeyCode::Enter))
        && textbox.advance() == TextboxOutcome::Quit
    {
        exit.send(AppExit::Success);
    }
}
