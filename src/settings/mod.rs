//! Settings, types and defaults.
//!
//! Settings live in a RON file under `data/settings/` and are hot-reloadable
//! through the shared RON watcher (see `ron::setup_ron_watcher`). Every field
//! carries a serde default so partially written files still parse.

use bevy::prelude::{KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Locomotion and vertical-motion tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementSettings {
    #[serde(default = "MovementSettings::default_speed")]
    pub speed: f32, // Walk speed toward a tapped destination, units/s.
    #[serde(default = "MovementSettings::default_roll_time")]
    pub roll_time: f32, // How long a roll lasts, seconds.
    #[serde(default = "MovementSettings::default_roll_speed")]
    pub roll_speed: f32, // Forced movement speed while rolling.
    #[serde(default = "MovementSettings::default_roll_stamina_cost")]
    pub roll_stamina_cost: f32, // Stamina deducted when a roll starts.
    #[serde(default = "MovementSettings::default_jump_speed")]
    pub jump_speed: f32, // Upward impulse applied on a ground jump.
    #[serde(default = "MovementSettings::default_gravity")]
    pub gravity: f32, // Downward acceleration, units/s^2.
    #[serde(default = "MovementSettings::default_wall_jump_cost")]
    pub wall_jump_cost: f32, // Stamina deducted when a wall jump fires.
    #[serde(default = "MovementSettings::default_wall_jump_factor")]
    pub wall_jump_factor: f32, // Multiplier on jump_speed for the wall-jump impulse.
    #[serde(default = "MovementSettings::default_death_time")]
    pub death_time: f32, // Seconds the death sequence suspends control.
}

impl MovementSettings {
    fn default_speed() -> f32 { 4.0 }
    fn default_roll_time() -> f32 { 0.4 }
    fn default_roll_speed() -> f32 { 8.0 }
    fn default_roll_stamina_cost() -> f32 { 40.0 }
    fn default_jump_speed() -> f32 { 12.0 }
    fn default_gravity() -> f32 { 30.0 }
    fn default_wall_jump_cost() -> f32 { 25.0 }
    fn default_wall_jump_factor() -> f32 { 0.75 }
    fn default_death_time() -> f32 { 2.0 }
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            speed: Self::default_speed(),
            roll_time: Self::default_roll_time(),
            roll_speed: Self::default_roll_speed(),
            roll_stamina_cost: Self::default_roll_stamina_cost(),
            jump_speed: Self::default_jump_speed(),
            gravity: Self::default_gravity(),
            wall_jump_cost: Self::default_wall_jump_cost(),
            wall_jump_factor: Self::default_wall_jump_factor(),
            death_time: Self::default_death_time(),
        }
    }
}

/// Stamina pool tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaminaSettings {
    #[serde(default = "StaminaSettings::default_max_hearts")]
    pub max_hearts: u32, // Heart slots drawn on the HUD; lost one per death.
    #[serde(default = "StaminaSettings::default_regen_per_second")]
    pub regen_per_second: f32, // Passive stamina regeneration. 0 disables.
}

impl StaminaSettings {
    fn default_max_hearts() -> u32 { 3 }
    fn default_regen_per_second() -> f32 { 10.0 }
}

impl Default for StaminaSettings {
    fn default() -> Self {
        Self {
            max_hearts: Self::default_max_hearts(),
            regen_per_second: Self::default_regen_per_second(),
        }
    }
}

/// Scalar coefficients fed to the Blinn-Phong pass each frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LightingSettings {
    #[serde(default = "LightingSettings::default_ambient_albedo")]
    pub ambient_albedo: f32,
    #[serde(default = "LightingSettings::default_diffuse_albedo")]
    pub diffuse_albedo: f32,
    #[serde(default = "LightingSettings::default_specular_albedo")]
    pub specular_albedo: f32,
    #[serde(default = "LightingSettings::default_attenuation_factor")]
    pub attenuation_factor: f32,
    #[serde(default = "LightingSettings::default_specular_exponent")]
    pub specular_exponent: f32,
}

impl LightingSettings {
    fn default_ambient_albedo() -> f32 { 1.0 }
    fn default_diffuse_albedo() -> f32 { 1.0 }
    fn default_specular_albedo() -> f32 { 1.0 }
    fn default_attenuation_factor() -> f32 { 1.0 }
    fn default_specular_exponent() -> f32 { 25.0 }
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            ambient_albedo: Self::default_ambient_albedo(),
            diffuse_albedo: Self::default_diffuse_albedo(),
            specular_albedo: Self::default_specular_albedo(),
            attenuation_factor: Self::default_attenuation_factor(),
            specular_exponent: Self::default_specular_exponent(),
        }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Map of action names to key identifiers (editable by user)
}

impl ControlsSettings {
    fn default_keybinds() -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("jump".to_string(), "Z".to_string());
        m.insert("roll".to_string(), "X".to_string());
        m.insert("confirm".to_string(), "Enter".to_string());
        m.insert("choice_left".to_string(), "Left".to_string());
        m.insert("choice_right".to_string(), "Right".to_string());
        m
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            keybinds: Self::default_keybinds(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub movement: MovementSettings,
    #[serde(default)]
    pub stamina: StaminaSettings,
    #[serde(default)]
    pub lighting: LightingSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
}

impl Settings {
    #[must_use]
    pub fn defaults() -> Self {
        Settings::default()
    }

    /// Resolve a bound action name to a `KeyCode`, falling back to `default`
    /// when the binding is missing or does not name a known key.
    #[must_use]
    pub fn key_for(&self, action: &str, default: KeyCode) -> KeyCode {
        self.controls
            .keybinds
            .get(action)
            .and_then(|s| Self::keycode_from_str(s))
            .unwrap_or(default)
    }

    /// Convert a string key identifier (e.g. from `controls.keybinds`) into a
    /// `KeyCode` usable with Bevy's input system. Single letters and digits
    /// map directly; a handful of named keys are recognized.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        let s = name.to_ascii_uppercase();
        if s.len() == 1 {
            let c = s.bytes().next()?;
            if c.is_ascii_uppercase() {
                return LETTER_KEYS.get((c - b'A') as usize).copied();
            }
            if c.is_ascii_digit() {
                return DIGIT_KEYS.get((c - b'0') as usize).copied();
            }
        }

        Some(match s.as_str() {
            "SPACE" => KeyCode::Space,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "TAB" => KeyCode::Tab,
            "BACKSPACE" | "BACK" => KeyCode::Backspace,
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,
            _ => return None,
        })
    }
}

const LETTER_KEYS: [KeyCode; 26] = [
    KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
    KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
    KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
    KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
    KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
    KeyCode::KeyZ,
];

const DIGIT_KEYS: [KeyCode; 10] = [
    KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3,
    KeyCode::Digit4, KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7,
    KeyCode::Digit8, KeyCode::Digit9,
];

pub mod loader;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keybind_strings_resolve() {
        assert_eq!(Settings::keycode_from_str("z"), Some(KeyCode::KeyZ));
        assert_eq!(Settings::keycode_from_str("7"), Some(KeyCode::Digit7));
        assert_eq!(Settings::keycode_from_str("Enter"), Some(KeyCode::Enter));
        assert_eq!(Settings::keycode_from_str("plugh"), None);
    }

    #[test]
    fn missing_binding_falls_back() {
        let settings = Settings::defaults();
        assert_eq!(settings.key_for("jump", KeyCode::Space), KeyCode::KeyZ);
        assert_eq!(settings.key_for("unbound", KeyCode::F5), KeyCode::F5);
    }
}
