//! Movement configuration parsing from movement.toml files

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::game::input::Key;

/// Key bindings for the locomotion actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_sprint_key")]
    pub sprint: String,
    #[serde(default = "default_scale_key")]
    pub scale: String,
    #[serde(default = "default_crouch_key")]
    pub crouch: String,
    #[serde(default = "default_jump_key")]
    pub jump: String,
}

fn default_sprint_key() -> String {
    "LeftShift".to_string()
}

fn default_scale_key() -> String {
    "E".to_string()
}

fn default_crouch_key() -> String {
    "C".to_string()
}

fn default_jump_key() -> String {
    "Space".to_string()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            sprint: default_sprint_key(),
            scale: default_scale_key(),
            crouch: default_crouch_key(),
            jump: default_jump_key(),
        }
    }
}

impl KeyBindings {
    /// Resolves a physical key name to the locomotion action bound to it.
    pub fn resolve(&self, name: &str) -> Option<Key> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(&self.sprint) {
            Some(Key::Sprint)
        } else if name.eq_ignore_ascii_case(&self.scale) {
            Some(Key::Scale)
        } else if name.eq_ignore_ascii_case(&self.crouch) {
            Some(Key::Crouch)
        } else if name.eq_ignore_ascii_case(&self.jump) {
            Some(Key::Jump)
        } else {
            None
        }
    }
}

/// Locomotion tunables. Immutable once handed to a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Walk speed at full size
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f32,
    /// Sprint speed at full size
    #[serde(default = "default_sprint_speed")]
    pub sprint_speed: f32,
    /// Walk speed while shrunk
    #[serde(default = "default_small_walk_speed")]
    pub small_walk_speed: f32,
    /// Sprint speed while shrunk
    #[serde(default = "default_small_sprint_speed")]
    pub small_sprint_speed: f32,
    #[serde(default = "default_crouch_speed")]
    pub crouch_speed: f32,

    /// Seconds for a full scale toggle
    #[serde(default = "default_scale_duration")]
    pub scale_duration: f32,
    /// Seconds for a crouch or uncrouch
    #[serde(default = "default_crouch_duration")]
    pub crouch_duration: f32,
    #[serde(default = "default_slide_duration")]
    pub slide_duration: f32,

    #[serde(default = "default_jump_force")]
    pub jump_force: f32,
    #[serde(default = "default_small_jump_force")]
    pub small_jump_force: f32,
    #[serde(default = "default_jump_cooldown")]
    pub jump_cooldown: f32,

    /// Fraction of the ground force available while airborne
    #[serde(default = "default_air_multiplier")]
    pub air_multiplier: f32,
    /// Extra gravity applied while airborne, as a multiple of world gravity
    #[serde(default = "default_gravity_multiplier")]
    pub gravity_multiplier: f32,
    /// Linear drag while grounded
    #[serde(default = "default_drag")]
    pub drag: f32,

    #[serde(default = "default_big_scale")]
    pub big_scale: [f32; 3],
    #[serde(default = "default_small_scale")]
    pub small_scale: [f32; 3],
    /// Crouched height as a fraction of standing height
    #[serde(default = "default_crouch_height_factor")]
    pub crouch_height_factor: f32,

    /// Collider height at unit scale
    #[serde(default = "default_standing_height")]
    pub standing_height: f32,
    /// Collider width/depth at unit scale
    #[serde(default = "default_body_width")]
    pub body_width: f32,
    #[serde(default = "default_body_mass")]
    pub body_mass: f32,

    /// Clamp horizontal velocity to the current move speed each decision tick.
    #[serde(default)]
    pub clamp_horizontal_speed: bool,

    #[serde(default)]
    pub keys: KeyBindings,
}

fn default_walk_speed() -> f32 {
    7.0
}

fn default_sprint_speed() -> f32 {
    10.0
}

fn default_small_walk_speed() -> f32 {
    4.2
}

fn default_small_sprint_speed() -> f32 {
    6.0
}

fn default_crouch_speed() -> f32 {
    3.5
}

fn default_scale_duration() -> f32 {
    1.0
}

fn default_crouch_duration() -> f32 {
    0.2
}

fn default_slide_duration() -> f32 {
    0.75
}

fn default_jump_force() -> f32 {
    7.0
}

fn default_small_jump_force() -> f32 {
    4.0
}

fn default_jump_cooldown() -> f32 {
    0.25
}

fn default_air_multiplier() -> f32 {
    0.4
}

fn default_gravity_multiplier() -> f32 {
    1.5
}

fn default_drag() -> f32 {
    5.0
}

fn default_big_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_small_scale() -> [f32; 3] {
    [0.4, 0.4, 0.4]
}

fn default_crouch_height_factor() -> f32 {
    0.7
}

fn default_standing_height() -> f32 {
    2.0
}

fn default_body_width() -> f32 {
    1.0
}

fn default_body_mass() -> f32 {
    1.0
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: default_walk_speed(),
            sprint_speed: default_sprint_speed(),
            small_walk_speed: default_small_walk_speed(),
            small_sprint_speed: default_small_sprint_speed(),
            crouch_speed: default_crouch_speed(),
            scale_duration: default_scale_duration(),
            crouch_duration: default_crouch_duration(),
            slide_duration: default_slide_duration(),
            jump_force: default_jump_force(),
            small_jump_force: default_small_jump_force(),
            jump_cooldown: default_jump_cooldown(),
            air_multiplier: default_air_multiplier(),
            gravity_multiplier: default_gravity_multiplier(),
            drag: default_drag(),
            big_scale: default_big_scale(),
            small_scale: default_small_scale(),
            crouch_height_factor: default_crouch_height_factor(),
            standing_height: default_standing_height(),
            body_width: default_body_width(),
            body_mass: default_body_mass(),
            clamp_horizontal_speed: false,
            keys: KeyBindings::default(),
        }
    }
}

impl MovementConfig {
    /// Load movement configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: Self =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects tunables the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("scale_duration", self.scale_duration),
            ("crouch_duration", self.crouch_duration),
            ("slide_duration", self.slide_duration),
            ("standing_height", self.standing_height),
            ("body_width", self.body_width),
            ("body_mass", self.body_mass),
            ("crouch_height_factor", self.crouch_height_factor),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {}", value),
                });
            }
        }

        let non_negative = [
            ("walk_speed", self.walk_speed),
            ("sprint_speed", self.sprint_speed),
            ("small_walk_speed", self.small_walk_speed),
            ("small_sprint_speed", self.small_sprint_speed),
            ("crouch_speed", self.crouch_speed),
            ("jump_force", self.jump_force),
            ("small_jump_force", self.small_jump_force),
            ("jump_cooldown", self.jump_cooldown),
            ("air_multiplier", self.air_multiplier),
            ("gravity_multiplier", self.gravity_multiplier),
            ("drag", self.drag),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must not be negative, got {}", value),
                });
            }
        }

        for (field, scale) in [("big_scale", self.big_scale), ("small_scale", self.small_scale)] {
            if scale.iter().any(|c| !(*c > 0.0)) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("components must be positive, got {:?}", scale),
                });
            }
        }

        Ok(())
    }

    /// Walk speed for the current size.
    pub fn walk_speed_for(&self, is_small: bool) -> f32 {
        if is_small {
            self.small_walk_speed
        } else {
            self.walk_speed
        }
    }

    /// Sprint speed for the current size.
    pub fn sprint_speed_for(&self, is_small: bool) -> f32 {
        if is_small {
            self.small_sprint_speed
        } else {
            self.sprint_speed
        }
    }

    pub fn jump_force_for(&self, is_small: bool) -> f32 {
        if is_small {
            self.small_jump_force
        } else {
            self.jump_force
        }
    }
}

/// Errors that can occur when loading movement configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
