//! Scripted input playback from input.toml files

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::input::MoveAxis;
use super::simulation::Simulation;
use crate::config::KeyBindings;

/// Input changes applied just before a given frame.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptStep {
    pub frame: u64,
    #[serde(default)]
    pub press: Vec<String>,
    #[serde(default)]
    pub release: Vec<String>,
    #[serde(default)]
    pub horizontal: Option<f32>,
    #[serde(default)]
    pub vertical: Option<f32>,
    /// Look direction in degrees
    #[serde(default)]
    pub yaw: Option<f32>,
    /// Drop every held key without release edges
    #[serde(default)]
    pub focus_lost: bool,
}

/// A deterministic input recording.
#[derive(Debug, Clone, Deserialize)]
pub struct InputScript {
    #[serde(default = "default_frames")]
    pub frames: u64,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    #[serde(default, rename = "step")]
    pub steps: Vec<ScriptStep>,
}

fn default_frames() -> u64 {
    120
}

fn default_frame_rate() -> f32 {
    60.0
}

impl InputScript {
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            ScriptError::Parse { source, .. } => ScriptError::Parse {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ScriptError> {
        let script: Self = toml::from_str(content).map_err(|source| ScriptError::Parse {
            path: None,
            source,
        })?;
        if !(script.frame_rate > 0.0) {
            return Err(ScriptError::InvalidFrameRate(script.frame_rate));
        }
        Ok(script)
    }

    pub fn frame_dt(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Checks every key name against the bindings before playback starts.
    pub fn validate_keys(&self, bindings: &KeyBindings) -> Result<(), ScriptError> {
        for step in &self.steps {
            for name in step.press.iter().chain(step.release.iter()) {
                if bindings.resolve(name).is_none() {
                    return Err(ScriptError::UnknownKey {
                        frame: step.frame,
                        key: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Feeds the steps scheduled for `frame` into the simulation.
    pub fn apply(&self, frame: u64, sim: &mut Simulation, bindings: &KeyBindings) {
        for step in self.steps.iter().filter(|s| s.frame == frame) {
            if step.focus_lost {
                sim.input.release_all();
            }
            for key in step.release.iter().filter_map(|name| bindings.resolve(name)) {
                sim.input.key_up(key);
            }
            for key in step.press.iter().filter_map(|name| bindings.resolve(name)) {
                sim.input.key_down(key);
            }
            if let Some(h) = step.horizontal {
                sim.input.set_axis(MoveAxis::Horizontal, h);
            }
            if let Some(v) = step.vertical {
                sim.input.set_axis(MoveAxis::Vertical, v);
            }
            if let Some(yaw) = step.yaw {
                sim.physics.set_character_yaw(yaw.to_radians());
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse input script{}: {source}", path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default())]
    Parse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
    #[error("frame_rate must be positive, got {0}")]
    InvalidFrameRate(f32),
    #[error("unknown key {key:?} at frame {frame}")]
    UnknownKey { frame: u64, key: String },
}
