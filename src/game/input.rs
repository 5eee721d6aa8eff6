//! Input sampling: key edges, held keys and the two movement axes.

use serde::{Deserialize, Serialize};

/// Locomotion actions a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Sprint,
    Scale,
    Crouch,
    Jump,
}

impl Key {
    fn index(self) -> usize {
        match self {
            Key::Sprint => 0,
            Key::Scale => 1,
            Key::Crouch => 2,
            Key::Jump => 3,
        }
    }
}

/// Named movement axes, each in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveAxis {
    /// Strafe: negative is left, positive is right
    Horizontal,
    /// Walk: negative is back, positive is forward
    Vertical,
}

/// Read-only view of the input device for one decision tick.
pub trait InputSampler {
    fn pressed_this_tick(&self, key: Key) -> bool;
    fn released_this_tick(&self, key: Key) -> bool;
    fn is_held(&self, key: Key) -> bool;
    fn axis(&self, axis: MoveAxis) -> f32;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct KeyState {
    held: bool,
    pressed: bool,
    released: bool,
}

/// Keyboard state fed by raw key events.
///
/// Events arriving between two calls to [`InputState::begin_tick`] are
/// latched as edges for exactly one decision tick, so a press and release
/// within the same frame still reports both edges.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: [KeyState; 4],
    horizontal: f32,
    vertical: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the previous tick's edges. Call once before feeding the events
    /// of a new frame.
    pub fn begin_tick(&mut self) {
        for key in &mut self.keys {
            key.pressed = false;
            key.released = false;
        }
    }

    pub fn key_down(&mut self, key: Key) {
        let state = &mut self.keys[key.index()];
        if !state.held {
            state.pressed = true;
        }
        state.held = true;
    }

    pub fn key_up(&mut self, key: Key) {
        let state = &mut self.keys[key.index()];
        if state.held {
            state.released = true;
        }
        state.held = false;
    }

    /// Drops every held key without reporting release edges, as happens when
    /// the window loses focus mid-press.
    pub fn release_all(&mut self) {
        for key in &mut self.keys {
            key.held = false;
        }
    }

    pub fn set_axis(&mut self, axis: MoveAxis, value: f32) {
        let value = if value.is_finite() {
            value.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        match axis {
            MoveAxis::Horizontal => self.horizontal = value,
            MoveAxis::Vertical => self.vertical = value,
        }
    }
}

impl InputSampler for InputState {
    fn pressed_this_tick(&self, key: Key) -> bool {
        self.keys[key.index()].pressed
    }

    fn released_this_tick(&self, key: Key) -> bool {
        self.keys[key.index()].released
    }

    fn is_held(&self, key: Key) -> bool {
        self.keys[key.index()].held
    }

    fn axis(&self, axis: MoveAxis) -> f32 {
        match axis {
            MoveAxis::Horizontal => self.horizontal,
            MoveAxis::Vertical => self.vertical,
        }
    }
}
