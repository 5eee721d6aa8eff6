use serde::Serialize;

/// Classification of what the character is doing this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    #[default]
    Walking,
    Sprinting,
    Crouching,
    Scaling,
    Jumping,
    Sliding,
}

impl MotionState {
    /// States during which the actuator withholds ground drag.
    pub fn suspends_drag(self) -> bool {
        matches!(self, MotionState::Scaling | MotionState::Sliding)
    }
}

/// Exclusivity guards for the decision rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuntimeFlags {
    /// Persistent result of the last completed scale toggle
    pub is_small: bool,
    pub is_scaling: bool,
    pub is_crouching: bool,
    pub is_sliding: bool,
    pub ready_to_jump: bool,
}

impl Default for RuntimeFlags {
    fn default() -> Self {
        Self {
            is_small: false,
            is_scaling: false,
            is_crouching: false,
            is_sliding: false,
            ready_to_jump: true,
        }
    }
}

impl RuntimeFlags {
    /// True while a scale toggle or slide locks out every other decision.
    pub fn is_locked_out(&self) -> bool {
        self.is_scaling || self.is_sliding
    }
}
