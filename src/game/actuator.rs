use nalgebra::Vector3;

use super::body::{CharacterBody, ForceMode, Orientation};
use super::constants::locomotion as locomotion_consts;
use super::constants::physics as consts;
use super::motion_state::MotionState;
use crate::config::MovementConfig;

/// Decision state the fixed tick reads. Nothing here is written back.
#[derive(Debug, Clone, Copy)]
pub struct ActuatorInput {
    pub state: MotionState,
    pub grounded: bool,
    pub move_speed: f32,
    pub horizontal: f32,
    pub vertical: f32,
    pub orientation: Orientation,
    pub gravity: Vector3<f32>,
    pub mass: f32,
}

/// Per-fixed-tick actuation for the character body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForcePlan {
    pub drag: f32,
    /// Continuous horizontal movement force
    pub move_force: Option<Vector3<f32>>,
    /// Continuous extra gravity while airborne
    pub extra_gravity: Option<Vector3<f32>>,
}

/// Movement direction from the input axes on the horizontal look basis.
pub fn move_direction(orientation: &Orientation, horizontal: f32, vertical: f32) -> Option<Vector3<f32>> {
    let direction = orientation.forward * vertical + orientation.right * horizontal;
    let length = direction.norm();
    if length > consts::EPSILON {
        Some(direction / length)
    } else {
        None
    }
}

/// Build drag, movement force and extra gravity for one fixed tick.
pub fn build_force_plan(config: &MovementConfig, input: ActuatorInput) -> ForcePlan {
    let ground_control = input.grounded && !input.state.suspends_drag();
    let drag = if ground_control { config.drag } else { 0.0 };

    let extra_gravity = if input.grounded {
        None
    } else {
        Some(input.gravity * config.gravity_multiplier * input.mass)
    };

    let move_force =
        move_direction(&input.orientation, input.horizontal, input.vertical).map(|direction| {
            let magnitude = if input.grounded || input.state == MotionState::Scaling {
                locomotion_consts::FORCE_PER_SPEED * input.move_speed
            } else {
                locomotion_consts::FORCE_PER_SPEED * config.air_multiplier * input.move_speed
            };
            direction * magnitude
        });

    ForcePlan {
        drag,
        move_force,
        extra_gravity,
    }
}

/// Applies a force plan to the body.
pub fn apply_force_plan<B: CharacterBody + ?Sized>(body: &mut B, plan: &ForcePlan) {
    body.set_drag(plan.drag);
    if let Some(force) = plan.move_force {
        body.apply_force(force, ForceMode::Force);
    }
    if let Some(gravity) = plan.extra_gravity {
        body.apply_force(gravity, ForceMode::Force);
    }
}
