mod ground_sensor;
mod state_machine;
mod tasks;
mod tick_pipeline;

pub use ground_sensor::{GroundSensor, SensorSample};

use nalgebra::Vector3;
use serde::Serialize;

use super::actuator::{apply_force_plan, build_force_plan, ActuatorInput};
use super::body::{BodyGeometry, CharacterBody};
use super::constants::locomotion as locomotion_consts;
use super::input::{InputSampler, MoveAxis};
use super::motion_state::{MotionState, RuntimeFlags};
use super::transition::{TimedTask, TransitionKind, TransitionSlot};
use crate::config::MovementConfig;

/// Locomotion controller for a single character body.
///
/// The decision tick ([`CharacterController::decision_tick`]) samples the
/// sensors and input, resumes running transitions and applies the state
/// rules. The fixed tick ([`CharacterController::fixed_tick`]) only reads
/// that state and turns it into forces and drag on the body.
pub struct CharacterController {
    config: MovementConfig,
    sensor: GroundSensor,
    state: MotionState,
    flags: RuntimeFlags,
    move_speed: f32,
    geometry: BodyGeometry,
    /// Full-size scale, the reference for crouch heights
    base_scale: Vector3<f32>,
    geometry_slot: TransitionSlot,
    slide: Option<TimedTask>,
    jump_cooldown: Option<TimedTask>,
    last_sample: SensorSample,
}

/// Observable controller state after a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    pub state: MotionState,
    pub flags: RuntimeFlags,
    pub move_speed: f32,
    pub scale: [f32; 3],
    pub camera_offset: [f32; 3],
    pub grounded: bool,
    pub overhead_clear: bool,
    pub active_transition: Option<TransitionKind>,
    pub slide_remaining: Option<f32>,
    pub jump_cooldown_remaining: Option<f32>,
}

impl CharacterController {
    /// Creates a controller at full scale, walking. The config is assumed to
    /// have passed [`MovementConfig::validate`].
    pub fn new(config: MovementConfig) -> Self {
        let base_scale = Vector3::from(config.big_scale);
        let geometry = BodyGeometry::new(
            base_scale,
            Vector3::new(0.0, locomotion_consts::CAMERA_STANDING_HEIGHT, 0.0),
        );
        let sensor = GroundSensor::new(config.standing_height * base_scale.y);
        let move_speed = config.walk_speed;

        Self {
            config,
            sensor,
            state: MotionState::Walking,
            flags: RuntimeFlags::default(),
            move_speed,
            geometry,
            base_scale,
            geometry_slot: TransitionSlot::new(),
            slide: None,
            jump_cooldown: None,
            last_sample: SensorSample {
                grounded: false,
                overhead_clear: true,
            },
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn flags(&self) -> RuntimeFlags {
        self.flags
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn geometry(&self) -> BodyGeometry {
        self.geometry
    }

    pub fn active_transition(&self) -> Option<TransitionKind> {
        self.geometry_slot.active_kind()
    }

    /// Current collider height in world units.
    pub fn current_height(&self) -> f32 {
        self.config.standing_height * self.geometry.scale.y
    }

    /// Variable-rate tick: resume transitions, sample, decide.
    pub fn decision_tick<B, I>(&mut self, body: &mut B, input: &I, dt: f32)
    where
        B: CharacterBody + ?Sized,
        I: InputSampler + ?Sized,
    {
        tick_pipeline::run_decision_phases(self, body, input, dt);
    }

    /// Fixed-rate tick: drag, extra gravity and movement force.
    pub fn fixed_tick<B, I>(&self, body: &mut B, input: &I)
    where
        B: CharacterBody + ?Sized,
        I: InputSampler + ?Sized,
    {
        let plan = build_force_plan(
            &self.config,
            ActuatorInput {
                state: self.state,
                grounded: self.last_sample.grounded,
                move_speed: self.move_speed,
                horizontal: input.axis(MoveAxis::Horizontal),
                vertical: input.axis(MoveAxis::Vertical),
                orientation: body.orientation(),
                gravity: body.gravity(),
                mass: body.mass(),
            },
        );
        apply_force_plan(body, &plan);
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let s = self.geometry.scale;
        let c = self.geometry.camera_offset;
        ControllerSnapshot {
            state: self.state,
            flags: self.flags,
            move_speed: self.move_speed,
            scale: [s.x, s.y, s.z],
            camera_offset: [c.x, c.y, c.z],
            grounded: self.last_sample.grounded,
            overhead_clear: self.last_sample.overhead_clear,
            active_transition: self.geometry_slot.active_kind(),
            slide_remaining: self.slide.map(|t| t.remaining()),
            jump_cooldown_remaining: self.jump_cooldown.map(|t| t.remaining()),
        }
    }
}
