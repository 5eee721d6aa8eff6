use serde::Serialize;
use tracing::warn;

use super::constants::physics as consts;
use super::controller::{CharacterController, ControllerSnapshot};
use super::input::InputState;
use super::physics::PhysicsWorld;
use crate::config::MovementConfig;

/// One controlled character in a Rapier world, driven by a frame clock.
///
/// Each frame runs the fixed-rate physics ticks the frame covers, then one
/// variable-rate decision tick. Input events fed between two frames are
/// seen as edges by the next frame's decision tick.
pub struct Simulation {
    pub physics: PhysicsWorld,
    pub input: InputState,
    controller: CharacterController,
    fixed_dt: f32,
    accumulator: f32,
    frame: u64,
    time: f32,
}

/// Per-frame observation of the simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    pub frame: u64,
    pub time: f32,
    pub fixed_steps: u32,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    #[serde(flatten)]
    pub controller: ControllerSnapshot,
}

impl Simulation {
    /// Creates a world with the character standing at `spawn` (body center).
    /// The config must already be validated.
    pub fn new(config: MovementConfig, spawn: [f32; 3]) -> Self {
        let mut physics = PhysicsWorld::new();
        physics.add_character(
            spawn,
            [config.body_width, config.standing_height, config.body_width],
            config.body_mass,
        );
        let controller = CharacterController::new(config);
        // Match the collider to the spawn geometry.
        if let Err(e) = physics.set_character_scale(controller.geometry().scale) {
            warn!(error = %e, "failed to size character collider");
        }

        Self {
            physics,
            input: InputState::new(),
            controller,
            fixed_dt: consts::FIXED_TIMESTEP,
            accumulator: 0.0,
            frame: 0,
            time: 0.0,
        }
    }

    /// A character standing on a large floor whose top is at y = 0.
    pub fn with_flat_floor(config: MovementConfig) -> Self {
        let half_height = config.standing_height * config.big_scale[1] * 0.5;
        let mut sim = Self::new(config, [0.0, half_height, 0.0]);
        sim.physics.add_static_box([0.0, -0.5, 0.0], [200.0, 1.0, 200.0]);
        sim
    }

    pub fn controller(&self) -> &CharacterController {
        &self.controller
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advances one rendered frame of `frame_dt` seconds.
    pub fn advance_frame(&mut self, frame_dt: f32) -> u32 {
        let frame_dt = frame_dt.max(0.0);
        self.accumulator += frame_dt;

        let mut steps = 0;
        while self.accumulator >= self.fixed_dt {
            if steps == consts::MAX_FIXED_STEPS_PER_FRAME {
                warn!(
                    frame = self.frame,
                    dropped = self.accumulator,
                    "fixed-step budget exhausted, dropping simulation time"
                );
                self.accumulator = 0.0;
                break;
            }
            self.physics.reset_character_forces();
            self.controller.fixed_tick(&mut self.physics, &self.input);
            self.physics.step(self.fixed_dt);
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }

        self.controller
            .decision_tick(&mut self.physics, &self.input, frame_dt);
        self.input.begin_tick();

        self.frame += 1;
        self.time += frame_dt;
        steps
    }

    pub fn snapshot(&self, fixed_steps: u32) -> SimulationSnapshot {
        SimulationSnapshot {
            frame: self.frame,
            time: self.time,
            fixed_steps,
            position: self.physics.get_character_position().unwrap_or_default(),
            velocity: self.physics.get_character_velocity().unwrap_or_default(),
            controller: self.controller.snapshot(),
        }
    }
}
