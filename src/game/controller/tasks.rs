//! Starting and resuming the controller's timed tasks.

use nalgebra::Vector3;
use tracing::debug;

use crate::game::body::{BodyGeometry, CharacterBody, ForceMode};
use crate::game::constants::locomotion as locomotion_consts;
use crate::game::transition::{GeometryTransition, TimedTask, TransitionKind, TransitionStatus};
use super::CharacterController;

impl CharacterController {
    /// Toggles between full and shrunk size. `is_small` flips only when the
    /// transition completes.
    pub(super) fn start_scale(&mut self) {
        self.flags.is_scaling = true;
        let small = Vector3::from(self.config.small_scale);
        let (target_scale, camera_y) = if self.flags.is_small {
            (self.base_scale, locomotion_consts::CAMERA_STANDING_HEIGHT)
        } else {
            (small, locomotion_consts::CAMERA_STANDING_HEIGHT * small.y)
        };
        let target = BodyGeometry::new(
            target_scale,
            with_height(self.geometry.camera_offset, camera_y),
        );
        self.geometry_slot.install(GeometryTransition::new(
            TransitionKind::Scale,
            self.config.scale_duration,
            self.geometry,
            target,
        ));
    }

    pub(super) fn start_crouch(&mut self) {
        self.flags.is_crouching = true;
        self.move_speed = self.config.crouch_speed;
        let factor = self.config.crouch_height_factor;
        let target = BodyGeometry::new(
            with_height(self.geometry.scale, self.base_scale.y * factor),
            with_height(
                self.geometry.camera_offset,
                locomotion_consts::CAMERA_STANDING_HEIGHT * factor,
            ),
        );
        self.geometry_slot.install(GeometryTransition::new(
            TransitionKind::Crouch,
            self.config.crouch_duration,
            self.geometry,
            target,
        ));
    }

    pub(super) fn start_uncrouch(&mut self) {
        self.flags.is_crouching = false;
        self.move_speed = self.config.walk_speed;
        let target = BodyGeometry::new(
            with_height(self.geometry.scale, self.base_scale.y),
            with_height(
                self.geometry.camera_offset,
                locomotion_consts::CAMERA_STANDING_HEIGHT,
            ),
        );
        self.geometry_slot.install(GeometryTransition::new(
            TransitionKind::Uncrouch,
            self.config.crouch_duration,
            self.geometry,
            target,
        ));
    }

    /// Launches a slide: crouched collider, a forward burst, and the boosted
    /// speed for the slide window.
    pub(super) fn start_slide<B: CharacterBody + ?Sized>(&mut self, body: &mut B) {
        self.flags.is_sliding = true;
        if !self.flags.is_crouching {
            self.start_crouch();
        }

        let slide_speed = self.config.sprint_speed_for(self.flags.is_small)
            * locomotion_consts::SLIDE_SPEED_BOOST;
        let forward = body.orientation().forward;
        body.apply_force(forward * slide_speed, ForceMode::VelocityChange);
        self.move_speed = slide_speed;
        self.slide = Some(TimedTask::new(self.config.slide_duration));
        debug!(slide_speed, duration = self.config.slide_duration, "slide started");
    }

    /// Jumps when ready and grounded; otherwise does nothing.
    pub(super) fn start_jump<B: CharacterBody + ?Sized>(&mut self, body: &mut B) {
        if !(self.flags.ready_to_jump && self.last_sample.grounded) {
            debug!(
                ready = self.flags.ready_to_jump,
                grounded = self.last_sample.grounded,
                "jump refused"
            );
            return;
        }

        let force = self.config.jump_force_for(self.flags.is_small);
        body.apply_force(Vector3::y() * force, ForceMode::Impulse);
        self.flags.ready_to_jump = false;
        self.jump_cooldown = Some(TimedTask::new(self.config.jump_cooldown));
        debug!(force, "jump");
    }

    /// Resumes every running task by `dt` and applies their completions.
    pub(super) fn resume_tasks<B: CharacterBody + ?Sized>(&mut self, body: &mut B, dt: f32) {
        let before = self.geometry;
        let completed = self.geometry_slot.advance(dt, &mut self.geometry);
        if self.geometry.scale != before.scale {
            body.set_local_scale(self.geometry.scale);
        }
        if completed == Some(TransitionKind::Scale) {
            self.flags.is_small = !self.flags.is_small;
            self.flags.is_scaling = false;
            debug!(is_small = self.flags.is_small, "scale toggle finished");
        }

        if let Some(slide) = self.slide.as_mut() {
            if slide.advance(dt) == TransitionStatus::Completed {
                self.slide = None;
                self.flags.is_sliding = false;
                self.move_speed = self.config.sprint_speed_for(self.flags.is_small);
                debug!(move_speed = self.move_speed, "slide finished");
            }
        }

        if let Some(cooldown) = self.jump_cooldown.as_mut() {
            if cooldown.advance(dt) == TransitionStatus::Completed {
                self.jump_cooldown = None;
                self.flags.ready_to_jump = true;
            }
        }
    }
}

fn with_height(v: Vector3<f32>, y: f32) -> Vector3<f32> {
    Vector3::new(v.x, y, v.z)
}
