//! Decision rules, evaluated once per decision tick in priority order.

use tracing::debug;

use crate::game::body::CharacterBody;
use crate::game::input::{InputSampler, Key};
use crate::game::motion_state::MotionState;
use super::CharacterController;

impl CharacterController {
    pub(super) fn evaluate_rules<B, I>(&mut self, body: &mut B, input: &I)
    where
        B: CharacterBody + ?Sized,
        I: InputSampler + ?Sized,
    {
        let grounded = self.last_sample.grounded;
        let overhead_clear = self.last_sample.overhead_clear;

        // A running scale toggle or slide owns the character until it ends.
        if self.flags.is_locked_out() {
            return;
        }

        if input.pressed_this_tick(Key::Scale)
            && !self.flags.is_scaling
            && !self.flags.is_crouching
            && overhead_clear
            && grounded
        {
            self.set_state(MotionState::Scaling);
            self.start_scale();
            return;
        }

        if input.pressed_this_tick(Key::Crouch) && !self.flags.is_small {
            self.geometry_slot.cancel();
            if input.is_held(Key::Sprint) && grounded {
                self.set_state(MotionState::Sliding);
                self.start_slide(body);
            } else {
                self.set_state(MotionState::Crouching);
                self.start_crouch();
            }
        }

        // A slide that just started locks out the rest of this tick too.
        if self.flags.is_locked_out() {
            return;
        }

        if input.released_this_tick(Key::Crouch)
            && self.flags.is_crouching
            && !self.flags.is_small
            && overhead_clear
        {
            self.set_state(MotionState::Walking);
            self.geometry_slot.cancel();
            self.start_uncrouch();
        }

        // Catches a release edge that never arrived, e.g. after focus loss.
        if self.flags.is_crouching && !input.is_held(Key::Crouch) && overhead_clear {
            self.geometry_slot.cancel();
            self.start_uncrouch();
        }

        if input.pressed_this_tick(Key::Jump) {
            self.set_state(MotionState::Jumping);
            self.start_jump(body);
            return;
        }

        if self.flags.is_crouching {
            return;
        }
        if grounded && input.is_held(Key::Sprint) {
            self.set_state(MotionState::Sprinting);
            self.move_speed = self.config.sprint_speed_for(self.flags.is_small);
        } else if grounded {
            self.set_state(MotionState::Walking);
            self.move_speed = self.config.walk_speed_for(self.flags.is_small);
        }
    }

    fn set_state(&mut self, next: MotionState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "motion state changed");
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use crate::config::MovementConfig;
    use crate::game::body::test_body::TestBody;
    use crate::game::body::ForceMode;
    use crate::game::controller::CharacterController;
    use crate::game::input::{InputState, Key, MoveAxis};
    use crate::game::motion_state::MotionState;
    use crate::game::transition::TransitionKind;

    const DT: f32 = 1.0 / 60.0;

    struct Harness {
        controller: CharacterController,
        body: TestBody,
        input: InputState,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_config(MovementConfig::default())
        }

        fn with_config(config: MovementConfig) -> Self {
            Self {
                controller: CharacterController::new(config),
                body: TestBody::default(),
                input: InputState::new(),
            }
        }

        /// Runs one decision tick with the given edges applied first.
        fn tick_with(&mut self, events: impl FnOnce(&mut InputState)) {
            self.input.begin_tick();
            events(&mut self.input);
            self.controller
                .decision_tick(&mut self.body, &self.input, DT);
        }

        fn tick(&mut self) {
            self.tick_with(|_| {});
        }

        fn run_for(&mut self, seconds: f32) {
            let ticks = (seconds / DT).ceil() as usize + 1;
            for _ in 0..ticks {
                self.tick();
            }
        }
    }

    #[test]
    fn test_spawns_walking_at_full_scale() {
        let h = Harness::new();
        assert_eq!(h.controller.state(), MotionState::Walking);
        assert_eq!(h.controller.geometry().scale, Vector3::new(1.0, 1.0, 1.0));
        assert!(h.controller.flags().ready_to_jump);
    }

    #[test]
    fn test_walk_and_sprint_speed_selection() {
        let mut h = Harness::new();
        h.tick();
        assert_eq!(h.controller.state(), MotionState::Walking);
        assert_eq!(h.controller.move_speed(), 7.0);

        h.tick_with(|i| i.key_down(Key::Sprint));
        assert_eq!(h.controller.state(), MotionState::Sprinting);
        assert_eq!(h.controller.move_speed(), 10.0);
    }

    #[test]
    fn test_airborne_keeps_previous_state() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Sprint));
        h.body.grounded = false;
        h.tick();
        assert_eq!(h.controller.state(), MotionState::Sprinting);
    }

    #[test]
    fn test_sprint_crouch_starts_slide() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Sprint));
        h.tick_with(|i| i.key_down(Key::Crouch));

        assert_eq!(h.controller.state(), MotionState::Sliding);
        assert!(h.controller.flags().is_sliding);
        assert!(h.controller.flags().is_crouching);
        assert_eq!(h.controller.active_transition(), Some(TransitionKind::Crouch));
        assert!((h.controller.move_speed() - 11.0).abs() < 1e-5);

        let bursts = h.body.forces_of(ForceMode::VelocityChange);
        assert_eq!(bursts.len(), 1);
        assert!((bursts[0] - Vector3::new(0.0, 0.0, 11.0)).norm() < 1e-5);
    }

    #[test]
    fn test_slide_reverts_to_sprint_speed_after_duration() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Sprint));
        h.tick_with(|i| i.key_down(Key::Crouch));

        // Still boosted just before the window closes.
        let ticks_inside = (0.75 / DT) as usize - 1;
        for _ in 0..ticks_inside {
            h.tick();
            assert!((h.controller.move_speed() - 11.0).abs() < 1e-5);
            assert_eq!(h.controller.state(), MotionState::Sliding);
        }

        h.run_for(0.1);
        assert!(!h.controller.flags().is_sliding);
        // Crouch is still held, so the slide leaves the character crouched.
        assert!(h.controller.flags().is_crouching);
        assert_eq!(h.controller.move_speed(), 10.0);
    }

    #[test]
    fn test_slide_never_uncrouches_on_its_own() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Sprint));
        h.tick_with(|i| i.key_down(Key::Crouch));
        h.run_for(1.0);
        assert!(h.controller.flags().is_crouching);

        h.tick_with(|i| i.key_up(Key::Crouch));
        assert!(!h.controller.flags().is_crouching);
        assert_eq!(h.controller.active_transition(), Some(TransitionKind::Uncrouch));
    }

    #[test]
    fn test_slide_keeps_driving_force_through_and_after_window() {
        let mut h = Harness::new();
        h.input.set_axis(MoveAxis::Vertical, 1.0);
        h.tick_with(|i| i.key_down(Key::Sprint));
        h.tick_with(|i| i.key_down(Key::Crouch));
        assert_eq!(h.controller.state(), MotionState::Sliding);

        h.body.forces.clear();
        h.controller.fixed_tick(&mut h.body, &h.input);
        let during = h.body.forces_of(ForceMode::Force);
        assert_eq!(during.len(), 1);
        assert!((during[0] - Vector3::new(0.0, 0.0, 110.0)).norm() < 1e-3);
        assert_eq!(h.body.drag, 0.0);

        // Window over, crouch still held: rule 7 is skipped, so the label stays.
        h.run_for(1.0);
        assert_eq!(h.controller.state(), MotionState::Sliding);
        assert!(!h.controller.flags().is_sliding);
        assert!(h.controller.flags().is_crouching);
        assert_eq!(h.controller.move_speed(), 10.0);

        h.body.forces.clear();
        h.controller.fixed_tick(&mut h.body, &h.input);
        let after = h.body.forces_of(ForceMode::Force);
        assert_eq!(after.len(), 1);
        assert!((after[0] - Vector3::new(0.0, 0.0, 100.0)).norm() < 1e-3);
        assert_eq!(h.body.drag, 0.0);

        // Releasing crouch hands control back to speed selection.
        h.tick_with(|i| i.key_up(Key::Crouch));
        assert!(!h.controller.flags().is_crouching);
        assert_eq!(h.controller.state(), MotionState::Sprinting);
        assert_eq!(h.controller.move_speed(), 10.0);
        h.controller.fixed_tick(&mut h.body, &h.input);
        assert_eq!(h.body.drag, 5.0);
    }

    #[test]
    fn test_jump_while_crouched_stays_jumping() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Crouch));
        h.run_for(0.3);
        assert_eq!(h.controller.state(), MotionState::Crouching);

        h.tick_with(|i| i.key_down(Key::Jump));
        assert_eq!(h.controller.state(), MotionState::Jumping);
        assert!(h.controller.flags().is_crouching);
        assert!(!h.controller.flags().ready_to_jump);
        let impulses = h.body.forces_of(ForceMode::Impulse);
        assert_eq!(impulses.len(), 1);
        assert!((impulses[0] - Vector3::new(0.0, 7.0, 0.0)).norm() < 1e-5);

        // Back on the ground but still crouched: speed selection never runs.
        h.run_for(0.5);
        assert!(h.controller.flags().ready_to_jump);
        assert_eq!(h.controller.state(), MotionState::Jumping);
        assert_eq!(h.controller.move_speed(), 3.5);

        h.tick_with(|i| i.key_up(Key::Crouch));
        assert_eq!(h.controller.state(), MotionState::Walking);
        assert_eq!(h.controller.move_speed(), 7.0);
    }

    #[test]
    fn test_crouch_release_blocked_overhead() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Crouch));
        h.run_for(0.3);
        assert!(h.controller.flags().is_crouching);

        h.body.ceiling = true;
        h.tick_with(|i| i.key_up(Key::Crouch));
        assert!(h.controller.flags().is_crouching);
        assert_eq!(h.controller.state(), MotionState::Crouching);
        assert_eq!(h.controller.active_transition(), None);

        // The safety net stands the character up once the ceiling clears.
        h.body.ceiling = false;
        h.tick();
        assert!(!h.controller.flags().is_crouching);
        assert_eq!(h.controller.active_transition(), Some(TransitionKind::Uncrouch));
        assert_eq!(h.controller.state(), MotionState::Walking);
    }

    #[test]
    fn test_crouch_and_uncrouch_geometry() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Crouch));
        assert_eq!(h.controller.state(), MotionState::Crouching);
        assert_eq!(h.controller.move_speed(), 3.5);

        h.run_for(0.3);
        let g = h.controller.geometry();
        assert!((g.scale.y - 0.7).abs() < 1e-6);
        assert!((g.camera_offset.y - 0.7).abs() < 1e-6);
        assert!((h.body.scale.y - 0.7).abs() < 1e-6);

        h.tick_with(|i| i.key_up(Key::Crouch));
        assert_eq!(h.controller.move_speed(), 7.0);
        h.run_for(0.3);
        let g = h.controller.geometry();
        assert_eq!(g.scale.y, 1.0);
        assert_eq!(g.camera_offset.y, 1.0);
    }

    #[test]
    fn test_missed_release_edge_still_uncrouches() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Crouch));
        h.tick_with(|i| i.release_all());
        assert!(!h.controller.flags().is_crouching);
        assert_eq!(h.controller.active_transition(), Some(TransitionKind::Uncrouch));
    }

    #[test]
    fn test_airborne_jump_is_refused() {
        let mut h = Harness::new();
        h.body.grounded = false;
        h.tick_with(|i| i.key_down(Key::Jump));

        assert_eq!(h.controller.state(), MotionState::Jumping);
        assert!(h.body.forces_of(ForceMode::Impulse).is_empty());
        assert!(h.controller.flags().ready_to_jump);
    }

    #[test]
    fn test_jump_cooldown() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Jump));
        assert_eq!(h.controller.state(), MotionState::Jumping);
        assert_eq!(h.body.forces_of(ForceMode::Impulse), vec![Vector3::new(0.0, 7.0, 0.0)]);
        assert!(!h.controller.flags().ready_to_jump);

        // A second press inside the cooldown does nothing.
        h.tick_with(|i| {
            i.key_up(Key::Jump);
            i.key_down(Key::Jump);
        });
        assert_eq!(h.body.forces_of(ForceMode::Impulse).len(), 1);

        h.run_for(0.25);
        assert!(h.controller.flags().ready_to_jump);
        h.tick_with(|i| {
            i.key_up(Key::Jump);
            i.key_down(Key::Jump);
        });
        assert_eq!(h.body.forces_of(ForceMode::Impulse).len(), 2);
    }

    #[test]
    fn test_scale_toggle_completes_after_duration() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Scale));
        assert_eq!(h.controller.state(), MotionState::Scaling);
        assert!(h.controller.flags().is_scaling);
        assert!(!h.controller.flags().is_small);

        let mut last = 1.0;
        let mut ticks = 0;
        while h.controller.flags().is_scaling {
            h.tick();
            let y = h.controller.geometry().scale.y;
            assert!(y <= last + 1e-6);
            last = y;
            ticks += 1;
            assert!(ticks < 200, "scale toggle never finished");
        }

        let flags = h.controller.flags();
        assert!(flags.is_small);
        let g = h.controller.geometry();
        assert_eq!(g.scale, Vector3::new(0.4, 0.4, 0.4));
        assert!((g.camera_offset.y - 0.4).abs() < 1e-6);
        assert_eq!(h.body.scale, Vector3::new(0.4, 0.4, 0.4));
        assert!(ticks as f32 * DT >= 1.0 - 1e-4);
    }

    #[test]
    fn test_scale_toggles_back_to_full_size() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Scale));
        h.run_for(1.1);
        assert!(h.controller.flags().is_small);
        assert_eq!(h.controller.move_speed(), 4.2);

        h.tick_with(|i| {
            i.key_up(Key::Scale);
            i.key_down(Key::Scale);
        });
        h.run_for(1.1);
        assert!(!h.controller.flags().is_small);
        assert_eq!(h.controller.geometry().scale, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(h.controller.geometry().camera_offset.y, 1.0);
    }

    #[test]
    fn test_scale_refused_when_blocked_airborne_or_crouching() {
        let mut h = Harness::new();
        h.body.ceiling = true;
        h.tick_with(|i| i.key_down(Key::Scale));
        assert!(!h.controller.flags().is_scaling);

        let mut h = Harness::new();
        h.body.grounded = false;
        h.tick_with(|i| i.key_down(Key::Scale));
        assert!(!h.controller.flags().is_scaling);

        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Crouch));
        h.tick_with(|i| i.key_down(Key::Scale));
        assert!(!h.controller.flags().is_scaling);
        assert!(h.controller.flags().is_crouching);
    }

    #[test]
    fn test_mid_scale_inputs_are_ignored() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Scale));
        h.tick_with(|i| {
            i.key_down(Key::Crouch);
            i.key_down(Key::Jump);
        });

        assert_eq!(h.controller.state(), MotionState::Scaling);
        assert!(!h.controller.flags().is_crouching);
        assert_eq!(h.controller.active_transition(), Some(TransitionKind::Scale));
        assert!(h.body.forces_of(ForceMode::Impulse).is_empty());
    }

    #[test]
    fn test_crouch_suppressed_while_small() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Scale));
        h.run_for(1.1);
        assert!(h.controller.flags().is_small);

        h.tick_with(|i| i.key_down(Key::Crouch));
        assert!(!h.controller.flags().is_crouching);
        assert_eq!(h.controller.active_transition(), None);
    }

    #[test]
    fn test_sprint_crouch_while_small_just_sprints() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Scale));
        h.run_for(1.1);
        // Crouch and therefore slide are unavailable while small.
        h.tick_with(|i| {
            i.key_down(Key::Sprint);
            i.key_down(Key::Crouch);
        });
        assert_eq!(h.controller.state(), MotionState::Sprinting);
        assert_eq!(h.controller.move_speed(), 6.0);
    }

    #[test]
    fn test_scaling_and_sliding_never_overlap() {
        let mut h = Harness::new();
        let script: Vec<Box<dyn Fn(&mut InputState)>> = vec![
            Box::new(|i| i.key_down(Key::Sprint)),
            Box::new(|i| i.key_down(Key::Crouch)),
            Box::new(|i| i.key_down(Key::Scale)),
            Box::new(|i| i.key_up(Key::Crouch)),
            Box::new(|i| i.key_up(Key::Scale)),
            Box::new(|i| i.key_down(Key::Scale)),
            Box::new(|i| i.key_down(Key::Crouch)),
        ];
        for step in script.iter().cycle().take(400) {
            h.tick_with(|i| step(i));
            let flags = h.controller.flags();
            assert!(!(flags.is_scaling && flags.is_sliding));
        }
    }

    #[test]
    fn test_recrouch_cancels_running_uncrouch() {
        let mut h = Harness::new();
        h.tick_with(|i| i.key_down(Key::Crouch));
        h.run_for(0.3);
        h.tick_with(|i| i.key_up(Key::Crouch));
        h.tick();
        let mid = h.controller.geometry().scale.y;
        assert!(mid > 0.7 && mid < 1.0);

        h.tick_with(|i| i.key_down(Key::Crouch));
        assert_eq!(h.controller.active_transition(), Some(TransitionKind::Crouch));
        // The new crouch starts from where the uncrouch was abandoned.
        let abandoned = h.controller.geometry();
        assert!(abandoned.scale.y > mid && abandoned.scale.y < 1.0);
        let crouch = h.controller.geometry_slot.active().unwrap();
        assert_eq!(crouch.start, abandoned);
        h.run_for(0.3);
        assert!((h.controller.geometry().scale.y - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_speed_clamp_is_opt_in() {
        let mut h = Harness::new();
        h.body.velocity = Vector3::new(20.0, 0.0, 0.0);
        h.tick();
        assert_eq!(h.body.velocity.x, 20.0);

        let mut h = Harness::with_config(MovementConfig {
            clamp_horizontal_speed: true,
            ..Default::default()
        });
        h.body.velocity = Vector3::new(20.0, -2.0, 0.0);
        h.tick();
        assert!((h.body.velocity.x - 7.0).abs() < 1e-5);
        assert_eq!(h.body.velocity.y, -2.0);
    }
}
