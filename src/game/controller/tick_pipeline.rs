use nalgebra::Vector3;

use crate::game::body::CharacterBody;
use crate::game::input::InputSampler;
use super::CharacterController;

/// Executes the decision-tick phases in order:
/// resume tasks -> sense -> decide -> optional speed clamp.
pub(super) fn run_decision_phases<B, I>(
    controller: &mut CharacterController,
    body: &mut B,
    input: &I,
    dt: f32,
) where
    B: CharacterBody + ?Sized,
    I: InputSampler + ?Sized,
{
    // Resume transitions started on earlier ticks; completions land before
    // the rules see the flags.
    controller.resume_tasks(body, dt);

    // Sample with the geometry the resumed transitions just wrote.
    let height = controller.current_height();
    controller.last_sample = controller.sensor.sample(&*body, height);

    controller.evaluate_rules(body, input);

    if controller.config.clamp_horizontal_speed {
        clamp_horizontal_speed(body, controller.move_speed);
    }
}

/// Limits horizontal velocity to `max_speed`, leaving vertical velocity alone.
fn clamp_horizontal_speed<B: CharacterBody + ?Sized>(body: &mut B, max_speed: f32) {
    let v = body.linear_velocity();
    let flat = Vector3::new(v.x, 0.0, v.z);
    let speed = flat.norm();
    if speed > max_speed && speed > 0.0 {
        let limited = flat * (max_speed / speed);
        body.set_linear_velocity(Vector3::new(limited.x, v.y, limited.z));
    }
}
