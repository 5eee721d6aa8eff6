use nalgebra::Vector3;
use tracing::{trace, warn};

use crate::game::body::CharacterBody;
use crate::game::constants::sensor as sensor_consts;

/// Ground contact and overhead clearance sampled once per decision tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSample {
    pub grounded: bool,
    pub overhead_clear: bool,
}

/// Ray probes below and above the character body.
#[derive(Debug, Clone, Copy)]
pub struct GroundSensor {
    /// Standing height at full (un-shrunk) scale
    pub base_height: f32,
}

impl GroundSensor {
    pub fn new(base_height: f32) -> Self {
        Self { base_height }
    }

    /// Casts down from just above the origin, reaching half the current body
    /// height plus a margin. A failed query reads as airborne.
    pub fn is_grounded<B: CharacterBody + ?Sized>(&self, body: &B, current_height: f32) -> bool {
        let origin = body.position() + Vector3::y() * sensor_consts::GROUND_RAY_LIFT;
        let distance = current_height * 0.5 + sensor_consts::GROUND_RAY_MARGIN;
        let hit = match body.cast_ray(origin, -Vector3::y(), distance) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "ground probe failed, treating as airborne");
                false
            }
        };
        trace!(
            origin = ?origin,
            distance,
            hit,
            "ground probe"
        );
        hit
    }

    /// Casts up from one unit above the origin over 1.1x the standing
    /// height. Any hit blocks standing back up or growing; so does a failed
    /// query.
    pub fn has_overhead_clearance<B: CharacterBody + ?Sized>(&self, body: &B) -> bool {
        let origin = body.position() + Vector3::y() * sensor_consts::OVERHEAD_RAY_LIFT;
        let distance = self.base_height * sensor_consts::OVERHEAD_RAY_FACTOR;
        let blocked = match body.cast_ray(origin, Vector3::y(), distance) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "overhead probe failed, treating as blocked");
                true
            }
        };
        trace!(
            origin = ?origin,
            distance,
            blocked,
            "overhead probe"
        );
        !blocked
    }

    pub fn sample<B: CharacterBody + ?Sized>(&self, body: &B, current_height: f32) -> SensorSample {
        SensorSample {
            grounded: self.is_grounded(body, current_height),
            overhead_clear: self.has_overhead_clearance(body),
        }
    }
}
