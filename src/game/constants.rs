//! Physics and locomotion constants.
//! Centralizing these prevents bugs from duplicated hardcoded values.

/// Physics constants
pub mod physics {
    /// Standard gravity in m/s²
    pub const DEFAULT_GRAVITY: f32 = 9.81;

    /// Fixed timestep for physics simulation (50 Hz)
    pub const FIXED_TIMESTEP: f32 = 1.0 / 50.0;

    /// Upper bound on fixed steps run for a single frame, so a stalled frame
    /// cannot spiral into an unbounded catch-up loop.
    pub const MAX_FIXED_STEPS_PER_FRAME: u32 = 8;

    /// Small epsilon for float comparisons
    pub const EPSILON: f32 = 0.001;
}

/// Ground and overhead probe geometry
pub mod sensor {
    /// Ground ray starts this far above the body origin
    pub const GROUND_RAY_LIFT: f32 = 0.1;

    /// Ground ray reaches this far past half the current body height
    pub const GROUND_RAY_MARGIN: f32 = 0.2;

    /// Overhead ray starts this far above the body origin
    pub const OVERHEAD_RAY_LIFT: f32 = 1.0;

    /// Overhead ray length as a multiple of the standing (un-shrunk) height
    pub const OVERHEAD_RAY_FACTOR: f32 = 1.1;
}

/// Locomotion tuning that is not exposed as configuration
pub mod locomotion {
    /// Move force per unit of move speed
    pub const FORCE_PER_SPEED: f32 = 10.0;

    /// Slide speed as a multiple of the sprint speed
    pub const SLIDE_SPEED_BOOST: f32 = 1.1;

    /// Camera rig height at full size, standing
    pub const CAMERA_STANDING_HEIGHT: f32 = 1.0;
}
