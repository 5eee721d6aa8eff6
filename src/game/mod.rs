pub mod actuator;
pub mod body;
pub mod constants;
pub mod controller;
pub mod input;
pub mod motion_state;
pub mod physics;
pub mod script;
pub mod simulation;
pub mod transition;

pub use body::{CharacterBody, ForceMode, Orientation, PhysicsError};
pub use controller::{CharacterController, ControllerSnapshot, GroundSensor};
pub use input::{InputSampler, InputState, Key, MoveAxis};
pub use motion_state::{MotionState, RuntimeFlags};
pub use physics::PhysicsWorld;
pub use script::{InputScript, ScriptError};
pub use simulation::{Simulation, SimulationSnapshot};
pub use transition::TransitionKind;
