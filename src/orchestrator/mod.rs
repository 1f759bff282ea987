pub mod controller;
pub mod state;

pub use controller::{PhaseController, PhaseRecord};
pub use state::ControllerState;
