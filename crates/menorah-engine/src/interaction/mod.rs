pub mod igniter;
pub mod proximity;

pub use igniter::{DragGrip, IgniterLifecycle, IgniterPhase};
pub use proximity::{DragProximityEngine, ProximityOutcome};
