//! Gesture timing: the activation gate and the grab timer.
//!
//! Both are plain state machines driven by explicit timestamps. They never
//! read the clock themselves, which keeps them deterministic under test.

mod gate;
mod grab;
mod types;

pub use gate::{ActivationGate, GateEvent, GateState};
pub use grab::{GrabTimer, ThresholdReached};
pub use types::{GestureLabel, GestureSample};
