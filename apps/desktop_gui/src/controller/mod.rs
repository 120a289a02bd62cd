//! Controller layer: session state machine, UI actions, and action dispatch.

pub mod events;
pub mod orchestration;
pub mod session;
