//! Turn pipeline state machine
//!
//! Pure state transitions; the runtime executes the resulting effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, Stage};
pub use state::{PipelineState, SessionContext};
pub use transition::{transition, TransitionError, TransitionResult};
