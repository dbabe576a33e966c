//! Message exchange state machine
//!
//! Pure transitions in the Elm Architecture style: the transition function
//! decides, the runtime performs the resulting effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{BusyPolicy, ExchangeContext, ExchangeState};
pub use transition::{transition, TransitionError, TransitionResult};
