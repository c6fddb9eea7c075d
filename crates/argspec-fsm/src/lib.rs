//! NFA compiler and matcher for argspec command specs.
//!
//! [`compile`] lowers a parsed spec into a [`state::StateGraph`] with a
//! Thompson-style construction, validates the graph, and wraps it together
//! with the owned [`argspec_core::DescriptorSet`] into an [`Fsm`]. Matching
//! is a thread-based NFA simulation without backtracking: every viable
//! alternative advances in lockstep, each thread carrying the bindings that
//! got it there, and the first final thread in priority order wins. Its
//! bindings are validated as a whole before the first write, so a failed
//! match never leaves descriptors partially bound.

pub mod compile;
pub mod error;
pub mod matcher;
pub mod state;

pub use compile::compile;
pub use error::{CompileError, MatchError};
pub use matcher::Fsm;
