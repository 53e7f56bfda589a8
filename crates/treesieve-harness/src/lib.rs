#![forbid(unsafe_code)]

//! Test scaffolding for treesieve.
//!
//! [`ScriptTree`] is a fully scriptable in-memory source tree implementing
//! [`treesieve_model::TreeModel`]; [`Recorder`] captures the notification
//! stream a synchronizer emits so tests can assert on bracketing and
//! coalescing. Neither type is intended for production use.

pub mod recorder;
pub mod script;

pub use recorder::{Recorder, ViewEvent};
pub use script::ScriptTree;
