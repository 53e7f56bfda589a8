#![forbid(unsafe_code)]

//! Shared vocabulary for treesieve: the source-tree query contract and the
//! view-side notification protocol.
//!
//! A source collection implements [`TreeModel`] and drives the synchronizer
//! by calling its handler methods around every mutation. The synchronizer
//! re-emits the change in view coordinates through a [`ViewObserver`].
//!
//! Nothing in this crate owns tree data; it only names the seams.

pub mod observer;
pub mod source;

pub use observer::{ViewKey, ViewObserver};
pub use source::{SourceId, TreeModel};
