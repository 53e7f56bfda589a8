#![forbid(unsafe_code)]

//! Incremental filtered views over mutable ordered trees.
//!
//! A [`FilterView`] mirrors the part of a source tree a [`RowFilter`]
//! accepts. Rejected rows are elided: they get no view node and their
//! visible descendants re-attach to the nearest visible ancestor, in
//! document order. The view follows source mutations incrementally
//! through the `source_*` handlers and relays the resulting edits to a
//! [`ViewObserver`] as bracketed, coalesced notifications.
//!
//! The source side is anything implementing [`TreeModel`]; cells are named
//! by opaque [`SourceId`] handles on the source side and by stable
//! [`ViewKey`] handles on the view side.
//!
//! ```
//! use treesieve::{FilterView, SourceId, TreeModel};
//! use treesieve_harness::ScriptTree;
//!
//! let mut source = ScriptTree::new();
//! let logs = source.push(SourceId::ROOT, ".logs");
//! source.push(logs, "today");
//! source.push(SourceId::ROOT, "src");
//!
//! let view = FilterView::new(&source, |m: &dyn TreeModel, row: usize, parent: SourceId| {
//!     !m.text(m.child_at(parent, row, 0)).starts_with('.')
//! });
//! // ".logs" is elided; "today" surfaces as a top-level row.
//! assert_eq!(view.row_count(None), 2);
//! ```

mod build;
mod coalesce;
mod node;
mod order;
mod sync;

pub use sync::{FilterView, RangeSelect, RowFilter};
pub use treesieve_model::{SourceId, TreeModel, ViewKey, ViewObserver};
