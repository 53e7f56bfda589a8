//! Stable source handles and the source-tree query contract.

use std::fmt;

/// Stable, opaque handle to one cell of the source tree.
///
/// A `SourceId` identifies a `(row, column)` cell under some parent, and
/// stays valid across unrelated mutations: inserting or removing sibling
/// rows never invalidates the handle, only removing the node itself does.
/// Handles are allocated by the source model; the synchronizer only stores
/// and compares them.
///
/// [`SourceId::ROOT`] is the distinguished parent of all top-level rows.
/// It is a valid *parent* argument everywhere but never a valid cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    /// Parent of all top-level rows. Never refers to an actual cell.
    pub const ROOT: SourceId = SourceId(0);

    /// Wrap a raw id. `0` is reserved for [`SourceId::ROOT`].
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        SourceId(raw)
    }

    /// The raw id.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this is the root sentinel.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "SourceId(ROOT)")
        } else {
            write!(f, "SourceId({})", self.0)
        }
    }
}

/// Query contract of the source tree, as consumed by the synchronizer.
///
/// The source addresses cells by `(parent, row, column)`. Children hang off
/// the column-0 cell of their row (the usual item-model convention); cells
/// in other columns normally report zero rows.
///
/// All methods must answer consistently with the tree's *current* shape.
/// During a structural mutation the source must keep the contract required
/// by the handler being invoked: for example `rows_about_to_be_removed`
/// runs while the doomed rows are still queryable.
pub trait TreeModel {
    /// Number of child rows under `parent`.
    fn row_count(&self, parent: SourceId) -> usize;

    /// Number of columns under `parent`.
    fn column_count(&self, parent: SourceId) -> usize;

    /// The cell at `(row, column)` under `parent`.
    ///
    /// # Panics
    /// May panic if the coordinate is out of range; callers stay in range.
    fn child_at(&self, parent: SourceId, row: usize, column: usize) -> SourceId;

    /// Parent cell of `node` (the column-0 cell of the parent row), or
    /// [`SourceId::ROOT`] for a top-level row.
    fn parent_of(&self, node: SourceId) -> SourceId;

    /// Row of `node` within its parent.
    fn row_of(&self, node: SourceId) -> usize;

    /// Column of `node`.
    fn column_of(&self, node: SourceId) -> usize;

    /// Display payload of a cell, as seen by filter predicates.
    ///
    /// Models without textual content can leave the default.
    fn text(&self, node: SourceId) -> String {
        let _ = node;
        String::new()
    }
}
