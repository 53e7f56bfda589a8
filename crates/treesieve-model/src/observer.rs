//! View-side coordinates and the announce-before/after notification protocol.

use std::fmt;

/// Stable handle to one visible node of the derived view.
///
/// Keys are arena slots: a key stays valid — across renumbering and
/// re-parenting — until the node it names leaves the view. A key must never
/// be used after the node was removed or after a reset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewKey(usize);

impl ViewKey {
    /// Wrap a raw arena slot.
    #[must_use]
    pub const fn new(slot: usize) -> Self {
        ViewKey(slot)
    }

    /// The raw arena slot.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewKey({})", self.0)
    }
}

/// Consumer of view change notifications.
///
/// Every structural edit of the view is bracketed: the `*_about_to_be_*`
/// half announces the edit, the registry is mutated, then the matching
/// completion half fires. Between the two halves no view query is
/// meaningful. `parent` is `None` for the view root (top-level rows).
///
/// All methods default to no-ops so a consumer only implements what it
/// observes. The unit type `()` is the null observer.
#[allow(unused_variables)]
pub trait ViewObserver {
    /// Rows `first..=last` will appear under `parent`.
    fn rows_about_to_be_inserted(&mut self, parent: Option<ViewKey>, first: usize, last: usize) {}

    /// Completion of the matching insert announcement.
    fn rows_inserted(&mut self, parent: Option<ViewKey>, first: usize, last: usize) {}

    /// Rows `first..=last` under `parent` will disappear.
    fn rows_about_to_be_removed(&mut self, parent: Option<ViewKey>, first: usize, last: usize) {}

    /// Completion of the matching removal announcement.
    fn rows_removed(&mut self, parent: Option<ViewKey>, first: usize, last: usize) {}

    /// Rows `first..=last` under `src_parent` will re-attach under
    /// `dst_parent` before row `dst_row` (rows in pre-move coordinates).
    fn rows_about_to_be_moved(
        &mut self,
        src_parent: Option<ViewKey>,
        first: usize,
        last: usize,
        dst_parent: Option<ViewKey>,
        dst_row: usize,
    ) {
    }

    /// Completion of the matching move announcement.
    fn rows_moved(
        &mut self,
        src_parent: Option<ViewKey>,
        first: usize,
        last: usize,
        dst_parent: Option<ViewKey>,
        dst_row: usize,
    ) {
    }

    /// Content of rows `first..=last` under `parent` changed without any
    /// structural effect.
    fn data_changed(&mut self, parent: Option<ViewKey>, first: usize, last: usize) {}

    /// The whole view is about to be invalidated; drop all held keys.
    fn view_about_to_reset(&mut self) {}

    /// The view was rebuilt from scratch.
    fn view_reset(&mut self) {}
}

/// Null observer.
impl ViewObserver for () {}
