//! The filtered-view synchronizer.
//!
//! [`FilterView`] maintains a derived view of a mutable source tree: rows
//! the filter rejects are elided and their visible descendants re-attach to
//! the nearest visible ancestor, preserving document order. The source
//! drives the view by calling the `source_*` handlers around each of its
//! own mutations; the view relays the resulting edits to a [`ViewObserver`]
//! under the same announce-before/after protocol.
//!
//! # Handler contract
//!
//! Handlers must be called exactly once per source mutation, from the half
//! of the mutation their name says: `source_rows_about_to_be_removed` and
//! `source_rows_about_to_be_moved` run while the affected rows are still
//! queryable, `source_rows_inserted` and `source_data_changed` run after
//! the mutation landed. Handlers never re-enter and never call back into
//! the source beyond the [`TreeModel`] queries.

use treesieve_model::{SourceId, TreeModel, ViewKey, ViewObserver};

use crate::coalesce::{self, Run};
use crate::node::ViewTree;
use crate::{build, order};

/// Row visibility predicate.
///
/// `accepts` decides whether row `row` under `parent` is visible. The
/// predicate must be pure with respect to the source's current state: the
/// synchronizer re-evaluates it freely and caches nothing across calls.
pub trait RowFilter {
    fn accepts(&self, model: &dyn TreeModel, row: usize, parent: SourceId) -> bool;
}

impl<F> RowFilter for F
where
    F: Fn(&dyn TreeModel, usize, SourceId) -> bool,
{
    fn accepts(&self, model: &dyn TreeModel, row: usize, parent: SourceId) -> bool {
        self(model, row, parent)
    }
}

bitflags::bitflags! {
    /// Options for mapping a source row range into the view.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RangeSelect: u8 {
        /// For elided rows in the range, select their nearest visible
        /// descendants instead of skipping them.
        const INCLUDE_ELIDED = 1;
    }
}

/// Incremental filtered view over a [`TreeModel`].
///
/// The view holds no reference to the source; every operation that needs
/// source shape takes the model as an argument, which keeps the borrow
/// story trivial and lets one view outlive several model borrows.
#[derive(Debug)]
pub struct FilterView<F> {
    filter: F,
    tree: ViewTree,
}

impl<F: RowFilter> FilterView<F> {
    /// Build a view of `model`'s current state filtered by `filter`.
    #[must_use]
    pub fn new(model: &dyn TreeModel, filter: F) -> Self {
        let mut tree = ViewTree::new();
        build::rebuild(&mut tree, model, &filter);
        Self { filter, tree }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Number of visible rows under `parent` (`None` = view root).
    #[must_use]
    pub fn row_count(&self, parent: Option<ViewKey>) -> usize {
        self.tree.row_count(self.tree.parent_or_root(parent))
    }

    /// Number of columns under `parent` (`None` = view root).
    #[must_use]
    pub fn column_count(&self, parent: Option<ViewKey>) -> usize {
        self.tree.column_count(self.tree.parent_or_root(parent))
    }

    /// Whether `parent` has any visible children.
    #[must_use]
    pub fn has_children(&self, parent: Option<ViewKey>) -> bool {
        !self
            .tree
            .children_of(self.tree.parent_or_root(parent))
            .is_empty()
    }

    /// The visible cell at `(row, column)` under `parent`, if in range.
    #[must_use]
    pub fn child_at(&self, parent: Option<ViewKey>, row: usize, column: usize) -> Option<ViewKey> {
        self.tree
            .child_at(self.tree.parent_or_root(parent), row, column)
    }

    /// Parent of a visible cell, `None` for top-level rows.
    #[must_use]
    pub fn parent_of(&self, key: ViewKey) -> Option<ViewKey> {
        let parent = self.tree.node(key).parent;
        parent.and_then(|p| self.tree.expose(p))
    }

    /// `(row, column)` of a visible cell within its parent.
    #[must_use]
    pub fn view_pos(&self, key: ViewKey) -> (usize, usize) {
        let node = self.tree.node(key);
        (node.row, node.column)
    }

    /// The source cell a view cell mirrors.
    #[must_use]
    pub fn to_source(&self, key: ViewKey) -> SourceId {
        self.tree
            .node(key)
            .source
            .expect("visible nodes carry a source")
    }

    /// The view cell of a source cell, `None` while the row is elided.
    #[must_use]
    pub fn to_view(&self, source: SourceId) -> Option<ViewKey> {
        self.tree.view_of(source)
    }

    /// Total number of visible cells.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.tree.len()
    }

    /// The current predicate.
    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Map source rows `first..=last` under `parent` to coalesced view
    /// bands, each as its `(first, last)` column-0 keys in document order.
    #[must_use]
    pub fn to_view_range(
        &self,
        model: &dyn TreeModel,
        parent: SourceId,
        first: usize,
        last: usize,
        select: RangeSelect,
    ) -> Vec<(ViewKey, ViewKey)> {
        self.view_runs(model, parent, first, last, select)
            .into_iter()
            .map(|run| (run.first, run.last))
            .collect()
    }

    /// [`FilterView::to_view_range`] anchored by two sibling source cells.
    #[must_use]
    pub fn to_view_range_between(
        &self,
        model: &dyn TreeModel,
        left: SourceId,
        right: SourceId,
        select: RangeSelect,
    ) -> Vec<(ViewKey, ViewKey)> {
        let parent = model.parent_of(left);
        debug_assert_eq!(model.parent_of(right), parent, "anchors must be siblings");
        self.to_view_range(model, parent, model.row_of(left), model.row_of(right), select)
    }

    // ------------------------------------------------------------------
    // Filter replacement and resets
    // ------------------------------------------------------------------

    /// Swap the predicate and rebuild, under a reset bracket.
    pub fn set_filter(&mut self, model: &dyn TreeModel, obs: &mut dyn ViewObserver, filter: F) {
        self.filter = filter;
        self.invalidate_filter(model, obs);
    }

    /// Rebuild after the predicate's external state changed.
    ///
    /// All previously handed out keys are invalid afterwards.
    pub fn invalidate_filter(&mut self, model: &dyn TreeModel, obs: &mut dyn ViewObserver) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("invalidate_filter").entered();
        obs.view_about_to_reset();
        build::rebuild(&mut self.tree, model, &self.filter);
        obs.view_reset();
    }

    /// The source is about to be replaced wholesale.
    pub fn source_about_to_reset(&mut self, obs: &mut dyn ViewObserver) {
        obs.view_about_to_reset();
        self.tree.clear();
    }

    /// The source finished a wholesale replacement.
    pub fn source_reset(&mut self, model: &dyn TreeModel, obs: &mut dyn ViewObserver) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("source_reset").entered();
        build::rebuild(&mut self.tree, model, &self.filter);
        obs.view_reset();
    }

    /// The source is about to rearrange rows without insert/remove
    /// notifications. Treated as a reset; keys do not survive.
    pub fn source_layout_about_to_change(&mut self, obs: &mut dyn ViewObserver) {
        self.source_about_to_reset(obs);
    }

    /// Completion of [`FilterView::source_layout_about_to_change`].
    pub fn source_layout_changed(&mut self, model: &dyn TreeModel, obs: &mut dyn ViewObserver) {
        self.source_reset(model, obs);
    }

    // ------------------------------------------------------------------
    // Structural handlers
    // ------------------------------------------------------------------

    /// Protocol half with no view-side work; the insert is applied by
    /// [`FilterView::source_rows_inserted`] once the rows are queryable.
    pub fn source_rows_about_to_be_inserted(&mut self, parent: SourceId, first: usize, last: usize) {
        let _ = (parent, first, last);
    }

    /// Source rows `first..=last` appeared under `parent`.
    pub fn source_rows_inserted(
        &mut self,
        model: &dyn TreeModel,
        obs: &mut dyn ViewObserver,
        parent: SourceId,
        first: usize,
        last: usize,
    ) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("rows_inserted", ?parent, first, last).entered();
        // The visible fringe of the inserted subtrees, in document order.
        let mut roots = Vec::new();
        for row in first..=last {
            let cell0 = model.child_at(parent, row, 0);
            if self.filter.accepts(model, row, parent) {
                roots.push(cell0);
            } else {
                self.collect_visible_sources(model, cell0, &mut roots);
            }
        }
        if roots.is_empty() {
            return;
        }
        let vparent = self.nearest_visible(model, parent);
        let at = self.insert_row_for(model, vparent, roots[0]);
        let count = roots.len();
        obs.rows_about_to_be_inserted(self.tree.expose(vparent), at, at + count - 1);
        for (i, &root) in roots.iter().enumerate() {
            let root_parent = model.parent_of(root);
            let row = model.row_of(root);
            for column in 0..model.column_count(root_parent) {
                let cell = model.child_at(root_parent, row, column);
                let key = self.tree.insert_cell(vparent, cell, at + i, column);
                build::populate(&mut self.tree, model, &self.filter, cell, key);
            }
        }
        self.tree.renumber_children(vparent);
        obs.rows_inserted(self.tree.expose(vparent), at, at + count - 1);
    }

    /// Source rows `first..=last` under `parent` are about to disappear.
    /// Runs while the doomed rows are still queryable.
    pub fn source_rows_about_to_be_removed(
        &mut self,
        model: &dyn TreeModel,
        obs: &mut dyn ViewObserver,
        parent: SourceId,
        first: usize,
        last: usize,
    ) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("rows_removed", ?parent, first, last).entered();
        let runs = self.view_runs(model, parent, first, last, RangeSelect::INCLUDE_ELIDED);
        for run in runs.iter().rev() {
            // Positions are re-read: earlier removals in this loop have
            // renumbered the survivors.
            let first_row = self.tree.node(run.first).row;
            let last_row = self.tree.node(run.last).row;
            let exposed = self.tree.expose(run.parent);
            obs.rows_about_to_be_removed(exposed, first_row, last_row);
            let band = self.tree.take_rows(run.parent, first_row, last_row);
            for key in band {
                self.tree.erase_subtree(key);
            }
            obs.rows_removed(exposed, first_row, last_row);
        }
    }

    /// Protocol half with no view-side work; the removal was applied by
    /// [`FilterView::source_rows_about_to_be_removed`].
    pub fn source_rows_removed(&mut self, parent: SourceId, first: usize, last: usize) {
        let _ = (parent, first, last);
    }

    /// Source rows `first..=last` are about to re-attach from `src_parent`
    /// to `dst_parent` before `dst_row` (pre-move coordinates). Runs while
    /// the source still has its pre-move shape.
    pub fn source_rows_about_to_be_moved(
        &mut self,
        model: &dyn TreeModel,
        obs: &mut dyn ViewObserver,
        src_parent: SourceId,
        first: usize,
        last: usize,
        dst_parent: SourceId,
        dst_row: usize,
    ) {
        #[cfg(feature = "tracing")]
        let _span =
            tracing::debug_span!("rows_moved", ?src_parent, first, last, ?dst_parent, dst_row)
                .entered();
        let runs = self.view_runs(model, src_parent, first, last, RangeSelect::INCLUDE_ELIDED);
        if runs.is_empty() {
            return;
        }
        let dst_vparent = self.nearest_visible(model, dst_parent);
        let mut at = if dst_row < model.row_count(dst_parent) {
            let anchor = model.child_at(dst_parent, dst_row, 0);
            self.insert_row_for(model, dst_vparent, anchor)
        } else {
            // Appending past the last row: anchor on the first row after
            // dst_parent's whole subtree, or the end of the run.
            match order::next_in_parent_order(model, dst_parent) {
                Some(successor) => self.insert_row_for(model, dst_vparent, successor),
                None => self.tree.column_range(dst_vparent, 0).len(),
            }
        };
        for run in runs {
            let first_row = self.tree.node(run.first).row;
            let last_row = self.tree.node(run.last).row;
            let count = last_row - first_row + 1;
            if run.parent == dst_vparent && at >= first_row && at <= last_row + 1 {
                // The band would land where it already sits.
                at = last_row + 1;
                continue;
            }
            let src_exposed = self.tree.expose(run.parent);
            let dst_exposed = self.tree.expose(dst_vparent);
            obs.rows_about_to_be_moved(src_exposed, first_row, last_row, dst_exposed, at);
            let band = self.tree.take_rows(run.parent, first_row, last_row);
            let at_eff = if run.parent == dst_vparent && first_row < at {
                at - count
            } else {
                at
            };
            self.tree.splice_rows(dst_vparent, at_eff, &band);
            obs.rows_moved(src_exposed, first_row, last_row, dst_exposed, at);
            at = at_eff + count;
        }
    }

    /// Protocol half with no view-side work; the move was applied by
    /// [`FilterView::source_rows_about_to_be_moved`].
    pub fn source_rows_moved(
        &mut self,
        src_parent: SourceId,
        first: usize,
        last: usize,
        dst_parent: SourceId,
        dst_row: usize,
    ) {
        let _ = (src_parent, first, last, dst_parent, dst_row);
    }

    /// Content of source rows `first..=last` under `parent` changed.
    ///
    /// Re-evaluates the predicate for each row: rows whose visibility
    /// flipped are revealed or hidden structurally; rows that stay visible
    /// are forwarded as coalesced content changes. Rows that stay elided
    /// produce nothing.
    pub fn source_data_changed(
        &mut self,
        model: &dyn TreeModel,
        obs: &mut dyn ViewObserver,
        parent: SourceId,
        first: usize,
        last: usize,
    ) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("data_changed", ?parent, first, last).entered();
        let mut stable = Vec::new();
        // Last row first, so a flip never disturbs the rows still pending.
        for row in (first..=last).rev() {
            let cell0 = model.child_at(parent, row, 0);
            match (self.tree.view_of(cell0), self.filter.accepts(model, row, parent)) {
                (Some(_), true) => stable.push(cell0),
                (Some(key), false) => self.hide_row(obs, key),
                (None, true) => self.reveal_row(model, obs, parent, row),
                (None, false) => {}
            }
        }
        // Positions are read after the structural repairs above.
        let keys: Vec<ViewKey> = stable
            .iter()
            .filter_map(|&source| self.tree.view_of(source))
            .collect();
        for run in coalesce::coalesce_sorted(&self.tree, keys) {
            obs.data_changed(self.tree.expose(run.parent), run.first_row, run.last_row);
        }
    }

    // ------------------------------------------------------------------
    // Visibility flips
    // ------------------------------------------------------------------

    /// A previously elided source row became visible: insert it at its
    /// document-order position, then adopt its formerly re-parented
    /// descendants back under it.
    fn reveal_row(
        &mut self,
        model: &dyn TreeModel,
        obs: &mut dyn ViewObserver,
        source_parent: SourceId,
        row: usize,
    ) {
        let cell0 = model.child_at(source_parent, row, 0);
        let vparent = self.nearest_visible(model, source_parent);
        let at = self.insert_row_for(model, vparent, cell0);
        let exposed = self.tree.expose(vparent);
        obs.rows_about_to_be_inserted(exposed, at, at);
        let mut key0 = None;
        for column in 0..model.column_count(source_parent) {
            let cell = model.child_at(source_parent, row, column);
            let key = self.tree.insert_cell(vparent, cell, at, column);
            if column == 0 {
                key0 = Some(key);
            }
        }
        self.tree.renumber_children(vparent);
        obs.rows_inserted(exposed, at, at);
        let key0 = key0.expect("every row has a column-0 cell");

        // Visible descendants of the revealed row sit right after it in
        // vparent's run; move that contiguous band under the new node.
        let run = self.tree.column_range(vparent, 0);
        let col0 = &self.tree.children_of(vparent)[run];
        let mut adopted = 0;
        for &key in col0.iter().skip(at + 1) {
            let source = self
                .tree
                .node(key)
                .source
                .expect("visible nodes carry a source");
            if order::is_descendant(model, source, cell0) {
                adopted += 1;
            } else {
                break;
            }
        }
        if adopted > 0 {
            let first = at + 1;
            let last = at + adopted;
            obs.rows_about_to_be_moved(exposed, first, last, Some(key0), 0);
            let band = self.tree.take_rows(vparent, first, last);
            self.tree.splice_rows(key0, 0, &band);
            obs.rows_moved(exposed, first, last, Some(key0), 0);
        }
    }

    /// A visible source row was rejected: promote its child rows to its
    /// parent (keeping document order), then remove the row itself.
    fn hide_row(&mut self, obs: &mut dyn ViewObserver, key: ViewKey) {
        let node = self.tree.node(key);
        let vparent = node.parent.unwrap_or_else(|| self.tree.root());
        let row_v = node.row;
        let exposed = self.tree.expose(vparent);

        let mut insert_at = row_v + 1;
        for column in 0..self.tree.column_count(vparent) {
            let Some(cell) = self.tree.child_at(vparent, row_v, column) else {
                continue;
            };
            let rows = self.tree.row_count(cell);
            if rows == 0 {
                continue;
            }
            obs.rows_about_to_be_moved(Some(cell), 0, rows - 1, exposed, insert_at);
            let band = self.tree.take_rows(cell, 0, rows - 1);
            self.tree.splice_rows(vparent, insert_at, &band);
            obs.rows_moved(Some(cell), 0, rows - 1, exposed, insert_at);
            insert_at += rows;
        }

        obs.rows_about_to_be_removed(exposed, row_v, row_v);
        let band = self.tree.take_rows(vparent, row_v, row_v);
        for key in band {
            self.tree.erase_subtree(key);
        }
        obs.rows_removed(exposed, row_v, row_v);
    }

    // ------------------------------------------------------------------
    // Internal mapping helpers
    // ------------------------------------------------------------------

    /// View node of `source`'s nearest visible self-or-ancestor; the view
    /// root when every ancestor is elided.
    fn nearest_visible(&self, model: &dyn TreeModel, source: SourceId) -> ViewKey {
        let mut cur = source;
        loop {
            if cur.is_root() {
                return self.tree.root();
            }
            if let Some(key) = self.tree.view_of(cur) {
                return key;
            }
            cur = model.parent_of(cur);
        }
    }

    /// Row index within `vparent`'s column-0 run where a node for `source`
    /// belongs, per document order.
    fn insert_row_for(&self, model: &dyn TreeModel, vparent: ViewKey, source: SourceId) -> usize {
        let range = self.tree.column_range(vparent, 0);
        self.tree.children_of(vparent)[range].partition_point(|&key| {
            let existing = self
                .tree
                .node(key)
                .source
                .expect("visible nodes carry a source");
            order::precedes(model, existing, source)
        })
    }

    /// Column-0 view keys covered by source rows `first..=last` under
    /// `parent`, coalesced into runs. Elided rows contribute their nearest
    /// visible descendants when `select` asks for them.
    fn view_runs(
        &self,
        model: &dyn TreeModel,
        parent: SourceId,
        first: usize,
        last: usize,
        select: RangeSelect,
    ) -> Vec<Run> {
        let mut keys = Vec::new();
        for row in first..=last {
            let cell0 = model.child_at(parent, row, 0);
            if let Some(key) = self.tree.view_of(cell0) {
                keys.push(key);
            } else if select.contains(RangeSelect::INCLUDE_ELIDED) {
                self.collect_visible_keys(model, cell0, &mut keys);
            }
        }
        coalesce::coalesce_sorted(&self.tree, keys)
    }

    /// Keys of the visible fringe inside an elided row's subtree.
    fn collect_visible_keys(
        &self,
        model: &dyn TreeModel,
        source_parent: SourceId,
        keys: &mut Vec<ViewKey>,
    ) {
        for row in 0..model.row_count(source_parent) {
            let cell0 = model.child_at(source_parent, row, 0);
            if let Some(key) = self.tree.view_of(cell0) {
                keys.push(key);
            } else {
                self.collect_visible_keys(model, cell0, keys);
            }
        }
    }

    /// Like [`FilterView::collect_visible_keys`] but predicate-driven, for
    /// subtrees that have no view nodes yet.
    fn collect_visible_sources(
        &self,
        model: &dyn TreeModel,
        source_parent: SourceId,
        out: &mut Vec<SourceId>,
    ) {
        for row in 0..model.row_count(source_parent) {
            let cell0 = model.child_at(source_parent, row, 0);
            if self.filter.accepts(model, row, source_parent) {
                out.push(cell0);
            } else {
                self.collect_visible_sources(model, cell0, out);
            }
        }
    }
}
