//! Shared glue for the integration tests: a fixture that drives the
//! synchronizer's handlers around each source mutation, plus consistency
//! checks against a from-scratch rebuild.
#![allow(dead_code)]

use treesieve::{FilterView, SourceId, TreeModel, ViewKey};
use treesieve_harness::{Recorder, ScriptTree};

pub type Filter = fn(&dyn TreeModel, usize, SourceId) -> bool;

/// A source tree, the view kept in sync with it, and the recorded
/// notification stream.
pub struct Fixture {
    pub source: ScriptTree,
    pub view: FilterView<Filter>,
    pub rec: Recorder,
}

impl Fixture {
    pub fn new(source: ScriptTree, filter: Filter) -> Self {
        let view = FilterView::new(&source, filter);
        Self {
            source,
            view,
            rec: Recorder::new(),
        }
    }

    pub fn insert(&mut self, parent: SourceId, at: usize, label: &str) -> SourceId {
        self.view.source_rows_about_to_be_inserted(parent, at, at);
        let id = self.source.insert(parent, at, label);
        self.view
            .source_rows_inserted(&self.source, &mut self.rec, parent, at, at);
        id
    }

    pub fn push(&mut self, parent: SourceId, label: &str) -> SourceId {
        let at = self.source.row_count(parent);
        self.insert(parent, at, label)
    }

    pub fn remove(&mut self, parent: SourceId, first: usize, last: usize) {
        self.view
            .source_rows_about_to_be_removed(&self.source, &mut self.rec, parent, first, last);
        self.source.remove(parent, first, last);
        self.view.source_rows_removed(parent, first, last);
    }

    pub fn move_rows(
        &mut self,
        src_parent: SourceId,
        first: usize,
        last: usize,
        dst_parent: SourceId,
        dst_row: usize,
    ) {
        self.view.source_rows_about_to_be_moved(
            &self.source,
            &mut self.rec,
            src_parent,
            first,
            last,
            dst_parent,
            dst_row,
        );
        self.source.move_rows(src_parent, first, last, dst_parent, dst_row);
        self.view
            .source_rows_moved(src_parent, first, last, dst_parent, dst_row);
    }

    /// Relabel one row and report it as a content change.
    pub fn relabel(&mut self, row: SourceId, label: &str) {
        self.source.set_label(row, label);
        let parent = self.source.parent_of(row);
        let at = self.source.row_of(row);
        self.view
            .source_data_changed(&self.source, &mut self.rec, parent, at, at);
    }

    /// Labels of the visible rows under `parent`, in row order.
    pub fn labels_under(&self, parent: Option<ViewKey>) -> Vec<String> {
        (0..self.view.row_count(parent))
            .map(|row| {
                let key = self.view.child_at(parent, row, 0).unwrap();
                self.source.text(self.view.to_source(key))
            })
            .collect()
    }

    /// The view key of a source row that must currently be visible.
    pub fn vkey(&self, row: SourceId) -> ViewKey {
        self.view.to_view(row).unwrap()
    }
}

/// Full consistency check: the notification stream is well bracketed and
/// the incrementally maintained view matches a from-scratch rebuild.
pub fn assert_synced(fix: &Fixture) {
    assert!(fix.rec.brackets_paired(), "unpaired announce bracket");
    let fresh = FilterView::new(&fix.source, *fix.view.filter());
    assert_eq!(fix.view.visible_count(), fresh.visible_count());
    assert_same_shape(&fix.view, None, &fresh, None);
}

fn assert_same_shape(
    a: &FilterView<Filter>,
    pa: Option<ViewKey>,
    b: &FilterView<Filter>,
    pb: Option<ViewKey>,
) {
    assert_eq!(a.row_count(pa), b.row_count(pb), "row count diverged");
    assert_eq!(a.column_count(pa), b.column_count(pb), "column count diverged");
    for row in 0..a.row_count(pa) {
        for column in 0..a.column_count(pa) {
            let ka = a.child_at(pa, row, column).unwrap();
            let kb = b.child_at(pb, row, column).unwrap();
            assert_eq!(a.to_source(ka), b.to_source(kb), "source mapping diverged");
            // Round trip and dense numbering hold at every cell.
            assert_eq!(a.to_view(a.to_source(ka)), Some(ka));
            assert_eq!(a.view_pos(ka), (row, column));
            assert_eq!(a.parent_of(ka), pa);
            if column == 0 {
                assert_same_shape(a, Some(ka), b, Some(kb));
            }
        }
    }
}
