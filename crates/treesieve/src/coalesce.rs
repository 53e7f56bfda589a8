//! Coalescing of view rows into maximal contiguous runs.
//!
//! Handlers that touch several view rows at once notify per run rather than
//! per row. A run is a maximal sequence of rows under one parent whose row
//! numbers are strictly consecutive; rows under different parents never
//! share a run, even when they are adjacent in iteration order.

use treesieve_model::ViewKey;

use crate::node::ViewTree;

/// One contiguous band of sibling view rows.
///
/// `first`/`last` are the column-0 keys of the band's end rows. Row numbers
/// are captured at build time and go stale as soon as the tree mutates;
/// consumers that mutate between runs re-read them through the keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Run {
    pub parent: ViewKey,
    pub first: ViewKey,
    pub last: ViewKey,
    pub first_row: usize,
    pub last_row: usize,
}

/// Accumulates keys into [`Run`]s.
#[derive(Debug, Default)]
pub(crate) struct RunBuilder {
    open: Option<Run>,
    done: Vec<Run>,
}

impl RunBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next column-0 view key. Extends the open run when the key
    /// is the row right after it under the same parent.
    pub fn push(&mut self, tree: &ViewTree, key: ViewKey) {
        let node = tree.node(key);
        let parent = node.parent.unwrap_or(tree.root());
        let row = node.row;
        if let Some(run) = &mut self.open {
            if run.parent == parent && row == run.last_row + 1 {
                run.last = key;
                run.last_row = row;
                return;
            }
            self.done.push(*run);
        }
        self.open = Some(Run {
            parent,
            first: key,
            last: key,
            first_row: row,
            last_row: row,
        });
    }

    pub fn finish(mut self) -> Vec<Run> {
        if let Some(run) = self.open.take() {
            self.done.push(run);
        }
        self.done
    }
}

/// Coalesce an arbitrary set of column-0 keys, sorting by parent and row
/// first so every maximal band is found.
pub(crate) fn coalesce_sorted(tree: &ViewTree, mut keys: Vec<ViewKey>) -> Vec<Run> {
    keys.sort_by_key(|&k| {
        let node = tree.node(k);
        (node.parent.unwrap_or(tree.root()).slot(), node.row)
    });
    let mut builder = RunBuilder::new();
    for key in keys {
        builder.push(tree, key);
    }
    builder.finish()
}
