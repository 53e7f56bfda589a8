//! View node records and the registry that owns them.
//!
//! Nodes live in a [`slab::Slab`] arena and refer to each other through
//! [`ViewKey`] handles, so re-parenting is a plain data update and no
//! ownership cycles exist. One distinguished node, the hidden root, is the
//! parent of all top-level visible rows; it has no source and is never
//! handed out to consumers.
//!
//! # Invariants
//!
//! 1. Every node reachable from the hidden root has a source the filter
//!    currently accepts.
//! 2. A node's children are sorted by `(column, row)` and each column's
//!    rows are densely numbered `0..count`.
//! 3. `by_source` maps exactly the visible sources, each to its own node.
//! 4. A child's `parent` names the node whose `children` holds it.
//!
//! The registry offers primitives only; keeping the invariants across a
//! whole edit is the synchronizer's job, and they may be broken between
//! two primitive calls inside one handler.

use std::collections::HashMap;
use std::ops::Range;

use slab::Slab;
use treesieve_model::{SourceId, ViewKey};

/// Record for one visible cell of the view.
#[derive(Debug, Clone)]
pub(crate) struct ViewNode {
    /// Source cell this node mirrors. `None` only for the hidden root.
    pub source: Option<SourceId>,
    /// Owning parent. `None` only for the hidden root.
    pub parent: Option<ViewKey>,
    /// Row within the parent, per column.
    pub row: usize,
    /// Column within the parent.
    pub column: usize,
    /// Child keys, sorted by `(column, row)`.
    pub children: Vec<ViewKey>,
}

/// Arena of view nodes plus the source-to-view index.
#[derive(Debug, Clone)]
pub(crate) struct ViewTree {
    nodes: Slab<ViewNode>,
    root: ViewKey,
    by_source: HashMap<SourceId, ViewKey>,
}

impl ViewTree {
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let root = ViewKey::new(nodes.insert(ViewNode {
            source: None,
            parent: None,
            row: 0,
            column: 0,
            children: Vec::new(),
        }));
        Self {
            nodes,
            root,
            by_source: HashMap::new(),
        }
    }

    /// Drop every node except a fresh hidden root.
    ///
    /// Slot allocation restarts, so two identical builds after `clear`
    /// produce identical keys.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.by_source.clear();
        self.root = ViewKey::new(self.nodes.insert(ViewNode {
            source: None,
            parent: None,
            row: 0,
            column: 0,
            children: Vec::new(),
        }));
    }

    pub fn root(&self) -> ViewKey {
        self.root
    }

    /// Number of visible nodes (hidden root excluded).
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn contains(&self, key: ViewKey) -> bool {
        self.nodes.contains(key.slot())
    }

    pub fn node(&self, key: ViewKey) -> &ViewNode {
        &self.nodes[key.slot()]
    }

    pub fn node_mut(&mut self, key: ViewKey) -> &mut ViewNode {
        &mut self.nodes[key.slot()]
    }

    pub fn children_of(&self, key: ViewKey) -> &[ViewKey] {
        &self.nodes[key.slot()].children
    }

    /// The view node of a visible source cell.
    pub fn view_of(&self, source: SourceId) -> Option<ViewKey> {
        self.by_source.get(&source).copied()
    }

    /// Map an optional consumer-facing parent to a key (`None` = root).
    pub fn parent_or_root(&self, parent: Option<ViewKey>) -> ViewKey {
        parent.unwrap_or(self.root)
    }

    /// Consumer-facing form of a parent key: the hidden root becomes `None`.
    pub fn expose(&self, key: ViewKey) -> Option<ViewKey> {
        if key == self.root { None } else { Some(key) }
    }

    /// Index range of `column`'s run within `parent`'s children.
    pub fn column_range(&self, parent: ViewKey, column: usize) -> Range<usize> {
        let children = &self.nodes[parent.slot()].children;
        let start = children.partition_point(|&k| self.nodes[k.slot()].column < column);
        let end = children.partition_point(|&k| self.nodes[k.slot()].column <= column);
        start..end
    }

    /// Child at `(row, column)` under `parent`, if in range.
    pub fn child_at(&self, parent: ViewKey, row: usize, column: usize) -> Option<ViewKey> {
        let range = self.column_range(parent, column);
        if row >= range.len() {
            return None;
        }
        let key = self.nodes[parent.slot()].children[range.start + row];
        debug_assert_eq!(self.nodes[key.slot()].row, row);
        debug_assert_eq!(self.nodes[key.slot()].column, column);
        Some(key)
    }

    /// Number of child rows under `parent` (rows are uniform per column).
    pub fn row_count(&self, parent: ViewKey) -> usize {
        match self.nodes[parent.slot()].children.last() {
            Some(&k) => self.nodes[k.slot()].row + 1,
            None => 0,
        }
    }

    /// Number of child columns under `parent`.
    pub fn column_count(&self, parent: ViewKey) -> usize {
        match self.nodes[parent.slot()].children.last() {
            Some(&k) => self.nodes[k.slot()].column + 1,
            None => 0,
        }
    }

    /// Allocate a node for `source` and append it at the end of `column`'s
    /// run. Callers append in document order, which keeps the run sorted.
    pub fn append_cell(&mut self, parent: ViewKey, source: SourceId, column: usize) -> ViewKey {
        let range = self.column_range(parent, column);
        let row = range.len();
        let at = range.end;
        let key = ViewKey::new(self.nodes.insert(ViewNode {
            source: Some(source),
            parent: Some(parent),
            row,
            column,
            children: Vec::new(),
        }));
        self.by_source.insert(source, key);
        self.nodes[parent.slot()].children.insert(at, key);
        key
    }

    /// Allocate a node for `source` and insert it at `at_row` of `column`'s
    /// run. Does not renumber the displaced siblings.
    pub fn insert_cell(
        &mut self,
        parent: ViewKey,
        source: SourceId,
        at_row: usize,
        column: usize,
    ) -> ViewKey {
        let range = self.column_range(parent, column);
        debug_assert!(at_row <= range.len(), "insert past the end of a column run");
        let at = range.start + at_row;
        let key = ViewKey::new(self.nodes.insert(ViewNode {
            source: Some(source),
            parent: Some(parent),
            row: at_row,
            column,
            children: Vec::new(),
        }));
        self.by_source.insert(source, key);
        self.nodes[parent.slot()].children.insert(at, key);
        key
    }

    /// Restore dense `0..count` row numbering per column of `parent`.
    pub fn renumber_children(&mut self, parent: ViewKey) {
        let children = self.nodes[parent.slot()].children.clone();
        let mut column = usize::MAX;
        let mut next = 0;
        for key in children {
            let node = &mut self.nodes[key.slot()];
            if node.column != column {
                column = node.column;
                next = 0;
            }
            node.row = next;
            next += 1;
        }
    }

    /// Detach rows `first..=last` (all columns) from `parent`, renumber the
    /// remaining children, and return the detached keys in `(column, row)`
    /// order. The detached nodes keep their subtrees and stale coordinates.
    pub fn take_rows(&mut self, parent: ViewKey, first: usize, last: usize) -> Vec<ViewKey> {
        debug_assert!(first <= last);
        let children = std::mem::take(&mut self.nodes[parent.slot()].children);
        let mut kept = Vec::with_capacity(children.len());
        let mut taken = Vec::new();
        for key in children {
            let row = self.nodes[key.slot()].row;
            if (first..=last).contains(&row) {
                taken.push(key);
            } else {
                kept.push(key);
            }
        }
        self.nodes[parent.slot()].children = kept;
        self.renumber_children(parent);
        taken
    }

    /// Attach a band of full rows (keys in `(column, row)` order, as
    /// returned by [`ViewTree::take_rows`]) under `parent`, each column's
    /// segment spliced in before `at_row`, then renumber.
    pub fn splice_rows(&mut self, parent: ViewKey, at_row: usize, band: &[ViewKey]) {
        let mut i = 0;
        while i < band.len() {
            let column = self.nodes[band[i].slot()].column;
            let mut j = i;
            while j < band.len() && self.nodes[band[j].slot()].column == column {
                j += 1;
            }
            let range = self.column_range(parent, column);
            debug_assert!(at_row <= range.len(), "splice past the end of a column run");
            let at = range.start + at_row;
            self.nodes[parent.slot()]
                .children
                .splice(at..at, band[i..j].iter().copied());
            i = j;
        }
        for &key in band {
            self.nodes[key.slot()].parent = Some(parent);
        }
        self.renumber_children(parent);
    }

    /// Erase `key` and its whole subtree from the arena and the source
    /// index. The key must already be detached from its parent's children.
    pub fn erase_subtree(&mut self, key: ViewKey) {
        debug_assert_ne!(key, self.root, "the hidden root is never erased");
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            let node = self.nodes.remove(key.slot());
            if let Some(source) = node.source {
                self.by_source.remove(&source);
            }
            stack.extend(node.children);
        }
    }
}
