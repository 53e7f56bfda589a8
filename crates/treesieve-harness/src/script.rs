//! A scriptable in-memory source tree.

use std::collections::HashMap;

use treesieve_model::{SourceId, TreeModel};

/// One source row: a label, one cell handle per column, and child rows.
#[derive(Debug, Clone)]
struct Row {
    label: String,
    parent: SourceId,
    /// Cell handles, one per column; `cells[0]` is the row's own id.
    cells: Vec<SourceId>,
    /// Column-0 ids of child rows, in row order.
    children: Vec<SourceId>,
}

/// Mutable in-memory tree implementing [`TreeModel`].
///
/// Rows are identified by their column-0 cell handle. Mutations only touch
/// this tree; driving a synchronizer's handlers around each mutation is the
/// caller's job, which is exactly what lets tests exercise the notification
/// protocol step by step.
#[derive(Debug, Clone)]
pub struct ScriptTree {
    columns: usize,
    next_id: u64,
    rows: HashMap<SourceId, Row>,
    /// Any cell handle -> (owning row id, column).
    cells: HashMap<SourceId, (SourceId, usize)>,
}

impl ScriptTree {
    /// Empty single-column tree.
    #[must_use]
    pub fn new() -> Self {
        Self::with_columns(1)
    }

    /// Empty tree with `columns` columns per row.
    ///
    /// # Panics
    /// Panics if `columns == 0`.
    #[must_use]
    pub fn with_columns(columns: usize) -> Self {
        assert!(columns > 0, "a tree needs at least one column");
        let mut rows = HashMap::new();
        rows.insert(
            SourceId::ROOT,
            Row {
                label: String::new(),
                parent: SourceId::ROOT,
                cells: Vec::new(),
                children: Vec::new(),
            },
        );
        Self {
            columns,
            next_id: 1,
            rows,
            cells: HashMap::new(),
        }
    }

    fn alloc(&mut self) -> SourceId {
        let id = SourceId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert one row at `at` under `parent` (a row id or `ROOT`).
    /// Returns the new row's id.
    pub fn insert(&mut self, parent: SourceId, at: usize, label: impl Into<String>) -> SourceId {
        let mut cells = Vec::with_capacity(self.columns);
        for _ in 0..self.columns {
            cells.push(self.alloc());
        }
        let id = cells[0];
        for (col, &cell) in cells.iter().enumerate() {
            self.cells.insert(cell, (id, col));
        }
        self.rows.insert(
            id,
            Row {
                label: label.into(),
                parent,
                cells,
                children: Vec::new(),
            },
        );
        let siblings = &mut self.rows.get_mut(&parent).expect("unknown parent").children;
        assert!(at <= siblings.len(), "insert position out of range");
        siblings.insert(at, id);
        id
    }

    /// Append one row under `parent`.
    pub fn push(&mut self, parent: SourceId, label: impl Into<String>) -> SourceId {
        let at = self.rows[&parent].children.len();
        self.insert(parent, at, label)
    }

    /// Remove rows `first..=last` under `parent`, subtrees included.
    pub fn remove(&mut self, parent: SourceId, first: usize, last: usize) {
        let siblings = &mut self.rows.get_mut(&parent).expect("unknown parent").children;
        assert!(first <= last && last < siblings.len(), "range out of shape");
        let doomed: Vec<SourceId> = siblings.drain(first..=last).collect();
        for id in doomed {
            self.drop_subtree(id);
        }
    }

    fn drop_subtree(&mut self, id: SourceId) {
        let row = self.rows.remove(&id).expect("unknown row");
        for cell in row.cells {
            self.cells.remove(&cell);
        }
        for child in row.children {
            self.drop_subtree(child);
        }
    }

    /// Move rows `first..=last` from `src_parent` before `dst_row` of
    /// `dst_parent`, with `dst_row` in pre-move coordinates.
    pub fn move_rows(
        &mut self,
        src_parent: SourceId,
        first: usize,
        last: usize,
        dst_parent: SourceId,
        dst_row: usize,
    ) {
        let src = &mut self.rows.get_mut(&src_parent).expect("unknown parent").children;
        assert!(first <= last && last < src.len(), "range out of shape");
        let block: Vec<SourceId> = src.drain(first..=last).collect();

        let mut at = dst_row;
        if src_parent == dst_parent && dst_row > last {
            at -= block.len();
        }
        for &id in &block {
            self.rows.get_mut(&id).expect("unknown row").parent = dst_parent;
        }
        let dst = &mut self.rows.get_mut(&dst_parent).expect("unknown parent").children;
        assert!(at <= dst.len(), "destination out of range");
        dst.splice(at..at, block);
    }

    /// Replace a row's label.
    pub fn set_label(&mut self, row: SourceId, label: impl Into<String>) {
        self.rows.get_mut(&row).expect("unknown row").label = label.into();
    }

    /// The label of a row (or of any of its cells).
    #[must_use]
    pub fn label_of(&self, node: SourceId) -> &str {
        let row = self.row_id(node);
        &self.rows[&row].label
    }

    /// The cell handle of `row` at `column`.
    #[must_use]
    pub fn cell(&self, row: SourceId, column: usize) -> SourceId {
        self.rows[&row].cells[column]
    }

    /// Total number of rows (root excluded).
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.rows.len() - 1
    }

    fn row_id(&self, node: SourceId) -> SourceId {
        if node.is_root() {
            SourceId::ROOT
        } else {
            self.cells.get(&node).expect("unknown cell").0
        }
    }
}

impl Default for ScriptTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeModel for ScriptTree {
    fn row_count(&self, parent: SourceId) -> usize {
        if parent.is_root() {
            return self.rows[&SourceId::ROOT].children.len();
        }
        let (row, column) = self.cells[&parent];
        // Children hang off the column-0 cell only.
        if column == 0 {
            self.rows[&row].children.len()
        } else {
            0
        }
    }

    fn column_count(&self, _parent: SourceId) -> usize {
        self.columns
    }

    fn child_at(&self, parent: SourceId, row: usize, column: usize) -> SourceId {
        let parent_row = self.row_id(parent);
        let child = self.rows[&parent_row].children[row];
        self.rows[&child].cells[column]
    }

    fn parent_of(&self, node: SourceId) -> SourceId {
        self.rows[&self.row_id(node)].parent
    }

    fn row_of(&self, node: SourceId) -> usize {
        let row = self.row_id(node);
        let parent = self.rows[&row].parent;
        self.rows[&parent]
            .children
            .iter()
            .position(|&c| c == row)
            .expect("row detached from parent")
    }

    fn column_of(&self, node: SourceId) -> usize {
        self.cells[&node].1
    }

    fn text(&self, node: SourceId) -> String {
        self.label_of(node).to_owned()
    }
}
