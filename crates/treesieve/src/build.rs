//! Full rebuild of a view tree from a source model.

use treesieve_model::{SourceId, TreeModel, ViewKey};

use crate::node::ViewTree;
use crate::sync::RowFilter;

/// Throw away the current view and repopulate it from scratch.
///
/// The walk is depth-first over source rows, so sibling runs come out
/// sorted and densely numbered without a separate pass. Two rebuilds of
/// the same source with the same filter produce identical trees, keys
/// included.
pub(crate) fn rebuild(tree: &mut ViewTree, model: &dyn TreeModel, filter: &dyn RowFilter) {
    tree.clear();
    let root = tree.root();
    populate(tree, model, filter, SourceId::ROOT, root);
}

/// Mirror the visible part of `source_parent`'s subtree under `attach`.
///
/// Rejected rows are elided: their cells get no node and their children
/// are walked with the same `attach`, re-parenting visible descendants to
/// the nearest visible ancestor.
pub(crate) fn populate(
    tree: &mut ViewTree,
    model: &dyn TreeModel,
    filter: &dyn RowFilter,
    source_parent: SourceId,
    attach: ViewKey,
) {
    let rows = model.row_count(source_parent);
    let columns = model.column_count(source_parent);
    for row in 0..rows {
        let visible = filter.accepts(model, row, source_parent);
        for column in 0..columns {
            let cell = model.child_at(source_parent, row, column);
            if visible {
                let key = tree.append_cell(attach, cell, column);
                populate(tree, model, filter, cell, key);
            } else {
                populate(tree, model, filter, cell, attach);
            }
        }
    }
}
