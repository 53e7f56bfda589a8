//! Document order over source positions.
//!
//! A source cell precedes another when its row comes first in a depth-first
//! walk of the source tree, with an ancestor ordered before every one of its
//! descendants. Cells of the same row are ordered by column. The comparison
//! works on ancestor chains, so it needs nothing beyond the [`TreeModel`]
//! navigation queries and stays valid across mutations.

use treesieve_model::{SourceId, TreeModel};

/// Column-0 projection of a cell: the cell in the same row at column 0.
fn column_zero(model: &dyn TreeModel, node: SourceId) -> SourceId {
    if node.is_root() || model.column_of(node) == 0 {
        node
    } else {
        model.child_at(model.parent_of(node), model.row_of(node), 0)
    }
}

/// Root-first chain of column-0 ancestors of `node`, `node` included.
fn ancestor_chain(model: &dyn TreeModel, node: SourceId) -> Vec<SourceId> {
    let mut chain = Vec::new();
    let mut cur = node;
    while !cur.is_root() {
        chain.push(cur);
        cur = column_zero(model, model.parent_of(cur));
    }
    chain.reverse();
    chain
}

/// Whether `a` comes strictly before `b` in document order.
pub(crate) fn precedes(model: &dyn TreeModel, a: SourceId, b: SourceId) -> bool {
    if a == b {
        return false;
    }
    let a0 = column_zero(model, a);
    let b0 = column_zero(model, b);
    if a0 == b0 {
        // Same row: order by column.
        return model.column_of(a) < model.column_of(b);
    }
    let ca = ancestor_chain(model, a0);
    let cb = ancestor_chain(model, b0);
    for (&x, &y) in ca.iter().zip(cb.iter()) {
        if x != y {
            // First divergence: both are rows under the same parent.
            return model.row_of(x) < model.row_of(y);
        }
    }
    // One chain is a prefix of the other: the ancestor comes first.
    ca.len() < cb.len()
}

/// Whether `node`'s row sits strictly inside `ancestor`'s subtree.
pub(crate) fn is_descendant(model: &dyn TreeModel, node: SourceId, ancestor: SourceId) -> bool {
    let mut cur = column_zero(model, node);
    while !cur.is_root() {
        cur = model.parent_of(cur);
        if cur == ancestor {
            return true;
        }
    }
    false
}

/// The first row after `node`'s subtree in document order, as a column-0
/// cell. Walks up until some ancestor still has a next sibling; `None`
/// means `node`'s subtree ends the whole tree.
pub(crate) fn next_in_parent_order(model: &dyn TreeModel, node: SourceId) -> Option<SourceId> {
    let mut cur = column_zero(model, node);
    loop {
        if cur.is_root() {
            return None;
        }
        let parent = model.parent_of(cur);
        let next = model.row_of(cur) + 1;
        if next < model.row_count(parent) {
            return Some(model.child_at(parent, next, 0));
        }
        cur = column_zero(model, parent);
    }
}
