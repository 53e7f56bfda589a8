//! End-to-end scenarios driving a view through source mutations.
//!
//! The recurring tree is `A[A1, A2[A2a]], B` with a predicate that rejects
//! labels ending in `'2'`, so A2 starts out elided and A2a surfaces as A's
//! second child.

mod common;

use common::{assert_synced, Fixture};
use treesieve::{RangeSelect, SourceId, TreeModel};
use treesieve_harness::{ScriptTree, ViewEvent};

fn reject_twos(model: &dyn TreeModel, row: usize, parent: SourceId) -> bool {
    !model.text(model.child_at(parent, row, 0)).ends_with('2')
}

fn accept_all(_: &dyn TreeModel, _: usize, _: SourceId) -> bool {
    true
}

struct Nodes {
    a: SourceId,
    a1: SourceId,
    a2: SourceId,
    a2a: SourceId,
    b: SourceId,
}

fn sample_tree() -> (ScriptTree, Nodes) {
    let mut tree = ScriptTree::new();
    let a = tree.push(SourceId::ROOT, "A");
    let a1 = tree.push(a, "A1");
    let a2 = tree.push(a, "A2");
    let a2a = tree.push(a2, "A2a");
    let b = tree.push(SourceId::ROOT, "B");
    (tree, Nodes { a, a1, a2, a2a, b })
}

#[test]
fn elided_row_reparents_descendants() {
    let (tree, n) = sample_tree();
    let fix = Fixture::new(tree, reject_twos);

    assert_eq!(fix.labels_under(None), ["A", "B"]);
    let va = fix.vkey(n.a);
    assert_eq!(fix.labels_under(Some(va)), ["A1", "A2a"]);
    assert_eq!(fix.view.to_view(n.a2), None);

    // A2a kept its relative order and re-attached under A.
    let va2a = fix.vkey(n.a2a);
    assert_eq!(fix.view.parent_of(va2a), Some(va));
    assert_eq!(fix.view.view_pos(va2a), (1, 0));
    assert_eq!(fix.view.to_source(va2a), n.a2a);
    assert_synced(&fix);
}

#[test]
fn content_change_reveals_row_and_adopts_descendants() {
    let (tree, n) = sample_tree();
    let mut fix = Fixture::new(tree, reject_twos);
    let va = fix.vkey(n.a);

    // "A2+" no longer ends in '2'; the row surfaces between A1 and A2a.
    fix.relabel(n.a2, "A2+");

    let va2 = fix.vkey(n.a2);
    let va2a = fix.vkey(n.a2a);
    assert_eq!(fix.labels_under(Some(va)), ["A1", "A2+"]);
    assert_eq!(fix.view.parent_of(va2a), Some(va2));
    assert_eq!(fix.view.view_pos(va2a), (0, 0));
    assert_eq!(
        fix.rec.events,
        vec![
            ViewEvent::AboutToInsert { parent: Some(va), first: 1, last: 1 },
            ViewEvent::Inserted { parent: Some(va), first: 1, last: 1 },
            ViewEvent::AboutToMove {
                src_parent: Some(va),
                first: 2,
                last: 2,
                dst_parent: Some(va2),
                dst_row: 0,
            },
            ViewEvent::Moved {
                src_parent: Some(va),
                first: 2,
                last: 2,
                dst_parent: Some(va2),
                dst_row: 0,
            },
        ]
    );
    assert_synced(&fix);
}

#[test]
fn removal_of_visible_range_coalesces_to_one_event() {
    let (tree, n) = sample_tree();
    let mut fix = Fixture::new(tree, accept_all);
    let va = fix.vkey(n.a);
    let vb = fix.vkey(n.b);

    fix.remove(n.a, 0, 1);

    // One bracket pair for both rows; A2a leaves with A2's subtree and
    // gets no notification of its own.
    assert_eq!(
        fix.rec.events,
        vec![
            ViewEvent::AboutToRemove { parent: Some(va), first: 0, last: 1 },
            ViewEvent::Removed { parent: Some(va), first: 0, last: 1 },
        ]
    );
    assert_eq!(fix.view.row_count(Some(va)), 0);
    assert_eq!(fix.view.to_view(n.a2a), None);
    // Unrelated keys survive.
    assert_eq!(fix.view.to_view(n.b), Some(vb));
    assert_synced(&fix);
}

#[test]
fn removal_spanning_elided_row_still_coalesces() {
    let (tree, n) = sample_tree();
    let mut fix = Fixture::new(tree, reject_twos);
    let va = fix.vkey(n.a);

    // A1 is visible, A2 is elided with A2a standing in right after A1, so
    // the source range still maps to one contiguous view band.
    fix.remove(n.a, 0, 1);

    assert_eq!(
        fix.rec.events,
        vec![
            ViewEvent::AboutToRemove { parent: Some(va), first: 0, last: 1 },
            ViewEvent::Removed { parent: Some(va), first: 0, last: 1 },
        ]
    );
    assert_eq!(fix.view.row_count(Some(va)), 0);
    assert_synced(&fix);
}

#[test]
fn subtree_move_is_one_event_and_keeps_children() {
    let (tree, n) = sample_tree();
    let mut fix = Fixture::new(tree, accept_all);
    let va = fix.vkey(n.a);
    let vb = fix.vkey(n.b);
    let va2 = fix.vkey(n.a2);
    let va2a = fix.vkey(n.a2a);

    fix.move_rows(n.a, 1, 1, n.b, 0);

    assert_eq!(
        fix.rec.events,
        vec![
            ViewEvent::AboutToMove {
                src_parent: Some(va),
                first: 1,
                last: 1,
                dst_parent: Some(vb),
                dst_row: 0,
            },
            ViewEvent::Moved {
                src_parent: Some(va),
                first: 1,
                last: 1,
                dst_parent: Some(vb),
                dst_row: 0,
            },
        ]
    );
    // Same keys before and after: the subtree re-attached, nothing was
    // rebuilt, and A2a never left A2.
    assert_eq!(fix.view.to_view(n.a2), Some(va2));
    assert_eq!(fix.view.to_view(n.a2a), Some(va2a));
    assert_eq!(fix.view.parent_of(va2), Some(vb));
    assert_eq!(fix.view.parent_of(va2a), Some(va2));
    assert_eq!(fix.labels_under(Some(va)), ["A1"]);
    assert_synced(&fix);
}

#[test]
fn moving_elided_row_moves_its_visible_stand_ins() {
    let (tree, n) = sample_tree();
    let mut fix = Fixture::new(tree, reject_twos);
    let vb = fix.vkey(n.b);

    // A2 has no view node; moving it relocates A2a, its stand-in.
    fix.move_rows(n.a, 1, 1, n.b, 0);

    let va2a = fix.vkey(n.a2a);
    assert_eq!(fix.view.parent_of(va2a), Some(vb));
    assert_eq!(fix.view.view_pos(va2a), (0, 0));
    assert_eq!(fix.labels_under(Some(fix.vkey(n.a))), ["A1"]);
    assert_synced(&fix);
}

#[test]
fn accepted_insert_lands_at_sorted_row() {
    let (tree, n) = sample_tree();
    let mut fix = Fixture::new(tree, reject_twos);
    let va = fix.vkey(n.a);
    let va1 = fix.vkey(n.a1);
    let va2a = fix.vkey(n.a2a);

    let a3 = fix.push(n.a, "A3");

    assert_eq!(fix.labels_under(Some(va)), ["A1", "A2a", "A3"]);
    assert_eq!(fix.view.view_pos(fix.vkey(a3)), (2, 0));
    // Earlier rows kept their keys and positions.
    assert_eq!(fix.view.to_view(n.a1), Some(va1));
    assert_eq!(fix.view.view_pos(va1), (0, 0));
    assert_eq!(fix.view.view_pos(va2a), (1, 0));
    assert_synced(&fix);
}

#[test]
fn front_insert_renumbers_visible_siblings() {
    let (tree, n) = sample_tree();
    let mut fix = Fixture::new(tree, reject_twos);
    let va = fix.vkey(n.a);
    let va1 = fix.vkey(n.a1);
    let va2a = fix.vkey(n.a2a);

    let a0 = fix.insert(n.a, 0, "A0");

    assert_eq!(fix.labels_under(Some(va)), ["A0", "A1", "A2a"]);
    assert_eq!(fix.view.view_pos(fix.vkey(a0)), (0, 0));
    assert_eq!(fix.view.view_pos(va1), (1, 0));
    assert_eq!(fix.view.view_pos(va2a), (2, 0));
    assert_synced(&fix);
}

#[test]
fn hiding_by_relabel_promotes_children_in_place() {
    let (tree, n) = sample_tree();
    let mut fix = Fixture::new(tree, reject_twos);
    let va1 = fix.vkey(n.a1);
    let va2a = fix.vkey(n.a2a);

    // Reject A itself: A1 and A2a climb to the top level, after nothing
    // and before B, keeping their relative order and keys.
    fix.relabel(n.a, "A-2");

    assert_eq!(fix.labels_under(None), ["A1", "A2a", "B"]);
    assert_eq!(fix.view.to_view(n.a), None);
    assert_eq!(fix.view.to_view(n.a1), Some(va1));
    assert_eq!(fix.view.parent_of(va1), None);
    assert_eq!(fix.view.to_view(n.a2a), Some(va2a));
    assert_synced(&fix);
}

#[test]
fn range_mapping_matches_scenario_shape() {
    let (tree, n) = sample_tree();
    let fix = Fixture::new(tree, reject_twos);

    // Rows A1..A2 under A form one contiguous view band once A2 is
    // represented by its stand-in.
    let bands = fix
        .view
        .to_view_range(&fix.source, n.a, 0, 1, RangeSelect::INCLUDE_ELIDED);
    assert_eq!(bands.len(), 1);
    assert_eq!(fix.view.to_source(bands[0].0), n.a1);
    assert_eq!(fix.view.to_source(bands[0].1), n.a2a);

    // Without stand-ins, the elided row contributes nothing.
    let strict = fix
        .view
        .to_view_range(&fix.source, n.a, 1, 1, RangeSelect::empty());
    assert!(strict.is_empty());
}

#[test]
fn rebuild_is_key_stable_across_resets() {
    let (tree, n) = sample_tree();
    let mut fix = Fixture::new(tree, reject_twos);

    fix.view.source_about_to_reset(&mut fix.rec);
    fix.view.source_reset(&fix.source, &mut fix.rec);
    let first = (fix.vkey(n.a), fix.vkey(n.a2a), fix.vkey(n.b));

    fix.view.source_about_to_reset(&mut fix.rec);
    fix.view.source_reset(&fix.source, &mut fix.rec);
    let second = (fix.vkey(n.a), fix.vkey(n.a2a), fix.vkey(n.b));

    assert_eq!(first, second);
    assert_eq!(
        fix.rec.events,
        vec![
            ViewEvent::AboutToReset,
            ViewEvent::Reset,
            ViewEvent::AboutToReset,
            ViewEvent::Reset,
        ]
    );
    assert_synced(&fix);
}

#[test]
fn mixed_edit_sequence_stays_consistent() {
    let (tree, n) = sample_tree();
    let mut fix = Fixture::new(tree, reject_twos);

    let c = fix.push(SourceId::ROOT, "C");
    fix.move_rows(SourceId::ROOT, 2, 2, n.a, 0); // C under A, at the front
    fix.relabel(n.a2, "A2+"); // reveal
    fix.relabel(n.a2, "A2"); // hide again
    fix.remove(n.a, 0, 0); // drop C
    assert_eq!(fix.view.to_view(c), None);
    assert_eq!(fix.labels_under(Some(fix.vkey(n.a))), ["A1", "A2a"]);
    assert_synced(&fix);
}
