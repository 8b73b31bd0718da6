//! Tests for the digraph store and algebra.

use rstest::rstest;

use super::ops::{
    LoopRule, adjacency_product, delete_loops, difference, transpose, union_and_delete, union_of,
};
use super::{Digraph, PointIndex};
use crate::error::ErrorCode;

fn graph(vertices: usize, rows: &[&[PointIndex]]) -> Digraph {
    Digraph::from_rows(vertices, rows).expect("test rows must be valid")
}

/// Row-order-insensitive comparison.
fn sorted_rows(graph: &Digraph) -> Vec<Vec<PointIndex>> {
    (0..graph.vertex_count())
        .map(|v| {
            let mut row = graph.out(v).to_vec();
            row.sort_unstable();
            row
        })
        .collect()
}

// -- store ----------------------------------------------------------------

#[rstest]
fn with_arc_capacity_rejects_oversized_arc_buffer() {
    let err = Digraph::with_arc_capacity(100, u32::MAX as usize + 1)
        .expect_err("arc capacity beyond the index type must fail");
    assert_eq!(err.code(), ErrorCode::TooLargeDigraph);
}

#[rstest]
fn with_arc_capacity_rejects_oversized_vertex_count() {
    let err = Digraph::with_arc_capacity(u32::MAX as usize, 0)
        .expect_err("the maximum point index is reserved");
    assert_eq!(err.code(), ErrorCode::TooLargeDigraph);
}

#[rstest]
fn empty_zero_fills_rows() {
    let graph = Digraph::empty(100, 10).expect("allocation must succeed");
    assert_eq!(graph.vertex_count(), 100);
    assert_eq!(graph.arc_capacity(), 10);
    assert_eq!(graph.arc_count(), 0);
    assert!(graph.is_empty());
    assert!((0..100).all(|v| graph.out(v).is_empty()));
}

#[rstest]
fn zero_capacity_graph_has_no_arc_buffer() {
    let graph = Digraph::empty(10, 0).expect("allocation must succeed");
    assert_eq!(graph.arc_capacity(), 0);
    assert!(graph.is_valid());
}

#[rstest]
fn change_arc_capacity_grows_and_shrinks() {
    let mut graph = graph(3, &[&[1, 2], &[0], &[]]);
    assert_eq!(graph.arc_capacity(), 3);

    graph.change_arc_capacity(100).expect("growth must succeed");
    assert_eq!(graph.arc_capacity(), 100);
    assert_eq!(graph.out(0), &[1, 2]);
    assert_eq!(graph.arc_count(), 3);

    graph.change_arc_capacity(3).expect("shrink must succeed");
    assert_eq!(graph.arc_capacity(), 3);
    assert_eq!(graph.out(0), &[1, 2]);
}

#[rstest]
fn change_arc_capacity_rejects_oversized() {
    let mut graph = graph(3, &[&[1], &[], &[]]);
    let err = graph
        .change_arc_capacity(u32::MAX as usize + 1)
        .expect_err("resize beyond the index type must fail");
    assert_eq!(err.code(), ErrorCode::TooLargeDigraph);
    assert_eq!(graph.arc_capacity(), 1);
    assert_eq!(graph.out(0), &[1]);
}

#[rstest]
fn change_arc_capacity_to_zero_drops_the_buffer() {
    let mut graph = Digraph::empty(5, 10).expect("allocation must succeed");
    graph.change_arc_capacity(0).expect("drop must succeed");
    assert_eq!(graph.arc_capacity(), 0);
}

#[rstest]
#[case::row_count(2, &[&[0_u32][..]], "row count must match")]
#[case::destination(2, &[&[1_u32][..], &[2][..]], "destination out of range")]
fn from_rows_validates_input(
    #[case] vertices: usize,
    #[case] rows: &[&[PointIndex]],
    #[case] reason: &str,
) {
    let err = Digraph::from_rows(vertices, rows).expect_err(reason);
    assert_eq!(err.code(), ErrorCode::InvalidInput);
}

#[rstest]
fn is_balanced_checks_every_out_degree() {
    let balanced = graph(3, &[&[1, 2], &[0, 2], &[0, 1]]);
    assert!(balanced.is_balanced(2));
    assert!(!balanced.is_balanced(1));

    let ragged = graph(3, &[&[1, 2], &[0], &[]]);
    assert!(!ragged.is_balanced(2));
}

#[rstest]
fn equality_ignores_surplus_capacity() {
    let reference = graph(3, &[&[1], &[2], &[]]);
    let mut padded = graph(3, &[&[1], &[2], &[]]);
    padded.change_arc_capacity(64).expect("growth must succeed");
    assert_eq!(reference, padded);

    let reordered = graph(3, &[&[1], &[], &[2]]);
    assert_ne!(reference, reordered);
}

// -- union ----------------------------------------------------------------

#[rstest]
fn union_of_one_graph_reproduces_it() {
    let g = graph(4, &[&[1, 3], &[2], &[], &[0]]);
    assert_eq!(union_of(&[&g]).expect("union must succeed"), g);
}

#[rstest]
fn union_merges_rows_without_duplicates() {
    let a = graph(3, &[&[1], &[], &[0]]);
    let b = graph(3, &[&[2, 1], &[0], &[0]]);
    let merged = union_of(&[&a, &b]).expect("union must succeed");
    assert_eq!(merged.out(0), &[1, 2]);
    assert_eq!(merged.out(1), &[0]);
    assert_eq!(merged.out(2), &[0]);
}

#[rstest]
fn union_drops_self_loops() {
    let g = graph(3, &[&[0, 1], &[1], &[2, 0]]);
    let unioned = union_of(&[&g]).expect("union must succeed");
    assert_eq!(unioned, graph(3, &[&[1], &[], &[0]]));
}

#[rstest]
fn union_rejects_mismatched_operands() {
    let a = graph(2, &[&[1], &[]]);
    let b = graph(3, &[&[1], &[], &[]]);
    let err = union_of(&[&a, &b]).expect_err("vertex counts must agree");
    assert_eq!(err.code(), ErrorCode::InvalidInput);

    let err = union_of(&[]).expect_err("at least one operand is required");
    assert_eq!(err.code(), ErrorCode::InvalidInput);
}

#[rstest]
fn union_and_delete_empties_dropped_rows() {
    let a = graph(4, &[&[1], &[2], &[3], &[0]]);
    let b = graph(4, &[&[2], &[3], &[0], &[1]]);
    let kept = union_and_delete(&[&a, &b], &[true, false, true, false])
        .expect("union-and-delete must succeed");
    assert_eq!(kept.out(0), &[1, 2]);
    assert_eq!(kept.out(1), &[]);
    assert_eq!(kept.out(2), &[3, 0]);
    assert_eq!(kept.out(3), &[]);
    assert!(kept.is_valid());
}

// -- difference -----------------------------------------------------------

#[rstest]
fn difference_removes_subtrahend_arcs() {
    let minuend = graph(3, &[&[1, 2], &[0, 2], &[0]]);
    let subtrahend = graph(3, &[&[2], &[], &[0]]);
    let left = difference(&minuend, &subtrahend, 10).expect("difference must succeed");
    assert_eq!(left, graph(3, &[&[1], &[0, 2], &[]]));
}

#[rstest]
fn difference_truncates_to_max_out_degree() {
    let minuend = graph(2, &[&[1, 1, 1], &[0, 0]]);
    let empty = Digraph::empty(2, 0).expect("allocation must succeed");
    let truncated = difference(&minuend, &empty, 1).expect("difference must succeed");
    assert_eq!(truncated, graph(2, &[&[1], &[0]]));
}

#[rstest]
fn difference_of_graph_with_itself_is_empty() {
    let g = graph(3, &[&[1, 2], &[0], &[1]]);
    let nothing = difference(&g, &g, 10).expect("difference must succeed");
    assert!(nothing.is_empty());
    assert!(nothing.is_valid());
}

#[rstest]
fn difference_rejects_zero_max_out_degree() {
    let g = graph(2, &[&[1], &[0]]);
    let err = difference(&g, &g, 0).expect_err("zero out-degree cap is invalid");
    assert_eq!(err.code(), ErrorCode::InvalidInput);
}

// -- transpose ------------------------------------------------------------

#[rstest]
fn transpose_reverses_arcs() {
    let g = graph(3, &[&[1, 2], &[], &[0]]);
    let reversed = transpose(&g).expect("transpose must succeed");
    assert_eq!(reversed, graph(3, &[&[2], &[0], &[0]]));
}

#[rstest]
fn transpose_twice_restores_rows_as_sets() {
    let g = graph(5, &[&[1, 4], &[2], &[0, 3], &[], &[4]]);
    let round_trip = transpose(&transpose(&g).expect("transpose must succeed"))
        .expect("transpose must succeed");
    assert_eq!(sorted_rows(&round_trip), sorted_rows(&g));
}

#[rstest]
fn transpose_keeps_self_loops() {
    let g = graph(2, &[&[0, 1], &[]]);
    let reversed = transpose(&g).expect("transpose must succeed");
    assert_eq!(sorted_rows(&reversed), vec![vec![0], vec![0]]);
}

// -- adjacency product ----------------------------------------------------

#[rstest]
fn product_with_identity_reproduces_loop_free_graphs() {
    let g = graph(3, &[&[1, 2], &[2], &[]]);
    let identity = graph(3, &[&[0], &[1], &[2]]);
    let product = adjacency_product(&g, &identity, LoopRule::Keep).expect("product must succeed");
    assert_eq!(product, g);
}

#[rstest]
fn product_of_looped_identity_under_ignore_is_empty() {
    let identity = graph(3, &[&[0], &[1], &[2]]);
    let g = graph(3, &[&[1, 2], &[0], &[1]]);
    let product =
        adjacency_product(&identity, &g, LoopRule::Ignore).expect("product must succeed");
    assert!(product.is_empty());
    assert_eq!(product.vertex_count(), 3);
}

#[rstest]
fn product_force_loops_preseeds_own_row() {
    let a = graph(2, &[&[1], &[0]]);
    let b = graph(2, &[&[1], &[0]]);
    let product = adjacency_product(&a, &b, LoopRule::Force).expect("product must succeed");
    // Row v starts from b's row v; walking a's arcs only re-reaches v
    // itself, which the row marker suppresses.
    assert_eq!(product, graph(2, &[&[1], &[0]]));
}

#[rstest]
fn product_composes_two_hops() {
    let a = graph(4, &[&[1], &[2], &[3], &[]]);
    let b = graph(4, &[&[1], &[2, 3], &[3], &[0]]);
    let product = adjacency_product(&a, &b, LoopRule::Keep).expect("product must succeed");
    assert_eq!(product, graph(4, &[&[2, 3], &[3], &[0], &[]]));
}

// -- delete loops ---------------------------------------------------------

#[rstest]
fn delete_loops_compacts_in_place() {
    let mut g = graph(3, &[&[0, 1], &[1], &[2, 0]]);
    let capacity = g.arc_capacity();
    delete_loops(&mut g);
    assert_eq!(g, graph(3, &[&[1], &[], &[0]]));
    assert_eq!(g.arc_capacity(), capacity);
    assert!(g.is_valid());
}

// -- algebra laws ---------------------------------------------------------

mod properties {
    use proptest::prelude::*;

    use super::super::ops::{LoopRule, adjacency_product, difference, transpose, union_of};
    use super::super::{Digraph, PointIndex};
    use super::sorted_rows;

    /// Random loop-free, duplicate-free rows over `vertices` vertices.
    fn rows_strategy(vertices: usize) -> impl Strategy<Value = Digraph> {
        prop::collection::vec(
            prop::collection::vec(0..vertices as PointIndex, 0..6),
            vertices,
        )
        .prop_map(move |mut rows| {
            for (v, row) in rows.iter_mut().enumerate() {
                row.sort_unstable();
                row.dedup();
                row.retain(|&x| x as usize != v);
            }
            let refs: Vec<&[PointIndex]> = rows.iter().map(|row| row.as_slice()).collect();
            Digraph::from_rows(vertices, &refs).expect("generated rows are in range")
        })
    }

    fn digraph_strategy() -> impl Strategy<Value = Digraph> {
        (2_usize..24).prop_flat_map(rows_strategy)
    }

    fn digraph_pair_strategy() -> impl Strategy<Value = (Digraph, Digraph)> {
        (2_usize..24).prop_flat_map(|n| (rows_strategy(n), rows_strategy(n)))
    }

    /// Row contents are a set: the marker protocol must never emit a
    /// duplicate within a row.
    fn assert_rows_are_sets(graph: &Digraph) {
        for v in 0..graph.vertex_count() {
            let mut row = graph.out(v).to_vec();
            row.sort_unstable();
            let len = row.len();
            row.dedup();
            assert_eq!(row.len(), len, "row {v} contains duplicates");
        }
    }

    proptest! {
        #[test]
        fn union_of_self_is_identity(g in digraph_strategy()) {
            let unioned = union_of(&[&g]).expect("union must succeed");
            prop_assert_eq!(unioned, g);
        }

        #[test]
        fn union_is_commutative_up_to_row_order(
            (a, b) in digraph_pair_strategy()
        ) {
            let ab = union_of(&[&a, &b]).expect("union must succeed");
            let ba = union_of(&[&b, &a]).expect("union must succeed");
            prop_assert_eq!(sorted_rows(&ab), sorted_rows(&ba));
            assert_rows_are_sets(&ab);
            prop_assert!(ab.is_valid());
        }

        #[test]
        fn transpose_is_an_involution(g in digraph_strategy()) {
            let round_trip = transpose(&transpose(&g).expect("transpose must succeed"))
                .expect("transpose must succeed");
            prop_assert_eq!(sorted_rows(&round_trip), sorted_rows(&g));
        }

        #[test]
        fn difference_with_self_is_empty(g in digraph_strategy()) {
            let nothing = difference(&g, &g, g.vertex_count())
                .expect("difference must succeed");
            prop_assert!(nothing.is_empty());
            prop_assert!(nothing.is_valid());
        }

        #[test]
        fn difference_with_empty_is_identity(g in digraph_strategy()) {
            let empty = Digraph::empty(g.vertex_count(), 0).expect("allocation must succeed");
            let unchanged = difference(&g, &empty, g.vertex_count())
                .expect("difference must succeed");
            prop_assert_eq!(unchanged, g);
        }

        #[test]
        fn adjacency_product_outputs_are_valid(
            (a, b) in digraph_pair_strategy(),
            rule in prop_oneof![
                Just(LoopRule::Keep),
                Just(LoopRule::Force),
                Just(LoopRule::Ignore),
            ]
        ) {
            let product = adjacency_product(&a, &b, rule).expect("product must succeed");
            prop_assert!(product.is_valid());
            assert_rows_are_sets(&product);
        }
    }
}
