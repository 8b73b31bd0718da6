//! Exclusion-graph seed selection.
//!
//! The exclusion graph `X` of an NNG `g` connects every pair of vertices
//! that cannot both be seeds: `X = (g ∪ (g · gᵀ with forced loops))`
//! restricted to rows of vertices that are seed candidates at all.
//! Selecting a seed then reduces to scanning `X` in in-degree order and
//! dropping `X.out(v)` from candidacy whenever `v` is taken.

use crate::{
    digraph::{
        Digraph,
        ops::{self, LoopRule},
    },
    error::Result,
    mem,
    seed::{InwardsOrder, SeedResult},
};

/// Builds the exclusion graph of `nng`.
///
/// Vertices with no out-arcs in `nng` are excluded from the start, but
/// the `g · gᵀ` term would still give them out-arcs (towards vertices
/// that point at them), which corrupts the in-degree ordering the scan
/// relies on. When any such vertex exists, `tails_to_keep` drops those
/// rows during the union; when every vertex is a candidate the delete
/// filter is skipped entirely.
pub(super) fn build_exclusion_graph(
    nng: &Digraph,
    tails_to_keep: Option<&[bool]>,
) -> Result<Digraph> {
    let nng_transpose = ops::transpose(nng)?;
    let nng_nng_transpose = ops::adjacency_product(nng, &nng_transpose, LoopRule::Force)?;
    drop(nng_transpose);

    match tails_to_keep {
        Some(keep) => ops::union_and_delete(&[nng, &nng_nng_transpose], keep),
        None => ops::union_of(&[nng, &nng_nng_transpose]),
    }
}

pub(super) fn find_seeds_exclusion(
    nng: &Digraph,
    updating: bool,
    seeds: &mut SeedResult,
) -> Result<()> {
    let vertices = nng.vertex_count();

    let mut not_excluded = mem::try_filled_vec(false, vertices)?;
    let mut num_candidates = 0_usize;
    for v in 0..vertices {
        not_excluded[v] = !nng.out(v).is_empty();
        num_candidates += usize::from(not_excluded[v]);
    }

    let keep_mask = (num_candidates < vertices).then_some(not_excluded.as_slice());
    let mut exclusion_graph = build_exclusion_graph(nng, keep_mask)?;
    let mut order = InwardsOrder::new(&exclusion_graph, updating)?;

    for cursor in 0..vertices {
        #[cfg(all(feature = "stable", debug_assertions))]
        {
            if updating {
                order.debug_check_sort(cursor);
            }
        }

        let v = order.sorted()[cursor] as usize;
        if !not_excluded[v] {
            continue;
        }
        debug_assert!(!nng.out(v).is_empty());

        seeds.push(v as u32)?;
        not_excluded[v] = false;

        if !updating {
            for &x in exclusion_graph.out(v) {
                not_excluded[x as usize] = false;
            }
            continue;
        }

        // Two passes over the seed's row. Most of a seed's neighbours'
        // neighbours are themselves neighbours of the seed and leave the
        // queue here anyway, so decrements are only paid for vertices
        // that were still candidates. The scan never returns to row `v`,
        // so its slice of `head` doubles as the staging area for the
        // first pass.
        let start = exclusion_graph.tail_ptr()[v] as usize;
        let stop = exclusion_graph.tail_ptr()[v + 1] as usize;
        let mut staged = start;
        {
            let head = exclusion_graph.head_mut();
            for read in start..stop {
                let x = head[read];
                if not_excluded[x as usize] {
                    head[staged] = x;
                    staged += 1;
                }
                not_excluded[x as usize] = false;
            }
        }
        for slot in start..staged {
            let x = exclusion_graph.arcs()[slot] as usize;
            for &y in exclusion_graph.out(x) {
                if not_excluded[y as usize] {
                    order.decrement(y, cursor);
                }
            }
        }
    }

    Ok(())
}
