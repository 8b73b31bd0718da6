//! In-degree ordering with live decrement.
//!
//! [`InwardsOrder`] bucket-sorts the vertices of a digraph by current
//! in-degree. The updating seed finders walk `sorted` left to right
//! while decrementing counts of vertices that lose a potential
//! seed-making in-arc; [`InwardsOrder::decrement`] promotes such a
//! vertex one bucket towards the front in O(1) without disturbing the
//! already-visited prefix of the scan.

use crate::{
    digraph::{Digraph, PointIndex},
    error::Result,
    mem,
};

/// The live bookkeeping kept only when decrements are needed.
///
/// Invariant: `sorted[vertex_index[v]] == v` for every vertex, and
/// vertex `v` sits in the half-open slot range
/// `bucket_index[k]..bucket_index[k + 1]` exactly when
/// `inwards_count[v] == k`.
struct LiveIndices {
    inwards_count: Vec<u32>,
    vertex_index: Vec<u32>,
    bucket_index: Vec<u32>,
}

/// Vertices of a digraph in non-decreasing in-degree order.
pub(crate) struct InwardsOrder {
    sorted: Vec<PointIndex>,
    live: Option<LiveIndices>,
}

impl InwardsOrder {
    /// Bucket-sorts the vertices of `graph` by in-degree.
    ///
    /// With `make_indices` the four-array live structure is retained so
    /// [`InwardsOrder::decrement`] can run; without it only the frozen
    /// permutation survives. The counting sort fills each bucket from
    /// the back while walking vertices in descending id order, so
    /// buckets start out sorted by vertex id.
    pub(crate) fn new(graph: &Digraph, make_indices: bool) -> Result<Self> {
        let vertices = graph.vertex_count();
        let mut inwards_count = mem::try_filled_vec(0_u32, vertices)?;
        for &a in graph.arcs() {
            inwards_count[a as usize] += 1;
        }
        let max_inwards = inwards_count.iter().copied().max().unwrap_or(0) as usize;

        let mut bucket_count = mem::try_filled_vec(0_usize, max_inwards + 1)?;
        for &count in &inwards_count {
            bucket_count[count as usize] += 1;
        }

        // Bucket end offsets; the fill below walks them back to starts.
        let mut bucket_index = mem::try_filled_vec(0_u32, max_inwards + 1)?;
        bucket_index[0] = bucket_count[0] as u32;
        for b in 1..=max_inwards {
            bucket_index[b] = bucket_index[b - 1] + bucket_count[b] as u32;
        }

        let mut sorted = mem::try_filled_vec(0 as PointIndex, vertices)?;
        let mut vertex_index = if make_indices {
            mem::try_filled_vec(0_u32, vertices)?
        } else {
            Vec::new()
        };
        for v in (0..vertices).rev() {
            let k = inwards_count[v] as usize;
            bucket_index[k] -= 1;
            sorted[bucket_index[k] as usize] = v as PointIndex;
            if make_indices {
                vertex_index[v] = bucket_index[k];
            }
        }

        let live = make_indices.then_some(LiveIndices {
            inwards_count,
            vertex_index,
            bucket_index,
        });
        Ok(Self { sorted, live })
    }

    /// The vertex permutation in non-decreasing in-degree order.
    pub(crate) fn sorted(&self) -> &[PointIndex] {
        &self.sorted
    }

    /// Current slot of `v` in the permutation. Live indices only.
    pub(crate) fn position_of(&self, v: usize) -> usize {
        let live = self
            .live
            .as_ref()
            .expect("position queries require live indices");
        live.vertex_index[v] as usize
    }

    /// Moves `v` from its bucket `k` into bucket `k - 1`.
    ///
    /// `cursor` is the scan position currently being examined; slots at
    /// or before it are finalised and must not be reordered. When the
    /// target slot of the swap lies in that prefix, the shrinking bucket
    /// is restarted just past the cursor instead.
    pub(crate) fn decrement(&mut self, v: PointIndex, cursor: usize) {
        let live = self
            .live
            .as_mut()
            .expect("decrement requires live indices");
        let vu = v as usize;
        debug_assert_eq!(self.sorted[live.vertex_index[vu] as usize], v);
        debug_assert!(live.inwards_count[vu] > 0);

        let move_from = live.vertex_index[vu] as usize;
        let k = live.inwards_count[vu] as usize;
        let mut move_to = live.bucket_index[k] as usize;
        if move_to <= cursor {
            move_to = cursor + 1;
            live.bucket_index[k - 1] = move_to as u32;
        }
        debug_assert_eq!(
            live.inwards_count[self.sorted[move_to] as usize] as usize,
            k
        );

        live.bucket_index[k] = (move_to + 1) as u32;
        live.inwards_count[vu] -= 1;
        self.sorted.swap(move_from, move_to);
        live.vertex_index[self.sorted[move_to] as usize] = move_to as u32;
        live.vertex_index[self.sorted[move_from] as usize] = move_from as u32;

        #[cfg(feature = "stable")]
        {
            // Re-sort the two touched buckets by vertex id so the scan
            // order is reproducible.
            if move_to != move_from {
                insertion_sort_back(
                    &mut self.sorted,
                    &mut live.vertex_index,
                    move_to + 1,
                    move_from,
                );
            }
            let new_k = live.inwards_count[vu] as usize;
            if (live.bucket_index[new_k] as usize) <= cursor {
                live.bucket_index[new_k] = (cursor + 1) as u32;
            }
            insertion_sort_back(
                &mut self.sorted,
                &mut live.vertex_index,
                live.bucket_index[new_k] as usize,
                move_to,
            );
        }
    }

    /// Audits the unvisited suffix of the scan: counts non-decreasing,
    /// ids ascending within a bucket.
    #[cfg(all(feature = "stable", debug_assertions))]
    pub(crate) fn debug_check_sort(&self, cursor: usize) {
        let live = self
            .live
            .as_ref()
            .expect("sort audits require live indices");
        for pos in cursor..self.sorted.len().saturating_sub(1) {
            let a = self.sorted[pos] as usize;
            let b = self.sorted[pos + 1] as usize;
            assert!(live.inwards_count[a] <= live.inwards_count[b]);
            if live.inwards_count[a] == live.inwards_count[b] {
                assert!(self.sorted[pos] < self.sorted[pos + 1]);
            }
        }
    }
}

/// Insertion-sorts slot `pos` back into the id-ordered bucket that
/// starts at `bucket_start`, assuming the slots between them are already
/// ordered.
#[cfg(feature = "stable")]
fn insertion_sort_back(
    sorted: &mut [PointIndex],
    vertex_index: &mut [u32],
    bucket_start: usize,
    pos: usize,
) {
    let tmp = sorted[pos];
    let mut pos = pos;
    while pos != bucket_start && tmp < sorted[pos - 1] {
        sorted[pos] = sorted[pos - 1];
        vertex_index[sorted[pos] as usize] = pos as u32;
        pos -= 1;
    }
    sorted[pos] = tmp;
    vertex_index[tmp as usize] = pos as u32;
}
