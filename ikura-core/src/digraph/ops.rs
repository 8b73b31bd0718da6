//! Digraph algebra.
//!
//! Every operator here follows the same memory protocol: compute a cheap
//! upper bound on the output arc count, try to allocate it, run the
//! algorithm, then shrink the arc buffer to the exact count. When the
//! greedy allocation fails the operator re-runs its inner loop in
//! counting mode to obtain the exact arc count and retries once; only if
//! that allocation also fails does the error reach the caller. Dense
//! inputs near the memory limit therefore still go through.
//!
//! Per-row set semantics use a shared `row_markers` scratch array: while
//! row `v` is being processed, `row_markers[x] = v` marks `x` as already
//! emitted for this row. Entering row `v` pre-marks `v` itself, so no
//! operator below ever emits a self-arc (use [`delete_loops`] for graphs
//! that acquired loops elsewhere). The next row overwrites the markers
//! it needs; no clearing pass is required between rows.

use crate::{
    digraph::{ArcIndex, Digraph, POINT_NA, PointIndex},
    error::{Error, ErrorCode, Result},
    mem,
};

/// Self-arc treatment for [`adjacency_product`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopRule {
    /// Walk self-arcs in the left operand like any other arc.
    Keep,
    /// Skip self-arcs in the left operand, but pre-seed every row `v`
    /// of the output with the right operand's row `v`.
    Force,
    /// Skip self-arcs in the left operand.
    Ignore,
}

/// Computes the union of the given digraphs, deduplicating within rows.
///
/// # Errors
/// [`ErrorCode::InvalidInput`] when `dgs` is empty, holds digraphs of
/// differing vertex counts, or has no vertices; allocation failures as
/// [`ErrorCode::NoMemory`] / [`ErrorCode::TooLargeDigraph`].
///
/// # Examples
/// ```
/// use ikura_core::{Digraph, union_of};
///
/// let a = Digraph::from_rows(3, &[&[1], &[], &[0]])?;
/// let b = Digraph::from_rows(3, &[&[2, 1], &[0], &[]])?;
/// let merged = union_of(&[&a, &b])?;
/// assert_eq!(merged.out(0), &[1, 2]);
/// assert_eq!(merged.out(1), &[0]);
/// assert_eq!(merged.out(2), &[0]);
/// # Ok::<(), ikura_core::Error>(())
/// ```
pub fn union_of(dgs: &[&Digraph]) -> Result<Digraph> {
    let vertices = validate_operands(dgs)?;
    let greedy: usize = dgs
        .iter()
        .fold(0_usize, |acc, dg| acc.saturating_add(dg.arc_count()));

    let mut row_markers = mem::try_filled_vec(POINT_NA, vertices)?;
    let mut out = alloc_two_pass(vertices, greedy, || count_union(dgs, &mut row_markers))?;
    let written = write_union(dgs, &mut row_markers, &mut out);
    out.change_arc_capacity(written)?;
    Ok(out)
}

/// As [`union_of`], but rows whose `tails_to_keep` entry is `false`
/// come out empty.
///
/// # Errors
/// As [`union_of`]; additionally [`ErrorCode::InvalidInput`] when the
/// mask length differs from the vertex count.
pub fn union_and_delete(dgs: &[&Digraph], tails_to_keep: &[bool]) -> Result<Digraph> {
    let vertices = validate_operands(dgs)?;
    if tails_to_keep.len() != vertices {
        return Err(Error::with_message(
            ErrorCode::InvalidInput,
            "keep mask length must equal the vertex count",
        ));
    }
    let greedy: usize = dgs
        .iter()
        .fold(0_usize, |acc, dg| acc.saturating_add(dg.arc_count()));

    let mut row_markers = mem::try_filled_vec(POINT_NA, vertices)?;
    let mut out = alloc_two_pass(vertices, greedy, || {
        count_union_and_delete(dgs, tails_to_keep, &mut row_markers)
    })?;
    let written = write_union_and_delete(dgs, tails_to_keep, &mut row_markers, &mut out);
    out.change_arc_capacity(written)?;
    Ok(out)
}

/// Computes `minuend \ subtrahend` row by row, emitting at most
/// `max_out_degree` surviving arcs per row.
///
/// The output inherits the minuend's vertex count.
///
/// # Errors
/// [`ErrorCode::InvalidInput`] when the vertex counts differ, the graphs
/// have no vertices, or `max_out_degree` is zero; allocation failures as
/// [`ErrorCode::NoMemory`] / [`ErrorCode::TooLargeDigraph`].
pub fn difference(
    minuend: &Digraph,
    subtrahend: &Digraph,
    max_out_degree: usize,
) -> Result<Digraph> {
    let vertices = validate_operands(&[minuend, subtrahend])?;
    if max_out_degree == 0 {
        return Err(Error::with_message(
            ErrorCode::InvalidInput,
            "max out-degree must be positive",
        ));
    }
    let greedy = minuend.arc_count();

    let mut row_markers = mem::try_filled_vec(POINT_NA, vertices)?;
    let mut out = alloc_two_pass(vertices, greedy, || {
        count_difference(minuend, subtrahend, max_out_degree, &mut row_markers)
    })?;
    let written = write_difference(minuend, subtrahend, max_out_degree, &mut row_markers, &mut out);
    out.change_arc_capacity(written)?;
    Ok(out)
}

/// Computes the transpose by counting sort: bump a per-destination
/// counter for every arc, prefix-sum into row offsets, then scatter.
///
/// Self-arcs and duplicate arcs survive transposition. Within a row the
/// sources come out in descending order; callers that need a particular
/// order must sort.
///
/// # Errors
/// [`ErrorCode::InvalidInput`] when the graph has no vertices;
/// allocation failures as [`ErrorCode::NoMemory`] /
/// [`ErrorCode::TooLargeDigraph`].
pub fn transpose(graph: &Digraph) -> Result<Digraph> {
    let vertices = graph.vertex_count();
    if vertices == 0 {
        return Err(Error::with_message(
            ErrorCode::InvalidInput,
            "transpose requires at least one vertex",
        ));
    }

    let mut out = Digraph::empty(vertices, graph.arc_count())?;
    let (tail_ptr, head) = out.csr_mut();
    for &a in graph.arcs() {
        tail_ptr[a as usize] += 1;
    }
    for v in 0..vertices {
        tail_ptr[v + 1] += tail_ptr[v];
    }
    for v in 0..vertices {
        for &a in graph.out(v) {
            tail_ptr[a as usize] -= 1;
            head[tail_ptr[a as usize] as usize] = v as PointIndex;
        }
    }
    Ok(out)
}

/// Computes the adjacency product `a · b`: row `v` of the output is the
/// deduplicated union of `b.out(x)` over `x ∈ a.out(v)`, with self-arcs
/// in `a` treated per `loops`.
///
/// # Errors
/// [`ErrorCode::InvalidInput`] when the vertex counts differ or the
/// graphs have no vertices; allocation failures as
/// [`ErrorCode::NoMemory`] / [`ErrorCode::TooLargeDigraph`].
pub fn adjacency_product(a: &Digraph, b: &Digraph, loops: LoopRule) -> Result<Digraph> {
    let vertices = validate_operands(&[a, b])?;

    let mut greedy = 0_usize;
    for v in 0..vertices {
        if loops == LoopRule::Force {
            greedy = greedy.saturating_add(b.out(v).len());
        }
        for &x in a.out(v) {
            if x as usize == v && loops != LoopRule::Keep {
                continue;
            }
            greedy = greedy.saturating_add(b.out(x as usize).len());
        }
    }

    let mut row_markers = mem::try_filled_vec(POINT_NA, vertices)?;
    let mut out = alloc_two_pass(vertices, greedy, || {
        count_adjacency_product(a, b, loops, &mut row_markers)
    })?;
    let written = write_adjacency_product(a, b, loops, &mut row_markers, &mut out);
    out.change_arc_capacity(written)?;
    Ok(out)
}

/// Removes all self-arcs in place, compacting `head` left-to-right and
/// shifting `tail_ptr` down. The arc capacity is left unchanged.
pub fn delete_loops(graph: &mut Digraph) {
    let vertices = graph.vertex_count();
    let (tail_ptr, head) = graph.csr_mut();
    let mut write = 0_usize;
    for v in 0..vertices {
        let start = tail_ptr[v] as usize;
        let stop = tail_ptr[v + 1] as usize;
        tail_ptr[v] = write as ArcIndex;
        for read in start..stop {
            if head[read] as usize != v {
                head[write] = head[read];
                write += 1;
            }
        }
    }
    tail_ptr[vertices] = write as ArcIndex;
}

// ---------------------------------------------------------------------------
// Two-pass allocation
// ---------------------------------------------------------------------------

/// Allocates the output digraph with the greedy arc bound, falling back
/// to an exact (slow) count when the greedy allocation is refused.
fn alloc_two_pass(
    vertices: usize,
    greedy_arcs: usize,
    exact_count: impl FnOnce() -> usize,
) -> Result<Digraph> {
    match Digraph::with_arc_capacity(vertices, greedy_arcs) {
        Ok(out) => Ok(out),
        Err(err) if matches!(err.code(), ErrorCode::NoMemory | ErrorCode::TooLargeDigraph) => {
            let exact = exact_count();
            tracing::debug!(
                greedy = greedy_arcs,
                exact,
                "greedy arc bound refused, retrying with exact count"
            );
            Digraph::with_arc_capacity(vertices, exact)
        }
        Err(err) => Err(err),
    }
}

fn validate_operands(dgs: &[&Digraph]) -> Result<usize> {
    let Some(first) = dgs.first() else {
        return Err(Error::with_message(
            ErrorCode::InvalidInput,
            "at least one digraph operand is required",
        ));
    };
    let vertices = first.vertex_count();
    if vertices == 0 {
        return Err(Error::with_message(
            ErrorCode::InvalidInput,
            "digraph operands must have at least one vertex",
        ));
    }
    if dgs.iter().any(|dg| dg.vertex_count() != vertices) {
        return Err(Error::with_message(
            ErrorCode::InvalidInput,
            "digraph operands must agree on the vertex count",
        ));
    }
    #[cfg(feature = "extensive-checks")]
    {
        if dgs.iter().any(|dg| !dg.is_valid()) {
            return Err(Error::with_message(
                ErrorCode::InvalidInput,
                "digraph operand failed the structural audit",
            ));
        }
    }
    Ok(vertices)
}

// ---------------------------------------------------------------------------
// Union
// ---------------------------------------------------------------------------

fn count_union(dgs: &[&Digraph], row_markers: &mut [PointIndex]) -> usize {
    row_markers.fill(POINT_NA);
    let mut counter = 0_usize;
    for v in 0..row_markers.len() {
        row_markers[v] = v as PointIndex;
        for dg in dgs {
            for &x in dg.out(v) {
                if row_markers[x as usize] != v as PointIndex {
                    row_markers[x as usize] = v as PointIndex;
                    counter += 1;
                }
            }
        }
    }
    counter
}

fn write_union(dgs: &[&Digraph], row_markers: &mut [PointIndex], out: &mut Digraph) -> usize {
    row_markers.fill(POINT_NA);
    let (tail_ptr, head) = out.csr_mut();
    let mut counter = 0_usize;
    tail_ptr[0] = 0;
    for v in 0..row_markers.len() {
        row_markers[v] = v as PointIndex;
        for dg in dgs {
            for &x in dg.out(v) {
                if row_markers[x as usize] != v as PointIndex {
                    row_markers[x as usize] = v as PointIndex;
                    head[counter] = x;
                    counter += 1;
                }
            }
        }
        tail_ptr[v + 1] = counter as ArcIndex;
    }
    counter
}

fn count_union_and_delete(
    dgs: &[&Digraph],
    tails_to_keep: &[bool],
    row_markers: &mut [PointIndex],
) -> usize {
    row_markers.fill(POINT_NA);
    let mut counter = 0_usize;
    for v in 0..row_markers.len() {
        if !tails_to_keep[v] {
            continue;
        }
        row_markers[v] = v as PointIndex;
        for dg in dgs {
            for &x in dg.out(v) {
                if row_markers[x as usize] != v as PointIndex {
                    row_markers[x as usize] = v as PointIndex;
                    counter += 1;
                }
            }
        }
    }
    counter
}

fn write_union_and_delete(
    dgs: &[&Digraph],
    tails_to_keep: &[bool],
    row_markers: &mut [PointIndex],
    out: &mut Digraph,
) -> usize {
    row_markers.fill(POINT_NA);
    let (tail_ptr, head) = out.csr_mut();
    let mut counter = 0_usize;
    tail_ptr[0] = 0;
    for v in 0..row_markers.len() {
        if tails_to_keep[v] {
            row_markers[v] = v as PointIndex;
            for dg in dgs {
                for &x in dg.out(v) {
                    if row_markers[x as usize] != v as PointIndex {
                        row_markers[x as usize] = v as PointIndex;
                        head[counter] = x;
                        counter += 1;
                    }
                }
            }
        }
        tail_ptr[v + 1] = counter as ArcIndex;
    }
    counter
}

// ---------------------------------------------------------------------------
// Difference
// ---------------------------------------------------------------------------

fn count_difference(
    minuend: &Digraph,
    subtrahend: &Digraph,
    max_out_degree: usize,
    row_markers: &mut [PointIndex],
) -> usize {
    row_markers.fill(POINT_NA);
    let mut counter = 0_usize;
    for v in 0..row_markers.len() {
        row_markers[v] = v as PointIndex;
        for &x in subtrahend.out(v) {
            row_markers[x as usize] = v as PointIndex;
        }
        let mut row_counter = 0_usize;
        for &x in minuend.out(v) {
            if row_counter == max_out_degree {
                break;
            }
            if row_markers[x as usize] != v as PointIndex {
                row_counter += 1;
                counter += 1;
            }
        }
    }
    counter
}

fn write_difference(
    minuend: &Digraph,
    subtrahend: &Digraph,
    max_out_degree: usize,
    row_markers: &mut [PointIndex],
    out: &mut Digraph,
) -> usize {
    row_markers.fill(POINT_NA);
    let (tail_ptr, head) = out.csr_mut();
    let mut counter = 0_usize;
    tail_ptr[0] = 0;
    for v in 0..row_markers.len() {
        row_markers[v] = v as PointIndex;
        for &x in subtrahend.out(v) {
            row_markers[x as usize] = v as PointIndex;
        }
        let mut row_counter = 0_usize;
        for &x in minuend.out(v) {
            if row_counter == max_out_degree {
                break;
            }
            if row_markers[x as usize] != v as PointIndex {
                head[counter] = x;
                row_counter += 1;
                counter += 1;
            }
        }
        tail_ptr[v + 1] = counter as ArcIndex;
    }
    counter
}

// ---------------------------------------------------------------------------
// Adjacency product
// ---------------------------------------------------------------------------

fn count_adjacency_product(
    a: &Digraph,
    b: &Digraph,
    loops: LoopRule,
    row_markers: &mut [PointIndex],
) -> usize {
    row_markers.fill(POINT_NA);
    let mut counter = 0_usize;
    for v in 0..row_markers.len() {
        row_markers[v] = v as PointIndex;
        if loops == LoopRule::Force {
            for &x in b.out(v) {
                if row_markers[x as usize] != v as PointIndex {
                    row_markers[x as usize] = v as PointIndex;
                    counter += 1;
                }
            }
        }
        for &mid in a.out(v) {
            if mid as usize == v && loops != LoopRule::Keep {
                continue;
            }
            for &x in b.out(mid as usize) {
                if row_markers[x as usize] != v as PointIndex {
                    row_markers[x as usize] = v as PointIndex;
                    counter += 1;
                }
            }
        }
    }
    counter
}

fn write_adjacency_product(
    a: &Digraph,
    b: &Digraph,
    loops: LoopRule,
    row_markers: &mut [PointIndex],
    out: &mut Digraph,
) -> usize {
    row_markers.fill(POINT_NA);
    let (tail_ptr, head) = out.csr_mut();
    let mut counter = 0_usize;
    tail_ptr[0] = 0;
    for v in 0..row_markers.len() {
        row_markers[v] = v as PointIndex;
        if loops == LoopRule::Force {
            for &x in b.out(v) {
                if row_markers[x as usize] != v as PointIndex {
                    row_markers[x as usize] = v as PointIndex;
                    head[counter] = x;
                    counter += 1;
                }
            }
        }
        for &mid in a.out(v) {
            if mid as usize == v && loops != LoopRule::Keep {
                continue;
            }
            for &x in b.out(mid as usize) {
                if row_markers[x as usize] != v as PointIndex {
                    row_markers[x as usize] = v as PointIndex;
                    head[counter] = x;
                    counter += 1;
                }
            }
        }
        tail_ptr[v + 1] = counter as ArcIndex;
    }
    counter
}
