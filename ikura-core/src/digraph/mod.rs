//! Compressed sparse row digraph store.
//!
//! A [`Digraph`] owns two buffers: `tail_ptr`, one past-the-end offset
//! per vertex, and `head`, the concatenated destination lists. Arc
//! storage is allocated up front and shrunk to the exact arc count once
//! an operation knows it; see [`ops`] for the algebra built on top.

pub mod ops;

#[cfg(test)]
mod tests;

use std::fmt;

use crate::{
    error::{Error, ErrorCode, Result},
    mem,
};

/// Identifier of a data point (a digraph vertex).
///
/// Valid identifiers are `[0, u32::MAX)`; the maximum value is reserved
/// as an internal "none" sentinel.
pub type PointIndex = u32;

/// Index into a digraph's concatenated arc buffer.
pub type ArcIndex = u32;

/// Sentinel marking "no point"; used by the row-marker scratch arrays.
pub(crate) const POINT_NA: PointIndex = PointIndex::MAX;

/// Exclusive upper bound on vertex counts.
const MAX_VERTICES: usize = PointIndex::MAX as usize;

/// Inclusive upper bound on arc storage.
const MAX_ARCS: usize = ArcIndex::MAX as usize;

/// A directed graph in compressed sparse row form.
///
/// Vertex `v`'s out-neighbours occupy `head[tail_ptr[v]..tail_ptr[v + 1]]`.
/// The arc buffer may be larger than the arc count while an operation is
/// in flight; [`Digraph::change_arc_capacity`] trims it afterwards.
///
/// # Examples
/// ```
/// use ikura_core::Digraph;
///
/// let graph = Digraph::from_rows(3, &[&[1, 2], &[], &[0]])?;
/// assert_eq!(graph.out(0), &[1, 2]);
/// assert_eq!(graph.out(1), &[]);
/// assert_eq!(graph.arc_count(), 3);
/// assert!(graph.is_valid());
/// # Ok::<(), ikura_core::Error>(())
/// ```
#[derive(Clone)]
pub struct Digraph {
    vertices: usize,
    tail_ptr: Vec<ArcIndex>,
    head: Vec<PointIndex>,
}

impl Digraph {
    /// Creates a digraph with room for `max_arcs` arcs and no defined rows.
    ///
    /// The caller is expected to fill `tail_ptr` and `head` through the
    /// algebra in [`ops`]; until then the row contents are unspecified
    /// (but in bounds).
    ///
    /// # Errors
    /// [`ErrorCode::TooLargeDigraph`] when `vertices` or `max_arcs`
    /// exceed their index types; [`ErrorCode::NoMemory`] when the
    /// buffers cannot be allocated.
    pub fn with_arc_capacity(vertices: usize, max_arcs: usize) -> Result<Self> {
        Self::check_dimensions(vertices, max_arcs)?;
        Ok(Self {
            vertices,
            tail_ptr: mem::try_filled_vec(0, vertices + 1)?,
            head: mem::try_filled_vec(0, max_arcs)?,
        })
    }

    /// Creates a digraph with `max_arcs` arc capacity and every row empty.
    ///
    /// # Errors
    /// As [`Digraph::with_arc_capacity`].
    pub fn empty(vertices: usize, max_arcs: usize) -> Result<Self> {
        // Both constructors zero-fill; `empty` is the named contract the
        // algebra relies on for counting-sort scratch.
        Self::with_arc_capacity(vertices, max_arcs)
    }

    /// Creates a digraph from explicit out-neighbour rows.
    ///
    /// # Errors
    /// [`ErrorCode::InvalidInput`] when `rows.len() != vertices` or any
    /// destination is out of range; allocation errors as
    /// [`Digraph::with_arc_capacity`].
    pub fn from_rows(vertices: usize, rows: &[&[PointIndex]]) -> Result<Self> {
        if rows.len() != vertices {
            return Err(Error::with_message(
                ErrorCode::InvalidInput,
                "row count must equal the vertex count",
            ));
        }
        let arcs = rows.iter().map(|row| row.len()).sum();
        let mut graph = Self::with_arc_capacity(vertices, arcs)?;
        let mut write = 0_usize;
        for (v, row) in rows.iter().enumerate() {
            graph.tail_ptr[v] = write as ArcIndex;
            for &x in *row {
                if x as usize >= vertices {
                    return Err(Error::with_message(
                        ErrorCode::InvalidInput,
                        "arc destination out of range",
                    ));
                }
                graph.head[write] = x;
                write += 1;
            }
        }
        graph.tail_ptr[vertices] = write as ArcIndex;
        Ok(graph)
    }

    /// Resizes the arc buffer to exactly `new_capacity` entries.
    ///
    /// `tail_ptr` is left untouched; a capacity of zero drops the arc
    /// buffer entirely.
    ///
    /// # Errors
    /// [`ErrorCode::TooLargeDigraph`] when `new_capacity` exceeds the
    /// arc index type; [`ErrorCode::NoMemory`] when growth fails.
    pub fn change_arc_capacity(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity > MAX_ARCS {
            return Err(Error::new(ErrorCode::TooLargeDigraph));
        }
        debug_assert!(self.arc_count() <= new_capacity || new_capacity == 0);
        if new_capacity == self.head.len() {
            return Ok(());
        }
        if new_capacity < self.head.len() {
            self.head.truncate(new_capacity);
            self.head.shrink_to_fit();
        } else {
            let additional = new_capacity - self.head.len();
            if self.head.try_reserve_exact(additional).is_err() {
                return Err(Error::new(ErrorCode::NoMemory));
            }
            self.head.resize(new_capacity, 0);
        }
        Ok(())
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices
    }

    /// Current arc storage capacity.
    #[must_use]
    pub fn arc_capacity(&self) -> usize {
        self.head.len()
    }

    /// Number of arcs currently defined by `tail_ptr`.
    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.tail_ptr[self.vertices] as usize
    }

    /// The out-neighbours of `v`.
    ///
    /// # Panics
    /// Panics when `v >= vertex_count()`.
    #[must_use]
    pub fn out(&self, v: usize) -> &[PointIndex] {
        &self.head[self.tail_ptr[v] as usize..self.tail_ptr[v + 1] as usize]
    }

    /// All defined arcs, concatenated row by row.
    #[must_use]
    pub fn arcs(&self) -> &[PointIndex] {
        &self.head[..self.arc_count()]
    }

    /// Full structural audit: `tail_ptr` monotone and within capacity,
    /// every destination in range. Costs O(vertices + arcs).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.tail_ptr[0] != 0 || self.arc_count() > self.arc_capacity() {
            return false;
        }
        if self.tail_ptr.windows(2).any(|w| w[0] > w[1]) {
            return false;
        }
        self.arcs().iter().all(|&x| (x as usize) < self.vertices)
    }

    /// Returns whether the digraph holds no arcs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arc_count() == 0
    }

    /// Returns whether every vertex has exactly `k` out-arcs.
    #[must_use]
    pub fn is_balanced(&self, k: usize) -> bool {
        self.tail_ptr
            .windows(2)
            .all(|w| w[1].checked_sub(w[0]).is_some_and(|d| d as usize == k))
    }

    pub(crate) fn tail_ptr(&self) -> &[ArcIndex] {
        &self.tail_ptr
    }

    pub(crate) fn head_mut(&mut self) -> &mut [PointIndex] {
        &mut self.head
    }

    /// Mutable access to both CSR buffers at once.
    pub(crate) fn csr_mut(&mut self) -> (&mut [ArcIndex], &mut [PointIndex]) {
        (&mut self.tail_ptr, &mut self.head)
    }

    fn check_dimensions(vertices: usize, max_arcs: usize) -> Result<()> {
        if vertices >= MAX_VERTICES {
            return Err(Error::with_message(
                ErrorCode::TooLargeDigraph,
                "too many vertices for the point index type",
            ));
        }
        if max_arcs > MAX_ARCS {
            return Err(Error::new(ErrorCode::TooLargeDigraph));
        }
        Ok(())
    }
}

/// Structural equality: same vertex count and identical rows in
/// identical order. Surplus arc capacity does not participate.
impl PartialEq for Digraph {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
            && (0..self.vertices).all(|v| self.out(v) == other.out(v))
    }
}

impl Eq for Digraph {}

impl fmt::Debug for Digraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = f.debug_map();
        for v in 0..self.vertices {
            rows.entry(&v, &self.out(v));
        }
        rows.finish()
    }
}
