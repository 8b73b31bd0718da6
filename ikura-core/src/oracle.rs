//! Neighbour search oracle abstraction.
//!
//! The batch clusterer does not materialise a nearest-neighbour digraph;
//! it streams query batches through a [`NeighbourOracle`]. The oracle is
//! an open handle over a data set: constructing a provider opens it and
//! dropping the value closes it.

use thiserror::Error;

use crate::digraph::PointIndex;

/// An error produced by a [`NeighbourOracle`] implementation.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum OracleError {
    /// A query index was outside the data set's bounds.
    #[error("query index {index} is out of bounds")]
    OutOfBounds { index: usize },
    /// The requested neighbour count cannot be satisfied by the data set.
    #[error("cannot search for {k} neighbours among {points} points")]
    InvalidK { k: usize, points: usize },
    /// The underlying search backend failed.
    #[error("neighbour search backend failure: {message}")]
    Backend { message: String },
}

/// A nearest-neighbour search oracle over a fixed data set.
///
/// Implementations must be deterministic for a fixed data set: repeated
/// identical searches return identical results. Distance ties may be
/// broken arbitrarily but consistently.
pub trait NeighbourOracle {
    /// Number of points in the data set.
    fn len(&self) -> usize;

    /// Returns whether the data set contains no points.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Searches the `k` nearest neighbours of every point in `queries`.
    ///
    /// On success, `queries` retains only the rows the search satisfied,
    /// in their original order, and `out` holds `queries.len() * k`
    /// point indices: row `i` of `out` lists the `k` nearest neighbours
    /// of `queries[i]` in ascending distance order. A query point is its
    /// own nearest neighbour when the implementation counts it as a
    /// candidate.
    ///
    /// When `radius` is given, a query with fewer than `k` neighbours no
    /// farther than `radius` is dropped from `queries` and contributes
    /// no row. The query buffer is compacted in place; callers must not
    /// assume it survives the call unchanged.
    ///
    /// # Errors
    /// Returns [`OracleError::OutOfBounds`] for an invalid query index
    /// and [`OracleError::InvalidK`] when `k` is zero or exceeds the
    /// data set size. Implementations map internal failures to
    /// [`OracleError::Backend`].
    fn search(
        &self,
        queries: &mut Vec<PointIndex>,
        k: usize,
        radius: Option<f32>,
        out: &mut Vec<PointIndex>,
    ) -> Result<(), OracleError>;
}
