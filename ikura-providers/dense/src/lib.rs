//! Dense in-memory point matrix provider.
//!
//! [`DensePoints`] stores a row-major matrix of `f32` coordinates and
//! answers nearest-neighbour searches by exhaustive scan: exact
//! results, Euclidean distance, ties broken towards the lower point
//! index. It is the reference [`NeighbourOracle`] for data sets small
//! enough that no index structure pays off.

mod errors;


pub use crate::errors::DensePointsError;

use ikura_core::{NeighbourOracle, OracleError, PointIndex};

/// A dense row-major point matrix.
///
/// # Examples
/// ```
/// use ikura_core::NeighbourOracle;
/// use ikura_dense::DensePoints;
///
/// let points = DensePoints::from_rows("grid", 2, vec![0.0, 0.0, 1.0, 0.0, 5.0, 5.0])?;
/// assert_eq!(points.len(), 3);
/// assert_eq!(points.dimension(), 2);
///
/// let mut queries = vec![0];
/// let mut out = Vec::new();
/// points.search(&mut queries, 2, None, &mut out)?;
/// assert_eq!(out, vec![0, 1]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct DensePoints {
    name: String,
    rows: usize,
    dimension: usize,
    values: Vec<f32>,
}

impl DensePoints {
    /// Creates a provider from a row-major value buffer.
    ///
    /// # Errors
    /// [`DensePointsError::ZeroDimension`] when `dimension` is zero and
    /// [`DensePointsError::RaggedRows`] when the buffer does not divide
    /// into whole rows.
    pub fn from_rows(
        name: impl Into<String>,
        dimension: usize,
        values: Vec<f32>,
    ) -> Result<Self, DensePointsError> {
        if dimension == 0 {
            return Err(DensePointsError::ZeroDimension);
        }
        if values.len() % dimension != 0 {
            return Err(DensePointsError::RaggedRows {
                values: values.len(),
                dimension,
            });
        }
        Ok(Self {
            name: name.into(),
            rows: values.len() / dimension,
            dimension,
            values,
        })
    }

    /// Creates a one-dimensional provider from scalar positions.
    #[must_use]
    pub fn from_scalars(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            rows: values.len(),
            dimension: 1,
            values,
        }
    }

    /// The dimensionality of each point.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The underlying row-major matrix.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.values
    }

    fn row_slice(&self, index: usize) -> Result<&[f32], OracleError> {
        if index >= self.rows {
            return Err(OracleError::OutOfBounds { index });
        }
        let start = index * self.dimension;
        Ok(&self.values[start..start + self.dimension])
    }

    fn distance(&self, left: &[f32], right: &[f32]) -> f32 {
        let mut sum = 0.0_f32;
        for i in 0..self.dimension {
            let diff = left[i] - right[i];
            sum += diff * diff;
        }
        sum.sqrt()
    }
}

impl NeighbourOracle for DensePoints {
    fn len(&self) -> usize {
        self.rows
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn search(
        &self,
        queries: &mut Vec<PointIndex>,
        k: usize,
        radius: Option<f32>,
        out: &mut Vec<PointIndex>,
    ) -> Result<(), OracleError> {
        if k == 0 || k > self.rows {
            return Err(OracleError::InvalidK {
                k,
                points: self.rows,
            });
        }
        out.clear();
        let mut kept = 0_usize;
        let mut candidates: Vec<(f32, PointIndex)> = Vec::with_capacity(self.rows);
        for slot in 0..queries.len() {
            let query = queries[slot] as usize;
            let origin = self.row_slice(query)?;
            candidates.clear();
            for i in 0..self.rows {
                let distance = self.distance(origin, self.row_slice(i)?);
                if radius.map_or(true, |r| distance <= r) {
                    candidates.push((distance, i as PointIndex));
                }
            }
            if candidates.len() < k {
                // Radius-constrained query with too few neighbours; the
                // row is omitted and the query dropped.
                continue;
            }
            candidates.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            queries[kept] = query as PointIndex;
            kept += 1;
            out.extend(candidates[..k].iter().map(|&(_, i)| i));
        }
        queries.truncate(kept);
        Ok(())
    }
}
