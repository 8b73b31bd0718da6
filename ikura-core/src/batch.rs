//! Batch clustering through a neighbour search oracle.
//!
//! The batch clusterer never materialises the nearest-neighbour digraph.
//! It walks the data set once, streaming batches of still-unassigned
//! candidates through the oracle; a candidate whose `k` nearest
//! neighbours are all unassigned becomes the seed of a new cluster and
//! claims them. One batched search replaces `k` digraph rows, so peak
//! memory stays at `O(batch_size * k)` regardless of the data set size.

use crate::{
    clustering::{ClusterLabel, Clustering, UnassignedMethod},
    digraph::PointIndex,
    error::{Error, ErrorCode, Result},
    mem,
    oracle::NeighbourOracle,
};

/// Exclusive upper bound on data set sizes (reserved sentinel excluded).
const MAX_POINTS: usize = PointIndex::MAX as usize;

/// Configures [`BatchClustering`].
///
/// # Examples
/// ```
/// use ikura_core::{BatchClusteringBuilder, ErrorCode, UnassignedMethod};
///
/// let clustering = BatchClusteringBuilder::new(3)
///     .with_unassigned_method(UnassignedMethod::AnyNeighbor)
///     .with_batch_size(128)
///     .build()?;
/// assert_eq!(clustering.size_constraint(), 3);
///
/// let err = BatchClusteringBuilder::new(1).build().expect_err("k must be at least 2");
/// assert_eq!(err.code(), ErrorCode::InvalidInput);
/// # Ok::<(), ikura_core::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct BatchClusteringBuilder {
    size_constraint: u32,
    unassigned_method: UnassignedMethod,
    radius: Option<f32>,
    primary_points: Option<Vec<PointIndex>>,
    batch_size: u32,
}

impl BatchClusteringBuilder {
    /// Creates a builder for clusters of at least `size_constraint`
    /// points.
    #[must_use]
    pub fn new(size_constraint: u32) -> Self {
        Self {
            size_constraint,
            unassigned_method: UnassignedMethod::default(),
            radius: None,
            primary_points: None,
            batch_size: 0,
        }
    }

    /// Selects the policy for points that cannot join a cluster as core
    /// members.
    #[must_use]
    pub fn with_unassigned_method(mut self, method: UnassignedMethod) -> Self {
        self.unassigned_method = method;
        self
    }

    /// Restricts cluster membership to neighbours within `radius`.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Restricts seed candidacy to the given points. Other points can
    /// still be claimed as cluster members.
    #[must_use]
    pub fn with_primary_points(mut self, points: Vec<PointIndex>) -> Self {
        self.primary_points = Some(points);
        self
    }

    /// Number of candidates searched per oracle call; zero means as
    /// large as possible.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`ErrorCode::InvalidInput`] when the size constraint is below
    /// two, the radius is not strictly positive and finite, or the
    /// primary point list is present but empty.
    pub fn build(self) -> Result<BatchClustering> {
        if self.size_constraint < 2 {
            return Err(Error::with_message(
                ErrorCode::InvalidInput,
                "Size constraint must be 2 or greater.",
            ));
        }
        if let Some(radius) = self.radius {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(Error::with_message(
                    ErrorCode::InvalidInput,
                    "Invalid radius.",
                ));
            }
        }
        if let Some(primary) = &self.primary_points {
            if primary.is_empty() {
                return Err(Error::with_message(
                    ErrorCode::InvalidInput,
                    "Invalid primary data points.",
                ));
            }
        }
        Ok(BatchClustering {
            size_constraint: self.size_constraint,
            unassigned_method: self.unassigned_method,
            radius: self.radius,
            primary_points: self.primary_points,
            batch_size: self.batch_size,
        })
    }
}

/// Streams a data set through a [`NeighbourOracle`] in batches,
/// producing clusters of at least `size_constraint` points each.
#[derive(Clone, Debug)]
pub struct BatchClustering {
    size_constraint: u32,
    unassigned_method: UnassignedMethod,
    radius: Option<f32>,
    primary_points: Option<Vec<PointIndex>>,
    batch_size: u32,
}

impl BatchClustering {
    /// The configured minimum cluster size.
    #[must_use]
    pub fn size_constraint(&self) -> u32 {
        self.size_constraint
    }

    /// The configured unassigned-point policy.
    #[must_use]
    pub fn unassigned_method(&self) -> UnassignedMethod {
        self.unassigned_method
    }

    /// The configured radius constraint, when any.
    #[must_use]
    pub fn radius(&self) -> Option<f32> {
        self.radius
    }

    /// Clusters the oracle's data set.
    ///
    /// # Errors
    /// [`ErrorCode::NoSolution`] when the data set is smaller than the
    /// size constraint, when no primary candidate exists, or when a
    /// radius constraint prevents every seed;
    /// [`ErrorCode::TooLargeProblem`] when the data set or the cluster
    /// count exceeds the index types;
    /// [`ErrorCode::DistSearchError`] when the oracle fails;
    /// [`ErrorCode::InvalidInput`] for out-of-range primary points.
    #[tracing::instrument(
        name = "core.cluster_batches",
        skip(self, oracle),
        fields(data_set = oracle.name(), points = oracle.len(), k = self.size_constraint)
    )]
    pub fn cluster<O: NeighbourOracle>(&self, oracle: &O) -> Result<Clustering> {
        let num_points = oracle.len();
        if num_points >= MAX_POINTS {
            return Err(Error::with_message(
                ErrorCode::TooLargeProblem,
                "too many data points for the point index type",
            ));
        }
        let k = self.size_constraint as usize;
        if num_points < k {
            return Err(Error::with_message(
                ErrorCode::NoSolution,
                "Fewer data points than size constraint.",
            ));
        }

        let primary_mask = match &self.primary_points {
            None => None,
            Some(primary) => {
                let mut mask = mem::try_filled_vec(false, num_points)?;
                for &p in primary {
                    if p as usize >= num_points {
                        return Err(Error::with_message(
                            ErrorCode::InvalidInput,
                            "primary data point out of range",
                        ));
                    }
                    mask[p as usize] = true;
                }
                Some(mask)
            }
        };

        let batch_cap = match self.batch_size {
            0 => num_points,
            b => (b as usize).min(num_points),
        };
        let mut batch_indices: Vec<PointIndex> = mem::try_vec_with_capacity(batch_cap)?;
        let mut out_indices: Vec<PointIndex> = mem::try_vec_with_capacity(k * batch_cap)?;
        let mut assigned = mem::try_filled_vec(false, num_points)?;
        let mut labels = mem::try_filled_vec(ClusterLabel::NA, num_points)?;

        let mut search_done = false;
        let mut next_label = 0_usize;
        let mut cursor = 0_usize;

        loop {
            batch_indices.clear();
            while batch_indices.len() < batch_cap && cursor < num_points {
                if !assigned[cursor] && primary_mask.as_ref().map_or(true, |mask| mask[cursor]) {
                    batch_indices.push(cursor as PointIndex);
                }
                cursor += 1;
            }
            if batch_indices.is_empty() {
                break;
            }

            search_done = true;
            oracle
                .search(&mut batch_indices, k, self.radius, &mut out_indices)
                .map_err(|err| {
                    Error::with_message(ErrorCode::DistSearchError, err.to_string())
                })?;

            #[cfg(feature = "stable")]
            {
                for row in out_indices.chunks_mut(k) {
                    row.sort_unstable();
                }
            }

            for i in 0..batch_indices.len() {
                let q = batch_indices[i] as usize;
                if assigned[q] {
                    continue;
                }
                let row = &out_indices[i * k..(i + 1) * k];
                match row.iter().position(|&x| assigned[x as usize]) {
                    None => {
                        // Every neighbour is unclaimed: `q` seeds the
                        // next cluster.
                        if next_label == ClusterLabel::MAX_CLUSTERS {
                            return Err(Error::with_message(
                                ErrorCode::TooLargeProblem,
                                "too many clusters for the cluster label type",
                            ));
                        }
                        let label = ClusterLabel::new(next_label as u32);
                        for &x in &row[..k - 1] {
                            assigned[x as usize] = true;
                            labels[x as usize] = label;
                        }
                        if assigned[q] {
                            // `q` sat among its own first k - 1
                            // neighbours; the final slot still holds an
                            // unclaimed point, so the cluster reaches
                            // size k.
                            let x = row[k - 1] as usize;
                            debug_assert!(!assigned[x]);
                            assigned[x] = true;
                            labels[x] = label;
                        } else {
                            assigned[q] = true;
                            labels[q] = label;
                        }
                        next_label += 1;
                    }
                    Some(first_assigned) => {
                        if self.unassigned_method == UnassignedMethod::AnyNeighbor {
                            // Preliminary assignment; a later seed may
                            // still claim `q` as a core member and
                            // overwrite this label.
                            labels[q] = labels[row[first_assigned] as usize];
                        }
                    }
                }
            }
        }

        if next_label == 0 {
            return Err(if search_done {
                Error::with_message(ErrorCode::NoSolution, "Infeasible radius constraint.")
            } else {
                Error::with_message(ErrorCode::NoSolution, "No primary data points.")
            });
        }

        tracing::debug!(clusters = next_label, "batch clustering finished");
        Ok(Clustering::from_parts(labels, next_label))
    }
}
