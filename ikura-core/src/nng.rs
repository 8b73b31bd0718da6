//! Graph-based clustering entry point.
//!
//! Takes a materialised nearest-neighbour digraph, selects seeds with a
//! configurable [`SeedMethod`], and labels every seed's closed
//! out-neighbourhood as one cluster.

use crate::{
    clustering::{ClusterLabel, Clustering, UnassignedMethod},
    digraph::{Digraph, PointIndex},
    error::Result,
    mem,
    seed::{self, SeedMethod},
};

/// Configuration for clustering a materialised nearest-neighbour digraph.
///
/// # Examples
/// ```
/// use ikura_core::{ClusterLabel, Digraph, NngClustering, SeedMethod};
///
/// let nng = Digraph::from_rows(6, &[&[1], &[0], &[3], &[2], &[5], &[4]])?;
/// let clustering = NngClustering::new()
///     .with_seed_method(SeedMethod::Lexical)
///     .cluster(&nng)?;
/// let labels: Vec<u32> = clustering.labels().iter().map(|l| l.get()).collect();
/// assert_eq!(labels, vec![0, 0, 1, 1, 2, 2]);
/// # Ok::<(), ikura_core::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct NngClustering {
    seed_method: SeedMethod,
    unassigned_method: UnassignedMethod,
}

impl NngClustering {
    /// Creates a configuration with the default seed method and
    /// [`UnassignedMethod::Ignore`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the seed method.
    #[must_use]
    pub fn with_seed_method(mut self, method: SeedMethod) -> Self {
        self.seed_method = method;
        self
    }

    /// Selects the policy for points outside every seed's neighbourhood.
    #[must_use]
    pub fn with_unassigned_method(mut self, method: UnassignedMethod) -> Self {
        self.unassigned_method = method;
        self
    }

    /// Returns the configured seed method.
    #[must_use]
    pub fn seed_method(&self) -> SeedMethod {
        self.seed_method
    }

    /// Returns the configured unassigned-point policy.
    #[must_use]
    pub fn unassigned_method(&self) -> UnassignedMethod {
        self.unassigned_method
    }

    /// Runs seed selection on `nng` and labels the clusters.
    ///
    /// # Errors
    /// Propagates every error of [`seed::find_seeds`].
    #[tracing::instrument(
        name = "core.cluster_graph",
        skip(self, nng),
        fields(vertices = nng.vertex_count(), method = ?self.seed_method)
    )]
    pub fn cluster(&self, nng: &Digraph) -> Result<Clustering> {
        let seeds = seed::find_seeds(nng, self.seed_method)?;
        label_clusters(nng, &seeds, self.unassigned_method)
    }
}

/// Labels each seed's closed out-neighbourhood with the seed's cluster.
///
/// Closed neighbourhoods of distinct seeds are disjoint, so the write
/// order does not matter. Under [`UnassignedMethod::AnyNeighbor`] a
/// single pass then hands every still-unassigned vertex the label of its
/// first assigned out-neighbour; vertices whose neighbours are all
/// unassigned at the time they are visited stay unassigned.
fn label_clusters(
    nng: &Digraph,
    seeds: &[PointIndex],
    unassigned_method: UnassignedMethod,
) -> Result<Clustering> {
    let vertices = nng.vertex_count();
    let mut labels = mem::try_filled_vec(ClusterLabel::NA, vertices)?;

    for (cluster, &seed) in seeds.iter().enumerate() {
        let label = ClusterLabel::new(cluster as u32);
        for &x in nng.out(seed as usize) {
            labels[x as usize] = label;
        }
        labels[seed as usize] = label;
    }

    if unassigned_method == UnassignedMethod::AnyNeighbor {
        for v in 0..vertices {
            if !labels[v].is_na() {
                continue;
            }
            if let Some(&x) = nng.out(v).iter().find(|&&x| !labels[x as usize].is_na()) {
                labels[v] = labels[x as usize];
            }
        }
    }

    Ok(Clustering::from_parts(labels, seeds.len()))
}
