//! Clustering result types.
//!
//! A [`Clustering`] maps every data point to a [`ClusterLabel`] or to the
//! unassigned sentinel [`ClusterLabel::NA`]. Labels are dense: a
//! clustering with `num_clusters` clusters uses exactly the labels
//! `0..num_clusters`.

use std::fmt;

/// Label assigned to a cluster, or the unassigned sentinel.
///
/// Valid labels are `[0, MAX_CLUSTERS)`; [`ClusterLabel::NA`] marks a
/// point that belongs to no cluster. The number of clusters in any
/// problem must stay strictly below [`ClusterLabel::MAX_CLUSTERS`].
///
/// # Examples
/// ```
/// use ikura_core::ClusterLabel;
///
/// let label = ClusterLabel::new(4);
/// assert_eq!(label.get(), 4);
/// assert!(!label.is_na());
/// assert!(ClusterLabel::NA.is_na());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ClusterLabel(u32);

impl ClusterLabel {
    /// Sentinel for points that belong to no cluster.
    pub const NA: Self = Self(u32::MAX);

    /// Exclusive upper bound on the number of clusters.
    pub const MAX_CLUSTERS: usize = u32::MAX as usize;

    /// Creates a label from its numeric value.
    #[must_use]
    pub fn new(label: u32) -> Self {
        debug_assert!(label != u32::MAX, "u32::MAX is reserved for NA");
        Self(label)
    }

    /// Returns the underlying numeric label.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Returns whether this is the unassigned sentinel.
    #[must_use]
    pub fn is_na(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_na() {
            f.write_str("NA")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Policy for points that cannot become a seed or core cluster member.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum UnassignedMethod {
    /// Leave such points labelled [`ClusterLabel::NA`].
    #[default]
    Ignore,
    /// Give such points the label of their first already-assigned
    /// neighbour, when one exists.
    AnyNeighbor,
}

/// The output of a clustering run.
///
/// # Examples
/// ```
/// use ikura_core::{Digraph, NngClustering};
///
/// let nng = Digraph::from_rows(4, &[&[1], &[0], &[3], &[2]])?;
/// let clustering = NngClustering::new().cluster(&nng)?;
/// assert_eq!(clustering.num_data_points(), 4);
/// assert_eq!(clustering.num_clusters(), 2);
/// assert_eq!(clustering.assigned_count(), 4);
/// # Ok::<(), ikura_core::Error>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Clustering {
    labels: Vec<ClusterLabel>,
    num_clusters: usize,
}

impl Clustering {
    pub(crate) fn from_parts(labels: Vec<ClusterLabel>, num_clusters: usize) -> Self {
        debug_assert!(num_clusters < ClusterLabel::MAX_CLUSTERS);
        debug_assert!(
            labels
                .iter()
                .all(|l| l.is_na() || (l.get() as usize) < num_clusters),
            "labels must be dense in 0..num_clusters"
        );
        Self {
            labels,
            num_clusters,
        }
    }

    /// Number of data points covered by this clustering.
    #[must_use]
    pub fn num_data_points(&self) -> usize {
        self.labels.len()
    }

    /// Number of clusters produced.
    #[must_use]
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// The per-point label array; unassigned points hold [`ClusterLabel::NA`].
    #[must_use]
    pub fn labels(&self) -> &[ClusterLabel] {
        &self.labels
    }

    /// The label of `point`, or `None` when the point is unassigned or
    /// out of range.
    #[must_use]
    pub fn label(&self, point: usize) -> Option<ClusterLabel> {
        self.labels
            .get(point)
            .copied()
            .filter(|label| !label.is_na())
    }

    /// Number of points assigned to some cluster.
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.labels.iter().filter(|label| !label.is_na()).count()
    }

    /// Size of every cluster, indexed by label.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0_usize; self.num_clusters];
        for label in &self.labels {
            if !label.is_na() {
                sizes[label.get() as usize] += 1;
            }
        }
        sizes
    }

    /// Consumes the clustering, returning the label array.
    #[must_use]
    pub fn into_labels(self) -> Vec<ClusterLabel> {
        self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn labelled(values: &[u32]) -> Vec<ClusterLabel> {
        values
            .iter()
            .map(|&v| {
                if v == u32::MAX {
                    ClusterLabel::NA
                } else {
                    ClusterLabel::new(v)
                }
            })
            .collect()
    }

    #[rstest]
    #[case::all_assigned(&[0, 0, 1, 1], 2, 4)]
    #[case::with_na(&[0, u32::MAX, 0, u32::MAX], 1, 2)]
    #[case::empty(&[], 0, 0)]
    fn accessors_report_assignment_state(
        #[case] labels: &[u32],
        #[case] clusters: usize,
        #[case] assigned: usize,
    ) {
        let clustering = Clustering::from_parts(labelled(labels), clusters);
        assert_eq!(clustering.num_clusters(), clusters);
        assert_eq!(clustering.assigned_count(), assigned);
        assert_eq!(clustering.num_data_points(), labels.len());
    }

    #[rstest]
    fn label_filters_na_and_out_of_range() {
        let clustering = Clustering::from_parts(labelled(&[0, u32::MAX]), 1);
        assert_eq!(clustering.label(0), Some(ClusterLabel::new(0)));
        assert_eq!(clustering.label(1), None);
        assert_eq!(clustering.label(7), None);
    }

    #[rstest]
    fn cluster_sizes_count_members_per_label() {
        let clustering = Clustering::from_parts(labelled(&[0, 1, 1, u32::MAX, 0, 1]), 2);
        assert_eq!(clustering.cluster_sizes(), vec![2, 3]);
    }

    #[test]
    fn label_display_shows_na() {
        assert_eq!(ClusterLabel::NA.to_string(), "NA");
        assert_eq!(ClusterLabel::new(3).to_string(), "3");
    }
}
