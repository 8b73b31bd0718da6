//! Error types for the dense point provider.

use thiserror::Error;

/// An error produced while constructing a [`DensePoints`] matrix.
///
/// [`DensePoints`]: crate::DensePoints
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum DensePointsError {
    /// Rows must have a positive dimension.
    #[error("point dimension must be positive")]
    ZeroDimension,
    /// The value buffer does not split into whole rows.
    #[error("{values} values do not divide into rows of dimension {dimension}")]
    RaggedRows { values: usize, dimension: usize },
}
