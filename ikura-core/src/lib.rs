//! ikura core library.
//!
//! Size-constrained clustering: partitions of a data set in which every
//! cluster holds at least `k` points, built from nearest-neighbour
//! digraphs. Two entry points share the machinery:
//!
//! - [`NngClustering`] clusters a materialised NNG ([`Digraph`]) by
//!   selecting seeds with one of six [`SeedMethod`] heuristics.
//! - [`BatchClustering`] streams candidate batches through a
//!   [`NeighbourOracle`] and never builds the full digraph.
//!
//! The algorithms are heuristic: clusters satisfy the size constraint
//! and (when requested) a within-cluster radius bound, but no optimality
//! is claimed. The core is single-threaded and synchronous; run
//! independent instances for parallelism.

mod batch;
mod clustering;
mod digraph;
mod error;
mod mem;
mod nng;
mod oracle;
mod seed;

pub use crate::{
    batch::{BatchClustering, BatchClusteringBuilder},
    clustering::{ClusterLabel, Clustering, UnassignedMethod},
    digraph::{
        ArcIndex, Digraph, PointIndex,
        ops::{
            LoopRule, adjacency_product, delete_loops, difference, transpose, union_and_delete,
            union_of,
        },
    },
    error::{Error, ErrorCode, Result},
    nng::NngClustering,
    oracle::{NeighbourOracle, OracleError},
    seed::{SeedMethod, find_seeds},
};
