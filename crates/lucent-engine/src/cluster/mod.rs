//! Cluster grid and light assignment.
//!
//! `ClusterGrid` fixes the addressing and buffer size, `ClusterSet` is the
//! host image of the cluster buffer, and `assign_clusters` is the host form of
//! the clustering kernel used for tests and GPU readback validation.

mod assign;
mod bounds;
mod grid;
mod set;

pub use assign::{assign_clusters, AssignStats};
pub use bounds::{cell_bounds, cluster_for_fragment, slice_depth, ClusterBounds};
pub use grid::{align16, ClusterGrid, CLUSTER_HEADER_BYTES};
pub use set::ClusterSet;
