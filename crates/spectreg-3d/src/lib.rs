#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the crate.
pub mod error;

/// Linear algebra utilities.
pub mod linalg;

/// Nearest-point cloud distance metrics.
pub mod metrics;

/// Point cloud container.
pub mod pointcloud;

/// Rotation matrix constructors.
pub mod transforms;

/// Dense voxel rasterization.
pub mod voxelgrid;

pub use error::CloudError;
