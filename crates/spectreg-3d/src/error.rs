/// An error type for point cloud and geometry operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CloudError {
    /// Error when two buffers that must match in length do not.
    #[error("buffer length ({0}) does not match the expected length ({1})")]
    SizeMismatch(usize, usize),

    /// Error when a rotation axis has zero length.
    #[error("cannot compute a rotation matrix from a zero vector")]
    ZeroVector,

    /// Error when an operation requires a non-empty point cloud.
    #[error("point cloud must not be empty")]
    EmptyPointCloud,

    /// Error when a grid resolution is zero.
    #[error("grid resolution must be greater than zero")]
    InvalidResolution,
}
