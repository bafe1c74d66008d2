use spectreg_3d::error::CloudError;

/// An error type for the signal pipeline.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CoreError {
    /// Error when a signal length does not match the engine bin count.
    #[error("signal length ({0}) does not match the expected bin count ({1})")]
    SizeMismatch(usize, usize),

    /// Error when a bin or dimension count is zero.
    #[error("bin count must be greater than zero")]
    InvalidBinCount,

    /// Error when a fusion call receives no channels.
    #[error("channel list must not be empty")]
    EmptyChannelList,

    /// Error when a fusion call receives no pyramid levels.
    #[error("pyramid level list must not be empty")]
    EmptyLevelList,

    /// Error when the pyramid divider is not greater than one.
    #[error("pyramid divider must be greater than 1, got {0}")]
    InvalidDivider(f64),

    /// Error when the pyramid level count is zero.
    #[error("pyramid level count must be greater than zero")]
    InvalidLevelCount,

    /// Error when a sampler bandwidth is zero.
    #[error("spherical bandwidth must be greater than zero")]
    InvalidBandwidth,

    /// Error when sampling is requested before the grid is initialized.
    #[error("spherical sampler is not initialized")]
    SamplerNotInitialized,

    /// Error when the configured worker count is zero.
    #[error("worker count must be greater than zero")]
    InvalidWorkerCount,

    /// Error when the worker pool cannot be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    /// Error bubbled up from point cloud geometry.
    #[error(transparent)]
    Cloud(#[from] CloudError),
}
