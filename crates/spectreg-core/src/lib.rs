#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Peak extraction from correlation surfaces.
pub mod alignment;

/// Band-limited spectral cross-correlation.
pub mod correlation;

/// Error types for the crate.
pub mod error;

/// Laplacian-pyramid spectrum fusion.
pub mod fusion;

/// Registration orchestration.
pub mod registration;

/// Spherical function sampling.
pub mod sampler;

/// Spectral shift utilities.
pub mod signal;

/// Scalar diagnostics collection.
pub mod stats;

/// Correlation peak confidence scoring.
pub mod uncertainty;

pub use error::CoreError;
