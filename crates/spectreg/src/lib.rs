#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use spectreg_3d as p3d;

#[doc(inline)]
pub use spectreg_core as reg;
