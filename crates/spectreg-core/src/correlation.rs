use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::error::CoreError;
use crate::signal;

/// Band-limited spectral cross-correlation engine.
///
/// The engine owns its transform plans and all scratch buffers for its entire
/// lifetime; buffers are sized to the total bin count `N = prod(dims)` at
/// construction and reused across calls. A single instance is confined to one
/// thread at a time: `correlate` returns a view into the engine's own output
/// buffer, so concurrent callers must each own a distinct instance.
///
/// The retained frequency band `[lower_bound, upper_bound)` refers to the
/// flat, zero-frequency-centered (shifted) spectrum; both bounds are clamped
/// to `[0, N]` at construction.
pub struct SpatialCorrelationLowPass {
    dims: Vec<usize>,
    n: usize,
    lower_bound: usize,
    upper_bound: usize,
    forward: Vec<Arc<dyn Fft<f64>>>,
    inverse: Vec<Arc<dyn Fft<f64>>>,
    f: Vec<Complex64>,
    g: Vec<Complex64>,
    c: Vec<Complex64>,
    out: Vec<f64>,
    line: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl SpatialCorrelationLowPass {
    /// Create an engine for signals of shape `dims` (row-major).
    ///
    /// `lower_bound` and `upper_bound` select the retained frequency band;
    /// out-of-range values are silently clamped to the valid bin range.
    pub fn new(
        dims: &[usize],
        lower_bound: usize,
        upper_bound: usize,
    ) -> Result<Self, CoreError> {
        if dims.is_empty() || dims.iter().any(|&d| d == 0) {
            return Err(CoreError::InvalidBinCount);
        }
        let n: usize = dims.iter().product();

        let mut planner = FftPlanner::<f64>::new();
        let forward: Vec<_> = dims.iter().map(|&d| planner.plan_fft_forward(d)).collect();
        let inverse: Vec<_> = dims.iter().map(|&d| planner.plan_fft_inverse(d)).collect();
        let scratch_len = forward
            .iter()
            .chain(inverse.iter())
            .map(|plan| plan.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        let max_dim = dims.iter().copied().max().unwrap_or(0);

        let lower_bound = lower_bound.min(n);
        let upper_bound = upper_bound.min(n);
        log::debug!(
            "correlation engine: {} bins, retained band [{}, {})",
            n,
            lower_bound,
            upper_bound
        );

        Ok(Self {
            dims: dims.to_vec(),
            n,
            lower_bound,
            upper_bound,
            forward,
            inverse,
            f: vec![Complex64::new(0.0, 0.0); n],
            g: vec![Complex64::new(0.0, 0.0); n],
            c: vec![Complex64::new(0.0, 0.0); n],
            out: vec![0.0; n],
            line: vec![Complex64::new(0.0, 0.0); max_dim],
            scratch: vec![Complex64::new(0.0, 0.0); scratch_len],
        })
    }

    /// Total bin count of the transform domain.
    pub fn total_bins(&self) -> usize {
        self.n
    }

    /// Signal shape the engine was built for.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// The clamped retained band `(lower_bound, upper_bound)`.
    pub fn bounds(&self) -> (usize, usize) {
        (self.lower_bound, self.upper_bound)
    }

    /// Cross-correlate two real-valued signals, returning the spatial-domain
    /// correlation surface.
    ///
    /// The inputs are bulk-copied into the engine's buffers, forward
    /// transformed, shifted so the zero-frequency bin is centered, multiplied
    /// as `C = F * conj(G)` inside the retained band (zero outside it),
    /// inverse shifted and inverse transformed. The returned slice is the raw
    /// (unnormalized) inverse transform and aliases the engine's own output
    /// buffer.
    pub fn correlate(&mut self, f: &[f64], g: &[f64]) -> Result<&[f64], CoreError> {
        self.compute_cross_spectrum(f, g)?;
        self.invert_in_place();
        Ok(&self.out)
    }

    /// The frequency-domain half of [`Self::correlate`]: stop after the
    /// banded conjugate product and inverse shift, returning the
    /// cross-power spectrum handed to fusion.
    pub fn cross_power_spectrum(
        &mut self,
        f: &[f64],
        g: &[f64],
    ) -> Result<Vec<Complex64>, CoreError> {
        self.compute_cross_spectrum(f, g)?;
        Ok(self.c.clone())
    }

    /// Inverse transform a (fused) spectrum into the spatial domain.
    pub fn invert_spectrum(&mut self, spectrum: &[Complex64]) -> Result<&[f64], CoreError> {
        if spectrum.len() != self.n {
            return Err(CoreError::SizeMismatch(spectrum.len(), self.n));
        }
        self.c.copy_from_slice(spectrum);
        self.invert_in_place();
        Ok(&self.out)
    }

    fn compute_cross_spectrum(&mut self, f: &[f64], g: &[f64]) -> Result<(), CoreError> {
        if f.len() != self.n {
            return Err(CoreError::SizeMismatch(f.len(), self.n));
        }
        if g.len() != self.n {
            return Err(CoreError::SizeMismatch(g.len(), self.n));
        }

        for (dst, &src) in self.f.iter_mut().zip(f.iter()) {
            *dst = Complex64::new(src, 0.0);
        }
        for (dst, &src) in self.g.iter_mut().zip(g.iter()) {
            *dst = Complex64::new(src, 0.0);
        }

        Self::apply_transform(
            &self.forward,
            &self.dims,
            &mut self.f,
            &mut self.line,
            &mut self.scratch,
        );
        Self::apply_transform(
            &self.forward,
            &self.dims,
            &mut self.g,
            &mut self.line,
            &mut self.scratch,
        );

        signal::fft_shift(&mut self.f);
        signal::fft_shift(&mut self.g);

        for i in 0..self.n {
            self.c[i] = if i >= self.lower_bound && i < self.upper_bound {
                self.f[i] * self.g[i].conj()
            } else {
                Complex64::new(0.0, 0.0)
            };
        }

        signal::ifft_shift(&mut self.c);
        Ok(())
    }

    fn invert_in_place(&mut self) {
        Self::apply_transform(
            &self.inverse,
            &self.dims,
            &mut self.c,
            &mut self.line,
            &mut self.scratch,
        );
        for (dst, src) in self.out.iter_mut().zip(self.c.iter()) {
            *dst = src.re;
        }
    }

    // Separable multi-dimensional transform: one 1-D pass per axis over the
    // row-major buffer, gathering strided lines through the reusable line
    // buffer.
    fn apply_transform(
        plans: &[Arc<dyn Fft<f64>>],
        dims: &[usize],
        data: &mut [Complex64],
        line: &mut [Complex64],
        scratch: &mut [Complex64],
    ) {
        for (axis, plan) in plans.iter().enumerate() {
            let len = dims[axis];
            let inner: usize = dims[axis + 1..].iter().product();
            let outer: usize = dims[..axis].iter().product();
            let block = len * inner;
            for o in 0..outer {
                for i in 0..inner {
                    let base = o * block + i;
                    for (k, value) in line[..len].iter_mut().enumerate() {
                        *value = data[base + k * inner];
                    }
                    plan.process_with_scratch(&mut line[..len], scratch);
                    for (k, value) in line[..len].iter().enumerate() {
                        data[base + k * inner] = *value;
                    }
                }
            }
        }
    }
}
