use num_complex::Complex64;

use crate::error::CoreError;

/// One pyramid decomposition of a spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct PyramidLevel {
    /// The retained band `[lower_bound, upper_bound)` of the spectrum.
    pub low_pass: Vec<Complex64>,
    /// Full-length residual, zero inside the retained band.
    pub residual: Vec<Complex64>,
}

/// Laplacian-pyramid decomposition and multi-channel spectrum fusion.
///
/// The `divider` ratio controls how much of a spectrum counts as low
/// frequency: a spectrum of length `n` splits at
/// `lower_bound = round(n / divider)`, `upper_bound = n - lower_bound`.
#[derive(Debug, Clone)]
pub struct LaplacePyramid {
    divider: f64,
}

impl LaplacePyramid {
    /// Create a pyramid with the given divider ratio (must be greater than 1).
    pub fn new(divider: f64) -> Result<Self, CoreError> {
        if !(divider > 1.0) {
            return Err(CoreError::InvalidDivider(divider));
        }
        Ok(Self { divider })
    }

    /// The configured divider ratio.
    pub fn divider(&self) -> f64 {
        self.divider
    }

    fn band(&self, n_coeffs: usize) -> (usize, usize) {
        let lower_bound = ((n_coeffs as f64 / self.divider).round() as usize).min(n_coeffs);
        let upper_bound = (n_coeffs - lower_bound).max(lower_bound);
        (lower_bound, upper_bound)
    }

    /// Split a spectrum into its low-pass band and high-frequency residual.
    ///
    /// The residual keeps the spectrum's values outside the band and is zero
    /// inside it, so `residual + zero-extended low_pass` reproduces the
    /// spectrum exactly.
    pub fn reduce(&self, spectrum: &[Complex64]) -> Result<PyramidLevel, CoreError> {
        let n_coeffs = spectrum.len();
        if n_coeffs == 0 {
            return Err(CoreError::InvalidBinCount);
        }
        let (lower_bound, upper_bound) = self.band(n_coeffs);
        log::debug!(
            "pyramid reduce: lower {}, upper {}, n_low_pass {}",
            lower_bound,
            upper_bound,
            upper_bound - lower_bound
        );

        let low_pass = spectrum[lower_bound..upper_bound].to_vec();
        let mut residual = spectrum.to_vec();
        for value in &mut residual[lower_bound..upper_bound] {
            *value = Complex64::new(0.0, 0.0);
        }
        Ok(PyramidLevel { low_pass, residual })
    }

    /// Write a low-pass band back into the `[lower_bound, upper_bound)` slice
    /// of `residual`, turning it into a full-length reconstruction in place.
    ///
    /// The bounds are recomputed from the residual's length; `low_pass` must
    /// hold at least that many leading coefficients.
    pub fn expand(
        &self,
        low_pass: &[Complex64],
        residual: &mut [Complex64],
    ) -> Result<(), CoreError> {
        let (lower_bound, upper_bound) = self.band(residual.len());
        let n_band = upper_bound - lower_bound;
        if low_pass.len() < n_band {
            return Err(CoreError::SizeMismatch(low_pass.len(), n_band));
        }
        residual[lower_bound..upper_bound].copy_from_slice(&low_pass[..n_band]);
        Ok(())
    }

    /// Winner-take-all fusion of one pyramid level across channels: for every
    /// bin, the residual coefficient of the channel with the highest squared
    /// magnitude is copied into the output. The first channel wins ties.
    pub fn fuse_level_by_max_coeff(
        &self,
        levels_per_channel: &[PyramidLevel],
        n_coeffs: usize,
    ) -> Result<Vec<Complex64>, CoreError> {
        if levels_per_channel.is_empty() {
            return Err(CoreError::EmptyLevelList);
        }
        if n_coeffs == 0 {
            return Err(CoreError::InvalidBinCount);
        }
        for level in levels_per_channel {
            if level.residual.len() != n_coeffs {
                return Err(CoreError::SizeMismatch(level.residual.len(), n_coeffs));
            }
        }

        let mut fused = vec![Complex64::new(0.0, 0.0); n_coeffs];
        for (i, value) in fused.iter_mut().enumerate() {
            let mut max_channel = 0;
            let mut max_energy = levels_per_channel[0].residual[i].norm_sqr();
            for (channel, level) in levels_per_channel.iter().enumerate().skip(1) {
                let energy = level.residual[i].norm_sqr();
                if energy > max_energy {
                    max_channel = channel;
                    max_energy = energy;
                }
            }
            *value = levels_per_channel[max_channel].residual[i];
        }
        Ok(fused)
    }

    /// Elementwise arithmetic mean of the low-pass bands across channels.
    pub fn fuse_last_low_pass_layer(
        &self,
        levels_per_channel: &[PyramidLevel],
    ) -> Result<Vec<Complex64>, CoreError> {
        if levels_per_channel.is_empty() {
            return Err(CoreError::EmptyLevelList);
        }
        let n_coeffs = levels_per_channel[0].low_pass.len();
        for level in levels_per_channel {
            if level.low_pass.len() != n_coeffs {
                return Err(CoreError::SizeMismatch(level.low_pass.len(), n_coeffs));
            }
        }

        let n_channels = levels_per_channel.len() as f64;
        let mut fused = vec![Complex64::new(0.0, 0.0); n_coeffs];
        for (i, value) in fused.iter_mut().enumerate() {
            let mut accumulated = Complex64::new(0.0, 0.0);
            for level in levels_per_channel {
                accumulated += level.low_pass[i];
            }
            *value = accumulated / n_channels;
        }
        Ok(fused)
    }

    /// Fuse the spectra of several channels into one consensus spectrum.
    ///
    /// Every pyramid level is built by reducing each channel's original
    /// full-resolution spectrum (repeated single-level splits, not a cascaded
    /// decomposition) and fusing the residuals winner-take-all. The last
    /// level's low-pass bands are averaged to seed the reconstruction, which
    /// then expands back from the last level to the first.
    pub fn fuse_channels(
        &self,
        channels: &[&[Complex64]],
        n_coeffs: usize,
        n_levels: usize,
    ) -> Result<Vec<Complex64>, CoreError> {
        if channels.is_empty() {
            return Err(CoreError::EmptyChannelList);
        }
        if n_coeffs == 0 {
            return Err(CoreError::InvalidBinCount);
        }
        if n_levels == 0 {
            return Err(CoreError::InvalidLevelCount);
        }
        for channel in channels {
            if channel.len() != n_coeffs {
                return Err(CoreError::SizeMismatch(channel.len(), n_coeffs));
            }
        }

        let mut fused_levels: Vec<Vec<Complex64>> = Vec::with_capacity(n_levels);
        let mut last_levels: Vec<PyramidLevel> = Vec::new();
        for _ in 0..n_levels {
            let levels: Vec<PyramidLevel> = channels
                .iter()
                .map(|channel| self.reduce(channel))
                .collect::<Result<_, _>>()?;
            fused_levels.push(self.fuse_level_by_max_coeff(&levels, n_coeffs)?);
            last_levels = levels;
        }

        let mut reconstruction = self.fuse_last_low_pass_layer(&last_levels)?;
        for fused in fused_levels.iter_mut().rev() {
            self.expand(&reconstruction, fused)?;
            reconstruction = std::mem::take(fused);
        }
        Ok(reconstruction)
    }
}
