use std::time::Instant;

use num_complex::Complex64;
use rayon::prelude::*;

use spectreg_3d::linalg::transform_points3d;
use spectreg_3d::pointcloud::PointCloud;
use spectreg_3d::voxelgrid::{rasterize_average, GridExtent};

use crate::alignment;
use crate::correlation::SpatialCorrelationLowPass;
use crate::error::CoreError;
use crate::fusion::LaplacePyramid;
use crate::sampler::{FunctionValue, SphericalSampler};
use crate::stats::StatisticsManager;
use crate::uncertainty;

/// Mock registrators that inject a known synthetic transform.
pub mod mock;

const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

// fraction of the cloud extent added around the translation voxel grid
const EXTENT_PADDING: f64 = 0.1;

/// A scalar signal source correlated independently per registration stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalChannel {
    /// Distance of each point to the origin.
    Range,
    /// Per-point intensity attribute (1.0 when the cloud carries none).
    Intensity,
}

/// Configuration of the registration pipeline.
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    /// Spherical sampling bandwidth `B`; the rotation stage correlates
    /// `2B x 2B` grids.
    pub bandwidth: usize,
    /// Voxels per axis of the translation correlation grid.
    pub n_voxels: usize,
    /// Lower bound of the retained frequency band (clamped per engine).
    pub low_pass_lower_bound: usize,
    /// Upper bound of the retained frequency band (clamped per engine).
    pub low_pass_upper_bound: usize,
    /// Laplacian pyramid divider ratio.
    pub pyramid_divider: f64,
    /// Number of pyramid levels used when fusing channels.
    pub pyramid_levels: usize,
    /// Worker pool size for per-channel correlation tasks.
    pub n_workers: usize,
    /// The signal channels to correlate and fuse.
    pub channels: Vec<SignalChannel>,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            bandwidth: 32,
            n_voxels: 64,
            low_pass_lower_bound: 0,
            low_pass_upper_bound: 1000,
            pyramid_divider: 4.0,
            pyramid_levels: 2,
            n_workers: 4,
            channels: vec![SignalChannel::Range, SignalChannel::Intensity],
        }
    }
}

/// The outcome of one registration call.
#[derive(Debug, Clone)]
pub struct RegistrationResult {
    /// Estimated rotation applied to the current cloud.
    pub rotation: [[f64; 3]; 3],
    /// Estimated translation applied after the rotation.
    pub translation: [f64; 3],
    /// The current cloud under the estimated transform.
    pub registered_cloud: PointCloud,
    /// Peak-to-sidelobe confidence of the rotation estimate.
    pub rotation_confidence: f64,
    /// Peak-to-sidelobe confidence of the translation estimate.
    pub translation_confidence: f64,
    /// Whether the rotation stage found a distinguishable peak.
    pub found_solution_for_rotation: bool,
    /// Whether the translation stage found a distinguishable peak.
    pub found_solution_for_translation: bool,
}

/// Capability of registering one point cloud onto another.
pub trait CloudRegistrator {
    /// Estimate the rigid transform aligning `cur` onto `prev`.
    fn register_point_cloud(
        &mut self,
        prev: &PointCloud,
        cur: &PointCloud,
    ) -> Result<RegistrationResult, CoreError>;
}

#[derive(Debug, Clone, Copy, Default)]
struct RunDiagnostics {
    rotation_confidence: f64,
    translation_confidence: f64,
    rotation_seconds: f64,
    translation_seconds: f64,
}

/// Phase-correlation registration pipeline.
///
/// Runs two sequential stages per call: rotation estimation on spherical
/// function grids, then translation estimation on voxel grids of the
/// rotation-compensated cloud. Per-channel correlations fan out to a bounded
/// worker pool owned by this instance and are joined before fusion.
pub struct SphericalRegistration {
    config: RegistrationConfig,
    sampler: SphericalSampler,
    pyramid: LaplacePyramid,
    pool: rayon::ThreadPool,
    diagnostics: Option<RunDiagnostics>,
}

impl SphericalRegistration {
    /// Build a registration pipeline and its worker pool.
    pub fn new(config: RegistrationConfig) -> Result<Self, CoreError> {
        if config.bandwidth == 0 {
            return Err(CoreError::InvalidBandwidth);
        }
        if config.n_voxels == 0 {
            return Err(CoreError::InvalidBinCount);
        }
        if config.channels.is_empty() {
            return Err(CoreError::EmptyChannelList);
        }
        if config.pyramid_levels == 0 {
            return Err(CoreError::InvalidLevelCount);
        }
        if config.n_workers == 0 {
            return Err(CoreError::InvalidWorkerCount);
        }
        let pyramid = LaplacePyramid::new(config.pyramid_divider)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.n_workers)
            .build()
            .map_err(|e| CoreError::ThreadPool(e.to_string()))?;
        Ok(Self {
            config,
            sampler: SphericalSampler::new(),
            pyramid,
            pool,
            diagnostics: None,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// Estimate only the rotation between two clouds.
    ///
    /// The returned result carries the rotation-compensated current cloud and
    /// an identity translation.
    pub fn estimate_rotation(
        &mut self,
        prev: &PointCloud,
        cur: &PointCloud,
    ) -> Result<RegistrationResult, CoreError> {
        let outcome = self.rotation_stage(prev, cur)?;
        let (rotation, found) = match &outcome.peak {
            Some(peak) => (
                alignment::rotation_from_peak(peak, self.config.bandwidth)?,
                true,
            ),
            None => (IDENTITY, false),
        };
        let registered_cloud = transformed_cloud(cur, &rotation, &[0.0; 3])?;
        let mut diagnostics = self.diagnostics.unwrap_or_default();
        diagnostics.rotation_confidence = outcome.confidence;
        diagnostics.rotation_seconds = outcome.seconds;
        self.diagnostics = Some(diagnostics);
        Ok(RegistrationResult {
            rotation,
            translation: [0.0; 3],
            registered_cloud,
            rotation_confidence: outcome.confidence,
            translation_confidence: 0.0,
            found_solution_for_rotation: found,
            found_solution_for_translation: false,
        })
    }

    /// Estimate only the translation between two clouds.
    ///
    /// The returned result carries the translated current cloud and an
    /// identity rotation.
    pub fn estimate_translation(
        &mut self,
        prev: &PointCloud,
        cur: &PointCloud,
    ) -> Result<RegistrationResult, CoreError> {
        let outcome = self.translation_stage(prev, cur)?;
        let (translation, found) = match outcome.translation {
            Some(t) => (t, true),
            None => ([0.0; 3], false),
        };
        let registered_cloud = transformed_cloud(cur, &IDENTITY, &translation)?;
        let mut diagnostics = self.diagnostics.unwrap_or_default();
        diagnostics.translation_confidence = outcome.confidence;
        diagnostics.translation_seconds = outcome.seconds;
        self.diagnostics = Some(diagnostics);
        Ok(RegistrationResult {
            rotation: IDENTITY,
            translation,
            registered_cloud,
            rotation_confidence: 0.0,
            translation_confidence: outcome.confidence,
            found_solution_for_rotation: false,
            found_solution_for_translation: found,
        })
    }

    /// Publish the diagnostics of the most recent run into `manager`.
    pub fn get_statistics(&self, manager: &mut StatisticsManager) {
        manager.add_sample(
            "low_pass_lower_bound",
            self.config.low_pass_lower_bound as f64,
        );
        manager.add_sample(
            "low_pass_upper_bound",
            self.config.low_pass_upper_bound as f64,
        );
        if let Some(diagnostics) = &self.diagnostics {
            manager.add_sample("rotation_confidence", diagnostics.rotation_confidence);
            manager.add_sample("translation_confidence", diagnostics.translation_confidence);
            manager.add_sample("rotation_seconds", diagnostics.rotation_seconds);
            manager.add_sample("translation_seconds", diagnostics.translation_seconds);
        }
    }

    // Stage 1: correlate spherical function grids of both clouds.
    fn rotation_stage(
        &mut self,
        prev: &PointCloud,
        cur: &PointCloud,
    ) -> Result<RotationOutcome, CoreError> {
        let started = Instant::now();
        let bandwidth = self.config.bandwidth;
        self.sampler.initialize(bandwidth)?;

        let mut f_values: Vec<FunctionValue> = Vec::new();
        let mut h_values: Vec<FunctionValue> = Vec::new();
        self.sampler.sample_uniformly(prev, &mut f_values)?;
        self.sampler.sample_uniformly(cur, &mut h_values)?;

        let side = 2 * bandwidth;
        let dims = [side, side];
        let signals: Vec<(Vec<f64>, Vec<f64>)> = self
            .config
            .channels
            .iter()
            .map(|channel| {
                (
                    grid_signal(&f_values, *channel),
                    grid_signal(&h_values, *channel),
                )
            })
            .collect();

        let surface = self.correlate_and_fuse(&signals, &dims)?;
        let peak = alignment::find_peak(&surface, &dims)?;
        let confidence = peak
            .as_ref()
            .map_or(0.0, |p| uncertainty::peak_to_sidelobe_ratio(&surface, p));
        let seconds = started.elapsed().as_secs_f64();
        log::debug!(
            "rotation stage: peak {:?}, confidence {:.3}, {:.3}s",
            peak.as_ref().map(|p| &p.offsets),
            confidence,
            seconds
        );
        Ok(RotationOutcome {
            peak,
            confidence,
            seconds,
        })
    }

    // Stage 2: correlate voxel rasterizations of both clouds.
    fn translation_stage(
        &mut self,
        prev: &PointCloud,
        cur: &PointCloud,
    ) -> Result<TranslationOutcome, CoreError> {
        let started = Instant::now();
        let resolution = self.config.n_voxels;

        let extent = match GridExtent::from_point_sets(prev.points(), cur.points()) {
            Some(extent) => extent.padded(EXTENT_PADDING),
            None => {
                // both clouds empty: nothing to correlate
                return Ok(TranslationOutcome {
                    translation: None,
                    confidence: 0.0,
                    seconds: started.elapsed().as_secs_f64(),
                });
            }
        };
        let voxel_sizes = extent.voxel_sizes(resolution);

        let dims = [resolution, resolution, resolution];
        let signals: Vec<(Vec<f64>, Vec<f64>)> = self
            .config
            .channels
            .iter()
            .map(|channel| -> Result<(Vec<f64>, Vec<f64>), CoreError> {
                let f = rasterize_average(
                    prev.points(),
                    &channel_values(prev, *channel),
                    &extent,
                    resolution,
                )?;
                let g = rasterize_average(
                    cur.points(),
                    &channel_values(cur, *channel),
                    &extent,
                    resolution,
                )?;
                Ok((f, g))
            })
            .collect::<Result<_, CoreError>>()?;

        let surface = self.correlate_and_fuse(&signals, &dims)?;
        let peak = alignment::find_peak(&surface, &dims)?;
        let confidence = peak
            .as_ref()
            .map_or(0.0, |p| uncertainty::peak_to_sidelobe_ratio(&surface, p));
        let translation = peak
            .as_ref()
            .map(|p| alignment::translation_from_peak(p, &voxel_sizes))
            .transpose()?;
        let seconds = started.elapsed().as_secs_f64();
        log::debug!(
            "translation stage: estimate {:?}, confidence {:.3}, {:.3}s",
            translation,
            confidence,
            seconds
        );
        Ok(TranslationOutcome {
            translation,
            confidence,
            seconds,
        })
    }

    // Fan one correlation task per channel out to the worker pool, join, and
    // fuse the resulting spectra into one spatial correlation surface. Every
    // task constructs and exclusively owns its engine; the parallel collect
    // is the fan-in barrier before fusion.
    fn correlate_and_fuse(
        &self,
        signals: &[(Vec<f64>, Vec<f64>)],
        dims: &[usize],
    ) -> Result<Vec<f64>, CoreError> {
        let (lower, upper) = (
            self.config.low_pass_lower_bound,
            self.config.low_pass_upper_bound,
        );
        let spectra: Vec<Vec<Complex64>> = self.pool.install(|| {
            signals
                .par_iter()
                .map(|(f, g)| {
                    let mut engine = SpatialCorrelationLowPass::new(dims, lower, upper)?;
                    engine.cross_power_spectrum(f, g)
                })
                .collect::<Result<_, CoreError>>()
        })?;

        let n: usize = dims.iter().product();
        let channel_refs: Vec<&[Complex64]> = spectra.iter().map(Vec::as_slice).collect();
        let fused = self
            .pyramid
            .fuse_channels(&channel_refs, n, self.config.pyramid_levels)?;

        let mut engine = SpatialCorrelationLowPass::new(dims, lower, upper)?;
        Ok(engine.invert_spectrum(&fused)?.to_vec())
    }
}

impl CloudRegistrator for SphericalRegistration {
    fn register_point_cloud(
        &mut self,
        prev: &PointCloud,
        cur: &PointCloud,
    ) -> Result<RegistrationResult, CoreError> {
        let rotation_result = self.estimate_rotation(prev, cur)?;
        let translation_result =
            self.estimate_translation(prev, &rotation_result.registered_cloud)?;
        Ok(RegistrationResult {
            rotation: rotation_result.rotation,
            translation: translation_result.translation,
            registered_cloud: translation_result.registered_cloud,
            rotation_confidence: rotation_result.rotation_confidence,
            translation_confidence: translation_result.translation_confidence,
            found_solution_for_rotation: rotation_result.found_solution_for_rotation,
            found_solution_for_translation: translation_result.found_solution_for_translation,
        })
    }
}

struct RotationOutcome {
    peak: Option<alignment::PeakEstimate>,
    confidence: f64,
    seconds: f64,
}

struct TranslationOutcome {
    translation: Option<[f64; 3]>,
    confidence: f64,
    seconds: f64,
}

fn grid_signal(values: &[FunctionValue], channel: SignalChannel) -> Vec<f64> {
    match channel {
        SignalChannel::Range => values.iter().map(|v| v.range).collect(),
        SignalChannel::Intensity => values.iter().map(|v| v.intensity).collect(),
    }
}

fn channel_values(cloud: &PointCloud, channel: SignalChannel) -> Vec<f64> {
    match channel {
        SignalChannel::Range => cloud
            .points()
            .iter()
            .map(spectreg_3d::linalg::norm3)
            .collect(),
        SignalChannel::Intensity => match cloud.intensities() {
            Some(intensities) => intensities.clone(),
            None => vec![1.0; cloud.len()],
        },
    }
}

pub(crate) fn transformed_cloud(
    cloud: &PointCloud,
    rotation: &[[f64; 3]; 3],
    translation: &[f64; 3],
) -> Result<PointCloud, CoreError> {
    let mut points = vec![[0.0; 3]; cloud.len()];
    transform_points3d(cloud.points(), rotation, translation, &mut points)?;
    Ok(PointCloud::new(points, cloud.intensities().cloned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = RegistrationConfig {
            n_workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            SphericalRegistration::new(config),
            Err(CoreError::InvalidWorkerCount)
        ));

        let config = RegistrationConfig {
            channels: vec![],
            ..Default::default()
        };
        assert!(matches!(
            SphericalRegistration::new(config),
            Err(CoreError::EmptyChannelList)
        ));
    }

    #[test]
    fn test_empty_clouds_yield_no_solution() -> Result<(), CoreError> {
        let config = RegistrationConfig {
            bandwidth: 4,
            n_voxels: 8,
            ..Default::default()
        };
        let mut registration = SphericalRegistration::new(config)?;
        let empty = PointCloud::new(vec![], None);
        let result = registration.register_point_cloud(&empty, &empty)?;
        assert!(!result.found_solution_for_rotation);
        assert!(!result.found_solution_for_translation);
        assert_eq!(result.rotation_confidence, 0.0);
        assert_eq!(result.translation_confidence, 0.0);
        Ok(())
    }

    #[test]
    fn test_statistics_publication() -> Result<(), CoreError> {
        let config = RegistrationConfig {
            bandwidth: 4,
            n_voxels: 8,
            ..Default::default()
        };
        let mut registration = SphericalRegistration::new(config)?;
        let empty = PointCloud::new(vec![], None);
        registration.register_point_cloud(&empty, &empty)?;

        let mut manager = StatisticsManager::new();
        registration.get_statistics(&mut manager);
        assert_eq!(manager.samples("low_pass_lower_bound"), Some(&[0.0][..]));
        assert_eq!(manager.samples("low_pass_upper_bound"), Some(&[1000.0][..]));
        assert!(manager.samples("rotation_seconds").is_some());
        Ok(())
    }
}
