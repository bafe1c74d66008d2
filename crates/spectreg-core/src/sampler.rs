use std::f64::consts::{PI, TAU};

use spectreg_3d::pointcloud::PointCloud;

use crate::error::CoreError;

/// Accumulated function values for one spherical grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FunctionValue {
    /// Average range (distance to the origin) of the points in the cell.
    pub range: f64,
    /// Average intensity of the points in the cell.
    pub intensity: f64,
}

/// Equiangular direction grid over the unit sphere.
///
/// A bandwidth `B` produces a `2B x 2B` grid with colatitudes
/// `theta_j = pi * (2j + 1) / (4B)` and azimuths `phi_k = pi * k / B`,
/// stored row-major with the colatitude index slowest.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalGrid {
    bandwidth: usize,
    angles: Vec<[f64; 2]>,
    cartesian: Vec<[f64; 3]>,
}

impl SphericalGrid {
    fn new(bandwidth: usize) -> Self {
        let side = 2 * bandwidth;
        let mut angles = Vec::with_capacity(side * side);
        for j in 0..side {
            let theta = PI * (2 * j + 1) as f64 / (4 * bandwidth) as f64;
            for k in 0..side {
                let phi = PI * k as f64 / bandwidth as f64;
                angles.push([theta, phi]);
            }
        }
        let cartesian = angles
            .iter()
            .map(|&[theta, phi]| {
                [
                    theta.sin() * phi.cos(),
                    theta.sin() * phi.sin(),
                    theta.cos(),
                ]
            })
            .collect();
        Self {
            bandwidth,
            angles,
            cartesian,
        }
    }

    /// The bandwidth the grid was built for.
    pub fn bandwidth(&self) -> usize {
        self.bandwidth
    }

    /// Number of cells in the grid, `4 * B^2`.
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    /// Check if the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// The `(colatitude, azimuth)` angle pairs in grid order.
    pub fn angles(&self) -> &[[f64; 2]] {
        &self.angles
    }

    /// The unit direction vectors in grid order.
    pub fn cartesian(&self) -> &[[f64; 3]] {
        &self.cartesian
    }
}

/// Projects point clouds onto a cached equiangular spherical grid.
#[derive(Debug, Default)]
pub struct SphericalSampler {
    grid: Option<SphericalGrid>,
}

impl SphericalSampler {
    /// Create a sampler with no cached grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the direction grid for `bandwidth`, reusing the cached grid when
    /// the bandwidth is unchanged.
    pub fn initialize(&mut self, bandwidth: usize) -> Result<(), CoreError> {
        if bandwidth == 0 {
            return Err(CoreError::InvalidBandwidth);
        }
        if self
            .grid
            .as_ref()
            .is_some_and(|grid| grid.bandwidth() == bandwidth)
        {
            return Ok(());
        }
        log::debug!("building spherical grid for bandwidth {}", bandwidth);
        self.grid = Some(SphericalGrid::new(bandwidth));
        Ok(())
    }

    /// The bandwidth of the cached grid, `None` before the first initialize.
    pub fn initialized_bandwidth(&self) -> Option<usize> {
        self.grid.as_ref().map(|grid| grid.bandwidth())
    }

    /// The cached grid, if initialized.
    pub fn grid(&self) -> Option<&SphericalGrid> {
        self.grid.as_ref()
    }

    /// Project every point of `cloud` onto its angularly nearest grid cell
    /// and accumulate per-cell average range and intensity into `out`.
    ///
    /// Points without an intensity attribute contribute 1.0, so the intensity
    /// channel degrades to point density. An empty cloud produces an all-zero
    /// grid. The cached grid is never mutated by sampling.
    pub fn sample_uniformly(
        &self,
        cloud: &PointCloud,
        out: &mut Vec<FunctionValue>,
    ) -> Result<(), CoreError> {
        let grid = self.grid.as_ref().ok_or(CoreError::SamplerNotInitialized)?;
        let bandwidth = grid.bandwidth();
        let side = 2 * bandwidth;
        let n_cells = grid.len();

        out.clear();
        out.resize(n_cells, FunctionValue::default());
        let mut counts = vec![0u32; n_cells];

        for (i, point) in cloud.points().iter().enumerate() {
            let range = spectreg_3d::linalg::norm3(point);
            if range <= f64::EPSILON {
                continue;
            }
            let theta = (point[2] / range).clamp(-1.0, 1.0).acos();
            let mut phi = point[1].atan2(point[0]);
            if phi < 0.0 {
                phi += TAU;
            }

            // nearest cell under the equiangular parametrization
            let j = ((theta * (2 * bandwidth) as f64 / PI - 0.5).round() as isize)
                .clamp(0, side as isize - 1) as usize;
            let k = (phi * bandwidth as f64 / PI).round() as usize % side;
            let cell = j * side + k;

            let intensity = cloud.intensities().map_or(1.0, |values| values[i]);
            out[cell].range += range;
            out[cell].intensity += intensity;
            counts[cell] += 1;
        }

        for (value, &count) in out.iter_mut().zip(counts.iter()) {
            if count > 0 {
                value.range /= count as f64;
                value.intensity /= count as f64;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_size_is_4b_squared() {
        let grid = SphericalGrid::new(4);
        assert_eq!(grid.len(), 64);
        assert_eq!(grid.cartesian().len(), 64);
    }

    #[test]
    fn test_grid_directions_are_unit_length() {
        let grid = SphericalGrid::new(3);
        for dir in grid.cartesian() {
            let norm = (dir[0] * dir[0] + dir[1] * dir[1] + dir[2] * dir[2]).sqrt();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_initialize_is_idempotent() -> Result<(), CoreError> {
        let mut sampler = SphericalSampler::new();
        sampler.initialize(8)?;
        let first = sampler.grid().unwrap().clone();
        sampler.initialize(8)?;
        assert_eq!(sampler.grid().unwrap(), &first);
        assert_eq!(sampler.initialized_bandwidth(), Some(8));
        Ok(())
    }

    #[test]
    fn test_initialize_rebuilds_on_new_bandwidth() -> Result<(), CoreError> {
        let mut sampler = SphericalSampler::new();
        sampler.initialize(8)?;
        sampler.initialize(4)?;
        assert_eq!(sampler.initialized_bandwidth(), Some(4));
        assert_eq!(sampler.grid().unwrap().len(), 64);
        Ok(())
    }

    #[test]
    fn test_uninitialized_sampler_rejects_sampling() {
        let sampler = SphericalSampler::new();
        assert_eq!(sampler.initialized_bandwidth(), None);
        let mut out = Vec::new();
        let res = sampler.sample_uniformly(&PointCloud::new(vec![], None), &mut out);
        assert_eq!(res, Err(CoreError::SamplerNotInitialized));
    }

    #[test]
    fn test_empty_cloud_samples_to_zeros() -> Result<(), CoreError> {
        let mut sampler = SphericalSampler::new();
        sampler.initialize(4)?;
        let mut out = Vec::new();
        sampler.sample_uniformly(&PointCloud::new(vec![], None), &mut out)?;
        assert_eq!(out.len(), 64);
        assert!(out.iter().all(|v| v.range == 0.0 && v.intensity == 0.0));
        Ok(())
    }

    #[test]
    fn test_single_point_accumulates_range() -> Result<(), CoreError> {
        let mut sampler = SphericalSampler::new();
        sampler.initialize(4)?;
        let cloud = PointCloud::new(vec![[3.0, 0.0, 0.0]], Some(vec![0.25]));
        let mut out = Vec::new();
        sampler.sample_uniformly(&cloud, &mut out)?;
        let occupied: Vec<&FunctionValue> = out.iter().filter(|v| v.range > 0.0).collect();
        assert_eq!(occupied.len(), 1);
        assert_relative_eq!(occupied[0].range, 3.0, epsilon = 1e-12);
        assert_relative_eq!(occupied[0].intensity, 0.25, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_yaw_rotation_shifts_azimuth_cells() -> Result<(), CoreError> {
        let bandwidth = 8;
        let mut sampler = SphericalSampler::new();
        sampler.initialize(bandwidth)?;

        // a point on the equator, then the same point rotated about Z by two
        // azimuth cells
        let cell = PI / bandwidth as f64;
        let cloud = PointCloud::new(vec![[2.0, 0.0, 0.0]], None);
        let rotated = PointCloud::new(
            vec![[2.0 * (2.0 * cell).cos(), 2.0 * (2.0 * cell).sin(), 0.0]],
            None,
        );

        let mut f = Vec::new();
        let mut g = Vec::new();
        sampler.sample_uniformly(&cloud, &mut f)?;
        sampler.sample_uniformly(&rotated, &mut g)?;

        let side = 2 * bandwidth;
        let f_cell = f.iter().position(|v| v.range > 0.0).unwrap();
        let g_cell = g.iter().position(|v| v.range > 0.0).unwrap();
        assert_eq!(f_cell / side, g_cell / side);
        assert_eq!((f_cell % side + 2) % side, g_cell % side);
        Ok(())
    }
}
