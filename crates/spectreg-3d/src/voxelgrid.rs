use crate::error::CloudError;

/// Axis-aligned bounding region used to rasterize point clouds into a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridExtent {
    /// Minimum corner of the region.
    pub min: [f64; 3],
    /// Maximum corner of the region.
    pub max: [f64; 3],
}

impl GridExtent {
    /// Compute the extent covering the union of two point sets.
    ///
    /// Returns `None` if both sets are empty.
    pub fn from_point_sets(a: &[[f64; 3]], b: &[[f64; 3]]) -> Option<Self> {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for p in a.iter().chain(b.iter()) {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        if min[0] > max[0] {
            return None;
        }
        Some(Self { min, max })
    }

    /// Grow the extent by a fraction of its size on each side.
    pub fn padded(&self, fraction: f64) -> Self {
        let mut out = *self;
        for i in 0..3 {
            let pad = (self.max[i] - self.min[i]) * fraction;
            out.min[i] -= pad;
            out.max[i] += pad;
        }
        out
    }

    /// Edge length of one voxel per axis at the given grid resolution.
    pub fn voxel_sizes(&self, resolution: usize) -> [f64; 3] {
        let mut sizes = [0.0; 3];
        for i in 0..3 {
            sizes[i] = (self.max[i] - self.min[i]) / resolution as f64;
        }
        sizes
    }
}

/// Rasterize a point cloud into a dense cubic voxel grid of per-voxel averages.
///
/// Each point contributes its scalar `value` to the voxel containing it; the
/// output holds the average of the contributions per voxel, zero for empty
/// voxels. Points outside the extent are clamped to the boundary voxels. The
/// grid is laid out row-major as `(x, y, z)` with `x` slowest.
///
/// # Arguments
///
/// * `points` - The points to rasterize.
/// * `values` - One scalar per point.
/// * `extent` - The region covered by the grid.
/// * `resolution` - Number of voxels per axis.
///
/// # Returns
///
/// A dense grid of `resolution^3` averaged values.
pub fn rasterize_average(
    points: &[[f64; 3]],
    values: &[f64],
    extent: &GridExtent,
    resolution: usize,
) -> Result<Vec<f64>, CloudError> {
    if resolution == 0 {
        return Err(CloudError::InvalidResolution);
    }
    if points.len() != values.len() {
        return Err(CloudError::SizeMismatch(points.len(), values.len()));
    }

    let sizes = extent.voxel_sizes(resolution);
    let n = resolution * resolution * resolution;
    let mut sums = vec![0.0f64; n];
    let mut counts = vec![0u32; n];

    for (p, &value) in points.iter().zip(values.iter()) {
        let mut idx = [0usize; 3];
        for i in 0..3 {
            idx[i] = if sizes[i] > 0.0 {
                (((p[i] - extent.min[i]) / sizes[i]).floor() as isize)
                    .clamp(0, resolution as isize - 1) as usize
            } else {
                0
            };
        }
        let flat = (idx[0] * resolution + idx[1]) * resolution + idx[2];
        sums[flat] += value;
        counts[flat] += 1;
    }

    for (sum, &count) in sums.iter_mut().zip(counts.iter()) {
        if count > 0 {
            *sum /= count as f64;
        }
    }

    Ok(sums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_extent_union() {
        let a = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
        let b = vec![[-1.0, 2.0, 0.5]];
        let extent = GridExtent::from_point_sets(&a, &b).unwrap();
        assert_eq!(extent.min, [-1.0, 0.0, 0.0]);
        assert_eq!(extent.max, [1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_extent_empty() {
        assert!(GridExtent::from_point_sets(&[], &[]).is_none());
    }

    #[test]
    fn test_rasterize_average_single_voxel() -> Result<(), CloudError> {
        let extent = GridExtent {
            min: [0.0; 3],
            max: [2.0; 3],
        };
        // both points land in voxel (0, 0, 0) of a 2x2x2 grid
        let points = vec![[0.1, 0.1, 0.1], [0.9, 0.9, 0.9]];
        let values = vec![2.0, 4.0];
        let grid = rasterize_average(&points, &values, &extent, 2)?;
        assert_eq!(grid.len(), 8);
        assert_relative_eq!(grid[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(grid.iter().sum::<f64>(), 3.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_rasterize_clamps_outliers() -> Result<(), CloudError> {
        let extent = GridExtent {
            min: [0.0; 3],
            max: [1.0; 3],
        };
        let points = vec![[5.0, 5.0, 5.0]];
        let values = vec![1.0];
        let grid = rasterize_average(&points, &values, &extent, 2)?;
        // clamped into the last voxel
        assert_relative_eq!(grid[7], 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_rasterize_size_mismatch() {
        let extent = GridExtent {
            min: [0.0; 3],
            max: [1.0; 3],
        };
        let res = rasterize_average(&[[0.0; 3]], &[], &extent, 2);
        assert_eq!(res, Err(CloudError::SizeMismatch(1, 0)));
    }
}
