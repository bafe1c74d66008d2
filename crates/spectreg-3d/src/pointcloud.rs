use glam::Vec3;

/// A point cloud with points and optional per-point intensities.
#[derive(Debug, Clone)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
    // Optional scalar attribute per point, e.g. a sensor return intensity.
    intensities: Option<Vec<f64>>,
}

impl PointCloud {
    /// Create a new point cloud from points and intensities (optional).
    pub fn new(points: Vec<[f64; 3]>, intensities: Option<Vec<f64>>) -> Self {
        Self {
            points,
            intensities,
        }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &Vec<[f64; 3]> {
        &self.points
    }

    /// Get as reference the intensities of the points in the point cloud.
    pub fn intensities(&self) -> Option<&Vec<f64>> {
        self.intensities.as_ref()
    }

    /// Convert a point from [f64; 3] to Vec3.
    fn point_to_vec3(point: &[f64; 3]) -> Vec3 {
        Vec3::new(point[0] as f32, point[1] as f32, point[2] as f32)
    }

    /// Get the minimum bound of the point cloud.
    pub fn get_min_bound(&self) -> Vec3 {
        if self.points.is_empty() {
            return Vec3::ZERO;
        }
        self.points()
            .iter()
            .map(|&point| Self::point_to_vec3(&point))
            .fold(Self::point_to_vec3(&self.points[0]), |a, b| a.min(b))
    }

    /// Get the maximum bound of the point cloud.
    pub fn get_max_bound(&self) -> Vec3 {
        if self.points.is_empty() {
            return Vec3::ZERO;
        }
        self.points()
            .iter()
            .map(|&point| Self::point_to_vec3(&point))
            .fold(Self::point_to_vec3(&self.points[0]), |a, b| a.max(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointcloud() {
        let pointcloud = PointCloud::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            Some(vec![0.5, 0.8]),
        );

        assert_eq!(pointcloud.len(), 2);
        assert_eq!(pointcloud.points().len(), 2);

        if let Some(intensities) = pointcloud.intensities() {
            assert_eq!(intensities.len(), 2);
        }

        if let Some(p1) = pointcloud.points().last() {
            assert_eq!(p1[0], 1.0);
            assert_eq!(p1[1], 0.0);
            assert_eq!(p1[2], 0.0);
        }
    }

    #[test]
    fn test_pointcloud_bounds() {
        let pointcloud = PointCloud::new(vec![[-1.0, 2.0, 0.5], [3.0, -4.0, 1.0]], None);
        let min = pointcloud.get_min_bound();
        let max = pointcloud.get_max_bound();
        assert_eq!(min, Vec3::new(-1.0, -4.0, 0.5));
        assert_eq!(max, Vec3::new(3.0, 2.0, 1.0));
    }
}
