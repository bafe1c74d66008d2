use kiddo::immutable::float::kdtree::ImmutableKdTree;

use crate::error::CloudError;

/// Compute the symmetric nearest-point (Hausdorff) distance between two clouds.
///
/// For each point of one cloud the distance to its nearest neighbor in the
/// other cloud is taken; the metric is the maximum of these distances over
/// both directions.
///
/// # Arguments
///
/// * `cloud_a` - A set of points.
/// * `cloud_b` - Another set of points.
///
/// # Returns
///
/// The Hausdorff distance between the two clouds.
pub fn hausdorff_distance(cloud_a: &[[f64; 3]], cloud_b: &[[f64; 3]]) -> Result<f64, CloudError> {
    if cloud_a.is_empty() || cloud_b.is_empty() {
        return Err(CloudError::EmptyPointCloud);
    }

    let tree_a: ImmutableKdTree<f64, u32, 3, 32> = ImmutableKdTree::new_from_slice(cloud_a);
    let tree_b: ImmutableKdTree<f64, u32, 3, 32> = ImmutableKdTree::new_from_slice(cloud_b);

    let d_ab = cloud_a
        .iter()
        .map(|p| tree_b.nearest_one::<kiddo::SquaredEuclidean>(p).distance)
        .fold(0.0f64, f64::max);
    let d_ba = cloud_b
        .iter()
        .map(|p| tree_a.nearest_one::<kiddo::SquaredEuclidean>(p).distance)
        .fold(0.0f64, f64::max);

    Ok(d_ab.max(d_ba).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hausdorff_identical_clouds() -> Result<(), CloudError> {
        let cloud = vec![[0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [-1.0, 0.5, 2.0]];
        let dist = hausdorff_distance(&cloud, &cloud)?;
        assert_relative_eq!(dist, 0.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_hausdorff_shifted_cloud() -> Result<(), CloudError> {
        let cloud_a = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let cloud_b = vec![[0.0, 0.0, 2.0], [1.0, 0.0, 2.0]];
        let dist = hausdorff_distance(&cloud_a, &cloud_b)?;
        assert_relative_eq!(dist, 2.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_hausdorff_empty_cloud() {
        let cloud = vec![[0.0, 0.0, 0.0]];
        let res = hausdorff_distance(&cloud, &[]);
        assert_eq!(res, Err(CloudError::EmptyPointCloud));
    }
}
