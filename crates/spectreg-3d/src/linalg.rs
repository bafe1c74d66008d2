use crate::error::CloudError;

/// Transform a set of points using a rotation and translation.
///
/// # Arguments
///
/// * `src_points` - A set of points to be transformed.
/// * `dst_r_src` - A rotation matrix.
/// * `dst_t_src` - A translation vector.
/// * `dst_points` - A pre-allocated buffer to store the transformed points.
///
/// PRECONDITION: dst_points is pre-allocated with the same size as source.
///
/// Example:
///
/// ```
/// use spectreg_3d::linalg::transform_points3d;
///
/// let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let translation = [0.0, 0.0, 0.0];
/// let mut dst_points = vec![[0.0; 3]; src_points.len()];
/// transform_points3d(&src_points, &rotation, &translation, &mut dst_points).unwrap();
/// ```
pub fn transform_points3d(
    src_points: &[[f64; 3]],
    dst_r_src: &[[f64; 3]; 3],
    dst_t_src: &[f64; 3],
    dst_points: &mut [[f64; 3]],
) -> Result<(), CloudError> {
    if src_points.len() != dst_points.len() {
        return Err(CloudError::SizeMismatch(
            src_points.len(),
            dst_points.len(),
        ));
    }

    for (dst, src) in dst_points.iter_mut().zip(src_points.iter()) {
        for i in 0..3 {
            dst[i] = dst_r_src[i][0] * src[0]
                + dst_r_src[i][1] * src[1]
                + dst_r_src[i][2] * src[2]
                + dst_t_src[i];
        }
    }

    Ok(())
}

/// Multiply two 3x3 matrices storing the product in a pre-allocated output.
pub fn matmul33(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3], out: &mut [[f64; 3]; 3]) {
    for (i, row) in out.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
}

/// Compute the Euclidean norm of a 3D point.
#[inline]
pub fn norm3(p: &[f64; 3]) -> f64 {
    (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_points3d_identity() -> Result<(), CloudError> {
        let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
        let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let translation = [0.0, 0.0, 0.0];
        let mut dst_points = vec![[0.0; 3]; src_points.len()];
        transform_points3d(&src_points, &rotation, &translation, &mut dst_points)?;

        assert_eq!(dst_points, src_points);
        Ok(())
    }

    #[test]
    fn test_transform_points3d_translation() -> Result<(), CloudError> {
        let src_points = vec![[1.0, 0.0, 0.0]];
        let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let translation = [0.5, -1.0, 2.0];
        let mut dst_points = vec![[0.0; 3]; 1];
        transform_points3d(&src_points, &rotation, &translation, &mut dst_points)?;

        assert_relative_eq!(dst_points[0][0], 1.5, epsilon = 1e-12);
        assert_relative_eq!(dst_points[0][1], -1.0, epsilon = 1e-12);
        assert_relative_eq!(dst_points[0][2], 2.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_transform_points3d_size_mismatch() {
        let src_points = vec![[1.0, 0.0, 0.0]];
        let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let mut dst_points = vec![[0.0; 3]; 2];
        let res = transform_points3d(&src_points, &rotation, &[0.0; 3], &mut dst_points);
        assert_eq!(res, Err(CloudError::SizeMismatch(1, 2)));
    }

    #[test]
    fn test_matmul33_identity() {
        let a = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let eye = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let mut out = [[0.0; 3]; 3];
        matmul33(&a, &eye, &mut out);
        assert_eq!(out, a);
    }
}
