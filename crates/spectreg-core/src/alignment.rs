use std::f64::consts::PI;

use spectreg_3d::transforms::euler_zyx_to_rotation_matrix;

use crate::error::CoreError;

/// The dominant peak of a correlation surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakEstimate {
    /// Flat index of the peak bin.
    pub index: usize,
    /// Surface value at the peak bin.
    pub value: f64,
    /// Signed sub-bin offset per axis, unwrapped from circular indexing.
    pub offsets: Vec<f64>,
}

/// Locate the dominant peak of a correlation surface of shape `dims`.
///
/// Returns `Ok(None)` for a flat surface — the "no distinguishable peak"
/// condition — rather than an error. The peak position is refined per axis
/// with a three-point parabolic fit over the circular neighbors, and offsets
/// are unwrapped to the signed range `(-dim/2, dim/2]`.
pub fn find_peak(surface: &[f64], dims: &[usize]) -> Result<Option<PeakEstimate>, CoreError> {
    let n: usize = dims.iter().product();
    if dims.is_empty() || n == 0 {
        return Err(CoreError::InvalidBinCount);
    }
    if surface.len() != n {
        return Err(CoreError::SizeMismatch(surface.len(), n));
    }

    let mut max_index = 0;
    let mut max_value = f64::NEG_INFINITY;
    let mut min_value = f64::INFINITY;
    for (i, &value) in surface.iter().enumerate() {
        if value > max_value {
            max_value = value;
            max_index = i;
        }
        if value < min_value {
            min_value = value;
        }
    }
    if !max_value.is_finite() || max_value - min_value <= f64::EPSILON {
        return Ok(None);
    }

    // unravel the flat peak index into per-axis coordinates
    let mut coords = vec![0usize; dims.len()];
    let mut rem = max_index;
    for (axis, &dim) in dims.iter().enumerate().rev() {
        coords[axis] = rem % dim;
        rem /= dim;
    }

    let mut offsets = Vec::with_capacity(dims.len());
    let mut stride = 1usize;
    let mut strides = vec![0usize; dims.len()];
    for (axis, &dim) in dims.iter().enumerate().rev() {
        strides[axis] = stride;
        stride *= dim;
    }
    for (axis, &dim) in dims.iter().enumerate() {
        let idx = coords[axis];
        let base = max_index - idx * strides[axis];
        let prev = base + ((idx + dim - 1) % dim) * strides[axis];
        let next = base + ((idx + 1) % dim) * strides[axis];
        let delta = parabolic_delta(surface[prev], max_value, surface[next]);

        let signed = if idx > dim / 2 {
            idx as f64 - dim as f64
        } else {
            idx as f64
        };
        offsets.push(signed + delta);
    }

    Ok(Some(PeakEstimate {
        index: max_index,
        value: max_value,
        offsets,
    }))
}

/// Sub-bin correction from a three-point parabola through the peak and its
/// two neighbors, clamped to half a bin.
fn parabolic_delta(prev: f64, peak: f64, next: f64) -> f64 {
    let denom = prev - 2.0 * peak + next;
    if denom.abs() < f64::EPSILON {
        return 0.0;
    }
    (0.5 * (prev - next) / denom).clamp(-0.5, 0.5)
}

/// Convert a peak of a spatial-domain correlation into a translation vector.
pub fn translation_from_peak(
    peak: &PeakEstimate,
    voxel_sizes: &[f64; 3],
) -> Result<[f64; 3], CoreError> {
    if peak.offsets.len() != 3 {
        return Err(CoreError::SizeMismatch(peak.offsets.len(), 3));
    }
    Ok([
        peak.offsets[0] * voxel_sizes[0],
        peak.offsets[1] * voxel_sizes[1],
        peak.offsets[2] * voxel_sizes[2],
    ])
}

/// Convert a peak of a spherical-grid correlation into a rotation matrix.
///
/// The azimuth offset maps to a yaw about Z (`pi / B` per cell), the
/// elevation offset to a pitch about Y (`pi / 2B` per cell); roll is not
/// observable from an equiangular grid shift. Composed as `Rz(yaw) * Ry(pitch)`.
pub fn rotation_from_peak(
    peak: &PeakEstimate,
    bandwidth: usize,
) -> Result<[[f64; 3]; 3], CoreError> {
    if peak.offsets.len() != 2 {
        return Err(CoreError::SizeMismatch(peak.offsets.len(), 2));
    }
    if bandwidth == 0 {
        return Err(CoreError::InvalidBandwidth);
    }
    let pitch = peak.offsets[0] * PI / (2 * bandwidth) as f64;
    let yaw = peak.offsets[1] * PI / bandwidth as f64;
    Ok(euler_zyx_to_rotation_matrix(yaw, pitch, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_surface_has_no_peak() -> Result<(), CoreError> {
        let surface = vec![1.0; 16];
        assert_eq!(find_peak(&surface, &[16])?, None);
        Ok(())
    }

    #[test]
    fn test_peak_in_first_half_is_positive_offset() -> Result<(), CoreError> {
        let mut surface = vec![0.0; 16];
        surface[3] = 5.0;
        let peak = find_peak(&surface, &[16])?.unwrap();
        assert_eq!(peak.index, 3);
        assert_relative_eq!(peak.offsets[0], 3.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_peak_in_second_half_wraps_negative() -> Result<(), CoreError> {
        let mut surface = vec![0.0; 16];
        surface[14] = 5.0;
        let peak = find_peak(&surface, &[16])?.unwrap();
        assert_relative_eq!(peak.offsets[0], -2.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_parabolic_refinement_pulls_toward_larger_neighbor() -> Result<(), CoreError> {
        let mut surface = vec![0.0; 16];
        surface[4] = 1.0;
        surface[5] = 4.0;
        surface[6] = 3.0;
        let peak = find_peak(&surface, &[16])?.unwrap();
        assert_eq!(peak.index, 5);
        assert!(peak.offsets[0] > 5.0 && peak.offsets[0] < 5.5);
        Ok(())
    }

    #[test]
    fn test_multi_dimensional_offsets() -> Result<(), CoreError> {
        let dims = [4, 4, 4];
        let mut surface = vec![0.0; 64];
        // peak at (3, 1, 2): x wraps to -1, y and z stay positive
        surface[(3 * 4 + 1) * 4 + 2] = 2.0;
        let peak = find_peak(&surface, &dims)?.unwrap();
        assert_relative_eq!(peak.offsets[0], -1.0, epsilon = 1e-9);
        assert_relative_eq!(peak.offsets[1], 1.0, epsilon = 1e-9);
        assert_relative_eq!(peak.offsets[2], 2.0, epsilon = 1e-9);

        let translation = translation_from_peak(&peak, &[0.5, 1.0, 2.0])?;
        assert_relative_eq!(translation[0], -0.5, epsilon = 1e-9);
        assert_relative_eq!(translation[1], 1.0, epsilon = 1e-9);
        assert_relative_eq!(translation[2], 4.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_rotation_from_azimuth_shift() -> Result<(), CoreError> {
        let bandwidth = 8;
        let peak = PeakEstimate {
            index: 0,
            value: 1.0,
            offsets: vec![0.0, 4.0],
        };
        let rotation = rotation_from_peak(&peak, bandwidth)?;
        // 4 azimuth cells at pi/8 per cell is a yaw of pi/2
        let expected = euler_zyx_to_rotation_matrix(PI / 2.0, 0.0, 0.0);
        for (row_a, row_b) in rotation.iter().zip(expected.iter()) {
            for (a, b) in row_a.iter().zip(row_b.iter()) {
                assert_relative_eq!(a, b, epsilon = 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let res = find_peak(&[0.0; 8], &[4, 4]);
        assert_eq!(res.err(), Some(CoreError::SizeMismatch(8, 16)));
    }
}
