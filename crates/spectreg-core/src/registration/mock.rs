use spectreg_3d::pointcloud::PointCloud;
use spectreg_3d::transforms::euler_zyx_to_rotation_matrix;

use crate::error::CoreError;

use super::{transformed_cloud, CloudRegistrator, RegistrationResult, SphericalRegistration};

/// Registrator that rotates the current cloud by a known synthetic rotation
/// before estimating, exercising only the rotation stage of the pipeline.
pub struct MockRotated {
    inner: SphericalRegistration,
    yaw: f64,
    pitch: f64,
    roll: f64,
}

impl MockRotated {
    /// Wrap a production pipeline with an identity perturbation.
    pub fn new(inner: SphericalRegistration) -> Self {
        Self {
            inner,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
        }
    }

    /// Set the synthetic ZYX euler rotation applied to the current cloud.
    pub fn set_rotation(&mut self, yaw: f64, pitch: f64, roll: f64) {
        self.yaw = yaw;
        self.pitch = pitch;
        self.roll = roll;
    }

    /// The wrapped production pipeline.
    pub fn inner(&self) -> &SphericalRegistration {
        &self.inner
    }
}

impl CloudRegistrator for MockRotated {
    fn register_point_cloud(
        &mut self,
        prev: &PointCloud,
        cur: &PointCloud,
    ) -> Result<RegistrationResult, CoreError> {
        let rotation = euler_zyx_to_rotation_matrix(self.yaw, self.pitch, self.roll);
        let perturbed = transformed_cloud(cur, &rotation, &[0.0; 3])?;
        self.inner.estimate_rotation(prev, &perturbed)
    }
}

/// Registrator that translates the current cloud by a known synthetic offset
/// before estimating, exercising only the translation stage of the pipeline.
pub struct MockTranslated {
    inner: SphericalRegistration,
    offset: [f64; 3],
}

impl MockTranslated {
    /// Wrap a production pipeline with a zero perturbation.
    pub fn new(inner: SphericalRegistration) -> Self {
        Self {
            inner,
            offset: [0.0; 3],
        }
    }

    /// Set the synthetic translation applied to the current cloud.
    pub fn set_translation(&mut self, x: f64, y: f64, z: f64) {
        self.offset = [x, y, z];
    }

    /// The wrapped production pipeline.
    pub fn inner(&self) -> &SphericalRegistration {
        &self.inner
    }
}

impl CloudRegistrator for MockTranslated {
    fn register_point_cloud(
        &mut self,
        prev: &PointCloud,
        cur: &PointCloud,
    ) -> Result<RegistrationResult, CoreError> {
        const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let perturbed = transformed_cloud(cur, &IDENTITY, &self.offset)?;
        self.inner.estimate_translation(prev, &perturbed)
    }
}
