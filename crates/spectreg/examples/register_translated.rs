use rand::{rngs::StdRng, Rng, SeedableRng};

use spectreg::p3d::metrics::hausdorff_distance;
use spectreg::p3d::pointcloud::PointCloud;
use spectreg::reg::registration::mock::MockTranslated;
use spectreg::reg::registration::{
    CloudRegistrator, RegistrationConfig, SphericalRegistration,
};
use spectreg::reg::stats::StatisticsManager;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(0);
    let points: Vec<[f64; 3]> = (0..800)
        .map(|_| {
            [
                rng.random_range(0.0..25.0),
                rng.random_range(0.0..25.0),
                rng.random_range(0.0..25.0),
            ]
        })
        .collect();
    let intensities: Vec<f64> = (0..points.len()).map(|_| rng.random_range(0.0..1.0)).collect();
    let cloud = PointCloud::new(points, Some(intensities));

    let config = RegistrationConfig {
        low_pass_upper_bound: usize::MAX,
        ..Default::default()
    };
    let inner = SphericalRegistration::new(config)?;
    let mut registration = MockTranslated::new(inner);
    registration.set_translation(5.0, -3.0, 8.0);

    let result = registration.register_point_cloud(&cloud, &cloud)?;
    println!(
        "estimated translation: [{:.2}, {:.2}, {:.2}] (confidence {:.2})",
        result.translation[0], result.translation[1], result.translation[2],
        result.translation_confidence
    );
    println!(
        "residual cloud distance: {:.3}",
        hausdorff_distance(cloud.points(), result.registered_cloud.points())?
    );

    let mut stats = StatisticsManager::new();
    registration.inner().get_statistics(&mut stats);
    if let Some(seconds) = stats.mean("translation_seconds") {
        println!("translation stage took {seconds:.3}s");
    }

    Ok(())
}
