//! Camera placement for cliff scenes: look at the face from the side of its
//! long horizontal axis where the surrounding ground is lower.

use coordinate_transformer::ViewerTransformer;
use pcd_core::{config::CameraParams, CameraPlacement, PointSet, SceneError};
use pcd_spatial::principal_axes_2d;

use crate::stats;

const MIN_SIDES_POINTS: usize = 3;

/// A camera plan in native coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct CliffCameraPlan {
    /// Unit horizontal direction from the cliff centroid toward the camera.
    pub view_direction: [f64; 2],
    pub distance: f64,
    pub native_position: [f64; 3],
}

pub fn plan_cliff_camera(
    sides: &PointSet,
    ground: &PointSet,
    params: &CameraParams,
) -> Result<CliffCameraPlan, SceneError> {
    if sides.len() < MIN_SIDES_POINTS {
        return Err(SceneError::insufficient(
            "cliff camera",
            format!("{} sides points, need {}", sides.len(), MIN_SIDES_POINTS),
        ));
    }

    let axes = principal_axes_2d(&sides.xy_coords())?;
    let view_direction = viewing_side(axes.centroid, axes.minor, ground);

    let bounds = sides
        .bounding_volume()
        .ok_or_else(|| SceneError::insufficient("cliff camera", "sides has no bounds"))?;
    let distance = camera_distance(bounds.max_extent(), params)?;

    let mean_z = stats::mean(&sides.iter().map(|p| p.z).collect::<Vec<_>>())
        .ok_or_else(|| SceneError::insufficient("cliff camera", "sides is empty"))?;
    let native_position = [
        axes.centroid[0] + view_direction[0] * distance,
        axes.centroid[1] + view_direction[1] * distance,
        mean_z + bounds.extent()[2] * params.elevation_factor,
    ];
    if native_position.iter().any(|c| !c.is_finite()) {
        return Err(SceneError::computation(
            "cliff camera",
            "camera position is not finite",
        ));
    }

    log::info!(
        "cliff camera: distance={:.1}, extent={:.1}",
        distance,
        bounds.max_extent()
    );
    Ok(CliffCameraPlan {
        view_direction,
        distance,
        native_position,
    })
}

/// Plans the camera and maps it into the viewer frame.
pub fn cliff_camera(
    sides: &PointSet,
    ground: &PointSet,
    params: &CameraParams,
    transformer: &ViewerTransformer,
) -> Result<CameraPlacement, SceneError> {
    let plan = plan_cliff_camera(sides, ground, params)?;
    Ok(CameraPlacement {
        position: transformer.forward(plan.native_position),
        distance: plan.distance,
    })
}

/// `+perp` or `-perp`, whichever half-plane has the lower median ground
/// elevation. Side A holds projections strictly greater than zero.
fn viewing_side(centroid: [f64; 2], perp: [f64; 2], ground: &PointSet) -> [f64; 2] {
    let negated = [-perp[0], -perp[1]];
    if ground.is_empty() {
        log::debug!("no ground context around the cliff, using the positive minor axis");
        return perp;
    }

    let (mut side_a, mut side_b) = (Vec::new(), Vec::new());
    for point in ground.iter() {
        let projection = (point.x - centroid[0]) * perp[0] + (point.y - centroid[1]) * perp[1];
        if projection > 0.0 {
            side_a.push(point.z);
        } else {
            side_b.push(point.z);
        }
    }

    match (stats::median(&side_a), stats::median(&side_b)) {
        (Some(median_a), Some(median_b)) => {
            if median_a < median_b {
                perp
            } else {
                negated
            }
        }
        _ => {
            if side_a.len() > side_b.len() {
                perp
            } else {
                negated
            }
        }
    }
}

fn camera_distance(max_extent: f64, params: &CameraParams) -> Result<f64, SceneError> {
    let half_fov = params.fov_degrees.to_radians() / 2.0;
    if !(half_fov > 0.0 && half_fov < std::f64::consts::FRAC_PI_2) {
        return Err(SceneError::degenerate(
            "cliff camera",
            format!("field of view {} degrees", params.fov_degrees),
        ));
    }
    let required = (max_extent / 2.0) / half_fov.tan();
    let distance = (required * params.padding).max(params.min_distance);
    if !distance.is_finite() {
        return Err(SceneError::computation(
            "cliff camera",
            "camera distance is not finite",
        ));
    }
    Ok(distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pcd_core::Point4D;

    /// A vertical face 40 long in x, 0.2 thick in y, 10 high.
    fn cliff_face() -> PointSet {
        (0..=40)
            .flat_map(|i| {
                (0..=10).map(move |k| {
                    let y = if (i + k) % 2 == 0 { 0.1 } else { -0.1 };
                    Point4D::new(i as f64, y, 100.0 + k as f64, 1.0)
                })
            })
            .collect()
    }

    fn ground_rows(y: f64, z: f64) -> Vec<Point4D> {
        (0..10)
            .map(|i| Point4D::new(i as f64 * 4.0, y, z, 1.0))
            .collect()
    }

    #[test]
    fn camera_faces_the_lower_ground() {
        let mut ground = ground_rows(-8.0, 95.0);
        ground.extend(ground_rows(8.0, 110.0));
        let plan =
            plan_cliff_camera(&cliff_face(), &PointSet::new(ground), &CameraParams::default())
                .unwrap();

        assert_abs_diff_eq!(plan.view_direction[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(plan.view_direction[1], -1.0, epsilon = 1e-6);
        assert!(plan.native_position[1] < 0.0);
    }

    #[test]
    fn one_sided_ground_picks_the_populated_side() {
        let ground = PointSet::new(ground_rows(-8.0, 95.0));
        let plan = plan_cliff_camera(&cliff_face(), &ground, &CameraParams::default()).unwrap();
        assert_abs_diff_eq!(plan.view_direction[1], -1.0, epsilon = 1e-6);

        let ground = PointSet::new(ground_rows(8.0, 95.0));
        let plan = plan_cliff_camera(&cliff_face(), &ground, &CameraParams::default()).unwrap();
        assert_abs_diff_eq!(plan.view_direction[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn no_ground_uses_the_positive_minor_axis() {
        let plan =
            plan_cliff_camera(&cliff_face(), &PointSet::default(), &CameraParams::default())
                .unwrap();
        assert_abs_diff_eq!(plan.view_direction[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn distance_fits_the_extent_with_padding() {
        let params = CameraParams::default();
        let plan = plan_cliff_camera(&cliff_face(), &PointSet::default(), &params).unwrap();
        // extent 40 at 60 degrees: 20 / tan(30deg) * 1.5
        let expected = 20.0 / 30f64.to_radians().tan() * 1.5;
        assert_abs_diff_eq!(plan.distance, expected, epsilon = 1e-9);
        // mean z 105 plus 30% of the 10 high face
        assert_abs_diff_eq!(plan.native_position[2], 108.0, epsilon = 1e-9);
    }

    #[test]
    fn small_cliffs_use_the_distance_floor() {
        let sides = PointSet::new(vec![
            Point4D::new(0.0, 0.0, 0.0, 1.0),
            Point4D::new(1.0, 0.1, 1.0, 1.0),
            Point4D::new(2.0, -0.1, 0.5, 1.0),
        ]);
        let plan = plan_cliff_camera(&sides, &PointSet::default(), &CameraParams::default()).unwrap();
        assert_eq!(plan.distance, 15.0);
    }

    #[test]
    fn too_few_sides_points_are_insufficient() {
        let sides = PointSet::new(vec![Point4D::new(0.0, 0.0, 0.0, 1.0); 2]);
        assert!(matches!(
            plan_cliff_camera(&sides, &PointSet::default(), &CameraParams::default()),
            Err(SceneError::InsufficientData { .. })
        ));
    }

    #[test]
    fn coincident_sides_are_degenerate() {
        let sides = PointSet::new(vec![Point4D::new(3.0, 3.0, 0.0, 1.0); 5]);
        assert!(matches!(
            plan_cliff_camera(&sides, &PointSet::default(), &CameraParams::default()),
            Err(SceneError::NumericDegeneracy { .. })
        ));
    }

    #[test]
    fn invalid_field_of_view_is_rejected() {
        let params = CameraParams {
            fov_degrees: 0.0,
            ..CameraParams::default()
        };
        assert!(plan_cliff_camera(&cliff_face(), &PointSet::default(), &params).is_err());
    }

    #[test]
    fn placement_is_in_the_viewer_frame() {
        let transformer = ViewerTransformer::new([20.0, 0.0, 100.0]).unwrap();
        let ground = PointSet::new(ground_rows(-8.0, 95.0));
        let params = CameraParams::default();
        let placement = cliff_camera(&cliff_face(), &ground, &params, &transformer).unwrap();
        let plan = plan_cliff_camera(&cliff_face(), &ground, &params).unwrap();

        assert_eq!(placement.position, transformer.forward(plan.native_position));
        // a camera south of the cliff sits at positive viewer depth
        assert!(placement.position[2] > 0.0);
    }
}
