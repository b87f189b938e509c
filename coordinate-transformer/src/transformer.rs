use pcd_core::{Point4D, PointSet};

use crate::error::TransformError;

/// Maps native scene coordinates (x east, y north, z up) into the viewer
/// frame (y up, depth along negated north), relative to a scene center:
///
/// `(x, y, z) -> (x - cx, z - cz, -(y - cy))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerTransformer {
    center: [f64; 3],
}

impl ViewerTransformer {
    pub fn new(center: [f64; 3]) -> Result<Self, TransformError> {
        if center.iter().any(|c| !c.is_finite()) {
            return Err(TransformError::NonFiniteCenter(center));
        }
        Ok(Self { center })
    }

    pub fn center(&self) -> [f64; 3] {
        self.center
    }

    pub fn forward(&self, native: [f64; 3]) -> [f64; 3] {
        let [cx, cy, cz] = self.center;
        let [x, y, z] = native;
        [x - cx, z - cz, -(y - cy)]
    }

    pub fn inverse(&self, viewer: [f64; 3]) -> [f64; 3] {
        let [cx, cy, cz] = self.center;
        let [vx, vy, vz] = viewer;
        [vx + cx, cy - vz, vy + cz]
    }

    pub fn transform_point(&self, point: &Point4D) -> [f64; 3] {
        self.forward(point.xyz())
    }

    /// Flattened `[x, y, z, x, y, z, ...]` viewer positions, in input order.
    pub fn transform_points(&self, points: &PointSet) -> Vec<f64> {
        let mut positions = Vec::with_capacity(points.len() * 3);
        for point in points.iter() {
            positions.extend_from_slice(&self.transform_point(point));
        }
        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn make_point(x: f64, y: f64, z: f64) -> Point4D {
        Point4D::without_intensity(x, y, z)
    }

    #[test]
    fn swaps_up_axis_and_negates_north() {
        let transformer = ViewerTransformer::new([10.0, 20.0, 5.0]).unwrap();
        let viewer = transformer.transform_point(&make_point(11.0, 23.0, 7.0));
        assert_eq!(viewer, [1.0, 2.0, -3.0]);
    }

    #[test]
    fn inverse_recovers_the_native_point() {
        let transformer = ViewerTransformer::new([512_345.25, 4_180_220.5, 1_432.75]).unwrap();
        let samples = [
            [512_300.125, 4_180_250.0, 1_440.5],
            [512_345.25, 4_180_220.5, 1_432.75],
            [-3.5, 0.0, 1e-3],
        ];
        for native in samples {
            let back = transformer.inverse(transformer.forward(native));
            for axis in 0..3 {
                assert_abs_diff_eq!(back[axis], native[axis], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn flattened_positions_keep_point_order() {
        let transformer = ViewerTransformer::new([0.0, 0.0, 0.0]).unwrap();
        let points = PointSet::new(vec![make_point(1.0, 2.0, 3.0), make_point(4.0, 5.0, 6.0)]);
        assert_eq!(
            transformer.transform_points(&points),
            vec![1.0, 3.0, -2.0, 4.0, 6.0, -5.0]
        );
    }

    #[test]
    fn non_finite_center_is_rejected() {
        assert!(matches!(
            ViewerTransformer::new([0.0, f64::NAN, 0.0]),
            Err(TransformError::NonFiniteCenter(_))
        ));
        assert!(ViewerTransformer::new([0.0, 0.0, f64::INFINITY]).is_err());
    }
}
