use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Intensity value used when the scanner did not record one.
/// Any negative or non-finite intensity is treated as unknown.
pub const UNKNOWN_INTENSITY: f64 = -1.0;

pub fn is_known_intensity(intensity: f64) -> bool {
    intensity.is_finite() && intensity >= 0.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point4D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub intensity: f64,
}

impl Point4D {
    pub fn new(x: f64, y: f64, z: f64, intensity: f64) -> Self {
        Self { x, y, z, intensity }
    }

    pub fn without_intensity(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, UNKNOWN_INTENSITY)
    }

    pub fn has_intensity(&self) -> bool {
        is_known_intensity(self.intensity)
    }

    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn xyz(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    // Exact coordinate identity, intensity excluded.
    fn coordinate_key(&self) -> [u64; 3] {
        [self.x.to_bits(), self.y.to_bits(), self.z.to_bits()]
    }
}

/// An ordered collection of points belonging to one labeled role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointSet {
    pub points: Vec<Point4D>,
}

impl PointSet {
    pub fn new(points: Vec<Point4D>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point4D> {
        self.points.iter()
    }

    pub fn xy_coords(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(Point4D::xy).collect()
    }

    pub fn xyz_coords(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(Point4D::xyz).collect()
    }

    pub fn intensities(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.intensity).collect()
    }

    /// Concatenates sets in order, preserving each set's internal order.
    pub fn concat<'a>(sets: impl IntoIterator<Item = &'a PointSet>) -> PointSet {
        let points = sets
            .into_iter()
            .flat_map(|set| set.points.iter().copied())
            .collect();
        PointSet { points }
    }

    /// Returns this set minus every point whose exact XYZ appears in `others`.
    pub fn without_points_in<'a>(&self, others: impl IntoIterator<Item = &'a PointSet>) -> PointSet {
        let remove: HashSet<[u64; 3]> = others
            .into_iter()
            .flat_map(|set| set.points.iter().map(Point4D::coordinate_key))
            .collect();
        if remove.is_empty() {
            return self.clone();
        }
        let points = self
            .points
            .iter()
            .filter(|p| !remove.contains(&p.coordinate_key()))
            .copied()
            .collect();
        PointSet { points }
    }

    pub fn centroid_xy(&self) -> Option<[f64; 2]> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some([sx / n, sy / n])
    }

    pub fn centroid(&self) -> Option<[f64; 3]> {
        let [cx, cy] = self.centroid_xy()?;
        let mean_z = self.points.iter().map(|p| p.z).sum::<f64>() / self.points.len() as f64;
        Some([cx, cy, mean_z])
    }

    pub fn bounding_volume(&self) -> Option<BoundingVolume> {
        if self.points.is_empty() {
            return None;
        }
        let mut bounding_volume = BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        };
        for point in &self.points {
            bounding_volume.max[0] = bounding_volume.max[0].max(point.x);
            bounding_volume.max[1] = bounding_volume.max[1].max(point.y);
            bounding_volume.max[2] = bounding_volume.max[2].max(point.z);
            bounding_volume.min[0] = bounding_volume.min[0].min(point.x);
            bounding_volume.min[1] = bounding_volume.min[1].min(point.y);
            bounding_volume.min[2] = bounding_volume.min[2].min(point.z);
        }
        Some(bounding_volume)
    }
}

impl From<Vec<Point4D>> for PointSet {
    fn from(points: Vec<Point4D>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<Point4D> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point4D>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// Axis-aligned bounds of a point set in native coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingVolume {
    pub fn extent(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn max_extent(&self) -> f64 {
        let [dx, dy, dz] = self.extent();
        dx.max(dy).max(dz)
    }

    pub fn mid_z(&self) -> f64 {
        self.min[2] + (self.max[2] - self.min[2]) / 2.0
    }
}
