//! Moves raw (foliage) points into the ground set when their elevation
//! agrees with the surrounding known ground.

use itertools::{Either, Itertools as _};
use pcd_core::{config::DensifyParams, Point4D, PointSet};
use pcd_spatial::{KdIndex, Neighbor};

/// Result of a densification pass.
///
/// `keep_mask` is aligned with the raw input: `true` where the point stayed
/// raw, `false` where it was promoted to ground.
#[derive(Debug, Clone, PartialEq)]
pub struct Densified {
    pub ground: PointSet,
    pub raw: PointSet,
    pub keep_mask: Vec<bool>,
}

impl Densified {
    fn unchanged(known_ground: &PointSet, raw: &PointSet) -> Self {
        Self {
            ground: known_ground.clone(),
            raw: raw.clone(),
            keep_mask: vec![true; raw.len()],
        }
    }

    pub fn promoted_count(&self) -> usize {
        self.keep_mask.iter().filter(|keep| !**keep).count()
    }
}

pub fn densify_ground(known_ground: &PointSet, raw: &PointSet, params: &DensifyParams) -> Densified {
    if known_ground.is_empty() || raw.is_empty() {
        return Densified::unchanged(known_ground, raw);
    }

    let index = match KdIndex::build(&known_ground.xy_coords()) {
        Ok(index) => index,
        Err(e) => {
            log::warn!("could not index known ground, skipping densification: {}", e);
            return Densified::unchanged(known_ground, raw);
        }
    };
    let neighborhoods = match index.within_batch(&raw.xy_coords(), params.radius) {
        Ok(found) => found,
        Err(e) => {
            log::warn!("ground neighbor query failed, skipping densification: {}", e);
            return Densified::unchanged(known_ground, raw);
        }
    };

    let keep_mask: Vec<bool> = raw
        .iter()
        .zip(&neighborhoods)
        .map(|(point, neighbors)| !agrees_with_ground(point, neighbors, known_ground, params))
        .collect();

    let (promoted, kept): (Vec<Point4D>, Vec<Point4D>) = raw
        .iter()
        .zip(&keep_mask)
        .partition_map(|(point, keep)| {
            if *keep {
                Either::Right(*point)
            } else {
                Either::Left(*point)
            }
        });

    if promoted.is_empty() {
        return Densified::unchanged(known_ground, raw);
    }
    log::info!(
        "moved {} points from foliage context to ground context",
        promoted.len()
    );

    let ground = known_ground.points.iter().copied().chain(promoted).collect();
    Densified {
        ground,
        raw: PointSet::new(kept),
        keep_mask,
    }
}

fn agrees_with_ground(
    point: &Point4D,
    neighbors: &[Neighbor],
    known_ground: &PointSet,
    params: &DensifyParams,
) -> bool {
    if neighbors.is_empty() || neighbors.len() < params.min_neighbors {
        return false;
    }
    let mean_z = neighbors
        .iter()
        .map(|n| known_ground.points[n.index].z)
        .sum::<f64>()
        / neighbors.len() as f64;
    (point.z - mean_z).abs() <= params.max_ground_hag
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(min_neighbors: usize) -> DensifyParams {
        DensifyParams {
            radius: 2.0,
            min_neighbors,
            max_ground_hag: 0.5,
        }
    }

    fn flat_ground() -> PointSet {
        (0..5)
            .flat_map(|i| (0..5).map(move |j| Point4D::new(i as f64, j as f64, 0.0, 100.0)))
            .collect()
    }

    #[test]
    fn single_close_point_is_promoted() {
        let ground = PointSet::new(vec![Point4D::new(0.0, 0.0, 0.0, 5.0)]);
        let raw = PointSet::new(vec![Point4D::new(0.1, 0.1, 0.2, 7.0)]);

        let result = densify_ground(&ground, &raw, &params(1));
        assert!(result.raw.is_empty());
        assert_eq!(result.ground.len(), 2);
        assert_eq!(result.keep_mask, vec![false]);
        assert_eq!(result.ground.points[1].intensity, 7.0);
    }

    #[test]
    fn high_points_stay_raw() {
        let raw = PointSet::new(vec![
            Point4D::new(2.0, 2.0, 0.3, 1.0),
            Point4D::new(2.5, 2.5, 3.0, 2.0),
            Point4D::new(1.5, 1.0, -0.4, 3.0),
        ]);
        let result = densify_ground(&flat_ground(), &raw, &params(3));

        assert_eq!(result.keep_mask, vec![false, true, false]);
        assert_eq!(result.promoted_count(), 2);
        assert_eq!(result.raw.intensities(), vec![2.0]);
        assert_eq!(result.ground.len(), 27);
    }

    #[test]
    fn too_few_neighbors_prevents_promotion() {
        let raw = PointSet::new(vec![Point4D::new(20.0, 20.0, 0.0, 1.0)]);
        let result = densify_ground(&flat_ground(), &raw, &params(3));
        assert_eq!(result.keep_mask, vec![true]);
        assert_eq!(result.ground.len(), 25);
    }

    #[test]
    fn partition_preserves_every_point() {
        let raw: PointSet = (0..40)
            .map(|i| {
                let t = i as f64 * 0.17;
                Point4D::new(t % 6.0, (t * 1.3) % 6.0, (i % 4) as f64 * 0.3, i as f64)
            })
            .collect();
        let ground = flat_ground();
        let result = densify_ground(&ground, &raw, &params(3));

        assert_eq!(result.ground.len() + result.raw.len(), ground.len() + raw.len());
        assert_eq!(result.keep_mask.len(), raw.len());

        // each raw point lands in exactly one output, tracked by its unique intensity
        let mut seen: Vec<f64> = result.raw.intensities();
        seen.extend(result.ground.points[ground.len()..].iter().map(|p| p.intensity));
        seen.sort_by(f64::total_cmp);
        assert_eq!(seen, raw.intensities());
        assert_eq!(&result.ground.points[..ground.len()], &ground.points[..]);
    }

    #[test]
    fn empty_inputs_pass_through() {
        let raw = PointSet::new(vec![Point4D::new(0.0, 0.0, 0.0, 1.0)]);
        let no_ground = densify_ground(&PointSet::default(), &raw, &params(3));
        assert_eq!(no_ground.keep_mask, vec![true]);
        assert_eq!(no_ground.raw, raw);

        let no_raw = densify_ground(&flat_ground(), &PointSet::default(), &params(3));
        assert!(no_raw.keep_mask.is_empty());
        assert_eq!(no_raw.ground.len(), 25);
    }

    #[test]
    fn unindexable_ground_passes_through() {
        let ground = PointSet::new(vec![Point4D::new(f64::NAN, 0.0, 0.0, 1.0)]);
        let raw = PointSet::new(vec![Point4D::new(0.0, 0.0, 0.0, 1.0)]);
        let result = densify_ground(&ground, &raw, &params(1));
        assert_eq!(result.keep_mask, vec![true]);
        assert_eq!(result.raw, raw);
    }
}
