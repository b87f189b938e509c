use kdtree::{distance::squared_euclidean, KdTree};
use rayon::prelude::*;

use crate::error::SpatialError;

/// A neighbor returned by a query: the index of the point in the slice the
/// index was built from, and its Euclidean distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

/// Nearest-neighbor and radius queries over `D`-dimensional coordinates.
///
/// Use `KdIndex<2>` for horizontal (x, y) queries and `KdIndex<3>` for full
/// 3-D neighborhoods.
pub struct KdIndex<const D: usize> {
    tree: KdTree<f64, usize, [f64; D]>,
    len: usize,
}

impl<const D: usize> KdIndex<D> {
    pub fn build(coords: &[[f64; D]]) -> Result<Self, SpatialError> {
        if coords.is_empty() {
            return Err(SpatialError::EmptyIndex);
        }

        let mut tree = KdTree::new(D);
        for (i, coord) in coords.iter().enumerate() {
            tree.add(*coord, i)?;
        }

        Ok(Self {
            tree,
            len: coords.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Up to `k` nearest points, closest first.
    pub fn nearest(&self, query: &[f64; D], k: usize) -> Result<Vec<Neighbor>, SpatialError> {
        let found = self.tree.nearest(&query[..], k, &squared_euclidean)?;
        Ok(found
            .into_iter()
            .map(|(dist_sq, &index)| Neighbor {
                index,
                distance: dist_sq.sqrt(),
            })
            .collect())
    }

    pub fn nearest_one(&self, query: &[f64; D]) -> Result<Neighbor, SpatialError> {
        self.nearest(query, 1)?
            .into_iter()
            .next()
            .ok_or(SpatialError::EmptyIndex)
    }

    /// Every point within `radius` (inclusive) of `query`.
    pub fn within(&self, query: &[f64; D], radius: f64) -> Result<Vec<Neighbor>, SpatialError> {
        let found = self
            .tree
            .within(&query[..], radius * radius, &squared_euclidean)?;
        Ok(found
            .into_iter()
            .map(|(dist_sq, &index)| Neighbor {
                index,
                distance: dist_sq.sqrt(),
            })
            .collect())
    }

    pub fn nearest_batch(
        &self,
        queries: &[[f64; D]],
        k: usize,
    ) -> Result<Vec<Vec<Neighbor>>, SpatialError> {
        queries.par_iter().map(|q| self.nearest(q, k)).collect()
    }

    pub fn nearest_one_batch(&self, queries: &[[f64; D]]) -> Result<Vec<Neighbor>, SpatialError> {
        queries.par_iter().map(|q| self.nearest_one(q)).collect()
    }

    pub fn within_batch(
        &self,
        queries: &[[f64; D]],
        radius: f64,
    ) -> Result<Vec<Vec<Neighbor>>, SpatialError> {
        queries.par_iter().map(|q| self.within(q, radius)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid(n: usize) -> Vec<[f64; 2]> {
        (0..n)
            .flat_map(|i| (0..n).map(move |j| [i as f64, j as f64]))
            .collect()
    }

    #[test]
    fn empty_set_is_rejected() {
        let coords: Vec<[f64; 2]> = vec![];
        assert!(matches!(
            KdIndex::build(&coords),
            Err(SpatialError::EmptyIndex)
        ));
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let coords = vec![[0.0, 0.0], [f64::NAN, 1.0]];
        assert!(matches!(
            KdIndex::build(&coords),
            Err(SpatialError::KdTree(_))
        ));
    }

    #[test]
    fn nearest_returns_closest_first() {
        let coords = grid(5);
        let index = KdIndex::build(&coords).unwrap();
        assert_eq!(index.len(), 25);

        let found = index.nearest(&[2.1, 2.9], 3).unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(coords[found[0].index], [2.0, 3.0]);
        assert!(found[0].distance <= found[1].distance);
        assert!(found[1].distance <= found[2].distance);
    }

    #[test]
    fn nearest_one_reports_euclidean_distance() {
        let index = KdIndex::build(&[[0.0, 0.0, 0.0], [3.0, 4.0, 0.0]]).unwrap();
        let found = index.nearest_one(&[3.0, 4.0, 12.0]).unwrap();
        assert_eq!(found.index, 1);
        assert_abs_diff_eq!(found.distance, 12.0, epsilon = 1e-12);
    }

    #[test]
    fn within_is_a_radius_query() {
        let coords = grid(5);
        let index = KdIndex::build(&coords).unwrap();
        let found = index.within(&[2.0, 2.0], 1.0).unwrap();
        // the center and its four axis neighbors
        assert_eq!(found.len(), 5);
        assert!(found.iter().all(|n| n.distance <= 1.0 + 1e-12));
    }

    #[test]
    fn batched_queries_stay_aligned() {
        let coords = grid(4);
        let index = KdIndex::build(&coords).unwrap();
        let queries = vec![[0.1, 0.1], [3.2, 2.9], [1.9, 0.2]];
        let found = index.nearest_one_batch(&queries).unwrap();
        assert_eq!(coords[found[0].index], [0.0, 0.0]);
        assert_eq!(coords[found[1].index], [3.0, 3.0]);
        assert_eq!(coords[found[2].index], [2.0, 0.0]);

        let balls = index.within_batch(&queries, 0.5).unwrap();
        assert_eq!(balls.len(), 3);
        assert!(balls.iter().all(|ball| ball.len() == 1));
    }
}
