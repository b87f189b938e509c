//! Local structure tensor eigenvalues and the planarity score derived from them.

use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use rayon::prelude::*;

use crate::{error::SpatialError, index::KdIndex};

/// Produces, for every point, the eigenvalues of the covariance of its
/// `k`-point neighborhood, sorted in descending order.
pub trait LocalEigenProvider: Send + Sync {
    fn local_eigenvalues(
        &self,
        points: &[[f64; 3]],
        k: usize,
    ) -> Result<Vec<[f64; 3]>, SpatialError>;
}

/// Neighborhoods from a 3-D kd-tree (the point itself included), covariance
/// eigenvalues from `nalgebra`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CovarianceEigen;

impl LocalEigenProvider for CovarianceEigen {
    fn local_eigenvalues(
        &self,
        points: &[[f64; 3]],
        k: usize,
    ) -> Result<Vec<[f64; 3]>, SpatialError> {
        if k < 3 || points.len() < k {
            return Err(SpatialError::TooFewPoints {
                len: points.len(),
                required: k.max(3),
            });
        }

        log::debug!("local eigenvalues for {} points, k={}", points.len(), k);
        let index = KdIndex::build(points)?;
        points
            .par_iter()
            .map(|point| {
                let neighbors = index.nearest(point, k)?;
                let positions: Vec<Vector3<f64>> = neighbors
                    .iter()
                    .map(|n| Vector3::from(points[n.index]))
                    .collect();
                neighborhood_eigenvalues(&positions)
            })
            .collect()
    }
}

fn neighborhood_eigenvalues(positions: &[Vector3<f64>]) -> Result<[f64; 3], SpatialError> {
    let n = positions.len() as f64;
    let centroid = positions
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<f64>, p| acc + p)
        / n;

    let mut cov = Matrix3::zeros();
    for p in positions {
        let diff = p - centroid;
        cov += diff * diff.transpose();
    }
    cov /= n;

    let eigen = SymmetricEigen::new(cov);
    let mut values = [
        eigen.eigenvalues[0],
        eigen.eigenvalues[1],
        eigen.eigenvalues[2],
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(SpatialError::NonFinite("local covariance"));
    }
    values.sort_by(|a, b| b.total_cmp(a));
    Ok(values)
}

/// Planarity `(λ2 - λ3) / λ1` for eigenvalues sorted descending, clipped to
/// [0, 1]. A neighborhood with no spread scores 0.
pub fn planarity(eigenvalues: &[f64; 3]) -> f64 {
    let [l1, l2, l3] = *eigenvalues;
    if l1 <= f64::EPSILON {
        return 0.0;
    }
    ((l2 - l3) / l1).clamp(0.0, 1.0)
}

pub fn planarity_scores(
    provider: &dyn LocalEigenProvider,
    points: &[[f64; 3]],
    k: usize,
) -> Result<Vec<f64>, SpatialError> {
    Ok(provider
        .local_eigenvalues(points, k)?
        .iter()
        .map(planarity)
        .collect())
}
