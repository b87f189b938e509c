use nalgebra::{Matrix2, SymmetricEigen, Vector2};

use crate::error::SpatialError;

const MIN_VARIANCE: f64 = 1e-12;

/// Principal axes of a set of horizontal coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalAxes2 {
    pub centroid: [f64; 2],
    /// Unit direction of largest variance.
    pub major: [f64; 2],
    /// Unit direction perpendicular to `major`.
    pub minor: [f64; 2],
    /// Variances along `major` and `minor`, descending.
    pub variances: [f64; 2],
}

/// 2-D PCA over the sample covariance of `coords`.
///
/// Eigenvector signs are normalized so the component of largest magnitude is
/// positive, which makes "the positive minor direction" deterministic.
pub fn principal_axes_2d(coords: &[[f64; 2]]) -> Result<PrincipalAxes2, SpatialError> {
    if coords.len() < 2 {
        return Err(SpatialError::TooFewPoints {
            len: coords.len(),
            required: 2,
        });
    }

    let n = coords.len() as f64;
    let (sx, sy) = coords
        .iter()
        .fold((0.0, 0.0), |(sx, sy), c| (sx + c[0], sy + c[1]));
    let centroid = [sx / n, sy / n];

    let (mut cxx, mut cxy, mut cyy) = (0.0, 0.0, 0.0);
    for c in coords {
        let dx = c[0] - centroid[0];
        let dy = c[1] - centroid[1];
        cxx += dx * dx;
        cxy += dx * dy;
        cyy += dy * dy;
    }
    let cov = Matrix2::new(cxx, cxy, cxy, cyy) / (n - 1.0);
    if cov.iter().any(|v| !v.is_finite()) {
        return Err(SpatialError::NonFinite("horizontal covariance"));
    }

    let eigen = SymmetricEigen::new(cov);
    let (first, second) = if eigen.eigenvalues[0] >= eigen.eigenvalues[1] {
        (0, 1)
    } else {
        (1, 0)
    };
    let variances = [eigen.eigenvalues[first], eigen.eigenvalues[second]];
    if variances[0] <= MIN_VARIANCE {
        return Err(SpatialError::Degenerate(
            "horizontal coordinates have no spread",
        ));
    }

    let major = canonical(eigen.eigenvectors.column(first).into_owned())?;
    let minor = canonical(eigen.eigenvectors.column(second).into_owned())?;

    Ok(PrincipalAxes2 {
        centroid,
        major,
        minor,
        variances,
    })
}

fn canonical(v: Vector2<f64>) -> Result<[f64; 2], SpatialError> {
    let norm = v.norm();
    if !norm.is_finite() || norm < 1e-12 {
        return Err(SpatialError::Degenerate("principal axis has zero length"));
    }
    let v = v / norm;
    let flip = if v[0].abs() >= v[1].abs() {
        v[0] < 0.0
    } else {
        v[1] < 0.0
    };
    Ok(if flip { [-v[0], -v[1]] } else { [v[0], v[1]] })
}
