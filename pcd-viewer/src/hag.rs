use pcd_core::{config::HagParams, PointSet, SceneError};
use pcd_spatial::KdIndex;

/// Height above the local ground for each foliage point: elevation minus the
/// mean elevation of its `k` horizontally-nearest ground points, floored at 0.
pub fn try_height_above_ground(
    foliage: &PointSet,
    ground: &PointSet,
    params: &HagParams,
) -> Result<Vec<f64>, SceneError> {
    let k = params.k_neighbors;
    if k == 0 {
        return Err(SceneError::insufficient(
            "height above ground",
            "k_neighbors must be at least 1",
        ));
    }
    if ground.len() < k {
        return Err(SceneError::insufficient(
            "height above ground",
            format!("{} ground points for k={}", ground.len(), k),
        ));
    }
    if foliage.is_empty() {
        return Ok(Vec::new());
    }

    log::debug!(
        "estimating height above ground for {} foliage points with k={}",
        foliage.len(),
        k
    );
    let index = KdIndex::build(&ground.xy_coords())?;
    let neighborhoods = index.nearest_batch(&foliage.xy_coords(), k)?;

    Ok(foliage
        .iter()
        .zip(&neighborhoods)
        .map(|(point, neighbors)| {
            let local_ground_z = neighbors
                .iter()
                .map(|n| ground.points[n.index].z)
                .sum::<f64>()
                / neighbors.len() as f64;
            (point.z - local_ground_z).max(0.0)
        })
        .collect())
}

/// Like [`try_height_above_ground`], but every failure yields all-zero
/// heights aligned with `foliage`.
pub fn height_above_ground(foliage: &PointSet, ground: &PointSet, params: &HagParams) -> Vec<f64> {
    try_height_above_ground(foliage, ground, params).unwrap_or_else(|e| {
        log::warn!("height above ground unavailable, using zeros: {}", e);
        vec![0.0; foliage.len()]
    })
}
