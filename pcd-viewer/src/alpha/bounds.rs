//! Adaptive upper bounds for the planarity and intensity channels, derived
//! from the primary (top + sides) points.

use pcd_core::{
    config::{IntensityAlphaParams, PlanarityAlphaParams},
    is_known_intensity, PointSet,
};
use pcd_spatial::{planarity_scores, LocalEigenProvider};

use crate::stats;

/// Mean planarity of the primary points when it clears
/// `min_planarity + dynamic_margin`, otherwise `default_max_planarity`.
pub fn dynamic_max_planarity(
    primary: &PointSet,
    eigen: Option<&dyn LocalEigenProvider>,
    params: &PlanarityAlphaParams,
) -> f64 {
    let fallback = params.default_max_planarity;
    let Some(eigen) = eigen else {
        return fallback;
    };
    if primary.len() <= params.neighborhood {
        return fallback;
    }

    log::debug!("computing mean planarity of {} primary points", primary.len());
    let scores = match planarity_scores(eigen, &primary.xyz_coords(), params.neighborhood) {
        Ok(scores) => scores,
        Err(e) => {
            log::warn!("primary planarity failed, using default ceiling: {}", e);
            return fallback;
        }
    };

    match stats::mean(&scores) {
        Some(mean) if mean > params.min_planarity + params.dynamic_margin => {
            log::info!("using dynamic max planarity {:.3}", mean);
            mean
        }
        Some(mean) => {
            log::warn!(
                "mean primary planarity {:.3} too close to the minimum, using default {}",
                mean,
                fallback
            );
            fallback
        }
        None => fallback,
    }
}

/// The configured percentile of the primary intensities, or
/// `default_max_intensity` when the primary set carries no valid intensity.
pub fn dynamic_max_intensity(primary: &PointSet, params: &IntensityAlphaParams) -> f64 {
    let valid: Vec<f64> = primary
        .intensities()
        .into_iter()
        .filter(|i| is_known_intensity(*i))
        .collect();

    match stats::percentile(&valid, params.percentile) {
        Some(ceiling) => {
            log::info!(
                "dynamic max intensity {:.0} ({}th percentile of {} primary points)",
                ceiling,
                params.percentile,
                valid.len()
            );
            ceiling
        }
        None => {
            log::info!(
                "no primary intensity, using default {}",
                params.default_max_intensity
            );
            params.default_max_intensity
        }
    }
}
