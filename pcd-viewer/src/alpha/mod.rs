//! Per-point opacity for the foliage context, combined from four independent
//! channels: distance to the primary points, height above ground, local
//! planarity and return intensity.

pub mod bounds;
pub mod channels;

use pcd_core::{PointSet, SceneError, ViewerConfig};
use pcd_spatial::{planarity_scores, KdIndex, LocalEigenProvider};

use crate::hag::height_above_ground;

/// The four channel opacities for one point set, each aligned with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelAlphas {
    pub distance: Vec<f64>,
    pub hag: Vec<f64>,
    pub planarity: Vec<f64>,
    pub intensity: Vec<f64>,
}

impl ChannelAlphas {
    pub fn combine(&self, exponent: f64) -> Result<Vec<f64>, SceneError> {
        combine_alphas(
            &[
                self.distance.as_slice(),
                self.hag.as_slice(),
                self.planarity.as_slice(),
                self.intensity.as_slice(),
            ],
            exponent,
        )
    }
}

/// Product of the channel opacities, raised to `exponent` and clipped to
/// [0, 1]. Channels must share one length.
pub fn combine_alphas(channels: &[&[f64]], exponent: f64) -> Result<Vec<f64>, SceneError> {
    let Some(first) = channels.first() else {
        return Ok(Vec::new());
    };
    let len = first.len();
    if let Some(bad) = channels.iter().find(|c| c.len() != len) {
        return Err(SceneError::computation(
            "alpha combination",
            format!("channel length {} does not match {}", bad.len(), len),
        ));
    }

    Ok((0..len)
        .map(|i| {
            let product: f64 = channels.iter().map(|c| c[i]).product();
            product.max(0.0).powf(exponent).clamp(0.0, 1.0)
        })
        .collect())
}

pub struct AlphaCompositor<'a> {
    config: &'a ViewerConfig,
    eigen: Option<&'a dyn LocalEigenProvider>,
}

impl<'a> AlphaCompositor<'a> {
    pub fn new(config: &'a ViewerConfig, eigen: Option<&'a dyn LocalEigenProvider>) -> Self {
        Self { config, eigen }
    }

    /// Combined opacity for each foliage point. Never fails: a channel that
    /// cannot be computed contributes its neutral or fallback value.
    pub fn foliage_alphas(&self, foliage: &PointSet, primary: &PointSet, ground: &PointSet) -> Vec<f64> {
        if foliage.is_empty() {
            return Vec::new();
        }
        let channels = self.channels(foliage, primary, ground);
        channels
            .combine(self.config.alpha_exponent)
            .unwrap_or_else(|e| {
                log::warn!("could not combine foliage alphas, using 1.0: {}", e);
                vec![1.0; foliage.len()]
            })
    }

    pub fn channels(&self, foliage: &PointSet, primary: &PointSet, ground: &PointSet) -> ChannelAlphas {
        ChannelAlphas {
            distance: self.distance_channel(foliage, primary),
            hag: self.hag_channel(foliage, ground),
            planarity: self.planarity_channel(foliage, primary),
            intensity: self.intensity_channel(foliage, primary),
        }
    }

    pub fn distance_channel(&self, foliage: &PointSet, primary: &PointSet) -> Vec<f64> {
        let params = &self.config.distance_alpha;
        let fallback = || vec![params.no_primary_opacity.clamp(0.0, 1.0); foliage.len()];
        if primary.is_empty() {
            return fallback();
        }

        let nearest = KdIndex::build(&primary.xy_coords())
            .and_then(|index| index.nearest_one_batch(&foliage.xy_coords()));
        match nearest {
            Ok(nearest) => {
                let distances: Vec<f64> = nearest.iter().map(|n| n.distance).collect();
                channels::distance_alphas(
                    &distances,
                    params.max_distance,
                    params.min_opacity,
                    params.max_opacity,
                )
            }
            Err(e) => {
                log::warn!("distance to primary points unavailable: {}", e);
                fallback()
            }
        }
    }

    pub fn hag_channel(&self, foliage: &PointSet, ground: &PointSet) -> Vec<f64> {
        let params = &self.config.hag_alpha;
        let hags = height_above_ground(foliage, ground, &self.config.hag);
        channels::hag_alphas(&hags, params.max_height, params.min_opacity, params.max_opacity)
    }

    pub fn planarity_channel(&self, foliage: &PointSet, primary: &PointSet) -> Vec<f64> {
        let params = &self.config.planarity_alpha;
        let neutral = || vec![1.0; foliage.len()];
        let Some(eigen) = self.eigen else {
            return neutral();
        };
        if foliage.len() <= params.neighborhood {
            log::debug!(
                "skipping planarity for {} foliage points (neighborhood {})",
                foliage.len(),
                params.neighborhood
            );
            return neutral();
        }

        let max_planarity = bounds::dynamic_max_planarity(primary, Some(eigen), params);
        log::info!("calculating planarity for {} foliage points", foliage.len());
        match planarity_scores(eigen, &foliage.xyz_coords(), params.neighborhood) {
            Ok(scores) => channels::planarity_alphas(
                &scores,
                params.min_planarity,
                max_planarity,
                params.min_opacity,
                params.max_opacity,
            ),
            Err(e) => {
                log::warn!("foliage planarity failed, skipping channel: {}", e);
                neutral()
            }
        }
    }

    pub fn intensity_channel(&self, foliage: &PointSet, primary: &PointSet) -> Vec<f64> {
        let params = &self.config.intensity_alpha;
        let max_intensity = bounds::dynamic_max_intensity(primary, params);
        channels::intensity_alphas(
            &foliage.intensities(),
            max_intensity,
            params.min_opacity,
            params.max_opacity,
        )
    }
}
