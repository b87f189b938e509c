//! Per-point opacity channels. Each maps a numeric signal to opacities in
//! [0, 1], aligned with its input.

use pcd_core::is_known_intensity;

const RANGE_EPSILON: f64 = 1e-6;

fn unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Linear fade from `max_opacity` at 0 down to `min_opacity` at `max_value`
/// and beyond.
pub fn fade_out(values: &[f64], max_value: f64, min_opacity: f64, max_opacity: f64) -> Vec<f64> {
    let opacity_range = max_opacity - min_opacity;
    values
        .iter()
        .map(|&v| {
            let normalized = if max_value > 0.0 {
                unit(v / max_value)
            } else if v > 0.0 {
                1.0
            } else {
                0.0
            };
            unit(max_opacity - normalized * opacity_range)
        })
        .collect()
}

/// Opacity from horizontal distance to the nearest primary point.
pub fn distance_alphas(
    distances: &[f64],
    max_distance: f64,
    min_opacity: f64,
    max_opacity: f64,
) -> Vec<f64> {
    fade_out(distances, max_distance, min_opacity, max_opacity)
}

/// Opacity from height above ground.
pub fn hag_alphas(hags: &[f64], max_height: f64, min_opacity: f64, max_opacity: f64) -> Vec<f64> {
    fade_out(hags, max_height, min_opacity, max_opacity)
}

/// Linear ramp from `min_opacity` at `min_planarity` up to `max_opacity` at
/// `max_planarity`. A collapsed range becomes a step at `min_planarity`.
pub fn planarity_alphas(
    scores: &[f64],
    min_planarity: f64,
    max_planarity: f64,
    min_opacity: f64,
    max_opacity: f64,
) -> Vec<f64> {
    let planarity_range = max_planarity - min_planarity;
    if planarity_range < RANGE_EPSILON {
        return scores
            .iter()
            .map(|&s| unit(if s >= min_planarity { max_opacity } else { min_opacity }))
            .collect();
    }

    let opacity_range = max_opacity - min_opacity;
    scores
        .iter()
        .map(|&s| {
            let normalized = unit((s - min_planarity) / planarity_range);
            unit(min_opacity + normalized * opacity_range)
        })
        .collect()
}

/// Linear ramp from `min_opacity` at the dimmest observed valid intensity to
/// `max_opacity` at `max_intensity`. Unknown (negative or non-finite)
/// intensities get 1.0.
pub fn intensity_alphas(
    intensities: &[f64],
    max_intensity: f64,
    min_opacity: f64,
    max_opacity: f64,
) -> Vec<f64> {
    let min_observed = intensities
        .iter()
        .copied()
        .filter(|i| is_known_intensity(*i))
        .min_by(f64::total_cmp);
    let Some(min_observed) = min_observed else {
        return vec![1.0; intensities.len()];
    };

    let max_intensity = max_intensity.max(min_observed);
    let intensity_range = max_intensity - min_observed;
    log::debug!(
        "intensity range: min observed {}, ceiling {}",
        min_observed,
        max_intensity
    );

    let opacity_range = max_opacity - min_opacity;
    intensities
        .iter()
        .map(|&i| {
            if !is_known_intensity(i) {
                1.0
            } else if intensity_range < RANGE_EPSILON {
                unit(max_opacity)
            } else {
                let normalized = unit((i - min_observed) / intensity_range);
                unit(min_opacity + normalized * opacity_range)
            }
        })
        .collect()
}
