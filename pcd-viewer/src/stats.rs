pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Percentile with linear interpolation between closest ranks, `p` in [0, 100].
pub(crate) fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_abs_diff_eq!(percentile(&values, 0.0).unwrap(), 10.0);
        assert_abs_diff_eq!(percentile(&values, 100.0).unwrap(), 50.0);
        assert_abs_diff_eq!(percentile(&values, 95.0).unwrap(), 48.0);
        assert_abs_diff_eq!(percentile(&[30.0, 10.0, 20.0], 95.0).unwrap(), 29.0);
    }

    #[test]
    fn median_of_even_count_averages_the_middle() {
        assert_abs_diff_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
        assert_abs_diff_eq!(median(&[7.0]).unwrap(), 7.0);
        assert!(median(&[]).is_none());
    }

    #[test]
    fn mean_of_values() {
        assert_abs_diff_eq!(mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0);
        assert!(mean(&[]).is_none());
    }
}
