//! Descriptive statistics over elapsed-day samples.

/// Arithmetic mean, `None` for an empty sample.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Empirical cumulative distribution: sorted values paired with the
/// percentage of the sample at or below each position.
pub fn ecdf(values: &[f64]) -> Vec<(f64, f64)> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v, (i + 1) as f64 / n * 100.0))
        .collect()
}

const KDE_GRID_SIZE: usize = 200;
const KDE_CUT: f64 = 3.0;

/// Gaussian kernel density estimate using Scott's bandwidth rule.
/// Returns `None` for fewer than two samples or zero variance.
pub fn gaussian_kde(values: &[f64]) -> Option<Vec<(f64, f64)>> {
    let sd = std_dev(values)?;
    if sd <= 0.0 || !sd.is_finite() {
        return None;
    }
    let n = values.len() as f64;
    let bandwidth = sd * n.powf(-1.0 / 5.0);

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let start = min - KDE_CUT * bandwidth;
    let end = max + KDE_CUT * bandwidth;
    let step = (end - start) / (KDE_GRID_SIZE - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let curve = (0..KDE_GRID_SIZE)
        .map(|i| {
            let x = start + step * i as f64;
            let density = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect();
    Some(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn empty_sample_is_undefined() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(quantile(&[], 0.9), None);
        assert!(ecdf(&[]).is_empty());
        assert!(gaussian_kde(&[]).is_none());
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn p90_interpolates_linearly() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        // position 0.9 * 9 = 8.1 -> 9 + 0.1 * (10 - 9)
        assert!(approx_eq(quantile(&values, 0.9).unwrap(), 9.1, 1e-9));
        assert_eq!(quantile(&[5.0], 0.9), Some(5.0));
    }

    #[test]
    fn std_dev_uses_sample_denominator() {
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!(approx_eq(sd, 2.138089935, 1e-6));
        assert_eq!(std_dev(&[1.0]), None);
    }

    #[test]
    fn ecdf_reaches_one_hundred() {
        let points = ecdf(&[30.0, 10.0, 20.0, 40.0]);
        assert_eq!(points.first(), Some(&(10.0, 25.0)));
        assert_eq!(points.last(), Some(&(40.0, 100.0)));
        assert!(points.windows(2).all(|w| w[0].0 <= w[1].0 && w[0].1 < w[1].1));
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let values = [5.0, 7.0, 8.0, 12.0, 20.0, 21.0, 30.0];
        let curve = gaussian_kde(&values).unwrap();
        assert_eq!(curve.len(), 200);
        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum();
        assert!(approx_eq(area, 1.0, 0.01), "area = {area}");
        assert!(curve.iter().all(|(_, d)| *d >= 0.0));
    }

    #[test]
    fn kde_skips_degenerate_samples() {
        assert!(gaussian_kde(&[4.0]).is_none());
        assert!(gaussian_kde(&[4.0, 4.0, 4.0]).is_none());
    }
}
