/// Pearson product-moment correlation coefficient of two equally long columns.
///
/// Returns `None` when the coefficient is undefined: fewer than two pairs,
/// columns of different length, or a column with zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }

    // Rounding can push |r| a hair past 1.
    Some((covariance / denominator).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_positive() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_negative() {
        let r = pearson(&[1.0, 2.0, 3.0], &[9.0, 6.0, 3.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_value() {
        // Hand computed: cov = 2, var_x = 2, var_y = 8/3 -> r = 2 / sqrt(16/3)
        let r = pearson(&[1.0, 2.0, 3.0], &[1.0, 3.0, 3.0]).unwrap();
        assert!((r - 2.0 / (16.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_points() {
        assert!(pearson(&[1.0], &[2.0]).is_none());
        assert!(pearson(&[], &[]).is_none());
    }

    #[test]
    fn test_constant_column() {
        assert!(pearson(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
    }
}
