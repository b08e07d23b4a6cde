//! Descriptive statistics used to reduce simulated samples.
//!
//! All functions in this module handle edge cases explicitly and use
//! numerically stable algorithms, since the simulations routinely reduce
//! 10⁵–10⁶ samples whose naive sums lose low-order bits.
//!
//! # Algorithms
//!
//! - **Mean**: Neumaier (improved Kahan) compensated summation.
//! - **Variance/StdDev**: Welford's online algorithm.
//!   Reference: Welford (1962), "Note on a Method for Calculating
//!   Corrected Sums of Squares and Products", *Technometrics* 4(3).
//! - **Correlation**: Pearson's r from the two-pass covariance.

/// Computes the arithmetic mean using compensated summation.
///
/// # Complexity
/// Time: O(n), Space: O(1)
///
/// # Returns
/// - `None` if `data` is empty or contains any NaN/Inf.
///
/// # Examples
/// ```
/// use u_stochastic::stats::mean;
/// let v = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!((mean(&v).unwrap() - 3.0).abs() < 1e-15);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    if !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Computes the sample variance (denominator `n − 1`) with Welford's
/// algorithm.
///
/// # Returns
/// - `None` if `data.len() < 2` or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_stochastic::stats::variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((variance(&v).unwrap() - 4.571428571428571).abs() < 1e-10);
/// ```
pub fn variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    accumulate(data)?.sample_variance()
}

/// Computes the population variance (denominator `n`).
///
/// This is the estimator reported by the walk and coin-flip summaries,
/// where the sample size is large enough that the distinction is
/// immaterial.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_stochastic::stats::population_variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((population_variance(&v).unwrap() - 4.0).abs() < 1e-10);
/// ```
pub fn population_variance(data: &[f64]) -> Option<f64> {
    accumulate(data)?.population_variance()
}

/// Computes the sample standard deviation.
///
/// # Returns
/// - `None` if `data.len() < 2` or contains NaN/Inf.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

fn accumulate(data: &[f64]) -> Option<Welford> {
    if data.is_empty() || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    Some(data.iter().fold(Welford::default(), |mut acc, &x| {
        acc.push(x);
        acc
    }))
}

/// Computes the sample covariance between two datasets.
///
/// # Formula
/// ```text
/// Cov(X, Y) = Σ(xᵢ − x̄)(yᵢ − ȳ) / (n − 1)
/// ```
///
/// # Returns
/// - `None` if `x.len() != y.len()`, `n < 2`, or data contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_stochastic::stats::covariance;
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [2.0, 4.0, 6.0, 8.0, 10.0];
/// assert!((covariance(&x, &y).unwrap() - 5.0).abs() < 1e-14);
/// ```
pub fn covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n != y.len() || n < 2 {
        return None;
    }
    if !x.iter().chain(y.iter()).all(|v| v.is_finite()) {
        return None;
    }
    let nf = n as f64;
    let mean_x = kahan_sum(x) / nf;
    let mean_y = kahan_sum(y) / nf;
    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(&a, &b)| (a - mean_x) * (b - mean_y))
        .sum();
    Some(sum / (nf - 1.0))
}

/// Computes Pearson's correlation coefficient between two datasets.
///
/// # Formula
/// ```text
/// r = Cov(X, Y) / (s_X · s_Y)
/// ```
///
/// The result is clamped to `[-1, 1]` to absorb rounding.
///
/// # Returns
/// - `None` under the same conditions as [`covariance`], or when either
///   dataset is constant (zero variance).
///
/// # Examples
/// ```
/// use u_stochastic::stats::correlation;
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [8.0, 6.0, 4.0, 2.0];
/// assert!((correlation(&x, &y).unwrap() + 1.0).abs() < 1e-12);
/// ```
pub fn correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let cov = covariance(x, y)?;
    let sx = std_dev(x)?;
    let sy = std_dev(y)?;
    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    Some((cov / (sx * sy)).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Compensated summation
// ---------------------------------------------------------------------------

/// Neumaier compensated summation for O(ε) error independent of `n`.
///
/// An improved variant of Kahan summation that also handles the case
/// where the addend is larger in magnitude than the running sum.
///
/// Reference: Neumaier (1974), "Rundungsfehleranalyse einiger Verfahren
/// zur Summation endlicher Summen", *ZAMM* 54(1), pp. 39–51.
pub fn kahan_sum(data: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in data {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

// ---------------------------------------------------------------------------
// Welford online accumulator
// ---------------------------------------------------------------------------

/// Running count, mean and sum of squared deviations M₂.
#[derive(Debug, Clone, Copy, Default)]
struct Welford {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Welford {
    fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    fn sample_variance(&self) -> Option<f64> {
        (self.count >= 2).then(|| self.m2 / (self.count - 1) as f64)
    }

    fn population_variance(&self) -> Option<f64> {
        (self.count > 0).then(|| self.m2 / self.count as f64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- mean ---

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(3.0));
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_non_finite() {
        assert_eq!(mean(&[1.0, f64::NAN, 3.0]), None);
        assert_eq!(mean(&[1.0, f64::INFINITY, 3.0]), None);
    }

    #[test]
    fn test_mean_symmetric_displacements() {
        assert_eq!(mean(&[-3.0, -1.0, 1.0, 3.0]), Some(0.0));
    }

    // --- variance ---

    #[test]
    fn test_variance_basic() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((variance(&v).unwrap() - 4.571428571428571).abs() < 1e-10);
    }

    #[test]
    fn test_variance_too_short() {
        assert_eq!(variance(&[]), None);
        assert_eq!(variance(&[1.0]), None);
    }

    #[test]
    fn test_population_variance() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_variance(&v).unwrap() - 4.0).abs() < 1e-10);
        assert_eq!(population_variance(&[7.0]), Some(0.0));
        assert_eq!(population_variance(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = 4.571428571428571_f64.sqrt();
        assert!((std_dev(&v).unwrap() - expected).abs() < 1e-10);
    }

    // --- covariance / correlation ---

    #[test]
    fn test_covariance_perfect_negative() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 8.0, 6.0, 4.0, 2.0];
        assert!((covariance(&x, &y).unwrap() + 5.0).abs() < 1e-14);
    }

    #[test]
    fn test_covariance_self_is_variance() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let cov_xx = covariance(&data, &data).unwrap();
        assert!((cov_xx - variance(&data).unwrap()).abs() < 1e-10);
    }

    #[test]
    fn test_covariance_edge_cases() {
        assert_eq!(covariance(&[], &[]), None);
        assert_eq!(covariance(&[1.0], &[2.0]), None);
        assert_eq!(covariance(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn test_correlation_perfect_positive() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [3.0, 5.0, 7.0, 9.0, 11.0];
        assert!((correlation(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_constant_is_none() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [5.0, 5.0, 5.0, 5.0];
        assert_eq!(correlation(&x, &y), None);
    }

    #[test]
    fn test_correlation_orthogonal() {
        // x and y are centred and orthogonal
        let x = [1.0, -1.0, 1.0, -1.0];
        let y = [1.0, 1.0, -1.0, -1.0];
        assert!(correlation(&x, &y).unwrap().abs() < 1e-14);
    }

    // --- kahan_sum ---

    #[test]
    fn test_kahan_sum_precision() {
        // A naive sum of 1e16 + 1.0 + (-1e16) loses the 1.0
        let result = kahan_sum(&[1e16, 1.0, -1e16]);
        assert!((result - 1.0).abs() < 1e-10, "got {result}");
    }

    // --- Welford ---

    #[test]
    fn test_welford_single_sample() {
        let mut acc = Welford::default();
        assert_eq!(acc.population_variance(), None);
        acc.push(5.0);
        assert_eq!(acc.sample_variance(), None);
        assert_eq!(acc.population_variance(), Some(0.0));
    }

    #[test]
    fn test_welford_large_offset() {
        // Naive Σx² − n·x̄² cancels catastrophically at this offset
        let data: Vec<f64> = (0..1000).map(|i| 1e9 + (i % 2) as f64).collect();
        assert!((population_variance(&data).unwrap() - 0.25).abs() < 1e-6);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn finite_vec(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(-1e6_f64..1e6, min_len..=max_len)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn variance_non_negative(data in finite_vec(2, 100)) {
            prop_assert!(variance(&data).unwrap() >= 0.0);
            prop_assert!(population_variance(&data).unwrap() >= 0.0);
        }

        #[test]
        fn mean_between_min_and_max(data in finite_vec(1, 100)) {
            let m = mean(&data).unwrap();
            let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let tol = 1e-9 * hi.abs().max(lo.abs()).max(1.0);
            prop_assert!(m >= lo - tol && m <= hi + tol);
        }

        #[test]
        fn correlation_bounded(x in finite_vec(3, 50), y in finite_vec(3, 50)) {
            let n = x.len().min(y.len());
            if let Some(r) = correlation(&x[..n], &y[..n]) {
                prop_assert!((-1.0..=1.0).contains(&r));
            }
        }
    }
}
