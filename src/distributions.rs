//! Theoretical distributions the simulations are compared against.
//!
//! | Distribution | Parameters | Mean | Variance | Compared with |
//! |---|---|---|---|---|
//! | [`Normal`] | μ, σ | μ | σ² | walk endpoint coordinates |
//! | [`Binomial`] | n, p | np | np(1−p) | heads per coin-flip experiment |
//! | [`Poisson`] | λ | λ | λ | heads per experiment, as n → ∞ |
//! | [`Geometric`] | p | (1−p)/p | (1−p)/p² | tails between consecutive heads |
//!
//! Discrete mass functions are evaluated in log space so that large
//! supports do not overflow the intermediate factorials.

use crate::error::{Error, Result};
use crate::special;

// ============================================================================
// Normal Distribution
// ============================================================================

/// Normal (Gaussian) distribution N(μ, σ²).
///
/// By the central limit theorem a walk of `n` unit steps has an endpoint
/// coordinate approximately `N(0, n)`.
///
/// # Examples
/// ```
/// use u_stochastic::distributions::Normal;
/// let n = Normal::new(0.0, 1000.0_f64.sqrt()).unwrap();
/// assert!((n.variance() - 1000.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// Creates a new normal distribution N(μ, σ).
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `sigma ≤ 0` or parameters are
    /// not finite.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        if !mu.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
            return Err(Error::invalid(format!(
                "Normal requires finite μ and σ > 0, got μ={mu}, σ={sigma}"
            )));
        }
        Ok(Self { mu, sigma })
    }

    /// Location μ.
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Scale σ.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Mean = μ.
    pub fn mean(&self) -> f64 {
        self.mu
    }

    /// Variance = σ².
    pub fn variance(&self) -> f64 {
        self.sigma * self.sigma
    }

    /// PDF: (1/(σ√(2π))) exp(−(x−μ)²/(2σ²)).
    pub fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        special::standard_normal_pdf(z) / self.sigma
    }

    /// CDF: Φ((x−μ)/σ).
    pub fn cdf(&self, x: f64) -> f64 {
        special::standard_normal_cdf((x - self.mu) / self.sigma)
    }

    /// Inverse CDF: μ + σ·Φ⁻¹(p). Returns `None` if `p ∉ (0, 1)`.
    pub fn quantile(&self, p: f64) -> Option<f64> {
        if p <= 0.0 || p >= 1.0 {
            return None;
        }
        Some(self.mu + self.sigma * special::inverse_normal_cdf(p))
    }

    /// Evaluates the density on `points` evenly spaced values over
    /// `[lo, hi]`, for overlaying a histogram.
    ///
    /// Returns an empty vector if `points == 0`, and a single point at
    /// `lo` if `points == 1`.
    pub fn density_curve(&self, lo: f64, hi: f64, points: usize) -> Vec<(f64, f64)> {
        match points {
            0 => Vec::new(),
            1 => vec![(lo, self.pdf(lo))],
            _ => {
                let step = (hi - lo) / (points - 1) as f64;
                (0..points)
                    .map(|i| {
                        let x = lo + step * i as f64;
                        (x, self.pdf(x))
                    })
                    .collect()
            }
        }
    }
}

// ============================================================================
// Binomial Distribution
// ============================================================================

/// Binomial distribution: number of successes in `n` Bernoulli(`p`) trials.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binomial {
    n: u64,
    p: f64,
}

impl Binomial {
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `p ∉ [0, 1]`.
    pub fn new(n: u64, p: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::invalid(format!(
                "Binomial requires p in [0, 1], got p={p}"
            )));
        }
        Ok(Self { n, p })
    }

    /// Number of trials.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Success probability per trial.
    pub fn p(&self) -> f64 {
        self.p
    }

    /// Mean = np.
    pub fn mean(&self) -> f64 {
        self.n as f64 * self.p
    }

    /// Variance = np(1 − p).
    pub fn variance(&self) -> f64 {
        self.n as f64 * self.p * (1.0 - self.p)
    }

    /// P(X = k) = C(n, k) pᵏ (1−p)ⁿ⁻ᵏ.
    pub fn pmf(&self, k: u64) -> f64 {
        if k > self.n {
            return 0.0;
        }
        // Degenerate endpoints, where ln(0) would produce NaN
        if self.p == 0.0 {
            return if k == 0 { 1.0 } else { 0.0 };
        }
        if self.p == 1.0 {
            return if k == self.n { 1.0 } else { 0.0 };
        }
        let ln_p = special::ln_choose(self.n, k)
            + k as f64 * self.p.ln()
            + (self.n - k) as f64 * (1.0 - self.p).ln();
        ln_p.exp()
    }
}

// ============================================================================
// Poisson Distribution
// ============================================================================

/// Poisson distribution with rate λ.
///
/// The limit of `Binomial(n, λ/n)` as `n → ∞`; the coin-flip experiments
/// measure how close a finite `n` already is.
///
/// # Examples
/// ```
/// use u_stochastic::distributions::Poisson;
/// let p = Poisson::new(8.0).unwrap();
/// let total: f64 = p.pmf_table(60).iter().sum();
/// assert!((total - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Poisson {
    lambda: f64,
}

impl Poisson {
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `lambda` is not finite and
    /// positive.
    pub fn new(lambda: f64) -> Result<Self> {
        if !lambda.is_finite() || lambda <= 0.0 {
            return Err(Error::invalid(format!(
                "Poisson requires finite λ > 0, got λ={lambda}"
            )));
        }
        Ok(Self { lambda })
    }

    /// Rate λ.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Mean = λ.
    pub fn mean(&self) -> f64 {
        self.lambda
    }

    /// Variance = λ.
    pub fn variance(&self) -> f64 {
        self.lambda
    }

    /// P(X = k) = λᵏ e^(−λ) / k!, evaluated as exp(k ln λ − λ − ln k!).
    pub fn pmf(&self, k: u64) -> f64 {
        (k as f64 * self.lambda.ln() - self.lambda - special::ln_factorial(k)).exp()
    }

    /// P(X ≤ k).
    pub fn cdf(&self, k: u64) -> f64 {
        (0..=k).map(|i| self.pmf(i)).sum::<f64>().min(1.0)
    }

    /// Mass function over `0..max_l`.
    pub fn pmf_table(&self, max_l: usize) -> Vec<f64> {
        (0..max_l as u64).map(|k| self.pmf(k)).collect()
    }

    /// Default extent of a pmf plot: ⌊2λ + 10⌋.
    pub fn default_support_len(&self) -> usize {
        (2.0 * self.lambda + 10.0) as usize
    }
}

// ============================================================================
// Geometric Distribution
// ============================================================================

/// Geometric distribution counting failures before the first success.
///
/// With success probability `p`, the number of tails between two heads
/// follows `P(K = k) = (1−p)ᵏ p` for `k = 0, 1, 2, …`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometric {
    p: f64,
}

impl Geometric {
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `p ∉ (0, 1]`.
    pub fn new(p: f64) -> Result<Self> {
        if !(p > 0.0 && p <= 1.0) {
            return Err(Error::invalid(format!(
                "Geometric requires p in (0, 1], got p={p}"
            )));
        }
        Ok(Self { p })
    }

    /// Success probability.
    pub fn p(&self) -> f64 {
        self.p
    }

    /// Mean = (1 − p) / p.
    pub fn mean(&self) -> f64 {
        (1.0 - self.p) / self.p
    }

    /// Variance = (1 − p) / p².
    pub fn variance(&self) -> f64 {
        (1.0 - self.p) / (self.p * self.p)
    }

    /// P(K = k) = (1−p)ᵏ p.
    pub fn pmf(&self, k: u64) -> f64 {
        if self.p == 1.0 {
            return if k == 0 { 1.0 } else { 0.0 };
        }
        (k as f64 * (1.0 - self.p).ln()).exp() * self.p
    }

    /// P(K ≤ k) = 1 − (1−p)^(k+1).
    pub fn cdf(&self, k: u64) -> f64 {
        1.0 - (1.0 - self.p).powf(k as f64 + 1.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
