//! Poisson approximation to the binomial, by simulated coin flips.
//!
//! Each experiment flips a biased coin `n` times and counts heads, a
//! `Binomial(n, p)` draw. With `n·p = λ` held fixed and `p` small, the
//! counts are close to `Poisson(λ)`. [`compare_with_poisson`] lines the
//! empirical frequencies up against the Poisson mass function.

use rand::Rng;
use rand_distr::Distribution;
use tracing::{debug, warn};

use crate::distributions::{Binomial, Poisson};
use crate::error::{Error, Result};
use crate::random;
use crate::stats;

/// Largest number of unit bins a comparison will allocate.
const MAX_SUPPORT: u64 = 1 << 24;

/// Simulates `n_experiments` groups of `n_flips` coin flips and returns
/// the number of heads in each group.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if `n_experiments` is zero or
/// `p_head ∉ [0, 1]`.
///
/// # Examples
/// ```
/// use u_stochastic::poisson::simulate_coin_flips;
/// use u_stochastic::random::create_rng;
/// let mut rng = create_rng(42);
/// let heads = simulate_coin_flips(1000, 100, 0.08, &mut rng).unwrap();
/// assert_eq!(heads.len(), 1000);
/// assert!(heads.iter().all(|&h| h <= 100));
/// ```
pub fn simulate_coin_flips<R: Rng + ?Sized>(
    n_experiments: usize,
    n_flips: u64,
    p_head: f64,
    rng: &mut R,
) -> Result<Vec<u64>> {
    if n_experiments == 0 {
        return Err(Error::invalid(
            "n_experiments must be a positive integer, got 0",
        ));
    }
    let dist = rand_distr::Binomial::new(n_flips, p_head).map_err(|e| {
        Error::invalid(format!("p_head must be in [0, 1], got {p_head} ({e})"))
    })?;
    debug!(n_experiments, n_flips, p_head, "simulating coin flips");
    Ok((0..n_experiments).map(|_| dist.sample(rng)).collect())
}

/// Empirical head counts next to the Poisson mass function.
///
/// Index `i` of each vector refers to the count `support[i]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoissonComparison {
    pub lambda: f64,
    pub experiments: usize,
    /// Head counts `0, 1, …`, covering every observed value.
    pub support: Vec<u64>,
    /// Fraction of experiments with each head count.
    pub empirical: Vec<f64>,
    /// Poisson(λ) probability of each head count.
    pub theoretical: Vec<f64>,
    /// `|empirical − theoretical| / theoretical` where both are positive,
    /// otherwise 0.
    pub relative_error: Vec<f64>,
    pub sim_mean: f64,
    pub sim_variance: f64,
}

impl PoissonComparison {
    /// Absolute error of the simulated mean against λ.
    pub fn mean_error(&self) -> f64 {
        (self.sim_mean - self.lambda).abs()
    }

    /// Absolute error of the simulated variance against λ.
    pub fn variance_error(&self) -> f64 {
        (self.sim_variance - self.lambda).abs()
    }

    /// Total variation distance between the empirical and Poisson
    /// frequencies over the support.
    pub fn total_variation(&self) -> f64 {
        0.5 * self
            .empirical
            .iter()
            .zip(&self.theoretical)
            .map(|(e, t)| (e - t).abs())
            .sum::<f64>()
    }
}

/// Compares simulated head counts with `Poisson(lambda)`.
///
/// The support runs over `0..max_l − 1` with
/// `max_l = max(⌊2.5λ⌋, max(results) + 2)`; each count gets a unit-width
/// bin normalized by the number of experiments.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if `results` is empty, `lambda`
/// is not a valid Poisson rate, or the support would exceed 2²⁴ bins.
pub fn compare_with_poisson(results: &[u64], lambda: f64) -> Result<PoissonComparison> {
    let poisson = Poisson::new(lambda)?;
    let Some(&max_result) = results.iter().max() else {
        warn!("no experiments to compare against the Poisson distribution");
        return Err(Error::invalid("results must not be empty"));
    };

    let lambda_extent = (2.5 * lambda).floor();
    if lambda_extent > MAX_SUPPORT as f64 {
        return Err(Error::invalid(format!(
            "lambda {lambda} needs more than {MAX_SUPPORT} bins"
        )));
    }
    let max_l = max_result
        .checked_add(2)
        .filter(|&l| l <= MAX_SUPPORT)
        .ok_or_else(|| {
            Error::invalid(format!(
                "head count {max_result} needs more than {MAX_SUPPORT} bins"
            ))
        })?
        .max(lambda_extent as u64);
    let bins = (max_l - 1) as usize;
    let mut counts = vec![0_u64; bins];
    for &r in results {
        counts[r as usize] += 1;
    }

    let n = results.len() as f64;
    let support: Vec<u64> = (0..bins as u64).collect();
    let empirical: Vec<f64> = counts.iter().map(|&c| c as f64 / n).collect();
    let theoretical = poisson.pmf_table(bins);
    let relative_error = empirical
        .iter()
        .zip(&theoretical)
        .map(|(&e, &t)| {
            if e > 0.0 && t > 0.0 {
                (e - t).abs() / t
            } else {
                0.0
            }
        })
        .collect();

    let as_f64: Vec<f64> = results.iter().map(|&r| r as f64).collect();
    let sim_mean = stats::mean(&as_f64).unwrap_or(f64::NAN);
    let sim_variance = stats::population_variance(&as_f64).unwrap_or(f64::NAN);

    Ok(PoissonComparison {
        lambda,
        experiments: results.len(),
        support,
        empirical,
        theoretical,
        relative_error,
        sim_mean,
        sim_variance,
    })
}

/// A complete coin-flip experiment: `n_experiments` groups of
/// `round(λ / p_head)` flips each.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoissonExperiment {
    pub n_experiments: usize,
    pub lambda: f64,
    pub p_head: f64,
    pub seed: Option<u64>,
}

impl Default for PoissonExperiment {
    fn default() -> Self {
        Self {
            n_experiments: 10_000,
            lambda: 8.0,
            p_head: 0.08,
            seed: None,
        }
    }
}

impl PoissonExperiment {
    /// Flips per experiment, `round(λ / p_head)`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `p_head ∉ (0, 1]`, `λ` is not
    /// positive, or the ratio rounds to zero.
    pub fn n_flips(&self) -> Result<u64> {
        if !(self.p_head > 0.0 && self.p_head <= 1.0) {
            return Err(Error::invalid(format!(
                "p_head must be in (0, 1], got {}",
                self.p_head
            )));
        }
        if !(self.lambda.is_finite() && self.lambda > 0.0) {
            return Err(Error::invalid(format!(
                "lambda must be finite and positive, got {}",
                self.lambda
            )));
        }
        let flips = (self.lambda / self.p_head).round();
        if flips < 1.0 {
            return Err(Error::invalid(format!(
                "lambda / p_head must round to at least one flip, got {flips}"
            )));
        }
        Ok(flips as u64)
    }

    /// The exact law of a single experiment's head count.
    pub fn exact_distribution(&self) -> Result<Binomial> {
        Binomial::new(self.n_flips()?, self.p_head)
    }

    /// Runs the experiment with a generator seeded from `seed`.
    ///
    /// # Examples
    /// ```
    /// use u_stochastic::poisson::PoissonExperiment;
    /// let experiment = PoissonExperiment { seed: Some(42), ..Default::default() };
    /// let cmp = experiment.run().unwrap();
    /// assert!(cmp.mean_error() < 0.2);
    /// ```
    pub fn run(&self) -> Result<PoissonComparison> {
        let mut rng = random::rng_from_seed(self.seed);
        self.run_with(&mut rng)
    }

    /// Runs the experiment with a caller-owned generator.
    pub fn run_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PoissonComparison> {
        let n_flips = self.n_flips()?;
        let results = simulate_coin_flips(self.n_experiments, n_flips, self.p_head, rng)?;
        compare_with_poisson(&results, self.lambda)
    }
}
