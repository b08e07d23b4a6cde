//! Mean-square displacement (MSD) of the lattice walk against step count.
//!
//! For the two-dimensional ±1 walk, `E[x² + y²] = 2N`, so the MSD grows
//! linearly in the number of steps `N`. [`analyze_step_dependence`] samples
//! the MSD at several step counts and fits the slope `k` of `MSD = k·N`
//! through the origin; the fitted `k` should approach
//! [`THEORETICAL_SLOPE`].

use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::random;
use crate::walk::{WalkConfig, WalkSampler};

/// Slope of `MSD = k·N` for the two-dimensional walk with unit steps.
pub const THEORETICAL_SLOPE: f64 = 2.0;

/// Step counts and sample size of an MSD sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MsdConfig {
    /// Walk lengths at which the MSD is measured.
    pub step_values: Vec<usize>,
    /// Walks averaged per step count.
    pub trial_count: usize,
    /// Seed for the whole sweep; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for MsdConfig {
    fn default() -> Self {
        Self {
            step_values: vec![1000, 2000, 3000, 4000],
            trial_count: 1000,
            seed: None,
        }
    }
}

/// One measured point of the sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MsdPoint {
    pub steps: usize,
    pub msd: f64,
}

/// A sweep together with its least-squares slope.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MsdAnalysis {
    pub points: Vec<MsdPoint>,
    /// Fitted `k` in `MSD = k·N`.
    pub slope: f64,
}

impl MsdAnalysis {
    /// Fitted MSD `k·N` at each measured step count.
    pub fn fitted(&self) -> Vec<f64> {
        self.points
            .iter()
            .map(|p| self.slope * p.steps as f64)
            .collect()
    }

    /// Relative deviation of the fitted slope from [`THEORETICAL_SLOPE`].
    pub fn slope_error(&self) -> f64 {
        (self.slope - THEORETICAL_SLOPE).abs() / THEORETICAL_SLOPE
    }
}

/// Measures the MSD at each of `step_values`, averaging `trial_count` walks.
///
/// Walks for successive step counts continue drawing from `rng`.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if `step_values` is empty, contains
/// zero, or `trial_count` is zero.
pub fn mean_square_displacement<R: Rng + ?Sized>(
    step_values: &[usize],
    trial_count: usize,
    rng: &mut R,
) -> Result<Vec<MsdPoint>> {
    if step_values.is_empty() {
        return Err(Error::invalid("step_values must not be empty"));
    }
    // Validate every configuration before drawing anything.
    let samplers = step_values
        .iter()
        .map(|&steps| WalkSampler::new(WalkConfig::new(steps, trial_count)?))
        .collect::<Result<Vec<_>>>()?;

    samplers
        .iter()
        .map(|sampler| {
            let steps = sampler.config().step_count;
            let msd = sampler
                .sample_with(rng)
                .mean_square_displacement()
                .ok_or_else(|| Error::invalid("trial_count must be a positive integer"))?;
            debug!(steps, msd, "measured mean-square displacement");
            Ok(MsdPoint { steps, msd })
        })
        .collect()
}

/// Least-squares slope of `msd = k·steps` through the origin:
/// `k = Σ N·msd / Σ N²`.
///
/// # Returns
/// - `None` if `points` is empty, all step counts are zero, or any MSD is
///   not finite.
///
/// # Examples
/// ```
/// use u_stochastic::msd::{fit_through_origin, MsdPoint};
/// let points = [
///     MsdPoint { steps: 10, msd: 20.0 },
///     MsdPoint { steps: 20, msd: 40.0 },
/// ];
/// assert!((fit_through_origin(&points).unwrap() - 2.0).abs() < 1e-12);
/// ```
pub fn fit_through_origin(points: &[MsdPoint]) -> Option<f64> {
    if points.is_empty() || !points.iter().all(|p| p.msd.is_finite()) {
        return None;
    }
    let (num, den) = points.iter().fold((0.0, 0.0), |(num, den), p| {
        let n = p.steps as f64;
        (num + n * p.msd, den + n * n)
    });
    (den > 0.0).then(|| num / den)
}

/// Runs the sweep described by `config` and fits its slope.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] under the conditions of
/// [`mean_square_displacement`].
///
/// # Examples
/// ```
/// use u_stochastic::msd::{analyze_step_dependence, MsdConfig};
/// let config = MsdConfig { seed: Some(42), ..MsdConfig::default() };
/// let analysis = analyze_step_dependence(&config).unwrap();
/// assert_eq!(analysis.points.len(), 4);
/// assert!(analysis.slope_error() < 0.1);
/// ```
pub fn analyze_step_dependence(config: &MsdConfig) -> Result<MsdAnalysis> {
    let mut rng = random::rng_from_seed(config.seed);
    let points = mean_square_displacement(&config.step_values, config.trial_count, &mut rng)?;
    let slope = fit_through_origin(&points)
        .ok_or_else(|| Error::invalid("step_values must contain a positive step count"))?;
    debug!(slope, points = points.len(), "fitted MSD slope");
    Ok(MsdAnalysis { points, slope })
}
