//! Symmetric random walks on the two-dimensional integer lattice.
//!
//! Each step moves one unit along x and, independently, one unit along y,
//! each direction `+1` or `-1` with probability ½. After `n` steps each
//! coordinate has mean 0 and variance `n`, so the endpoint cloud spreads
//! as `√n` and `E[x² + y²] = 2n`.
//!
//! # Sampling
//!
//! [`WalkSampler`] draws all steps for all trials of one axis as a flat
//! buffer of random words (one bit per step) and reduces each trial by
//! popcount. The buffer holds a bounded block of trials at a time, so
//! memory does not grow with `trial_count × step_count`.
//!
//! # Reproducibility
//!
//! A sampler built from a seeded [`WalkConfig`] reseeds its generator on
//! every call to [`WalkSampler::sample`], so repeated calls return
//! identical output. Use [`WalkSampler::sample_with`] to thread a
//! caller-owned generator instead.

use rand::Rng;
use tracing::debug;

use crate::distributions::Normal;
use crate::error::{Error, Result};
use crate::random::{self, STEPS_PER_WORD};
use crate::stats;

/// Upper bound on the number of random words buffered at once (512 KiB).
const BLOCK_WORDS: usize = 1 << 16;

/// Seeds used by [`trace_many`] callers that want the classic four-panel
/// comparison of independent walks.
pub const DEFAULT_TRACE_SEEDS: [u64; 4] = [42, 43, 44, 45];

// ============================================================================
// Configuration
// ============================================================================

/// Parameters of one batch of random walks.
///
/// Both counts must be positive; [`WalkConfig::validate`] (called by every
/// constructor and by [`WalkSampler::new`]) rejects zero before any
/// sampling happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WalkConfig {
    /// Steps per walk.
    pub step_count: usize,
    /// Independent walks per batch.
    pub trial_count: usize,
    /// Seed for the generator; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            step_count: 1000,
            trial_count: 1000,
            seed: None,
        }
    }
}

impl WalkConfig {
    /// Creates an unseeded configuration.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if either count is zero.
    ///
    /// # Examples
    /// ```
    /// use u_stochastic::walk::WalkConfig;
    /// let config = WalkConfig::new(1000, 500).unwrap().with_seed(42);
    /// assert_eq!(config.seed, Some(42));
    /// assert!(WalkConfig::new(0, 500).is_err());
    /// ```
    pub fn new(step_count: usize, trial_count: usize) -> Result<Self> {
        let config = Self {
            step_count,
            trial_count,
            seed: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Creates a configuration from signed counts, as produced by parsers
    /// or foreign callers.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if either count is zero or
    /// negative.
    pub fn from_signed(step_count: i64, trial_count: i64) -> Result<Self> {
        let step_count = usize::try_from(step_count).map_err(|_| {
            Error::invalid(format!("step_count must be a positive integer, got {step_count}"))
        })?;
        let trial_count = usize::try_from(trial_count).map_err(|_| {
            Error::invalid(format!(
                "trial_count must be a positive integer, got {trial_count}"
            ))
        })?;
        Self::new(step_count, trial_count)
    }

    /// Returns the configuration with `seed` set.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that both counts are positive.
    pub fn validate(&self) -> Result<()> {
        if self.step_count == 0 {
            return Err(Error::invalid("step_count must be a positive integer, got 0"));
        }
        if self.trial_count == 0 {
            return Err(Error::invalid("trial_count must be a positive integer, got 0"));
        }
        Ok(())
    }
}

// ============================================================================
// Displacements
// ============================================================================

/// Final displacements of a batch of walks, one `(x, y)` pair per trial.
///
/// Produced only by [`WalkSampler`]; immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Displacements {
    step_count: usize,
    x: Vec<i64>,
    y: Vec<i64>,
}

impl Displacements {
    /// Steps per walk that produced these displacements.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Final x displacement of each trial.
    pub fn x(&self) -> &[i64] {
        &self.x
    }

    /// Final y displacement of each trial.
    pub fn y(&self) -> &[i64] {
        &self.y
    }

    /// Number of trials.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always `false` for displacements produced by a sampler.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterates over `(x, y)` endpoint pairs.
    pub fn endpoints(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// x displacements as floating point, for the [`stats`] functions.
    pub fn x_f64(&self) -> Vec<f64> {
        self.x.iter().map(|&v| v as f64).collect()
    }

    /// y displacements as floating point, for the [`stats`] functions.
    pub fn y_f64(&self) -> Vec<f64> {
        self.y.iter().map(|&v| v as f64).collect()
    }

    /// Consumes the value, returning the `(x, y)` sequences.
    pub fn into_parts(self) -> (Vec<i64>, Vec<i64>) {
        (self.x, self.y)
    }

    /// Largest absolute coordinate over all endpoints.
    pub fn max_extent(&self) -> i64 {
        self.x
            .iter()
            .chain(self.y.iter())
            .map(|v| v.abs())
            .max()
            .unwrap_or(0)
    }

    /// Mean squared distance from the origin, `mean(x² + y²)`.
    ///
    /// Returns `None` if there are no trials.
    pub fn mean_square_displacement(&self) -> Option<f64> {
        let squared: Vec<f64> = self
            .endpoints()
            .map(|(x, y)| (x as f64).powi(2) + (y as f64).powi(2))
            .collect();
        stats::mean(&squared)
    }

    /// Reduces the endpoints to summary statistics next to their
    /// theoretical values.
    ///
    /// Returns `None` if there are no trials.
    pub fn summarize(&self) -> Option<EndpointSummary> {
        let xs = self.x_f64();
        let ys = self.y_f64();
        Some(EndpointSummary {
            walks: self.len(),
            step_count: self.step_count,
            mean_x: stats::mean(&xs)?,
            mean_y: stats::mean(&ys)?,
            variance_x: stats::population_variance(&xs)?,
            variance_y: stats::population_variance(&ys)?,
            correlation: stats::correlation(&xs, &ys),
        })
    }
}

/// Empirical endpoint statistics of a batch of walks.
///
/// Variances use the population estimator (denominator `n`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndpointSummary {
    pub walks: usize,
    pub step_count: usize,
    pub mean_x: f64,
    pub mean_y: f64,
    pub variance_x: f64,
    pub variance_y: f64,
    /// Pearson correlation between x and y; `None` for fewer than two
    /// walks or a constant axis.
    pub correlation: Option<f64>,
}

impl EndpointSummary {
    /// Expected mean of either coordinate.
    pub fn theoretical_mean(&self) -> f64 {
        0.0
    }

    /// Expected variance of either coordinate: one unit per step.
    pub fn theoretical_variance(&self) -> f64 {
        self.step_count as f64
    }

    /// Limiting distribution of either coordinate, `N(0, step_count)`.
    ///
    /// # Errors
    /// Never fails for a summary built from a sampler, since
    /// `step_count > 0`.
    pub fn theoretical_distribution(&self) -> Result<Normal> {
        Normal::new(0.0, self.theoretical_variance().sqrt())
    }
}

// ============================================================================
// Sampler
// ============================================================================

/// Draws final displacements for a validated [`WalkConfig`].
///
/// # Examples
/// ```
/// use u_stochastic::walk::{WalkConfig, WalkSampler};
/// let config = WalkConfig::new(100, 1000).unwrap().with_seed(7);
/// let sampler = WalkSampler::new(config).unwrap();
/// let first = sampler.sample();
/// assert_eq!(first.len(), 1000);
/// assert_eq!(first, sampler.sample());
/// ```
#[derive(Debug, Clone)]
pub struct WalkSampler {
    config: WalkConfig,
}

impl WalkSampler {
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `config` fails validation.
    pub fn new(config: WalkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration this sampler draws from.
    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Samples with a generator seeded from the configuration.
    ///
    /// The generator is created afresh on each call: seeded configurations
    /// reproduce their output exactly, unseeded ones draw new entropy.
    pub fn sample(&self) -> Displacements {
        let mut rng = random::rng_from_seed(self.config.seed);
        self.sample_with(&mut rng)
    }

    /// Samples with a caller-owned generator, ignoring the configured seed.
    ///
    /// All x-axis trials are drawn before all y-axis trials.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Displacements {
        let WalkConfig {
            step_count,
            trial_count,
            seed,
        } = self.config;
        debug!(step_count, trial_count, seeded = seed.is_some(), "sampling walk endpoints");

        let x = axis_finals(step_count, trial_count, rng);
        let y = axis_finals(step_count, trial_count, rng);

        debug!(
            draws = (2 * step_count as u64).saturating_mul(trial_count as u64),
            "walk endpoints sampled"
        );
        Displacements { step_count, x, y }
    }
}

/// Sums `step_count` ±1 steps for each of `trial_count` trials along one
/// axis. Both counts are positive.
fn axis_finals<R: Rng + ?Sized>(step_count: usize, trial_count: usize, rng: &mut R) -> Vec<i64> {
    let words_per_trial = step_count.div_ceil(STEPS_PER_WORD);
    let tail_bits = step_count % STEPS_PER_WORD;
    let tail_mask = if tail_bits == 0 {
        u64::MAX
    } else {
        (1_u64 << tail_bits) - 1
    };
    let trials_per_block = (BLOCK_WORDS / words_per_trial).clamp(1, trial_count);

    let mut buffer = vec![0_u64; trials_per_block * words_per_trial];
    let mut finals = Vec::with_capacity(trial_count);
    let mut remaining = trial_count;

    while remaining > 0 {
        let block = remaining.min(trials_per_block);
        let words = &mut buffer[..block * words_per_trial];
        rng.fill(&mut *words);
        tracing::trace!(trials = block, words = words.len(), "reducing sample block");

        finals.extend(words.chunks_exact(words_per_trial).map(|trial| {
            let last = trial.len() - 1;
            let ones: u64 = trial
                .iter()
                .enumerate()
                .map(|(i, &w)| {
                    let w = if i == last { w & tail_mask } else { w };
                    u64::from(w.count_ones())
                })
                .sum();
            // ones steps of +1, the rest -1
            2 * ones as i64 - step_count as i64
        }));
        remaining -= block;
    }
    finals
}

/// Samples final displacements of `trial_count` walks of `step_count` steps.
///
/// Convenience wrapper over [`WalkSampler`].
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if either count is zero.
///
/// # Examples
/// ```
/// use u_stochastic::walk::random_walk_finals;
/// let d = random_walk_finals(1, 100, Some(3)).unwrap();
/// assert!(d.x().iter().all(|&v| v == 1 || v == -1));
/// ```
pub fn random_walk_finals(
    step_count: usize,
    trial_count: usize,
    seed: Option<u64>,
) -> Result<Displacements> {
    let config = WalkConfig {
        step_count,
        trial_count,
        seed,
    };
    Ok(WalkSampler::new(config)?.sample())
}

// ============================================================================
// Traces
// ============================================================================

/// The full path of a single walk: coordinates after each step.
///
/// The origin is not included, so a trace of `n` steps has `n` points and
/// its last point is the walk's final displacement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Trace {
    x: Vec<i64>,
    y: Vec<i64>,
}

impl Trace {
    /// x coordinate after each step.
    pub fn x(&self) -> &[i64] {
        &self.x
    }

    /// y coordinate after each step.
    pub fn y(&self) -> &[i64] {
        &self.y
    }

    /// Number of recorded points, equal to the step count.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always `false` for a trace of at least one step.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterates over the visited points in order.
    pub fn points(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Position after the first step.
    pub fn start(&self) -> Option<(i64, i64)> {
        self.points().next()
    }

    /// Position after the last step.
    pub fn end(&self) -> Option<(i64, i64)> {
        Some((*self.x.last()?, *self.y.last()?))
    }

    /// Largest absolute coordinate visited.
    pub fn max_extent(&self) -> i64 {
        self.x
            .iter()
            .chain(self.y.iter())
            .map(|v| v.abs())
            .max()
            .unwrap_or(0)
    }
}

fn cumulative(steps: &[i8]) -> Vec<i64> {
    steps
        .iter()
        .scan(0_i64, |pos, &s| {
            *pos += i64::from(s);
            Some(*pos)
        })
        .collect()
}

/// Records the path of one walk of `step_count` steps.
///
/// Consumes the generator in the same order as a one-trial
/// [`WalkSampler`], so both agree on the endpoint for the same seed.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if `step_count` is zero.
pub fn trace<R: Rng + ?Sized>(step_count: usize, rng: &mut R) -> Result<Trace> {
    if step_count == 0 {
        return Err(Error::invalid("step_count must be a positive integer, got 0"));
    }
    let x_steps = random::random_signs(step_count, rng);
    let y_steps = random::random_signs(step_count, rng);
    Ok(Trace {
        x: cumulative(&x_steps),
        y: cumulative(&y_steps),
    })
}

/// Records one walk with a generator built from `seed`.
///
/// # Examples
/// ```
/// use u_stochastic::walk::trace_seeded;
/// let t = trace_seeded(1000, Some(42)).unwrap();
/// assert_eq!(t.len(), 1000);
/// assert_eq!(t, trace_seeded(1000, Some(42)).unwrap());
/// ```
pub fn trace_seeded(step_count: usize, seed: Option<u64>) -> Result<Trace> {
    let mut rng = random::rng_from_seed(seed);
    trace(step_count, &mut rng)
}

/// Records one walk per seed, each with its own freshly seeded generator.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if `step_count` is zero.
pub fn trace_many(step_count: usize, seeds: &[u64]) -> Result<Vec<Trace>> {
    debug!(step_count, walks = seeds.len(), "tracing walks");
    seeds
        .iter()
        .map(|&seed| trace_seeded(step_count, Some(seed)))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // --- validation ---

    #[test]
    fn test_zero_steps_rejected() {
        let err = random_walk_finals(0, 10, None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_trials_rejected() {
        let err = random_walk_finals(10, 0, Some(1)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_negative_counts_rejected() {
        assert!(matches!(
            WalkConfig::from_signed(-5, 10),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            WalkConfig::from_signed(10, -1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(WalkConfig::from_signed(0, 10).is_err());
        assert_eq!(
            WalkConfig::from_signed(3, 4).unwrap(),
            WalkConfig::new(3, 4).unwrap()
        );
    }

    #[test]
    fn test_sampler_validates_public_fields() {
        let config = WalkConfig {
            step_count: 5,
            trial_count: 0,
            seed: None,
        };
        assert!(WalkSampler::new(config).is_err());
    }

    #[test]
    fn test_default_config() {
        let config = WalkConfig::default();
        assert_eq!(config.step_count, 1000);
        assert_eq!(config.trial_count, 1000);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    // --- shape and bounds ---

    #[test]
    fn test_lengths_match_trial_count() {
        let d = random_walk_finals(37, 250, Some(11)).unwrap();
        assert_eq!(d.len(), 250);
        assert_eq!(d.x().len(), 250);
        assert_eq!(d.y().len(), 250);
        assert_eq!(d.step_count(), 37);
    }

    #[test]
    fn test_single_step_never_zero() {
        let d = random_walk_finals(1, 5000, Some(8)).unwrap();
        assert!(d.endpoints().all(|(x, y)| x.abs() == 1 && y.abs() == 1));
        // both signs occur
        assert!(d.x().contains(&1) && d.x().contains(&-1));
    }

    #[test]
    fn test_parity_and_bounds_across_word_boundaries() {
        for &steps in &[63_usize, 64, 65, 127, 128, 129, 1000] {
            let d = random_walk_finals(steps, 200, Some(steps as u64)).unwrap();
            for (x, y) in d.endpoints() {
                for v in [x, y] {
                    assert!(v.unsigned_abs() as usize <= steps);
                    assert_eq!(v.rem_euclid(2) as usize, steps % 2);
                }
            }
        }
    }

    #[test]
    fn test_blocks_span_multiple_buffers() {
        // 2 words per trial, so BLOCK_WORDS / 2 trials per block
        let trials = BLOCK_WORDS / 2 + 17;
        let d = random_walk_finals(100, trials, Some(5)).unwrap();
        assert_eq!(d.len(), trials);
        assert!(d.x().iter().all(|v| v.abs() <= 100 && v % 2 == 0));
    }

    // --- determinism ---

    #[test]
    fn test_same_seed_identical() {
        let a = random_walk_finals(500, 300, Some(42)).unwrap();
        let b = random_walk_finals(500, 300, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = random_walk_finals(500, 300, Some(1)).unwrap();
        let b = random_walk_finals(500, 300, Some(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sample_reseeds_each_call() {
        let sampler = WalkSampler::new(WalkConfig::new(64, 10).unwrap().with_seed(9)).unwrap();
        assert_eq!(sampler.sample(), sampler.sample());
    }

    #[test]
    fn test_sample_with_matches_seeded_sample() {
        let sampler = WalkSampler::new(WalkConfig::new(200, 50).unwrap().with_seed(77)).unwrap();
        let mut rng = random::create_rng(77);
        assert_eq!(sampler.sample_with(&mut rng), sampler.sample());
    }

    #[test]
    fn test_sample_with_advances_caller_rng() {
        let sampler = WalkSampler::new(WalkConfig::new(200, 50).unwrap()).unwrap();
        let mut rng = random::create_rng(3);
        let first = sampler.sample_with(&mut rng);
        let second = sampler.sample_with(&mut rng);
        assert_ne!(first, second);
    }

    // --- statistics ---

    #[test]
    fn test_large_sample_moments() {
        let d = random_walk_finals(1000, 100_000, Some(42)).unwrap();
        let summary = d.summarize().unwrap();
        assert!(summary.mean_x.abs() < 1.0, "mean_x = {}", summary.mean_x);
        assert!(summary.mean_y.abs() < 1.0, "mean_y = {}", summary.mean_y);
        let rel_x = (summary.variance_x - 1000.0).abs() / 1000.0;
        let rel_y = (summary.variance_y - 1000.0).abs() / 1000.0;
        assert!(rel_x < 0.1, "variance_x = {}", summary.variance_x);
        assert!(rel_y < 0.1, "variance_y = {}", summary.variance_y);
        let r = summary.correlation.unwrap();
        assert!(r.abs() < 0.05, "correlation = {r}");
    }

    #[test]
    fn test_summary_theory() {
        let d = random_walk_finals(400, 10, Some(0)).unwrap();
        let summary = d.summarize().unwrap();
        assert_eq!(summary.walks, 10);
        assert_eq!(summary.theoretical_mean(), 0.0);
        assert_eq!(summary.theoretical_variance(), 400.0);
        let normal = summary.theoretical_distribution().unwrap();
        assert!((normal.sigma() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_trial_summary_has_no_correlation() {
        let d = random_walk_finals(10, 1, Some(0)).unwrap();
        let summary = d.summarize().unwrap();
        assert_eq!(summary.variance_x, 0.0);
        assert_eq!(summary.correlation, None);
    }

    #[test]
    fn test_mean_square_displacement_near_two_n() {
        let d = random_walk_finals(500, 20_000, Some(4)).unwrap();
        let msd = d.mean_square_displacement().unwrap();
        assert!((msd - 1000.0).abs() / 1000.0 < 0.05, "msd = {msd}");
    }

    #[test]
    fn test_max_extent() {
        let d = random_walk_finals(1, 10, Some(0)).unwrap();
        assert_eq!(d.max_extent(), 1);
    }

    // --- traces ---

    #[test]
    fn test_trace_rejects_zero_steps() {
        assert!(matches!(
            trace_seeded(0, Some(1)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_trace_moves_one_unit_per_step() {
        let t = trace_seeded(300, Some(12)).unwrap();
        assert_eq!(t.len(), 300);
        let (x0, y0) = t.start().unwrap();
        assert_eq!((x0.abs(), y0.abs()), (1, 1));
        for w in t.x().windows(2).chain(t.y().windows(2)) {
            assert_eq!((w[1] - w[0]).abs(), 1);
        }
        assert!(t.max_extent() <= 300);
    }

    #[test]
    fn test_trace_end_matches_single_trial_sample() {
        for &steps in &[1_usize, 64, 100, 1000] {
            let t = trace_seeded(steps, Some(42)).unwrap();
            let d = random_walk_finals(steps, 1, Some(42)).unwrap();
            assert_eq!(t.end(), Some((d.x()[0], d.y()[0])), "steps = {steps}");
        }
    }

    #[test]
    fn test_trace_many_uses_independent_seeds() {
        let traces = trace_many(1000, &DEFAULT_TRACE_SEEDS).unwrap();
        assert_eq!(traces.len(), 4);
        assert_eq!(traces[0], trace_seeded(1000, Some(42)).unwrap());
        assert_ne!(traces[0], traces[1]);
    }
}
