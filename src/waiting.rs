//! Waiting times between rare events in a coin-flip sequence.
//!
//! In a sequence of independent Bernoulli(`p`) flips, the number of tails
//! between two consecutive heads is `Geometric(p)`: the discrete analogue
//! of exponential inter-arrival times.

use rand::Rng;
use tracing::{debug, warn};

use crate::distributions::Geometric;
use crate::error::{Error, Result};
use crate::random;
use crate::stats;

/// Largest number of unit bins a comparison will allocate.
const MAX_SUPPORT: u64 = 1 << 24;

/// Flips a coin with head probability `p_head` `n_flips` times
/// (`true` = head).
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if `p_head ∉ [0, 1]`.
pub fn generate_coin_sequence<R: Rng + ?Sized>(
    n_flips: usize,
    p_head: f64,
    rng: &mut R,
) -> Result<Vec<bool>> {
    random::bernoulli_flips(n_flips, p_head, rng)
}

/// Counts the tails between each pair of consecutive heads.
///
/// Tails before the first head and after the last head are not waiting
/// times; a sequence with fewer than two heads yields none.
///
/// # Examples
/// ```
/// use u_stochastic::waiting::calculate_waiting_times;
/// let seq = [false, true, false, false, true, true, false];
/// assert_eq!(calculate_waiting_times(&seq), vec![2, 0]);
/// ```
pub fn calculate_waiting_times(sequence: &[bool]) -> Vec<u64> {
    let heads: Vec<usize> = sequence
        .iter()
        .enumerate()
        .filter_map(|(i, &head)| head.then_some(i))
        .collect();
    heads
        .windows(2)
        .map(|pair| (pair[1] - pair[0] - 1) as u64)
        .collect()
}

/// Observed waiting times next to the geometric mass function.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitingTimeComparison {
    pub p_head: f64,
    pub samples: usize,
    /// Waiting times `0..=max(observed)`.
    pub support: Vec<u64>,
    /// Fraction of waiting times equal to each support value.
    pub empirical: Vec<f64>,
    /// `Geometric(p_head)` probability of each support value.
    pub theoretical: Vec<f64>,
    pub sim_mean: f64,
    pub sim_variance: f64,
    pub theoretical_mean: f64,
    pub theoretical_variance: f64,
}

/// Compares observed waiting times with `Geometric(p_head)`.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if `waits` is empty,
/// `p_head ∉ (0, 1]`, or the longest wait would need more than 2²⁴ bins.
pub fn compare_with_geometric(waits: &[u64], p_head: f64) -> Result<WaitingTimeComparison> {
    let geometric = Geometric::new(p_head)?;
    let Some(&max_wait) = waits.iter().max() else {
        warn!(p_head, "no waiting times to compare; fewer than two heads observed");
        return Err(Error::invalid("waits must not be empty"));
    };

    let bins = max_wait
        .checked_add(1)
        .filter(|&len| len <= MAX_SUPPORT)
        .ok_or_else(|| {
            Error::invalid(format!("wait {max_wait} needs more than {MAX_SUPPORT} bins"))
        })?;
    let mut counts = vec![0_u64; bins as usize];
    for &w in waits {
        counts[w as usize] += 1;
    }
    let n = waits.len() as f64;
    let as_f64: Vec<f64> = waits.iter().map(|&w| w as f64).collect();

    Ok(WaitingTimeComparison {
        p_head,
        samples: waits.len(),
        support: (0..=max_wait).collect(),
        empirical: counts.iter().map(|&c| c as f64 / n).collect(),
        theoretical: (0..=max_wait).map(|k| geometric.pmf(k)).collect(),
        sim_mean: stats::mean(&as_f64).unwrap_or(f64::NAN),
        sim_variance: stats::population_variance(&as_f64).unwrap_or(f64::NAN),
        theoretical_mean: geometric.mean(),
        theoretical_variance: geometric.variance(),
    })
}

/// Generates a flip sequence, extracts its waiting times, and compares
/// them with the geometric law.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if `p_head ∉ (0, 1]` or the sequence
/// contains fewer than two heads.
///
/// # Examples
/// ```
/// use u_stochastic::random::create_rng;
/// use u_stochastic::waiting::simulate_waiting_times;
/// let mut rng = create_rng(42);
/// let cmp = simulate_waiting_times(100_000, 0.08, &mut rng).unwrap();
/// assert!((cmp.sim_mean - cmp.theoretical_mean).abs() < 0.5);
/// ```
pub fn simulate_waiting_times<R: Rng + ?Sized>(
    n_flips: usize,
    p_head: f64,
    rng: &mut R,
) -> Result<WaitingTimeComparison> {
    let sequence = generate_coin_sequence(n_flips, p_head, rng)?;
    let waits = calculate_waiting_times(&sequence);
    debug!(n_flips, p_head, waits = waits.len(), "extracted waiting times");
    compare_with_geometric(&waits, p_head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waiting_times_basic() {
        let seq = [true, false, false, false, true, false, true];
        assert_eq!(calculate_waiting_times(&seq), vec![3, 1]);
    }

    #[test]
    fn test_waiting_times_adjacent_heads() {
        assert_eq!(calculate_waiting_times(&[true, true, true]), vec![0, 0]);
    }

    #[test]
    fn test_waiting_times_too_few_heads() {
        assert!(calculate_waiting_times(&[]).is_empty());
        assert!(calculate_waiting_times(&[false, false]).is_empty());
        assert!(calculate_waiting_times(&[false, true, false]).is_empty());
    }

    #[test]
    fn test_compare_rejects_empty() {
        assert!(matches!(
            compare_with_geometric(&[], 0.1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(compare_with_geometric(&[1, 2], 0.0).is_err());
    }

    #[test]
    fn test_compare_support_covers_max() {
        let cmp = compare_with_geometric(&[0, 0, 3], 0.5).unwrap();
        assert_eq!(cmp.support, vec![0, 1, 2, 3]);
        assert!((cmp.empirical[0] - 2.0 / 3.0).abs() < 1e-15);
        assert_eq!(cmp.empirical[1], 0.0);
        assert!((cmp.theoretical[1] - 0.25).abs() < 1e-15);
        assert!((cmp.theoretical_mean - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_compare_rejects_oversized_support() {
        let err = compare_with_geometric(&[u64::MAX], 0.5).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(compare_with_geometric(&[2, MAX_SUPPORT], 0.5).is_err());
        assert!(compare_with_geometric(&[100_000], 0.5).is_ok());
    }

    #[test]
    fn test_simulated_moments_match_geometric() {
        let mut rng = random::create_rng(42);
        let cmp = simulate_waiting_times(200_000, 0.08, &mut rng).unwrap();
        // mean (1-p)/p = 11.5, variance (1-p)/p² = 143.75
        assert!((cmp.theoretical_mean - 11.5).abs() < 1e-12);
        assert!((cmp.sim_mean - 11.5).abs() < 0.5, "mean = {}", cmp.sim_mean);
        let rel = (cmp.sim_variance - 143.75).abs() / 143.75;
        assert!(rel < 0.1, "variance = {}", cmp.sim_variance);
    }

    #[test]
    fn test_all_tails_is_an_error() {
        let mut rng = random::create_rng(1);
        assert!(simulate_waiting_times(1000, 0.0, &mut rng).is_err());
    }
}
