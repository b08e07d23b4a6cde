//! Random sources and batched primitive draws.
//!
//! Every simulation in this crate takes its randomness from an explicit
//! handle rather than a process-global generator. A handle is either
//! passed in by the caller or built here from an optional seed, right
//! before sampling.
//!
//! # Reproducibility
//!
//! For reproducible experiments, use [`create_rng`] (or
//! [`rng_from_seed`] with `Some(seed)`). The underlying algorithm
//! (SmallRng) is deterministic for a given seed on the same platform.

use rand::distr::{Bernoulli, Distribution};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

/// Number of ±1 steps packed into one random word.
pub const STEPS_PER_WORD: usize = u64::BITS as usize;

/// Creates a fast, seeded random number generator.
///
/// Uses `SmallRng` (Xoshiro256++).
///
/// # Examples
/// ```
/// use u_stochastic::random::create_rng;
/// use rand::Rng;
/// let mut rng = create_rng(42);
/// let x: f64 = rng.random();
/// assert!(x >= 0.0 && x < 1.0);
/// ```
pub fn create_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Creates a generator from an optional seed.
///
/// `Some(seed)` behaves like [`create_rng`]; `None` seeds from the
/// operating system's entropy source, so two unseeded calls produce
/// unrelated streams.
pub fn rng_from_seed(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => SmallRng::from_os_rng(),
    }
}

/// Draws `n` independent steps, each `+1` or `-1` with probability ½.
///
/// Bits are drawn a word at a time; bit `i % 64` of word `i / 64` set
/// means step `i` is `+1`. The walk sampler consumes the generator in the
/// same order, so a one-trial sample and a trace from the same seed agree.
///
/// # Examples
/// ```
/// use u_stochastic::random::{create_rng, random_signs};
/// let mut rng = create_rng(7);
/// let steps = random_signs(100, &mut rng);
/// assert_eq!(steps.len(), 100);
/// assert!(steps.iter().all(|&s| s == 1 || s == -1));
/// ```
pub fn random_signs<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<i8> {
    let mut words = vec![0_u64; n.div_ceil(STEPS_PER_WORD)];
    rng.fill(&mut words[..]);
    (0..n)
        .map(|i| {
            if (words[i / STEPS_PER_WORD] >> (i % STEPS_PER_WORD)) & 1 == 1 {
                1
            } else {
                -1
            }
        })
        .collect()
}

/// Draws `n` independent Bernoulli(`p`) outcomes (`true` = success).
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if `p` is not in `[0, 1]`.
///
/// # Examples
/// ```
/// use u_stochastic::random::{bernoulli_flips, create_rng};
/// let mut rng = create_rng(1);
/// let flips = bernoulli_flips(10, 1.0, &mut rng).unwrap();
/// assert!(flips.iter().all(|&f| f));
/// ```
pub fn bernoulli_flips<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> Result<Vec<bool>> {
    let dist = Bernoulli::new(p)
        .map_err(|_| Error::invalid(format!("probability must be in [0, 1], got {p}")))?;
    Ok((0..n).map(|_| dist.sample(rng)).collect())
}

// ============================================================================
// Tests
// ============================================================================
