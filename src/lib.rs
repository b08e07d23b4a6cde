//! # u-stochastic
//!
//! Elementary stochastic-process simulations, each reduced to summary
//! statistics and lined up against a closed-form theoretical law.
//!
//! ## Modules
//!
//! - [`walk`] — 2D lattice random walks: batched final displacements,
//!   endpoint summaries, and full traces
//! - [`msd`] — mean-square displacement against step count, with a
//!   least-squares slope through the origin
//! - [`poisson`] — coin-flip experiments converging to the Poisson law
//! - [`waiting`] — geometric waiting times between rare heads
//! - [`distributions`] — Normal, Binomial, Poisson and Geometric laws
//! - [`stats`] — descriptive statistics with numerical stability guarantees
//! - [`special`] — normal CDF/PDF and log-gamma functions
//! - [`random`] — seeded generators and batched primitive draws
//!
//! ## Design Philosophy
//!
//! - **Explicit randomness**: every simulation takes its generator as an
//!   argument or builds one from a seed on each call. Nothing reads a
//!   global generator, so seeded runs are bit-for-bit reproducible.
//! - **Batch, then reduce**: steps are drawn into flat buffers and reduced
//!   in bulk rather than walked one at a time.
//! - **Reject at the boundary**: invalid counts and probabilities fail
//!   with [`Error::InvalidArgument`] before any random draw.
//!
//! ## Example
//!
//! ```
//! use u_stochastic::walk::{WalkConfig, WalkSampler};
//!
//! let config = WalkConfig::new(1000, 10_000).unwrap().with_seed(42);
//! let endpoints = WalkSampler::new(config).unwrap().sample();
//! let summary = endpoints.summarize().unwrap();
//! assert!(summary.mean_x.abs() < 2.0);
//! assert!((summary.variance_x / summary.theoretical_variance() - 1.0).abs() < 0.1);
//! ```

pub mod distributions;
pub mod error;
pub mod msd;
pub mod poisson;
pub mod random;
pub mod special;
pub mod stats;
pub mod waiting;
pub mod walk;

pub use error::{Error, Result};
