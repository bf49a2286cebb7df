use rand::{rngs::StdRng, SeedableRng};
use rand_distr::LogNormal;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Seed used by scenarios, set by the scenario runner to the iteration number
pub static RAND_SEED: AtomicU64 = AtomicU64::new(0);

/// Number of simulation runs executed so far (reported at the end of scenario runs)
pub static TOTAL_SIMULATION_RUNS: AtomicU64 = AtomicU64::new(0);

/// When set, every round is logged in full (bids, occupants, payments, utilities)
pub static VERBOSE_ROUNDS: AtomicBool = AtomicBool::new(false);

/// Get the current global seed offset by a per-purpose salt
/// Different purposes (agent values, tie-breaking) use different salts so they don't share a stream
pub fn get_seed(salt: u64) -> u64 {
    RAND_SEED.load(Ordering::Relaxed).wrapping_mul(1_000_003).wrapping_add(salt)
}

/// Create an RNG from an optional seed; no seed means an entropy-seeded production run
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Round to the nearest integer, ties to even, clamped at zero
pub fn iround(x: f64) -> u64 {
    x.round_ties_even().max(0.0) as u64
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Convert mean and standard deviation to log-normal distribution parameters
/// Returns (μ, σ) for LogNormal(μ, σ) that has the given mean and stddev
///
/// - σ = sqrt(ln(1 + s²/m²))
/// - μ = ln(m) - σ²/2
fn lognormal_from_mean_stddev(mean: f64, stddev: f64) -> (f64, f64) {
    let variance = stddev * stddev;
    let sigma_squared = (1.0 + variance / (mean * mean)).ln();
    let sigma = sigma_squared.sqrt();
    let mu = mean.ln() - sigma_squared / 2.0;
    (mu, sigma)
}

/// Create a log-normal distribution from mean and standard deviation
/// Returns None when the parameters do not describe a valid distribution (non-positive mean, negative stddev)
pub fn lognormal_dist(mean: f64, stddev: f64) -> Option<LogNormal<f64>> {
    if mean <= 0.0 || stddev < 0.0 {
        return None;
    }
    let (mu, sigma) = lognormal_from_mean_stddev(mean, stddev);
    LogNormal::new(mu, sigma).ok()
}
