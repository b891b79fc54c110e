//! Random processes shared by the reference backends.

use rand::{Rng, rngs::StdRng};

/// Draws Gaussian noise with zero mean and the given standard deviation.
///
/// Uses the Box-Muller transform. Returns `0.0` when `std_dev <= 0`
/// without consuming randomness.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// First-order autoregressive process clamped to a band.
///
/// ```text
/// x(t) = alpha * x(t-1) + (1 - alpha) * mean + epsilon(t)
/// ```
///
/// where `epsilon` is Gaussian with standard deviation `noise_std`.
#[derive(Debug, Clone)]
pub struct Ar1Process {
    pub alpha: f64,
    pub mean: f64,
    pub noise_std: f64,
    pub min: f64,
    pub max: f64,
    state: f64,
}

impl Ar1Process {
    /// Starts the process at its mean. `alpha` is clamped to `[0, 1]` and
    /// negative noise levels are treated as zero.
    pub fn new(alpha: f64, mean: f64, noise_std: f64, min: f64, max: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            mean,
            noise_std: noise_std.max(0.0),
            min,
            max,
            state: mean.clamp(min, max),
        }
    }

    pub fn state(&self) -> f64 {
        self.state
    }

    /// Advances the process by one step and returns the new value.
    pub fn step(&mut self, rng: &mut StdRng) -> f64 {
        let epsilon = gaussian_noise(rng, self.noise_std);
        let next = self.alpha * self.state + (1.0 - self.alpha) * self.mean + epsilon;
        self.state = next.clamp(self.min, self.max);
        self.state
    }
}
