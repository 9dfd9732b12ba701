use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Source of standard normal draws for the price recurrence.
pub trait ShockSource {
    fn standard_normal(&mut self) -> f64;
}

impl<S: ShockSource + ?Sized> ShockSource for &mut S {
    fn standard_normal(&mut self) -> f64 {
        (**self).standard_normal()
    }
}

/// Pseudo-random N(0, 1) draws.
#[derive(Debug, Clone)]
pub struct GaussianShocks<R> {
    rng: R,
}

impl GaussianShocks<StdRng> {
    /// Seeded when `seed` is set, otherwise from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl<R: Rng> ShockSource for GaussianShocks<R> {
    fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct FixedShocks {
    values: Vec<f64>,
    next: usize,
}

impl FixedShocks {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }

    pub fn zeros() -> Self {
        Self::new(vec![0.0])
    }

    pub fn drawn(&self) -> usize {
        self.next
    }
}

impl ShockSource for FixedShocks {
    fn standard_normal(&mut self) -> f64 {
        if self.values.is_empty() {
            self.next += 1;
            return 0.0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_shocks_cycle() {
        let mut shocks = FixedShocks::new(vec![1.0, -0.5]);
        assert_eq!(shocks.standard_normal(), 1.0);
        assert_eq!(shocks.standard_normal(), -0.5);
        assert_eq!(shocks.standard_normal(), 1.0);
        assert_eq!(shocks.drawn(), 3);
    }

    #[test]
    fn seeded_gaussian_is_reproducible() {
        let mut a = GaussianShocks::new(Some(7));
        let mut b = GaussianShocks::new(Some(7));
        for _ in 0..16 {
            assert_eq!(a.standard_normal().to_bits(), b.standard_normal().to_bits());
        }
    }

    #[test]
    fn gaussian_sample_moments_are_plausible() {
        let mut shocks = GaussianShocks::new(Some(11));
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| shocks.standard_normal()).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.05, "var {}", var);
    }
}
