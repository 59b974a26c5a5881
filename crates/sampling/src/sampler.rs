use rand::Rng;

/// Above this rate the Poisson sampler switches to the normal approximation.
pub const POISSON_NORMAL_THRESHOLD: f64 = 50.0;

/// Probability primitives over an injected random source.
///
/// The sampler owns its generator, so each worker builds its own instance and no
/// random state is ever shared between threads. Seeding the generator makes every
/// draw reproducible.
#[derive(Debug, Clone)]
pub struct DistributionSampler<R> {
    rng: R,
    /// Second value produced by the last polar Box-Muller step.
    spare_normal: Option<f64>,
}

impl<R: Rng> DistributionSampler<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            spare_normal: None,
        }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn into_inner(self) -> R {
        self.rng
    }

    /// Uniform draw on `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    /// Uniform draw on `(0, 1)`, safe to take the logarithm of.
    fn uniform_open(&mut self) -> f64 {
        loop {
            let u = self.uniform();
            if u > 0.0 {
                return u;
            }
        }
    }

    /// Standard normal draw (polar Box-Muller). Values are produced in pairs; the
    /// second one is cached and returned by the next call.
    pub fn gaussian(&mut self) -> f64 {
        if let Some(z) = self.spare_normal.take() {
            return z;
        }
        loop {
            let u = 2.0 * self.uniform() - 1.0;
            let v = 2.0 * self.uniform() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let m = (-2.0 * s.ln() / s).sqrt();
                self.spare_normal = Some(v * m);
                return u * m;
            }
        }
    }

    /// Gamma(alpha, 1) draw using Marsaglia and Tsang's method.
    ///
    /// Shapes below 1 are boosted: `Gamma(a) = Gamma(1 + a) * U^(1/a)`.
    /// A non-positive or non-finite shape yields 0.
    pub fn gamma(&mut self, alpha: f64) -> f64 {
        if !(alpha > 0.0) || !alpha.is_finite() {
            return 0.0;
        }
        if alpha < 1.0 {
            let boost = self.uniform_open().powf(1.0 / alpha);
            return self.gamma(1.0 + alpha) * boost;
        }

        let d = alpha - 1.0 / 3.0;
        let c = 1.0 / (9.0 * d).sqrt();
        loop {
            let (x, v) = loop {
                let x = self.gaussian();
                let v = 1.0 + c * x;
                if v > 0.0 {
                    break (x, v * v * v);
                }
            };
            let u = self.uniform_open();
            let x2 = x * x;
            if u < 1.0 - 0.0331 * x2 * x2 {
                return d * v;
            }
            if u.ln() < 0.5 * x2 + d * (1.0 - v + v.ln()) {
                return d * v;
            }
        }
    }

    /// PERT draw over `[min, max]` with mode `most_likely`, built as a scaled
    /// Beta(α, β) from two Gamma draws.
    ///
    /// When `min >= max` the distribution collapses to a point mass and `min` is
    /// returned unchanged. A mode outside `[min, max]` is clamped to the nearest bound.
    pub fn pert(&mut self, min: f64, most_likely: f64, max: f64) -> f64 {
        if !(min < max) {
            return min;
        }
        let range = max - min;
        let mode = most_likely.clamp(min, max);
        let alpha = 1.0 + 4.0 * (mode - min) / range;
        let beta = 1.0 + 4.0 * (max - mode) / range;

        let u = self.gamma(alpha);
        let v = self.gamma(beta);
        let total = u + v;
        if !(total > 0.0) {
            return mode;
        }
        (min + range * (u / total)).clamp(min, max)
    }

    /// Poisson(lambda) event count.
    ///
    /// Rates above [`POISSON_NORMAL_THRESHOLD`] use the rounded normal approximation
    /// floored at 0; smaller rates use Knuth's product-of-uniforms method. A
    /// non-positive or non-finite rate yields 0.
    pub fn poisson(&mut self, lambda: f64) -> u64 {
        if !(lambda > 0.0) || !lambda.is_finite() {
            return 0;
        }
        if lambda > POISSON_NORMAL_THRESHOLD {
            let k = (lambda + lambda.sqrt() * self.gaussian()).round();
            return if k < 0.0 { 0 } else { k as u64 };
        }

        let limit = (-lambda).exp();
        let mut count = 0u64;
        let mut product = 1.0;
        loop {
            count += 1;
            product *= self.uniform();
            if product <= limit {
                return count - 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sampler(seed: u64) -> DistributionSampler<StdRng> {
        DistributionSampler::new(StdRng::seed_from_u64(seed))
    }

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    #[test]
    fn degenerate_pert_returns_min() {
        let mut s = sampler(1);
        assert_eq!(s.pert(3.0, 3.0, 3.0), 3.0);
        assert_eq!(s.pert(10.0, 5.0, 2.0), 10.0);
        assert_eq!(s.pert(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn pert_stays_within_support() {
        let mut s = sampler(7);
        for _ in 0..10_000 {
            let v = s.pert(100.0, 250.0, 1000.0);
            assert!((100.0..=1000.0).contains(&v), "out of support: {v}");
        }
    }

    #[test]
    fn pert_mean_matches_closed_form() {
        let mut s = sampler(11);
        let draws: Vec<f64> = (0..50_000).map(|_| s.pert(0.0, 2.0, 10.0)).collect();
        let expected = (0.0 + 4.0 * 2.0 + 10.0) / 6.0;
        assert!((mean(&draws) - expected).abs() / expected < 0.02);
    }

    #[test]
    fn poisson_zero_rate_is_zero() {
        let mut s = sampler(3);
        for _ in 0..1_000 {
            assert_eq!(s.poisson(0.0), 0);
        }
        assert_eq!(s.poisson(-2.0), 0);
        assert_eq!(s.poisson(f64::NAN), 0);
    }

    #[test]
    fn poisson_mean_small_rate() {
        let mut s = sampler(42);
        let n = 100_000;
        let total: u64 = (0..n).map(|_| s.poisson(10.0)).sum();
        let m = total as f64 / n as f64;
        assert!((m - 10.0).abs() / 10.0 < 0.05, "mean {m}");
    }

    #[test]
    fn poisson_mean_large_rate_uses_normal_branch() {
        let mut s = sampler(43);
        let n = 100_000;
        let total: u64 = (0..n).map(|_| s.poisson(75.0)).sum();
        let m = total as f64 / n as f64;
        assert!((m - 75.0).abs() / 75.0 < 0.05, "mean {m}");
    }

    #[test]
    fn gaussian_moments() {
        let mut s = sampler(5);
        let draws: Vec<f64> = (0..100_000).map(|_| s.gaussian()).collect();
        let m = mean(&draws);
        let var = draws.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / draws.len() as f64;
        assert!(m.abs() < 0.02, "mean {m}");
        assert!((var - 1.0).abs() < 0.03, "variance {var}");
    }

    #[test]
    fn gamma_mean_equals_shape() {
        let mut s = sampler(9);
        for alpha in [0.5, 1.0, 3.0, 5.0] {
            let draws: Vec<f64> = (0..50_000).map(|_| s.gamma(alpha)).collect();
            let m = mean(&draws);
            assert!((m - alpha).abs() / alpha < 0.05, "alpha {alpha} mean {m}");
            assert!(draws.iter().all(|v| *v >= 0.0));
        }
        assert_eq!(s.gamma(0.0), 0.0);
    }

    #[test]
    fn seeded_samplers_repeat() {
        let mut a = sampler(99);
        let mut b = sampler(99);
        for _ in 0..100 {
            assert_eq!(a.pert(1.0, 2.0, 3.0), b.pert(1.0, 2.0, 3.0));
            assert_eq!(a.poisson(4.0), b.poisson(4.0));
        }
    }
}
