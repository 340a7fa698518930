//! Fractional Gaussian Noise via the Davies-Harte circulant embedding.

use crate::error::{Result, SimError};
use crate::fft::{Complex, Direction, fft_in_place, next_power_of_two};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

/// Zero-mean FGN generator with Hurst exponent in (0.5, 1.0).
///
/// Two generators built with the same `(hurst, sigma, seed)` produce
/// bit-identical series for the same `n`.
#[derive(Debug, Clone)]
pub struct FractionalGaussianNoise {
    hurst: f64,
    sigma: f64,
    rng: StdRng,
}

impl FractionalGaussianNoise {
    pub fn new(hurst: f64, sigma: f64, seed: u64) -> Result<Self> {
        Self::with_rng(hurst, sigma, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(hurst: f64, sigma: f64, rng: StdRng) -> Result<Self> {
        validate(hurst, sigma)?;
        Ok(Self { hurst, sigma, rng })
    }

    pub fn hurst(&self) -> f64 {
        self.hurst
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Autocovariance of unit-variance FGN at lag `k`.
    pub fn autocovariance(&self, k: usize) -> f64 {
        if k == 0 {
            return 1.0;
        }
        let two_h = 2.0 * self.hurst;
        let k = k as f64;
        0.5 * ((k - 1.0).abs().powf(two_h) - 2.0 * k.powf(two_h) + (k + 1.0).powf(two_h))
    }

    /// Draw `n >= 2` samples.
    pub fn generate(&mut self, n: usize) -> Result<Vec<f64>> {
        if n < 2 {
            return Err(SimError::config(format!(
                "FGN sample count must be at least 2, got {n}"
            )));
        }

        let m = next_power_of_two(2 * n);
        let eigenvalues = self.eigenvalues(n, m);

        let mut spectrum = self.hermitian_gaussian(&eigenvalues);
        fft_in_place(&mut spectrum, Direction::Inverse);

        // The inverse transform is normalized by m; only sigma is applied on top.
        Ok(spectrum[..n].iter().map(|z| z.re * self.sigma).collect())
    }

    /// Spectrum of the circulant embedding, negative noise clipped to zero.
    fn eigenvalues(&self, n: usize, m: usize) -> Vec<f64> {
        let mut circulant: Vec<Complex> = (0..m)
            .map(|k| {
                let value = if k < n {
                    self.autocovariance(k)
                } else {
                    match (2 * n).checked_sub(k) {
                        Some(lag) => self.autocovariance(lag),
                        None => 0.0,
                    }
                };
                Complex::real(value)
            })
            .collect();

        fft_in_place(&mut circulant, Direction::Forward);
        circulant.iter().map(|z| z.re.max(0.0)).collect()
    }

    /// Conjugate-symmetric Gaussian vector whose bin `k` has variance `eigenvalues[k]`.
    fn hermitian_gaussian(&mut self, eigenvalues: &[f64]) -> Vec<Complex> {
        let m = eigenvalues.len();
        let half = m / 2;
        let mut out = vec![Complex::ZERO; m];

        out[0] = Complex::real(eigenvalues[0].sqrt() * self.normal());
        out[half] = Complex::real(eigenvalues[half].sqrt() * self.normal());

        for k in 1..half {
            let s = (eigenvalues[k] / 2.0).sqrt();
            let a = self.normal();
            let b = self.normal();
            out[k] = Complex::new(s * a, s * b);
            out[m - k] = out[k].conj();
        }
        out
    }

    fn normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }
}

fn validate(hurst: f64, sigma: f64) -> Result<()> {
    if !(hurst > 0.5 && hurst < 1.0) {
        return Err(SimError::config(format!(
            "Hurst exponent must be in (0.5, 1.0), got {hurst}"
        )));
    }
    if !(sigma > 0.0) {
        return Err(SimError::config(format!("sigma must be > 0, got {sigma}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hurst::estimate_hurst;

    #[test]
    fn rejects_invalid_parameters() {
        assert!(FractionalGaussianNoise::new(0.5, 1.0, 1).is_err());
        assert!(FractionalGaussianNoise::new(1.0, 1.0, 1).is_err());
        assert!(FractionalGaussianNoise::new(0.3, 1.0, 1).is_err());
        assert!(FractionalGaussianNoise::new(0.8, 0.0, 1).is_err());
        assert!(FractionalGaussianNoise::new(0.8, -1.0, 1).is_err());
        assert!(FractionalGaussianNoise::new(f64::NAN, 1.0, 1).is_err());
    }

    #[test]
    fn rejects_tiny_sample_counts() {
        let mut fgn = FractionalGaussianNoise::new(0.8, 1.0, 1).unwrap();
        assert!(fgn.generate(1).is_err());
        assert_eq!(fgn.generate(2).unwrap().len(), 2);
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let a = FractionalGaussianNoise::new(0.8, 1.0, 123)
            .unwrap()
            .generate(128)
            .unwrap();
        let b = FractionalGaussianNoise::new(0.8, 1.0, 123)
            .unwrap()
            .generate(128)
            .unwrap();

        assert_eq!(a.len(), 128);
        assert!(a.iter().any(|x| x.abs() > 1e-6));
        assert_eq!(
            a.iter().map(|x| x.to_bits()).collect::<Vec<_>>(),
            b.iter().map(|x| x.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn different_seeds_differ() {
        let a = FractionalGaussianNoise::new(0.8, 1.0, 1)
            .unwrap()
            .generate(64)
            .unwrap();
        let b = FractionalGaussianNoise::new(0.8, 1.0, 2)
            .unwrap()
            .generate(64)
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn autocovariance_decays_from_one() {
        let fgn = FractionalGaussianNoise::new(0.8, 1.0, 0).unwrap();
        assert_eq!(fgn.autocovariance(0), 1.0);
        let expected = 0.5 * (2f64.powf(1.6) - 2.0);
        assert!((fgn.autocovariance(1) - expected).abs() < 1e-12);
        assert!(fgn.autocovariance(1) > fgn.autocovariance(10));
        assert!(fgn.autocovariance(10) > 0.0);
    }

    fn population_sd(series: &[f64]) -> f64 {
        let mean = series.iter().sum::<f64>() / series.len() as f64;
        let var = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / series.len() as f64;
        var.sqrt()
    }

    #[test]
    fn output_is_sigma_times_normalized_inverse() {
        // m = 256 for n = 128, so the spread is about sigma / sqrt(m).
        let series = FractionalGaussianNoise::new(0.8, 1.0, 123)
            .unwrap()
            .generate(128)
            .unwrap();
        let sd = population_sd(&series);
        assert!(sd > 0.02 && sd < 0.2, "sd = {sd}");
    }

    #[test]
    fn sigma_scales_linearly() {
        let unit = FractionalGaussianNoise::new(0.7, 1.0, 5)
            .unwrap()
            .generate(4096)
            .unwrap();
        let doubled = FractionalGaussianNoise::new(0.7, 2.0, 5)
            .unwrap()
            .generate(4096)
            .unwrap();
        for (a, b) in unit.iter().zip(&doubled) {
            assert!((2.0 * a - b).abs() < 1e-12);
        }
        let sd = population_sd(&unit);
        assert!(sd < 0.1, "sd = {sd}");
    }

    #[test]
    fn persistent_series_estimates_above_half() {
        let series = FractionalGaussianNoise::new(0.9, 1.0, 77)
            .unwrap()
            .generate(4096)
            .unwrap();
        let h = estimate_hurst(&series);
        assert!(h > 0.6, "estimated H = {h}");
    }
}
