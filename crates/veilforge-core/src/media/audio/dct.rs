//! Orthonormal DCT-II over short sample blocks.

use std::f64::consts::PI;

/// Pre-computed basis for one block length.
/// `basis[k * n + i] = alpha(k) * cos(PI * (2i + 1) * k / 2n)`
#[derive(Debug, Clone)]
pub(crate) struct Dct {
    n: usize,
    basis: Vec<f64>,
}

impl Dct {
    pub fn new(n: usize) -> Self {
        let mut basis = vec![0.0; n * n];
        for k in 0..n {
            let alpha = if k == 0 {
                (1.0 / n as f64).sqrt()
            } else {
                (2.0 / n as f64).sqrt()
            };
            for i in 0..n {
                basis[k * n + i] =
                    alpha * (PI * (2 * i + 1) as f64 * k as f64 / (2 * n) as f64).cos();
            }
        }

        Self { n, basis }
    }

    pub fn forward(&self, samples: &[f64]) -> Vec<f64> {
        (0..self.n)
            .map(|k| {
                let row = &self.basis[k * self.n..(k + 1) * self.n];
                row.iter().zip(samples).map(|(b, x)| b * x).sum()
            })
            .collect()
    }

    pub fn inverse(&self, coefficients: &[f64]) -> Vec<f64> {
        (0..self.n)
            .map(|i| {
                coefficients
                    .iter()
                    .enumerate()
                    .map(|(k, c)| self.basis[k * self.n + i] * c)
                    .sum()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_then_inverse_is_identity() {
        let dct = Dct::new(16);
        let samples: Vec<f64> = (0..16).map(|i| (i as f64 * 0.7).sin() * 3000.0).collect();

        let restored = dct.inverse(&dct.forward(&samples));
        for (a, b) in samples.iter().zip(&restored) {
            assert!((a - b).abs() < 1e-6, "{a} != {b}");
        }
    }

    #[test]
    fn constant_block_has_only_dc() {
        let dct = Dct::new(8);
        let coefficients = dct.forward(&[100.0; 8]);

        assert!((coefficients[0] - 100.0 * 8f64.sqrt()).abs() < 1e-9);
        assert!(coefficients[1..].iter().all(|c| c.abs() < 1e-9));
    }

    #[test]
    fn transform_preserves_energy() {
        let dct = Dct::new(16);
        let samples: Vec<f64> = (0..16).map(|i| ((i * 37) % 11) as f64 - 5.0).collect();
        let coefficients = dct.forward(&samples);

        let energy = |v: &[f64]| v.iter().map(|x| x * x).sum::<f64>();
        assert!((energy(&samples) - energy(&coefficients)).abs() < 1e-6);
    }
}
