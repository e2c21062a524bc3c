//! Attenuation power-law exponent for fat/glandular mixtures
//!
//! Attenuation follows `alpha(f) = alpha0 * f^b` with f in MHz. Fat and
//! glandular tissue have different exponents; a phantom with a given fat
//! fraction is summarised by the single exponent `b` whose power law best
//! reproduces the transmission of a uniform slab of the mixture.

use log::debug;
use ndarray::{Array, Dimension};
use serde::{Deserialize, Serialize};

use crate::error::{PhantomError, Result};
use crate::taxonomy::Tissue;

/// Parameters of the power-law fit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerLawParams {
    /// Fat alpha0 [Np/m/MHz^b] (default 4.3578)
    pub fat_alpha0: f64,
    /// Glandular alpha0 [Np/m/MHz^b] (default 8.635)
    pub gland_alpha0: f64,
    /// Fat exponent (default 1.08)
    pub fat_exponent: f64,
    /// Glandular exponent (default 1.5)
    pub gland_exponent: f64,
    /// Frequencies in MHz at which transmission is matched (default 0.1..=2.3 step 0.1)
    pub frequencies: Vec<f64>,
    /// Starting exponent (default 1.2)
    pub initial_exponent: f64,
    /// Maximum descent iterations (default 10000)
    pub max_iterations: usize,
}

impl Default for PowerLawParams {
    fn default() -> Self {
        Self {
            fat_alpha0: 4.3578,
            gland_alpha0: 8.635,
            fat_exponent: 1.08,
            gland_exponent: 1.5,
            frequencies: (1..=23).map(|i| i as f64 * 0.1).collect(),
            initial_exponent: 1.2,
            max_iterations: 10_000,
        }
    }
}

/// Fraction of fat among fat and glandular voxels, `None` if neither is present
pub fn fat_fraction<D: Dimension>(labels: &Array<u8, D>) -> Option<f64> {
    let (fat, gland) = labels.iter().fold((0usize, 0usize), |(f, g), &l| {
        if l == Tissue::Fat.label() {
            (f + 1, g)
        } else if l == Tissue::Glandular.label() {
            (f, g + 1)
        } else {
            (f, g)
        }
    });
    if fat + gland == 0 {
        None
    } else {
        Some(fat as f64 / (fat + gland) as f64)
    }
}

/// Estimate the power-law exponent of a fat/glandular mixture
///
/// The reference transmission through a slab of thickness `2 * radius` (m) is
/// `exp(-2r (p alpha_fat(f) + (1-p) alpha_gland(f)))`; it is fitted with
/// `exp(-f^b m)`, `m = 2r (p alpha0_fat + (1-p) alpha0_gland)`, by gradient
/// descent on `b` projected onto the interval between the two tissue exponents.
///
/// # Arguments
/// * `fat_fraction` - Fat fraction p in [0, 1]
/// * `radius` - Phantom radius in m (0.5 in the reference setup)
/// * `params` - Tissue constants and solver settings
pub fn estimate_power_exponent(fat_fraction: f64, radius: f64, params: &PowerLawParams) -> Result<f64> {
    if !(0.0..=1.0).contains(&fat_fraction) {
        return Err(PhantomError::InvalidArgument(format!(
            "fat fraction {} must lie in [0, 1]",
            fat_fraction
        )));
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(PhantomError::InvalidArgument(format!("radius {} must be positive", radius)));
    }
    if params.frequencies.is_empty() || params.frequencies.iter().any(|&f| !(f > 0.0)) {
        return Err(PhantomError::InvalidArgument(
            "frequencies must be non-empty and positive".to_string(),
        ));
    }

    let p = fat_fraction;
    let b_lo = params.fat_exponent.min(params.gland_exponent);
    let b_hi = params.fat_exponent.max(params.gland_exponent);
    let freqs = &params.frequencies;

    let reference: Vec<f64> = freqs
        .iter()
        .map(|&f| {
            let alpha_fat = params.fat_alpha0 * f.powf(params.fat_exponent);
            let alpha_gland = params.gland_alpha0 * f.powf(params.gland_exponent);
            (-(2.0 * radius) * (alpha_fat * p + alpha_gland * (1.0 - p))).exp()
        })
        .collect();
    let m = 2.0 * radius * (params.fat_alpha0 * p + params.gland_alpha0 * (1.0 - p));

    let objective = |b: f64| -> f64 {
        freqs
            .iter()
            .zip(reference.iter())
            .map(|(&f, &r)| {
                let d = (-f.powf(b) * m).exp() - r;
                d * d
            })
            .sum()
    };
    // Half the derivative of the objective with respect to b
    let gradient = |b: f64| -> f64 {
        freqs
            .iter()
            .zip(reference.iter())
            .map(|(&f, &r)| {
                let fb = f.powf(b);
                let model = (-fb * m).exp();
                (model - r) * model * f.ln() * fb * (-m)
            })
            .sum()
    };

    let mut b0 = params.initial_exponent.clamp(b_lo, b_hi);
    for iter in 0..params.max_iterations {
        let f1 = objective(b0);
        let g = gradient(b0);

        let mut step = 1.0;
        let mut b1 = b0 - step * g;
        while !(b_lo..=b_hi).contains(&b1) && step > f64::EPSILON {
            step /= 2.0;
            b1 = b0 - step * g;
        }
        b1 = b1.clamp(b_lo, b_hi);

        let mut f2 = objective(b1);
        while f1 < f2 && step > f64::EPSILON {
            step /= 2.0;
            b1 = (b0 - step * g).clamp(b_lo, b_hi);
            f2 = objective(b1);
        }

        if f1 - f2 < 1e-12 || (b1 - b0).abs() < 1e-9 {
            debug!("Power exponent {:.6} after {} iterations (p = {:.3})", b1, iter + 1, p);
            return Ok(b1);
        }
        b0 = b1;
    }

    Err(PhantomError::InvalidArgument(format!(
        "power exponent fit did not settle within {} iterations",
        params.max_iterations
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_pure_tissues_recover_their_exponent() {
        let params = PowerLawParams::default();
        let b_fat = estimate_power_exponent(1.0, 0.5, &params).unwrap();
        let b_gland = estimate_power_exponent(0.0, 0.5, &params).unwrap();
        assert!((b_fat - 1.08).abs() < 1e-3, "fat exponent {}", b_fat);
        assert!((b_gland - 1.5).abs() < 1e-3, "glandular exponent {}", b_gland);
    }

    #[test]
    fn test_mixture_exponent_between_tissues_and_monotone() {
        let params = PowerLawParams::default();
        let mut last = f64::INFINITY;
        for p in [0.2, 0.5, 0.8] {
            let b = estimate_power_exponent(p, 0.5, &params).unwrap();
            assert!((1.08..=1.5).contains(&b), "p={} gave {}", p, b);
            assert!(b < last, "exponent should fall as fat fraction rises (p={}, b={})", p, b);
            last = b;
        }
    }

    #[test]
    fn test_invalid_arguments() {
        let params = PowerLawParams::default();
        assert!(estimate_power_exponent(1.5, 0.5, &params).is_err());
        assert!(estimate_power_exponent(0.5, 0.0, &params).is_err());
        let empty = PowerLawParams { frequencies: vec![], ..Default::default() };
        assert!(estimate_power_exponent(0.5, 0.5, &empty).is_err());
    }

    #[test]
    fn test_fat_fraction() {
        let labels = Array3::from_shape_fn((2, 2, 4), |(_, _, y)| [1u8, 1, 29, 0][y]);
        assert!((fat_fraction(&labels).unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(fat_fraction(&Array3::<u8>::zeros((2, 2, 2))), None);
    }
}
