//! White-noise seed fields for texture synthesis

use ndarray::{Array, Dimension};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sampler::TruncatedGaussian;

/// Law of the i.i.d. seed drawn before spectral filtering
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseKind {
    /// Standard normal N(0, 1)
    Gaussian,
    /// Standard normal truncated to [-bound, bound]
    TruncatedGaussian { bound: f64 },
}

impl NoiseKind {
    /// Draw a field of shape `dim`
    pub fn draw<D: Dimension, R: Rng + ?Sized>(&self, dim: D, rng: &mut R) -> Result<Array<f64, D>> {
        match *self {
            NoiseKind::Gaussian => Ok(white_noise(dim, rng)),
            NoiseKind::TruncatedGaussian { bound } => truncated_white_noise(dim, bound, rng),
        }
    }
}

/// I.i.d. standard normal field
pub fn white_noise<D: Dimension, R: Rng + ?Sized>(dim: D, rng: &mut R) -> Array<f64, D> {
    Array::from_shape_simple_fn(dim, || rng.sample(StandardNormal))
}

/// I.i.d. standard normal field truncated to [-bound, bound]
pub fn truncated_white_noise<D: Dimension, R: Rng + ?Sized>(
    dim: D,
    bound: f64,
    rng: &mut R,
) -> Result<Array<f64, D>> {
    let dist = TruncatedGaussian::standard(-bound, bound)?;
    Ok(Array::from_shape_simple_fn(dim, || rng.sample(&dist)))
}
