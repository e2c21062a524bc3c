//! Gaussian spectral filtering of white noise
//!
//! Reference:
//! Franceschini, E., Mensah, S., Amy, D., Lefebvre, J.P. (2006).
//! "A 2-D anatomic breast ductal computer phantom for ultrasonic imaging."
//! IEEE Trans. Ultrason. Ferroelectr. Freq. Control, 53(7):1281-1288.
//! https://doi.org/10.1109/tuffc.2006.1665076

use ndarray::{Array, Array2, Array3, Dimension, IntoDimension};

use crate::error::{PhantomError, Result};
use crate::fft::{angular_frequencies, FftWorkspace};

/// Isotropic Gaussian transfer function `exp(-kappa^2 |k|^2 / 8)`
///
/// `|k|^2` sums the squared angular frequency of every axis, built so that
/// axis `i` of the result carries the frequencies of axis `i` of `dim`.
///
/// # Arguments
/// * `dim` - Grid shape, every extent even
/// * `kappa` - Correlation length in mm
/// * `h` - Voxel pitch in mm
pub fn gaussian_transfer<D: Dimension>(dim: D, kappa: f64, h: f64) -> Result<Array<f64, D>> {
    // Squared angular frequencies per axis
    let mut k2_axes: Vec<Vec<f64>> = Vec::with_capacity(dim.ndim());
    for (axis, &n) in dim.slice().iter().enumerate() {
        let k = angular_frequencies(axis, n, h)?;
        k2_axes.push(k.iter().map(|k| k * k).collect());
    }

    let scale = kappa * kappa / 8.0;
    let mut transfer = Array::<f64, D>::zeros(dim);
    for (ix, g) in transfer.indexed_iter_mut() {
        let ix = ix.into_dimension();
        let s: f64 = ix
            .slice()
            .iter()
            .zip(k2_axes.iter())
            .map(|(&i, k2)| k2[i])
            .sum();
        *g = (-scale * s).exp();
    }
    Ok(transfer)
}

/// Correlated random field from a white-noise seed
///
/// The output has the shape of `seed`. Its variance depends on `kappa`, `h`
/// and the variance of the seed and is not renormalized; callers scale it.
///
/// # Arguments
/// * `seed` - White noise (2D or 3D), every extent even
/// * `kappa` - Correlation length in mm
/// * `h` - Voxel pitch in mm
pub fn synthesize<D: Dimension>(seed: &Array<f64, D>, kappa: f64, h: f64) -> Result<Array<f64, D>> {
    if seed.is_empty() {
        return Err(PhantomError::EmptyField);
    }
    if !kappa.is_finite() || kappa < 0.0 {
        return Err(PhantomError::InvalidTextureParams {
            reason: format!("correlation length {} must be finite and non-negative", kappa),
        });
    }
    if !h.is_finite() || h <= 0.0 {
        return Err(PhantomError::InvalidTextureParams {
            reason: format!("voxel pitch {} must be finite and positive", h),
        });
    }

    let transfer = gaussian_transfer(seed.raw_dim(), kappa, h)?;
    let mut ws = FftWorkspace::new(seed.shape());
    Ok(ws.filter_real(seed, &transfer))
}

pub fn synthesize_2d(seed: &Array2<f64>, kappa: f64, h: f64) -> Result<Array2<f64>> {
    synthesize(seed, kappa, h)
}

pub fn synthesize_3d(seed: &Array3<f64>, kappa: f64, h: f64) -> Result<Array3<f64>> {
    synthesize(seed, kappa, h)
}
