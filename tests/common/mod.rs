//! Common test utilities for phantom integration tests

#![allow(dead_code)]

use ndarray::{Array2, Array3};
use usct_phantom::Tissue;

/// Mean of the values selected by `mask`
pub fn masked_mean(values: &[f64], mask: &[bool]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for (&v, &m) in values.iter().zip(mask.iter()) {
        if m {
            sum += v;
            n += 1;
        }
    }
    if n == 0 {
        return 0.0;
    }
    sum / n as f64
}

/// Population variance of a slice
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

/// Pearson correlation coefficient of two equally long slices
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    let mean_a = a[..n].iter().sum::<f64>() / nf;
    let mean_b = b[..n].iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denominator = (var_a * var_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    cov / denominator
}

/// Correlation between a 2D field and itself shifted by `lag` along axis 1
/// (periodic, matching the FFT's boundary)
pub fn lag_correlation(field: &Array2<f64>, lag: usize) -> f64 {
    let (nx, ny) = field.dim();
    let mut a = Vec::with_capacity(nx * ny);
    let mut b = Vec::with_capacity(nx * ny);
    for x in 0..nx {
        for y in 0..ny {
            a.push(field[[x, y]]);
            b.push(field[[x, (y + lag) % ny]]);
        }
    }
    correlation(&a, &b)
}

/// First lag along axis 1 at which the correlation drops below one half
pub fn half_width_lag(field: &Array2<f64>) -> usize {
    let ny = field.dim().1;
    (1..ny / 2)
        .find(|&lag| lag_correlation(field, lag) < 0.5)
        .unwrap_or(ny / 2)
}

/// Uniform volume of `background` with `tissue` written at the given voxels
pub fn volume_with(dims: (usize, usize, usize), background: Tissue, voxels: &[((usize, usize, usize), Tissue)]) -> Array3<u8> {
    let mut vol = Array3::from_elem(dims, background.label());
    for &((z, x, y), tissue) in voxels {
        vol[[z, x, y]] = tissue.label();
    }
    vol
}

/// Number of voxels of `volume` holding `tissue`
pub fn count(volume: &Array3<u8>, tissue: Tissue) -> usize {
    volume.iter().filter(|&&l| l == tissue.label()).count()
}
