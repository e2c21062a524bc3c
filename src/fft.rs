//! N-dimensional FFT over ndarray arrays using rustfft
//!
//! Provides forward/inverse transforms compatible with NumPy's `fftn`/`ifftn`
//! conventions. Axis `i` of the transform is axis `i` of the array, whatever
//! its memory layout; frequency grids built with [`fftfreq`] or
//! [`angular_frequencies`] must be indexed the same way.

use ndarray::{Array, ArrayBase, Axis, DataMut, Dimension};
use num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

use crate::error::{PhantomError, Result};

/// FFT workspace that caches per-axis plans and scratch buffers for reuse
pub struct FftWorkspace {
    shape: Vec<usize>,
    n_total: usize,
    // Forward FFT plans, one per axis
    forward: Vec<Arc<dyn Fft<f64>>>,
    // Inverse FFT plans, one per axis
    inverse: Vec<Arc<dyn Fft<f64>>>,
    scratch: Vec<Complex64>,
    buffer: Vec<Complex64>,
}

impl FftWorkspace {
    /// Create a new FFT workspace for arrays of the given shape
    pub fn new(shape: &[usize]) -> Self {
        let mut planner = FftPlanner::new();

        let forward: Vec<_> = shape
            .iter()
            .map(|&n| planner.plan_fft(n, FftDirection::Forward))
            .collect();
        let inverse: Vec<_> = shape
            .iter()
            .map(|&n| planner.plan_fft(n, FftDirection::Inverse))
            .collect();

        let scratch_len = forward
            .iter()
            .chain(inverse.iter())
            .map(|p| p.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        let buffer_len = shape.iter().copied().max().unwrap_or(0);

        Self {
            shape: shape.to_vec(),
            n_total: shape.iter().product(),
            forward,
            inverse,
            scratch: vec![Complex64::new(0.0, 0.0); scratch_len],
            buffer: vec![Complex64::new(0.0, 0.0); buffer_len],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// In-place forward N-d FFT
    pub fn fftn<S, D>(&mut self, data: &mut ArrayBase<S, D>)
    where
        S: DataMut<Elem = Complex64>,
        D: Dimension,
    {
        debug_assert_eq!(data.shape(), &self.shape[..], "workspace planned for another shape");
        transform_axes(data, &self.forward, &mut self.buffer, &mut self.scratch);
    }

    /// In-place inverse N-d FFT (with 1/N normalization)
    pub fn ifftn<S, D>(&mut self, data: &mut ArrayBase<S, D>)
    where
        S: DataMut<Elem = Complex64>,
        D: Dimension,
    {
        debug_assert_eq!(data.shape(), &self.shape[..], "workspace planned for another shape");
        transform_axes(data, &self.inverse, &mut self.buffer, &mut self.scratch);

        // Normalize
        let n_total = self.n_total as f64;
        data.mapv_inplace(|v| v / n_total);
    }

    /// Apply a real transfer function: out = real(ifft(H * fft(x)))
    pub fn filter_real<D: Dimension>(
        &mut self,
        x: &Array<f64, D>,
        transfer: &Array<f64, D>,
    ) -> Array<f64, D> {
        let mut spectrum = x.mapv(|r| Complex64::new(r, 0.0));
        self.fftn(&mut spectrum);

        // Multiply by kernel
        spectrum.zip_mut_with(transfer, |c, &h| *c *= h);

        self.ifftn(&mut spectrum);

        // Extract real part
        spectrum.mapv(|c| c.re)
    }
}

/// Run 1D transforms along every axis in turn, gathering each lane into a
/// contiguous buffer so that strided axes are handled uniformly.
fn transform_axes<S, D>(
    data: &mut ArrayBase<S, D>,
    plans: &[Arc<dyn Fft<f64>>],
    buffer: &mut [Complex64],
    scratch: &mut [Complex64],
) where
    S: DataMut<Elem = Complex64>,
    D: Dimension,
{
    for (axis, plan) in plans.iter().enumerate() {
        let n = data.len_of(Axis(axis));
        if n <= 1 {
            continue;
        }
        let buf = &mut buffer[..n];
        for mut lane in data.lanes_mut(Axis(axis)) {
            for (b, v) in buf.iter_mut().zip(lane.iter()) {
                *b = *v;
            }
            plan.process_with_scratch(buf, scratch);
            for (v, b) in lane.iter_mut().zip(buf.iter()) {
                *v = *b;
            }
        }
    }
}

/// Forward N-d FFT (in-place, complex-to-complex)
///
/// Matches numpy.fft.fftn behavior.
pub fn fftn<D: Dimension>(data: &mut Array<Complex64, D>) {
    let mut ws = FftWorkspace::new(data.shape());
    ws.fftn(data);
}

/// Inverse N-d FFT (in-place, complex-to-complex)
///
/// Matches numpy.fft.ifftn behavior (includes 1/N normalization).
pub fn ifftn<D: Dimension>(data: &mut Array<Complex64, D>) {
    let mut ws = FftWorkspace::new(data.shape());
    ws.ifftn(data);
}

/// Sample frequencies of an `n`-point transform with sample spacing `d`
///
/// Matches `numpy.fft.fftfreq(n, d)`: non-negative bins up to `(n - 1) / 2`,
/// then the negative bins in increasing order.
pub fn fftfreq(n: usize, d: f64) -> Vec<f64> {
    let step = 1.0 / (n as f64 * d);
    let positive = (n + 1) / 2;
    (0..n)
        .map(|i| {
            let k = if i < positive { i as f64 } else { i as f64 - n as f64 };
            k * step
        })
        .collect()
}

/// Angular spatial frequencies (rad/mm) for an axis of `n` voxels of pitch `h`
///
/// Returns `(2*pi / (n*h)) * k` for `k` in `[0, 1, ..., n/2-1, -n/2, ..., -1]`.
/// `axis` is only used to label the error for odd lengths.
pub fn angular_frequencies(axis: usize, n: usize, h: f64) -> Result<Vec<f64>> {
    if n % 2 != 0 {
        return Err(PhantomError::OddAxis { axis, len: n });
    }
    Ok(fftfreq(n, h).into_iter().map(|f| 2.0 * PI * f).collect())
}
