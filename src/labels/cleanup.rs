//! Label cleanup: class remapping and iterative vascular denoising

use log::{debug, info, warn};
use ndarray::{s, Array3, ArrayBase, Axis, DataMut, Dimension};
use serde::{Deserialize, Serialize};

use crate::error::{PhantomError, Result};
use crate::labels::remove::remove_label;
use crate::taxonomy::Tissue;

/// Parameters for label cleanup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupParams {
    /// Slices at each z end that only serve as stencil support (default 2).
    /// They are ignored by the convergence check and stripped from the result.
    pub margin: usize,
    /// Maximum denoising iterations before giving up (default 1000)
    pub max_iterations: usize,
    /// Replacement passes per extra label per iteration (default 2)
    pub passes_per_iteration: usize,
}

impl Default for CleanupParams {
    fn default() -> Self {
        Self {
            margin: 2,
            max_iterations: 1000,
            passes_per_iteration: 2,
        }
    }
}

/// Outcome of the vascular denoising loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Convergence {
    /// No extra label left in the interior
    Converged { iterations: usize },
    /// Iteration cap hit, or an iteration replaced nothing while extra labels
    /// remained. `remaining` lists (label, interior count) for labels still present.
    NotConverged { iterations: usize, remaining: Vec<(u8, usize)> },
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    pub fn iterations(&self) -> usize {
        match *self {
            Convergence::Converged { iterations } | Convergence::NotConverged { iterations, .. } => iterations,
        }
    }
}

/// Cleaned labels with the z-margin stripped
#[derive(Clone, Debug)]
pub struct CleanupOutcome {
    pub labels: Array3<u8>,
    /// Voxels changed by class remapping
    pub remapped: usize,
    /// Denoising iterations run
    pub iterations: usize,
}

/// Fold subsumed classes into their parent (TDLU and duct into glandular,
/// nipple into skin). Idempotent.
///
/// # Returns
/// Number of voxels changed
pub fn remap_subsumed_labels<S, D>(volume: &mut ArrayBase<S, D>) -> usize
where
    S: DataMut<Elem = u8>,
    D: Dimension,
{
    let mut lut: [u8; 256] = std::array::from_fn(|i| i as u8);
    for tissue in Tissue::ALL {
        if let Some(parent) = tissue.parent() {
            lut[tissue.label() as usize] = parent.label();
        }
    }

    let mut changed = 0;
    volume.map_inplace(|v| {
        let mapped = lut[*v as usize];
        if mapped != *v {
            *v = mapped;
            changed += 1;
        }
    });
    changed
}

/// Count voxels equal to `label`, excluding `margin` slices at each z end
pub fn count_interior(volume: &Array3<u8>, label: u8, margin: usize) -> usize {
    let nz = volume.len_of(Axis(0));
    if nz <= 2 * margin {
        return 0;
    }
    volume
        .slice(s![margin..nz - margin, .., ..])
        .iter()
        .filter(|&&v| v == label)
        .count()
}

fn remaining_extra(volume: &Array3<u8>, margin: usize) -> Vec<(u8, usize)> {
    Tissue::EXTRA
        .iter()
        .map(|t| (t.label(), count_interior(volume, t.label(), margin)))
        .filter(|&(_, n)| n > 0)
        .collect()
}

/// Remove arterial and venous labels by repeated neighbour voting
///
/// One initial pass per extra label, then iterations of
/// `passes_per_iteration` passes per label, each followed by a check of the
/// interior region. Stops on convergence, on an iteration that replaces
/// nothing (the volume can no longer change), or at `max_iterations`.
pub fn denoise_extra_labels(volume: &mut Array3<u8>, params: &CleanupParams) -> Convergence {
    denoise_extra_labels_with_progress(volume, params, |_, _| {})
}

/// Same as [`denoise_extra_labels`] but calls
/// `progress_callback(iteration, remaining_voxels)` after every check
pub fn denoise_extra_labels_with_progress<F>(
    volume: &mut Array3<u8>,
    params: &CleanupParams,
    mut progress_callback: F,
) -> Convergence
where
    F: FnMut(usize, usize),
{
    for tissue in Tissue::EXTRA {
        remove_label(volume, tissue.label());
    }

    let mut remaining = remaining_extra(volume, params.margin);
    progress_callback(0, remaining.iter().map(|&(_, n)| n).sum());

    let mut iterations = 0;
    while !remaining.is_empty() {
        if iterations >= params.max_iterations {
            warn!("Label cleanup hit the iteration cap ({})", params.max_iterations);
            return Convergence::NotConverged { iterations, remaining };
        }
        iterations += 1;

        let mut replaced = 0;
        for tissue in Tissue::EXTRA {
            for _ in 0..params.passes_per_iteration {
                replaced += remove_label(volume, tissue.label());
            }
        }

        remaining = remaining_extra(volume, params.margin);
        let total: usize = remaining.iter().map(|&(_, n)| n).sum();
        debug!("Cleanup iteration {}: {} replaced, {} extra voxels left", iterations, replaced, total);
        progress_callback(iterations, total);

        if replaced == 0 && total > 0 {
            warn!("Label cleanup stalled after {} iterations with {} extra voxels", iterations, total);
            return Convergence::NotConverged { iterations, remaining };
        }
    }

    Convergence::Converged { iterations }
}

/// Full cleanup: remap subsumed classes, remove vascular labels, strip the z-margin
///
/// # Arguments
/// * `volume` - Labels with axes (z, x, y); needs more than `2 * margin` slices
/// * `params` - Cleanup parameters
///
/// # Returns
/// Cleaned labels of shape (nz - 2*margin, nx, ny), or
/// [`PhantomError::NotConverged`] when vascular labels could not be removed
pub fn clean_labels(mut volume: Array3<u8>, params: &CleanupParams) -> Result<CleanupOutcome> {
    let (nz, nx, ny) = volume.dim();
    if nz <= 2 * params.margin {
        return Err(PhantomError::MissingMargin { slices: nz, margin: params.margin });
    }
    info!("Cleaning label volume {}x{}x{} (margin {})", nz, nx, ny, params.margin);

    let remapped = remap_subsumed_labels(&mut volume);
    debug!("Remapped {} voxels to parent classes", remapped);

    let iterations = match denoise_extra_labels(&mut volume, params) {
        Convergence::Converged { iterations } => iterations,
        Convergence::NotConverged { iterations, remaining } => {
            return Err(PhantomError::NotConverged { iterations, remaining });
        }
    };
    info!("Vascular labels removed after {} iterations", iterations);

    let m = params.margin;
    let labels = volume.slice(s![m..nz - m, .., ..]).to_owned();

    Ok(CleanupOutcome { labels, remapped, iterations })
}
