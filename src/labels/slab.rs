//! Slab extraction around a target slice

use ndarray::{s, Array3, Axis};

use crate::error::{PhantomError, Result};

/// Extract slices `target - thickness ..= target + thickness` plus up to
/// `margin` support slices on each side
///
/// The support slices are clamped to the volume, so a slab touching the
/// volume edge gets a thinner margin there. `thickness = 0` yields a single
/// slice (plus support) for 2D phantoms.
///
/// # Arguments
/// * `volume` - Labels with axes (z, x, y)
/// * `target` - Centre slice index
/// * `thickness` - Half-thickness of the slab in slices
/// * `margin` - Support slices requested on each side
pub fn extract_slab(volume: &Array3<u8>, target: usize, thickness: usize, margin: usize) -> Result<Array3<u8>> {
    let nz = volume.len_of(Axis(0));
    let out_of_range = || PhantomError::SliceOutOfRange { target, thickness, slices: nz };

    let lower = target.checked_sub(thickness).ok_or_else(out_of_range)?;
    let upper = target.checked_add(thickness).ok_or_else(out_of_range)?;
    if upper >= nz {
        return Err(out_of_range());
    }

    let lb = lower.saturating_sub(margin);
    let ub = upper.saturating_add(margin).min(nz - 1);
    log::debug!("Extracting slab z={}..={} from {} slices", lb, ub, nz);

    Ok(volume.slice(s![lb..=ub, .., ..]).to_owned())
}
