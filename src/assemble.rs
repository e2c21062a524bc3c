//! Property field assembly
//!
//! Builds speed-of-sound, density and attenuation fields from a cleaned label
//! volume:
//! 1. one draw per tissue and quantity, written to every voxel of the tissue
//! 2. correlated texture added to the configured (tissue, quantity) channels
//!
//! Works on 2D slices and 3D volumes alike.

use log::{debug, info};
use ndarray::{Array, Dimension, Slice, Zip};
use rand::Rng;

use crate::error::{PhantomError, Result};
use crate::taxonomy::{Quantity, Taxonomy, Tissue};
use crate::texture::{synthesize, TextureParams};

/// Acoustic property fields, all with the shape of the label volume
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyMaps<D: Dimension> {
    /// Speed of sound [m/s]
    pub sos: Array<f32, D>,
    /// Density [kg/m^3]
    pub density: Array<f32, D>,
    /// Attenuation coefficient alpha0 [Np/m/MHz^b]
    pub attenuation: Array<f32, D>,
}

impl<D: Dimension> PropertyMaps<D> {
    pub fn zeros(dim: D) -> Self {
        Self {
            sos: Array::zeros(dim.clone()),
            density: Array::zeros(dim.clone()),
            attenuation: Array::zeros(dim),
        }
    }

    pub fn field(&self, quantity: Quantity) -> &Array<f32, D> {
        match quantity {
            Quantity::SpeedOfSound => &self.sos,
            Quantity::Density => &self.density,
            Quantity::Attenuation => &self.attenuation,
        }
    }

    pub fn field_mut(&mut self, quantity: Quantity) -> &mut Array<f32, D> {
        match quantity {
            Quantity::SpeedOfSound => &mut self.sos,
            Quantity::Density => &mut self.density,
            Quantity::Attenuation => &mut self.attenuation,
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.sos.shape()
    }
}

/// Number of voxels holding `tissue`
pub fn tissue_voxel_count<D: Dimension>(labels: &Array<u8, D>, tissue: Tissue) -> usize {
    let label = tissue.label();
    labels.iter().filter(|&&l| l == label).count()
}

/// Fill the base property fields, one sampled value per tissue
///
/// Every tissue of the taxonomy draws one value per defined quantity (in the
/// order sos, density, attenuation), whether or not it occurs in `labels`, so
/// the random stream does not depend on the volume content. Voxels whose label
/// has no taxonomy entry stay zero.
pub fn fill_base_properties<D, R>(
    labels: &Array<u8, D>,
    taxonomy: &Taxonomy,
    rng: &mut R,
) -> Result<PropertyMaps<D>>
where
    D: Dimension,
    R: Rng + ?Sized,
{
    taxonomy.validate()?;
    let mut maps = PropertyMaps::zeros(labels.raw_dim());

    for entry in taxonomy.entries() {
        let label = entry.tissue.label();
        let count = tissue_voxel_count(labels, entry.tissue);
        info!("{}: {} voxels", entry.tissue.name(), count);

        for quantity in Quantity::ALL {
            let Some(spec) = entry.properties.get(quantity) else {
                continue;
            };
            let value = spec.sample(rng)? as f32;
            debug!("{} {} = {}", entry.tissue.name(), quantity.name(), value);

            Zip::from(maps.field_mut(quantity))
                .and(labels)
                .for_each(|f, &l| {
                    if l == label {
                        *f = value;
                    }
                });
        }
    }

    Ok(maps)
}

/// Add correlated texture to the channels of `params`
///
/// For each channel a fresh seed field is drawn, filtered with the
/// configured correlation length at `voxel_pitch` (mm), scaled by the channel
/// amplitude and added to the channel's field at the channel's tissue voxels.
/// Odd extents are synthesized one voxel larger and cropped to the labels.
pub fn add_texture<D, R>(
    maps: &mut PropertyMaps<D>,
    labels: &Array<u8, D>,
    params: &TextureParams,
    voxel_pitch: f64,
    rng: &mut R,
) -> Result<()>
where
    D: Dimension,
    R: Rng + ?Sized,
{
    params.validate()?;
    if maps.shape() != labels.shape() {
        return Err(PhantomError::ShapeMismatch {
            labels: labels.shape().to_vec(),
            field: maps.shape().to_vec(),
        });
    }

    // Synthesis needs even extents; odd axes get one extra voxel that is
    // cropped off again
    let mut padded = labels.raw_dim();
    for len in padded.slice_mut() {
        *len += *len % 2;
    }
    let shape = labels.shape().to_vec();

    for channel in &params.channels {
        debug!(
            "Texturing {} {} (amplitude {:.3})",
            channel.tissue.name(),
            channel.quantity.name(),
            channel.amplitude
        );
        let seed = channel.noise.draw(padded.clone(), rng)?;
        let full = synthesize(&seed, params.correlation_length, voxel_pitch)?;
        let texture = full.slice_each_axis(|ax| Slice::from(0..shape[ax.axis.index()]));

        let label = channel.tissue.label();
        let amplitude = channel.amplitude;
        Zip::from(maps.field_mut(channel.quantity))
            .and(labels)
            .and(&texture)
            .for_each(|f, &l, &t| {
                if l == label {
                    *f = (*f as f64 + amplitude * t) as f32;
                }
            });
    }

    Ok(())
}

/// Base properties followed by texture
pub fn assemble_properties<D, R>(
    labels: &Array<u8, D>,
    taxonomy: &Taxonomy,
    texture: &TextureParams,
    voxel_pitch: f64,
    rng: &mut R,
) -> Result<PropertyMaps<D>>
where
    D: Dimension,
    R: Rng + ?Sized,
{
    let mut maps = fill_base_properties(labels, taxonomy, rng)?;
    add_texture(&mut maps, labels, texture, voxel_pitch, rng)?;
    Ok(maps)
}
