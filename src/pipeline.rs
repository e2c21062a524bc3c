//! End-to-end phantom construction
//!
//! raw labels -> cleanup -> base properties -> texture

use log::info;
use ndarray::{Array3, Axis, Ix3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::assemble::{assemble_properties, PropertyMaps};
use crate::error::{PhantomError, Result};
use crate::labels::{clean_labels, CleanupParams};
use crate::taxonomy::Taxonomy;
use crate::texture::TextureParams;

/// Everything the core needs besides the label volume and a random source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhantomConfig {
    pub taxonomy: Taxonomy,
    pub cleanup: CleanupParams,
    pub texture: TextureParams,
    /// Voxel pitch in mm used by texture synthesis (default 0.1)
    pub voxel_pitch: f64,
}

impl Default for PhantomConfig {
    fn default() -> Self {
        Self {
            taxonomy: Taxonomy::default(),
            cleanup: CleanupParams::default(),
            texture: TextureParams::default(),
            voxel_pitch: 0.1,
        }
    }
}

impl PhantomConfig {
    /// Parse a JSON configuration; omitted sections take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PhantomConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.taxonomy.validate()?;
        self.texture.validate()?;
        if !(self.voxel_pitch.is_finite() && self.voxel_pitch > 0.0) {
            return Err(PhantomError::InvalidTextureParams {
                reason: format!("voxel pitch {} must be positive", self.voxel_pitch),
            });
        }
        if self.cleanup.passes_per_iteration == 0 {
            return Err(PhantomError::InvalidArgument(
                "cleanup needs at least one pass per iteration".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cleaned labels and the acoustic property fields built from them
#[derive(Clone, Debug)]
pub struct Phantom {
    pub labels: Array3<u8>,
    pub maps: PropertyMaps<Ix3>,
    pub cleanup_iterations: usize,
}

/// Build a phantom from a raw label volume with axes (z, x, y)
///
/// The volume must carry `config.cleanup.margin` support slices at each z
/// end; they are removed from the output. A single remaining slice is
/// treated as a 2D phantom and textured in-plane.
pub fn build_phantom<R: Rng + ?Sized>(raw: Array3<u8>, config: &PhantomConfig, rng: &mut R) -> Result<Phantom> {
    config.validate()?;

    let outcome = clean_labels(raw, &config.cleanup)?;
    let (nz, nx, ny) = outcome.labels.dim();
    info!("Assigning acoustic properties on {}x{}x{}", nz, nx, ny);

    let maps = if nz == 1 {
        let slice = outcome.labels.index_axis(Axis(0), 0).to_owned();
        let maps = assemble_properties(&slice, &config.taxonomy, &config.texture, config.voxel_pitch, rng)?;
        PropertyMaps {
            sos: maps.sos.insert_axis(Axis(0)),
            density: maps.density.insert_axis(Axis(0)),
            attenuation: maps.attenuation.insert_axis(Axis(0)),
        }
    } else {
        assemble_properties(
            &outcome.labels,
            &config.taxonomy,
            &config.texture,
            config.voxel_pitch,
            rng,
        )?
    };

    Ok(Phantom {
        labels: outcome.labels,
        maps,
        cleanup_iterations: outcome.iterations,
    })
}
