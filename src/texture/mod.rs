//! Spectral texture synthesis
//!
//! Homogeneous per-tissue property values are perturbed with spatially
//! correlated noise: white noise filtered by an isotropic Gaussian in the
//! frequency domain.
//! - `spectral`: Gaussian transfer function and filtering
//! - `noise`: i.i.d. Gaussian / truncated-Gaussian seed fields

pub mod noise;
pub mod spectral;

pub use noise::{truncated_white_noise, white_noise, NoiseKind};
pub use spectral::{gaussian_transfer, synthesize, synthesize_2d, synthesize_3d};

use serde::{Deserialize, Serialize};

use crate::error::{PhantomError, Result};
use crate::taxonomy::{Quantity, Tissue};

/// One (tissue, quantity) pair that receives texture
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureChannel {
    pub tissue: Tissue,
    pub quantity: Quantity,
    pub noise: NoiseKind,
    /// Scale applied to the synthesized field before it is added
    pub amplitude: f64,
}

/// Parameters for texture synthesis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureParams {
    /// Correlation length in mm (default 0.21)
    pub correlation_length: f64,
    /// Channels in the order their noise is drawn
    pub channels: Vec<TextureChannel>,
}

impl Default for TextureParams {
    fn default() -> Self {
        // Amplitudes give a 2% standard deviation relative to a nominal
        // tissue value. Fat seeds are truncated at 0.9 sigma.
        let fat_noise = NoiseKind::TruncatedGaussian { bound: 0.9 };
        Self {
            correlation_length: 0.21,
            channels: vec![
                TextureChannel {
                    tissue: Tissue::Glandular,
                    quantity: Quantity::SpeedOfSound,
                    noise: NoiseKind::Gaussian,
                    amplitude: 1451.0 * 0.02,
                },
                TextureChannel {
                    tissue: Tissue::Glandular,
                    quantity: Quantity::Density,
                    noise: NoiseKind::Gaussian,
                    amplitude: 999.0 * 0.02,
                },
                TextureChannel {
                    tissue: Tissue::Fat,
                    quantity: Quantity::SpeedOfSound,
                    noise: fat_noise,
                    amplitude: 1420.0 * 0.02,
                },
                TextureChannel {
                    tissue: Tissue::Fat,
                    quantity: Quantity::Density,
                    noise: fat_noise,
                    amplitude: 915.0 * 0.02,
                },
            ],
        }
    }
}

impl TextureParams {
    pub fn validate(&self) -> Result<()> {
        let bad = |reason: String| PhantomError::InvalidTextureParams { reason };

        if !self.correlation_length.is_finite() || self.correlation_length < 0.0 {
            return Err(bad(format!(
                "correlation length {} must be finite and non-negative",
                self.correlation_length
            )));
        }
        for ch in &self.channels {
            if ch.quantity == Quantity::Attenuation {
                return Err(bad(format!("{} attenuation cannot be textured", ch.tissue.name())));
            }
            if !ch.amplitude.is_finite() {
                return Err(bad(format!(
                    "{} {} amplitude {} is not finite",
                    ch.tissue.name(), ch.quantity.name(), ch.amplitude
                )));
            }
            if let NoiseKind::TruncatedGaussian { bound } = ch.noise {
                if !(bound.is_finite() && bound > 0.0) {
                    return Err(bad(format!("noise bound {} must be positive", bound)));
                }
            }
        }
        Ok(())
    }
}
