//! USCT breast phantom core
//!
//! Turns a segmented breast label volume into speed-of-sound, density and
//! attenuation volumes for ultrasound computed tomography simulations.
//!
//! # Modules
//! - `taxonomy`: Tissue labels and per-tissue property distributions
//! - `sampler`: Constant and truncated normal property values
//! - `labels`: Label remapping, vessel removal and slab extraction
//! - `texture`: Gaussian-correlated texture by spectral filtering
//! - `fft`: N-dimensional FFT operations using rustfft
//! - `assemble`: Property field assembly from labels
//! - `attenuation`: Power-law exponent of fat/glandular mixtures
//! - `pipeline`: Configuration and end-to-end phantom construction

pub mod error;

// Core modules
pub mod fft;
pub mod sampler;
pub mod taxonomy;

// Algorithm modules
pub mod assemble;
pub mod attenuation;
pub mod labels;
pub mod texture;

pub mod pipeline;

pub use error::{PhantomError, Result};
pub use pipeline::{build_phantom, Phantom, PhantomConfig};
pub use taxonomy::{Quantity, Taxonomy, Tissue};
