//! Error type shared by every stage of phantom construction

use thiserror::Error;

use crate::taxonomy::Tissue;

#[derive(Error, Debug)]
pub enum PhantomError {
    #[error("Invalid property spec: {reason}")]
    InvalidSpec { reason: String },
    #[error("Tissue {0:?} appears more than once in the taxonomy")]
    DuplicateTissue(Tissue),
    #[error("Axis {axis} has odd length {len}; spectral synthesis needs even extents")]
    OddAxis { axis: usize, len: usize },
    #[error("Cannot synthesize texture on an empty field")]
    EmptyField,
    #[error("Invalid texture parameters: {reason}")]
    InvalidTextureParams { reason: String },
    #[error("Label volume has {slices} slices; a {margin}-slice margin on each z end leaves no interior")]
    MissingMargin { slices: usize, margin: usize },
    #[error("Slab {target}±{thickness} does not fit in a volume of {slices} slices")]
    SliceOutOfRange { target: usize, thickness: usize, slices: usize },
    #[error("Label cleanup did not converge after {iterations} iterations (remaining: {remaining:?})")]
    NotConverged { iterations: usize, remaining: Vec<(u8, usize)> },
    #[error("Shape mismatch: labels {labels:?} vs field {field:?}")]
    ShapeMismatch { labels: Vec<usize>, field: Vec<usize> },
    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, PhantomError>;
