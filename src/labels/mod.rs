//! Label volume processing
//!
//! Cleans a segmented (z, x, y) label volume before property assignment:
//! - `remove`: neighbour-majority replacement of a single label
//! - `cleanup`: class remapping and the vascular denoising loop
//! - `slab`: extraction of a slice or slab with stencil support slices
//!
//! Note: cleanup does not guarantee elimination in pathological inputs (for
//! example a label filling whole slices); it reports non-convergence instead
//! of looping.

pub mod cleanup;
pub mod remove;
pub mod slab;

pub use cleanup::{
    clean_labels, count_interior, denoise_extra_labels, denoise_extra_labels_with_progress,
    remap_subsumed_labels, CleanupOutcome, CleanupParams, Convergence,
};
pub use remove::{majority_neighbor, remove_label};
pub use slab::extract_slab;
