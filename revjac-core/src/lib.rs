// Core modules of the crate
pub mod chain;
pub mod error;
pub mod grad_check;
pub mod layer;
pub mod utils;

// Re-export the main entry points so callers can reach them directly,
// e.g. `revjac_core::Chain`.
pub use chain::Chain;
pub use error::RevJacError;
pub use layer::{Affine, ElementwiseActivation, Layer, SumReduction};
