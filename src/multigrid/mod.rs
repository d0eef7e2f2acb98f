//! FAS multigrid: cycle orchestration, grid transfers, and smoothing

pub mod cycle;
pub mod smoother;
pub mod transfer;

pub use cycle::{multigrid_iteration, next_recursion_depth, RunState, CORRECTION_SMOOTH_COEFF};
pub use smoother::{smooth_correction, smooth_solution};
