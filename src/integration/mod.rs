//! Alternate integration drivers sharing the solver lifecycle

pub mod dg;
pub mod single_grid;
pub mod structural;

pub use dg::dg_iteration;
pub use single_grid::single_grid_iteration;
pub use structural::structural_iteration;
