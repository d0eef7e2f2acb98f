//! Full Approximation Scheme multigrid integration engine
//!
//! This crate drives the outer time and space integration of nonlinear
//! finite-volume field solvers over a hierarchy of agglomerated grids.
//!
//! # Features
//!
//! - **FAS multigrid**: V-cycle, W-cycle, and full-multigrid startup with
//!   truncation-error forcing on every coarse level
//! - **Grid transfers**: volume-weighted restriction of solutions, residuals,
//!   eddy viscosity, and gradients; injection prolongation of corrections
//! - **Correction smoothing**: damped Jacobi sweeps on the mesh graph with
//!   boundary restoration
//! - **Alternate drivers**: single-grid, structural, and discontinuous
//!   Galerkin iteration paths sharing the same solver lifecycle
//!
//! The engine owns no discretization: solvers plug in through the
//! [`SolverState`] trait and the engine sequences their lifecycle calls,
//! grid transfers, and halo exchanges.
//!
//! # Example
//!
//! ```ignore
//! use fas_multigrid::{multigrid_iteration, IntegrationConfig, RunState};
//!
//! let config = IntegrationConfig::default();
//! let mut run = RunState::default();
//! let monitor = multigrid_iteration(&hierarchy, &mut solvers, &config, &mut run)?;
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod integration;
pub mod multigrid;
pub mod solver;

pub use config::{DgSettings, IntegrationConfig, MgCycleType, MultigridSettings, TimeScheme};
pub use error::IntegrationError;
pub use grid::{BoundaryMarker, GridHierarchy, GridLevel, MarkerKind};
pub use integration::{dg_iteration, single_grid_iteration, structural_iteration};
pub use multigrid::{multigrid_iteration, next_recursion_depth, RunState};
pub use solver::{
    DgSolverState, EquationSystem, FieldKind, SolutionFields, SolverState, StructuralSolver,
};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
