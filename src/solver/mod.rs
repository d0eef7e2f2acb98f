//! Solver capability traits
//!
//! The engine sequences the lifecycle of plugged-in solvers; the traits here
//! are the seam between the orchestration and the discretization. One
//! `SolverState` instance exists per grid level.

pub mod fields;

pub use fields::SolutionFields;

use crate::config::IntegrationConfig;
use crate::error::IntegrationError;
use crate::grid::GridLevel;
use serde::{Deserialize, Serialize};

/// Equation system a solver integrates. Selects finalize outputs and the
/// wall treatment during solution restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquationSystem {
    Flow,
    Turbulence,
    AdjointFlow,
    Heat,
    Structural,
}

impl EquationSystem {
    /// Direct problems are eligible for the full-multigrid startup.
    pub fn supports_full_multigrid(self) -> bool {
        matches!(self, EquationSystem::Flow)
    }
}

/// Field selected for a halo exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Solution,
    OldSolution,
    Correction,
    EddyViscosity,
    Gradient,
}

/// Lifecycle of a solver on one grid level.
///
/// The engine calls these in a fixed order per substep: `preprocess`,
/// `space_integrate`, `time_integrate`, `postprocess`, with
/// `compute_time_step` once per smoothing pass. Halo exchanges are requested
/// by the engine after each grid transfer; implementations that run on a
/// single partition can make `exchange_halo` a no-op.
pub trait SolverState {
    fn system(&self) -> EquationSystem;

    fn fields(&self) -> &SolutionFields;
    fn fields_mut(&mut self) -> &mut SolutionFields;

    /// Prepare for a residual evaluation. `full_update` requests the
    /// complete refresh used when finishing an iteration on the finest level.
    fn preprocess(
        &mut self,
        grid: &GridLevel,
        config: &IntegrationConfig,
        substep: usize,
        full_update: bool,
    ) -> Result<(), IntegrationError>;

    /// Evaluate the spatial residual into `fields().residual`.
    fn space_integrate(
        &mut self,
        grid: &GridLevel,
        config: &IntegrationConfig,
        substep: usize,
    ) -> Result<(), IntegrationError>;

    /// Advance the solution with the residual for one substep.
    fn time_integrate(
        &mut self,
        grid: &GridLevel,
        config: &IntegrationConfig,
        substep: usize,
    ) -> Result<(), IntegrationError>;

    fn postprocess(
        &mut self,
        grid: &GridLevel,
        config: &IntegrationConfig,
    ) -> Result<(), IntegrationError>;

    /// Compute the stable local (or global) time step.
    fn compute_time_step(
        &mut self,
        grid: &GridLevel,
        config: &IntegrationConfig,
        outer_iter: u64,
    ) -> Result<(), IntegrationError>;

    /// Update halo points of the given field from the owning partitions.
    fn exchange_halo(
        &mut self,
        grid: &GridLevel,
        field: FieldKind,
    ) -> Result<(), IntegrationError>;

    /// Surface force integrals (flow systems).
    fn compute_forces(
        &mut self,
        _grid: &GridLevel,
        _config: &IntegrationConfig,
    ) -> Result<(), IntegrationError> {
        Ok(())
    }

    /// Buffet sensor metric (flow systems with buffet monitoring).
    fn compute_buffet_metric(
        &mut self,
        _grid: &GridLevel,
        _config: &IntegrationConfig,
    ) -> Result<(), IntegrationError> {
        Ok(())
    }

    /// Surface sensitivities (adjoint systems).
    fn compute_sensitivities(
        &mut self,
        _grid: &GridLevel,
        _config: &IntegrationConfig,
    ) -> Result<(), IntegrationError> {
        Ok(())
    }

    /// Sensitivity smoothing (adjoint systems, when enabled).
    fn smooth_sensitivities(
        &mut self,
        _grid: &GridLevel,
        _config: &IntegrationConfig,
    ) -> Result<(), IntegrationError> {
        Ok(())
    }

    /// Integrated wall heat fluxes (heat system).
    fn compute_heat_fluxes(
        &mut self,
        _grid: &GridLevel,
        _config: &IntegrationConfig,
    ) -> Result<(), IntegrationError> {
        Ok(())
    }

    /// Scalar convergence monitor reported after finalize.
    fn monitor(&self) -> f64 {
        0.0
    }
}

/// Extra capabilities of a discontinuous Galerkin solver.
pub trait DgSolverState: SolverState {
    /// Build the spatial Jacobian without advancing the solution.
    fn compute_spatial_jacobian(
        &mut self,
        grid: &GridLevel,
        config: &IntegrationConfig,
    ) -> Result<(), IntegrationError>;

    /// Coupled ADER space-time step.
    fn ader_space_time_integrate(
        &mut self,
        grid: &GridLevel,
        config: &IntegrationConfig,
    ) -> Result<(), IntegrationError>;

    /// Accumulate the evolved physical time, truncating the stable step so
    /// the run lands exactly on `sync_step`. Returns `true` once the target
    /// has been reached.
    fn check_time_synchronization(
        &mut self,
        config: &IntegrationConfig,
        sync_step: f64,
        time_evolved: &mut f64,
    ) -> Result<bool, IntegrationError>;
}

/// Lifecycle of a nonlinear structural solver.
///
/// Structural iterations pass the discretization operators explicitly
/// through every stage instead of holding them in the solver.
pub trait StructuralSolver {
    type Numerics: ?Sized;

    fn preprocess(
        &mut self,
        grid: &GridLevel,
        numerics: &mut Self::Numerics,
        config: &IntegrationConfig,
    ) -> Result<(), IntegrationError>;

    fn space_integrate(
        &mut self,
        grid: &GridLevel,
        numerics: &mut Self::Numerics,
        config: &IntegrationConfig,
    ) -> Result<(), IntegrationError>;

    fn time_integrate(
        &mut self,
        grid: &GridLevel,
        numerics: &mut Self::Numerics,
        config: &IntegrationConfig,
    ) -> Result<(), IntegrationError>;

    fn postprocess(
        &mut self,
        grid: &GridLevel,
        numerics: &mut Self::Numerics,
        config: &IntegrationConfig,
    ) -> Result<(), IntegrationError>;
}
