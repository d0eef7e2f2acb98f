//! Structural (FEA) integration
//!
//! Nonlinear structural iterations run on the finest grid only and thread
//! the discretization operators through every lifecycle stage.

use crate::config::IntegrationConfig;
use crate::error::IntegrationError;
use crate::grid::GridHierarchy;
use crate::solver::StructuralSolver;

/// Run one structural iteration.
pub fn structural_iteration<S: StructuralSolver>(
    hierarchy: &GridHierarchy,
    solver: &mut S,
    numerics: &mut S::Numerics,
    config: &IntegrationConfig,
) -> Result<(), IntegrationError> {
    let geo = hierarchy.finest();
    solver.preprocess(geo, numerics, config)?;
    solver.space_integrate(geo, numerics, config)?;
    solver.time_integrate(geo, numerics, config)?;
    solver.postprocess(geo, numerics, config)?;
    Ok(())
}
