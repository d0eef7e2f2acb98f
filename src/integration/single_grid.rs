//! Single-grid time integration
//!
//! One smoothing pass on the active finest level with no coarse-grid
//! correction. Secondary systems still feed the multigrid hierarchy:
//! turbulence solutions and eddy viscosity are copied down through every
//! coarser level so coupled mean-flow cycles see consistent closure data.

use crate::config::IntegrationConfig;
use crate::error::IntegrationError;
use crate::grid::GridHierarchy;
use crate::multigrid::transfer;
use crate::solver::{EquationSystem, FieldKind, SolverState};
use crate::RunState;

/// Run one single-grid iteration.
pub fn single_grid_iteration<S: SolverState>(
    hierarchy: &GridHierarchy,
    solvers: &mut [S],
    config: &IntegrationConfig,
    run: &RunState,
) -> Result<(), IntegrationError> {
    debug_assert_eq!(solvers.len(), hierarchy.n_levels());

    let finest = run.active_finest;
    let geo = hierarchy.level(finest);
    let system = solvers[finest].system();

    {
        let solver = &mut solvers[finest];
        solver.preprocess(geo, config, 0, false)?;
        solver.fields_mut().snapshot_old_solution();
        solver.compute_time_step(geo, config, run.time_iter)?;
        solver.space_integrate(geo, config, 0)?;
        solver.time_integrate(geo, config, 0)?;
        solver.postprocess(geo, config)?;
        if system == EquationSystem::Heat {
            solver.compute_heat_fluxes(geo, config)?;
        }
    }

    if system == EquationSystem::Turbulence {
        for level in finest..hierarchy.n_levels() - 1 {
            let geo_fine = hierarchy.level(level);
            let geo_coarse = hierarchy.level(level + 1);
            let (finer, coarser) = solvers.split_at_mut(level + 1);
            let fine = &finer[level];
            let coarse = &mut coarser[0];

            transfer::restrict_solution(
                EquationSystem::Turbulence,
                fine.fields(),
                coarse.fields_mut(),
                geo_fine,
                geo_coarse,
                config,
            );
            coarse.exchange_halo(geo_coarse, FieldKind::Solution)?;
            transfer::restrict_eddy_viscosity(
                fine.fields(),
                coarse.fields_mut(),
                geo_fine,
                geo_coarse,
            );
            coarse.exchange_halo(geo_coarse, FieldKind::EddyViscosity)?;
        }
    }

    Ok(())
}
