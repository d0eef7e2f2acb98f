//! Discontinuous Galerkin integration
//!
//! The DG driver runs on a single grid level and adds two behaviors the
//! finite-volume paths do not have: an outer loop that repeats the local
//! time step until the accumulated physical time reaches a synchronization
//! target, and the ADER scheme where space and time are advanced in one
//! coupled step. Force integrals are evaluated once the loop finishes.

use crate::config::{IntegrationConfig, TimeScheme};
use crate::error::IntegrationError;
use crate::grid::{GridHierarchy, GridLevel};
use crate::solver::DgSolverState;
use crate::RunState;

/// Run one DG iteration.
pub fn dg_iteration<S: DgSolverState>(
    hierarchy: &GridHierarchy,
    solvers: &mut [S],
    config: &IntegrationConfig,
    run: &RunState,
) -> Result<(), IntegrationError> {
    let finest = run.active_finest;
    let geo = hierarchy.level(finest);
    let solver = &mut solvers[finest];

    if config.dg.jacobian_only {
        return solver.compute_spatial_jacobian(geo, config);
    }

    let sync_step = config.dg.sync_time_step.filter(|&dt| dt > 0.0);
    let use_ader = config.time_scheme == TimeScheme::AderDg;
    let mut time_evolved = 0.0;
    let mut sync_reached = false;

    while !sync_reached {
        solver.compute_time_step(geo, config, run.time_iter)?;
        sync_reached = match sync_step {
            Some(target) => {
                solver.check_time_synchronization(config, target, &mut time_evolved)?
            }
            None => true,
        };

        if use_ader {
            solver.ader_space_time_integrate(geo, config)?;
        } else {
            substep_loop(solver, geo, config)?;
        }
    }

    solver.compute_forces(geo, config)
}

fn substep_loop<S: DgSolverState>(
    solver: &mut S,
    geo: &GridLevel,
    config: &IntegrationConfig,
) -> Result<(), IntegrationError> {
    match config.time_scheme {
        TimeScheme::RungeKutta | TimeScheme::ClassicalRk4 => {}
        scheme => {
            return Err(IntegrationError::UnsupportedScheme {
                scheme,
                path: "discontinuous Galerkin",
            })
        }
    }

    for substep in 0..config.substep_count() {
        solver.preprocess(geo, config, substep, false)?;
        if substep == 0 {
            solver.fields_mut().snapshot_old_solution();
            if config.time_scheme == TimeScheme::ClassicalRk4 {
                solver.fields_mut().snapshot_new_solution();
            }
        }
        solver.space_integrate(geo, config, substep)?;
        solver.time_integrate(geo, config, substep)?;
        solver.postprocess(geo, config)?;
    }
    Ok(())
}
