//! FAS multigrid cycle orchestration
//!
//! Drives one nonlinear multigrid iteration: optional full-multigrid
//! startup, the recursive V/W cycle with truncation-error forcing, and the
//! finest-level finalize that refreshes the solution and evaluates the
//! per-system output quantities.

use crate::config::{IntegrationConfig, MgCycleType, TimeScheme};
use crate::error::IntegrationError;
use crate::grid::{GridHierarchy, GridLevel};
use crate::multigrid::{smoother, transfer};
use crate::solver::{EquationSystem, FieldKind, SolverState};

/// Relaxation coefficient for smoothing the prolongated correction.
pub const CORRECTION_SMOOTH_COEFF: f64 = 1.25;

/// Mutable per-run state owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Index of the level currently acting as the finest grid. Full
    /// multigrid starts coarse and walks this down to zero.
    pub active_finest: usize,
    /// Set by external convergence monitoring; consumed by the
    /// full-multigrid startup when it advances one level.
    pub fmg_convergence: bool,
    /// Outer (physical time) iteration counter.
    pub time_iter: u64,
}

/// Recursion repeat factor passed to the next coarser level.
///
/// Returns the incoming factor unchanged, except one descent above the
/// coarsest pair where it is forced to zero so the bottom level is visited
/// once per descent regardless of the cycle shape.
pub fn next_recursion_depth(level: usize, n_levels: usize, current: usize) -> usize {
    if n_levels >= 3 && level == n_levels - 3 {
        0
    } else {
        current
    }
}

/// Run one FAS multigrid iteration over the hierarchy.
///
/// `solvers` holds one state per grid level, finest first. Returns the
/// finest solver's convergence monitor.
pub fn multigrid_iteration<S: SolverState>(
    hierarchy: &GridHierarchy,
    solvers: &mut [S],
    config: &IntegrationConfig,
    run: &mut RunState,
) -> Result<f64, IntegrationError> {
    debug_assert_eq!(solvers.len(), hierarchy.n_levels());

    let system = solvers[0].system();
    let full_mg = config.multigrid.cycle == MgCycleType::FullMg;

    // Full multigrid startup: once the active level has converged, seed the
    // next finer level by injection and move the active finest index down.
    if full_mg
        && !config.restart
        && system.supports_full_multigrid()
        && run.fmg_convergence
        && run.active_finest > 0
    {
        let finest = run.active_finest;
        let (finer, coarser) = solvers.split_at_mut(finest);
        transfer::prolongate_solution(
            coarser[0].fields(),
            finer[finest - 1].fields_mut(),
            hierarchy.level(finest),
        );
        run.active_finest -= 1;
        run.fmg_convergence = false;
        log::info!(
            "full multigrid startup: level {} converged, continuing on level {}",
            finest,
            run.active_finest
        );
    }

    let repeat = config.multigrid.cycle.repeat_factor();
    log::debug!(
        "multigrid iteration on levels {}..{} ({:?}, {:?})",
        run.active_finest,
        hierarchy.n_levels() - 1,
        config.multigrid.cycle,
        system
    );

    multigrid_cycle(
        hierarchy,
        solvers,
        run.active_finest,
        repeat,
        config,
        run.time_iter,
    )?;

    finalize(hierarchy, solvers, config, run.active_finest)
}

/// One recursive cycle starting at `level`.
fn multigrid_cycle<S: SolverState>(
    hierarchy: &GridHierarchy,
    solvers: &mut [S],
    level: usize,
    repeat: usize,
    config: &IntegrationConfig,
    time_iter: u64,
) -> Result<(), IntegrationError> {
    let n_levels = hierarchy.n_levels();
    let geo_fine = hierarchy.level(level);

    // presmoothing
    for _ in 0..config.multigrid.pre_smooth_at(level) {
        time_substeps(&mut solvers[level], geo_fine, config, time_iter)?;
    }

    if level + 1 >= n_levels {
        return Ok(());
    }
    let geo_coarse = hierarchy.level(level + 1);

    // forcing-term construction
    {
        let (finer, coarser) = solvers.split_at_mut(level + 1);
        let fine = &mut finer[level];
        let coarse = &mut coarser[0];

        // r_k = P_k + F_k(u_k)
        fine.preprocess(geo_fine, config, 0, false)?;
        fine.space_integrate(geo_fine, config, 0)?;
        transfer::add_truncation_to_residual(fine.fields_mut(), geo_fine);

        // u_{k+1} = I(u_k), then r_{k+1} = F_{k+1}(I(u_k))
        transfer::restrict_solution(
            fine.system(),
            fine.fields(),
            coarse.fields_mut(),
            geo_fine,
            geo_coarse,
            config,
        );
        coarse.exchange_halo(geo_coarse, FieldKind::Solution)?;
        coarse.preprocess(geo_coarse, config, 0, false)?;
        coarse.space_integrate(geo_coarse, config, 0)?;

        // P_{k+1} = I(r_k) - r_{k+1}
        transfer::set_forcing_term(
            fine.fields(),
            coarse.fields_mut(),
            geo_coarse,
            config.multigrid.damp_restriction,
        );
    }

    // recursive descent, repeated for W-shaped cycles
    let next = next_recursion_depth(level, n_levels, repeat);
    for _ in 0..=repeat {
        multigrid_cycle(hierarchy, solvers, level + 1, next, config, time_iter)?;
    }

    // coarse-grid correction
    {
        let (finer, coarser) = solvers.split_at_mut(level + 1);
        let fine = &mut finer[level];
        let coarse = &mut coarser[0];

        transfer::compute_prolongated_correction(
            fine.fields(),
            coarse.fields_mut(),
            geo_fine,
            geo_coarse,
        );
        coarse.exchange_halo(geo_coarse, FieldKind::Correction)?;
        transfer::deposit_correction(coarse.fields(), fine.fields_mut(), geo_coarse);
        smoother::smooth_correction(
            fine.fields_mut(),
            geo_fine,
            config.multigrid.correction_smooth_at(level),
            CORRECTION_SMOOTH_COEFF,
        );
        transfer::apply_correction(fine.fields_mut(), geo_fine, config.multigrid.damp_correction);
        fine.exchange_halo(geo_fine, FieldKind::Solution)?;
    }

    // postsmoothing
    for _ in 0..config.multigrid.post_smooth_at(level) {
        time_substeps(&mut solvers[level], geo_fine, config, time_iter)?;
    }

    Ok(())
}

/// One smoothing pass: the solver substep loop for the configured scheme.
fn time_substeps<S: SolverState>(
    solver: &mut S,
    geo: &GridLevel,
    config: &IntegrationConfig,
    time_iter: u64,
) -> Result<(), IntegrationError> {
    for substep in 0..config.substep_count() {
        solver.preprocess(geo, config, substep, false)?;
        if substep == 0 {
            solver.fields_mut().snapshot_old_solution();
            if config.time_scheme == TimeScheme::ClassicalRk4 {
                solver.fields_mut().snapshot_new_solution();
            }
            solver.compute_time_step(geo, config, time_iter)?;
        }
        solver.space_integrate(geo, config, substep)?;
        solver.time_integrate(geo, config, substep)?;
        solver.postprocess(geo, config)?;
    }
    Ok(())
}

/// Finest-level finalize: refresh the solution state and evaluate the
/// output quantities the equation system provides.
fn finalize<S: SolverState>(
    hierarchy: &GridHierarchy,
    solvers: &mut [S],
    config: &IntegrationConfig,
    active_finest: usize,
) -> Result<f64, IntegrationError> {
    solvers[0].preprocess(hierarchy.level(0), config, 0, true)?;

    let geo = hierarchy.level(active_finest);
    let solver = &mut solvers[active_finest];
    match solver.system() {
        EquationSystem::Flow => {
            solver.compute_forces(geo, config)?;
            if config.buffet_monitoring {
                solver.compute_buffet_metric(geo, config)?;
            }
        }
        EquationSystem::AdjointFlow => {
            solver.compute_sensitivities(geo, config)?;
            if config.sensitivity_smoothing {
                solver.smooth_sensitivities(geo, config)?;
            }
        }
        _ => {}
    }

    let monitor = solver.monitor();
    log::debug!("iteration finalize, monitor = {monitor:.6e}");
    Ok(monitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_recursion_depth_forces_v_near_the_bottom() {
        // Three levels: descents from level 0 reach the pair above the
        // coarsest, so the repeat factor drops to zero immediately.
        assert_eq!(next_recursion_depth(0, 3, 1), 0);
        // Four levels: level 0 keeps the W shape, level 1 flattens it.
        assert_eq!(next_recursion_depth(0, 4, 1), 1);
        assert_eq!(next_recursion_depth(1, 4, 1), 0);
        // Once flattened it stays flat further down.
        assert_eq!(next_recursion_depth(2, 4, 0), 0);
    }

    #[test]
    fn test_next_recursion_depth_two_levels() {
        assert_eq!(next_recursion_depth(0, 2, 1), 1);
        assert_eq!(next_recursion_depth(0, 2, 0), 0);
    }
}
