//! Grid transfer operators
//!
//! Volume-weighted restriction of solutions, residuals, eddy viscosity, and
//! gradients from a fine level to its agglomerated coarse level, plus the
//! injection prolongation used for corrections and full-multigrid startup.
//!
//! Restriction passes run in parallel over the receiving coarse points.
//! Prolongation scatters from each coarse point to its children and runs on
//! the control thread; the hierarchy guarantees each child has exactly one
//! parent, so no row is written twice.

use crate::config::IntegrationConfig;
use crate::grid::GridLevel;
use crate::solver::{EquationSystem, SolutionFields};
use ndarray::parallel::prelude::*;
use ndarray::{s, Axis, Zip};

/// Velocity (momentum) column range within a conserved-variable block.
fn velocity_columns(n_vars: usize, n_dim: usize) -> std::ops::Range<usize> {
    1..n_vars.min(n_dim + 1)
}

/// Restrict the fine solution onto the coarse level.
///
/// Each owned coarse point receives the volume-weighted average of its
/// children. Solid-wall points are then overridden: flow systems get zero
/// velocity (or the local grid velocity times density on a moving mesh),
/// adjoint systems get the prescribed wall vector. The caller exchanges the
/// coarse solution halo afterwards.
pub fn restrict_solution(
    system: EquationSystem,
    fine: &SolutionFields,
    coarse: &mut SolutionFields,
    geo_fine: &GridLevel,
    geo_coarse: &GridLevel,
    config: &IntegrationConfig,
) {
    let n_owned = geo_coarse.n_owned();
    let sol_fine = &fine.solution;

    coarse
        .solution
        .slice_mut(s![..n_owned, ..])
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(cp, mut row)| {
            row.fill(0.0);
            let vol_parent = geo_coarse.volume(cp);
            for &fp in &geo_coarse.children[cp] {
                let weight = geo_fine.volume(fp) / vol_parent;
                row.scaled_add(weight, &sol_fine.row(fp));
            }
        });

    let n_dim = geo_coarse.n_dim();
    let vel = velocity_columns(coarse.n_vars(), n_dim);
    for marker in &geo_coarse.markers {
        if !marker.kind.is_solid_wall() {
            continue;
        }
        for &cp in &marker.points {
            match system {
                EquationSystem::Flow => {
                    if config.grid_movement {
                        if let Some(gv) = geo_coarse.grid_velocity_at(cp) {
                            let density = coarse.solution[[cp, 0]];
                            for (d, col) in vel.clone().enumerate() {
                                coarse.solution[[cp, col]] = density * gv[d];
                            }
                            continue;
                        }
                    }
                    for col in vel.clone() {
                        coarse.solution[[cp, col]] = 0.0;
                    }
                }
                EquationSystem::AdjointFlow => {
                    for (d, col) in vel.clone().enumerate() {
                        coarse.solution[[cp, col]] =
                            config.adjoint_wall_velocity.get(d).copied().unwrap_or(0.0);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Restrict the fine working residual into the coarse truncation buffer.
///
/// Each child contribution is scaled by `damping`; pass 1.0 for an undamped
/// transfer. Velocity truncation error is zeroed on solid walls.
pub fn accumulate_restricted_residual(
    fine: &SolutionFields,
    coarse: &mut SolutionFields,
    geo_coarse: &GridLevel,
    damping: f64,
) {
    let n_owned = geo_coarse.n_owned();
    let res_fine = &fine.residual;

    coarse
        .truncation
        .slice_mut(s![..n_owned, ..])
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(cp, mut row)| {
            row.fill(0.0);
            for &fp in &geo_coarse.children[cp] {
                row.scaled_add(damping, &res_fine.row(fp));
            }
        });

    let vel = velocity_columns(coarse.n_vars(), geo_coarse.n_dim());
    for marker in &geo_coarse.markers {
        if !marker.kind.is_solid_wall() {
            continue;
        }
        for &cp in &marker.points {
            for col in vel.clone() {
                coarse.truncation[[cp, col]] = 0.0;
            }
        }
    }
}

/// Build the coarse forcing term `P = I(r_fine) - r_coarse`.
///
/// The coarse residual must already hold the coarse-level evaluation of the
/// restricted solution.
pub fn set_forcing_term(
    fine: &SolutionFields,
    coarse: &mut SolutionFields,
    geo_coarse: &GridLevel,
    damping: f64,
) {
    accumulate_restricted_residual(fine, coarse, geo_coarse, damping);

    let n_owned = geo_coarse.n_owned();
    let (truncation, residual) = (&mut coarse.truncation, &coarse.residual);
    Zip::from(truncation.slice_mut(s![..n_owned, ..]))
        .and(residual.slice(s![..n_owned, ..]))
        .par_for_each(|p, r| *p -= r);
}

/// Add the accumulated forcing term to the working residual.
pub fn add_truncation_to_residual(fields: &mut SolutionFields, geo: &GridLevel) {
    let n_owned = geo.n_owned();
    let (residual, truncation) = (&mut fields.residual, &fields.truncation);
    Zip::from(residual.slice_mut(s![..n_owned, ..]))
        .and(truncation.slice(s![..n_owned, ..]))
        .par_for_each(|r, p| *r += p);
}

/// Restrict eddy viscosity by volume weighting, forcing zero on solid walls.
pub fn restrict_eddy_viscosity(
    fine: &SolutionFields,
    coarse: &mut SolutionFields,
    geo_fine: &GridLevel,
    geo_coarse: &GridLevel,
) {
    let n_owned = geo_coarse.n_owned();
    let mu_fine = &fine.eddy_viscosity;

    Zip::indexed(coarse.eddy_viscosity.slice_mut(s![..n_owned])).par_for_each(|cp, mu| {
        let vol_parent = geo_coarse.volume(cp);
        *mu = geo_coarse.children[cp]
            .iter()
            .map(|&fp| mu_fine[fp] * geo_fine.volume(fp) / vol_parent)
            .sum();
    });

    for marker in &geo_coarse.markers {
        if !marker.kind.is_solid_wall() {
            continue;
        }
        for &cp in &marker.points {
            coarse.eddy_viscosity[cp] = 0.0;
        }
    }
}

/// Restrict solution gradients by volume weighting over all coarse points.
pub fn restrict_gradient(
    fine: &SolutionFields,
    coarse: &mut SolutionFields,
    geo_fine: &GridLevel,
    geo_coarse: &GridLevel,
) {
    let grad_fine = &fine.gradient;

    coarse
        .gradient
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(cp, mut block)| {
            block.fill(0.0);
            let vol_parent = geo_coarse.volume(cp);
            for &fp in &geo_coarse.children[cp] {
                let weight = geo_fine.volume(fp) / vol_parent;
                block.scaled_add(weight, &grad_fine.index_axis(Axis(0), fp));
            }
        });
}

/// Stage the coarse-grid correction `U_coarse - I(U_fine)` per coarse point.
///
/// Velocity components of the correction are zeroed on solid walls. The
/// caller exchanges the correction halo before depositing it on the fine
/// level.
pub fn compute_prolongated_correction(
    fine: &SolutionFields,
    coarse: &mut SolutionFields,
    geo_fine: &GridLevel,
    geo_coarse: &GridLevel,
) {
    let n_owned = geo_coarse.n_owned();
    let sol_fine = &fine.solution;
    let (correction, sol_coarse) = (&mut coarse.correction, &coarse.solution);

    correction
        .slice_mut(s![..n_owned, ..])
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(cp, mut row)| {
            row.assign(&sol_coarse.row(cp));
            let vol_parent = geo_coarse.volume(cp);
            for &fp in &geo_coarse.children[cp] {
                let weight = geo_fine.volume(fp) / vol_parent;
                row.scaled_add(-weight, &sol_fine.row(fp));
            }
        });

    let vel = velocity_columns(coarse.n_vars(), geo_coarse.n_dim());
    for marker in &geo_coarse.markers {
        if !marker.kind.is_solid_wall() {
            continue;
        }
        for &cp in &marker.points {
            for col in vel.clone() {
                coarse.correction[[cp, col]] = 0.0;
            }
        }
    }
}

/// Deposit the staged coarse correction into the fine working residual,
/// one copy per child of each owned coarse point.
pub fn deposit_correction(
    coarse: &SolutionFields,
    fine: &mut SolutionFields,
    geo_coarse: &GridLevel,
) {
    for cp in 0..geo_coarse.n_owned() {
        let row = coarse.correction.row(cp);
        for &fp in &geo_coarse.children[cp] {
            fine.residual.row_mut(fp).assign(&row);
        }
    }
}

/// Apply the correction carried in the working residual to the solution.
///
/// Non-finite entries are dropped first: a diverged coarse level must not
/// poison the fine solution.
pub fn apply_correction(fields: &mut SolutionFields, geo: &GridLevel, damping: f64) {
    let n_owned = geo.n_owned();
    let (solution, residual) = (&mut fields.solution, &mut fields.residual);
    Zip::from(solution.slice_mut(s![..n_owned, ..]))
        .and(residual.slice_mut(s![..n_owned, ..]))
        .par_for_each(|u, r| {
            if !r.is_finite() {
                *r = 0.0;
            }
            *u += damping * *r;
        });
}

/// Copy the coarse solution onto every child point (injection).
///
/// Used by the full-multigrid startup to seed the next finer level.
pub fn prolongate_solution(
    coarse: &SolutionFields,
    fine: &mut SolutionFields,
    geo_coarse: &GridLevel,
) {
    for cp in 0..geo_coarse.n_owned() {
        let row = coarse.solution.row(cp);
        for &fp in &geo_coarse.children[cp] {
            fine.solution.row_mut(fp).assign(&row);
        }
    }
}
