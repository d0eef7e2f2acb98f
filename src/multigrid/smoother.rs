//! Damped Jacobi smoothing on the mesh graph
//!
//! Smooths a per-point field by averaging with edge-connected neighbors,
//! `x_i = (old_i + c * sum_j x_j) / (1 + c * degree_i)`. Used to regularize
//! the prolongated correction before it is applied, and available for the
//! solution itself. Physical boundary values are restored after every sweep
//! so smoothing never bleeds across walls or farfield markers.

use crate::grid::GridLevel;
use crate::solver::SolutionFields;
use ndarray::parallel::prelude::*;
use ndarray::{Array2, Axis, Zip};

/// Smooth the correction carried in the working residual.
pub fn smooth_correction(fields: &mut SolutionFields, geo: &GridLevel, sweeps: usize, coeff: f64) {
    let SolutionFields {
        residual,
        sweep_old,
        sweep_sum,
        ..
    } = fields;
    jacobi_sweeps(residual, sweep_old, sweep_sum, geo, sweeps, coeff);
}

/// Smooth the solution field directly.
pub fn smooth_solution(fields: &mut SolutionFields, geo: &GridLevel, sweeps: usize, coeff: f64) {
    let SolutionFields {
        solution,
        sweep_old,
        sweep_sum,
        ..
    } = fields;
    jacobi_sweeps(solution, sweep_old, sweep_sum, geo, sweeps, coeff);
}

fn jacobi_sweeps(
    field: &mut Array2<f64>,
    old: &mut Array2<f64>,
    sum: &mut Array2<f64>,
    geo: &GridLevel,
    sweeps: usize,
    coeff: f64,
) {
    if sweeps == 0 {
        return;
    }

    old.assign(field);

    for _ in 0..sweeps {
        {
            let field_ref: &Array2<f64> = field;
            sum.axis_iter_mut(Axis(0))
                .into_par_iter()
                .enumerate()
                .for_each(|(p, mut row)| {
                    row.fill(0.0);
                    for &q in &geo.neighbors[p] {
                        row += &field_ref.row(q);
                    }
                });
        }

        {
            let (old_ref, sum_ref): (&Array2<f64>, &Array2<f64>) = (old, sum);
            field
                .axis_iter_mut(Axis(0))
                .into_par_iter()
                .enumerate()
                .for_each(|(p, mut row)| {
                    let degree = geo.neighbors[p].len() as f64;
                    let factor = 1.0 / (1.0 + coeff * degree);
                    Zip::from(&mut row)
                        .and(old_ref.row(p))
                        .and(sum_ref.row(p))
                        .for_each(|x, o, s| *x = (o + coeff * s) * factor);
                });
        }

        // boundary restoration
        for marker in &geo.markers {
            if marker.kind.is_passthrough() {
                continue;
            }
            for &p in &marker.points {
                field.row_mut(p).assign(&old.row(p));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{BoundaryMarker, MarkerKind};
    use approx::assert_relative_eq;

    fn line_graph(n: usize) -> GridLevel {
        let neighbors = (0..n)
            .map(|i| {
                let mut nb = Vec::new();
                if i > 0 {
                    nb.push(i - 1);
                }
                if i + 1 < n {
                    nb.push(i + 1);
                }
                nb
            })
            .collect();
        GridLevel::new(1, vec![1.0; n], neighbors, vec![vec![]; n], vec![])
    }

    #[test]
    fn test_zero_sweeps_is_a_no_op() {
        let geo = line_graph(4);
        let mut fields = SolutionFields::new(4, 1, 1);
        for p in 0..4 {
            fields.residual[[p, 0]] = p as f64;
        }
        let before = fields.residual.clone();
        smooth_correction(&mut fields, &geo, 0, 1.25);
        assert_eq!(fields.residual, before);
    }

    #[test]
    fn test_constant_field_is_a_fixed_point() {
        let geo = line_graph(5);
        let mut fields = SolutionFields::new(5, 2, 1);
        fields.residual.fill(3.0);
        smooth_correction(&mut fields, &geo, 3, 1.25);
        for p in 0..5 {
            assert_relative_eq!(fields.residual[[p, 0]], 3.0, epsilon = 1e-12);
            assert_relative_eq!(fields.residual[[p, 1]], 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_sweep_matches_formula() {
        let geo = line_graph(3);
        let mut fields = SolutionFields::new(3, 1, 1);
        fields.residual[[0, 0]] = 0.0;
        fields.residual[[1, 0]] = 1.0;
        fields.residual[[2, 0]] = 0.0;
        let c = 1.25;

        smooth_correction(&mut fields, &geo, 1, c);

        // end points: (0 + c*1)/(1 + c*1); middle: (1 + c*0)/(1 + c*2)
        assert_relative_eq!(fields.residual[[0, 0]], c / (1.0 + c));
        assert_relative_eq!(fields.residual[[1, 0]], 1.0 / (1.0 + 2.0 * c));
        assert_relative_eq!(fields.residual[[2, 0]], c / (1.0 + c));
    }

    #[test]
    fn test_boundary_values_are_restored() {
        let mut geo = line_graph(4);
        geo.markers.push(BoundaryMarker::new(
            "wall",
            MarkerKind::HeatFluxWall,
            vec![0],
        ));
        let mut fields = SolutionFields::new(4, 1, 1);
        fields.residual[[0, 0]] = 10.0;
        fields.residual[[2, 0]] = 2.0;

        smooth_correction(&mut fields, &geo, 2, 1.25);

        assert_eq!(
            fields.residual[[0, 0]],
            10.0,
            "wall value must survive every sweep"
        );
        assert_ne!(fields.residual[[2, 0]], 2.0, "interior points are smoothed");
    }

    #[test]
    fn test_internal_markers_are_not_restored() {
        let mut geo = line_graph(4);
        geo.markers
            .push(BoundaryMarker::new("cut", MarkerKind::Internal, vec![0]));
        let mut fields = SolutionFields::new(4, 1, 1);
        fields.residual[[0, 0]] = 10.0;

        smooth_correction(&mut fields, &geo, 1, 1.25);

        assert_ne!(fields.residual[[0, 0]], 10.0);
    }

    #[test]
    fn test_smooth_solution_targets_solution_field() {
        let geo = line_graph(3);
        let mut fields = SolutionFields::new(3, 1, 1);
        fields.solution[[1, 0]] = 1.0;
        let residual_before = fields.residual.clone();

        smooth_solution(&mut fields, &geo, 1, 0.5);

        assert_eq!(fields.residual, residual_before);
        assert_relative_eq!(fields.solution[[1, 0]], 1.0 / 2.0);
    }
}
