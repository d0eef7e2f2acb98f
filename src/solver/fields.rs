//! Per-level solution storage

use ndarray::{Array1, Array2, Array3};

/// Field buffers for one solver on one grid level.
///
/// Rows are points, columns are conserved variables. Flow-type systems
/// store `[density, momentum_x, .., energy, ..]` so velocity components
/// occupy columns `1..=n_dim`.
#[derive(Debug, Clone)]
pub struct SolutionFields {
    /// Current solution
    pub solution: Array2<f64>,
    /// Snapshot taken at the start of each smoothing pass
    pub old_solution: Array2<f64>,
    /// Accumulator snapshot for the classical RK4 scheme
    pub new_solution: Array2<f64>,
    /// Working residual; also carries the deposited coarse-grid correction
    pub residual: Array2<f64>,
    /// Pre-sweep snapshot used by the Jacobi smoother
    pub sweep_old: Array2<f64>,
    /// Neighbor accumulation buffer used by the Jacobi smoother
    pub sweep_sum: Array2<f64>,
    /// Truncation-error forcing accumulated by residual restriction
    pub truncation: Array2<f64>,
    /// Staged prolongated correction, indexed by this level's points
    pub correction: Array2<f64>,
    /// Turbulent eddy viscosity per point
    pub eddy_viscosity: Array1<f64>,
    /// Solution gradients, `n_points x n_vars x n_dim`
    pub gradient: Array3<f64>,
}

impl SolutionFields {
    pub fn new(n_points: usize, n_vars: usize, n_dim: usize) -> Self {
        Self {
            solution: Array2::zeros((n_points, n_vars)),
            old_solution: Array2::zeros((n_points, n_vars)),
            new_solution: Array2::zeros((n_points, n_vars)),
            residual: Array2::zeros((n_points, n_vars)),
            sweep_old: Array2::zeros((n_points, n_vars)),
            sweep_sum: Array2::zeros((n_points, n_vars)),
            truncation: Array2::zeros((n_points, n_vars)),
            correction: Array2::zeros((n_points, n_vars)),
            eddy_viscosity: Array1::zeros(n_points),
            gradient: Array3::zeros((n_points, n_vars, n_dim)),
        }
    }

    pub fn n_points(&self) -> usize {
        self.solution.nrows()
    }

    pub fn n_vars(&self) -> usize {
        self.solution.ncols()
    }

    pub fn n_dim(&self) -> usize {
        self.gradient.shape()[2]
    }

    /// Copy the solution into the old-solution snapshot.
    pub fn snapshot_old_solution(&mut self) {
        self.old_solution.assign(&self.solution);
    }

    /// Copy the solution into the new-solution accumulator.
    pub fn snapshot_new_solution(&mut self) {
        self.new_solution.assign(&self.solution);
    }
}
