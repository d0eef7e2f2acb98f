//! Integration configuration
//!
//! Immutable settings consumed by every iteration driver: multigrid cycle
//! shape, per-level smoothing counts, damping factors, and time scheme.

use serde::{Deserialize, Serialize};

/// Multigrid cycle type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MgCycleType {
    /// V-cycle: single descent per level
    V,
    /// W-cycle: repeated descent on intermediate levels
    W,
    /// Full multigrid: V-cycles with coarse-to-fine startup
    FullMg,
}

impl MgCycleType {
    /// Recursion repeat factor for intermediate levels. Full multigrid
    /// runs V-shaped cycles once the startup phase has chosen a level.
    pub fn repeat_factor(self) -> usize {
        match self {
            MgCycleType::V | MgCycleType::FullMg => 0,
            MgCycleType::W => 1,
        }
    }
}

/// Time integration scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeScheme {
    /// Backward Euler with a linear solve per step
    EulerImplicit,
    /// Forward Euler
    EulerExplicit,
    /// Low-storage explicit Runge-Kutta with a configurable stage count
    RungeKutta,
    /// Classical fourth-order Runge-Kutta (fixed four stages)
    ClassicalRk4,
    /// ADER-DG coupled space-time integration
    AderDg,
}

/// Multigrid cycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultigridSettings {
    /// Cycle shape
    pub cycle: MgCycleType,
    /// Pre-smoothing iterations per level (last entry repeats for deeper levels)
    pub pre_smooth: Vec<usize>,
    /// Post-smoothing iterations per level
    pub post_smooth: Vec<usize>,
    /// Jacobi sweeps applied to the prolongated correction per level
    pub correction_smooth: Vec<usize>,
    /// Damping applied to the prolongated correction before the update
    pub damp_correction: f64,
    /// Damping applied to restricted residuals in the forcing term
    pub damp_restriction: f64,
}

impl Default for MultigridSettings {
    fn default() -> Self {
        Self {
            cycle: MgCycleType::V,
            pre_smooth: vec![1],
            post_smooth: vec![0],
            correction_smooth: vec![0],
            damp_correction: 0.75,
            damp_restriction: 0.75,
        }
    }
}

impl MultigridSettings {
    pub fn pre_smooth_at(&self, level: usize) -> usize {
        per_level(&self.pre_smooth, level, 1)
    }

    pub fn post_smooth_at(&self, level: usize) -> usize {
        per_level(&self.post_smooth, level, 0)
    }

    pub fn correction_smooth_at(&self, level: usize) -> usize {
        per_level(&self.correction_smooth, level, 0)
    }
}

fn per_level(counts: &[usize], level: usize, fallback: usize) -> usize {
    counts
        .get(level)
        .or_else(|| counts.last())
        .copied()
        .unwrap_or(fallback)
}

/// Settings specific to the discontinuous Galerkin driver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DgSettings {
    /// Physical synchronization time step for time-accurate runs.
    /// `None` (or a non-positive value) runs a single pass per iteration.
    pub sync_time_step: Option<f64>,
    /// Compute the spatial Jacobian only, skipping the integration loop
    pub jacobian_only: bool,
}

/// Top-level configuration for all integration drivers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationConfig {
    pub multigrid: MultigridSettings,
    pub time_scheme: TimeScheme,
    /// Stage count for [`TimeScheme::RungeKutta`]
    pub n_rk_stages: usize,
    /// Run restarted from a previous solution (disables full-MG startup)
    pub restart: bool,
    /// Mesh is moving; wall restriction uses the local grid velocity
    pub grid_movement: bool,
    /// Prescribed wall velocity components for adjoint restriction
    pub adjoint_wall_velocity: Vec<f64>,
    /// Evaluate the buffet metric after the force integrals
    pub buffet_monitoring: bool,
    /// Smooth surface sensitivities after they are computed
    pub sensitivity_smoothing: bool,
    pub dg: DgSettings,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            multigrid: MultigridSettings::default(),
            time_scheme: TimeScheme::EulerImplicit,
            n_rk_stages: 3,
            restart: false,
            grid_movement: false,
            adjoint_wall_velocity: Vec::new(),
            buffet_monitoring: false,
            sensitivity_smoothing: false,
            dg: DgSettings::default(),
        }
    }
}

impl IntegrationConfig {
    /// Number of solver substeps per smoothing pass. Implicit and explicit
    /// Euler take one pass; Runge-Kutta schemes loop over their stages.
    pub fn substep_count(&self) -> usize {
        match self.time_scheme {
            TimeScheme::EulerImplicit | TimeScheme::EulerExplicit | TimeScheme::AderDg => 1,
            TimeScheme::RungeKutta => self.n_rk_stages.max(1),
            TimeScheme::ClassicalRk4 => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substep_count_per_scheme() {
        let mut config = IntegrationConfig::default();
        assert_eq!(config.substep_count(), 1);

        config.time_scheme = TimeScheme::RungeKutta;
        config.n_rk_stages = 5;
        assert_eq!(config.substep_count(), 5);

        config.n_rk_stages = 0;
        assert_eq!(config.substep_count(), 1, "stage count is clamped to 1");

        config.time_scheme = TimeScheme::ClassicalRk4;
        assert_eq!(config.substep_count(), 4);
    }

    #[test]
    fn test_per_level_counts_repeat_last_entry() {
        let settings = MultigridSettings {
            pre_smooth: vec![2, 1],
            post_smooth: vec![],
            ..Default::default()
        };
        assert_eq!(settings.pre_smooth_at(0), 2);
        assert_eq!(settings.pre_smooth_at(1), 1);
        assert_eq!(settings.pre_smooth_at(7), 1);
        assert_eq!(settings.post_smooth_at(3), 0, "empty list uses fallback");
    }

    #[test]
    fn test_repeat_factor() {
        assert_eq!(MgCycleType::V.repeat_factor(), 0);
        assert_eq!(MgCycleType::W.repeat_factor(), 1);
        assert_eq!(MgCycleType::FullMg.repeat_factor(), 0);
    }
}
