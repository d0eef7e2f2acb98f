//! End-to-end tests of the FAS multigrid driver on tiny hierarchies.

use approx::assert_relative_eq;
use fas_multigrid::{
    multigrid_iteration, EquationSystem, FieldKind, GridHierarchy, GridLevel, IntegrationConfig,
    IntegrationError, MgCycleType, MultigridSettings, RunState, SolutionFields, SolverState,
};

/// Minimal solver: space integration produces a zero residual, time
/// integration shifts the whole solution by a fixed increment.
struct MockSolver {
    system: EquationSystem,
    fields: SolutionFields,
    increment: f64,
    fail_halo: bool,
    halo_calls: Vec<FieldKind>,
    time_steps: usize,
    substeps: usize,
}

impl MockSolver {
    fn new(system: EquationSystem, n_points: usize, n_vars: usize, n_dim: usize) -> Self {
        Self {
            system,
            fields: SolutionFields::new(n_points, n_vars, n_dim),
            increment: 0.0,
            fail_halo: false,
            halo_calls: Vec::new(),
            time_steps: 0,
            substeps: 0,
        }
    }
}

impl SolverState for MockSolver {
    fn system(&self) -> EquationSystem {
        self.system
    }

    fn fields(&self) -> &SolutionFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut SolutionFields {
        &mut self.fields
    }

    fn preprocess(
        &mut self,
        _grid: &GridLevel,
        _config: &IntegrationConfig,
        _substep: usize,
        _full_update: bool,
    ) -> Result<(), IntegrationError> {
        Ok(())
    }

    fn space_integrate(
        &mut self,
        _grid: &GridLevel,
        _config: &IntegrationConfig,
        _substep: usize,
    ) -> Result<(), IntegrationError> {
        self.fields.residual.fill(0.0);
        Ok(())
    }

    fn time_integrate(
        &mut self,
        _grid: &GridLevel,
        _config: &IntegrationConfig,
        _substep: usize,
    ) -> Result<(), IntegrationError> {
        self.substeps += 1;
        self.fields.solution += self.increment;
        Ok(())
    }

    fn postprocess(
        &mut self,
        _grid: &GridLevel,
        _config: &IntegrationConfig,
    ) -> Result<(), IntegrationError> {
        Ok(())
    }

    fn compute_time_step(
        &mut self,
        _grid: &GridLevel,
        _config: &IntegrationConfig,
        _outer_iter: u64,
    ) -> Result<(), IntegrationError> {
        self.time_steps += 1;
        Ok(())
    }

    fn exchange_halo(
        &mut self,
        _grid: &GridLevel,
        field: FieldKind,
    ) -> Result<(), IntegrationError> {
        if self.fail_halo {
            return Err(IntegrationError::HaloExchange {
                field,
                reason: "partition unreachable".into(),
            });
        }
        self.halo_calls.push(field);
        Ok(())
    }
}

/// Two fine points of unit volume agglomerated into one coarse point.
fn two_point_hierarchy() -> GridHierarchy {
    let fine = GridLevel::new(
        1,
        vec![1.0, 1.0],
        vec![vec![1], vec![0]],
        vec![vec![]; 2],
        vec![],
    );
    let coarse = GridLevel::new(1, vec![2.0], vec![vec![]], vec![vec![0, 1]], vec![]);
    GridHierarchy::new(vec![fine, coarse])
}

fn v_cycle_config() -> IntegrationConfig {
    IntegrationConfig {
        multigrid: MultigridSettings {
            cycle: MgCycleType::V,
            pre_smooth: vec![0, 1],
            post_smooth: vec![0],
            correction_smooth: vec![0],
            damp_correction: 1.0,
            damp_restriction: 1.0,
        },
        ..Default::default()
    }
}

#[test]
fn test_coarse_update_is_prolongated_to_both_children() {
    // Fine solutions 1 and 3 restrict to 2 on the coarse point. The coarse
    // smoother shifts it to 2.5, so a correction of 0.5 lands on each child.
    let hierarchy = two_point_hierarchy();
    let mut fine = MockSolver::new(EquationSystem::Flow, 2, 1, 1);
    fine.fields.solution[[0, 0]] = 1.0;
    fine.fields.solution[[1, 0]] = 3.0;
    let mut coarse = MockSolver::new(EquationSystem::Flow, 1, 1, 1);
    coarse.increment = 0.5;
    let mut solvers = vec![fine, coarse];
    let mut run = RunState::default();

    multigrid_iteration(&hierarchy, &mut solvers, &v_cycle_config(), &mut run).unwrap();

    assert_relative_eq!(solvers[1].fields.solution[[0, 0]], 2.5);
    assert_relative_eq!(solvers[0].fields.solution[[0, 0]], 1.5);
    assert_relative_eq!(solvers[0].fields.solution[[1, 0]], 3.5);
}

#[test]
fn test_equilibrium_solution_is_unchanged() {
    // With a quiet coarse solver the correction is identically zero.
    let hierarchy = two_point_hierarchy();
    let mut fine = MockSolver::new(EquationSystem::Flow, 2, 1, 1);
    fine.fields.solution[[0, 0]] = 1.0;
    fine.fields.solution[[1, 0]] = 3.0;
    let coarse = MockSolver::new(EquationSystem::Flow, 1, 1, 1);
    let mut solvers = vec![fine, coarse];
    let mut run = RunState::default();

    multigrid_iteration(&hierarchy, &mut solvers, &v_cycle_config(), &mut run).unwrap();

    assert_relative_eq!(solvers[0].fields.solution[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(solvers[0].fields.solution[[1, 0]], 3.0, epsilon = 1e-12);
}

#[test]
fn test_halo_sequence_during_one_v_cycle() {
    let hierarchy = two_point_hierarchy();
    let fine = MockSolver::new(EquationSystem::Flow, 2, 1, 1);
    let coarse = MockSolver::new(EquationSystem::Flow, 1, 1, 1);
    let mut solvers = vec![fine, coarse];
    let mut run = RunState::default();

    multigrid_iteration(&hierarchy, &mut solvers, &v_cycle_config(), &mut run).unwrap();

    // coarse side: restricted solution, then staged correction
    assert_eq!(
        solvers[1].halo_calls,
        vec![FieldKind::Solution, FieldKind::Correction]
    );
    // fine side: corrected solution
    assert_eq!(solvers[0].halo_calls, vec![FieldKind::Solution]);
}

#[test]
fn test_halo_failure_aborts_the_cycle() {
    let hierarchy = two_point_hierarchy();
    let fine = MockSolver::new(EquationSystem::Flow, 2, 1, 1);
    let mut coarse = MockSolver::new(EquationSystem::Flow, 1, 1, 1);
    coarse.fail_halo = true;
    let mut solvers = vec![fine, coarse];
    let mut run = RunState::default();

    let err = multigrid_iteration(&hierarchy, &mut solvers, &v_cycle_config(), &mut run)
        .expect_err("halo failure must be fatal");
    assert!(matches!(err, IntegrationError::HaloExchange { .. }));
}

#[test]
fn test_time_step_computed_once_per_smoothing_pass() {
    let hierarchy = two_point_hierarchy();
    let fine = MockSolver::new(EquationSystem::Flow, 2, 1, 1);
    let coarse = MockSolver::new(EquationSystem::Flow, 1, 1, 1);
    let mut solvers = vec![fine, coarse];
    let mut run = RunState::default();

    let mut config = v_cycle_config();
    config.multigrid.pre_smooth = vec![2, 3];
    multigrid_iteration(&hierarchy, &mut solvers, &config, &mut run).unwrap();

    assert_eq!(solvers[0].time_steps, 2);
    assert_eq!(solvers[1].time_steps, 3);
    // implicit Euler: one substep per pass
    assert_eq!(solvers[0].substeps, 2);
    assert_eq!(solvers[1].substeps, 3);
}

#[test]
fn test_w_cycle_visits_the_coarse_level_twice() {
    let hierarchy = two_point_hierarchy();
    let fine = MockSolver::new(EquationSystem::Flow, 2, 1, 1);
    let coarse = MockSolver::new(EquationSystem::Flow, 1, 1, 1);
    let mut solvers = vec![fine, coarse];
    let mut run = RunState::default();

    let mut config = v_cycle_config();
    config.multigrid.cycle = MgCycleType::W;
    multigrid_iteration(&hierarchy, &mut solvers, &config, &mut run).unwrap();

    // two descents, one presmoothing pass each
    assert_eq!(solvers[1].time_steps, 2);
}

#[test]
fn test_full_multigrid_startup_advances_one_level() {
    let hierarchy = two_point_hierarchy();
    let fine = MockSolver::new(EquationSystem::Flow, 2, 1, 1);
    let mut coarse = MockSolver::new(EquationSystem::Flow, 1, 1, 1);
    coarse.fields.solution[[0, 0]] = 4.0;
    let mut solvers = vec![fine, coarse];
    let mut run = RunState {
        active_finest: 1,
        fmg_convergence: true,
        time_iter: 0,
    };

    let mut config = v_cycle_config();
    config.multigrid.cycle = MgCycleType::FullMg;
    multigrid_iteration(&hierarchy, &mut solvers, &config, &mut run).unwrap();

    assert_eq!(run.active_finest, 0);
    assert!(!run.fmg_convergence, "convergence event is consumed");
    // both children seeded by injection before the cycle ran
    assert_relative_eq!(solvers[0].fields.solution[[0, 0]], 4.0, epsilon = 1e-12);
    assert_relative_eq!(solvers[0].fields.solution[[1, 0]], 4.0, epsilon = 1e-12);
}

#[test]
fn test_full_multigrid_startup_skipped_on_restart() {
    let hierarchy = two_point_hierarchy();
    let fine = MockSolver::new(EquationSystem::Flow, 2, 1, 1);
    let coarse = MockSolver::new(EquationSystem::Flow, 1, 1, 1);
    let mut solvers = vec![fine, coarse];
    let mut run = RunState {
        active_finest: 1,
        fmg_convergence: true,
        time_iter: 0,
    };

    let mut config = v_cycle_config();
    config.multigrid.cycle = MgCycleType::FullMg;
    config.restart = true;
    multigrid_iteration(&hierarchy, &mut solvers, &config, &mut run).unwrap();

    assert_eq!(run.active_finest, 1, "restarted runs stay on their level");
    assert!(run.fmg_convergence);
}
