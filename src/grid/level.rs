//! Grid levels and the agglomeration hierarchy

use crate::grid::marker::BoundaryMarker;
use ndarray::{Array2, ArrayView1, Axis};

/// One level of the agglomerated grid hierarchy.
///
/// Points `0..n_owned` belong to this partition; points `n_owned..n_points`
/// are halo copies updated by the solver's halo exchange. The `children`
/// lists map each point to its agglomerated points on the next finer level
/// and are empty on the finest level.
#[derive(Debug, Clone)]
pub struct GridLevel {
    n_dim: usize,
    n_owned: usize,
    /// Dual-cell volume per point
    pub volumes: Vec<f64>,
    /// Edge-connected neighbor points
    pub neighbors: Vec<Vec<usize>>,
    /// Agglomerated points on the next finer level
    pub children: Vec<Vec<usize>>,
    /// Grid velocity per point, `n_points x n_dim`, for moving meshes
    pub grid_velocity: Option<Array2<f64>>,
    pub markers: Vec<BoundaryMarker>,
}

impl GridLevel {
    pub fn new(
        n_dim: usize,
        volumes: Vec<f64>,
        neighbors: Vec<Vec<usize>>,
        children: Vec<Vec<usize>>,
        markers: Vec<BoundaryMarker>,
    ) -> Self {
        let n_points = volumes.len();
        debug_assert_eq!(neighbors.len(), n_points);
        debug_assert_eq!(children.len(), n_points);
        Self {
            n_dim,
            n_owned: n_points,
            volumes,
            neighbors,
            children,
            grid_velocity: None,
            markers,
        }
    }

    /// Mark the trailing points as halo copies owned by other partitions.
    pub fn with_owned_count(mut self, n_owned: usize) -> Self {
        debug_assert!(n_owned <= self.volumes.len());
        self.n_owned = n_owned;
        self
    }

    pub fn with_grid_velocity(mut self, velocity: Array2<f64>) -> Self {
        debug_assert_eq!(velocity.nrows(), self.volumes.len());
        debug_assert_eq!(velocity.ncols(), self.n_dim);
        self.grid_velocity = Some(velocity);
        self
    }

    pub fn n_points(&self) -> usize {
        self.volumes.len()
    }

    pub fn n_owned(&self) -> usize {
        self.n_owned
    }

    pub fn n_dim(&self) -> usize {
        self.n_dim
    }

    pub fn volume(&self, point: usize) -> f64 {
        self.volumes[point]
    }

    pub fn grid_velocity_at(&self, point: usize) -> Option<ArrayView1<'_, f64>> {
        self.grid_velocity
            .as_ref()
            .map(|v| v.index_axis(Axis(0), point))
    }
}

/// Ordered grid levels, finest first.
#[derive(Debug, Clone)]
pub struct GridHierarchy {
    levels: Vec<GridLevel>,
}

impl GridHierarchy {
    /// Build a hierarchy from levels ordered finest to coarsest.
    ///
    /// Debug builds check the agglomeration links: every owned coarse point
    /// has at least one child, and every owned fine point has exactly one
    /// parent (prolongation writes each child row exactly once).
    pub fn new(levels: Vec<GridLevel>) -> Self {
        debug_assert!(!levels.is_empty());
        #[cfg(debug_assertions)]
        validate_links(&levels);
        Self { levels }
    }

    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, index: usize) -> &GridLevel {
        &self.levels[index]
    }

    pub fn finest(&self) -> &GridLevel {
        &self.levels[0]
    }

    pub fn coarsest(&self) -> &GridLevel {
        &self.levels[self.levels.len() - 1]
    }
}

#[cfg(debug_assertions)]
fn validate_links(levels: &[GridLevel]) {
    for window in levels.windows(2) {
        let (fine, coarse) = (&window[0], &window[1]);
        let mut parents = vec![0usize; fine.n_points()];
        for cp in 0..coarse.n_owned() {
            debug_assert!(
                !coarse.children[cp].is_empty(),
                "coarse point {} has no children",
                cp
            );
            for &fp in &coarse.children[cp] {
                debug_assert!(fp < fine.n_points(), "child index {} out of range", fp);
                parents[fp] += 1;
            }
        }
        for (fp, &count) in parents.iter().enumerate().take(fine.n_owned()) {
            debug_assert!(
                count == 1,
                "fine point {} has {} parents, expected 1",
                fp,
                count
            );
        }
    }
}
