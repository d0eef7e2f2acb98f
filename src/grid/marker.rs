//! Boundary markers

use serde::{Deserialize, Serialize};

/// Physical kind of a boundary marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// No-slip wall with prescribed heat flux
    HeatFluxWall,
    /// No-slip wall with prescribed temperature
    IsothermalWall,
    /// No-slip wall coupled to another heat zone
    ConjugateHeatWall,
    /// Interior interface, not a physical boundary
    Internal,
    /// Periodic boundary pair
    Periodic,
    /// Farfield or other characteristic boundary
    Farfield,
}

impl MarkerKind {
    /// No-slip-class walls where restricted velocity components are
    /// overridden and eddy viscosity is forced to zero.
    pub fn is_solid_wall(self) -> bool {
        matches!(
            self,
            MarkerKind::HeatFluxWall | MarkerKind::IsothermalWall | MarkerKind::ConjugateHeatWall
        )
    }

    /// Markers the correction smoother passes through without restoring
    /// pre-sweep values.
    pub fn is_passthrough(self) -> bool {
        matches!(self, MarkerKind::Internal | MarkerKind::Periodic)
    }
}

/// A named set of boundary points on one grid level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryMarker {
    pub name: String,
    pub kind: MarkerKind,
    /// Point indices lying on this marker
    pub points: Vec<usize>,
}

impl BoundaryMarker {
    pub fn new(name: impl Into<String>, kind: MarkerKind, points: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            kind,
            points,
        }
    }
}
