//! Grid hierarchy data model
//!
//! Read-only topology the engine consumes: per-level point volumes,
//! adjacency, parent/child agglomeration links, and boundary markers.

pub mod level;
pub mod marker;

pub use level::{GridHierarchy, GridLevel};
pub use marker::{BoundaryMarker, MarkerKind};
