//! Error types for the integration engine

use crate::config::TimeScheme;
use crate::solver::FieldKind;
use thiserror::Error;

/// Errors raised while driving an integration iteration
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// Time scheme with no implementation on the requested integration path
    #[error("time scheme {scheme:?} is not implemented for the {path} path")]
    UnsupportedScheme {
        scheme: TimeScheme,
        path: &'static str,
    },

    /// Halo exchange between partitions failed
    #[error("halo exchange of {field:?} failed: {reason}")]
    HaloExchange { field: FieldKind, reason: String },

    /// Failure reported by a plugged-in solver
    #[error("solver error: {0}")]
    Solver(String),
}
