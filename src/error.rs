//! Error types for the launcher engine.
//!
//! Per-angle failures stay inside the solver sweep and are only surfaced for
//! diagnostics; the one solver error a caller ever sees is
//! [`LauncherError::TargetUnreachable`].

use thiserror::Error;

/// Errors surfaced across the crate boundary
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LauncherError {
    /// No angle in the sweep produced a usable candidate
    #[error("target unreachable within physics constraints")]
    TargetUnreachable,

    /// Spring constant must be strictly positive
    #[error("spring constant must be positive, got {0} N/m")]
    InvalidSpringConstant(f64),

    /// Non-physical configuration input
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Errors from a single forward simulation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("integration produced a non-finite state")]
    NonFiniteState,

    #[error("integration step size underflow at t = {t:.6} s")]
    StepSizeUnderflow { t: f64 },
}

/// Why a single angle of the sweep yielded no candidate
///
/// All variants are absorbed by the sweep; they never cross the crate
/// boundary except through `ShotSolver::solve_for_angle`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AngleFailure {
    /// The ODE integration diverged or produced non-finite state
    #[error("integration diverged")]
    IntegrationDivergence,

    /// The least-squares fit failed to converge
    #[error("least-squares fit failed")]
    FitFailure,

    /// The converged fit landed too far from the target to be meaningful
    #[error("converged landing point rejected as divergent")]
    LandingRejected,
}
