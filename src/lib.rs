//! # Launcher Engine
//!
//! Trajectory simulation and inverse aiming for a spring-powered projectile
//! launcher: forward integration with quadratic drag and constant wind, an
//! angle-sweep inverse solver that fits launch speed and azimuth to a ground
//! target, and the spring pullback that delivers the solved speed.

// Re-export the main types and functions
pub use environment::{Environment, EnvironmentParams, LaunchState, Projectile, Target};
pub use error::{AngleFailure, LauncherError, SimulationError};
pub use forces::DragLaw;
pub use launcher::{Launcher, SpringModel};
pub use solver::{
    select_best, AngleCandidate, ShotSolver, Solution, SolutionQuality, SolverConfig,
};
pub use trajectory::{
    SimulationSettings, Trajectory, TrajectorySample, TrajectorySimulator,
};

// Module declarations
pub mod constants;
pub mod energy;
mod environment;
mod error;
mod forces;
mod integrator;
mod launcher;
mod solver;
mod trajectory;
