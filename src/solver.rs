//! Inverse shot solver.
//!
//! Sweeps candidate launch angles and, for each fixed angle, fits launch
//! speed and azimuth by nonlinear least squares so the simulated landing
//! point matches the target in the ground plane. Candidates from all angles
//! are then ranked by the selection policy: the gentlest shot that actually
//! hits, with a best-effort fallback when nothing lands inside the hit
//! tolerance.
//!
//! Per-angle failures are absorbed here; the only solver error a caller sees
//! is [`LauncherError::TargetUnreachable`].

use argmin::core::{CostFunction, Error as ArgminError, Executor};
use argmin::solver::neldermead::NelderMead;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{
    AZIMUTH_WINDOW_DEG, DEFAULT_ANGLE_MAX_DEG, DEFAULT_ANGLE_MIN_DEG, DEFAULT_ANGLE_STEP_DEG,
    FALLBACK_SPEED_GUESS_MPS, FIT_MAX_ITERATIONS, FIT_TOLERANCE, HIT_TOLERANCE_M,
    MAX_LAUNCH_SPEED_MPS, MIN_LAUNCH_SPEED_MPS, MISS_REJECTION_THRESHOLD_M,
    RANGE_EQUATION_DENOMINATOR_FLOOR,
};
use crate::environment::{Environment, LaunchState, Projectile, Target};
use crate::error::{AngleFailure, LauncherError};
use crate::launcher::Launcher;
use crate::trajectory::{SimulationSettings, Trajectory, TrajectorySimulator};

/// Cost added when a simulated shot never reaches the ground within the time
/// budget; steers the fit back toward shots that actually land.
const NO_LANDING_COST: f64 = 1e12;

/// Weight of the quadratic out-of-bounds penalties in the fit cost
const BOUND_PENALTY_WEIGHT: f64 = 1e4;

/// Search-space and acceptance configuration of the sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub angle_min_deg: f64,
    pub angle_max_deg: f64,
    pub angle_step_deg: f64,
    /// Launch speed bounds (m/s)
    pub speed_bounds: (f64, f64),
    /// Half-width of the azimuth window around the geometric bearing (degrees)
    pub azimuth_window_deg: f64,
    /// Landing error below which a candidate counts as a hit (m)
    pub hit_tolerance: f64,
    /// Landing error above which a converged fit is discarded (m)
    pub rejection_threshold: f64,
    /// Standard-deviation tolerance of the simplex fit
    pub fit_tolerance: f64,
    /// Iteration budget of the simplex fit
    pub fit_max_iterations: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            angle_min_deg: DEFAULT_ANGLE_MIN_DEG,
            angle_max_deg: DEFAULT_ANGLE_MAX_DEG,
            angle_step_deg: DEFAULT_ANGLE_STEP_DEG,
            speed_bounds: (MIN_LAUNCH_SPEED_MPS, MAX_LAUNCH_SPEED_MPS),
            azimuth_window_deg: AZIMUTH_WINDOW_DEG,
            hit_tolerance: HIT_TOLERANCE_M,
            rejection_threshold: MISS_REJECTION_THRESHOLD_M,
            fit_tolerance: FIT_TOLERANCE,
            fit_max_iterations: FIT_MAX_ITERATIONS,
        }
    }
}

/// How good the returned solution is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionQuality {
    /// Landing error below the hit tolerance
    Hit,
    /// Best effort: the smallest miss across the sweep, above the tolerance
    Degraded,
}

/// A converged per-angle fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleCandidate {
    pub angle_deg: f64,
    pub azimuth_deg: f64,
    pub speed: f64,
    /// Ground-plane (x, z) distance between the landing point and the target.
    /// The vertical component is intentionally not part of this metric.
    pub miss_distance: f64,
    pub trajectory: Trajectory,
}

/// Complete solved shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub launch_angle_deg: f64,
    pub azimuth_deg: f64,
    /// Launch speed (m/s)
    pub velocity: f64,
    /// Spring pullback distance producing that speed (m)
    pub pullback: f64,
    pub trajectory: Trajectory,
    /// Ground-plane landing error (m)
    pub miss_distance: f64,
    pub quality: SolutionQuality,
}

impl Solution {
    pub fn is_hit(&self) -> bool {
        self.quality == SolutionQuality::Hit
    }
}

/// Residual problem for one fixed launch angle.
///
/// Parameters are `[speed, azimuth_deg]`. Out-of-bounds values are penalized
/// quadratically and clamped before simulation, which keeps the search box
/// centered on the geometric bearing to the target.
struct LandingResidual<'a> {
    simulator: &'a TrajectorySimulator,
    settings: &'a SimulationSettings,
    angle_deg: f64,
    target_x: f64,
    target_z: f64,
    speed_bounds: (f64, f64),
    azimuth_bounds: (f64, f64),
}

fn bound_penalty(value: f64, bounds: (f64, f64)) -> f64 {
    let (lo, hi) = bounds;
    let below = if value < lo { (lo - value).powi(2) } else { 0.0 };
    let above = if value > hi { (value - hi).powi(2) } else { 0.0 };
    BOUND_PENALTY_WEIGHT * (below + above)
}

impl CostFunction for LandingResidual<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, ArgminError> {
        let speed = param[0];
        let azimuth = param[1];

        let mut cost =
            bound_penalty(speed, self.speed_bounds) + bound_penalty(azimuth, self.azimuth_bounds);

        let launch = LaunchState::new(
            speed.clamp(self.speed_bounds.0, self.speed_bounds.1),
            self.angle_deg,
            azimuth.clamp(self.azimuth_bounds.0, self.azimuth_bounds.1),
        );
        let trajectory = self.simulator.simulate(&launch, self.settings)?;

        match trajectory.landing_point() {
            Some(landing) => {
                let res_x = landing.position.x - self.target_x;
                let res_z = landing.position.z - self.target_z;
                cost += res_x * res_x + res_z * res_z;
            }
            None => cost += NO_LANDING_COST,
        }

        Ok(cost)
    }
}

/// Closed-form speed guess from the flat-ground vacuum range equation.
///
/// v = √(d·g / sin 2θ), with the denominator floored away from zero and a
/// fixed fallback when the guess is non-finite or implausibly fast.
fn initial_speed_guess(distance: f64, gravity: f64, angle_deg: f64) -> f64 {
    let mut denom = (2.0 * angle_deg.to_radians()).sin();
    if denom.abs() < RANGE_EQUATION_DENOMINATOR_FLOOR {
        denom = RANGE_EQUATION_DENOMINATOR_FLOOR;
    }
    let guess = (distance * gravity / denom).sqrt();
    if !guess.is_finite() || guess > MAX_LAUNCH_SPEED_MPS {
        FALLBACK_SPEED_GUESS_MPS
    } else {
        guess
    }
}

/// Rank candidates by the selection policy.
///
/// Among candidates inside the hit tolerance the minimum-speed one wins; with
/// no hit at all, the globally smallest miss is returned flagged as degraded.
/// Strict comparisons break ties toward the earliest (lowest-angle) candidate,
/// so the outcome does not depend on sweep execution order.
pub fn select_best(
    candidates: &[AngleCandidate],
    hit_tolerance: f64,
) -> Option<(usize, SolutionQuality)> {
    let mut best_hit: Option<usize> = None;
    let mut best_any: Option<usize> = None;

    for (i, candidate) in candidates.iter().enumerate() {
        if best_any.map_or(true, |j| candidate.miss_distance < candidates[j].miss_distance) {
            best_any = Some(i);
        }
        if candidate.miss_distance < hit_tolerance
            && best_hit.map_or(true, |j| candidate.speed < candidates[j].speed)
        {
            best_hit = Some(i);
        }
    }

    best_hit
        .map(|i| (i, SolutionQuality::Hit))
        .or_else(|| best_any.map(|i| (i, SolutionQuality::Degraded)))
}

/// Inverse solver for a fixed projectile and environment
#[derive(Debug, Clone)]
pub struct ShotSolver {
    simulator: TrajectorySimulator,
    settings: SimulationSettings,
    config: SolverConfig,
}

impl ShotSolver {
    pub fn new(environment: Environment, projectile: Projectile) -> Self {
        Self::with_config(
            environment,
            projectile,
            SolverConfig::default(),
            SimulationSettings::default(),
        )
    }

    pub fn with_config(
        environment: Environment,
        projectile: Projectile,
        config: SolverConfig,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            simulator: TrajectorySimulator::new(environment, projectile),
            settings,
            config,
        }
    }

    pub fn simulator(&self) -> &TrajectorySimulator {
        &self.simulator
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve the full shot: sweep angles, fit each, apply the selection
    /// policy, and derive the pullback for the winning speed.
    pub fn solve(&self, target: &Target, launcher: &Launcher) -> Result<Solution, LauncherError> {
        let angles = self.sweep_angles();

        // Candidates come back in angle order regardless of which thread
        // finishes first, so selection is deterministic.
        let mut candidates: Vec<AngleCandidate> = angles
            .par_iter()
            .filter_map(|&angle| self.solve_for_angle(angle, target).ok())
            .collect();

        let (index, quality) = select_best(&candidates, self.config.hit_tolerance)
            .ok_or(LauncherError::TargetUnreachable)?;
        let chosen = candidates.swap_remove(index);

        let pullback =
            launcher.pullback_for_speed(chosen.speed, self.simulator.projectile().mass);

        Ok(Solution {
            launch_angle_deg: chosen.angle_deg,
            azimuth_deg: chosen.azimuth_deg,
            velocity: chosen.speed,
            pullback,
            trajectory: chosen.trajectory,
            miss_distance: chosen.miss_distance,
            quality,
        })
    }

    /// Fit speed and azimuth for one fixed launch angle.
    ///
    /// The azimuth search box is centered on the geometric bearing to the
    /// target; the fitted point is re-simulated to measure the real landing
    /// error before the candidate is accepted.
    pub fn solve_for_angle(
        &self,
        angle_deg: f64,
        target: &Target,
    ) -> Result<AngleCandidate, AngleFailure> {
        let bearing = target.bearing_deg();
        let speed_bounds = self.config.speed_bounds;
        let azimuth_bounds = (
            bearing - self.config.azimuth_window_deg,
            bearing + self.config.azimuth_window_deg,
        );

        let guess = initial_speed_guess(
            target.horizontal_distance(),
            self.simulator.environment().gravity,
            angle_deg,
        );
        let speed0 = (guess * 1.1).clamp(speed_bounds.0, speed_bounds.1);

        let problem = LandingResidual {
            simulator: &self.simulator,
            settings: &self.settings,
            angle_deg,
            target_x: target.x,
            target_z: target.z,
            speed_bounds,
            azimuth_bounds,
        };

        let simplex = vec![
            vec![speed0, bearing],
            vec![speed0 + (0.1 * speed0).max(1.0), bearing],
            vec![speed0, bearing + 5.0],
        ];

        let nelder_mead = NelderMead::new(simplex)
            .with_sd_tolerance(self.config.fit_tolerance)
            .map_err(|_| AngleFailure::FitFailure)?;

        let result = Executor::new(problem, nelder_mead)
            .configure(|state| state.max_iters(self.config.fit_max_iterations))
            .run()
            .map_err(|_| AngleFailure::FitFailure)?;

        let best = result.state.best_param.ok_or(AngleFailure::FitFailure)?;
        let speed = best[0].clamp(speed_bounds.0, speed_bounds.1);
        let azimuth = best[1].clamp(azimuth_bounds.0, azimuth_bounds.1);

        // Re-simulate at the fitted point: the accepted landing error must
        // come from a clean run, not the penalized fit cost.
        let launch = LaunchState::new(speed, angle_deg, azimuth);
        let trajectory = self
            .simulator
            .simulate(&launch, &self.settings)
            .map_err(|_| AngleFailure::IntegrationDivergence)?;
        let landing = trajectory
            .landing_point()
            .ok_or(AngleFailure::LandingRejected)?;

        let miss =
            (landing.position.x - target.x).hypot(landing.position.z - target.z);
        if miss > self.config.rejection_threshold {
            return Err(AngleFailure::LandingRejected);
        }

        Ok(AngleCandidate {
            angle_deg,
            azimuth_deg: azimuth,
            speed,
            miss_distance: miss,
            trajectory,
        })
    }

    fn sweep_angles(&self) -> Vec<f64> {
        let mut angles = Vec::new();
        let mut angle = self.config.angle_min_deg;
        while angle <= self.config.angle_max_deg + 1e-9 {
            angles.push(angle);
            angle += self.config.angle_step_deg;
        }
        angles
    }
}
