//! Forward trajectory simulation to ground impact.
//!
//! Integrates the point-mass equations of motion (gravity plus quadratic drag
//! against the wind-relative velocity) with the adaptive stepper, and reports
//! the flight as samples on a fixed time grid. Termination is a descending
//! zero-crossing of the height, refined by bisection on the last step's
//! interpolant so landing accuracy does not depend on the output grid.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_FLIGHT_TIME_S, DEFAULT_OUTPUT_STEP_S, INTEGRATION_ABSOLUTE_TOLERANCE,
    INTEGRATION_RELATIVE_TOLERANCE, MIN_VELOCITY_THRESHOLD,
};
use crate::environment::{Environment, LaunchState, Projectile};
use crate::error::SimulationError;
use crate::forces::drag_force;
use crate::integrator::{AdaptiveStepper, State};

/// Reporting and truncation settings for one simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Truncation time if the projectile never lands (s)
    pub max_time: f64,
    /// Spacing of the reported samples (s)
    pub output_step: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            max_time: DEFAULT_MAX_FLIGHT_TIME_S,
            output_step: DEFAULT_OUTPUT_STEP_S,
        }
    }
}

/// One time-stamped state of the flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub time: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

/// Ordered flight path from launch to ground impact (or truncation).
///
/// The first sample is always the launch origin at t = 0; times strictly
/// increase; when `landed` is true the final sample is the refined impact
/// point and nothing follows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub samples: Vec<TrajectorySample>,
    /// False when the run hit `max_time` without a ground crossing; such a
    /// run provides no landing point.
    pub landed: bool,
}

impl Trajectory {
    /// Final sample, only if the projectile actually reached the ground
    pub fn landing_point(&self) -> Option<&TrajectorySample> {
        if self.landed {
            self.samples.last()
        } else {
            None
        }
    }

    /// Highest altitude reached (m)
    pub fn max_height(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.position.y)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Time of the last sample (s)
    pub fn time_of_flight(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.time)
    }

    /// Speed at impact (m/s), if the projectile landed
    pub fn impact_speed(&self) -> Option<f64> {
        self.landing_point().map(|s| s.velocity.norm())
    }
}

/// Forward simulator for a fixed projectile and environment
#[derive(Debug, Clone)]
pub struct TrajectorySimulator {
    environment: Environment,
    projectile: Projectile,
    stepper: AdaptiveStepper,
}

impl TrajectorySimulator {
    pub fn new(environment: Environment, projectile: Projectile) -> Self {
        Self {
            environment,
            projectile,
            stepper: AdaptiveStepper::new(
                INTEGRATION_RELATIVE_TOLERANCE,
                INTEGRATION_ABSOLUTE_TOLERANCE,
            ),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn projectile(&self) -> &Projectile {
        &self.projectile
    }

    /// State derivative: d/dt [x, y, z, vx, vy, vz].
    ///
    /// Drag acts opposite the wind-relative velocity; at zero relative speed
    /// the drag vector is exactly zero (no singular division).
    fn derivatives(&self, state: &State) -> State {
        let velocity = Vector3::new(state[3], state[4], state[5]);
        let relative = velocity - self.environment.wind;
        let relative_speed = relative.norm();

        let drag = if relative_speed > MIN_VELOCITY_THRESHOLD {
            let cd = self
                .environment
                .drag_law
                .coefficient(relative_speed, self.projectile.diameter());
            let magnitude = drag_force(
                relative_speed,
                self.projectile.area(),
                self.environment.air_density,
                cd,
            );
            -(relative / relative_speed) * magnitude
        } else {
            Vector3::zeros()
        };

        let acceleration =
            Vector3::new(0.0, -self.environment.gravity, 0.0) + drag / self.projectile.mass;

        [
            state[3],
            state[4],
            state[5],
            acceleration.x,
            acceleration.y,
            acceleration.z,
        ]
    }

    /// Simulate a launch to ground impact or truncation.
    pub fn simulate(
        &self,
        launch: &LaunchState,
        settings: &SimulationSettings,
    ) -> Result<Trajectory, SimulationError> {
        let v0 = launch.velocity();
        let mut t = 0.0;
        let mut y: State = [0.0, 0.0, 0.0, v0.x, v0.y, v0.z];
        let mut dy = self.derivatives(&y);
        let mut h = settings.output_step;

        let deriv = |state: &State| self.derivatives(state);

        let mut samples = vec![sample_from_state(0.0, &y)];
        let mut grid_index: usize = 1;

        while t < settings.max_time {
            let h_try = h.min(settings.max_time - t);
            let step = self.stepper.advance(&deriv, t, &y, h_try)?;
            let dy_new = self.derivatives(&step.state);

            let crossed = (y[1] >= 0.0 && step.state[1] < 0.0)
                || (step.state[1] == 0.0 && dy_new[1] < 0.0 && step.t > 0.0);

            if crossed {
                let t_impact =
                    refine_ground_crossing(t, &y, &dy, step.t, &step.state, &dy_new);
                let impact = hermite(t, &y, &dy, step.t, &step.state, &dy_new, t_impact);

                emit_grid_samples(
                    &mut samples,
                    &mut grid_index,
                    settings.output_step,
                    t,
                    &y,
                    &dy,
                    step.t,
                    &step.state,
                    &dy_new,
                    t_impact,
                );
                samples.push(sample_from_state(t_impact, &impact));
                return Ok(Trajectory {
                    samples,
                    landed: true,
                });
            }

            emit_grid_samples(
                &mut samples,
                &mut grid_index,
                settings.output_step,
                t,
                &y,
                &dy,
                step.t,
                &step.state,
                &dy_new,
                f64::INFINITY,
            );

            t = step.t;
            y = step.state;
            dy = dy_new;
            h = step.h_next;
        }

        Ok(Trajectory {
            samples,
            landed: false,
        })
    }
}

fn sample_from_state(time: f64, state: &State) -> TrajectorySample {
    TrajectorySample {
        time,
        position: Vector3::new(state[0], state[1], state[2]),
        velocity: Vector3::new(state[3], state[4], state[5]),
    }
}

/// Cubic Hermite interpolation over one accepted step.
///
/// Uses the stored derivatives at both endpoints, so positions interpolate
/// with velocity slopes and velocities with acceleration slopes.
#[allow(clippy::too_many_arguments)]
fn hermite(t0: f64, y0: &State, f0: &State, t1: f64, y1: &State, f1: &State, t: f64) -> State {
    let h = t1 - t0;
    if h.abs() < f64::EPSILON {
        return *y1;
    }
    let s = ((t - t0) / h).clamp(0.0, 1.0);
    let s2 = s * s;
    let s3 = s2 * s;
    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    let mut out = [0.0; 6];
    for i in 0..6 {
        out[i] = h00 * y0[i] + h10 * h * f0[i] + h01 * y1[i] + h11 * h * f1[i];
    }
    out
}

/// Bisection on the interpolated height over the bracketing step.
///
/// The bracket is guaranteed by the caller: height is ≥ 0 at t0 and ≤ 0 at t1.
#[allow(clippy::too_many_arguments)]
fn refine_ground_crossing(
    t0: f64,
    y0: &State,
    f0: &State,
    t1: f64,
    y1: &State,
    f1: &State,
) -> f64 {
    let mut lo = t0;
    let mut hi = t1;

    for _ in 0..80 {
        let mid = 0.5 * (lo + hi);
        let height = hermite(t0, y0, f0, t1, y1, f1, mid)[1];
        if height > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-12 {
            break;
        }
    }

    0.5 * (lo + hi)
}

/// Push every grid sample that falls inside the step (t_prev, t_new],
/// stopping short of the impact time when one is known.
#[allow(clippy::too_many_arguments)]
fn emit_grid_samples(
    samples: &mut Vec<TrajectorySample>,
    grid_index: &mut usize,
    output_step: f64,
    t_prev: f64,
    y_prev: &State,
    f_prev: &State,
    t_new: f64,
    y_new: &State,
    f_new: &State,
    t_impact: f64,
) {
    loop {
        let t_grid = *grid_index as f64 * output_step;
        if t_grid > t_new || t_grid >= t_impact {
            break;
        }
        let state = hermite(t_prev, y_prev, f_prev, t_new, y_new, f_new, t_grid);
        samples.push(sample_from_state(t_grid, &state));
        *grid_index += 1;
    }
}
