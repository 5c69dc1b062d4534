//! Physical constants and engine defaults

/// Gravitational acceleration at the surface (m/s²), positive downward magnitude
pub const EARTH_GRAVITY_MPS2: f64 = 9.81;

/// Air density at sea level, 15°C (kg/m³)
pub const SEA_LEVEL_AIR_DENSITY: f64 = 1.225;

/// Drag coefficient of a sphere in fully turbulent flow (dimensionless)
pub const SPHERE_DRAG_COEFFICIENT: f64 = 0.47;

/// Kinematic viscosity of air at 15°C (m²/s)
///
/// Used by the Reynolds-number drag law. The constant-Cd law (the default)
/// never touches it.
pub const AIR_KINEMATIC_VISCOSITY: f64 = 1.81e-5;

/// Mass of the stock water balloon (kg)
pub const BALLOON_MASS_KG: f64 = 0.125;

/// Radius of the stock water balloon (m)
pub const BALLOON_RADIUS_M: f64 = 0.08;

// Solver search space

/// Lowest launch speed the fit is allowed to propose (m/s)
pub const MIN_LAUNCH_SPEED_MPS: f64 = 1.0;

/// Highest launch speed the fit is allowed to propose (m/s)
///
/// Also the cap on the closed-form speed guess: anything above this is
/// implausible for a spring launcher and is replaced by the fallback guess.
pub const MAX_LAUNCH_SPEED_MPS: f64 = 300.0;

/// Half-width of the azimuth search window around the geometric bearing (degrees)
///
/// Keeps the fit from drifting to a degenerate opposite-direction solution.
pub const AZIMUTH_WINDOW_DEG: f64 = 120.0;

/// Speed guess used when the vacuum range equation yields nothing usable (m/s)
pub const FALLBACK_SPEED_GUESS_MPS: f64 = 50.0;

/// First elevation angle of the default sweep (degrees)
pub const DEFAULT_ANGLE_MIN_DEG: f64 = 15.0;

/// Last elevation angle of the default sweep (degrees)
pub const DEFAULT_ANGLE_MAX_DEG: f64 = 75.0;

/// Spacing of the default angle sweep (degrees)
pub const DEFAULT_ANGLE_STEP_DEG: f64 = 5.0;

// Acceptance thresholds

/// Landing error below which a candidate counts as a hit (m)
pub const HIT_TOLERANCE_M: f64 = 0.5;

/// Landing error above which a converged fit is discarded as divergent (m)
pub const MISS_REJECTION_THRESHOLD_M: f64 = 100.0;

// Simulation defaults

/// Maximum simulated flight time (s)
pub const DEFAULT_MAX_FLIGHT_TIME_S: f64 = 20.0;

/// Spacing of the reported trajectory samples (s)
pub const DEFAULT_OUTPUT_STEP_S: f64 = 0.01;

// Numerical stability constants

/// Relative tolerance of the adaptive integrator
pub const INTEGRATION_RELATIVE_TOLERANCE: f64 = 1e-6;

/// Absolute tolerance floor of the adaptive integrator
pub const INTEGRATION_ABSOLUTE_TOLERANCE: f64 = 1e-9;

/// Minimum relative speed below which drag is treated as zero (m/s)
pub const MIN_VELOCITY_THRESHOLD: f64 = 1e-12;

/// Additive guard in Reynolds-number denominators
pub const REYNOLDS_EPSILON: f64 = 1e-6;

/// Floor applied to sin(2θ) in the vacuum speed guess
pub const RANGE_EQUATION_DENOMINATOR_FLOOR: f64 = 1e-4;

/// Convergence tolerance of the per-angle least-squares fit
pub const FIT_TOLERANCE: f64 = 1e-6;

/// Iteration budget of the per-angle least-squares fit
pub const FIT_MAX_ITERATIONS: u64 = 100;
