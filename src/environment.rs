//! Immutable configuration records for a single solve or simulation call.
//!
//! There is no process-wide state: every call receives an [`Environment`] and
//! a [`Projectile`] constructed for that call and discarded afterwards.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BALLOON_MASS_KG, BALLOON_RADIUS_M, EARTH_GRAVITY_MPS2, SEA_LEVEL_AIR_DENSITY,
};
use crate::error::LauncherError;
use crate::forces::{wind_vector, DragLaw};

/// Ambient conditions for one simulation, immutable once constructed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Gravitational acceleration magnitude, positive downward (m/s²)
    pub gravity: f64,
    /// Air density (kg/m³)
    pub air_density: f64,
    /// Drag-coefficient policy
    pub drag_law: DragLaw,
    /// Wind velocity vector (m/s); vertical component is zero by construction
    pub wind: Vector3<f64>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity: EARTH_GRAVITY_MPS2,
            air_density: SEA_LEVEL_AIR_DENSITY,
            drag_law: DragLaw::default(),
            wind: Vector3::zeros(),
        }
    }
}

/// Raw environment input as the boundary layers deliver it.
///
/// Every field is optional; unspecified fields resolve to standard sea-level
/// values. Mirrors the request schema the serialization layer validates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentParams {
    pub wind_speed: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub air_density: Option<f64>,
    pub drag_coefficient: Option<f64>,
}

impl EnvironmentParams {
    /// Resolve the optional fields into a concrete [`Environment`].
    pub fn resolve(&self) -> Result<Environment, LauncherError> {
        if let Some(rho) = self.air_density {
            if !(rho >= 0.0) {
                return Err(LauncherError::InvalidParameter(format!(
                    "air density must be non-negative, got {rho}"
                )));
            }
        }
        if let Some(cd) = self.drag_coefficient {
            if !(cd >= 0.0) {
                return Err(LauncherError::InvalidParameter(format!(
                    "drag coefficient must be non-negative, got {cd}"
                )));
            }
        }
        if let Some(speed) = self.wind_speed {
            if !speed.is_finite() {
                return Err(LauncherError::InvalidParameter(
                    "wind speed must be finite".to_string(),
                ));
            }
        }

        let mut env = Environment::default();
        if let Some(rho) = self.air_density {
            env.air_density = rho;
        }
        if let Some(cd) = self.drag_coefficient {
            env.drag_law = DragLaw::Constant(cd);
        }
        let speed = self.wind_speed.unwrap_or(0.0);
        let direction = self.wind_direction_deg.unwrap_or(0.0);
        env.wind = wind_vector(speed, direction);
        Ok(env)
    }
}

/// Point-mass projectile parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Mass (kg), > 0
    pub mass: f64,
    /// Radius (m), > 0
    pub radius: f64,
}

impl Projectile {
    pub fn new(mass: f64, radius: f64) -> Result<Self, LauncherError> {
        if !(mass > 0.0) {
            return Err(LauncherError::InvalidParameter(format!(
                "projectile mass must be positive, got {mass}"
            )));
        }
        if !(radius > 0.0) {
            return Err(LauncherError::InvalidParameter(format!(
                "projectile radius must be positive, got {radius}"
            )));
        }
        Ok(Self { mass, radius })
    }

    /// Cross-sectional area (m²)
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    /// Diameter (m), the reference length for Reynolds numbers
    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }
}

impl Default for Projectile {
    /// The stock water balloon
    fn default() -> Self {
        Self {
            mass: BALLOON_MASS_KG,
            radius: BALLOON_RADIUS_M,
        }
    }
}

/// Target point relative to the launch origin (m).
///
/// x is forward, y vertical (may be negative for targets below the launcher),
/// z lateral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Target {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Ground-plane distance from the launch origin
    pub fn horizontal_distance(&self) -> f64 {
        self.x.hypot(self.z)
    }

    /// Geometric bearing from the launch origin, degrees in the ground plane.
    ///
    /// The azimuth search window is always centered here.
    pub fn bearing_deg(&self) -> f64 {
        self.z.atan2(self.x).to_degrees()
    }
}

/// Fully specified launch state handed to the forward simulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchState {
    /// Initial speed (m/s), ≥ 0
    pub speed: f64,
    /// Elevation above horizontal (degrees)
    pub angle_deg: f64,
    /// Direction in the ground plane (degrees)
    pub azimuth_deg: f64,
}

impl LaunchState {
    pub fn new(speed: f64, angle_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            speed,
            angle_deg,
            azimuth_deg,
        }
    }

    /// Decompose into the initial velocity vector.
    ///
    /// vx = v·cosθ·cosφ, vy = v·sinθ, vz = v·cosθ·sinφ
    pub fn velocity(&self) -> Vector3<f64> {
        let theta = self.angle_deg.to_radians();
        let phi = self.azimuth_deg.to_radians();
        Vector3::new(
            self.speed * theta.cos() * phi.cos(),
            self.speed * theta.sin(),
            self.speed * theta.cos() * phi.sin(),
        )
    }
}
