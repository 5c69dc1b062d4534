//! Aerodynamic force calculations.
//!
//! Quadratic drag against the wind-relative velocity, wind vector resolution,
//! and an optional Reynolds-number drag-coefficient estimator for the low-speed
//! end of a sphere's flight.

use nalgebra::Vector3;

use crate::constants::{AIR_KINEMATIC_VISCOSITY, REYNOLDS_EPSILON, SPHERE_DRAG_COEFFICIENT};

/// Magnitude of the quadratic drag force.
///
/// F = ½ · ρ · v² · Cd · A
///
/// # Arguments
/// * `relative_speed` - Speed relative to the air mass (m/s), ≥ 0
/// * `area` - Cross-sectional area (m²)
/// * `air_density` - Air density (kg/m³)
/// * `drag_coefficient` - Dimensionless drag coefficient
pub fn drag_force(relative_speed: f64, area: f64, air_density: f64, drag_coefficient: f64) -> f64 {
    0.5 * air_density * relative_speed * relative_speed * drag_coefficient * area
}

/// Resolve a horizontal wind vector from polar speed and direction.
///
/// Direction is measured in the ground plane, degrees from the +x axis toward
/// +z. The vertical component is always zero.
pub fn wind_vector(speed: f64, direction_deg: f64) -> Vector3<f64> {
    let phi = direction_deg.to_radians();
    Vector3::new(speed * phi.cos(), 0.0, speed * phi.sin())
}

/// Reynolds number for a sphere moving through air.
///
/// Re = v · d / ν
pub fn reynolds_number(relative_speed: f64, diameter: f64) -> f64 {
    relative_speed * diameter / AIR_KINEMATIC_VISCOSITY
}

/// Drag coefficient of a sphere from its Reynolds number.
///
/// Three regimes: Stokes flow below Re = 1, an empirical intermediate fit up
/// to Re = 1000, and the constant turbulent value above that. A small epsilon
/// guards the denominators near Re = 0.
pub fn drag_coefficient_for_reynolds(reynolds: f64) -> f64 {
    if reynolds < 1.0 {
        24.0 / (reynolds + REYNOLDS_EPSILON)
    } else if reynolds < 1000.0 {
        24.0 / (reynolds + REYNOLDS_EPSILON)
            + 4.0 / (reynolds + REYNOLDS_EPSILON).sqrt()
            + 0.4
    } else {
        SPHERE_DRAG_COEFFICIENT
    }
}

/// Policy for choosing the drag coefficient during integration
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DragLaw {
    /// Fixed drag coefficient (the default path uses the turbulent sphere value)
    Constant(f64),
    /// Recompute the coefficient from the instantaneous Reynolds number
    Reynolds,
}

impl DragLaw {
    /// Drag coefficient for the current relative speed
    pub fn coefficient(&self, relative_speed: f64, diameter: f64) -> f64 {
        match *self {
            DragLaw::Constant(cd) => cd,
            DragLaw::Reynolds => {
                drag_coefficient_for_reynolds(reynolds_number(relative_speed, diameter))
            }
        }
    }
}

impl Default for DragLaw {
    fn default() -> Self {
        DragLaw::Constant(SPHERE_DRAG_COEFFICIENT)
    }
}
