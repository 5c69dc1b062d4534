//! Mechanical energy and momentum bookkeeping over a flight.
//!
//! Consumed by the (external) visualization layer for energy diagrams and by
//! the energy-dissipation tests: with any drag at all, mechanical energy must
//! be non-increasing along the trajectory.

use crate::trajectory::{Trajectory, TrajectorySample};

/// Kinetic energy ½·m·v² (J)
pub fn kinetic_energy(mass: f64, speed: f64) -> f64 {
    0.5 * mass * speed * speed
}

/// Potential energy m·g·h relative to the launch plane (J)
pub fn potential_energy(mass: f64, gravity: f64, height: f64) -> f64 {
    mass * gravity * height
}

/// Kinetic plus potential energy (J)
pub fn mechanical_energy(mass: f64, gravity: f64, sample: &TrajectorySample) -> f64 {
    kinetic_energy(mass, sample.velocity.norm()) + potential_energy(mass, gravity, sample.position.y)
}

/// Momentum magnitude m·v (kg·m/s)
pub fn momentum(mass: f64, speed: f64) -> f64 {
    mass * speed
}

/// Mechanical energy at every sample of a trajectory (J)
pub fn mechanical_energy_series(mass: f64, gravity: f64, trajectory: &Trajectory) -> Vec<f64> {
    trajectory
        .samples
        .iter()
        .map(|s| mechanical_energy(mass, gravity, s))
        .collect()
}

/// Energy dissipated between launch and the last sample, absolute and as a
/// fraction of the launch energy
pub fn energy_loss(mass: f64, gravity: f64, trajectory: &Trajectory) -> (f64, f64) {
    let series = mechanical_energy_series(mass, gravity, trajectory);
    match (series.first(), series.last()) {
        (Some(&first), Some(&last)) if first > 0.0 => (first - last, (first - last) / first),
        _ => (0.0, 0.0),
    }
}
