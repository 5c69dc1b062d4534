//! Spring launcher energetics.
//!
//! Converts between launch speed and mechanical pullback distance through the
//! spring energy balance ½·k·s² = ½·m·v². The ideal model assumes lossless
//! energy transfer; the efficiency model scales the stored energy by η < 1.

use serde::{Deserialize, Serialize};

use crate::error::LauncherError;

/// Energy-transfer model of the spring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpringModel {
    /// Lossless transfer: s = v·√(m/k)
    Ideal,
    /// Fraction `eta` of the stored energy reaches the projectile:
    /// s = √(m·v²/(η·k)), v = √(η·k·s²/m)
    Efficiency { eta: f64 },
}

impl SpringModel {
    fn efficiency(&self) -> f64 {
        match *self {
            SpringModel::Ideal => 1.0,
            SpringModel::Efficiency { eta } => eta,
        }
    }
}

/// Spring launcher configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Launcher {
    /// Spring constant (N/m), > 0
    pub spring_constant: f64,
    pub model: SpringModel,
}

impl Launcher {
    pub fn new(spring_constant: f64) -> Result<Self, LauncherError> {
        Self::with_model(spring_constant, SpringModel::Ideal)
    }

    pub fn with_model(spring_constant: f64, model: SpringModel) -> Result<Self, LauncherError> {
        if !(spring_constant > 0.0) {
            return Err(LauncherError::InvalidSpringConstant(spring_constant));
        }
        if let SpringModel::Efficiency { eta } = model {
            if !(eta > 0.0 && eta <= 1.0) {
                return Err(LauncherError::InvalidParameter(format!(
                    "spring efficiency must be in (0, 1], got {eta}"
                )));
            }
        }
        Ok(Self {
            spring_constant,
            model,
        })
    }

    /// Pullback distance (m) that produces the given launch speed
    pub fn pullback_for_speed(&self, speed: f64, mass: f64) -> f64 {
        speed * (mass / (self.model.efficiency() * self.spring_constant)).sqrt()
    }

    /// Launch speed (m/s) produced by the given pullback distance
    pub fn speed_for_pullback(&self, pullback: f64, mass: f64) -> f64 {
        (self.model.efficiency() * self.spring_constant * pullback * pullback / mass).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ideal_pullback() {
        let launcher = Launcher::new(500.0).unwrap();
        // s = v·√(m/k): 20 · √(0.125/500) = 0.316...
        let s = launcher.pullback_for_speed(20.0, 0.125);
        assert_relative_eq!(s, 20.0 * (0.125_f64 / 500.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_round_trip() {
        let launcher =
            Launcher::with_model(300.0, SpringModel::Efficiency { eta: 0.85 }).unwrap();
        let s = launcher.pullback_for_speed(25.0, 0.125);
        assert_relative_eq!(launcher.speed_for_pullback(s, 0.125), 25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_efficiency_needs_longer_pullback() {
        let ideal = Launcher::new(500.0).unwrap();
        let lossy = Launcher::with_model(500.0, SpringModel::Efficiency { eta: 0.85 }).unwrap();
        assert!(lossy.pullback_for_speed(20.0, 0.125) > ideal.pullback_for_speed(20.0, 0.125));
    }

    #[test]
    fn test_invalid_spring_constant() {
        assert_eq!(
            Launcher::new(0.0),
            Err(LauncherError::InvalidSpringConstant(0.0))
        );
        assert!(Launcher::new(-10.0).is_err());
        assert!(Launcher::with_model(500.0, SpringModel::Efficiency { eta: 1.5 }).is_err());
    }
}
