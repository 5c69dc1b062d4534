//! Embedded Cash-Karp Runge-Kutta 4(5) integration.
//!
//! The equations of motion are autonomous (drag and wind do not depend on
//! time), so the derivative function takes only the state. Each accepted step
//! is controlled against a mixed absolute/relative error tolerance; the
//! fifth-order solution is propagated and the fourth-order embedded solution
//! supplies the error estimate.

use crate::error::SimulationError;

/// Integration state: [x, y, z, vx, vy, vz]
pub type State = [f64; 6];

/// One accepted integration step
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Time at the end of the step
    pub t: f64,
    /// State at the end of the step
    pub state: State,
    /// Suggested size for the next step
    pub h_next: f64,
}

/// Adaptive stepper with Cash-Karp coefficients
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveStepper {
    rel_tol: f64,
    abs_tol: f64,
    min_step: f64,
    max_step: f64,
}

// Cash-Karp tableau
const B21: f64 = 1.0 / 5.0;
const B31: f64 = 3.0 / 40.0;
const B32: f64 = 9.0 / 40.0;
const B41: f64 = 3.0 / 10.0;
const B42: f64 = -9.0 / 10.0;
const B43: f64 = 6.0 / 5.0;
const B51: f64 = -11.0 / 54.0;
const B52: f64 = 5.0 / 2.0;
const B53: f64 = -70.0 / 27.0;
const B54: f64 = 35.0 / 27.0;
const B61: f64 = 1631.0 / 55296.0;
const B62: f64 = 175.0 / 512.0;
const B63: f64 = 575.0 / 13824.0;
const B64: f64 = 44275.0 / 110592.0;
const B65: f64 = 253.0 / 4096.0;

// Fifth-order weights
const C1: f64 = 37.0 / 378.0;
const C3: f64 = 250.0 / 621.0;
const C4: f64 = 125.0 / 594.0;
const C6: f64 = 512.0 / 1771.0;

// Difference between fifth- and fourth-order weights (error estimate)
const D1: f64 = C1 - 2825.0 / 27648.0;
const D3: f64 = C3 - 18575.0 / 48384.0;
const D4: f64 = C4 - 13525.0 / 55296.0;
const D5: f64 = -277.0 / 14336.0;
const D6: f64 = C6 - 1.0 / 4.0;

const SAFETY: f64 = 0.9;
const MIN_SCALE: f64 = 0.2;
const MAX_SCALE: f64 = 5.0;
const MAX_ATTEMPTS: usize = 64;

impl AdaptiveStepper {
    pub fn new(rel_tol: f64, abs_tol: f64) -> Self {
        Self {
            rel_tol,
            abs_tol,
            min_step: 1e-12,
            max_step: 0.25,
        }
    }

    /// Take one step of at most `h_try`, shrinking until the error estimate
    /// passes the tolerance.
    ///
    /// Returns the accepted step, or an error when the state goes non-finite
    /// or the step size underflows without meeting the tolerance.
    pub fn advance<F>(&self, f: &F, t: f64, y: &State, h_try: f64) -> Result<Step, SimulationError>
    where
        F: Fn(&State) -> State,
    {
        let mut h = h_try.min(self.max_step);
        let k1 = f(y);

        for _ in 0..MAX_ATTEMPTS {
            let (y_next, err) = self.try_step(f, y, &k1, h);

            if !err.is_finite() || y_next.iter().any(|v| !v.is_finite()) {
                return Err(SimulationError::NonFiniteState);
            }

            if err <= 1.0 {
                let scale = if err > 0.0 {
                    (SAFETY * err.powf(-0.2)).clamp(MIN_SCALE, MAX_SCALE)
                } else {
                    MAX_SCALE
                };
                return Ok(Step {
                    t: t + h,
                    state: y_next,
                    h_next: (h * scale).min(self.max_step),
                });
            }

            h *= (SAFETY * err.powf(-0.25)).clamp(MIN_SCALE, 1.0);
            if h < self.min_step {
                return Err(SimulationError::StepSizeUnderflow { t });
            }
        }

        Err(SimulationError::StepSizeUnderflow { t })
    }

    /// Single Cash-Karp attempt: fifth-order solution and normalized error.
    fn try_step<F>(&self, f: &F, y: &State, k1: &State, h: f64) -> (State, f64)
    where
        F: Fn(&State) -> State,
    {
        let mut tmp = [0.0; 6];

        for i in 0..6 {
            tmp[i] = y[i] + h * B21 * k1[i];
        }
        let k2 = f(&tmp);

        for i in 0..6 {
            tmp[i] = y[i] + h * (B31 * k1[i] + B32 * k2[i]);
        }
        let k3 = f(&tmp);

        for i in 0..6 {
            tmp[i] = y[i] + h * (B41 * k1[i] + B42 * k2[i] + B43 * k3[i]);
        }
        let k4 = f(&tmp);

        for i in 0..6 {
            tmp[i] = y[i] + h * (B51 * k1[i] + B52 * k2[i] + B53 * k3[i] + B54 * k4[i]);
        }
        let k5 = f(&tmp);

        for i in 0..6 {
            tmp[i] = y[i]
                + h * (B61 * k1[i] + B62 * k2[i] + B63 * k3[i] + B64 * k4[i] + B65 * k5[i]);
        }
        let k6 = f(&tmp);

        let mut y_next = [0.0; 6];
        let mut err = 0.0_f64;
        for i in 0..6 {
            y_next[i] = y[i] + h * (C1 * k1[i] + C3 * k3[i] + C4 * k4[i] + C6 * k6[i]);
            let e = h * (D1 * k1[i] + D3 * k3[i] + D4 * k4[i] + D5 * k5[i] + D6 * k6[i]);
            let tol = self.abs_tol + self.rel_tol * y[i].abs().max(y_next[i].abs());
            err = err.max((e / tol).abs());
        }

        (y_next, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Free fall: y'' = -g has the exact solution y = -g t² / 2
    fn free_fall(state: &State) -> State {
        [state[3], state[4], state[5], 0.0, -9.81, 0.0]
    }

    #[test]
    fn test_free_fall_accuracy() {
        let stepper = AdaptiveStepper::new(1e-6, 1e-9);
        let mut t = 0.0;
        let mut y: State = [0.0; 6];
        let mut h: f64 = 0.01;

        while t < 2.0 {
            let step = stepper.advance(&free_fall, t, &y, h.min(2.0 - t)).unwrap();
            t = step.t;
            y = step.state;
            h = step.h_next;
        }

        assert_relative_eq!(y[1], -0.5 * 9.81 * t * t, epsilon = 1e-6);
        assert_relative_eq!(y[4], -9.81 * t, epsilon = 1e-6);
    }

    #[test]
    fn test_step_grows_on_smooth_problem() {
        let stepper = AdaptiveStepper::new(1e-6, 1e-9);
        let y: State = [0.0; 6];
        let step = stepper.advance(&free_fall, 0.0, &y, 1e-4).unwrap();
        // Free fall is exactly representable; the controller should ask for more
        assert!(step.h_next > 1e-4);
    }

    #[test]
    fn test_non_finite_state_detected() {
        let blow_up = |state: &State| -> State {
            [state[3], state[4], state[5], 0.0, state[1] * f64::INFINITY, 0.0]
        };
        let y: State = [0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let stepper = AdaptiveStepper::new(1e-6, 1e-9);
        assert!(matches!(
            stepper.advance(&blow_up, 0.0, &y, 0.01),
            Err(SimulationError::NonFiniteState)
        ));
    }
}
