//! PID step-size controller

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Reciprocal of the embedded error order plus one, for a 5(4) pair.
const EXPONENT: f64 = 1.0 / 5.0;

/// Step-size control settings.
///
/// The next step size is proposed from the history of inverse error ratios
/// `ε = 1/r`:
///
/// ```text
/// h_next = h · clamp(safety · εₙ^β₁ · εₙ₋₁^β₂ · εₙ₋₂^β₃, factor_min, factor_max)
/// ```
///
/// with `β₁ = (p+i+d)/5`, `β₂ = −(p+2d)/5`, `β₃ = d/5`. The default gains
/// `p = 0.4, i = 0.3, d = 0` damp the step-size oscillation a plain
/// proportional rule produces on rough error landscapes; setting
/// `p = d = 0, i = 1` recovers the classic integral controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidController {
    /// Relative tolerance.
    pub rtol: f64,
    /// Absolute tolerance.
    pub atol: f64,
    /// Safety factor applied to every proposal.
    pub safety: f64,
    /// Lower clamp on the per-step factor (also the minimum shrink on
    /// rejection).
    pub factor_min: f64,
    /// Upper clamp on the per-step factor.
    pub factor_max: f64,
    /// Absolute lower bound on the step size, if any.
    pub dt_min: Option<f64>,
    /// Absolute upper bound on the step size, if any.
    pub dt_max: Option<f64>,
    /// Proportional gain.
    pub pcoeff: f64,
    /// Integral gain.
    pub icoeff: f64,
    /// Derivative gain.
    pub dcoeff: f64,
}

impl Default for PidController {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            safety: 0.9,
            factor_min: 0.2,
            factor_max: 10.0,
            dt_min: None,
            dt_max: None,
            pcoeff: 0.4,
            icoeff: 0.3,
            dcoeff: 0.0,
        }
    }
}

/// Controller memory; lives for exactly one integration call.
#[derive(Debug, Clone)]
pub(crate) struct ControllerState {
    inv_prev: f64,
    inv_prev2: f64,
}

impl ControllerState {
    pub(crate) fn new() -> Self {
        Self { inv_prev: 1.0, inv_prev2: 1.0 }
    }
}

impl PidController {
    /// Scalar error ratio: RMS of the embedded difference against the
    /// mixed tolerance band `atol + rtol·max(|y|, |y_new|)`.
    pub(crate) fn error_ratio(
        &self,
        err: &Array1<f64>,
        y: &Array1<f64>,
        y_new: &Array1<f64>,
    ) -> f64 {
        let n = err.len();
        let mut acc = 0.0;
        for i in 0..n {
            let sc = self.atol + self.rtol * y[i].abs().max(y_new[i].abs());
            let e = err[i] / sc;
            acc += e * e;
        }
        (acc / n as f64).sqrt()
    }

    /// Decide accept/reject for an attempted step of size `h` with error
    /// ratio `r`, and propose the next step size.
    ///
    /// History advances only on acceptance; a rejected step retries from the
    /// same state with a strictly smaller proposal.
    pub(crate) fn propose(&self, state: &mut ControllerState, h: f64, r: f64) -> (f64, bool) {
        let accept = r <= 1.0;

        let beta1 = (self.pcoeff + self.icoeff + self.dcoeff) * EXPONENT;
        let beta2 = -(self.pcoeff + 2.0 * self.dcoeff) * EXPONENT;
        let beta3 = self.dcoeff * EXPONENT;

        let inv = if r > 0.0 { 1.0 / r } else { f64::INFINITY };
        let mut factor =
            self.safety * inv.powf(beta1) * state.inv_prev.powf(beta2) * state.inv_prev2.powf(beta3);
        if !factor.is_finite() {
            factor = self.factor_max;
        }
        factor = factor.clamp(self.factor_min, self.factor_max);
        if !accept {
            // never grow a rejected step
            factor = factor.min(1.0);
        }

        let mut h_next = h * factor;
        if let Some(dt_max) = self.dt_max {
            h_next = h_next.min(dt_max);
        }
        if let Some(dt_min) = self.dt_min {
            h_next = h_next.max(dt_min);
        }

        if accept {
            state.inv_prev2 = state.inv_prev;
            state.inv_prev = if inv.is_finite() { inv } else { 1.0 };
        }

        (h_next, accept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;
    use proptest::prelude::*;

    #[test]
    fn test_accept_rule() {
        let ctrl = PidController::default();
        let mut state = ControllerState::new();

        let (_, accept) = ctrl.propose(&mut state, 0.1, 0.5);
        assert!(accept);
        let (_, accept) = ctrl.propose(&mut state, 0.1, 1.0);
        assert!(accept);
        let (_, accept) = ctrl.propose(&mut state, 0.1, 1.000001);
        assert!(!accept);
    }

    #[test]
    fn test_rejection_shrinks() {
        let ctrl = PidController::default();
        let mut state = ControllerState::new();

        let (h_next, accept) = ctrl.propose(&mut state, 0.1, 4.0);
        assert!(!accept);
        assert!(h_next < 0.1);
        // bounded below by the minimum shrink factor
        assert!(h_next >= 0.1 * ctrl.factor_min - 1e-15);
    }

    #[test]
    fn test_zero_error_grows_at_factor_max() {
        let ctrl = PidController::default();
        let mut state = ControllerState::new();

        let (h_next, accept) = ctrl.propose(&mut state, 0.1, 0.0);
        assert!(accept);
        assert_abs_diff_eq!(h_next, 0.1 * ctrl.factor_max, epsilon = 1e-12);
    }

    #[test]
    fn test_integral_controller_formula() {
        // p = d = 0, i = 1 recovers h·0.9·r^(-1/5).
        let ctrl = PidController { pcoeff: 0.0, icoeff: 1.0, dcoeff: 0.0, ..Default::default() };
        let mut state = ControllerState::new();

        let r: f64 = 0.5;
        let (h_next, _) = ctrl.propose(&mut state, 1.0, r);
        assert_abs_diff_eq!(h_next, 0.9 * (1.0 / r).powf(0.2), epsilon = 1e-12);
    }

    #[test]
    fn test_history_advances_only_on_accept() {
        let ctrl = PidController { pcoeff: 0.4, icoeff: 0.3, dcoeff: 0.1, ..Default::default() };
        let mut state = ControllerState::new();

        let (_, accept) = ctrl.propose(&mut state, 0.1, 2.0);
        assert!(!accept);
        assert_abs_diff_eq!(state.inv_prev, 1.0);

        let (_, accept) = ctrl.propose(&mut state, 0.1, 0.25);
        assert!(accept);
        assert_abs_diff_eq!(state.inv_prev, 4.0);
        assert_abs_diff_eq!(state.inv_prev2, 1.0);
    }

    #[test]
    fn test_dt_bounds_respected() {
        let ctrl = PidController {
            dt_min: Some(1e-3),
            dt_max: Some(0.5),
            ..Default::default()
        };
        let mut state = ControllerState::new();

        let (h_next, _) = ctrl.propose(&mut state, 0.4, 0.0);
        assert_abs_diff_eq!(h_next, 0.5);

        let (h_next, _) = ctrl.propose(&mut state, 2e-3, 100.0);
        assert_abs_diff_eq!(h_next, 1e-3);
    }

    #[test]
    fn test_error_ratio_rms() {
        let ctrl = PidController { rtol: 0.0, atol: 1.0, ..Default::default() };
        let err = arr1(&[3.0, 4.0]);
        let y = arr1(&[0.0, 0.0]);
        // RMS of [3, 4] = sqrt(25/2)
        assert_abs_diff_eq!(ctrl.error_ratio(&err, &y, &y), (12.5_f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_error_ratio_uses_larger_state_magnitude() {
        let ctrl = PidController { rtol: 1.0, atol: 0.0, ..Default::default() };
        let err = arr1(&[1.0]);
        let y = arr1(&[0.5]);
        let y_new = arr1(&[2.0]);
        assert_abs_diff_eq!(ctrl.error_ratio(&err, &y, &y_new), 0.5, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn prop_factor_stays_clamped(
            r in 0.0_f64..100.0,
            h in 1e-6_f64..10.0,
            p in 0.0_f64..1.0,
            i in 0.0_f64..1.0,
            d in 0.0_f64..0.5,
            prev in 0.01_f64..100.0,
            prev2 in 0.01_f64..100.0,
        ) {
            let ctrl = PidController { pcoeff: p, icoeff: i, dcoeff: d, ..Default::default() };
            let mut state = ControllerState { inv_prev: prev, inv_prev2: prev2 };
            let (h_next, accept) = ctrl.propose(&mut state, h, r);

            prop_assert!(h_next >= h * ctrl.factor_min - 1e-12);
            prop_assert!(h_next <= h * ctrl.factor_max + 1e-12);
            if !accept {
                prop_assert!(h_next <= h + 1e-12);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_accept_iff_ratio_within_one(r in 0.0_f64..10.0) {
            let ctrl = PidController::default();
            let mut state = ControllerState::new();
            let (_, accept) = ctrl.propose(&mut state, 0.1, r);
            prop_assert_eq!(accept, r <= 1.0);
        }
    }
}
