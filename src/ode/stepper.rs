//! Embedded Runge-Kutta step

use super::tableau::{A, B, B_TILDE, C};
use crate::autograd::{ops, Tape, Tensor};
use crate::field::VectorField;
use ndarray::Array1;

/// Output of one attempted step.
pub(crate) struct StepResult {
    /// Fifth-order advance of the state, on the tape.
    pub y_new: Tensor,
    /// Derivative at `(t + h, y_new)`; becomes the first stage of the next
    /// step when this one is accepted.
    pub k_last: Tensor,
    /// Embedded difference `h·Σ b̃ᵢ·kᵢ`, for error control only. Raw data,
    /// off the tape: accept/reject decisions are never differentiated.
    pub err: Array1<f64>,
}

/// One Tsitouras 5(4) step from `(t, y)` with size `h`.
///
/// `k_first` is the derivative at `(t, y)`, reused from the previous
/// accepted step's last stage (FSAL); six fresh field evaluations follow.
/// All stage arithmetic is recorded on the tape; there is no data-dependent
/// branching inside the stage computation.
pub(crate) fn rk_step<F: VectorField + ?Sized>(
    tape: &Tape,
    field: &F,
    t: f64,
    y: &Tensor,
    k_first: &Tensor,
    h: f64,
) -> StepResult {
    let mut ks: Vec<Tensor> = Vec::with_capacity(7);
    ks.push(k_first.clone());

    for s in 1..6 {
        let y_s = {
            let mut terms: Vec<(f64, &Tensor)> = Vec::with_capacity(s + 1);
            terms.push((1.0, y));
            for (j, k) in ks.iter().enumerate().take(s) {
                terms.push((h * A[s][j], k));
            }
            ops::linear_combination(tape, &terms)
        };
        ks.push(field.eval(tape, t + C[s] * h, &y_s));
    }

    // Fifth-order advance; the b row coincides with the last stage row, so
    // y_new is also the final stage input.
    let y_new = {
        let mut terms: Vec<(f64, &Tensor)> = Vec::with_capacity(7);
        terms.push((1.0, y));
        for (j, k) in ks.iter().enumerate() {
            terms.push((h * B[j], k));
        }
        ops::linear_combination(tape, &terms)
    };
    let k_last = field.eval(tape, t + h, &y_new);
    ks.push(k_last.clone());

    let mut err = Array1::zeros(y.len());
    for (j, k) in ks.iter().enumerate() {
        err.scaled_add(h * B_TILDE[j], k.data());
    }

    StepResult { y_new, k_last, err }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// `dy/dt = -y`, differentiable.
    struct Decay;

    impl VectorField for Decay {
        fn dim(&self) -> usize {
            1
        }

        fn eval(&self, tape: &Tape, _t: f64, y: &Tensor) -> Tensor {
            ops::scale(tape, y, -1.0)
        }
    }

    #[test]
    fn test_single_step_accuracy() {
        let tape = Tape::new();
        let y = Tensor::from_vec(vec![1.0], false);
        let k1 = Decay.eval(&tape, 0.0, &y);

        let h = 0.1;
        let step = rk_step(&tape, &Decay, 0.0, &y, &k1, h);

        // Fifth order: local error well below 1e-8 at h = 0.1.
        assert_abs_diff_eq!(step.y_new.data()[0], (-h).exp(), epsilon = 1e-8);
    }

    #[test]
    fn test_fsal_derivative_matches_field_at_endpoint() {
        let tape = Tape::new();
        let y = Tensor::from_vec(vec![2.0], false);
        let k1 = Decay.eval(&tape, 0.0, &y);

        let step = rk_step(&tape, &Decay, 0.0, &y, &k1, 0.05);
        assert_abs_diff_eq!(step.k_last.data()[0], -step.y_new.data()[0], epsilon = 1e-15);
    }

    #[test]
    fn test_embedded_error_scales_with_step_size() {
        let tape = Tape::new();
        let y = Tensor::from_vec(vec![1.0], false);
        let k1 = Decay.eval(&tape, 0.0, &y);

        let small = rk_step(&tape, &Decay, 0.0, &y, &k1, 0.05).err[0].abs();
        let large = rk_step(&tape, &Decay, 0.0, &y, &k1, 0.2).err[0].abs();
        assert!(small < large);
    }

    #[test]
    fn test_step_gradient_with_respect_to_initial_state() {
        // For dy/dt = -y one step gives y_new ≈ y·e^{-h}, so dy_new/dy ≈ e^{-h}.
        let tape = Tape::new();
        let y = Tensor::from_vec(vec![1.5], true);
        let k1 = Decay.eval(&tape, 0.0, &y);

        let h = 0.1;
        let step = rk_step(&tape, &Decay, 0.0, &y, &k1, h);
        tape.backward(&step.y_new);

        assert_abs_diff_eq!(y.grad().unwrap()[0], (-h).exp(), epsilon = 1e-8);
    }
}
