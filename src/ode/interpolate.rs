//! Cubic Hermite dense output

use crate::autograd::{ops, Tape, Tensor};

/// Interpolate within an accepted step spanning `h`, at fraction
/// `theta ∈ [0, 1]`.
///
/// Uses the states and derivatives at both endpoints (the FSAL stages), so
/// the interpolant is exact at `theta = 0` and `theta = 1` and reproduces
/// polynomials up to degree three. `theta` comes from the step-size
/// controller and is treated as a constant under differentiation.
pub(crate) fn hermite(
    tape: &Tape,
    theta: f64,
    h: f64,
    y0: &Tensor,
    y1: &Tensor,
    f0: &Tensor,
    f1: &Tensor,
) -> Tensor {
    let t2 = theta * theta;
    let t3 = t2 * theta;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + theta;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    ops::linear_combination(tape, &[(h00, y0), (h01, y1), (h * h10, f0), (h * h11, f1)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_exact_at_endpoints() {
        let tape = Tape::new();
        let y0 = Tensor::from_vec(vec![1.0, -2.0], false);
        let y1 = Tensor::from_vec(vec![3.0, 0.5], false);
        let f0 = Tensor::from_vec(vec![10.0, 10.0], false);
        let f1 = Tensor::from_vec(vec![-10.0, -10.0], false);

        let at0 = hermite(&tape, 0.0, 0.7, &y0, &y1, &f0, &f1);
        let at1 = hermite(&tape, 1.0, 0.7, &y0, &y1, &f0, &f1);
        assert_eq!(at0.data(), y0.data());
        assert_eq!(at1.data(), y1.data());
    }

    #[test]
    fn test_reproduces_cubic() {
        // y(t) = t³ on [0, 1]: y0 = 0, y1 = 1, f0 = 0, f1 = 3.
        let tape = Tape::new();
        let y0 = Tensor::from_vec(vec![0.0], false);
        let y1 = Tensor::from_vec(vec![1.0], false);
        let f0 = Tensor::from_vec(vec![0.0], false);
        let f1 = Tensor::from_vec(vec![3.0], false);

        for &theta in &[0.25, 0.5, 0.75] {
            let y = hermite(&tape, theta, 1.0, &y0, &y1, &f0, &f1);
            assert_abs_diff_eq!(y.data()[0], theta * theta * theta, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_gradient_flows_to_endpoints() {
        let tape = Tape::new();
        let y0 = Tensor::from_vec(vec![1.0], true);
        let y1 = Tensor::from_vec(vec![2.0], true);
        let f0 = Tensor::from_vec(vec![0.0], false);
        let f1 = Tensor::from_vec(vec![0.0], false);

        let mid = hermite(&tape, 0.5, 1.0, &y0, &y1, &f0, &f1);
        tape.backward(&mid);

        // h00(0.5) = h01(0.5) = 0.5
        assert_abs_diff_eq!(y0.grad().unwrap()[0], 0.5, epsilon = 1e-14);
        assert_abs_diff_eq!(y1.grad().unwrap()[0], 0.5, epsilon = 1e-14);
    }
}
