//! Gradient clipping utilities

use crate::Tensor;

/// Clip gradients by global norm.
///
/// Computes the global norm over all parameter gradients and scales every
/// gradient down when the norm exceeds `max_norm`, preserving their relative
/// magnitudes.
///
/// Returns the global norm before clipping.
pub fn clip_grad_norm(params: &mut [&mut Tensor], max_norm: f64) -> f64 {
    let mut total_norm_sq = 0.0;

    for param in params.iter() {
        if let Some(grad) = param.grad() {
            total_norm_sq += grad.iter().map(|&g| g * g).sum::<f64>();
        }
    }

    let global_norm = total_norm_sq.sqrt();

    if global_norm > max_norm {
        let clip_coef = max_norm / global_norm;
        for param in params.iter_mut() {
            if let Some(grad) = param.grad() {
                param.set_grad(grad * clip_coef);
            }
        }
    }

    global_norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn test_below_threshold_untouched() {
        let mut param = Tensor::zeros(2, true);
        param.set_grad(arr1(&[3.0, 4.0]));

        let norm = clip_grad_norm(&mut [&mut param], 10.0);
        assert_abs_diff_eq!(norm, 5.0, epsilon = 1e-12);
        assert_eq!(param.grad().unwrap(), arr1(&[3.0, 4.0]));
    }

    #[test]
    fn test_above_threshold_scaled() {
        let mut param = Tensor::zeros(2, true);
        param.set_grad(arr1(&[3.0, 4.0]));

        let norm = clip_grad_norm(&mut [&mut param], 1.0);
        assert_abs_diff_eq!(norm, 5.0, epsilon = 1e-12);

        let clipped = param.grad().unwrap();
        let new_norm = clipped.iter().map(|g| g * g).sum::<f64>().sqrt();
        assert_abs_diff_eq!(new_norm, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_norm_spans_multiple_params() {
        let mut a = Tensor::zeros(1, true);
        let mut b = Tensor::zeros(1, true);
        a.set_grad(arr1(&[3.0]));
        b.set_grad(arr1(&[4.0]));

        let norm = clip_grad_norm(&mut [&mut a, &mut b], 100.0);
        assert_abs_diff_eq!(norm, 5.0, epsilon = 1e-12);
    }
}
