//! Adam optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// Adam optimizer with bias-corrected moment estimates.
///
/// ```text
/// m_t = β₁·m_{t−1} + (1 − β₁)·g
/// v_t = β₂·v_{t−1} + (1 − β₂)·g²
/// θ_t = θ_{t−1} − lr_t · m_t / (√v_t + ε)
/// ```
///
/// where `lr_t` folds in the bias correction `√(1 − β₂ᵗ) / (1 − β₁ᵗ)`.
pub struct Adam {
    lr: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: u64,
    m: Vec<Option<Array1<f64>>>,
    v: Vec<Option<Array1<f64>>>,
}

impl Adam {
    /// Create a new Adam optimizer.
    pub fn new(lr: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self { lr, beta1, beta2, epsilon, t: 0, m: Vec::new(), v: Vec::new() }
    }

    /// Adam with the usual defaults (β₁ = 0.9, β₂ = 0.999, ε = 1e-8).
    pub fn default_params(lr: f64) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8)
    }

    fn ensure_moments(&mut self, n: usize) {
        if self.m.len() != n {
            self.m = vec![None; n];
            self.v = vec![None; n];
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [&mut Tensor]) {
        self.ensure_moments(params.len());
        self.t += 1;

        let lr_t = self.lr
            * ((1.0 - self.beta2.powi(self.t as i32)).sqrt()
                / (1.0 - self.beta1.powi(self.t as i32)));

        for (i, param) in params.iter_mut().enumerate() {
            if let Some(grad) = param.grad() {
                let m_t = match &self.m[i] {
                    Some(m) => m * self.beta1 + &grad * (1.0 - self.beta1),
                    None => &grad * (1.0 - self.beta1),
                };

                let grad_sq = &grad * &grad;
                let v_t = match &self.v[i] {
                    Some(v) => v * self.beta2 + &grad_sq * (1.0 - self.beta2),
                    None => &grad_sq * (1.0 - self.beta2),
                };

                let update = &m_t / &(v_t.mapv(f64::sqrt) + self.epsilon) * lr_t;
                let new_data = param.data() - &update;
                *param.data_mut() = new_data;

                self.m[i] = Some(m_t);
                self.v[i] = Some(v_t);
            }
        }
    }

    fn reset(&mut self) {
        self.t = 0;
        self.m.clear();
        self.v.clear();
    }

    fn lr(&self) -> f64 {
        self.lr
    }

    fn set_lr(&mut self, lr: f64) {
        self.lr = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn test_quadratic_convergence() {
        // f(x) = x², gradient 2x
        let mut param = Tensor::from_vec(vec![5.0, -3.0, 2.0], true);
        let mut optimizer = Adam::default_params(0.1);

        for _ in 0..200 {
            let grad = param.data().mapv(|x| 2.0 * x);
            param.set_grad(grad);
            optimizer.step(&mut [&mut param]);
        }

        for &val in param.data() {
            assert!(val.abs() < 0.1, "value {val} did not converge");
        }
    }

    #[test]
    fn test_first_step_magnitude() {
        // Bias correction makes the first step close to lr in magnitude.
        let mut param = Tensor::from_vec(vec![0.0], true);
        let mut optimizer = Adam::default_params(0.1);

        param.set_grad(arr1(&[1.0]));
        optimizer.step(&mut [&mut param]);
        assert_abs_diff_eq!(param.data()[0], -0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut param = Tensor::from_vec(vec![1.0], true);
        let mut optimizer = Adam::default_params(0.1);

        param.set_grad(arr1(&[1.0]));
        optimizer.step(&mut [&mut param]);
        let after_first = param.data()[0];

        optimizer.reset();

        // After reset, a step from the same gradient behaves like the first.
        param.set_grad(arr1(&[1.0]));
        optimizer.step(&mut [&mut param]);
        assert_abs_diff_eq!(param.data()[0] - after_first, after_first - 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_grad_leaves_params_unchanged() {
        let mut param = Tensor::from_vec(vec![1.0, 2.0], true);
        let mut optimizer = Adam::default_params(0.1);

        optimizer.step(&mut [&mut param]);
        assert_eq!(param.data(), &arr1(&[1.0, 2.0]));
    }

    #[test]
    fn test_multiple_params_all_updated() {
        let mut a = Tensor::from_vec(vec![1.0], true);
        let mut b = Tensor::from_vec(vec![3.0], true);
        a.set_grad(arr1(&[0.1]));
        b.set_grad(arr1(&[0.3]));

        let mut optimizer = Adam::default_params(0.1);
        optimizer.step(&mut [&mut a, &mut b]);

        assert!(a.data()[0] < 1.0);
        assert!(b.data()[0] < 3.0);
    }

    #[test]
    fn test_updates_stay_finite_with_extreme_values() {
        let mut param = Tensor::from_vec(vec![1e6, -1e6, 1e-6, -1e-6], true);
        let mut optimizer = Adam::default_params(0.001);

        let grad = param.data().mapv(|x| 2.0 * x);
        param.set_grad(grad);
        optimizer.step(&mut [&mut param]);

        assert!(param.data().iter().all(|v| v.is_finite()));
    }
}
