use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};

/// Applies a scalar function componentwise, together with its registered
/// derivative.
///
/// The derivative is evaluated elementwise and independently per component,
/// so the local Jacobian is diagonal. Any differentiable scalar function
/// expressible through its argument works: the layer caches the
/// pre-activation input during forward and evaluates `f'` on it during
/// backward.
#[derive(Debug, Clone)]
pub struct ElementwiseActivation {
    function: fn(f64) -> f64,
    derivative: fn(f64) -> f64,
    // pre-activation input of the most recent forward call
    input: Array1<f64>,
}

impl ElementwiseActivation {
    /// Creates an activation layer from a registered `(f, f')` pair.
    pub fn new(dim: usize, function: fn(f64) -> f64, derivative: fn(f64) -> f64) -> Self {
        ElementwiseActivation {
            function,
            derivative,
            input: Array1::zeros(dim),
        }
    }

    /// Hyperbolic tangent, `f'(u) = 1 - tanh(u)^2`.
    pub fn tanh(dim: usize) -> Self {
        Self::new(dim, f64::tanh, |u| 1.0 - u.tanh().powi(2))
    }

    /// Logistic sigmoid, `f'(u) = sigma(u) * (1 - sigma(u))`.
    pub fn sigmoid(dim: usize) -> Self {
        fn sigma(u: f64) -> f64 {
            1.0 / (1.0 + (-u).exp())
        }
        Self::new(dim, sigma, |u| {
            let s = sigma(u);
            s * (1.0 - s)
        })
    }

    pub fn dim(&self) -> usize {
        self.input.len()
    }

    pub(crate) fn forward_into(&mut self, input: ArrayView1<f64>, out: &mut Array1<f64>) {
        self.input.assign(&input);
        let f = self.function;
        Zip::from(out).and(&self.input).for_each(|o, &u| *o = f(u));
    }

    // diag(f'(cached input)): only the diagonal is ever nonzero.
    pub(crate) fn local_jacobian_into(&self, jac: &mut Array2<f64>) {
        let df = self.derivative;
        jac.fill(0.0);
        Zip::from(jac.diag_mut())
            .and(&self.input)
            .for_each(|d, &u| *d = df(u));
    }

    // A diagonal local Jacobian collapses the matrix product to scaling row k
    // of the upstream Jacobian by f'(input[k]).
    pub(crate) fn accumulate_jacobian_into(&self, upstream: ArrayView2<f64>, jac: &mut Array2<f64>) {
        let df = self.derivative;
        Zip::from(jac.rows_mut())
            .and(upstream.rows())
            .and(&self.input)
            .for_each(|mut row, up, &u| {
                row.assign(&up);
                row *= df(u);
            });
    }
}
