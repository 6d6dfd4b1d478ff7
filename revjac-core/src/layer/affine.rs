use crate::error::RevJacError;
use ndarray::linalg::{general_mat_mul, general_mat_vec_mul};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Applies an affine transformation to the incoming data: `y = W·x + b`.
///
/// The weight matrix is stored output-major (`out_dim` rows by `in_dim`
/// columns). Many libraries use row-vector conventions (`x·W + b`), so
/// weights loaded from elsewhere may need a transpose first.
#[derive(Debug, Clone)]
pub struct Affine {
    weight: Array2<f64>,
    bias: Array1<f64>,
}

impl Affine {
    /// Creates a new affine layer from its parameters.
    ///
    /// # Errors
    /// `ParameterMismatch` if the bias length differs from the weight row
    /// count.
    pub fn new(weight: Array2<f64>, bias: Array1<f64>) -> Result<Self, RevJacError> {
        if weight.nrows() != bias.len() {
            return Err(RevJacError::ParameterMismatch {
                rows: weight.nrows(),
                cols: weight.ncols(),
                bias_len: bias.len(),
            });
        }
        Ok(Affine { weight, bias })
    }

    pub fn in_dim(&self) -> usize {
        self.weight.ncols()
    }

    pub fn out_dim(&self) -> usize {
        self.weight.nrows()
    }

    pub fn weight(&self) -> &Array2<f64> {
        &self.weight
    }

    pub fn bias(&self) -> &Array1<f64> {
        &self.bias
    }

    /// Replaces the layer's parameters.
    ///
    /// A chain fixes its dimensions at construction, so the replacement must
    /// keep the declared shape. Mutating a layer that already sits inside a
    /// chain goes through [`Chain::layer_mut`](crate::chain::Chain::layer_mut),
    /// which drops any cached activation state: a new forward call is
    /// required before the next backward.
    ///
    /// # Errors
    /// `ParameterShapeChange` if the new weight matrix has a different shape,
    /// `ParameterMismatch` if the new bias length disagrees with it.
    pub fn set_weights(&mut self, weight: Array2<f64>, bias: Array1<f64>) -> Result<(), RevJacError> {
        if weight.dim() != self.weight.dim() {
            return Err(RevJacError::ParameterShapeChange {
                rows: self.out_dim(),
                cols: self.in_dim(),
                actual_rows: weight.nrows(),
                actual_cols: weight.ncols(),
            });
        }
        if weight.nrows() != bias.len() {
            return Err(RevJacError::ParameterMismatch {
                rows: weight.nrows(),
                cols: weight.ncols(),
                bias_len: bias.len(),
            });
        }
        self.weight = weight;
        self.bias = bias;
        Ok(())
    }

    // y = W·x + b, written into the chain's preallocated output buffer.
    pub(crate) fn forward_into(&self, input: ArrayView1<f64>, out: &mut Array1<f64>) {
        out.assign(&self.bias);
        general_mat_vec_mul(1.0, &self.weight, &input, 1.0, out);
    }

    // An affine map is globally linear: its local Jacobian is W itself.
    pub(crate) fn local_jacobian_into(&self, jac: &mut Array2<f64>) {
        jac.assign(&self.weight);
    }

    pub(crate) fn accumulate_jacobian_into(&self, upstream: ArrayView2<f64>, jac: &mut Array2<f64>) {
        general_mat_mul(1.0, &self.weight, &upstream, 0.0, jac);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn construction_checks_parameter_agreement() {
        let result = Affine::new(Array2::zeros((3, 2)), Array1::zeros(4));
        assert_eq!(
            result.err(),
            Some(RevJacError::ParameterMismatch {
                rows: 3,
                cols: 2,
                bias_len: 4
            })
        );
    }

    #[test]
    fn dimensions_follow_the_weight_matrix() {
        let layer = Affine::new(Array2::zeros((3, 2)), Array1::zeros(3)).unwrap();
        assert_eq!(layer.in_dim(), 2);
        assert_eq!(layer.out_dim(), 3);
    }

    #[test]
    fn set_weights_preserves_declared_dimensions() {
        let mut layer = Affine::new(Array2::zeros((2, 2)), Array1::zeros(2)).unwrap();

        let grown = layer.set_weights(Array2::zeros((3, 2)), Array1::zeros(3));
        assert_eq!(
            grown.err(),
            Some(RevJacError::ParameterShapeChange {
                rows: 2,
                cols: 2,
                actual_rows: 3,
                actual_cols: 2
            })
        );

        layer
            .set_weights(array![[1.0, 0.0], [0.0, 1.0]], array![0.5, -0.5])
            .unwrap();
        assert_eq!(layer.weight(), &array![[1.0, 0.0], [0.0, 1.0]]);
        assert_eq!(layer.bias(), &array![0.5, -0.5]);
    }

    #[test]
    fn set_weights_rejects_a_disagreeing_bias() {
        let mut layer = Affine::new(Array2::zeros((2, 3)), Array1::zeros(2)).unwrap();
        let result = layer.set_weights(Array2::zeros((2, 3)), Array1::zeros(3));
        assert_eq!(
            result.err(),
            Some(RevJacError::ParameterMismatch {
                rows: 2,
                cols: 3,
                bias_len: 3
            })
        );
    }

    #[test]
    fn forward_applies_weight_then_bias() {
        let layer = Affine::new(array![[1.0, 2.0], [3.0, 4.0]], array![0.5, -0.5]).unwrap();
        let mut out = Array1::zeros(2);
        layer.forward_into(array![1.0, 1.0].view(), &mut out);
        assert_eq!(out, array![3.5, 6.5]);
    }
}
