use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Collapses a vector to a scalar by summing its components.
///
/// The derivative of a sum is constant, so backward needs no cached state:
/// the local Jacobian is the all-ones row whatever the forwarded values were.
#[derive(Debug, Clone)]
pub struct SumReduction {
    dim: usize,
}

impl SumReduction {
    pub fn new(dim: usize) -> Self {
        SumReduction { dim }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub(crate) fn forward_into(&self, input: ArrayView1<f64>, out: &mut Array1<f64>) {
        out[0] = input.sum();
    }

    pub(crate) fn local_jacobian_into(&self, jac: &mut Array2<f64>) {
        jac.fill(1.0);
    }

    // ones(1, n) · upstream collapses to a column-wise sum of the upstream
    // Jacobian.
    pub(crate) fn accumulate_jacobian_into(&self, upstream: ArrayView2<f64>, jac: &mut Array2<f64>) {
        let mut row = jac.row_mut(0);
        row.fill(0.0);
        for up in upstream.rows() {
            row += &up;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn output_dimension_is_always_one() {
        let layer = SumReduction::new(5);
        assert_eq!(layer.dim(), 5);
    }

    #[test]
    fn forward_sums_all_components() {
        let layer = SumReduction::new(3);
        let mut out = Array1::zeros(1);
        layer.forward_into(array![1.0, 2.0, 3.5].view(), &mut out);
        assert_abs_diff_eq!(out[0], 6.5);
    }

    #[test]
    fn accumulation_sums_upstream_columns() {
        let layer = SumReduction::new(2);
        let upstream = array![[1.0, 2.0, 3.0], [10.0, 20.0, 30.0]];
        let mut jac = Array2::zeros((1, 3));
        layer.accumulate_jacobian_into(upstream.view(), &mut jac);
        assert_eq!(jac, array![[11.0, 22.0, 33.0]]);
    }
}
