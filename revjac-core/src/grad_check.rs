use crate::chain::Chain;
use crate::error::RevJacError;
use approx::relative_eq;
use ndarray::Array1;
use thiserror::Error;

/// Error type specifically for Jacobian checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JacobianCheckError {
    #[error("forward pass failed during Jacobian check: {0}")]
    ForwardPass(RevJacError),

    #[error("backward pass failed during Jacobian check: {0}")]
    BackwardPass(RevJacError),

    #[error("Jacobian mismatch at row {row}, column {col}: analytic {analytic:?} != numeric {numeric:?} (difference {difference:?})")]
    JacobianMismatch {
        row: usize,
        col: usize,
        analytic: f64,
        numeric: f64,
        difference: f64,
    },

    #[error("numeric derivative is not finite at row {row}, column {col} (f(x+eps) = {plus:?}, f(x-eps) = {minus:?})")]
    NumericNonFinite {
        row: usize,
        col: usize,
        plus: f64,
        minus: f64,
    },
}

/// Checks a chain's analytic Jacobian against central differences.
///
/// Every entry of the backward Jacobian at `input` is compared against
/// `(f(x + eps·e_j) - f(x - eps·e_j)) / (2·eps)` within `tolerance`, both
/// absolute and relative. The chain is re-forwarded on the unperturbed input
/// before returning, so its cached state ends up as if only
/// `forward(input)` had run.
///
/// This is verification tooling, not a hot path: it clones outputs freely
/// and runs `2·n + 2` forward passes for an n-dimensional input.
///
/// # Errors
/// `JacobianMismatch` on the first entry outside tolerance,
/// `NumericNonFinite` if a difference quotient degenerates, and the
/// forward/backward wrappers for errors surfaced by the chain itself.
pub fn check_jacobian(
    chain: &mut Chain,
    input: &Array1<f64>,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), JacobianCheckError> {
    chain
        .forward(input)
        .map_err(JacobianCheckError::ForwardPass)?;
    let analytic = chain
        .backward()
        .map_err(JacobianCheckError::BackwardPass)?
        .to_owned();

    let mut probe = input.clone();
    for col in 0..input.len() {
        probe[col] = input[col] + epsilon;
        let plus = chain
            .forward(&probe)
            .map_err(JacobianCheckError::ForwardPass)?
            .to_owned();
        probe[col] = input[col] - epsilon;
        let minus = chain
            .forward(&probe)
            .map_err(JacobianCheckError::ForwardPass)?
            .to_owned();
        probe[col] = input[col];

        for row in 0..analytic.nrows() {
            let numeric = (plus[row] - minus[row]) / (2.0 * epsilon);
            if !numeric.is_finite() {
                return Err(JacobianCheckError::NumericNonFinite {
                    row,
                    col,
                    plus: plus[row],
                    minus: minus[row],
                });
            }
            let analytic_entry = analytic[[row, col]];
            if !relative_eq!(
                analytic_entry,
                numeric,
                epsilon = tolerance,
                max_relative = tolerance
            ) {
                return Err(JacobianCheckError::JacobianMismatch {
                    row,
                    col,
                    analytic: analytic_entry,
                    numeric,
                    difference: (analytic_entry - numeric).abs(),
                });
            }
        }
    }

    // leave the cached state on the unperturbed input
    chain
        .forward(input)
        .map_err(JacobianCheckError::ForwardPass)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{Affine, ElementwiseActivation, Layer, SumReduction};
    use ndarray::{array, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    fn random_affine(rng: &mut StdRng, in_dim: usize, out_dim: usize) -> Layer {
        let weight =
            Array2::from_shape_fn((out_dim, in_dim), |_| rng.sample::<f64, _>(StandardNormal));
        let bias = Array1::from_shape_fn(out_dim, |_| rng.sample::<f64, _>(StandardNormal));
        Layer::Affine(Affine::new(weight, bias).expect("consistent affine parameters"))
    }

    fn random_input(rng: &mut StdRng, dim: usize) -> Array1<f64> {
        Array1::from_shape_fn(dim, |_| rng.sample::<f64, _>(StandardNormal))
    }

    #[test]
    fn analytic_jacobian_matches_central_differences() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut chain = Chain::new(vec![
            random_affine(&mut rng, 3, 5),
            Layer::Activation(ElementwiseActivation::tanh(5)),
            random_affine(&mut rng, 5, 2),
            Layer::Activation(ElementwiseActivation::tanh(2)),
        ])
        .unwrap();
        let input = random_input(&mut rng, 3);
        check_jacobian(&mut chain, &input, 1e-6, 1e-6).unwrap();
    }

    #[test]
    fn scalar_valued_chain_checks_out() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut chain = Chain::new(vec![
            random_affine(&mut rng, 4, 3),
            Layer::Activation(ElementwiseActivation::sigmoid(3)),
            Layer::Sum(SumReduction::new(3)),
        ])
        .unwrap();
        let input = random_input(&mut rng, 4);
        check_jacobian(&mut chain, &input, 1e-6, 1e-6).unwrap();
    }

    #[test]
    fn check_restores_the_unperturbed_forward_state() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut chain = Chain::new(vec![
            random_affine(&mut rng, 2, 2),
            Layer::Activation(ElementwiseActivation::tanh(2)),
        ])
        .unwrap();
        let input = random_input(&mut rng, 2);

        let reference = chain.forward(&input).unwrap().to_owned();
        check_jacobian(&mut chain, &input, 1e-6, 1e-6).unwrap();
        let after = chain.output().expect("chain stays forwarded").to_owned();
        assert_eq!(after, reference);
    }

    #[test]
    fn a_wrong_registered_derivative_is_reported() {
        let mut chain = Chain::new(vec![Layer::Activation(ElementwiseActivation::new(
            2,
            |u| u.tanh(),
            |_| 0.25,
        ))])
        .unwrap();
        let err = check_jacobian(&mut chain, &array![0.1, -0.3], 1e-6, 1e-6).unwrap_err();
        assert!(matches!(err, JacobianCheckError::JacobianMismatch { .. }));
    }
}
