//! # A Small Feedforward Network, End to End
//!
//! Demonstrates the basic workflow of the crate:
//! 1. **Building a chain**: two affine layers interleaved with `tanh`
//!    activations (a classic 4 -> 64 -> 2 feedforward shape).
//! 2. **Randomized weights**: parameters drawn from a scaled standard
//!    normal distribution (initialization policy is up to the caller).
//! 3. **Forward pass**: evaluate the network on a sampled input.
//! 4. **Backward pass**: read the exact 2x4 Jacobian of the output with
//!    respect to the input.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use revjac_core::{Affine, Chain, ElementwiseActivation, RevJacError};

const IN_DIM: usize = 4;
const HIDDEN_DIM: usize = 64;
const OUT_DIM: usize = 2;

fn random_affine(rng: &mut StdRng, in_dim: usize, out_dim: usize) -> Result<Affine, RevJacError> {
    let scale = 1.0 / (in_dim as f64).sqrt();
    let weight = Array2::from_shape_fn((out_dim, in_dim), |_| {
        scale * rng.sample::<f64, _>(StandardNormal)
    });
    let bias = Array1::zeros(out_dim);
    Affine::new(weight, bias)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(7);

    let mut network = Chain::new(vec![
        random_affine(&mut rng, IN_DIM, HIDDEN_DIM)?.into(),
        ElementwiseActivation::tanh(HIDDEN_DIM).into(),
        random_affine(&mut rng, HIDDEN_DIM, OUT_DIM)?.into(),
        ElementwiseActivation::tanh(OUT_DIM).into(),
    ])?;

    let input = Array1::from_shape_fn(IN_DIM, |_| rng.sample::<f64, _>(StandardNormal));
    println!("input:  {}", input);

    let output = network.forward(&input)?.to_owned();
    println!("output: {}", output);

    let jacobian = network.backward()?;
    println!(
        "jacobian of output w.r.t. input ({}x{}):\n{}",
        jacobian.nrows(),
        jacobian.ncols(),
        jacobian
    );

    Ok(())
}
