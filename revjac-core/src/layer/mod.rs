// src/layer/mod.rs
// The closed set of layer variants a chain can hold.

pub mod activation;
pub mod affine;
pub mod reduction;

// Re-export the concrete layer structs
pub use activation::ElementwiseActivation;
pub use affine::Affine;
pub use reduction::SumReduction;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// A single differentiable transformation in a chain.
///
/// The variant set is closed on purpose: a chain stores its layers in a plain
/// `Vec<Layer>`, the predecessor of layer `i` is layer `i - 1`, and no layer
/// ever holds a reference to another.
#[derive(Debug, Clone)]
pub enum Layer {
    /// `y = W·x + b`
    Affine(Affine),
    /// A scalar function applied componentwise.
    Activation(ElementwiseActivation),
    /// Sum of all components, vector to scalar.
    Sum(SumReduction),
}

impl Layer {
    /// Input dimension this layer expects.
    pub fn in_dim(&self) -> usize {
        match self {
            Layer::Affine(layer) => layer.in_dim(),
            Layer::Activation(layer) => layer.dim(),
            Layer::Sum(layer) => layer.dim(),
        }
    }

    /// Output dimension this layer produces.
    pub fn out_dim(&self) -> usize {
        match self {
            Layer::Affine(layer) => layer.out_dim(),
            Layer::Activation(layer) => layer.dim(),
            Layer::Sum(_) => 1,
        }
    }

    /// Evaluates the layer on `input`, writing the result into the
    /// preallocated `out` buffer and caching whatever the layer's own
    /// derivative needs.
    pub(crate) fn forward_into(&mut self, input: ArrayView1<f64>, out: &mut Array1<f64>) {
        match self {
            Layer::Affine(layer) => layer.forward_into(input, out),
            Layer::Activation(layer) => layer.forward_into(input, out),
            Layer::Sum(layer) => layer.forward_into(input, out),
        }
    }

    /// Writes this layer's local Jacobian into `jac`. Root case of the
    /// accumulation: with no predecessor, the local Jacobian is the
    /// accumulated Jacobian.
    pub(crate) fn local_jacobian_into(&self, jac: &mut Array2<f64>) {
        match self {
            Layer::Affine(layer) => layer.local_jacobian_into(jac),
            Layer::Activation(layer) => layer.local_jacobian_into(jac),
            Layer::Sum(layer) => layer.local_jacobian_into(jac),
        }
    }

    /// Left-multiplies the predecessor's accumulated Jacobian by this
    /// layer's local Jacobian, writing the product into `jac`.
    pub(crate) fn accumulate_jacobian_into(&self, upstream: ArrayView2<f64>, jac: &mut Array2<f64>) {
        match self {
            Layer::Affine(layer) => layer.accumulate_jacobian_into(upstream, jac),
            Layer::Activation(layer) => layer.accumulate_jacobian_into(upstream, jac),
            Layer::Sum(layer) => layer.accumulate_jacobian_into(upstream, jac),
        }
    }
}

impl From<Affine> for Layer {
    fn from(layer: Affine) -> Self {
        Layer::Affine(layer)
    }
}

impl From<ElementwiseActivation> for Layer {
    fn from(layer: ElementwiseActivation) -> Self {
        Layer::Activation(layer)
    }
}

impl From<SumReduction> for Layer {
    fn from(layer: SumReduction) -> Self {
        Layer::Sum(layer)
    }
}
