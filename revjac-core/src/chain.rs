use crate::error::RevJacError;
use crate::layer::Layer;
use log::{debug, trace};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

// Run state of a chain. Backward is only defined once at least one forward
// has completed since construction or the last parameter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainState {
    Uninitialized,
    Forwarded,
}

/// An ordered, strictly linear sequence of layers with a single
/// forward/backward pair over the whole chain.
///
/// The chain owns its layers outright, so the predecessor of layer `i` is
/// simply layer `i - 1` and no layer ever references another. Adjacent
/// dimensions are validated once at construction; every output and Jacobian
/// buffer is allocated there too, and `forward`/`backward` never allocate.
///
/// A chain is not internally synchronized: calls on one instance must be
/// sequenced by the caller. NaN and infinity are not detected or
/// special-cased anywhere; they propagate through forward and backward like
/// any other floating-point value.
#[derive(Debug)]
pub struct Chain {
    layers: Vec<Layer>,
    // one output buffer per layer
    outputs: Vec<Array1<f64>>,
    // accumulated Jacobians, layer output dim x root input dim
    jacobians: Vec<Array2<f64>>,
    state: ChainState,
}

impl Chain {
    /// Builds a chain from an ordered layer list.
    ///
    /// Walks the list and checks that every layer's output dimension equals
    /// its successor's input dimension, then allocates the per-layer output
    /// and Jacobian buffers. After construction, shapes are fixed and no
    /// further validation or allocation happens.
    ///
    /// # Errors
    /// `EmptyChain` for a zero-layer list; `ShapeMismatch` naming the first
    /// position whose input dimension disagrees with its predecessor's
    /// output dimension.
    pub fn new(layers: Vec<Layer>) -> Result<Self, RevJacError> {
        if layers.is_empty() {
            return Err(RevJacError::EmptyChain);
        }
        for (position, pair) in layers.windows(2).enumerate() {
            let (output, input) = (pair[0].out_dim(), pair[1].in_dim());
            if output != input {
                return Err(RevJacError::ShapeMismatch {
                    index: position + 1,
                    output,
                    input,
                });
            }
        }

        let root_dim = layers[0].in_dim();
        let outputs: Vec<Array1<f64>> = layers
            .iter()
            .map(|layer| Array1::zeros(layer.out_dim()))
            .collect();
        let jacobians: Vec<Array2<f64>> = layers
            .iter()
            .map(|layer| Array2::zeros((layer.out_dim(), root_dim)))
            .collect();

        debug!(
            "chain validated: {} layers, input dim {} -> output dim {}",
            layers.len(),
            root_dim,
            layers[layers.len() - 1].out_dim()
        );
        Ok(Chain {
            layers,
            outputs,
            jacobians,
            state: ChainState::Uninitialized,
        })
    }

    /// Number of layers in the chain.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Input dimension of the root layer.
    pub fn in_dim(&self) -> usize {
        self.layers[0].in_dim()
    }

    /// Output dimension of the leaf layer.
    pub fn out_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].out_dim()
    }

    /// Borrows the layer at `index`.
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Mutably borrows the layer at `index`, e.g. to replace affine weights
    /// between uses.
    ///
    /// Any mutable access may change parameters, so the chain drops back to
    /// its unforwarded state: cached activations from before the access no
    /// longer describe the layer, and a new forward call is required before
    /// the next backward.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        if index < self.layers.len() {
            debug!("layer {} borrowed mutably; cached activation state invalidated", index);
            self.state = ChainState::Uninitialized;
        }
        self.layers.get_mut(index)
    }

    /// The leaf output of the most recent forward call, if any.
    pub fn output(&self) -> Option<ArrayView1<f64>> {
        match self.state {
            ChainState::Forwarded => Some(self.outputs[self.layers.len() - 1].view()),
            ChainState::Uninitialized => None,
        }
    }

    /// Pushes `input` through every layer in order, caching the state each
    /// layer's derivative needs. Each call overwrites the previous cached
    /// state: backward always reflects the most recent forward.
    ///
    /// # Arguments
    /// * `input`: the chain input; its length must equal [`Chain::in_dim`].
    ///
    /// # Returns
    /// A view of the leaf layer's output. The view borrows the chain's
    /// internal buffer; call `.to_owned()` to keep it across later calls.
    ///
    /// # Errors
    /// `InputDimMismatch` if the input length disagrees with the root
    /// layer's input dimension.
    pub fn forward(&mut self, input: &Array1<f64>) -> Result<ArrayView1<f64>, RevJacError> {
        if input.len() != self.in_dim() {
            return Err(RevJacError::InputDimMismatch {
                expected: self.in_dim(),
                actual: input.len(),
            });
        }
        trace!("forward pass over {} layers", self.layers.len());

        self.layers[0].forward_into(input.view(), &mut self.outputs[0]);
        for i in 1..self.layers.len() {
            let (done, rest) = self.outputs.split_at_mut(i);
            self.layers[i].forward_into(done[i - 1].view(), &mut rest[0]);
        }

        self.state = ChainState::Forwarded;
        Ok(self.outputs[self.layers.len() - 1].view())
    }

    /// Accumulates the Jacobian of the chain's output with respect to the
    /// most recently forwarded input.
    ///
    /// The root layer contributes its local Jacobian directly (the
    /// derivative of the input with respect to itself is the identity);
    /// every later layer left-multiplies the running product by its own
    /// local Jacobian, which is exactly the chain rule. The returned matrix
    /// has one row per output component and one column per root input
    /// component.
    ///
    /// # Errors
    /// `InvalidState` if no forward call has completed since construction or
    /// the last mutable layer access.
    pub fn backward(&mut self) -> Result<ArrayView2<f64>, RevJacError> {
        if self.state != ChainState::Forwarded {
            return Err(RevJacError::InvalidState);
        }
        trace!(
            "backward pass: accumulating a {}x{} Jacobian",
            self.out_dim(),
            self.in_dim()
        );

        self.layers[0].local_jacobian_into(&mut self.jacobians[0]);
        for i in 1..self.layers.len() {
            let (done, rest) = self.jacobians.split_at_mut(i);
            self.layers[i].accumulate_jacobian_into(done[i - 1].view(), &mut rest[0]);
        }

        Ok(self.jacobians[self.layers.len() - 1].view())
    }
}
