use thiserror::Error;

/// Custom error type for the RevJac crate.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum RevJacError {
    #[error("shape mismatch at chain position {index}: predecessor produces dimension {output}, layer expects dimension {input}")]
    ShapeMismatch {
        index: usize,
        output: usize,
        input: usize,
    },

    #[error("input dimension mismatch: chain expects {expected}, got {actual}")]
    InputDimMismatch { expected: usize, actual: usize },

    #[error("backward called before forward: no cached activation state to differentiate at")]
    InvalidState,

    #[error("affine parameters disagree: weight is {rows}x{cols} but bias has length {bias_len}")]
    ParameterMismatch {
        rows: usize,
        cols: usize,
        bias_len: usize,
    },

    #[error("replacement parameters are {actual_rows}x{actual_cols} but the layer was declared {rows}x{cols}")]
    ParameterShapeChange {
        rows: usize,
        cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    #[error("a chain requires at least one layer")]
    EmptyChain,
}
