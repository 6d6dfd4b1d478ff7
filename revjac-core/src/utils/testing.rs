use ndarray::{ArrayView1, ArrayView2};

/// Checks that two vectors agree elementwise within tolerance.
/// Panics with the offending index on a mismatch.
pub fn check_vector_near(actual: ArrayView1<f64>, expected: ArrayView1<f64>, tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "Length mismatch");

    for (index, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        if diff > tolerance {
            panic!(
                "Vector mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                index, a, e, diff, tolerance
            );
        }
    }
}

/// Checks that two matrices agree elementwise within tolerance.
/// Panics with the offending entry on a mismatch.
pub fn check_matrix_near(actual: ArrayView2<f64>, expected: ArrayView2<f64>, tolerance: f64) {
    assert_eq!(actual.dim(), expected.dim(), "Shape mismatch");

    for ((row, col), e) in expected.indexed_iter() {
        let a = actual[[row, col]];
        let diff = (a - e).abs();
        if diff > tolerance {
            panic!(
                "Matrix mismatch at ({}, {}): actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                row, col, a, e, diff, tolerance
            );
        }
    }
}
