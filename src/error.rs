use thiserror::Error;

/// Failures reported by the `try_*` forms of the matrix and fraction
/// operations. The operator forms report the same failures through sentinel
/// values instead (`Fraction::NAN`, `Matrix::empty()`).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("cannot {op} a {}x{} matrix and a {}x{} matrix", left.0, left.1, right.0, right.1)]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize)
    },

    #[error("a {rows}x{cols} matrix is not square")]
    NotSquare {
        rows: usize,
        cols: usize
    },

    #[error("the matrix is empty")]
    EmptyMatrix,

    #[error("division by zero")]
    DivisionByZero,

    #[error("zero has no reciprocal")]
    ReciprocalOfZero,

    #[error("degenerate row operation")]
    DegenerateRowOp,

    #[error("integer overflow")]
    Overflow
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
