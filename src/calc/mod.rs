mod session;

pub use self::session::*;

use crate::{error::Error, fraction::ParseFractionError, Fraction, Matrix};
use log::debug;
use num_traits::One;
use thiserror::Error;

/// An entry on the calculator's stack
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Number(Fraction),
    Matrix(Matrix)
}
impl From<Fraction> for Value {
    fn from(x: Fraction) -> Self {
        Value::Number(x)
    }
}
impl From<Matrix> for Value {
    fn from(matrix: Matrix) -> Self {
        Value::Matrix(matrix)
    }
}

/// Why a calculator operation was refused. The message is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("Too few entries on the stack for that operation.")]
    TooFew,
    #[error("Mismatched types.")]
    MismatchedTypes,
    #[error("Matrices have incompatible sizes.")]
    IncompatibleSizes,
    #[error("Incompatible matrix sizes.")]
    IncompatibleProduct,
    #[error("Division by a matrix is undefined.")]
    DivisionByMatrix,
    #[error("Division by zero is undefined.")]
    DivisionByZero,
    #[error("Exponents must be integers.")]
    NonIntegerExponent,
    #[error("Only numbers can be raised to a power.")]
    MatrixPower,
    #[error("Factorial is only defined for nonnegative integers.")]
    InvalidFactorial,
    #[error("Square roots of negative numbers are imaginary.")]
    NegativeRoot,
    #[error("No inverse for matrices has yet been implemented.")]
    MatrixInverse,
    #[error("Zero has no reciprocal.")]
    ZeroReciprocal,
    #[error("Transpose is only defined for matrices.")]
    TransposeNumber,
    #[error("Determinants can only be found for square matrices.")]
    NotSquare,
    #[error("Need a matrix on the stack for that operation.")]
    NeedMatrix,
    #[error("No such row.")]
    NoSuchRow,
    #[error("The result is not a number.")]
    NotANumber,

    #[error(transparent)]
    Parse(#[from] ParseFractionError),
    #[error(transparent)]
    Math(#[from] Error)
}

/// Refuse the values that only mark a failure
fn check(value: Value) -> Result<Value, CalcError> {
    match &value {
        Value::Number(x) if x.is_nan() => Err(CalcError::NotANumber),
        Value::Matrix(matrix) if matrix.is_empty() => Err(Error::EmptyMatrix.into()),
        Value::Matrix(matrix) if matrix.has_nan() => Err(CalcError::NotANumber),
        _ => Ok(value)
    }
}

/// Number of elements in a rows x cols matrix, refusing sizes that can't be
/// counted
fn matrix_size(rows: usize, cols: usize) -> Result<usize, CalcError> {
    if rows == 0 || cols == 0 {
        return Err(Error::EmptyMatrix.into());
    }
    Ok(rows.checked_mul(cols).ok_or(Error::Overflow)?)
}

/// Raise a number to an integer power by squaring, failing on overflow
fn power(base: Fraction, exp: Fraction) -> Result<Fraction, CalcError> {
    let exp = exp.to_i64().ok_or(Error::Overflow)?;
    let mut base = if exp < 0 {
        base.try_reciprocal().map_err(|_| CalcError::ZeroReciprocal)?
    } else {
        base
    };
    let mut exp = exp.unsigned_abs();
    let mut result = Fraction::one();
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.try_mul(base)?;
        }
        exp >>= 1;
        if exp > 0 {
            base = base.try_mul(base)?;
        }
    }
    Ok(result)
}

/// n! in wrapping arithmetic
fn factorial(n: u64) -> u64 {
    // 66! and up have 64 factors of two, so they wrap to 0
    if n >= 66 {
        return 0;
    }
    (2..=n).fold(1u64, |product, i| product.wrapping_mul(i))
}

/// An RPN calculator: values are pushed on a stack and operations replace
/// the top entries with their result. A failed operation leaves the stack
/// exactly as it was.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Calculator {
    stack: Vec<Value>
}
impl Calculator {
    /// Create a calculator with an empty stack
    pub fn new() -> Self {
        Self::default()
    }
    /// The stack, bottom first
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }
    /// Number of entries on the stack
    pub fn len(&self) -> usize {
        self.stack.len()
    }
    /// Returns true if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
    /// The entry on top of the stack
    pub fn top(&self) -> Option<&Value> {
        self.stack.last()
    }
    /// The matrix on top of the stack, if there is one
    pub fn top_matrix(&self) -> Option<&Matrix> {
        match self.stack.last() {
            Some(Value::Matrix(matrix)) => Some(matrix),
            _ => None
        }
    }

    /// Push a value. NaN and the empty matrix are refused.
    pub fn push<V: Into<Value>>(&mut self, value: V) -> Result<(), CalcError> {
        let value = check(value.into())?;
        self.stack.push(value);
        Ok(())
    }
    /// Remove and return the top entry
    pub fn pop(&mut self) -> Result<Value, CalcError> {
        self.stack.pop().ok_or(CalcError::TooFew)
    }
    /// Swap the top two entries. Does nothing with fewer than two.
    pub fn swap(&mut self) {
        let len = self.stack.len();
        if len >= 2 {
            self.stack.swap(len - 1, len - 2);
        }
    }
    /// Push a copy of the top entry. Does nothing on an empty stack.
    pub fn duplicate(&mut self) {
        if let Some(top) = self.stack.last().cloned() {
            self.stack.push(top);
        }
    }
    /// Remove every entry
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Replace the top two entries with op(second, top)
    fn binary<F>(&mut self, op: F) -> Result<(), CalcError>
        where F: FnOnce(&Value, &Value) -> Result<Value, CalcError>
    {
        let result = match self.stack.as_slice() {
            [.., second, top] => check(op(second, top)?)?,
            _ => return Err(CalcError::TooFew)
        };
        self.stack.truncate(self.stack.len() - 2);
        self.stack.push(result);
        Ok(())
    }
    /// Replace the top entry with op(top)
    fn unary<F>(&mut self, op: F) -> Result<(), CalcError>
        where F: FnOnce(&Value) -> Result<Value, CalcError>
    {
        let result = match self.stack.last() {
            Some(top) => check(op(top)?)?,
            None => return Err(CalcError::TooFew)
        };
        self.stack.pop();
        self.stack.push(result);
        Ok(())
    }

    /// Second plus top: two numbers, or two matrices of the same size
    pub fn add(&mut self) -> Result<(), CalcError> {
        self.binary(|second, top| match (second, top) {
            (Value::Number(x), Value::Number(y)) => Ok(Value::Number(x.try_add(*y)?)),
            (Value::Matrix(a), Value::Matrix(b)) => a.try_add(b)
                .map(Value::Matrix)
                .map_err(|_| CalcError::IncompatibleSizes),
            _ => Err(CalcError::MismatchedTypes)
        })
    }
    /// Second minus top: two numbers, or two matrices of the same size
    pub fn subtract(&mut self) -> Result<(), CalcError> {
        self.binary(|second, top| match (second, top) {
            (Value::Number(x), Value::Number(y)) => Ok(Value::Number(x.try_sub(*y)?)),
            (Value::Matrix(a), Value::Matrix(b)) => a.try_sub(b)
                .map(Value::Matrix)
                .map_err(|_| CalcError::IncompatibleSizes),
            _ => Err(CalcError::MismatchedTypes)
        })
    }
    /// Second times top. A number and a matrix in either order scales the
    /// matrix, two matrices give the matrix product with second on the left.
    pub fn multiply(&mut self) -> Result<(), CalcError> {
        self.binary(|second, top| match (second, top) {
            (Value::Number(x), Value::Number(y)) => Ok(Value::Number(x.try_mul(*y)?)),
            (Value::Matrix(matrix), Value::Number(factor))
            | (Value::Number(factor), Value::Matrix(matrix)) => Ok(Value::Matrix(matrix * *factor)),
            (Value::Matrix(a), Value::Matrix(b)) => a.try_mul(b)
                .map(Value::Matrix)
                .map_err(|_| CalcError::IncompatibleProduct)
        })
    }
    /// Second divided by top. The divisor must be a nonzero number.
    pub fn divide(&mut self) -> Result<(), CalcError> {
        self.binary(|second, top| {
            let divisor = match top {
                Value::Number(divisor) if divisor.is_zero() => return Err(CalcError::DivisionByZero),
                Value::Number(divisor) => *divisor,
                Value::Matrix(_) => return Err(CalcError::DivisionByMatrix)
            };
            match second {
                Value::Number(x) => Ok(Value::Number(x.try_div(divisor)?)),
                Value::Matrix(matrix) => Ok(Value::Matrix(matrix * divisor.reciprocal()))
            }
        })
    }
    /// Second raised to the power of top, which must be an integer
    pub fn power(&mut self) -> Result<(), CalcError> {
        self.binary(|second, top| {
            let exp = match top {
                Value::Number(exp) if exp.is_integer() => *exp,
                _ => return Err(CalcError::NonIntegerExponent)
            };
            match second {
                Value::Number(base) => Ok(Value::Number(power(*base, exp)?)),
                Value::Matrix(_) => Err(CalcError::MatrixPower)
            }
        })
    }

    /// Factorial of a nonnegative integer
    pub fn factorial(&mut self) -> Result<(), CalcError> {
        self.unary(|top| match top {
            Value::Number(n) if n.is_integer() && !n.is_negative() => {
                Ok(Value::Number(Fraction::from(factorial(n.numerator()))))
            },
            _ => Err(CalcError::InvalidFactorial)
        })
    }
    /// Negate the top entry
    pub fn change_sign(&mut self) -> Result<(), CalcError> {
        self.unary(|top| Ok(match top {
            Value::Number(x) => Value::Number(-*x),
            Value::Matrix(matrix) => Value::Matrix(-matrix.clone())
        }))
    }
    /// For a number, replace it with its absolute value. For a square matrix,
    /// push its determinant on top of it.
    pub fn absolute_or_determinant(&mut self) -> Result<(), CalcError> {
        let det = match self.stack.last() {
            Some(Value::Matrix(matrix)) => matrix.try_determinant().map_err(|err| match err {
                Error::NotSquare { .. } => CalcError::NotSquare,
                err => CalcError::Math(err)
            })?,
            _ => return self.unary(|top| match top {
                Value::Number(x) => Ok(Value::Number(x.abs())),
                Value::Matrix(_) => Err(CalcError::MismatchedTypes)
            })
        };
        debug!("determinant is {}", det);
        self.push(det)
    }
    /// For a number, take the (approximate) square root. For a matrix, reduce
    /// it to reduced row echelon form.
    pub fn root(&mut self) -> Result<(), CalcError> {
        self.unary(|top| match top {
            Value::Number(x) if x.is_negative() => Err(CalcError::NegativeRoot),
            Value::Number(x) => Ok(Value::Number(x.sqrt())),
            Value::Matrix(matrix) => {
                let mut matrix = matrix.clone();
                matrix.reduce();
                Ok(Value::Matrix(matrix))
            }
        })
    }
    /// Replace a number with its reciprocal
    pub fn inverse(&mut self) -> Result<(), CalcError> {
        self.unary(|top| match top {
            Value::Number(x) => x.try_reciprocal()
                .map(Value::Number)
                .map_err(|_| CalcError::ZeroReciprocal),
            Value::Matrix(_) => Err(CalcError::MatrixInverse)
        })
    }
    /// Replace a matrix with its transpose
    pub fn transpose(&mut self) -> Result<(), CalcError> {
        self.unary(|top| match top {
            Value::Matrix(matrix) => Ok(Value::Matrix(matrix.transpose())),
            Value::Number(_) => Err(CalcError::TransposeNumber)
        })
    }

    /// Push a new matrix. The entries fill it row by row, and any entries
    /// left out stay zero.
    pub fn new_matrix<I>(&mut self, rows: usize, cols: usize, entries: I) -> Result<(), CalcError>
        where I: IntoIterator<Item = Fraction>
    {
        let size = matrix_size(rows, cols)?;
        let mut matrix = Matrix::new(rows, cols);
        for (i, entry) in entries.into_iter().take(size).enumerate() {
            matrix.set(i / cols, i % cols, entry);
        }
        self.push(matrix)
    }
    /// Push the identity matrix of a size
    pub fn identity(&mut self, size: usize) -> Result<(), CalcError> {
        matrix_size(size, size)?;
        self.push(Matrix::identity(size))
    }

    fn top_matrix_mut(&mut self) -> Result<&mut Matrix, CalcError> {
        match self.stack.last_mut() {
            Some(Value::Matrix(matrix)) => Ok(matrix),
            _ => Err(CalcError::NeedMatrix)
        }
    }
    /// Swap two rows of the matrix on top. Rows are counted from 1.
    pub fn switch_rows(&mut self, row1: usize, row2: usize) -> Result<(), CalcError> {
        let matrix = self.top_matrix_mut()?;
        let (row1, row2) = (row_index(matrix, row1)?, row_index(matrix, row2)?);
        matrix.switch_rows(row1, row2);
        Ok(())
    }
    /// Multiply a row of the matrix on top by a nonzero factor. Rows are
    /// counted from 1.
    pub fn multiply_row(&mut self, row: usize, factor: Fraction) -> Result<(), CalcError> {
        let matrix = self.top_matrix_mut()?;
        let row = row_index(matrix, row)?;
        if factor.is_zero() {
            return Err(Error::DegenerateRowOp.into());
        }
        matrix.multiply_row(row, factor);
        Ok(())
    }
    /// Add a multiple of one row of the matrix on top to another row. Rows
    /// are counted from 1.
    pub fn add_row(&mut self, src: usize, factor: Fraction, dst: usize) -> Result<(), CalcError> {
        let matrix = self.top_matrix_mut()?;
        let (src, dst) = (row_index(matrix, src)?, row_index(matrix, dst)?);
        if src == dst {
            return Err(Error::DegenerateRowOp.into());
        }
        matrix.add_row(src, factor, dst);
        Ok(())
    }
    /// Reduce the matrix on top to reduced row echelon form
    pub fn reduce(&mut self) -> Result<(), CalcError> {
        self.top_matrix_mut()?.reduce();
        Ok(())
    }
}

fn row_index(matrix: &Matrix, row: usize) -> Result<usize, CalcError> {
    if row == 0 || row > matrix.rows() {
        return Err(CalcError::NoSuchRow);
    }
    Ok(row - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn frac(numerator: i64, denominator: i64) -> Fraction {
        Fraction::new(numerator, denominator)
    }
    fn calc(values: Vec<Value>) -> Calculator {
        let mut calc = Calculator::new();
        for value in values {
            calc.push(value).unwrap();
        }
        calc
    }
    fn num(n: i64) -> Value {
        Value::Number(Fraction::from(n))
    }
    fn mat(rows: &[[i64; 2]]) -> Value {
        Value::Matrix(Matrix::from_rows(rows))
    }
    /// Run an operation that must fail, and check that the stack survived
    fn refused<F>(values: Vec<Value>, op: F) -> CalcError
        where F: FnOnce(&mut Calculator) -> Result<(), CalcError>
    {
        let mut calc = calc(values);
        let before = calc.clone();
        let err = op(&mut calc).unwrap_err();
        assert_eq!(calc, before, "stack changed by failed operation: {}", err);
        err
    }

    #[test]
    fn stack_operations() {
        let mut calc = calc(vec![num(1), num(2), num(3)]);
        calc.swap();
        assert_eq!(calc.stack(), &[num(1), num(3), num(2)]);
        calc.duplicate();
        assert_eq!(calc.len(), 4);
        assert_eq!(calc.pop(), Ok(num(2)));
        assert_eq!(calc.top(), Some(&num(2)));
        calc.clear();
        assert!(calc.is_empty());
        calc.swap();
        calc.duplicate();
        assert!(calc.is_empty());
        assert_eq!(calc.pop(), Err(CalcError::TooFew));
    }
    #[test]
    fn push_refuses_sentinels() {
        let mut calc = Calculator::new();
        assert_eq!(calc.push(Fraction::NAN), Err(CalcError::NotANumber));
        assert_eq!(calc.push(Matrix::empty()), Err(CalcError::Math(Error::EmptyMatrix)));
        assert!(calc.is_empty());
    }
    #[test]
    fn arithmetic() {
        let mut calc = calc(vec![
            Value::Number(frac(1, 3)),
            Value::Number(frac(1, 6))
        ]);
        calc.add().unwrap();
        assert_eq!(calc.stack(), &[Value::Number(frac(1, 2))]);

        let mut calc = self::calc(vec![num(5), num(7)]);
        calc.subtract().unwrap();
        assert_eq!(calc.stack(), &[num(-2)]);
        calc.push(Value::Number(frac(-1, 4))).unwrap();
        calc.multiply().unwrap();
        assert_eq!(calc.stack(), &[Value::Number(frac(1, 2))]);
        calc.push(num(3)).unwrap();
        calc.divide().unwrap();
        assert_eq!(calc.stack(), &[Value::Number(frac(1, 6))]);
    }
    #[test]
    fn matrix_arithmetic() {
        let mut calc = calc(vec![mat(&[[1, 2], [3, 4]]), mat(&[[1, 1], [1, 1]])]);
        calc.add().unwrap();
        assert_eq!(calc.stack(), &[mat(&[[2, 3], [4, 5]])]);

        let mut calc = self::calc(vec![mat(&[[1, 2], [3, 4]]), mat(&[[0, 1], [1, 0]])]);
        calc.multiply().unwrap();
        assert_eq!(calc.stack(), &[mat(&[[2, 1], [4, 3]])]);

        let mut calc = self::calc(vec![num(2), mat(&[[1, 2], [3, 4]])]);
        calc.multiply().unwrap();
        assert_eq!(calc.stack(), &[mat(&[[2, 4], [6, 8]])]);
        calc.push(num(-2)).unwrap();
        calc.multiply().unwrap();
        assert_eq!(calc.stack(), &[mat(&[[-4, -8], [-12, -16]])]);
        calc.push(num(4)).unwrap();
        calc.divide().unwrap();
        assert_eq!(calc.stack(), &[mat(&[[-1, -2], [-3, -4]])]);
    }
    #[test]
    fn refuses_nan_cells() {
        let tiny = || Value::Number(frac(1, 1 << 32));
        let cell = || Value::Matrix(Matrix::from_rows(&[[frac(1, 1 << 32)]]));
        assert_eq!(refused(vec![cell(), tiny()], Calculator::multiply), CalcError::NotANumber);
        assert_eq!(refused(vec![tiny(), cell()], Calculator::multiply), CalcError::NotANumber);
        assert_eq!(refused(vec![cell(), cell()], Calculator::multiply), CalcError::NotANumber);
        assert_eq!(refused(vec![cell(), num(1 << 32)], Calculator::divide), CalcError::NotANumber);

        let mut calc = Calculator::new();
        let mut matrix = Matrix::identity(2);
        matrix.set(0, 1, Fraction::NAN);
        assert_eq!(calc.push(matrix), Err(CalcError::NotANumber));
        assert!(calc.is_empty());
    }
    #[test]
    fn binary_errors() {
        assert_eq!(refused(vec![num(1)], Calculator::add), CalcError::TooFew);
        assert_eq!(refused(vec![num(1), mat(&[[1, 2], [3, 4]])], Calculator::add), CalcError::MismatchedTypes);
        assert_eq!(refused(vec![mat(&[[1, 2], [3, 4]]), num(1)], Calculator::subtract), CalcError::MismatchedTypes);
        assert_eq!(
            refused(vec![mat(&[[1, 2], [3, 4]]), Value::Matrix(Matrix::identity(3))], Calculator::add),
            CalcError::IncompatibleSizes
        );
        assert_eq!(
            refused(vec![mat(&[[1, 2], [3, 4]]), Value::Matrix(Matrix::identity(3))], Calculator::multiply),
            CalcError::IncompatibleProduct
        );
        assert_eq!(refused(vec![num(1), num(0)], Calculator::divide), CalcError::DivisionByZero);
        assert_eq!(refused(vec![mat(&[[1, 2], [3, 4]]), num(0)], Calculator::divide), CalcError::DivisionByZero);
        assert_eq!(refused(vec![num(1), mat(&[[1, 2], [3, 4]])], Calculator::divide), CalcError::DivisionByMatrix);
        assert_eq!(
            refused(vec![num(2), Value::Number(frac(1, 2))], Calculator::power),
            CalcError::NonIntegerExponent
        );
        assert_eq!(refused(vec![mat(&[[1, 2], [3, 4]]), num(2)], Calculator::power), CalcError::MatrixPower);
        assert_eq!(
            refused(vec![num(std::i64::MAX), num(std::i64::MAX), num(std::i64::MAX)], |calc| {
                calc.multiply()?;
                calc.multiply()
            }),
            CalcError::Math(Error::Overflow)
        );
    }
    #[test]
    fn powers() {
        let raise = |base: Fraction, exp: i64| {
            let mut calc = calc(vec![Value::Number(base), num(exp)]);
            calc.power().map(|()| calc.stack()[0].clone())
        };
        assert_eq!(raise(Fraction::from(2), 10), Ok(num(1024)));
        assert_eq!(raise(frac(-2, 3), 3), Ok(Value::Number(frac(-8, 27))));
        assert_eq!(raise(Fraction::from(2), -2), Ok(Value::Number(frac(1, 4))));
        assert_eq!(raise(Fraction::from(7), 0), Ok(num(1)));
        assert_eq!(raise(Fraction::from(0), 0), Ok(num(1)));
        assert_eq!(raise(Fraction::from(1), std::i64::MAX), Ok(num(1)));
        assert_eq!(raise(Fraction::from(-1), std::i64::MAX), Ok(num(-1)));
        assert_eq!(raise(Fraction::from(0), -1), Err(CalcError::ZeroReciprocal));
        assert_eq!(raise(Fraction::from(2), 64), Err(CalcError::Math(Error::Overflow)));
    }
    #[test]
    fn factorials() {
        let mut calc = calc(vec![num(5)]);
        calc.factorial().unwrap();
        assert_eq!(calc.stack(), &[num(120)]);
        calc.push(num(0)).unwrap();
        calc.factorial().unwrap();
        assert_eq!(calc.top(), Some(&num(1)));
        assert_eq!(factorial(20), 2432902008176640000);
        assert_eq!(factorial(21), 2432902008176640000u64.wrapping_mul(21));
        assert_eq!(factorial(65), (2..=65).fold(1u64, |product, i| product.wrapping_mul(i)));
        assert_eq!(factorial(1000), 0);

        assert_eq!(refused(vec![num(-3)], Calculator::factorial), CalcError::InvalidFactorial);
        assert_eq!(refused(vec![Value::Number(frac(1, 2))], Calculator::factorial), CalcError::InvalidFactorial);
        assert_eq!(refused(vec![mat(&[[1, 2], [3, 4]])], Calculator::factorial), CalcError::InvalidFactorial);
        assert_eq!(refused(vec![], Calculator::factorial), CalcError::TooFew);
    }
    #[test]
    fn unary() {
        let mut calc = calc(vec![Value::Number(frac(-9, 4))]);
        calc.change_sign().unwrap();
        assert_eq!(calc.top(), Some(&Value::Number(frac(9, 4))));
        calc.root().unwrap();
        assert_eq!(calc.top(), Some(&Value::Number(frac(3, 2))));
        calc.inverse().unwrap();
        assert_eq!(calc.top(), Some(&Value::Number(frac(2, 3))));
        calc.change_sign().unwrap();
        calc.absolute_or_determinant().unwrap();
        assert_eq!(calc.stack(), &[Value::Number(frac(2, 3))]);

        let mut calc = self::calc(vec![mat(&[[1, -2], [3, 0]])]);
        calc.change_sign().unwrap();
        assert_eq!(calc.stack(), &[mat(&[[-1, 2], [-3, 0]])]);
        calc.transpose().unwrap();
        assert_eq!(calc.stack(), &[mat(&[[-1, -3], [2, 0]])]);
    }
    #[test]
    fn unary_errors() {
        assert_eq!(refused(vec![num(-4)], Calculator::root), CalcError::NegativeRoot);
        assert_eq!(refused(vec![num(0)], Calculator::inverse), CalcError::ZeroReciprocal);
        assert_eq!(refused(vec![mat(&[[1, 2], [3, 4]])], Calculator::inverse), CalcError::MatrixInverse);
        assert_eq!(refused(vec![num(3)], Calculator::transpose), CalcError::TransposeNumber);
        assert_eq!(refused(vec![], Calculator::change_sign), CalcError::TooFew);
        assert_eq!(refused(vec![], Calculator::absolute_or_determinant), CalcError::TooFew);
        assert_eq!(
            refused(vec![Value::Matrix(Matrix::new(2, 3))], Calculator::absolute_or_determinant),
            CalcError::NotSquare
        );
    }
    #[test]
    fn determinant_keeps_matrix() {
        let mut calc = calc(vec![mat(&[[1, 2], [3, 4]])]);
        calc.absolute_or_determinant().unwrap();
        assert_eq!(calc.stack(), &[mat(&[[1, 2], [3, 4]]), num(-2)]);
    }
    #[test]
    fn root_reduces_matrix() {
        let mut calc = calc(vec![mat(&[[2, 4], [1, 2]])]);
        calc.root().unwrap();
        assert_eq!(calc.stack(), &[mat(&[[1, 2], [0, 0]])]);
    }
    #[test]
    fn matrix_mode() {
        let mut calc = Calculator::new();
        calc.new_matrix(2, 2, vec![1, 2, 3, 4].into_iter().map(Fraction::from)).unwrap();
        assert_eq!(calc.top_matrix(), Some(&Matrix::from_rows(&[[1, 2], [3, 4]])));
        calc.switch_rows(1, 2).unwrap();
        assert_eq!(calc.stack(), &[mat(&[[3, 4], [1, 2]])]);
        calc.multiply_row(2, Fraction::from(3)).unwrap();
        assert_eq!(calc.stack(), &[mat(&[[3, 4], [3, 6]])]);
        calc.add_row(1, Fraction::from(-1), 2).unwrap();
        assert_eq!(calc.stack(), &[mat(&[[3, 4], [0, 2]])]);
        calc.reduce().unwrap();
        assert_eq!(calc.stack(), &[mat(&[[1, 0], [0, 1]])]);

        calc.identity(3).unwrap();
        assert_eq!(calc.top_matrix(), Some(&Matrix::identity(3)));

        calc.new_matrix(1, 3, vec![Fraction::from(5)]).unwrap();
        assert_eq!(calc.top_matrix(), Some(&Matrix::from_rows(&[[5, 0, 0]])));
    }
    #[test]
    fn matrix_mode_errors() {
        let square = || mat(&[[1, 2], [3, 4]]);
        assert_eq!(refused(vec![square()], |calc| calc.switch_rows(0, 1)), CalcError::NoSuchRow);
        assert_eq!(refused(vec![square()], |calc| calc.switch_rows(1, 3)), CalcError::NoSuchRow);
        assert_eq!(refused(vec![square()], |calc| calc.multiply_row(3, Fraction::from(2))), CalcError::NoSuchRow);
        assert_eq!(
            refused(vec![square()], |calc| calc.multiply_row(1, Fraction::zero())),
            CalcError::Math(Error::DegenerateRowOp)
        );
        assert_eq!(
            refused(vec![square()], |calc| calc.add_row(1, Fraction::one(), 1)),
            CalcError::Math(Error::DegenerateRowOp)
        );
        assert_eq!(refused(vec![num(1)], Calculator::reduce), CalcError::NeedMatrix);
        assert_eq!(refused(vec![], |calc| calc.switch_rows(1, 2)), CalcError::NeedMatrix);
        assert_eq!(
            refused(vec![], |calc| calc.new_matrix(0, 3, Vec::new())),
            CalcError::Math(Error::EmptyMatrix)
        );
        assert_eq!(refused(vec![], |calc| calc.identity(0)), CalcError::Math(Error::EmptyMatrix));
        assert_eq!(
            refused(vec![], |calc| calc.new_matrix(std::usize::MAX, 2, Vec::new())),
            CalcError::Math(Error::Overflow)
        );
        assert_eq!(refused(vec![], |calc| calc.identity(std::usize::MAX)), CalcError::Math(Error::Overflow));
    }
    #[test]
    fn messages() {
        assert_eq!(CalcError::TooFew.to_string(), "Too few entries on the stack for that operation.");
        assert_eq!(CalcError::Math(Error::Overflow).to_string(), "integer overflow");
    }
}
