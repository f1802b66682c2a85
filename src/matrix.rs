use crate::{
    error::{Error, Result},
    Fraction
};
use log::{debug, trace};
use num_traits::{One, Zero};
use smallvec::SmallVec;
use std::{
    fmt,
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign}
};

/// A matrix is a 2D array of fractions. It has special rules for what happens
/// when you add, subtract and multiply it.
///
/// Every row is owned by the matrix and cloning copies all of them. A matrix
/// with no rows and no columns is what failed operations return in place of
/// a result, see `Matrix::empty`.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Matrix {
    inner: Vec<Vec<Fraction>>,
    rows: usize,
    cols: usize
}
impl Matrix {
    /// Return the empty 0x0 matrix
    pub fn empty() -> Self {
        Self::default()
    }
    /// Create a new matrix of the specified size filled with zeroes
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            inner: vec![vec![Fraction::zero(); cols]; rows],
            rows,
            cols
        }
    }
    /// Create a column vector (a matrix with one column) filled with zeroes
    pub fn vector(len: usize) -> Self {
        Self::new(len, 1)
    }
    /// Create a matrix from its rows. Returns the empty matrix if the rows
    /// don't all have the same length.
    pub fn from_rows<I, R, T>(rows: I) -> Self
        where
            I: IntoIterator<Item = R>,
            R: IntoIterator<Item = T>,
            T: Into<Fraction>
    {
        let inner: Vec<Vec<Fraction>> = rows.into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let cols = inner.first().map_or(0, Vec::len);
        if inner.iter().any(|row| row.len() != cols) {
            debug!("ragged rows given to Matrix::from_rows");
            return Self::empty();
        }
        Self {
            rows: inner.len(),
            inner,
            cols
        }
    }
    /// Return the identity matrix for the specified size
    pub fn identity(size: usize) -> Self {
        let mut identity = Self::new(size, size);
        for x in 0..size {
            identity.inner[x][x] = Fraction::one();
        }
        identity
    }
    /// Return the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }
    /// Return the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }
    /// Returns true if this matrix has no cells at all
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
    /// Returns true if this matrix has as many rows as columns
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }
    /// Returns true if any element is NaN
    pub fn has_nan(&self) -> bool {
        self.inner.iter().flatten().any(|x| x.is_nan())
    }
    fn valid(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }
    /// Get the element at the specified row and column, or NaN if there is
    /// no such element
    pub fn get(&self, row: usize, col: usize) -> Fraction {
        if self.valid(row, col) {
            self.inner[row][col]
        } else {
            Fraction::NAN
        }
    }
    /// Set the element at the specified row and column. Does nothing if there
    /// is no such element.
    pub fn set(&mut self, row: usize, col: usize, value: Fraction) {
        if self.valid(row, col) {
            self.inner[row][col] = value;
        } else {
            debug!("ignoring write to ({}, {}) of a {}x{} matrix", row, col, self.rows, self.cols);
        }
    }
    /// Borrow a row
    pub fn row(&self, row: usize) -> Option<&[Fraction]> {
        self.inner.get(row).map(Vec::as_slice)
    }

    /// Negate every element in place
    pub fn negate(&mut self) {
        for cell in self.inner.iter_mut().flatten() {
            cell.negate();
        }
    }
    /// Multiply every element by factor, in place
    pub fn scale(&mut self, factor: Fraction) {
        for cell in self.inner.iter_mut().flatten() {
            *cell *= factor;
        }
    }
    fn check_same_size(&self, other: &Self, op: &'static str) -> Result<()> {
        if self.rows != other.rows || self.cols != other.cols {
            let err = Error::DimensionMismatch {
                op,
                left: (self.rows, self.cols),
                right: (other.rows, other.cols)
            };
            debug!("{}", err);
            return Err(err);
        }
        Ok(())
    }
    /// Add other to this matrix in place. Fails without changing anything if
    /// the sizes differ.
    pub fn try_add_assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_size(other, "add")?;
        for (cell, other) in self.inner.iter_mut().flatten().zip(other.inner.iter().flatten()) {
            *cell += *other;
        }
        Ok(())
    }
    /// Subtract other from this matrix in place. Fails without changing
    /// anything if the sizes differ.
    pub fn try_sub_assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_size(other, "subtract")?;
        for (cell, other) in self.inner.iter_mut().flatten().zip(other.inner.iter().flatten()) {
            *cell -= *other;
        }
        Ok(())
    }
    /// Return the sum of two matrices of the same size
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        let mut sum = self.clone();
        sum.try_add_assign(other)?;
        Ok(sum)
    }
    /// Return the difference of two matrices of the same size
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        let mut difference = self.clone();
        difference.try_sub_assign(other)?;
        Ok(difference)
    }
    /// Return the matrix product. This matrix must have as many columns as
    /// other has rows.
    pub fn try_mul(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            let err = Error::DimensionMismatch {
                op: "multiply",
                left: (self.rows, self.cols),
                right: (other.rows, other.cols)
            };
            debug!("{}", err);
            return Err(err);
        }

        let mut output = Self::new(self.rows, other.cols);
        for (row1, output_row) in self.inner.iter().zip(&mut output.inner) {
            for (col2, value) in output_row.iter_mut().enumerate() {
                *value = row1.iter()
                    .zip(&other.inner)
                    .map(|(&left, row2)| left * row2[col2])
                    .sum();
            }
        }
        Ok(output)
    }

    /// Swap two rows. Does nothing if either row doesn't exist.
    pub fn switch_rows(&mut self, row1: usize, row2: usize) {
        if row1 >= self.rows || row2 >= self.rows {
            debug!("ignoring swap of rows {} and {} of a {}-row matrix", row1, row2, self.rows);
            return;
        }
        self.inner.swap(row1, row2);
    }
    /// Multiply a row by a factor. Multiplying by zero is not a row operation,
    /// so that and rows that don't exist are ignored.
    pub fn multiply_row(&mut self, row: usize, factor: Fraction) {
        if row >= self.rows || factor.is_zero() {
            debug!("ignoring multiplication of row {} by {}", row, factor);
            return;
        }
        for cell in &mut self.inner[row] {
            *cell *= factor;
        }
    }
    /// Add the source row, multiplied by a factor, to the destination row.
    /// Does nothing if either row doesn't exist.
    pub fn add_row(&mut self, src: usize, factor: Fraction, dst: usize) {
        if src >= self.rows || dst >= self.rows {
            debug!("ignoring addition of row {} to row {} of a {}-row matrix", src, dst, self.rows);
            return;
        }
        for col in 0..self.cols {
            let value = self.inner[src][col] * factor;
            self.inner[dst][col] += value;
        }
    }

    /// Find the first column after `prev_col` (or the first column at all if
    /// `None`) with a nonzero element at or below `first_row`. Returns the
    /// number of columns if there is none.
    pub fn next_nonzero(&self, prev_col: Option<usize>, first_row: usize) -> usize {
        let start = prev_col.map_or(0, |col| col + 1);
        (start..self.cols)
            .find(|&col| self.inner.iter().skip(first_row).any(|row| !row[col].is_zero()))
            .unwrap_or(self.cols)
    }
    /// Find the row at or below `first_row` whose element in this column has
    /// the greatest absolute value. The first one wins a tie. Returns None if
    /// they are all zero.
    pub fn pivot(&self, col: usize, first_row: usize) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        let mut best: Option<(usize, Fraction)> = None;
        for row in first_row..self.rows {
            let value = self.inner[row][col].abs();
            if value.is_zero() {
                continue;
            }
            match best {
                Some((_, max)) if !(value > max) => (),
                _ => best = Some((row, value))
            }
        }
        best.map(|(row, _)| row)
    }
    /// Swap the pivot of a column into `current_row` and scale that row so
    /// the pivot becomes 1. Returns the pivot's value from before the
    /// scaling and whether rows had to be swapped.
    fn normalize_pivot(&mut self, col: usize, current_row: usize) -> Option<(Fraction, bool)> {
        let pivot = self.pivot(col, current_row)?;
        trace!("pivot for column {} is in row {}", col, pivot);
        let swapped = pivot != current_row;
        if swapped {
            self.switch_rows(current_row, pivot);
        }
        let value = self.inner[current_row][col];
        self.multiply_row(current_row, value.reciprocal());
        Some((value, swapped))
    }
    /// Use the 1 at (current_row, col) to clear the column in the given rows
    fn eliminate<I: IntoIterator<Item = usize>>(&mut self, col: usize, current_row: usize, rows: I) {
        for row in rows {
            let factor = -self.inner[row][col];
            if !factor.is_zero() {
                self.add_row(current_row, factor, row);
            }
        }
    }
    /// Apply Gauss Jordan elimination on this matrix, leaving it in reduced
    /// row echelon form: every pivot is 1, it's the only nonzero element in
    /// its column, and each pivot is to the right of the one above it.
    pub fn reduce(&mut self) {
        // https://en.wikipedia.org/wiki/Gaussian_elimination
        let mut current_row = 0;
        let mut col = self.next_nonzero(None, 0);
        while col < self.cols {
            if self.normalize_pivot(col, current_row).is_none() {
                break;
            }
            self.eliminate(col, current_row, (0..self.rows).filter(|&row| row != current_row));
            current_row += 1;
            col = self.next_nonzero(Some(col), current_row);
        }
    }
    /// Return the determinant, or an error if this matrix isn't square or
    /// is empty. This matrix is not modified.
    pub fn try_determinant(&self) -> Result<Fraction> {
        if !self.is_square() {
            return Err(Error::NotSquare {
                rows: self.rows,
                cols: self.cols
            });
        }
        if self.is_empty() {
            return Err(Error::EmptyMatrix);
        }

        // Swapping rows negates the determinant, scaling a row scales it by
        // the same factor, and adding rows together doesn't change it. What's
        // left is triangular with only 0 or 1 along the diagonal.
        let mut matrix = self.clone();
        let mut result = Fraction::one();
        let mut current_row = 0;
        let mut col = matrix.next_nonzero(None, 0);
        while col < matrix.cols {
            let (value, swapped) = match matrix.normalize_pivot(col, current_row) {
                Some(pivot) => pivot,
                None => break
            };
            if swapped {
                result = -result;
            }
            result *= value;
            matrix.eliminate(col, current_row, current_row + 1..matrix.rows);
            current_row += 1;
            col = matrix.next_nonzero(Some(col), current_row);
        }
        // The last diagonal element is 0 exactly when a row ran out of pivots
        result *= matrix.inner[matrix.rows - 1][matrix.cols - 1];
        Ok(result)
    }
    /// Return the determinant, or NaN if this matrix isn't square or is
    /// empty. This matrix is not modified.
    pub fn determinant(&self) -> Fraction {
        self.try_determinant().unwrap_or(Fraction::NAN)
    }
    /// Return the transpose, turning rows into columns
    pub fn transpose(&self) -> Self {
        let mut output = Self::new(self.cols, self.rows);
        for (row, cells) in self.inner.iter().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                output.inner[col][row] = cell;
            }
        }
        output
    }

    fn column_widths(&self) -> SmallVec<[usize; 8]> {
        (0..self.cols)
            .map(|col| {
                self.inner.iter()
                    .map(|row| unsigned_length(row[col]))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
    /// Display this matrix with a prefix in front of every line
    pub fn indented<'a>(&'a self, prefix: &'a str) -> Indented<'a> {
        Indented { matrix: self, prefix }
    }
    fn render(&self, f: &mut fmt::Formatter, prefix: &str) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let widths = self.column_widths();
        for row in &self.inner {
            write!(f, "{}|", prefix)?;
            for (&cell, &width) in row.iter().zip(&widths) {
                let len = unsigned_length(cell);
                // The minus sign goes where a positive number has a space
                if cell.is_negative() {
                    write!(f, "{}{:pad$} ", cell, "", pad = width - len)?;
                } else {
                    write!(f, " {}{:pad$}", cell, "", pad = width - len + 1)?;
                }
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

/// Printed length of a fraction, not counting its minus sign
fn unsigned_length(x: Fraction) -> usize {
    if x.is_negative() {
        x.length() - 1
    } else {
        x.length()
    }
}

/// Return the identity matrix for the specified size
pub fn identity_matrix(size: usize) -> Matrix {
    Matrix::identity(size)
}
/// Return the transpose of a matrix without changing it
pub fn transpose(matrix: &Matrix) -> Matrix {
    matrix.transpose()
}

/// A matrix displayed with a prefix on each line, see `Matrix::indented`
pub struct Indented<'a> {
    matrix: &'a Matrix,
    prefix: &'a str
}
impl<'a> fmt::Display for Indented<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.matrix.render(f, self.prefix)
    }
}
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.render(f, "")
    }
}
impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[[")?;
        for (i, row) in self.inner.iter().enumerate() {
            if i > 0 {
                write!(f, "], [")?;
            }
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", cell)?;
            }
        }
        write!(f, "]]")?;
        Ok(())
    }
}

impl Neg for Matrix {
    type Output = Self;
    fn neg(mut self) -> Self::Output {
        self.negate();
        self
    }
}
// The operators report a size mismatch by returning the empty matrix, and the
// assigning forms by leaving the left hand side untouched.
impl<'a> AddAssign<&'a Matrix> for Matrix {
    fn add_assign(&mut self, other: &'a Matrix) {
        let _ = self.try_add_assign(other);
    }
}
impl<'a> SubAssign<&'a Matrix> for Matrix {
    fn sub_assign(&mut self, other: &'a Matrix) {
        let _ = self.try_sub_assign(other);
    }
}
impl<'a> MulAssign<&'a Matrix> for Matrix {
    fn mul_assign(&mut self, other: &'a Matrix) {
        if let Ok(product) = self.try_mul(other) {
            *self = product;
        }
    }
}
impl MulAssign<Fraction> for Matrix {
    fn mul_assign(&mut self, factor: Fraction) {
        self.scale(factor);
    }
}
impl<'a> Add<&'a Matrix> for &'a Matrix {
    type Output = Matrix;
    fn add(self, other: &'a Matrix) -> Matrix {
        self.try_add(other).unwrap_or_default()
    }
}
impl<'a> Sub<&'a Matrix> for &'a Matrix {
    type Output = Matrix;
    fn sub(self, other: &'a Matrix) -> Matrix {
        self.try_sub(other).unwrap_or_default()
    }
}
impl<'a> Mul<&'a Matrix> for &'a Matrix {
    type Output = Matrix;
    fn mul(self, other: &'a Matrix) -> Matrix {
        self.try_mul(other).unwrap_or_default()
    }
}
impl Mul<Fraction> for Matrix {
    type Output = Matrix;
    fn mul(mut self, factor: Fraction) -> Matrix {
        self.scale(factor);
        self
    }
}
impl<'a> Mul<Fraction> for &'a Matrix {
    type Output = Matrix;
    fn mul(self, factor: Fraction) -> Matrix {
        self.clone() * factor
    }
}
