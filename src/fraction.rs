use crate::error::{Error, Result};
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Inv, One, Pow, Zero};
use std::{
    cmp::Ordering,
    fmt,
    iter::{Product, Sum},
    ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign},
    str::FromStr
};
use thiserror::Error;

/// Primes that `cancel` strips by trial division before falling back to `gcd`
const SMALL_PRIMES: [u64; 6] = [2, 3, 5, 7, 11, 13];

/// Decimal literals stop taking digits once the denominator reaches this
const DECIMAL_LIMIT: u64 = (std::i64::MAX / 10) as u64;

/// Find the greatest common divisor of two numbers
pub fn gcd(mut x: u64, mut y: u64) -> u64 {
    // https://en.wikipedia.org/wiki/Euclidean_algorithm
    while y != 0 {
        let rem = x % y;
        x = y;
        y = rem;
    }
    x
}
/// Divide both numbers by their greatest common divisor, in place.
///
/// Common factors from `SMALL_PRIMES` are divided out one at a time first and
/// `gcd` takes care of whatever is left, so the result is always the same
/// pair that dividing both by `gcd(x, y)` gives.
pub fn cancel(x: &mut u64, y: &mut u64) {
    if *x == 0 || *y == 0 {
        // gcd(0, n) = n, and trial division would never stop on 0/0
        let common = gcd(*x, *y);
        if common > 1 {
            *x /= common;
            *y /= common;
        }
        return;
    }
    for &prime in &SMALL_PRIMES {
        while *x % prime == 0 && *y % prime == 0 {
            *x /= prime;
            *y /= prime;
        }
    }
    let common = gcd(*x, *y);
    *x /= common;
    *y /= common;
}
/// Floor of the square root
fn isqrt(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    // The float estimate is only close, fix it up in both directions
    while root.checked_mul(root).map_or(true, |square| square > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).map_or(false, |square| square <= n) {
        root += 1;
    }
    root
}
/// Number of decimal digits in x
fn digits(mut x: u64) -> usize {
    let mut len = 1;
    while x >= 10 {
        x /= 10;
        len += 1;
    }
    len
}

/// How the intermediate products and sums of an operation behave when they
/// don't fit in a u64
#[derive(Clone, Copy, Debug)]
enum Arith {
    Wrapping,
    Checked
}
impl Arith {
    fn add(self, x: u64, y: u64) -> Option<u64> {
        match self {
            Arith::Wrapping => Some(x.wrapping_add(y)),
            Arith::Checked => x.checked_add(y)
        }
    }
    fn mul(self, x: u64, y: u64) -> Option<u64> {
        match self {
            Arith::Wrapping => Some(x.wrapping_mul(y)),
            Arith::Checked => x.checked_mul(y)
        }
    }
}

/// A number stored in fraction form instead of actually calculating the
/// result. This ensures (10/3) * 3 is actually 10 and not 9.99998.
///
/// The sign is kept apart from the two magnitudes, and every value is kept in
/// lowest terms. A denominator of 0 marks a result that is not a number
/// (`Fraction::NAN`), which prints as `nan`.
///
/// The operators (`+`, `-`, `*`, `/` and their assigning forms) wrap silently
/// when a magnitude outgrows a u64. Use `checked_add` and friends to find out
/// about overflow instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    negative: bool,
    numerator: u64,
    denominator: u64
}
impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}
impl Fraction {
    /// The result of an undefined operation, such as the reciprocal of zero
    pub const NAN: Self = Self { negative: false, numerator: 1, denominator: 0 };
    const ZERO: Self = Self { negative: false, numerator: 0, denominator: 1 };
    const ONE: Self = Self { negative: false, numerator: 1, denominator: 1 };

    /// Construct a new fraction, reduced to lowest terms. The fraction is
    /// negative if exactly one of the inputs is. A zero denominator gives NaN.
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self::from_parts(
            (numerator < 0) != (denominator < 0),
            numerator.unsigned_abs(),
            denominator.unsigned_abs()
        )
    }
    /// Construct a fraction from a sign and the two magnitudes, reduced to
    /// lowest terms
    pub fn from_parts(negative: bool, mut numerator: u64, mut denominator: u64) -> Self {
        if denominator == 0 {
            return Self::NAN;
        }
        let common = gcd(numerator, denominator);
        numerator /= common;
        denominator /= common;
        Self {
            negative: negative && numerator != 0,
            numerator,
            denominator
        }
    }
    /// Construct a fraction from a mixed number, such as -2 1/3.
    ///
    /// The fractional part is reduced first and then combined as
    /// `|whole| * denominator + numerator`. Only the whole part's sign counts,
    /// so a negative whole part makes the entire number negative and a whole
    /// part of 0 always gives a positive number. The combination wraps on
    /// overflow like the rest of the arithmetic.
    pub fn from_mixed(whole: i64, mut numerator: u64, mut denominator: u64) -> Self {
        if denominator == 0 {
            return Self::NAN;
        }
        let common = gcd(numerator, denominator);
        numerator /= common;
        denominator /= common;
        let total = whole.unsigned_abs()
            .wrapping_mul(denominator)
            .wrapping_add(numerator);
        Self::from_parts(whole < 0, total, denominator)
    }
    /// Return the numerator
    pub fn numerator(self) -> u64 {
        self.numerator
    }
    /// Return the denominator. This is 0 for NaN.
    pub fn denominator(self) -> u64 {
        self.denominator
    }
    /// Returns true if this fraction is less than zero. Neither zero nor NaN
    /// are negative.
    pub fn is_negative(self) -> bool {
        self.negative && self.numerator != 0 && self.denominator != 0
    }
    /// Returns true if this fraction is 0
    pub fn is_zero(self) -> bool {
        self.numerator == 0
    }
    /// Returns true if this is the result of an undefined operation
    pub fn is_nan(self) -> bool {
        self.denominator == 0
    }
    /// Returns true if this fraction is a whole number
    pub fn is_integer(self) -> bool {
        self.denominator == 1
    }
    /// Return this fraction as an integer, if it is one and it fits
    pub fn to_i64(self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        if self.negative {
            if self.numerator > 1 << 63 {
                return None;
            }
            Some((self.numerator as i64).wrapping_neg())
        } else if self.numerator > std::i64::MAX as u64 {
            None
        } else {
            Some(self.numerator as i64)
        }
    }
    /// Calculates the decimal result of this fraction
    pub fn decimal(self) -> f64 {
        if self.is_nan() {
            return std::f64::NAN;
        }
        let value = self.numerator as f64 / self.denominator as f64;
        if self.negative {
            -value
        } else {
            value
        }
    }
    /// Return this value with a positive sign
    pub fn abs(mut self) -> Self {
        self.negative = false;
        self
    }
    /// Flip the sign in place. Zero and NaN have no sign and stay as is.
    pub fn negate(&mut self) {
        if !self.is_zero() && !self.is_nan() {
            self.negative = !self.negative;
        }
    }
    /// Same thing as in mathematics taking the power of -1, so 1/n. The sign is
    /// kept. The reciprocal of zero is NaN.
    pub fn reciprocal(self) -> Self {
        if self.is_zero() || self.is_nan() {
            return Self::NAN;
        }
        Self {
            negative: self.negative,
            numerator: self.denominator,
            denominator: self.numerator
        }
    }
    /// Like `reciprocal`, but fails on zero
    pub fn try_reciprocal(self) -> Result<Self> {
        if self.is_zero() {
            return Err(Error::ReciprocalOfZero);
        }
        Ok(self.reciprocal())
    }
    /// Raise this fraction to an integer power by repeated multiplication. A
    /// negative exponent raises the reciprocal instead, so zero to a negative
    /// power is NaN.
    pub fn pow(self, exp: i32) -> Self {
        let base = if exp < 0 { self.reciprocal() } else { self };
        (0..exp.unsigned_abs()).fold(Self::ONE, |result, _| result * base)
    }
    /// Approximate the square root by taking the integer square root (rounded
    /// down) of the numerator and the denominator separately. This is only
    /// exact if both are perfect squares: the root of 1/2 comes out as 1/1.
    /// Negative numbers have no square root and give NaN.
    pub fn sqrt(self) -> Self {
        if self.is_nan() || self.is_negative() {
            return Self::NAN;
        }
        Self::from_parts(false, isqrt(self.numerator), isqrt(self.denominator))
    }
    /// Return the number of characters this fraction takes up when printed
    pub fn length(self) -> usize {
        if self.is_nan() {
            return 3;
        }
        if self.is_zero() {
            return 1;
        }
        let mut len = digits(self.numerator);
        if self.negative {
            len += 1;
        }
        if self.denominator != 1 {
            len += 1 + digits(self.denominator);
        }
        len
    }

    fn mul_with(self, other: Self, arith: Arith) -> Option<Self> {
        if self.is_nan() || other.is_nan() {
            return Some(Self::NAN);
        }
        let (mut num1, mut den1) = (self.numerator, self.denominator);
        let (mut num2, mut den2) = (other.numerator, other.denominator);
        cancel(&mut num1, &mut den2);
        cancel(&mut num2, &mut den1);
        Some(Self::from_parts(
            self.negative != other.negative,
            arith.mul(num1, num2)?,
            arith.mul(den1, den2)?
        ))
    }
    fn div_with(self, other: Self, arith: Arith) -> Option<Self> {
        if self.is_nan() || other.is_nan() {
            return Some(Self::NAN);
        }
        if other.is_zero() {
            return match arith {
                Arith::Wrapping => Some(Self::NAN),
                Arith::Checked => None
            };
        }
        self.mul_with(other.reciprocal(), arith)
    }
    fn add_with(self, other: Self, arith: Arith) -> Option<Self> {
        if self.is_nan() || other.is_nan() {
            return Some(Self::NAN);
        }
        // lcm = (den1 / gcd) * den2, and each numerator is scaled by the
        // other denominator's share of it
        let common = gcd(self.denominator, other.denominator);
        let mut denominator = arith.mul(self.denominator / common, other.denominator)?;
        let left = arith.mul(self.numerator, other.denominator / common)?;
        let right = arith.mul(other.numerator, self.denominator / common)?;

        let (negative, mut numerator) = if self.negative == other.negative {
            (self.negative, arith.add(left, right)?)
        } else if right > left {
            (other.negative, right - left)
        } else {
            (self.negative, left - right)
        };
        cancel(&mut numerator, &mut denominator);
        Some(Self::from_parts(negative, numerator, denominator))
    }
    fn sub_with(self, other: Self, arith: Arith) -> Option<Self> {
        self.add_with(-other, arith)
    }
    /// Operators use wrapping arithmetic, which always has a result
    fn wrapping(result: Option<Self>) -> Self {
        result.unwrap_or(Self::NAN)
    }

    /// Calculates addition, but returns None on overflow
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.add_with(other, Arith::Checked)
    }
    /// Calculates subtraction, but returns None on overflow
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.sub_with(other, Arith::Checked)
    }
    /// Calculates multiplication, but returns None on overflow
    pub fn checked_mul(self, other: Self) -> Option<Self> {
        self.mul_with(other, Arith::Checked)
    }
    /// Calculates division, but returns None on overflow or if other is 0
    pub fn checked_div(self, other: Self) -> Option<Self> {
        self.div_with(other, Arith::Checked)
    }
    /// Calculates addition, failing with `Error::Overflow` on overflow
    pub fn try_add(self, other: Self) -> Result<Self> {
        self.checked_add(other).ok_or(Error::Overflow)
    }
    /// Calculates subtraction, failing with `Error::Overflow` on overflow
    pub fn try_sub(self, other: Self) -> Result<Self> {
        self.checked_sub(other).ok_or(Error::Overflow)
    }
    /// Calculates multiplication, failing with `Error::Overflow` on overflow
    pub fn try_mul(self, other: Self) -> Result<Self> {
        self.checked_mul(other).ok_or(Error::Overflow)
    }
    /// Calculates division, failing if other is 0 or on overflow
    pub fn try_div(self, other: Self) -> Result<Self> {
        if other.is_zero() {
            return Err(Error::DivisionByZero);
        }
        self.checked_div(other).ok_or(Error::Overflow)
    }

    fn equals_integer(self, int: Self) -> bool {
        if int.is_zero() {
            return self.is_zero();
        }
        if self.denominator != 1 {
            return false;
        }
        self.numerator == int.numerator && self.negative == int.negative
    }
}
impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            return None;
        }
        let difference = *self - *other;
        if difference.is_nan() {
            None
        } else if difference.is_negative() {
            Some(Ordering::Less)
        } else if difference.is_zero() {
            Some(Ordering::Equal)
        } else {
            Some(Ordering::Greater)
        }
    }
}
impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_nan() {
            return write!(f, "nan");
        }
        if self.is_negative() {
            write!(f, "-")?;
        }
        write!(f, "{}", self.numerator)?;
        if self.denominator != 1 {
            write!(f, "/{}", self.denominator)?;
        }
        Ok(())
    }
}
impl fmt::Debug for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
impl Neg for Fraction {
    type Output = Self;

    fn neg(mut self) -> Self::Output {
        self.negate();
        self
    }
}
macro_rules! impl_from {
    ($($signed:ident),* --- $($unsigned:ident),*) => {
        $(impl From<$signed> for Fraction {
            fn from(i: $signed) -> Self {
                Self {
                    negative: i < 0,
                    numerator: (i as i64).unsigned_abs(),
                    denominator: 1
                }
            }
        })*
        $(impl From<$unsigned> for Fraction {
            fn from(i: $unsigned) -> Self {
                Self {
                    negative: false,
                    numerator: i as u64,
                    denominator: 1
                }
            }
        })*
    }
}
impl_from! {
    i8, i16, i32, i64, isize
    ---
    u8, u16, u32, u64, usize
}

impl<'a, T: Copy + Into<Fraction>> From<&'a T> for Fraction {
    fn from(other: &'a T) -> Self {
        (*other).into()
    }
}

macro_rules! impl_op {
    ($($trait:ident $fn:ident = $call:ident),* --- $($trait_assign:ident $fn_assign:ident = ($op_assign:tt)),*) => {
        $(impl<T: Into<Fraction>> $trait<T> for Fraction {
            type Output = Self;
            fn $fn(self, other: T) -> Self {
                Self::wrapping(self.$call(other.into(), Arith::Wrapping))
            }
        })*
        $(impl<T: Into<Fraction>> $trait_assign<T> for Fraction {
            fn $fn_assign(&mut self, other: T) {
                *self = *self $op_assign other;
            }
        })*
    }
}
impl_op! {
    Add add = add_with,
    Sub sub = sub_with,
    Mul mul = mul_with,
    Div div = div_with
    ---
    AddAssign add_assign = (+),
    SubAssign sub_assign = (-),
    MulAssign mul_assign = (*),
    DivAssign div_assign = (/)
}

// Integers on the left hand side: 2 - x, 1 / x, 3 == x, 0 < x
macro_rules! impl_int_lhs {
    ($($int:ident),*) => {
        $(
            impl Add<Fraction> for $int {
                type Output = Fraction;
                fn add(self, other: Fraction) -> Fraction {
                    Fraction::from(self) + other
                }
            }
            impl Sub<Fraction> for $int {
                type Output = Fraction;
                fn sub(self, other: Fraction) -> Fraction {
                    Fraction::from(self) - other
                }
            }
            impl Mul<Fraction> for $int {
                type Output = Fraction;
                fn mul(self, other: Fraction) -> Fraction {
                    Fraction::from(self) * other
                }
            }
            impl Div<Fraction> for $int {
                type Output = Fraction;
                fn div(self, other: Fraction) -> Fraction {
                    Fraction::from(self) / other
                }
            }
            impl PartialEq<$int> for Fraction {
                fn eq(&self, other: &$int) -> bool {
                    self.equals_integer(Fraction::from(*other))
                }
            }
            impl PartialEq<Fraction> for $int {
                fn eq(&self, other: &Fraction) -> bool {
                    other == self
                }
            }
            impl PartialOrd<$int> for Fraction {
                fn partial_cmp(&self, other: &$int) -> Option<Ordering> {
                    self.partial_cmp(&Fraction::from(*other))
                }
            }
            impl PartialOrd<Fraction> for $int {
                fn partial_cmp(&self, other: &Fraction) -> Option<Ordering> {
                    Fraction::from(*self).partial_cmp(other)
                }
            }
        )*
    }
}
impl_int_lhs!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Sum for Fraction {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |sum, x| sum + x)
    }
}
impl<'a> Sum<&'a Fraction> for Fraction {
    fn sum<I: Iterator<Item = &'a Fraction>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
impl Product for Fraction {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ONE, |product, x| product * x)
    }
}

impl Zero for Fraction {
    fn zero() -> Self {
        Self::ZERO
    }
    fn is_zero(&self) -> bool {
        Fraction::is_zero(*self)
    }
}
impl One for Fraction {
    fn one() -> Self {
        Self::ONE
    }
}
impl Inv for Fraction {
    type Output = Self;
    fn inv(self) -> Self {
        self.reciprocal()
    }
}
impl Pow<i32> for Fraction {
    type Output = Self;
    fn pow(self, exp: i32) -> Self {
        Fraction::pow(self, exp)
    }
}
impl CheckedAdd for Fraction {
    fn checked_add(&self, other: &Self) -> Option<Self> {
        Fraction::checked_add(*self, *other)
    }
}
impl CheckedSub for Fraction {
    fn checked_sub(&self, other: &Self) -> Option<Self> {
        Fraction::checked_sub(*self, *other)
    }
}
impl CheckedMul for Fraction {
    fn checked_mul(&self, other: &Self) -> Option<Self> {
        Fraction::checked_mul(*self, *other)
    }
}
impl CheckedDiv for Fraction {
    fn checked_div(&self, other: &Self) -> Option<Self> {
        Fraction::checked_div(*self, *other)
    }
}

/// Reasons a fraction literal can be rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFractionError {
    #[error("empty number")]
    Empty,
    #[error("invalid number: {0:?}")]
    InvalidDigit(String),
    #[error("number too large: {0:?}")]
    TooLarge(String),
    #[error("denominator is 0")]
    ZeroDenominator
}

fn parse_digits(input: &str) -> std::result::Result<u64, ParseFractionError> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseFractionError::InvalidDigit(input.to_string()));
    }
    input.parse().map_err(|_| ParseFractionError::TooLarge(input.to_string()))
}
/// Parse the digits after a decimal point into a fraction over a power of
/// ten. Digits past what the denominator can hold are dropped.
pub fn parse_decimals(input: &str) -> std::result::Result<Fraction, ParseFractionError> {
    let mut numerator = 0u64;
    let mut denominator = 1u64;
    for c in input.chars() {
        let digit = c.to_digit(10)
            .ok_or_else(|| ParseFractionError::InvalidDigit(input.to_string()))?;
        if denominator < DECIMAL_LIMIT {
            numerator = numerator * 10 + u64::from(digit);
            denominator *= 10;
        }
    }
    Ok(Fraction::from_parts(false, numerator, denominator))
}

impl FromStr for Fraction {
    type Err = ParseFractionError;

    /// Accepts `12`, `-3/4`, `1.25`, `-.5` and `3 / 4`
    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        let input = input.trim();
        let (negative, body) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input)
        };
        if body.is_empty() {
            return Err(ParseFractionError::Empty);
        }
        let value = if let Some((numerator, denominator)) = body.split_once('/') {
            let numerator = parse_digits(numerator.trim())?;
            let denominator = parse_digits(denominator.trim())?;
            if denominator == 0 {
                return Err(ParseFractionError::ZeroDenominator);
            }
            Fraction::from_parts(false, numerator, denominator)
        } else if let Some((whole, decimals)) = body.split_once('.') {
            let whole = if whole.is_empty() { 0 } else { parse_digits(whole)? };
            Fraction::from(whole).try_add(parse_decimals(decimals)?)
                .map_err(|_| ParseFractionError::TooLarge(input.to_string()))?
        } else {
            Fraction::from(parse_digits(body)?)
        };
        Ok(if negative { -value } else { value })
    }
}
