use crate::Fraction;

/// How numbers on the stack are shown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// Exact, as `-3/4`
    Fraction,
    /// Approximate, as a float with nine significant digits
    Decimal
}
impl Default for DisplayMode {
    fn default() -> Self {
        DisplayMode::Fraction
    }
}
impl DisplayMode {
    /// Return the other mode
    pub fn toggle(self) -> Self {
        match self {
            DisplayMode::Fraction => DisplayMode::Decimal,
            DisplayMode::Decimal => DisplayMode::Fraction
        }
    }
    /// Format a number in this mode
    pub fn render(self, x: Fraction) -> String {
        match self {
            DisplayMode::Fraction => x.to_string(),
            DisplayMode::Decimal => general(x.decimal(), SIGNIFICANT_DIGITS)
        }
    }
}

const SIGNIFICANT_DIGITS: usize = 9;

/// Format like C's `%g`: the shorter of fixed and scientific notation for the
/// given number of significant digits, without trailing zeroes
fn general(x: f64, precision: usize) -> String {
    if x.is_nan() {
        return String::from("nan");
    }
    if x.is_infinite() {
        return String::from(if x < 0.0 { "-inf" } else { "inf" });
    }
    if x == 0.0 {
        return String::from("0");
    }

    let scientific = format!("{:.*e}", precision - 1, x);
    let (mantissa, exp) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if exp < -4 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeroes(mantissa), sign, exp.abs())
    } else {
        let decimals = (precision as i32 - 1 - exp) as usize;
        trim_zeroes(&format!("{:.*}", decimals, x)).to_string()
    }
}
fn trim_zeroes(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Settings for a calculator session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub display: DisplayMode,
    /// Print prompts when asking for input, and `Stack empty.` for an empty
    /// stack
    pub prompts: bool
}
impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayMode::default(),
            prompts: true
        }
    }
}
