mod calc;
mod config;
mod error;
mod fraction;
mod matrix;
mod proptests;

pub use self::calc::*;
pub use self::config::*;
pub use self::error::*;
pub use self::fraction::*;
pub use self::matrix::*;
