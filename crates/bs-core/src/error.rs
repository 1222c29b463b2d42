use thiserror::Error;

pub type BsResult<T> = Result<T, BsError>;

/// Low-level failures shared by every bsim crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BsError {
    /// A NaN or infinity reached a variable or parameter.
    #[error("{what} must be finite, got {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Time step or list position outside a buffer.
    #[error("{what}: index {index} is outside 0..{len}")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },
}
