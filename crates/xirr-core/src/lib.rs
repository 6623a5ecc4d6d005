pub mod builder;
pub mod daycount;
pub mod error;
pub mod parse;
pub mod solver;
pub mod summary;
pub mod types;
pub mod xirr;

pub use error::{ParseError, XirrError};
pub use types::*;

/// Standard result type for all xirr operations
pub type XirrResult<T> = Result<T, XirrError>;
