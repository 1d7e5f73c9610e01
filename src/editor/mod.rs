pub mod convert;
pub mod types;

pub use convert::*;
pub use types::*;
