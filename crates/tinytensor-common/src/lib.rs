//! Common types for tinytensor
//!
//! This crate provides the foundational pieces shared across the workspace:
//! element encodings, the owned row-major matrix store, and the error
//! taxonomy used by allocation, access and conversion.

pub mod error;
pub mod tensor;
pub mod types;

pub use error::*;
pub use tensor::*;
pub use types::*;
