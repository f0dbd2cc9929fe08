//! Validator functions
//!
//! Validators never fail: malformed input is classified as invalid. All of
//! them strip formatting first, so `111.444.777-35` and `11144477735` are
//! treated the same.

pub mod document;
pub mod email;
pub mod phone;

// Re-export all validators for convenience
pub use document::*;
pub use email::*;
pub use phone::*;
