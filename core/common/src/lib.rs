//! Common types shared across Cirrus crates.
//!
//! This module provides the error taxonomy and foundational value types
//! used throughout the codebase, ensuring consistency and type safety.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::ObjectKey;
