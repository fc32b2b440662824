//! Core types shared by every module
//!
//! Currently this is the error taxonomy and the crate-wide `Result` alias.

pub mod error;

pub use error::{CapsError, Result};
