//! # Veracity Common Library
//!
//! Shared code for the Veracity services:
//! - Error and result types
//! - Bootstrap configuration loading (TOML)
//! - Root folder resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
