//! Shared types, configuration, and error handling for gocontext
//!
//! This crate has no async runtime or I/O dependencies beyond config
//! loading; it is depended on by every other gocontext crate.

pub mod config;
pub mod embedding;
pub mod error;
pub mod project;
pub mod search;

pub use error::{Error, Result};
