//! ifjc-util - Shared infrastructure for the ifjc compiler.
//!
//! This crate holds the pieces every phase depends on: source positions
//! ([`Span`]) and the terminal error type ([`CompileError`]) together with
//! its process exit-code mapping.

pub mod error;
pub mod span;

pub use error::{CompileError, Result};
pub use span::Span;
