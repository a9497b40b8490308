//! Core domain types and utilities for the medicare clinic front-end.
//!
//! This crate provides the foundational types and error handling shared by
//! the session, backend, and web crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, RecordId};
