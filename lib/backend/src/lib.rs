//! Data access for the medicare front-end.
//!
//! This crate provides:
//! - Typed row contracts for the clinic tables (`Patient`, `Appointment`, ...)
//! - Column projections and ordering (`Projection`, `Order`)
//! - The data-source seam and its implementations (`DataSource`,
//!   `MemorySource`, and `RestSource` behind the `http` feature)
//! - Stateful table reads with loading/error tracking (`TableQuery`)
//!
//! # Example
//!
//! ```
//! use medicare_backend::{MemorySource, Projection, records::table_spec};
//!
//! let spec = table_spec("patients").expect("known table");
//! let projection = Projection::parse(spec.projection).expect("valid projection");
//! assert!(projection.columns().iter().any(|c| c == "email"));
//! let _source = MemorySource::new();
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod projection;
pub mod query;
pub mod records;
#[cfg(feature = "http")]
pub mod rest;
pub mod source;

// Re-export main types at crate root
pub use config::BackendConfig;
pub use error::BackendError;
pub use memory::MemorySource;
pub use projection::{CREATED_AT, Order, Projection};
pub use query::{QueryState, TableQuery};
pub use records::{Record, TableSpec, table_spec};
#[cfg(feature = "http")]
pub use rest::RestSource;
pub use source::DataSource;
