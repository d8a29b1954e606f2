//! Test support utilities for the storage engine workspace.
//!
//! This crate provides shared testing infrastructure:
//! - Isolated on-disk contexts backed by temporary directories
//! - Schema and record fixtures for the record layer
//! - Predicate expression builders
//! - One-shot logger initialisation for test output
//!
//! # Example
//!
//! ```no_run
//! use testsupport::prelude::*;
//! use record::Table;
//!
//! let dir = TestDir::new();
//! let schema = id_name_schema();
//! Table::create(&dir.file("t.tbl"), &schema).unwrap();
//! ```

pub mod context;
pub mod fixtures;

/// Convenient re-exports for common testing patterns.
pub mod prelude {
    pub use crate::context::*;
    pub use crate::fixtures::*;
}
