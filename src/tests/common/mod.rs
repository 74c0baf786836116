//! Common Test Utilities
//!
//! Shared fixtures used across test modules:
//! - Database fixture creation
//! - Sample monster and canonical statblock records

pub mod fixtures;

pub use fixtures::*;
