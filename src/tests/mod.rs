//! Crate-level tests
//!
//! - `common`: fixtures shared by the suites below
//! - `database`: statblock store behavior against a temp-dir SQLite library
//! - `import`: preview/commit workflow end to end against the store
//! - `property`: proptest invariants for the pure parsing components

mod common;
mod database;
mod property;
