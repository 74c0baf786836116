//! Statblock library tests
//!
//! Each test opens its own SQLite file under a `TempDir`.

mod statblocks;
