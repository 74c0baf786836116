/// gm-statblocks - Statblock import core for a Game Master dashboard
///
/// Parses Tetra Cube `.monster` files and canonical statblock JSON,
/// resolves their template placeholders, and keeps the results in a
/// local SQLite statblock library.

pub mod config;
pub mod core;
pub mod database;
pub mod import;
pub mod statblock;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
