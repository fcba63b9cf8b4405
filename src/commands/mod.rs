//! Command implementations for the weekly score CLI
//!
//! Each command has a pure-ish core taking a [`CommandContext`] and an
//! explicit [`Session`](crate::Session), plus a `handle_*` wrapper that loads
//! the saved session and prints.

pub mod assistant;
pub mod auth;
pub mod common;
pub mod info;
pub mod scores;

#[cfg(test)]
mod tests;

pub use common::CommandContext;
