//! Type-safe wrappers and enums for command-line arguments.

pub mod backend;
pub mod counts;
pub mod time;

pub use backend::BackendKind;
pub use counts::CountEntry;
pub use time::{parse_date, Week};
