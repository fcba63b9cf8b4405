//! Core utilities for the weekly score CLI
//!
//! - `cache`: paths and file helpers under the user cache directory
//! - `http`: request header construction for the Google APIs

pub mod cache;
pub mod http;

pub use cache::{
    cache_root, chat_history_path, default_db_path, remove_file_if_exists, session_path,
    try_read_to_string, write_string,
};
pub use http::bearer_header_map;
