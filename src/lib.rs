//! Census Dashboard - Rust библиотека

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod preprocessing;
pub mod types;

pub use types::*;
pub use models::*;
pub use preprocessing::*;

// Re-export для удобства
pub use cache::DatasetCache;
pub use error::{DatasetError, LoadError, ParseError};
