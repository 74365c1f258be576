//! Showdeck client library
//!
//! A client for a television-show catalog (the TVMaze API shape): it
//! paginates the remote show index into a deduplicated, genre-bucketed
//! in-memory collection and drives a debounced, cancellable autocomplete
//! search. Rendering, routing, and persistence are left to callers.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
