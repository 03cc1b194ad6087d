//! Read-only HTTP query service over an author/works catalog.
//!
//! The catalog is loaded once at startup, sorted by surname with Spanish
//! collation, and served as JSON under `/api`. Everything else comes from
//! the public directory.

pub mod catalog;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
