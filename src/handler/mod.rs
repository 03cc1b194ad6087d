//! Request handler module
//!
//! Responsible for request routing dispatch: catalog endpoints, static
//! files from the public directory, and the not-found fallback.

mod api;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
