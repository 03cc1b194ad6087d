//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! catalog and static file logic.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    apply_common_headers, build_304_response, build_404_image_response, build_404_response,
    build_405_response, build_413_response, build_cached_response, build_json_response,
    build_options_response, build_text_response,
};
