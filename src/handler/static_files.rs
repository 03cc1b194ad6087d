//! Static file serving module
//!
//! Serves the public directory at the web root and the not-found image.

use crate::config::CatalogConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::Path;
use tokio::fs;

/// Serve a file from the public directory, `None` when nothing matches
pub async fn serve_public(
    ctx: &RequestContext<'_>,
    catalog: &CatalogConfig,
) -> Option<Response<Full<Bytes>>> {
    let (content, content_type) =
        load_from_directory(&catalog.public_dir, ctx.path, &catalog.index_file).await?;

    Some(build_static_file_response(
        content,
        content_type,
        ctx.if_none_match.as_deref(),
        ctx.is_head,
    ))
}

/// 404 with the configured image, or plain text if the image is missing
pub async fn serve_not_found(
    ctx: &RequestContext<'_>,
    catalog: &CatalogConfig,
) -> Response<Full<Bytes>> {
    let image_path = catalog.public_dir.join(&catalog.not_found_image);
    match fs::read(&image_path).await {
        Ok(data) => {
            let content_type = mime::get_content_type(image_path.extension().and_then(|e| e.to_str()));
            http::build_404_image_response(Bytes::from(data), content_type, ctx.is_head)
        }
        Err(e) => {
            logger::log_warning(&format!(
                "Not-found image unavailable '{}': {e}",
                image_path.display()
            ));
            http::build_404_response(ctx.is_head)
        }
    }
}

/// Load static file from directory with index file support
pub async fn load_from_directory(
    static_dir: &Path,
    path: &str,
    index_file: &str,
) -> Option<(Vec<u8>, &'static str)> {
    let decoded = percent_decode_str(path).decode_utf8().ok()?;

    // Remove leading slash and prevent directory traversal
    let cleaned = decoded.replace("..", "");
    let relative_path = cleaned.trim_start_matches('/');

    let mut file_path = static_dir.join(relative_path);

    // Security: ensure file_path is within static_dir
    let static_dir_canonical = match fs::canonicalize(static_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                static_dir.display()
            ));
            return None;
        }
    };

    // Directories resolve to their index file
    if fs::metadata(&file_path).await.is_ok_and(|m| m.is_dir()) {
        file_path = file_path.join(index_file);
    }

    // File not found is common (404), no need to log at warning level
    let file_path_canonical = fs::canonicalize(&file_path).await.ok()?;
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }

    let content = match fs::read(&file_path_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path_canonical.display()
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Build static file response with `ETag` support
fn build_static_file_response(
    data: Vec<u8>,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);

    // Check if client has cached version
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag, cache::CachePolicy::STATIC);
    }

    http::build_cached_response(
        Bytes::from(data),
        content_type,
        &etag,
        cache::CachePolicy::STATIC,
        is_head,
    )
}
