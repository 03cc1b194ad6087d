//! Catalog endpoints
//!
//! Runs the catalog query for a matched route and turns the outcome into
//! a JSON body or a plain-text error.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::{Language, QueryResult};
use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, cache};
use crate::logger;
use crate::routing::{self, ApiRoute, PathParams};

/// Query parameter carrying the surname prefix
const SURNAME_PREFIX_PARAM: &str = "apellido";

/// Handle a matched catalog route
pub fn handle_api(
    route: ApiRoute,
    params: &PathParams,
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let catalog = &state.catalog;
    let language = state.config.catalog.language;
    let param = |name| path_param(params, name);

    match route {
        ApiRoute::All => respond(Ok(catalog.all()), ctx, language),
        ApiRoute::BySurname => respond(catalog.by_surname(param("surname")), ctx, language),
        ApiRoute::ByFullName => respond(
            catalog.by_full_name(param("first_name"), param("surname")),
            ctx,
            language,
        ),
        ApiRoute::ByFirstNameAndSurnamePrefix => {
            let prefix = routing::query_param(ctx.query, SURNAME_PREFIX_PARAM);
            respond(
                catalog.by_first_name_and_surname_prefix(param("first_name"), prefix.as_deref()),
                ctx,
                language,
            )
        }
        ApiRoute::ByEditionYear => respond(catalog.by_edition_year(param("year")), ctx, language),
    }
}

/// Captured segment; route patterns guarantee it is present
fn path_param<'a>(params: &'a PathParams, name: &str) -> &'a str {
    params.get(name).unwrap_or_default()
}

fn respond<T: Serialize>(
    result: QueryResult<T>,
    ctx: &RequestContext<'_>,
    language: Language,
) -> Response<Full<Bytes>> {
    let data = match result {
        Ok(data) => data,
        Err(err) => {
            return http::build_text_response(err.status(), &err.message(language), ctx.is_head);
        }
    };

    let body = match serde_json::to_vec(&data) {
        Ok(body) => body,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response for {}: {e}", ctx.path));
            return http::build_text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "500 Internal Server Error",
                ctx.is_head,
            );
        }
    };

    let etag = cache::generate_etag(&body);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag, cache::CachePolicy::API);
    }

    http::build_json_response(Bytes::from(body), &etag, ctx.is_head)
}
