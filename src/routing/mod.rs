//! Routing module
//!
//! Maps request paths to catalog endpoints:
//! - path pattern matching with `:param` captures
//! - query-string parameter lookup

mod matcher;

pub use matcher::{PathParams, RoutePattern};

use std::sync::OnceLock;

/// Catalog endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRoute {
    /// `GET /api`
    All,
    /// `GET /api/apellido/:surname`
    BySurname,
    /// `GET /api/nombre_apellido/:first_name/:surname`
    ByFullName,
    /// `GET /api/nombre/:first_name?apellido=<prefix>`
    ByFirstNameAndSurnamePrefix,
    /// `GET /api/edicion/:year`
    ByEditionYear,
}

/// Prefix shared by every catalog endpoint
pub const API_PREFIX: &str = "/api";

const ROUTES: &[(&str, ApiRoute)] = &[
    ("/api", ApiRoute::All),
    ("/api/apellido/:surname", ApiRoute::BySurname),
    ("/api/nombre_apellido/:first_name/:surname", ApiRoute::ByFullName),
    ("/api/nombre/:first_name", ApiRoute::ByFirstNameAndSurnamePrefix),
    ("/api/edicion/:year", ApiRoute::ByEditionYear),
];

fn route_table() -> &'static [(RoutePattern, ApiRoute)] {
    static TABLE: OnceLock<Vec<(RoutePattern, ApiRoute)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        ROUTES
            .iter()
            .map(|(pattern, route)| (RoutePattern::parse(pattern), *route))
            .collect()
    })
}

/// Find the first catalog endpoint matching `path`
pub fn match_api_route(path: &str) -> Option<(ApiRoute, PathParams)> {
    route_table()
        .iter()
        .find_map(|(pattern, route)| pattern.match_path(path).map(|params| (*route, params)))
}

/// Whether `path` is inside the API namespace, matched or not
pub fn is_api_path(path: &str) -> bool {
    path == API_PREFIX
        || path
            .strip_prefix(API_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// First value of `name` in a URL query string, form-decoded
///
/// A key given without `=` yields an empty value.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
