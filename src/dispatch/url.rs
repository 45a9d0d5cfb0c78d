//! URL construction for the server's REST API

use reqwest::Url;

use crate::common::{Error, Result};
use crate::table::RequestDescriptor;

/// Placeholder shown by `show` where the resolved endpoint will go
pub const ENDPOINT_PLACEHOLDER: &str = "{endpoint}";

/// The placeholder as it appears in a path segment
const ENCODED_PLACEHOLDER: &str = "%7Bendpoint%7D";

/// Parse and validate a base URL, dropping any trailing slash
pub fn normalize_base_url(base_url: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let mut parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if parsed.query().is_some() {
        return Err(invalid("query strings are not allowed".to_string()));
    }
    if parsed.fragment().is_some() {
        return Err(invalid("fragments are not allowed".to_string()));
    }

    parsed
        .path_segments_mut()
        .map_err(|_| invalid("not a hierarchical URL".to_string()))?
        .pop_if_empty();

    Ok(parsed)
}

/// Append path segments to the base, percent-encoding each one
fn join<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    // http(s) URLs always have path segments
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// `{base}/clients`
pub fn clients_url(base: &Url) -> String {
    join(base, ["clients"]).into()
}

/// `{base}/clients/{endpoint}{path}?format={format}`
///
/// The endpoint is a single percent-encoded segment. A path without a
/// leading slash gets one. When the path already has a query the format is
/// appended with `&`. No format parameter is added for `ContentFormat::None`.
pub fn operation_url(base: &Url, endpoint: &str, descriptor: &RequestDescriptor) -> String {
    let path = descriptor.path.trim();
    let (path, query) = match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    };

    let resource = path.strip_prefix('/').unwrap_or(path).split('/');
    let mut url = join(base, ["clients", endpoint].into_iter().chain(resource));

    url.set_query(query);
    if let Some(format) = descriptor.format.query_value() {
        url.query_pairs_mut().append_pair("format", format);
    }

    url.into()
}

/// The operation URL with `{endpoint}` in place of a real endpoint
pub fn operation_template(base: &Url, descriptor: &RequestDescriptor) -> String {
    let clients = clients_url(base);
    operation_url(base, ENDPOINT_PLACEHOLDER, descriptor).replacen(
        &format!("{}/{}", clients, ENCODED_PLACEHOLDER),
        &format!("{}/{}", clients, ENDPOINT_PLACEHOLDER),
        1,
    )
}
