//! Package URL coordinates.
//!
//! Turns request URLs like `/@scope/name@1.0.0/lib/index.js?main=browser`
//! into structured coordinates and back:
//! - Validating query keys against a fixed allow-list
//! - Matching the pathname against the package path grammar
//! - Deriving JSONP rendering options from the query
//! - Rebuilding a canonical path from already-validated fields

pub mod path;
pub mod query;

use std::collections::BTreeMap;

use serde::Serialize;

pub use path::{match_package_path, PackagePath};
pub use query::{parse_query, query_is_valid, JsonpOpts, RECOGNIZED_QUERY_KEYS};

/// Version sentinel for URLs that name no version.
pub const LATEST_VERSION: &str = "latest";

/// The fully decomposed form of a package request URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageCoordinates {
    /// Raw path component of the URL, undecoded.
    pub pathname: String,
    /// Raw query string, verbatim, leading `?` included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Decoded query parameters (allow-listed keys only).
    pub query: BTreeMap<String, String>,
    /// JSONP rendering options, when the query requested a callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonp_opts: Option<JsonpOpts>,
    /// Package name, scope included (`@scope/name` or `name`).
    pub package_name: String,
    /// Requested version, or [`LATEST_VERSION`] when the URL names none.
    pub version: String,
    /// Path inside the package, leading `/` included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Parses a request URL (path, optional query, optional fragment) into
/// [`PackageCoordinates`].
///
/// Returns `None` when the query contains an unrecognized key or the
/// pathname does not match the package path grammar. Malformed input is
/// expected traffic, so there is no error value to inspect: the caller
/// treats `None` as an invalid request.
#[must_use]
pub fn parse_package_url(url: &str) -> Option<PackageCoordinates> {
    let url = match url.find('#') {
        Some(pos) => &url[..pos],
        None => url,
    };
    let (pathname, search) = match url.find('?') {
        Some(pos) => (&url[..pos], Some(&url[pos..])),
        None => (url, None),
    };

    let query = search.map_or_else(BTreeMap::new, |search| parse_query(&search[1..]));
    if !query_is_valid(&query) {
        return None;
    }

    let captures = match_package_path(pathname)?;
    let jsonp_opts = JsonpOpts::from_query(&query);

    Some(PackageCoordinates {
        pathname: pathname.to_string(),
        search: search.map(str::to_string),
        query,
        jsonp_opts,
        package_name: captures.package_name,
        version: captures
            .version
            .unwrap_or_else(|| LATEST_VERSION.to_string()),
        filename: captures.filename,
    })
}

/// Builds the canonical path `/{package_name}[@{version}][{filename}][{search}]`.
///
/// Pure string composition with no validation: inputs are trusted to come
/// from already-validated coordinates (this is the inverse of
/// [`parse_package_url`], used to re-derive redirect locations). An empty
/// `search` is treated as absent.
#[must_use]
pub fn create_package_url(
    package_name: &str,
    version: Option<&str>,
    filename: Option<&str>,
    search: Option<&str>,
) -> String {
    let mut pathname = format!("/{package_name}");

    if let Some(version) = version {
        pathname.push('@');
        pathname.push_str(version);
    }

    if let Some(filename) = filename {
        pathname.push_str(filename);
    }

    if let Some(search) = search.filter(|search| !search.is_empty()) {
        pathname.push_str(search);
    }

    pathname
}
