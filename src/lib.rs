#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod resources;
mod serde_helpers;
pub mod server;
pub mod tools;
pub mod types;

use reqwest::Request;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use crate::config::Config;
pub use crate::tools::Client;
use crate::error::Error;
use crate::types::ChainId;

pub type Result<T> = std::result::Result<T, Error>;

/// [`ChainId`] for Polygon mainnet
pub const POLYGON: ChainId = 137;

/// [`ChainId`] for Polygon testnet <https://polygon.technology/blog/introducing-the-amoy-testnet-for-polygon-pos>
pub const AMOY: ChainId = 80002;

pub const PRIVATE_KEY_VAR: &str = "POLYMARKET_PRIVATE_KEY";

/// Timestamp in seconds since [`std::time::UNIX_EPOCH`]
pub(crate) type Timestamp = i64;

/// Joins `endpoint` onto `base` with exactly one separating slash.
pub(crate) fn endpoint_url(base: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Percent-encodes a caller-supplied identifier so it occupies exactly one path segment.
///
/// `/`, `?`, `#` and `%` are escaped. Empty and dot-only identifiers are rejected since they
/// would address a different resource.
pub(crate) fn path_segment(id: &str) -> Result<String> {
    if matches!(id, "" | "." | "..") {
        return Err(Error::validation(format!("invalid identifier: {id:?}")));
    }

    // `byte_serialize` writes spaces as `+` and escapes literal `+` as `%2B`.
    Ok(url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20"))
}

/// Trait for converting request types to URL query parameters.
///
/// This trait is automatically implemented for all types that implement [`Serialize`].
/// It uses [`serde_html_form`] to serialize the struct fields into a query string.
/// Arrays are serialized as repeated keys (`key=val1&key=val2`).
pub trait ToQueryParams: Serialize {
    /// Converts the request to a URL query string.
    ///
    /// Returns an empty string if no parameters are set, otherwise returns
    /// a string starting with `?` followed by URL-encoded key-value pairs.
    fn query_params(&self) -> String {
        let params = serde_html_form::to_string(self)
            .inspect_err(|e| tracing::error!("Unable to convert to URL-encoded string {e:?}"))
            .unwrap_or_default();

        if params.is_empty() {
            String::new()
        } else {
            format!("?{params}")
        }
    }
}

impl<T: Serialize> ToQueryParams for T {}

#[tracing::instrument(
    level = "debug",
    skip(client, request, headers),
    fields(
        method = %request.method(),
        path = request.url().path(),
        status_code
    )
)]
async fn request<Response: DeserializeOwned>(
    client: &reqwest::Client,
    mut request: Request,
    headers: Option<HeaderMap>,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    if let Some(h) = headers {
        request.headers_mut().extend(h);
    }

    let response = client.execute(request).await.inspect_err(|e| {
        tracing::error!(method = %method, path = %path, error = %e, "API request failed to send");
    })?;
    let status_code = response.status();

    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();

        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    Ok(response.json::<Response>().await?)
}
