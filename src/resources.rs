//! URI-addressed read-only views over the tool operations.
//!
//! Each projection runs one operation with default parameters and renders the result as
//! indented JSON. Failures render as `Error: <message>` text rather than an error value.

use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::Result;
use crate::error::Error;
use crate::tools::Client;
use crate::tools::types::request::{
    EventByIdRequest, EventsRequest, MarketByIdRequest, MarketsRequest, OrderBookRequest,
    SearchRequest,
};

pub const SCHEME: &str = "polymarket://";
pub const MIME_TYPE: &str = "application/json";

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `polymarket://markets`
    Markets,
    /// `polymarket://events`
    Events,
    /// `polymarket://markets/{market_id}`
    Market(String),
    /// `polymarket://markets/{market_id}/orderbook`
    OrderBook(String),
    /// `polymarket://events/{event_id}`
    Event(String),
    /// `polymarket://search/{query}`
    Search(String),
}

impl Projection {
    /// Resolves a resource URI. Unknown URIs resolve to `None`.
    #[must_use]
    pub fn parse(uri: &str) -> Option<Self> {
        let path = uri.strip_prefix(SCHEME)?.trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').collect();

        let projection = match segments.as_slice() {
            ["markets"] => Projection::Markets,
            ["events"] => Projection::Events,
            ["markets", id] if !id.is_empty() => Projection::Market((*id).to_owned()),
            ["markets", id, "orderbook"] if !id.is_empty() => {
                Projection::OrderBook((*id).to_owned())
            }
            ["events", id] if !id.is_empty() => Projection::Event((*id).to_owned()),
            ["search", query] if !query.is_empty() => Projection::Search(decode(query)),
            _ => return None,
        };

        Some(projection)
    }

    /// Runs the backing operation.
    ///
    /// # Errors
    ///
    /// Returns the operation's error.
    pub async fn read(&self, client: &Client) -> Result<Value> {
        match self {
            Projection::Markets => client
                .get_markets(&MarketsRequest::default())
                .await
                .map(Value::from),
            Projection::Events => client
                .get_events(&EventsRequest::default())
                .await
                .map(Value::from),
            Projection::Market(id) => {
                client
                    .get_market_by_id(&MarketByIdRequest::builder().market_id(id).build())
                    .await
            }
            Projection::OrderBook(id) => {
                client
                    .get_order_book(&OrderBookRequest::builder().market_id(id).build())
                    .await
            }
            Projection::Event(id) => {
                client
                    .get_event_by_id(&EventByIdRequest::builder().event_id(id).build())
                    .await
            }
            Projection::Search(query) => client
                .search_markets(&SearchRequest::builder().query(query).build())
                .await
                .map(Value::from),
        }
    }

    /// Runs the backing operation and renders the outcome as text.
    pub async fn render(&self, client: &Client) -> String {
        let rendered = self
            .read(client)
            .await
            .and_then(|value| serde_json::to_string_pretty(&value).map_err(Error::from));

        rendered.unwrap_or_else(|e| {
            tracing::warn!(projection = ?self, error = %e, "resource read failed");
            format!("Error: {e}")
        })
    }
}

/// Percent-decodes a single path segment (`+` is read as a space).
fn decode(segment: &str) -> String {
    form_urlencoded::parse(format!("q={segment}").as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

/// Resolves and renders `uri`, or `None` when no projection matches.
pub async fn read_resource(client: &Client, uri: &str) -> Option<String> {
    let projection = Projection::parse(uri)?;
    Some(projection.render(client).await)
}

#[non_exhaustive]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

#[non_exhaustive]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub uri_template: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

/// Fixed resources.
#[must_use]
pub fn resources() -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor {
            uri: "polymarket://markets",
            name: "markets",
            description: "All markets, unfiltered",
            mime_type: MIME_TYPE,
        },
        ResourceDescriptor {
            uri: "polymarket://events",
            name: "events",
            description: "All events, unfiltered",
            mime_type: MIME_TYPE,
        },
    ]
}

/// Parameterized resources.
#[must_use]
pub fn templates() -> Vec<TemplateDescriptor> {
    vec![
        TemplateDescriptor {
            uri_template: "polymarket://markets/{market_id}",
            name: "market",
            description: "A single market by id",
            mime_type: MIME_TYPE,
        },
        TemplateDescriptor {
            uri_template: "polymarket://markets/{market_id}/orderbook",
            name: "orderbook",
            description: "The order book of a market",
            mime_type: MIME_TYPE,
        },
        TemplateDescriptor {
            uri_template: "polymarket://events/{event_id}",
            name: "event",
            description: "A single event by id",
            mime_type: MIME_TYPE,
        },
        TemplateDescriptor {
            uri_template: "polymarket://search/{query}",
            name: "search",
            description: "Markets matching a search query",
            mime_type: MIME_TYPE,
        },
    ]
}
