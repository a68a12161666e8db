#![allow(
    clippy::module_name_repetitions,
    reason = "Request suffix is intentional for clarity"
)]

use std::num::FpCategory;
use std::str::FromStr;

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none};

use crate::Result;
use crate::config::Variant;
use crate::error::Error;
use crate::serde_helpers::StringFromAny;
use crate::tools::types::{MarketStatus, Side};
use crate::types::Decimal;

pub const DEFAULT_SEARCH_LIMIT: i32 = 20;
pub const DEFAULT_TRADES_LIMIT: i32 = 50;
pub const DEFAULT_RESOLUTION: &str = "hour";

fn default_search_limit() -> i32 {
    DEFAULT_SEARCH_LIMIT
}

fn default_trades_limit() -> i32 {
    DEFAULT_TRADES_LIMIT
}

fn default_resolution() -> String {
    DEFAULT_RESOLUTION.to_owned()
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Default, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct MarketsRequest {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
    #[builder(into)]
    pub order: Option<String>,
    pub ascending: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde_as(deserialize_as = "Vec<StringFromAny>")]
    #[builder(default)]
    pub id: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub slug: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub clob_token_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub condition_ids: Vec<String>,
    #[builder(into)]
    pub tag: Option<String>,
    #[serde_as(deserialize_as = "Option<StringFromAny>")]
    #[builder(into)]
    pub tag_id: Option<String>,
    #[builder(into)]
    pub tag_slug: Option<String>,
    pub related_tags: Option<bool>,
    pub active: Option<bool>,
    pub closed: Option<bool>,
    pub archived: Option<bool>,
    pub liquidity_num_min: Option<Decimal>,
    pub liquidity_num_max: Option<Decimal>,
    pub volume_num_min: Option<Decimal>,
    pub volume_num_max: Option<Decimal>,
    pub start_date_min: Option<DateTime<Utc>>,
    pub start_date_max: Option<DateTime<Utc>>,
    pub end_date_min: Option<DateTime<Utc>>,
    pub end_date_max: Option<DateTime<Utc>>,
    /// Deprecated: use `active`, `closed` or `archived`.
    #[builder(into)]
    pub status: Option<String>,
}

impl MarketsRequest {
    /// Applies tag priority and, for the market-data variant, rewrites `status` into flags.
    #[must_use]
    pub fn normalized(mut self, variant: Variant) -> Self {
        (self.tag, self.tag_id, self.tag_slug) =
            resolve_tag(self.tag.take(), self.tag_id.take(), self.tag_slug.take());

        if variant == Variant::MarketData {
            apply_status(
                self.status.take(),
                &mut self.active,
                &mut self.closed,
                &mut self.archived,
            );
        }

        self
    }
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Default, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct EventsRequest {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
    #[builder(into)]
    pub order: Option<String>,
    pub ascending: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde_as(deserialize_as = "Vec<StringFromAny>")]
    #[builder(default)]
    pub id: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub slug: Vec<String>,
    #[builder(into)]
    pub tag: Option<String>,
    #[serde_as(deserialize_as = "Option<StringFromAny>")]
    #[builder(into)]
    pub tag_id: Option<String>,
    #[builder(into)]
    pub tag_slug: Option<String>,
    pub related_tags: Option<bool>,
    pub active: Option<bool>,
    pub closed: Option<bool>,
    pub archived: Option<bool>,
    pub featured: Option<bool>,
    pub liquidity_min: Option<Decimal>,
    pub liquidity_max: Option<Decimal>,
    pub volume_min: Option<Decimal>,
    pub volume_max: Option<Decimal>,
    pub start_date_min: Option<DateTime<Utc>>,
    pub start_date_max: Option<DateTime<Utc>>,
    pub end_date_min: Option<DateTime<Utc>>,
    pub end_date_max: Option<DateTime<Utc>>,
    /// Deprecated: use `active`, `closed` or `archived`.
    #[builder(into)]
    pub status: Option<String>,
}

impl EventsRequest {
    /// Applies tag priority and, for the market-data variant, rewrites `status` into flags.
    #[must_use]
    pub fn normalized(mut self, variant: Variant) -> Self {
        (self.tag, self.tag_id, self.tag_slug) =
            resolve_tag(self.tag.take(), self.tag_id.take(), self.tag_slug.take());

        if variant == Variant::MarketData {
            apply_status(
                self.status.take(),
                &mut self.active,
                &mut self.closed,
                &mut self.archived,
            );
        }

        self
    }
}

#[serde_as]
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[non_exhaustive]
pub struct MarketByIdRequest {
    #[serde(skip_serializing)]
    #[serde_as(deserialize_as = "StringFromAny")]
    #[builder(into)]
    pub market_id: String,
}

#[serde_as]
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[non_exhaustive]
pub struct EventByIdRequest {
    #[serde(skip_serializing)]
    #[serde_as(deserialize_as = "StringFromAny")]
    #[builder(into)]
    pub event_id: String,
}

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SearchRequest {
    #[serde(rename(serialize = "q"))]
    #[builder(into)]
    pub query: String,
    #[serde(default = "default_search_limit")]
    #[builder(default = DEFAULT_SEARCH_LIMIT)]
    pub limit: i32,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
#[non_exhaustive]
pub struct OrderBookRequest {
    #[serde_as(deserialize_as = "StringFromAny")]
    #[builder(into)]
    pub market_id: String,
    #[serde_as(deserialize_as = "Option<StringFromAny>")]
    #[builder(into)]
    pub outcome_id: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
#[non_exhaustive]
pub struct TradesRequest {
    #[serde_as(deserialize_as = "StringFromAny")]
    #[builder(into)]
    pub market_id: String,
    #[serde(default = "default_trades_limit")]
    #[builder(default = DEFAULT_TRADES_LIMIT)]
    pub limit: i32,
}

#[serde_as]
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
#[non_exhaustive]
pub struct HistoryRequest {
    #[serde_as(deserialize_as = "StringFromAny")]
    #[builder(into)]
    pub market_id: String,
    /// Bucket size such as `hour`, `day` or `week`.
    #[serde(default = "default_resolution")]
    #[builder(into, default = default_resolution())]
    pub resolution: String,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Default, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
#[non_exhaustive]
pub struct UserOrdersRequest {
    #[builder(into)]
    pub status: Option<String>,
    #[serde_as(deserialize_as = "Option<StringFromAny>")]
    #[builder(into)]
    pub market_id: Option<String>,
}

/// Order placement input. Values are forwarded exactly as given once they validate.
#[serde_as]
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
#[non_exhaustive]
pub struct CreateOrderRequest {
    #[serde_as(deserialize_as = "StringFromAny")]
    #[builder(into)]
    pub market_id: String,
    #[serde_as(deserialize_as = "StringFromAny")]
    #[builder(into)]
    pub outcome_id: String,
    #[builder(into)]
    pub side: String,
    #[serde_as(deserialize_as = "StringFromAny")]
    #[builder(into)]
    pub size: String,
    #[serde_as(deserialize_as = "StringFromAny")]
    #[builder(into)]
    pub price: String,
}

impl CreateOrderRequest {
    /// Checks, in order, that the side is `BUY` or `SELL`, the price lies in `[0, 1]` and the
    /// size is positive.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::Validation`] error describing the first failed check.
    pub fn validate(&self) -> Result<Side> {
        let side = Side::from_str(&self.side)?;

        let price = Amount::parse(&self.price)
            .ok_or_else(|| Error::validation(format!("Invalid price format: {}", self.price)))?;
        if !price.is_unit_interval() {
            return Err(Error::validation("Price must be between 0 and 1"));
        }

        let size = Amount::parse(&self.size)
            .ok_or_else(|| Error::validation(format!("Invalid size format: {}", self.size)))?;
        if !size.is_positive() {
            return Err(Error::validation("Size must be positive"));
        }

        Ok(side)
    }
}

#[serde_as]
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
#[non_exhaustive]
pub struct CancelOrderRequest {
    #[serde_as(deserialize_as = "StringFromAny")]
    #[builder(into)]
    pub order_id: String,
}

/// A numeric order amount, checked but never forwarded.
///
/// Values are compared exactly as [`Decimal`] where it can hold them. Magnitudes or precision
/// beyond its 28 digits fall back to a finite `f64`.
#[derive(Debug, Clone, Copy)]
enum Amount {
    Exact(Decimal),
    Approximate(f64),
}

impl Amount {
    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let approximate = value.parse::<f64>().ok().filter(|v| v.is_finite());

        match Decimal::from_str(value).or_else(|_| Decimal::from_scientific(value)) {
            // Digits past the 28th round away; a nonzero input must not collapse to zero.
            Ok(exact)
                if !exact.is_zero() || approximate.is_none_or(|v| v.classify() == FpCategory::Zero) =>
            {
                Some(Self::Exact(exact))
            }
            _ => approximate.map(Self::Approximate),
        }
    }

    fn is_positive(self) -> bool {
        match self {
            Self::Exact(value) => value > Decimal::ZERO,
            Self::Approximate(value) => value > 0.0,
        }
    }

    fn is_unit_interval(self) -> bool {
        match self {
            Self::Exact(value) => (Decimal::ZERO..=Decimal::ONE).contains(&value),
            Self::Approximate(value) => (0.0..=1.0).contains(&value),
        }
    }
}

/// First non-empty of `tag`, `tag_id`, `tag_slug` wins; the others are cleared.
fn resolve_tag(
    tag: Option<String>,
    tag_id: Option<String>,
    tag_slug: Option<String>,
) -> (Option<String>, Option<String>, Option<String>) {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    match (non_empty(tag), non_empty(tag_id), non_empty(tag_slug)) {
        (Some(tag), _, _) => (Some(tag), None, None),
        (None, Some(tag_id), _) => (None, Some(tag_id), None),
        (None, None, tag_slug) => (None, None, tag_slug),
    }
}

fn apply_status(
    status: Option<String>,
    active: &mut Option<bool>,
    closed: &mut Option<bool>,
    archived: &mut Option<bool>,
) {
    let Some(status) = status else {
        return;
    };

    match MarketStatus::parse(&status) {
        Some(MarketStatus::Open) => *active = Some(true),
        Some(MarketStatus::Closed) => *closed = Some(true),
        Some(MarketStatus::Archived) => *archived = Some(true),
        None => tracing::warn!(status = %status, "ignoring unrecognized status filter"),
    }
}
