use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::error::Error;

pub mod request;
pub mod response;

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// Only the exact upstream spellings are accepted.
impl FromStr for Side {
    type Err = Error;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(Error::validation("Side must be BUY or SELL")),
        }
    }
}

/// Deprecated scalar status filter, superseded by the `active`/`closed`/`archived` flags.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum MarketStatus {
    Open,
    Closed,
    Archived,
}

impl MarketStatus {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Some(MarketStatus::Open),
            "closed" => Some(MarketStatus::Closed),
            "archived" => Some(MarketStatus::Archived),
            _ => None,
        }
    }
}
