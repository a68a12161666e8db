//! Process-wide configuration.
//!
//! A [`Config`] is resolved once at startup, either programmatically through
//! [`Config::builder`] or from the environment through [`Config::from_env`], and
//! is never mutated afterwards. Resolution never fails: missing or unparseable
//! values fall back to their documented defaults.

use std::env;
use std::fmt;

use bon::Builder;
use secrecy::SecretString;
use tracing::warn;

use crate::POLYGON;
use crate::types::ChainId;

pub const API_URL_VAR: &str = "POLYMARKET_API_URL";
pub const API_VARIANT_VAR: &str = "POLYMARKET_API_VARIANT";
pub const CHAIN_ID_VAR: &str = "POLYMARKET_CHAIN_ID";
pub const FUNDER_VAR: &str = "POLYMARKET_FUNDER";
pub const USE_AUTH_VAR: &str = "POLYMARKET_USE_AUTH";
pub const AUTH_REQUIRED_VAR: &str = "POLYMARKET_AUTH_REQUIRED";

pub const DEFAULT_TRADING_URL: &str = "https://clob.polymarket.com";
pub const DEFAULT_MARKET_DATA_URL: &str = "https://gamma-api.polymarket.com";

/// Which upstream deployment this server fronts.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum_macros::Display)]
pub enum Variant {
    /// The trading API. Supports authenticated order management.
    #[default]
    #[strum(serialize = "trading")]
    Trading,
    /// The read-only market data API. Never authenticates.
    #[strum(serialize = "market-data")]
    MarketData,
}

impl Variant {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trading" | "clob" => Some(Variant::Trading),
            "market-data" | "market_data" | "gamma" => Some(Variant::MarketData),
            _ => None,
        }
    }

    #[must_use]
    pub fn default_url(self) -> &'static str {
        match self {
            Variant::Trading => DEFAULT_TRADING_URL,
            Variant::MarketData => DEFAULT_MARKET_DATA_URL,
        }
    }

    #[must_use]
    pub fn supports_auth(self) -> bool {
        matches!(self, Variant::Trading)
    }

    #[must_use]
    pub fn list_shape(self) -> ListShape {
        match self {
            Variant::Trading => ListShape::Bare,
            Variant::MarketData => ListShape::Envelope,
        }
    }

    #[must_use]
    pub fn read_policy(self) -> ReadPolicy {
        match self {
            Variant::Trading => ReadPolicy::Propagate,
            Variant::MarketData => ReadPolicy::FallbackToDefault,
        }
    }
}

/// Shape returned by list-style operations.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListShape {
    /// The entity sequence, unwrapped from its container key.
    Bare,
    /// The upstream object, passed through with its container key.
    Envelope,
}

/// What read operations do when the upstream call fails.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Return the error to the caller.
    Propagate,
    /// Log the error and return the empty value of the declared shape.
    FallbackToDefault,
}

#[derive(Clone, Builder)]
pub struct Config {
    #[builder(default)]
    variant: Variant,
    /// Upstream base URL. Defaults to [`Variant::default_url`].
    #[builder(into)]
    api_url: Option<String>,
    #[builder(default = POLYGON)]
    chain_id: ChainId,
    /// Hex-encoded private key used to derive API credentials.
    #[builder(into)]
    signing_key: Option<SecretString>,
    /// Funding wallet or account identifier, forwarded where the upstream scopes data by user.
    #[builder(into)]
    funding_id: Option<String>,
    #[builder(default = true)]
    auth_enabled: bool,
    /// Whether the deployment expects credentials to be present. Only consulted at startup.
    #[builder(default)]
    auth_required: bool,
    list_shape: Option<ListShape>,
    read_policy: Option<ReadPolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("variant", &self.variant)
            .field("api_url", &self.api_url())
            .field("chain_id", &self.chain_id)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "[REDACTED]"))
            .field("funding_id", &self.funding_id)
            .field("auth_enabled", &self.auth_enabled)
            .field("auth_required", &self.auth_required)
            .field("list_shape", &self.list_shape())
            .field("read_policy", &self.read_policy())
            .finish()
    }
}

impl Config {
    /// Resolves the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves the configuration through `lookup`, which maps a variable name to its value.
    /// Empty values are treated as unset.
    #[must_use]
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let variant = get(API_VARIANT_VAR)
            .and_then(|value| {
                let variant = Variant::parse(&value);
                if variant.is_none() {
                    warn!(%value, "unknown {API_VARIANT_VAR}, using the default variant");
                }
                variant
            })
            .unwrap_or_default();

        let chain_id = get(CHAIN_ID_VAR)
            .and_then(|value| {
                let chain_id = value.trim().parse::<ChainId>().ok();
                if chain_id.is_none() {
                    warn!(%value, "invalid {CHAIN_ID_VAR}, using {POLYGON}");
                }
                chain_id
            })
            .unwrap_or(POLYGON);

        Config {
            variant,
            api_url: get(API_URL_VAR),
            chain_id,
            signing_key: get(crate::PRIVATE_KEY_VAR).map(SecretString::from),
            funding_id: get(FUNDER_VAR),
            auth_enabled: get(USE_AUTH_VAR).is_none_or(|value| parse_flag(&value)),
            auth_required: get(AUTH_REQUIRED_VAR).is_some_and(|value| parse_flag(&value)),
            list_shape: None,
            read_policy: None,
        }
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or_else(|| self.variant.default_url())
    }

    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    #[must_use]
    pub fn signing_key(&self) -> Option<&SecretString> {
        self.signing_key.as_ref()
    }

    #[must_use]
    pub fn funding_id(&self) -> Option<&str> {
        self.funding_id.as_deref()
    }

    /// Whether authenticated calls should carry signed headers. Always `false` for
    /// [`Variant::MarketData`].
    #[must_use]
    pub fn auth_enabled(&self) -> bool {
        self.auth_enabled && self.variant.supports_auth()
    }

    #[must_use]
    pub fn auth_required(&self) -> bool {
        self.auth_required
    }

    #[must_use]
    pub fn list_shape(&self) -> ListShape {
        self.list_shape.unwrap_or_else(|| self.variant.list_shape())
    }

    #[must_use]
    pub fn read_policy(&self) -> ReadPolicy {
        self.read_policy
            .unwrap_or_else(|| self.variant.read_policy())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
