use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;
use tracing::warn;

use super::types::request::{
    CancelOrderRequest, CreateOrderRequest, EventByIdRequest, EventsRequest, HistoryRequest,
    MarketByIdRequest, MarketsRequest, OrderBookRequest, SearchRequest, TradesRequest,
    UserOrdersRequest,
};
use super::types::response::Listing;
use crate::{Result, path_segment};
use crate::config::{Config, ReadPolicy, Variant};
use crate::error::Error;
use crate::http::Executor;

/// Query for market-scoped endpoints where the market id lives in the path.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopedQuery<'a> {
    outcome_id: Option<&'a str>,
    limit: Option<i32>,
    resolution: Option<&'a str>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
struct PortfolioQuery<'a> {
    user: Option<&'a str>,
}

/// Client for every tool operation.
///
/// Cheap to clone; clones share the HTTP connection pool and the credential cache.
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: Config,
    executor: Executor,
}

impl Client {
    /// Creates a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid or the HTTP client cannot be created.
    pub fn new(config: Config) -> Result<Self> {
        let executor = Executor::new(&config)?;

        Ok(Self {
            inner: Arc::new(ClientInner { config, executor }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    #[must_use]
    pub fn executor(&self) -> &Executor {
        &self.inner.executor
    }

    /// Whether order-management operations can be attempted.
    #[must_use]
    pub fn authentication_available(&self) -> bool {
        self.config().variant().supports_auth()
            && self.inner.executor.credentials().is_available()
    }

    fn variant(&self) -> Variant {
        self.config().variant()
    }

    fn empty_listing(&self, key: &str) -> Listing {
        Listing::empty(self.config().list_shape(), key)
    }

    /// Applies the read policy to a read operation's outcome.
    async fn read<T, F>(&self, operation: &str, fallback: T, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match call.await {
            Ok(value) => Ok(value),
            Err(e) if self.config().read_policy() == ReadPolicy::FallbackToDefault => {
                warn!(operation, error = %e, "read failed, returning empty result");
                Ok(fallback)
            }
            Err(e) => Err(e),
        }
    }

    async fn list<Q: Serialize>(
        &self,
        endpoint: &str,
        query: &Q,
        key: &str,
        auth_required: bool,
    ) -> Result<Listing> {
        let response = self
            .inner
            .executor
            .get(endpoint, query, auth_required)
            .await?;

        Ok(Listing::from_response(
            self.config().list_shape(),
            key,
            response,
        ))
    }

    fn ensure_authenticated(&self) -> Result<()> {
        if self.authentication_available() {
            Ok(())
        } else {
            Err(Error::authentication_unavailable())
        }
    }

    /// Lists markets matching the filters.
    ///
    /// Tag filters are reduced to the highest-priority non-empty one. For the market-data
    /// variant a deprecated `status` is rewritten into the `active`/`closed`/`archived` flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and the read policy propagates failures.
    pub async fn get_markets(&self, request: &MarketsRequest) -> Result<Listing> {
        let request = request.clone().normalized(self.variant());

        self.read(
            "get_markets",
            self.empty_listing("markets"),
            self.list("markets", &request, "markets", false),
        )
        .await
    }

    /// Retrieves a single market.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and the read policy propagates failures.
    pub async fn get_market_by_id(&self, request: &MarketByIdRequest) -> Result<Value> {
        self.read(
            "get_market_by_id",
            Value::Object(Map::new()),
            async {
                let endpoint = format!("markets/{}", path_segment(&request.market_id)?);
                self.inner.executor.get(&endpoint, &(), false).await
            },
        )
        .await
    }

    /// Searches markets by text.
    ///
    /// The market-data API has no search endpoint, so the query is sent as a `slug` filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and the read policy propagates failures.
    pub async fn search_markets(&self, request: &SearchRequest) -> Result<Listing> {
        let fallback = self.empty_listing("markets");

        match self.variant() {
            Variant::Trading => {
                self.read(
                    "search_markets",
                    fallback,
                    self.list("markets/search", request, "markets", false),
                )
                .await
            }
            Variant::MarketData => {
                let query = MarketsRequest::builder()
                    .slug(vec![request.query.clone()])
                    .limit(request.limit)
                    .build();

                self.read(
                    "search_markets",
                    fallback,
                    self.list("markets", &query, "markets", false),
                )
                .await
            }
        }
    }

    /// Lists events matching the filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and the read policy propagates failures.
    pub async fn get_events(&self, request: &EventsRequest) -> Result<Listing> {
        let request = request.clone().normalized(self.variant());

        self.read(
            "get_events",
            self.empty_listing("events"),
            self.list("events", &request, "events", false),
        )
        .await
    }

    /// Retrieves a single event.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and the read policy propagates failures.
    pub async fn get_event_by_id(&self, request: &EventByIdRequest) -> Result<Value> {
        self.read(
            "get_event_by_id",
            Value::Object(Map::new()),
            async {
                let endpoint = format!("events/{}", path_segment(&request.event_id)?);
                self.inner.executor.get(&endpoint, &(), false).await
            },
        )
        .await
    }

    /// Retrieves the order book for a market, optionally narrowed to one outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and the read policy propagates failures.
    pub async fn get_order_book(&self, request: &OrderBookRequest) -> Result<Value> {
        let executor = &self.inner.executor;
        let call = async {
            match self.variant() {
                Variant::Trading => executor.get("orderbook", request, false).await,
                Variant::MarketData => {
                    let query = ScopedQuery {
                        outcome_id: request.outcome_id.as_deref(),
                        ..ScopedQuery::default()
                    };
                    let endpoint =
                        format!("markets/{}/orderbook", path_segment(&request.market_id)?);
                    executor.get(&endpoint, &query, false).await
                }
            }
        };

        self.read("get_order_book", Value::Object(Map::new()), call)
            .await
    }

    /// Lists the most recent trades for a market.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and the read policy propagates failures.
    pub async fn get_recent_trades(&self, request: &TradesRequest) -> Result<Listing> {
        let call = async {
            match self.variant() {
                Variant::Trading => self.list("trades", request, "trades", false).await,
                Variant::MarketData => {
                    let query = ScopedQuery {
                        limit: Some(request.limit),
                        ..ScopedQuery::default()
                    };
                    let endpoint =
                        format!("markets/{}/trades", path_segment(&request.market_id)?);
                    self.list(&endpoint, &query, "trades", false).await
                }
            }
        };

        self.read("get_recent_trades", self.empty_listing("trades"), call)
            .await
    }

    /// Retrieves the price history of a market at the requested resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and the read policy propagates failures.
    pub async fn get_market_history(&self, request: &HistoryRequest) -> Result<Listing> {
        let call = async {
            match self.variant() {
                Variant::Trading => {
                    self.list("markets/history", request, "history", false)
                        .await
                }
                Variant::MarketData => {
                    let query = ScopedQuery {
                        resolution: Some(&request.resolution),
                        ..ScopedQuery::default()
                    };
                    let endpoint =
                        format!("markets/{}/history", path_segment(&request.market_id)?);
                    self.list(&endpoint, &query, "history", false).await
                }
            }
        };

        self.read("get_market_history", self.empty_listing("history"), call)
            .await
    }

    /// Retrieves the authenticated account.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::AuthenticationUnavailable`] without any I/O when
    /// authentication is not available, or an error if the request fails.
    pub async fn get_account_info(&self) -> Result<Value> {
        self.ensure_authenticated()?;

        self.inner.executor.get("account", &(), true).await
    }

    /// Lists the authenticated user's orders.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::AuthenticationUnavailable`] without any I/O when
    /// authentication is not available, or an error if the request fails.
    pub async fn get_user_orders(&self, request: &UserOrdersRequest) -> Result<Listing> {
        self.ensure_authenticated()?;

        self.list("orders", request, "orders", true).await
    }

    /// Places an order.
    ///
    /// The body carries the caller's strings unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::AuthenticationUnavailable`] when authentication is not
    /// available and [`crate::error::Kind::Validation`] when the side, price or size is
    /// invalid, both without any I/O, or an error if the request fails.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Value> {
        self.ensure_authenticated()?;
        request.validate()?;

        self.inner.executor.post("orders", &(), request, true).await
    }

    /// Cancels an order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::AuthenticationUnavailable`] without any I/O when
    /// authentication is not available, or an error if the request fails.
    pub async fn cancel_order(&self, request: &CancelOrderRequest) -> Result<Value> {
        self.ensure_authenticated()?;

        self.inner
            .executor
            .post("orders/cancel", &(), request, true)
            .await
    }

    /// Lists the positions held by the configured funding account.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::AuthenticationUnavailable`] without any I/O when
    /// authentication is not available, or an error if the request fails.
    pub async fn get_portfolio(&self) -> Result<Listing> {
        self.ensure_authenticated()?;

        let query = PortfolioQuery {
            user: self.config().funding_id(),
        };

        self.list("portfolio", &query, "positions", true).await
    }
}
