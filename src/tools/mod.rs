//! Tool operations.
//!
//! One [`Client`] method per exposed capability. Read operations translate a typed request into
//! a single upstream call and reshape the result; order-management operations additionally
//! require usable credentials and fail fast without them.
//!
//! ```no_run
//! use polymarket_mcp::{Client, Config};
//! use polymarket_mcp::config::Variant;
//! use polymarket_mcp::tools::types::request::MarketsRequest;
//!
//! # async fn example() -> polymarket_mcp::Result<()> {
//! let client = Client::new(Config::builder().variant(Variant::MarketData).build())?;
//!
//! let request = MarketsRequest::builder().active(true).limit(10).build();
//! let markets = client.get_markets(&request).await?;
//! println!("{}", markets.entities("markets").len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod types;

pub use client::Client;
