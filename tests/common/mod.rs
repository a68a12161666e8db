#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]
#![allow(
    unused,
    reason = "Deeply nested uses in sub-modules are falsely flagged as being unused"
)]

use httpmock::{Mock, MockServer};
use polymarket_mcp::config::Variant;
use polymarket_mcp::{Client, Config};
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

// publicly known private key
pub const PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const PASSPHRASE: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const SECRET: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

pub const POLY_ADDRESS: &str = "POLY_ADDRESS";
pub const POLY_API_KEY: &str = "POLY_API_KEY";
pub const POLY_NONCE: &str = "POLY_NONCE";
pub const POLY_PASSPHRASE: &str = "POLY_PASSPHRASE";
pub const POLY_SIGNATURE: &str = "POLY_SIGNATURE";
pub const POLY_TIMESTAMP: &str = "POLY_TIMESTAMP";

pub const API_KEY: Uuid = Uuid::nil();

pub fn market_data_client(server: &MockServer) -> anyhow::Result<Client> {
    let config = Config::builder()
        .variant(Variant::MarketData)
        .api_url(server.base_url())
        .build();

    Ok(Client::new(config)?)
}

/// Trading client without a signing key.
pub fn trading_client(server: &MockServer) -> anyhow::Result<Client> {
    let config = Config::builder()
        .variant(Variant::Trading)
        .api_url(server.base_url())
        .build();

    Ok(Client::new(config)?)
}

/// Trading client holding [`PRIVATE_KEY`]. Credentials are derived lazily on first use.
pub fn authenticated_client(server: &MockServer) -> anyhow::Result<Client> {
    let config = Config::builder()
        .variant(Variant::Trading)
        .api_url(server.base_url())
        .signing_key(PRIVATE_KEY.to_owned())
        .funding_id(ADDRESS)
        .build();

    Ok(Client::new(config)?)
}

/// Mocks a successful `POST /auth/api-key` signed with L1 headers.
pub fn mock_create_api_key(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/auth/api-key")
            .header(POLY_ADDRESS, ADDRESS)
            .header(POLY_NONCE, "0")
            .header_exists(POLY_SIGNATURE)
            .header_exists(POLY_TIMESTAMP);
        then.status(StatusCode::OK).json_body(json!({
            "apiKey": API_KEY.to_string(),
            "passphrase": PASSPHRASE,
            "secret": SECRET
        }));
    })
}
