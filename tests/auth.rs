#![allow(
    clippy::unwrap_used,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]

mod common;

use futures::future::join_all;
use httpmock::MockServer;
use polymarket_mcp::auth::ExposeSecret as _;
use polymarket_mcp::error::Kind;
use reqwest::StatusCode;
use serde_json::json;

use crate::common::{
    ADDRESS, API_KEY, PASSPHRASE, POLY_ADDRESS, POLY_NONCE, POLY_SIGNATURE, POLY_TIMESTAMP,
    SECRET, authenticated_client, mock_create_api_key, trading_client,
};

#[tokio::test]
async fn credentials_should_be_derived_once_under_concurrency() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = authenticated_client(&server)?;
    let mock = mock_create_api_key(&server);

    let provider = client.executor().credentials();
    let results = join_all((0..8).map(|_| provider.credentials())).await;

    for result in results {
        let bundle = result?;
        assert_eq!(bundle.address.to_string().to_lowercase(), ADDRESS);
        assert_eq!(bundle.credentials.key(), API_KEY);
        assert_eq!(bundle.credentials.secret().expose_secret(), SECRET);
        assert_eq!(bundle.credentials.passphrase().expose_secret(), PASSPHRASE);
    }

    // Later calls hit the cache.
    provider.credentials().await?;

    mock.assert_calls(1);

    Ok(())
}

#[tokio::test]
async fn rejected_creation_should_fall_back_to_derive() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = authenticated_client(&server)?;

    let create = server.mock(|when, then| {
        when.method(httpmock::Method::POST).path("/auth/api-key");
        then.status(StatusCode::BAD_REQUEST)
            .json_body(json!({ "error": "key already exists" }));
    });
    let derive = server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path("/auth/derive-api-key")
            .header(POLY_ADDRESS, ADDRESS)
            .header(POLY_NONCE, "0")
            .header_exists(POLY_SIGNATURE)
            .header_exists(POLY_TIMESTAMP);
        then.status(StatusCode::OK).json_body(json!({
            "apiKey": API_KEY.to_string(),
            "passphrase": PASSPHRASE,
            "secret": SECRET
        }));
    });

    let bundle = client.executor().credentials().credentials().await?;
    assert_eq!(bundle.credentials.key(), API_KEY);

    create.assert_calls(1);
    derive.assert_calls(1);

    Ok(())
}

#[tokio::test]
async fn failed_derivation_should_not_be_cached() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = authenticated_client(&server)?;

    let mut create = server.mock(|when, then| {
        when.method(httpmock::Method::POST).path("/auth/api-key");
        then.status(StatusCode::INTERNAL_SERVER_ERROR);
    });
    let mut derive = server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/auth/derive-api-key");
        then.status(StatusCode::INTERNAL_SERVER_ERROR);
    });

    let err = client
        .executor()
        .credentials()
        .credentials()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::Status);

    create.delete();
    derive.delete();
    let mock = mock_create_api_key(&server);

    client.executor().credentials().credentials().await?;
    mock.assert_calls(1);

    Ok(())
}

#[tokio::test]
async fn credentials_without_key_should_be_configuration_error() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = trading_client(&server)?;

    let err = client
        .executor()
        .credentials()
        .credentials()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Kind::Configuration);

    Ok(())
}

#[tokio::test]
async fn signing_failure_should_send_unauthenticated_request() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = authenticated_client(&server)?;

    let create = server.mock(|when, then| {
        when.method(httpmock::Method::POST).path("/auth/api-key");
        then.status(StatusCode::UNAUTHORIZED);
    });
    let derive = server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/auth/derive-api-key");
        then.status(StatusCode::UNAUTHORIZED);
    });
    let account = server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path("/account")
            .header_missing(POLY_SIGNATURE);
        then.status(StatusCode::UNAUTHORIZED).body("missing auth");
    });

    let err = client.get_account_info().await.unwrap_err();
    assert_eq!(err.kind(), Kind::Status);

    create.assert();
    derive.assert();
    account.assert();

    Ok(())
}

#[test]
fn malformed_key_should_disable_authentication() -> anyhow::Result<()> {
    use polymarket_mcp::config::Variant;
    use polymarket_mcp::{Client, Config};

    let config = Config::builder()
        .variant(Variant::Trading)
        .api_url("http://localhost")
        .signing_key("not-a-key".to_owned())
        .build();
    let client = Client::new(config)?;

    assert!(!client.executor().credentials().can_sign());
    assert!(!client.authentication_available());

    Ok(())
}
