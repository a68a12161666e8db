#![allow(
    clippy::unwrap_used,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]

//! End-to-end tests through the MCP surface: JSON-RPC lines in, JSON-RPC lines out.

pub mod common;

use httpmock::{Method::GET, Method::POST, MockServer};
use polymarket_mcp::server::Server;
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::common::{
    authenticated_client, market_data_client, mock_create_api_key, trading_client,
};

async fn call(server: &Server, message: Value) -> anyhow::Result<Value> {
    let line = server
        .handle_message(&message.to_string())
        .await
        .ok_or_else(|| anyhow::anyhow!("expected a response"))?;

    Ok(serde_json::from_str(&line)?)
}

fn text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

mod tools {
    use super::*;

    #[tokio::test]
    async fn tools_call_should_return_pretty_json() -> anyhow::Result<()> {
        let mock_server = MockServer::start();
        let server = Server::new(market_data_client(&mock_server)?);

        let mock = mock_server.mock(|when, then| {
            when.method(GET)
                .path("/markets")
                .query_param("limit", "2")
                .query_param("tag_id", "7");
            then.status(StatusCode::OK)
                .json_body(json!({ "markets": [{ "id": "1" }] }));
        });

        let response = call(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": {
                    "name": "get_markets",
                    "arguments": { "limit": 2, "tag_id": 7 }
                }
            }),
        )
        .await?;

        assert_eq!(response["result"]["isError"], false);
        let body: Value = serde_json::from_str(text(&response))?;
        assert_eq!(body, json!({ "markets": [{ "id": "1" }] }));
        assert!(text(&response).contains('\n'), "should be indented");
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn numeric_order_amounts_should_keep_their_literal() -> anyhow::Result<()> {
        let mock_server = MockServer::start();
        let server = Server::new(authenticated_client(&mock_server)?);
        let _api_key = mock_create_api_key(&mock_server);

        let mock = mock_server.mock(|when, then| {
            when.method(POST).path("/orders").json_body(json!({
                "marketId": "m",
                "outcomeId": "o",
                "side": "BUY",
                "size": "1.0",
                "price": "0.5"
            }));
            then.status(StatusCode::OK).json_body(json!({ "orderId": "x" }));
        });

        let response = call(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {
                    "name": "create_order",
                    "arguments": {
                        "market_id": "m",
                        "outcome_id": "o",
                        "side": "BUY",
                        "size": 1.0,
                        "price": 0.5
                    }
                }
            }),
        )
        .await?;

        assert_eq!(response["result"]["isError"], false, "{}", text(&response));
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn order_tools_without_key_should_report_missing_authentication() -> anyhow::Result<()> {
        let mock_server = MockServer::start();
        let server = Server::new(trading_client(&mock_server)?);

        let response = call(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": { "name": "create_order", "arguments": { "side": "HOLD" } }
            }),
        )
        .await?;

        assert_eq!(response["result"]["isError"], true);
        assert!(text(&response).contains("POLYMARKET_PRIVATE_KEY"), "{}", text(&response));

        Ok(())
    }

    #[tokio::test]
    async fn invalid_arguments_should_be_tool_error_without_io() -> anyhow::Result<()> {
        let mock_server = MockServer::start();
        let server = Server::new(trading_client(&mock_server)?);

        let any = mock_server.mock(|when, then| {
            when.any_request();
            then.status(StatusCode::OK).json_body(json!({}));
        });

        let response = call(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": { "name": "get_order_book", "arguments": { "outcome_id": "yes" } }
            }),
        )
        .await?;

        assert_eq!(response["result"]["isError"], true);
        assert!(text(&response).contains("market_id"), "{}", text(&response));
        any.assert_calls(0);

        Ok(())
    }

    #[tokio::test]
    async fn upstream_failure_should_be_tool_error_in_trading() -> anyhow::Result<()> {
        let mock_server = MockServer::start();
        let server = Server::new(trading_client(&mock_server)?);

        let mock = mock_server.mock(|when, then| {
            when.method(GET).path("/markets/42");
            then.status(StatusCode::NOT_FOUND).body("market not found");
        });

        let response = call(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": { "name": "get_market_by_id", "arguments": { "market_id": 42 } }
            }),
        )
        .await?;

        assert_eq!(response["result"]["isError"], true);
        assert!(text(&response).contains("market not found"), "{}", text(&response));
        mock.assert();

        Ok(())
    }
}

mod resources {
    use super::*;

    async fn read(server: &Server, uri: &str) -> anyhow::Result<Value> {
        call(
            server,
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "resources/read",
                "params": { "uri": uri }
            }),
        )
        .await
    }

    fn contents(response: &Value) -> &str {
        response["result"]["contents"][0]["text"].as_str().unwrap()
    }

    #[tokio::test]
    async fn markets_resource_should_render_unfiltered_listing() -> anyhow::Result<()> {
        let mock_server = MockServer::start();
        let server = Server::new(market_data_client(&mock_server)?);

        let mock = mock_server.mock(|when, then| {
            when.method(GET)
                .path("/markets")
                .is_true(|req| req.query_params().is_empty());
            then.status(StatusCode::OK)
                .json_body(json!({ "markets": [{ "id": "1" }] }));
        });

        let response = read(&server, "polymarket://markets").await?;

        assert_eq!(response["result"]["contents"][0]["uri"], "polymarket://markets");
        assert_eq!(
            response["result"]["contents"][0]["mimeType"],
            "application/json"
        );
        assert_eq!(
            contents(&response),
            serde_json::to_string_pretty(&json!({ "markets": [{ "id": "1" }] }))?
        );
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn order_book_resource_should_use_market_path() -> anyhow::Result<()> {
        let mock_server = MockServer::start();
        let server = Server::new(market_data_client(&mock_server)?);

        let mock = mock_server.mock(|when, then| {
            when.method(GET).path("/markets/123/orderbook");
            then.status(StatusCode::OK).json_body(json!({ "bids": [[0.4, 10]] }));
        });

        let response = read(&server, "polymarket://markets/123/orderbook").await?;

        let book: Value = serde_json::from_str(contents(&response))?;
        assert_eq!(book, json!({ "bids": [[0.4, 10]] }));
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn search_resource_should_decode_query() -> anyhow::Result<()> {
        let mock_server = MockServer::start();
        let server = Server::new(trading_client(&mock_server)?);

        let mock = mock_server.mock(|when, then| {
            when.method(GET)
                .path("/markets/search")
                .query_param("q", "bitcoin price")
                .query_param("limit", "20");
            then.status(StatusCode::OK)
                .json_body(json!({ "markets": [{ "id": "9" }] }));
        });

        let response = read(&server, "polymarket://search/bitcoin%20price").await?;

        let markets: Value = serde_json::from_str(contents(&response))?;
        assert_eq!(markets, json!([{ "id": "9" }]));
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn failing_resource_should_render_error_text() -> anyhow::Result<()> {
        let mock_server = MockServer::start();
        let server = Server::new(trading_client(&mock_server)?);

        let mock = mock_server.mock(|when, then| {
            when.method(GET).path("/events/456");
            then.status(StatusCode::INTERNAL_SERVER_ERROR).body("boom");
        });

        let response = read(&server, "polymarket://events/456").await?;

        assert!(response["error"].is_null());
        assert!(contents(&response).starts_with("Error: "), "{}", contents(&response));
        assert!(contents(&response).contains("boom"));
        mock.assert();

        Ok(())
    }
}
