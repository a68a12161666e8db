//! Tool catalog and name-based dispatch.

use serde::Serialize;
use serde_json::{Value, json};

use crate::Result;
use crate::config::Variant;
use crate::error::Error;
use crate::serde_helpers::deserialize_arguments;
use crate::tools::Client;

#[non_exhaustive]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl ToolDefinition {
    fn new(name: &'static str, description: &'static str, input_schema: Value) -> Self {
        Self {
            name,
            description,
            input_schema,
        }
    }
}

/// Tools that need credentials; only listed for variants that support authentication.
pub const ORDER_MANAGEMENT_TOOLS: [&str; 5] = [
    "get_account_info",
    "get_user_orders",
    "create_order",
    "cancel_order",
    "get_portfolio",
];

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn filter_properties(events: bool) -> Value {
    let mut properties = json!({
        "limit": { "type": "integer", "description": "Maximum number of results" },
        "offset": { "type": "integer", "description": "Number of results to skip" },
        "order": { "type": "string", "description": "Field to order by" },
        "ascending": { "type": "boolean" },
        "id": { "type": "array", "items": { "type": ["string", "integer"] } },
        "slug": { "type": "array", "items": { "type": "string" } },
        "tag": { "type": "string", "description": "Tag label; takes priority over tag_id and tag_slug" },
        "tag_id": { "type": ["string", "integer"], "description": "Tag id; takes priority over tag_slug" },
        "tag_slug": { "type": "string" },
        "related_tags": { "type": "boolean" },
        "active": { "type": "boolean" },
        "closed": { "type": "boolean" },
        "archived": { "type": "boolean" },
        "start_date_min": { "type": "string", "format": "date-time" },
        "start_date_max": { "type": "string", "format": "date-time" },
        "end_date_min": { "type": "string", "format": "date-time" },
        "end_date_max": { "type": "string", "format": "date-time" },
        "status": {
            "type": "string",
            "description": "Deprecated: open, closed or archived. Prefer active/closed/archived"
        }
    });

    let extra = if events {
        json!({
            "featured": { "type": "boolean" },
            "liquidity_min": { "type": "number" },
            "liquidity_max": { "type": "number" },
            "volume_min": { "type": "number" },
            "volume_max": { "type": "number" }
        })
    } else {
        json!({
            "clob_token_ids": { "type": "array", "items": { "type": "string" } },
            "condition_ids": { "type": "array", "items": { "type": "string" } },
            "liquidity_num_min": { "type": "number" },
            "liquidity_num_max": { "type": "number" },
            "volume_num_min": { "type": "number" },
            "volume_num_max": { "type": "number" }
        })
    };

    if let (Some(properties), Value::Object(extra)) = (properties.as_object_mut(), extra) {
        properties.extend(extra);
    }

    properties
}

/// The tools exposed for `variant`.
#[must_use]
pub fn tool_definitions(variant: Variant) -> Vec<ToolDefinition> {
    let id = json!({ "type": ["string", "integer"] });

    let mut tools = vec![
        ToolDefinition::new(
            "get_markets",
            "List prediction markets, optionally filtered",
            object(filter_properties(false), &[]),
        ),
        ToolDefinition::new(
            "get_market_by_id",
            "Get a single market by its id",
            object(json!({ "market_id": id }), &["market_id"]),
        ),
        ToolDefinition::new(
            "search_markets",
            "Search markets by text",
            object(
                json!({
                    "query": { "type": "string" },
                    "limit": { "type": "integer", "default": 20 }
                }),
                &["query"],
            ),
        ),
        ToolDefinition::new(
            "get_events",
            "List events, optionally filtered",
            object(filter_properties(true), &[]),
        ),
        ToolDefinition::new(
            "get_event_by_id",
            "Get a single event by its id",
            object(json!({ "event_id": id }), &["event_id"]),
        ),
        ToolDefinition::new(
            "get_order_book",
            "Get the order book of a market",
            object(
                json!({ "market_id": id, "outcome_id": id }),
                &["market_id"],
            ),
        ),
        ToolDefinition::new(
            "get_recent_trades",
            "List the most recent trades of a market",
            object(
                json!({
                    "market_id": id,
                    "limit": { "type": "integer", "default": 50 }
                }),
                &["market_id"],
            ),
        ),
        ToolDefinition::new(
            "get_market_history",
            "Get the price history of a market",
            object(
                json!({
                    "market_id": id,
                    "resolution": {
                        "type": "string",
                        "default": "hour",
                        "description": "Bucket size, e.g. hour, day or week"
                    }
                }),
                &["market_id"],
            ),
        ),
    ];

    if variant.supports_auth() {
        tools.extend([
            ToolDefinition::new(
                "get_account_info",
                "Get the authenticated account",
                object(json!({}), &[]),
            ),
            ToolDefinition::new(
                "get_user_orders",
                "List the authenticated user's orders",
                object(
                    json!({ "status": { "type": "string" }, "market_id": id }),
                    &[],
                ),
            ),
            ToolDefinition::new(
                "create_order",
                "Place an order",
                object(
                    json!({
                        "market_id": id,
                        "outcome_id": id,
                        "side": { "type": "string", "enum": ["BUY", "SELL"] },
                        "size": { "type": ["string", "number"], "description": "Positive order size" },
                        "price": { "type": ["string", "number"], "description": "Price between 0 and 1" }
                    }),
                    &["market_id", "outcome_id", "side", "size", "price"],
                ),
            ),
            ToolDefinition::new(
                "cancel_order",
                "Cancel an order",
                object(json!({ "order_id": id }), &["order_id"]),
            ),
            ToolDefinition::new(
                "get_portfolio",
                "List positions held by the configured account",
                object(json!({}), &[]),
            ),
        ]);
    }

    tools
}

/// Runs the tool `name` with JSON `arguments`.
///
/// # Errors
///
/// Returns a [`crate::error::Kind::Validation`] error for an unknown tool or malformed
/// arguments, otherwise the operation's error.
pub async fn call_tool(client: &Client, name: &str, arguments: Value) -> Result<Value> {
    tracing::debug!(tool = name, "calling tool");

    if ORDER_MANAGEMENT_TOOLS.contains(&name) && !client.authentication_available() {
        return Err(Error::authentication_unavailable());
    }

    let result = match name {
        "get_markets" => client
            .get_markets(&deserialize_arguments(arguments)?)
            .await?
            .into_value(),
        "get_market_by_id" => {
            client
                .get_market_by_id(&deserialize_arguments(arguments)?)
                .await?
        }
        "search_markets" => client
            .search_markets(&deserialize_arguments(arguments)?)
            .await?
            .into_value(),
        "get_events" => client
            .get_events(&deserialize_arguments(arguments)?)
            .await?
            .into_value(),
        "get_event_by_id" => {
            client
                .get_event_by_id(&deserialize_arguments(arguments)?)
                .await?
        }
        "get_order_book" => {
            client
                .get_order_book(&deserialize_arguments(arguments)?)
                .await?
        }
        "get_recent_trades" => client
            .get_recent_trades(&deserialize_arguments(arguments)?)
            .await?
            .into_value(),
        "get_market_history" => client
            .get_market_history(&deserialize_arguments(arguments)?)
            .await?
            .into_value(),
        "get_account_info" => client.get_account_info().await?,
        "get_user_orders" => client
            .get_user_orders(&deserialize_arguments(arguments)?)
            .await?
            .into_value(),
        "create_order" => {
            client
                .create_order(&deserialize_arguments(arguments)?)
                .await?
        }
        "cancel_order" => {
            client
                .cancel_order(&deserialize_arguments(arguments)?)
                .await?
        }
        "get_portfolio" => client.get_portfolio().await?.into_value(),
        other => return Err(Error::validation(format!("unknown tool: {other}"))),
    };

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use crate::error::Kind;

    #[test]
    fn market_data_should_hide_order_management() {
        let names: Vec<_> = tool_definitions(Variant::MarketData)
            .into_iter()
            .map(|tool| tool.name)
            .collect();

        assert_eq!(names.len(), 8);
        for name in ORDER_MANAGEMENT_TOOLS {
            assert!(!names.contains(&name), "{name} should be hidden");
        }
    }

    #[test]
    fn trading_should_list_every_tool() {
        let tools = tool_definitions(Variant::Trading);

        assert_eq!(tools.len(), 13);
        for tool in &tools {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        }
    }

    #[tokio::test]
    async fn unknown_tool_should_be_validation_error() -> anyhow::Result<()> {
        let client = Client::new(Config::builder().api_url("http://127.0.0.1:1").build())?;

        let err = call_tool(&client, "drop_tables", Value::Null)
            .await
            .expect_err("unknown tool");
        assert_eq!(err.kind(), Kind::Validation);

        Ok(())
    }

    #[tokio::test]
    async fn malformed_arguments_should_be_validation_error() -> anyhow::Result<()> {
        let client = Client::new(Config::builder().api_url("http://127.0.0.1:1").build())?;

        let err = call_tool(&client, "get_market_by_id", json!({ "id": "1" }))
            .await
            .expect_err("market_id is missing");
        assert_eq!(err.kind(), Kind::Validation);

        let err = call_tool(&client, "get_markets", json!({ "limit": "ten" }))
            .await
            .expect_err("limit must be an integer");
        assert_eq!(err.kind(), Kind::Validation);

        Ok(())
    }

    #[tokio::test]
    async fn order_tools_should_check_authentication_before_arguments() -> anyhow::Result<()> {
        let client = Client::new(Config::builder().api_url("http://127.0.0.1:1").build())?;

        let err = call_tool(&client, "create_order", json!({ "side": "HOLD" }))
            .await
            .expect_err("no signing key");
        assert_eq!(err.kind(), Kind::AuthenticationUnavailable);

        let err = call_tool(&client, "cancel_order", Value::Null)
            .await
            .expect_err("no signing key");
        assert_eq!(err.kind(), Kind::AuthenticationUnavailable);

        Ok(())
    }
}
