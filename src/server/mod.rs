//! MCP (Model Context Protocol) server.
//!
//! JSON-RPC 2.0 over line-delimited stdio: one request per line in, one response per line out.
//! Notifications are processed without a response.

pub mod protocol;
pub mod tools;

use serde_json::{Value, json};

use self::protocol::{
    McpRequest, McpResponse, ReadResourceParams, ResourceContents, RpcError, ToolCallParams,
    ToolCallResult, codes, methods,
};
use crate::resources;
use crate::tools::Client;

/// Protocol version supported by this server
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported during initialization
pub const SERVER_NAME: &str = "Polymarket MCP";

/// Server version (same as crate version)
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone, Debug)]
pub struct Server {
    client: Client,
}

impl Server {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Handles one raw protocol line, returning the serialized response if one is due.
    pub async fn handle_message(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => Some(McpResponse::failure(
                Value::Null,
                RpcError::new(codes::PARSE_ERROR, format!("parse error: {e}")),
            )),
            Ok(message) => self.handle_value(message).await,
        }?;

        serde_json::to_string(&response)
            .inspect_err(|e| tracing::error!(error = %e, "unable to serialize response"))
            .ok()
    }

    async fn handle_value(&self, message: Value) -> Option<McpResponse> {
        let id = message.get("id").cloned().unwrap_or(Value::Null);

        if !message.is_object() {
            return Some(McpResponse::failure(
                Value::Null,
                RpcError::new(codes::INVALID_REQUEST, "request must be a JSON object"),
            ));
        }

        match serde_json::from_value::<McpRequest>(message) {
            Ok(request) => self.handle(request).await,
            Err(e) => Some(McpResponse::failure(
                id,
                RpcError::new(codes::INVALID_REQUEST, format!("invalid request: {e}")),
            )),
        }
    }

    /// Handles a decoded request. Returns `None` for notifications.
    pub async fn handle(&self, request: McpRequest) -> Option<McpResponse> {
        if request.jsonrpc != protocol::JSONRPC_VERSION {
            return request.id.map(|id| {
                McpResponse::failure(
                    id,
                    RpcError::new(codes::INVALID_REQUEST, "jsonrpc must be \"2.0\""),
                )
            });
        }

        if request.is_notification() {
            tracing::debug!(method = %request.method, "notification received");
            return None;
        }

        let id = request.id.unwrap_or(Value::Null);
        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => McpResponse::success(id, result),
            Err(error) => {
                tracing::debug!(method = %request.method, code = error.code, message = %error.message, "request failed");
                McpResponse::failure(id, error)
            }
        };

        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            methods::INITIALIZE => Ok(self.initialize()),
            methods::PING => Ok(json!({})),
            methods::TOOLS_LIST => Ok(json!({
                "tools": tools::tool_definitions(self.client.config().variant())
            })),
            methods::TOOLS_CALL => self.call_tool(params).await,
            methods::RESOURCES_LIST => Ok(json!({ "resources": resources::resources() })),
            methods::RESOURCES_TEMPLATES_LIST => Ok(json!({
                "resourceTemplates": resources::templates()
            })),
            methods::RESOURCES_READ => self.read_resource(params).await,
            other => Err(RpcError::new(
                codes::METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            )),
        }
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            },
            "instructions": format!(
                "Polymarket {} API at {}",
                self.client.config().variant(),
                self.client.config().api_url()
            )
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, RpcError> {
        let params: ToolCallParams = serde_json::from_value(params)
            .map_err(|e| RpcError::invalid_params(format!("invalid tools/call params: {e}")))?;

        let known = tools::tool_definitions(self.client.config().variant())
            .iter()
            .any(|tool| tool.name == params.name);
        if !known {
            return Err(RpcError::invalid_params(format!(
                "unknown tool: {}",
                params.name
            )));
        }

        let result = match tools::call_tool(&self.client, &params.name, params.arguments).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => ToolCallResult::text(text),
                Err(e) => ToolCallResult::error(e.to_string()),
            },
            Err(e) => {
                tracing::warn!(tool = %params.name, error = %e, "tool call failed");
                ToolCallResult::error(e.to_string())
            }
        };

        serde_json::to_value(result)
            .map_err(|e| RpcError::new(codes::INTERNAL_ERROR, e.to_string()))
    }

    async fn read_resource(&self, params: Value) -> Result<Value, RpcError> {
        let params: ReadResourceParams = serde_json::from_value(params).map_err(|e| {
            RpcError::invalid_params(format!("invalid resources/read params: {e}"))
        })?;

        let Some(text) = resources::read_resource(&self.client, &params.uri).await else {
            return Err(RpcError {
                data: Some(json!({ "uri": params.uri })),
                ..RpcError::new(codes::RESOURCE_NOT_FOUND, "resource not found")
            });
        };

        let contents = ResourceContents {
            uri: params.uri,
            mime_type: resources::MIME_TYPE,
            text,
        };

        Ok(json!({ "contents": [contents] }))
    }
}
