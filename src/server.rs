//! MCP tool host built on `rmcp`.
//!
//! [`NiriServer`] exposes the tool [`Registry`] through [`ServerHandler`];
//! `rmcp` owns the JSON-RPC framing, the initialize handshake, `ping` and
//! notification handling. Tool calls run synchronously on the runtime
//! thread, so a current-thread runtime handles them one at a time.
use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool as ToolDescriptor,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::{Map, Value};

use crate::error::{NiriMcpError, ToolError};
use crate::tools::{self, Context, Registry, ToolOutput};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "niri-mcp";

/// Adapts the tool [`Registry`] to an `rmcp` server.
#[derive(Debug)]
pub struct NiriServer {
    registry: Registry,
    ctx: Context,
}

impl NiriServer {
    /// Create a server over `registry` sharing `ctx` across calls.
    #[must_use]
    pub const fn new(registry: Registry, ctx: Context) -> Self {
        Self { registry, ctx }
    }

    /// Descriptor of every registered tool, in listing order.
    #[must_use]
    pub fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry
            .tools()
            .iter()
            .map(|tool| {
                let schema = match tool.input_schema() {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                ToolDescriptor::new(
                    tool.name().to_string(),
                    tool.description().to_string(),
                    Arc::new(schema),
                )
            })
            .collect()
    }

    /// Call `name` with `arguments` and shape the outcome for the client.
    ///
    /// Failures inside a tool become an `isError` result so the session
    /// keeps going.
    ///
    /// # Errors
    ///
    /// Returns an invalid-params error for an unknown tool or arguments
    /// that do not decode.
    pub fn dispatch(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<CallToolResult, McpError> {
        let args = arguments.map_or(Value::Null, Value::Object);
        match self.registry.call(&self.ctx, name, &args) {
            Ok(output) => Ok(into_call_result(output)),
            Err(NiriMcpError::Tool(
                e @ (ToolError::UnknownTool(_) | ToolError::InvalidArguments { .. }),
            )) => Err(McpError::invalid_params(e.to_string(), None)),
            Err(e) => {
                tracing::error!("{name}: {e}");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }
}

fn into_call_result(output: ToolOutput) -> CallToolResult {
    let content = output
        .content
        .into_iter()
        .map(|tools::Content::Text { text }| Content::text(text))
        .collect();
    if output.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

impl ServerHandler for NiriServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: crate::version().to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Query niri window manager state and toggle config.d fragments and \
                 config.kdl include directives"
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tool_descriptors(),
            next_cursor: None,
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        tracing::debug!("tools/call {}", request.name);
        std::future::ready(self.dispatch(&request.name, request.arguments))
    }
}
