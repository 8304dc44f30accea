//! Tools exposed to clients: eight `niri msg` queries and four configuration
//! tools.
//!
//! Every tool is a unit of work implementing [`Tool`]; [`Registry`] owns the
//! full set and dispatches calls by name.
pub mod config;
pub mod msg;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Settings;
use crate::error::{NiriMcpError, ToolError};
use crate::exec::Executor;
use crate::niri::NiriQuery;

/// Shared state handed to every tool call.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved paths and executable.
    pub settings: Arc<Settings>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
}

impl Context {
    /// Create a context from its parts.
    #[must_use]
    pub fn new(settings: Settings, executor: Arc<dyn Executor>) -> Self {
        Self {
            settings: Arc::new(settings),
            executor,
        }
    }
}

/// One block of tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Plain text, usually pretty-printed JSON.
    Text {
        /// The text.
        text: String,
    },
}

/// Result of a tool call, converted to the protocol type by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Output blocks.
    pub content: Vec<Content>,
    /// Set when the call failed.
    pub is_error: bool,
}

impl ToolOutput {
    /// A successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// A failed result carrying `message`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(message)
        }
    }

    /// A successful result holding `value` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Encode`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ToolError> {
        serde_json::to_string_pretty(value)
            .map(Self::text)
            .map_err(ToolError::Encode)
    }

    /// Concatenated text of all blocks.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|Content::Text { text }| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A named tool callable by clients.
pub trait Tool: std::fmt::Debug + Send + Sync {
    /// Unique tool name.
    fn name(&self) -> &str;

    /// One-line description shown to clients.
    fn description(&self) -> &str;

    /// JSON Schema of the `arguments` object.
    fn input_schema(&self) -> Value;

    /// Execute the tool.
    ///
    /// Recoverable conditions (missing document, bad pattern) are reported
    /// inside a successful [`ToolOutput`].
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not decode, the query command
    /// fails, or the backing store hits a fatal I/O error.
    fn call(&self, ctx: &Context, args: &Value) -> Result<ToolOutput, NiriMcpError>;
}

/// Decode `args` into `T`; a missing or `null` arguments object yields
/// `T::default()`.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] if `args` does not match `T`.
pub fn decode_args<T: DeserializeOwned + Default>(tool: &str, args: &Value) -> Result<T, ToolError> {
    if args.is_null() {
        return Ok(T::default());
    }
    T::deserialize(args).map_err(|source| ToolError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

/// The complete set of tools, in listing order.
#[must_use]
pub fn all_tools() -> Vec<Box<dyn Tool>> {
    let mut tools: Vec<Box<dyn Tool>> = NiriQuery::ALL
        .into_iter()
        .map(|q| Box::new(msg::NiriMsgTool::new(q)) as Box<dyn Tool>)
        .collect();
    tools.push(Box::new(config::ListConfigs));
    tools.push(Box::new(config::ToggleConfig));
    tools.push(Box::new(config::ListKdlIncludes));
    tools.push(Box::new(config::ToggleKdlInclude));
    tools
}

/// Name-indexed tool set.
#[derive(Debug)]
pub struct Registry {
    tools: Vec<Box<dyn Tool>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry holding [`all_tools`].
    #[must_use]
    pub fn new() -> Self {
        Self { tools: all_tools() }
    }

    /// Registered tools in listing order.
    #[must_use]
    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(Box::as_ref)
    }

    /// `{name, description, inputSchema}` for every tool.
    #[must_use]
    pub fn descriptors(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name(),
                    "description": t.description(),
                    "inputSchema": t.input_schema(),
                })
            })
            .collect()
    }

    /// Call the tool registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for an unregistered name, or
    /// whatever the tool itself fails with.
    pub fn call(&self, ctx: &Context, name: &str, args: &Value) -> Result<ToolOutput, NiriMcpError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tracing::debug!("calling {name} with {args}");
        tool.call(ctx, args)
    }
}
