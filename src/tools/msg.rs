//! Read-only `niri msg` query tools.
use serde_json::{Value, json};

use super::{Context, Tool, ToolOutput, decode_args};
use crate::error::NiriMcpError;
use crate::filter::{self, QueryOptions};
use crate::niri::{self, NiriQuery};

/// Runs one [`NiriQuery`] and applies the optional `include`, `exclude` and
/// `filter` arguments to the result.
#[derive(Debug, Clone, Copy)]
pub struct NiriMsgTool {
    query: NiriQuery,
}

impl NiriMsgTool {
    /// Tool for `query`.
    #[must_use]
    pub const fn new(query: NiriQuery) -> Self {
        Self { query }
    }
}

/// Schema shared by every query tool.
fn query_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "include": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Only keep these fields of each entry"
            },
            "exclude": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Drop these fields from each entry (ignored when include is set)"
            },
            "filter": {
                "type": "array",
                "description": "Keep entries matching every condition; field is a dotted path",
                "items": {
                    "type": "object",
                    "properties": {
                        "field": {"type": "string"},
                        "operator": {
                            "type": "string",
                            "enum": ["eq", "ne", "gt", "lt", "gte", "lte", "contains", "startsWith", "endsWith"]
                        },
                        "value": {}
                    },
                    "required": ["field", "operator"]
                }
            }
        }
    })
}

impl Tool for NiriMsgTool {
    fn name(&self) -> &str {
        self.query.tool_name()
    }

    fn description(&self) -> &str {
        self.query.description()
    }

    fn input_schema(&self) -> Value {
        query_schema()
    }

    fn call(&self, ctx: &Context, args: &Value) -> Result<ToolOutput, NiriMcpError> {
        let options: QueryOptions = decode_args(self.name(), args)?;
        let value = niri::query(ctx.executor.as_ref(), &ctx.settings.niri_bin, self.query)?;
        Ok(ToolOutput::json(&filter::query(value, &options))?)
    }
}
