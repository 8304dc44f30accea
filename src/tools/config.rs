//! Tools that list and toggle niri configuration items.
//!
//! `list_niri_configs` and `toggle_niri_config` work on the fragment
//! directory; `list_niri_kdl_includes` and `toggle_niri_kdl_include` work on
//! the `include` directives of the main document.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Context, Tool, ToolOutput, decode_args};
use crate::error::{NiriMcpError, StoreError};
use crate::store::{
    self, ConfigState, ConfigStore as _, FragmentDirectoryStore, IncludeDocumentStore,
    ToggleAction, toggle,
};

/// Payload returned when the include document does not exist.
const NOT_FOUND_MESSAGE: &str = "Config file not found";

/// Turn the recoverable store errors into `{"error": ...}` payloads.
fn recover(err: StoreError) -> Result<ToolOutput, NiriMcpError> {
    match err {
        StoreError::NotFound { .. } => Ok(ToolOutput::json(&json!({ "error": NOT_FOUND_MESSAGE }))?),
        e @ StoreError::InvalidPattern { .. } => {
            tracing::debug!("{e}");
            Ok(ToolOutput::json(&json!({ "error": e.to_string() }))?)
        }
        other => Err(other.into()),
    }
}

fn action_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["on", "off", "toggle"],
        "default": "toggle",
        "description": "on includes, off excludes, toggle flips every selected item"
    })
}

// ---------------------------------------------------------------------------
// list_niri_configs
// ---------------------------------------------------------------------------

/// Lists fragment files with their state.
#[derive(Debug, Clone, Copy)]
pub struct ListConfigs;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListConfigsArgs {
    filter: Option<String>,
}

/// One row of `list_niri_configs` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentListing {
    /// File name.
    pub name: String,
    /// Full path.
    pub path: PathBuf,
    /// Derived state.
    pub state: ConfigState,
    /// Size in bytes, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Tool for ListConfigs {
    fn name(&self) -> &'static str {
        "list_niri_configs"
    }

    fn description(&self) -> &'static str {
        "List niri config.d files with their state (included/excluded)"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filter": {
                    "type": "string",
                    "description": "Regular expression; only file names matching it are listed"
                }
            }
        })
    }

    fn call(&self, ctx: &Context, args: &Value) -> Result<ToolOutput, NiriMcpError> {
        let args: ListConfigsArgs = decode_args(self.name(), args)?;
        let filter = match store::compile_pattern(args.filter.as_deref()) {
            Ok(filter) => filter,
            Err(e) => return recover(e),
        };

        let items = FragmentDirectoryStore::new(ctx.settings.fragment_dir.clone())
            .with_filter(filter)
            .list()?;
        let listing: Vec<FragmentListing> = items
            .into_iter()
            .filter_map(|item| {
                let path = item.path().cloned()?;
                Some(FragmentListing {
                    name: item.name,
                    path,
                    state: item.state,
                    size: item.size,
                })
            })
            .collect();
        Ok(ToolOutput::json(&listing)?)
    }
}

// ---------------------------------------------------------------------------
// toggle_niri_config
// ---------------------------------------------------------------------------

/// Renames fragment files to include or exclude them.
#[derive(Debug, Clone, Copy)]
pub struct ToggleConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ToggleConfigArgs {
    id_regex: Option<String>,
    action: ToggleAction,
}

impl Tool for ToggleConfig {
    fn name(&self) -> &'static str {
        "toggle_niri_config"
    }

    fn description(&self) -> &'static str {
        "Toggle niri config.d files (enable/disable)"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "idRegex": {
                    "type": "string",
                    "description": "Regular expression; only file names matching it are changed"
                },
                "action": action_schema()
            }
        })
    }

    fn call(&self, ctx: &Context, args: &Value) -> Result<ToolOutput, NiriMcpError> {
        let args: ToggleConfigArgs = decode_args(self.name(), args)?;
        let selector = match store::compile_pattern(args.id_regex.as_deref()) {
            Ok(selector) => selector,
            Err(e) => return recover(e),
        };

        let mut fragments = FragmentDirectoryStore::new(ctx.settings.fragment_dir.clone());
        let report = toggle::apply(&mut fragments, args.action, selector.as_ref())?;
        Ok(ToolOutput::json(&report)?)
    }
}

// ---------------------------------------------------------------------------
// list_niri_kdl_includes
// ---------------------------------------------------------------------------

/// Lists the top-level `include` directives of the main document.
#[derive(Debug, Clone, Copy)]
pub struct ListKdlIncludes;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListKdlIncludesArgs {
    path: Option<PathBuf>,
}

/// One directive in `list_niri_kdl_includes` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeListing {
    /// Include target as written.
    pub path: String,
    /// Derived state.
    pub state: ConfigState,
}

/// `list_niri_kdl_includes` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeDocumentListing {
    /// Document that was read.
    pub path: PathBuf,
    /// Directives in document order.
    pub includes: Vec<IncludeListing>,
}

impl Tool for ListKdlIncludes {
    fn name(&self) -> &'static str {
        "list_niri_kdl_includes"
    }

    fn description(&self) -> &'static str {
        "List KDL include directives from niri config.kdl with state"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Document to read instead of the configured config.kdl"
                }
            }
        })
    }

    fn call(&self, ctx: &Context, args: &Value) -> Result<ToolOutput, NiriMcpError> {
        let args: ListKdlIncludesArgs = decode_args(self.name(), args)?;
        let path = args
            .path
            .unwrap_or_else(|| ctx.settings.document.clone());

        let mut document = IncludeDocumentStore::new(path.clone());
        let items = match document.scan() {
            Ok(items) => items,
            Err(e) => return recover(e),
        };
        let listing = IncludeDocumentListing {
            path,
            includes: items
                .into_iter()
                .map(|item| IncludeListing {
                    path: item.name,
                    state: item.state,
                })
                .collect(),
        };
        Ok(ToolOutput::json(&listing)?)
    }
}

// ---------------------------------------------------------------------------
// toggle_niri_kdl_include
// ---------------------------------------------------------------------------

/// Adds or removes the `// disabled` marker on `include` directives.
#[derive(Debug, Clone, Copy)]
pub struct ToggleKdlInclude;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ToggleKdlIncludeArgs {
    pattern: Option<String>,
    action: ToggleAction,
}

impl Tool for ToggleKdlInclude {
    fn name(&self) -> &'static str {
        "toggle_niri_kdl_include"
    }

    fn description(&self) -> &'static str {
        "Toggle KDL include directives in niri config.kdl by adding/removing '// disabled' comment"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Regular expression matched against the directive line; non-matching directives are reported as skipped"
                },
                "action": action_schema()
            }
        })
    }

    fn call(&self, ctx: &Context, args: &Value) -> Result<ToolOutput, NiriMcpError> {
        let args: ToggleKdlIncludeArgs = decode_args(self.name(), args)?;
        let selector = match store::compile_pattern(args.pattern.as_deref()) {
            Ok(selector) => selector,
            Err(e) => return recover(e),
        };

        let mut document = IncludeDocumentStore::new(ctx.settings.document.clone());
        match toggle::apply(&mut document, args.action, selector.as_ref()) {
            Ok(report) => Ok(ToolOutput::json(&report)?),
            Err(e) => recover(e),
        }
    }
}
