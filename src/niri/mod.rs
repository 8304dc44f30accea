//! `niri msg` queries.
//!
//! Every query runs `<niri> msg --json <subcommand>` and returns the decoded
//! JSON unchanged. The [`types`] models are only used to flag schema drift.
pub mod types;

use serde_json::Value;

use crate::error::ExecError;
use crate::exec::Executor;

/// The read-only `niri msg` subcommands exposed as tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NiriQuery {
    /// Connected outputs (monitors).
    Outputs,
    /// Workspaces.
    Workspaces,
    /// Open windows.
    Windows,
    /// Layer-shell surfaces.
    Layers,
    /// Keyboard layouts.
    KeyboardLayouts,
    /// The focused output.
    FocusedOutput,
    /// The focused window.
    FocusedWindow,
    /// Overview open/closed.
    OverviewState,
}

impl NiriQuery {
    /// Every query, in tool registration order.
    pub const ALL: [Self; 8] = [
        Self::Outputs,
        Self::Workspaces,
        Self::Windows,
        Self::Layers,
        Self::KeyboardLayouts,
        Self::FocusedOutput,
        Self::FocusedWindow,
        Self::OverviewState,
    ];

    /// The `niri msg` subcommand.
    #[must_use]
    pub const fn subcommand(self) -> &'static str {
        match self {
            Self::Outputs => "outputs",
            Self::Workspaces => "workspaces",
            Self::Windows => "windows",
            Self::Layers => "layers",
            Self::KeyboardLayouts => "keyboard-layouts",
            Self::FocusedOutput => "focused-output",
            Self::FocusedWindow => "focused-window",
            Self::OverviewState => "overview-state",
        }
    }

    /// Tool name the query is registered under.
    #[must_use]
    pub const fn tool_name(self) -> &'static str {
        match self {
            Self::Outputs => "niri_outputs",
            Self::Workspaces => "niri_workspaces",
            Self::Windows => "niri_windows",
            Self::Layers => "niri_layers",
            Self::KeyboardLayouts => "niri_keyboard_layouts",
            Self::FocusedOutput => "niri_focused_output",
            Self::FocusedWindow => "niri_focused_window",
            Self::OverviewState => "niri_overview_state",
        }
    }

    /// Tool description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Outputs => "List connected outputs (monitors) in Niri window manager",
            Self::Workspaces => "List workspaces in Niri window manager",
            Self::Windows => "List open windows in Niri window manager",
            Self::Layers => {
                "List layer-shell surfaces (like panels, menus) in Niri window manager"
            }
            Self::KeyboardLayouts => "List keyboard layouts in Niri window manager",
            Self::FocusedOutput => {
                "Get the currently focused output (monitor) in Niri window manager"
            }
            Self::FocusedWindow => "Get the currently focused window in Niri window manager",
            Self::OverviewState => "Get the overview state in Niri window manager",
        }
    }
}

/// Run `query` through `niri_bin` and decode its output.
///
/// # Errors
///
/// Returns an [`ExecError`] if the command fails or prints invalid JSON.
pub fn query(exec: &dyn Executor, niri_bin: &str, query: NiriQuery) -> Result<Value, ExecError> {
    let args = ["msg", "--json", query.subcommand()];
    let result = exec.run(niri_bin, &args)?;
    let value: Value =
        serde_json::from_str(&result.stdout).map_err(|source| ExecError::InvalidJson {
            command: format!("{niri_bin} {}", args.join(" ")),
            source,
        })?;

    if let Err(e) = types::check_shape(query, &value) {
        tracing::debug!("{} output does not match the known schema: {e}", query.subcommand());
    }
    Ok(value)
}
