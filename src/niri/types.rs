//! Typed models of `niri msg --json` output.
//!
//! Only the fields niri has shipped for a while are modelled; unknown fields
//! are ignored.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::NiriQuery;

/// One output mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
    /// Refresh rate in millihertz.
    pub refresh_rate: u32,
    /// Whether the mode is preferred by the monitor.
    pub is_preferred: bool,
}

/// Output transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    /// No transform.
    Normal,
    /// Rotated 90°.
    #[serde(rename = "90")]
    Rotate90,
    /// Rotated 180°.
    #[serde(rename = "180")]
    Rotate180,
    /// Rotated 270°.
    #[serde(rename = "270")]
    Rotate270,
    /// Flipped.
    Flipped,
    /// Flipped and rotated 90°.
    Flipped90,
    /// Flipped and rotated 180°.
    Flipped180,
    /// Flipped and rotated 270°.
    Flipped270,
}

/// Logical placement of an output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalOutput {
    /// X position in the global space.
    pub x: i32,
    /// Y position in the global space.
    pub y: i32,
    /// Logical width.
    pub width: u32,
    /// Logical height.
    pub height: u32,
    /// Scale factor.
    pub scale: f64,
    /// Transform.
    pub transform: Transform,
}

/// A connected output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// Connector name, e.g. `DP-1`.
    pub name: String,
    /// Manufacturer.
    pub make: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// Serial number.
    pub serial: Option<String>,
    /// Physical size in millimetres.
    pub physical_size: Option<(u32, u32)>,
    /// Available modes.
    pub modes: Vec<Mode>,
    /// Index into `modes`.
    pub current_mode: Option<usize>,
    /// Whether variable refresh rate is supported.
    pub vrr_supported: bool,
    /// Whether variable refresh rate is enabled.
    pub vrr_enabled: bool,
    /// Logical placement, `None` when disabled.
    pub logical: Option<LogicalOutput>,
}

/// A workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique id.
    pub id: u64,
    /// Index on its output.
    pub idx: u8,
    /// Optional name.
    pub name: Option<String>,
    /// Output the workspace is on.
    pub output: Option<String>,
    /// Whether a window on it is urgent.
    #[serde(default)]
    pub is_urgent: bool,
    /// Whether it is active on its output.
    pub is_active: bool,
    /// Whether it is focused.
    pub is_focused: bool,
    /// Active window id.
    pub active_window_id: Option<u64>,
}

/// A window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Unique id.
    pub id: u64,
    /// Title.
    pub title: Option<String>,
    /// Application id.
    pub app_id: Option<String>,
    /// Process id.
    pub pid: Option<i32>,
    /// Workspace id.
    pub workspace_id: Option<u64>,
    /// Whether it is focused.
    pub is_focused: bool,
    /// Whether it is floating.
    #[serde(default)]
    pub is_floating: bool,
    /// Whether it requests attention.
    #[serde(default)]
    pub is_urgent: bool,
}

/// Layer-shell layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    /// Background layer.
    Background,
    /// Bottom layer.
    Bottom,
    /// Top layer.
    Top,
    /// Overlay layer.
    Overlay,
}

/// A layer-shell surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSurface {
    /// Namespace, e.g. `waybar`.
    pub namespace: String,
    /// Output name.
    pub output: String,
    /// Layer.
    pub layer: Layer,
    /// Keyboard interactivity mode.
    pub keyboard_interactivity: String,
}

/// Configured keyboard layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardLayouts {
    /// Layout names.
    pub names: Vec<String>,
    /// Index of the active layout.
    pub current_idx: u8,
}

/// Overview state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    /// Whether the overview is open.
    pub is_open: bool,
}

fn parse<T: for<'de> Deserialize<'de>>(value: &Value) -> Result<(), serde_json::Error> {
    T::deserialize(value).map(drop)
}

/// Check `value` against the model for `query`.
///
/// # Errors
///
/// Returns the decoder error describing the first mismatch.
pub fn check_shape(query: NiriQuery, value: &Value) -> Result<(), serde_json::Error> {
    match query {
        NiriQuery::Outputs => parse::<BTreeMap<String, Output>>(value),
        NiriQuery::Workspaces => parse::<Vec<Workspace>>(value),
        NiriQuery::Windows => parse::<Vec<Window>>(value),
        NiriQuery::Layers => parse::<Vec<LayerSurface>>(value),
        NiriQuery::KeyboardLayouts => parse::<KeyboardLayouts>(value),
        NiriQuery::FocusedOutput => parse::<Option<Output>>(value),
        NiriQuery::FocusedWindow => parse::<Option<Window>>(value),
        NiriQuery::OverviewState => parse::<Overview>(value),
    }
}
