//! Tool server for the niri window manager.
//!
//! Exposes read-only `niri msg` queries and enable/disable toggling of niri
//! configuration as MCP tools served over stdio.
//!
//! The public API is organised into layers:
//!
//! - **[`store`]**: the two configuration backing stores (fragment
//!   directory, include document) and the toggle engine that drives them
//! - **[`niri`]**: `niri msg --json` queries and typed response models
//! - **[`filter`]**: column projection and row predicates over query results
//! - **[`tools`]**: the tool registry wiring stores and queries to clients
//! - **[`server`]**: the `rmcp` server handler
//! - **[`commands`]**: top-level subcommand orchestration (`serve`, `tools`, `call`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod filter;
pub mod logging;
pub mod niri;
pub mod server;
pub mod store;
pub mod tools;

/// Version string reported by `version` and the `initialize` handshake.
#[must_use]
pub const fn version() -> &'static str {
    match option_env!("NIRI_MCP_VERSION") {
        Some(version) => version,
        None => env!("CARGO_PKG_VERSION"),
    }
}
