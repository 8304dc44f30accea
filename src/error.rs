//! Domain-specific error types for the niri tool server.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Library modules return typed errors (e.g., [`StoreError`], [`ExecError`])
//! while the CLI boundary and the tool host convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! NiriMcpError
//! ├── Store(StoreError)   : fragment directory / include document access
//! ├── Exec(ExecError)     : `niri msg` invocation and output decoding
//! ├── Tool(ToolError)     : tool lookup and argument decoding
//! └── Config(ConfigError) : settings file loading
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the tool server.
#[derive(Error, Debug)]
pub enum NiriMcpError {
    /// Backing store error (scan, rename, document write).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// External command error.
    #[error("Command error: {0}")]
    Exec(#[from] ExecError),

    /// Tool dispatch error.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Settings error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that arise while scanning or mutating a configuration store.
///
/// [`StoreError::NotFound`] and [`StoreError::InvalidPattern`] are
/// recoverable and turned into structured tool payloads; the per-item
/// variants end up as `skipped` reasons; everything else is fatal.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The include document does not exist.
    #[error("Config file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A caller-supplied regular expression failed to compile.
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as supplied.
        pattern: String,
        /// Compilation error.
        source: regex::Error,
    },

    /// Generic I/O failure on a store path.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A rename would overwrite an existing file.
    #[error("target already exists: {}", path.display())]
    TargetExists {
        /// The would-be destination.
        path: PathBuf,
    },

    /// Renaming a fragment failed.
    #[error("rename {} -> {}: {source}", from.display(), to.display())]
    Rename {
        /// Current path.
        from: PathBuf,
        /// Requested path.
        to: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The include document changed on disk between scan and write.
    #[error("{} changed on disk since it was read", path.display())]
    Modified {
        /// Path of the document.
        path: PathBuf,
    },

    /// The item does not belong to the store it was handed to.
    #[error("item '{0}' is not addressable in this store")]
    ForeignItem(String),
}

/// Errors that arise when running the external query command.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The program could not be started at all.
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// Program name or path.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("{program} failed (exit {code}): {stderr}")]
    Failed {
        /// Program name or path.
        program: String,
        /// Exit code, `-1` when terminated by a signal.
        code: i32,
        /// Trimmed standard error.
        stderr: String,
    },

    /// Standard output was not valid JSON.
    #[error("invalid JSON from '{command}': {source}")]
    InvalidJson {
        /// Command line that produced the output.
        command: String,
        /// Decoder error.
        source: serde_json::Error,
    },
}

/// Errors that arise when dispatching a tool call.
#[derive(Error, Debug)]
pub enum ToolError {
    /// No tool is registered under the name.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    /// The arguments object did not match the tool's input schema.
    #[error("invalid arguments for '{tool}': {source}")]
    InvalidArguments {
        /// Tool name.
        tool: String,
        /// Decoder error.
        source: serde_json::Error,
    },

    /// The tool result could not be encoded.
    #[error("failed to encode result: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors that arise while loading the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("IO error reading settings file {}: {source}", path.display())]
    Io {
        /// Path to the settings file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`crate::config::Settings`].
    #[error("Invalid settings file {}: {source}", path.display())]
    Parse {
        /// Path to the settings file.
        path: PathBuf,
        /// Decoder error.
        source: toml::de::Error,
    },

    /// Neither `$XDG_CONFIG_HOME` nor `$HOME` is set.
    #[error("cannot determine the home directory (HOME is unset)")]
    NoHome,
}
