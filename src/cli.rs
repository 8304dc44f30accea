//! Command-line interface definition.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;

/// Top-level CLI entry point for the niri tool server.
#[derive(Parser, Debug)]
#[command(
    name = "niri-mcp",
    about = "Tool server exposing niri window manager state and config toggles",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the niri configuration directory (default: ~/.config/niri)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_root: Option<PathBuf>,

    /// niri executable used for `msg` queries
    #[arg(long, global = true, value_name = "PATH")]
    pub niri_bin: Option<String>,

    /// Settings file (default: ~/.config/niri-mcp/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,
}

impl GlobalOpts {
    /// Command-line values as settings overrides.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config_root: self.config_root.clone(),
            niri_bin: self.niri_bin.clone(),
            settings_file: self.settings.clone(),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve tools over JSON-RPC on stdin/stdout
    Serve,
    /// List available tools
    Tools,
    /// Call a single tool and print its output
    Call(CallOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Serve => "serve",
            Self::Tools => "tools",
            Self::Call(_) => "call",
            Self::Version => "version",
        }
    }
}

/// Options for the `call` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CallOpts {
    /// Tool name, e.g. `list_niri_configs`
    pub name: String,

    /// Tool arguments as a JSON object
    #[arg(long, value_name = "JSON")]
    pub args: Option<String>,
}
