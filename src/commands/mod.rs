//! Top-level subcommand implementations.
pub mod call;
pub mod serve;
pub mod tools;
pub mod version;

use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::{Environment, Settings};
use crate::exec::{Executor, SystemExecutor};
use crate::tools::Context;

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Tool context built from the resolved settings.
    pub ctx: Context,
}

impl CommandSetup {
    /// Resolve settings from the environment and `global`, and wire the
    /// system executor.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be loaded or no
    /// configuration root can be determined.
    pub fn init(global: &GlobalOpts) -> Result<Self> {
        Self::with_executor(global, &Environment::from_process(), Arc::new(SystemExecutor))
    }

    /// Like [`init`](Self::init) with an explicit environment and executor.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be resolved.
    pub fn with_executor(
        global: &GlobalOpts,
        env: &Environment,
        executor: Arc<dyn Executor>,
    ) -> Result<Self> {
        let settings = Settings::resolve(env, &global.overrides())?;
        tracing::debug!("config root: {}", settings.config_root.display());
        tracing::debug!("fragment dir: {}", settings.fragment_dir.display());
        tracing::debug!("document: {}", settings.document.display());
        tracing::debug!("niri: {}", settings.niri_bin);
        Ok(Self {
            ctx: Context::new(settings, executor),
        })
    }
}
