//! Command: serve tools over stdio.
use anyhow::{Context as _, Result};
use rmcp::ServiceExt;

use crate::cli::GlobalOpts;
use crate::server::{NiriServer, SERVER_NAME};
use crate::tools::Registry;

/// Run the serve command until the client disconnects.
///
/// # Errors
///
/// Returns an error if settings cannot be resolved, the runtime cannot be
/// started, or the initialize handshake fails.
pub fn run(global: &GlobalOpts) -> Result<()> {
    let setup = super::CommandSetup::init(global)?;
    let niri_bin = setup.ctx.settings.niri_bin.clone();
    if !setup.ctx.executor.which(&niri_bin) {
        tracing::warn!("{niri_bin} not found on PATH; niri_* query tools will fail");
    }

    let server = NiriServer::new(Registry::new(), setup.ctx);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;
    runtime.block_on(serve_stdio(server))
}

async fn serve_stdio(server: NiriServer) -> Result<()> {
    tracing::info!("{SERVER_NAME} listening on stdio");
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("initializing session")?;
    let reason = service.waiting().await.context("session task failed")?;
    tracing::info!("session ended: {reason:?}");
    Ok(())
}
