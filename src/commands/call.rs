//! Command: call one tool and print its output.
use std::io::Write;

use anyhow::{Context as _, Result};
use serde_json::Value;

use crate::cli::{CallOpts, GlobalOpts};
use crate::tools::{Context, Registry};

/// Call the tool named in `opts` and write its text to `out`.
///
/// # Errors
///
/// Returns an error if `--args` is not valid JSON, the tool is unknown, or
/// the tool fails.
pub fn call(ctx: &Context, opts: &CallOpts, out: &mut impl Write) -> Result<()> {
    let args: Value = match opts.args.as_deref() {
        Some(raw) => serde_json::from_str(raw).context("parsing --args as JSON")?,
        None => Value::Null,
    };
    let output = Registry::new()
        .call(ctx, &opts.name, &args)
        .with_context(|| format!("calling {}", opts.name))?;
    writeln!(out, "{}", output.joined_text())?;
    if output.is_error {
        anyhow::bail!("{} reported an error", opts.name);
    }
    Ok(())
}

/// Run the call command.
///
/// # Errors
///
/// Returns an error if settings cannot be resolved or the call fails.
pub fn run(global: &GlobalOpts, opts: &CallOpts) -> Result<()> {
    let setup = super::CommandSetup::init(global)?;
    call(&setup.ctx, opts, &mut std::io::stdout().lock())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::exec::test_helpers::MockExecutor;
    use std::sync::Arc;

    fn opts(name: &str, args: Option<&str>) -> CallOpts {
        CallOpts {
            name: name.to_string(),
            args: args.map(str::to_string),
        }
    }

    fn ctx(exec: MockExecutor) -> (Context, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        (Context::new(Settings::for_root(tmp.path()), Arc::new(exec)), tmp)
    }

    #[test]
    fn prints_tool_text() {
        let (ctx, _tmp) = ctx(MockExecutor::ok(r#"{"names":["us"],"current_idx":0}"#));
        let mut out = Vec::new();
        call(&ctx, &opts("niri_keyboard_layouts", Some(r#"{"include":["names"]}"#)), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"names\""));
        assert!(!text.contains("current_idx"));
    }

    #[test]
    fn invalid_args_json_fails() {
        let (ctx, _tmp) = ctx(MockExecutor::with_responses(vec![]));
        let err = call(&ctx, &opts("list_niri_configs", Some("{")), &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("--args"));
    }

    #[test]
    fn unknown_tool_fails() {
        let (ctx, _tmp) = ctx(MockExecutor::with_responses(vec![]));
        let err = call(&ctx, &opts("nope", None), &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown tool 'nope'"));
    }

    #[test]
    fn fatal_tool_error_fails() {
        let (ctx, _tmp) = ctx(MockExecutor::fail("no socket"));
        let err = call(&ctx, &opts("niri_outputs", None), &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("no socket"));
    }
}
