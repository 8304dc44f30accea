// Shared helpers for integration tests.
//
// Provides a temporary niri configuration root and a fluent builder so each
// integration test can set up fragments and a main document without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use niri_mcp::config::Settings;
use niri_mcp::error::ExecError;
use niri_mcp::exec::{ExecResult, Executor};
use niri_mcp::tools::{Context, Registry, ToolOutput};
use serde_json::Value;

/// Executor answering every call with the next canned stdout.
#[derive(Debug, Default)]
pub struct CannedExecutor {
    responses: Mutex<VecDeque<String>>,
}

impl CannedExecutor {
    /// Answer successive calls with `responses`.
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| (*s).to_string()).collect()),
        }
    }
}

impl Executor for CannedExecutor {
    fn run(&self, program: &str, _args: &[&str]) -> Result<ExecResult, ExecError> {
        let next = self.responses.lock().expect("lock").pop_front();
        next.map(|stdout| ExecResult {
            stdout,
            stderr: String::new(),
            success: true,
            code: Some(0),
        })
        .ok_or_else(|| ExecError::Failed {
            program: program.to_string(),
            code: 1,
            stderr: "no canned response".to_string(),
        })
    }

    fn which(&self, _program: &str) -> bool {
        true
    }
}

/// An isolated niri configuration root backed by a [`tempfile::TempDir`].
pub struct NiriConfigFixture {
    /// Temporary directory standing in for `~/.config/niri`.
    pub root: tempfile::TempDir,
    /// Tool context pointing at `root`.
    pub ctx: Context,
}

impl NiriConfigFixture {
    /// Path to the fragment directory.
    pub fn fragment_dir(&self) -> &Path {
        &self.ctx.settings.fragment_dir
    }

    /// Path to the main document.
    pub fn document(&self) -> &Path {
        &self.ctx.settings.document
    }

    /// Sorted file names currently in the fragment directory.
    pub fn fragment_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.fragment_dir())
            .expect("read fragment dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Current document content.
    pub fn document_content(&self) -> String {
        std::fs::read_to_string(self.document()).expect("read document")
    }

    /// Call `tool` and return its output.
    pub fn call(&self, tool: &str, args: Value) -> ToolOutput {
        Registry::new()
            .call(&self.ctx, tool, &args)
            .expect("tool call")
    }

    /// Call `tool` and decode its text as JSON.
    pub fn call_json(&self, tool: &str, args: Value) -> Value {
        let out = self.call(tool, args);
        assert!(!out.is_error, "{tool} failed: {}", out.joined_text());
        serde_json::from_str(&out.joined_text()).expect("tool output is JSON")
    }
}

/// Fluent builder for [`NiriConfigFixture`].
pub struct FixtureBuilder {
    root: tempfile::TempDir,
    fragments: Vec<(String, String)>,
    document: Option<String>,
    responses: Vec<String>,
}

impl FixtureBuilder {
    /// Begin building an empty configuration root.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
            fragments: Vec::new(),
            document: None,
            responses: Vec::new(),
        }
    }

    /// Add a file to `config.d/`.
    pub fn with_fragment(mut self, name: &str) -> Self {
        self.fragments
            .push((name.to_string(), format!("// {name}\n")));
        self
    }

    /// Write `content` as `config.kdl`.
    pub fn with_document(mut self, content: &str) -> Self {
        self.document = Some(content.to_string());
        self
    }

    /// Queue a canned `niri msg` response.
    pub fn with_niri_response(mut self, stdout: &str) -> Self {
        self.responses.push(stdout.to_string());
        self
    }

    /// Finish building and return the fixture.
    pub fn build(self) -> NiriConfigFixture {
        let settings = Settings::for_root(self.root.path());
        if !self.fragments.is_empty() {
            std::fs::create_dir_all(&settings.fragment_dir).expect("create config.d");
        }
        for (name, content) in &self.fragments {
            std::fs::write(settings.fragment_dir.join(name), content).expect("write fragment");
        }
        if let Some(content) = &self.document {
            std::fs::write(&settings.document, content).expect("write config.kdl");
        }
        let responses: Vec<&str> = self.responses.iter().map(String::as_str).collect();
        let ctx = Context::new(settings, Arc::new(CannedExecutor::new(&responses)));
        NiriConfigFixture {
            root: self.root,
            ctx,
        }
    }
}

/// Absolute path of `name` inside `dir`, as a string.
pub fn path_string(dir: &Path, name: &str) -> String {
    PathBuf::from(dir).join(name).to_string_lossy().into_owned()
}
