//! Build script: embeds the crate version into `NIRI_MCP_VERSION`.

use std::process::Command;

fn main() {
    // Prefer NIRI_MCP_VERSION env var if set (e.g., by a release workflow),
    // otherwise fall back to git describe for local development builds.
    if let Ok(version) = std::env::var("NIRI_MCP_VERSION") {
        println!("cargo:rustc-env=NIRI_MCP_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=NIRI_MCP_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=NIRI_MCP_VERSION");
}
