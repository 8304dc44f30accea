//! Runtime settings: where the niri configuration lives and which `niri`
//! binary to query.
//!
//! Resolution order, later wins:
//!
//! 1. Built-in defaults derived from the process environment, captured once
//!    in an [`Environment`].
//! 2. An optional TOML settings file (`$XDG_CONFIG_HOME/niri-mcp/config.toml`
//!    unless another path is given).
//! 3. Command-line [`Overrides`].
//!
//! ```toml
//! config-root = "/home/me/.config/niri"
//! fragment-dir = "config.d"      # relative paths are joined to config-root
//! document = "config.kdl"
//! niri-bin = "/usr/bin/niri"
//! ```
pub mod toml_loader;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Name of the fragment directory under the configuration root.
pub const FRAGMENT_DIR: &str = "config.d";

/// Name of the include document under the configuration root.
pub const DOCUMENT: &str = "config.kdl";

/// Default query executable.
pub const NIRI_BIN: &str = "niri";

/// Snapshot of the environment variables settings depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// `$HOME`.
    pub home: Option<PathBuf>,
    /// `$XDG_CONFIG_HOME`.
    pub xdg_config_home: Option<PathBuf>,
}

impl Environment {
    /// Read the current process environment. Empty values count as unset.
    #[must_use]
    pub fn from_process() -> Self {
        let var = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            home: var("HOME"),
            xdg_config_home: var("XDG_CONFIG_HOME"),
        }
    }

    /// `$XDG_CONFIG_HOME`, falling back to `$HOME/.config`.
    #[must_use]
    pub fn config_home(&self) -> Option<PathBuf> {
        self.xdg_config_home
            .clone()
            .or_else(|| self.home.as_ref().map(|h| h.join(".config")))
    }

    /// Default location of the settings file.
    #[must_use]
    pub fn settings_file(&self) -> Option<PathBuf> {
        Some(self.config_home()?.join("niri-mcp").join("config.toml"))
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--config-root`.
    pub config_root: Option<PathBuf>,
    /// `--niri-bin`.
    pub niri_bin: Option<String>,
    /// `--settings`.
    pub settings_file: Option<PathBuf>,
}

/// Contents of the TOML settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
struct SettingsFile {
    config_root: Option<PathBuf>,
    fragment_dir: Option<PathBuf>,
    document: Option<PathBuf>,
    niri_bin: Option<String>,
}

/// Fully resolved settings handed to the tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root of the niri configuration, usually `~/.config/niri`.
    pub config_root: PathBuf,
    /// Fragment directory, usually `<config_root>/config.d`.
    pub fragment_dir: PathBuf,
    /// Include document, usually `<config_root>/config.kdl`.
    pub document: PathBuf,
    /// Executable used for `msg` queries.
    pub niri_bin: String,
}

impl Settings {
    /// Default settings for a configuration rooted at `root`.
    #[must_use]
    pub fn for_root(root: &Path) -> Self {
        Self {
            config_root: root.to_path_buf(),
            fragment_dir: root.join(FRAGMENT_DIR),
            document: root.join(DOCUMENT),
            niri_bin: NIRI_BIN.to_string(),
        }
    }

    /// Resolve settings from `env`, the settings file, and `overrides`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`] if the settings
    /// file exists but cannot be loaded, and [`ConfigError::NoHome`] if no
    /// configuration root can be determined.
    pub fn resolve(env: &Environment, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = match overrides
            .settings_file
            .clone()
            .or_else(|| env.settings_file())
        {
            Some(path) => {
                tracing::debug!("loading settings from {}", path.display());
                toml_loader::load_config::<SettingsFile>(&path)?
            }
            None => SettingsFile::default(),
        };

        let root = overrides
            .config_root
            .clone()
            .or(file.config_root)
            .or_else(|| env.config_home().map(|c| c.join("niri")))
            .ok_or(ConfigError::NoHome)?;

        let mut settings = Self::for_root(&root);
        if let Some(dir) = file.fragment_dir {
            settings.fragment_dir = root.join(dir);
        }
        if let Some(doc) = file.document {
            settings.document = root.join(doc);
        }
        if let Some(bin) = overrides.niri_bin.clone().or(file.niri_bin) {
            settings.niri_bin = bin;
        }
        Ok(settings)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn env_with_home(home: &Path) -> Environment {
        Environment {
            home: Some(home.to_path_buf()),
            xdg_config_home: None,
        }
    }

    #[test]
    fn defaults_from_home() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::resolve(&env_with_home(tmp.path()), &Overrides::default()).unwrap();

        let root = tmp.path().join(".config/niri");
        assert_eq!(settings.config_root, root);
        assert_eq!(settings.fragment_dir, root.join("config.d"));
        assert_eq!(settings.document, root.join("config.kdl"));
        assert_eq!(settings.niri_bin, "niri");
    }

    #[test]
    fn xdg_config_home_wins_over_home() {
        let tmp = tempfile::tempdir().unwrap();
        let env = Environment {
            home: Some(tmp.path().join("home")),
            xdg_config_home: Some(tmp.path().join("xdg")),
        };
        let settings = Settings::resolve(&env, &Overrides::default()).unwrap();
        assert_eq!(settings.config_root, tmp.path().join("xdg/niri"));
    }

    #[test]
    fn no_home_is_an_error() {
        let err = Settings::resolve(&Environment::default(), &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoHome));
    }

    #[test]
    fn explicit_root_needs_no_home() {
        let overrides = Overrides {
            config_root: Some(PathBuf::from("/etc/niri")),
            ..Overrides::default()
        };
        let settings = Settings::resolve(&Environment::default(), &overrides).unwrap();
        assert_eq!(settings.document, PathBuf::from("/etc/niri/config.kdl"));
    }

    #[test]
    fn settings_file_is_applied() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".config/niri-mcp");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            "config-root = \"/srv/niri\"\nfragment-dir = \"parts\"\ndocument = \"/tmp/main.kdl\"\nniri-bin = \"/opt/niri\"\n",
        )
        .unwrap();

        let settings = Settings::resolve(&env_with_home(tmp.path()), &Overrides::default()).unwrap();
        assert_eq!(settings.config_root, PathBuf::from("/srv/niri"));
        assert_eq!(settings.fragment_dir, PathBuf::from("/srv/niri/parts"));
        assert_eq!(settings.document, PathBuf::from("/tmp/main.kdl"));
        assert_eq!(settings.niri_bin, "/opt/niri");
    }

    #[test]
    fn cli_overrides_settings_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("custom.toml");
        std::fs::write(&file, "config-root = \"/srv/niri\"\nniri-bin = \"/opt/niri\"\n").unwrap();

        let overrides = Overrides {
            config_root: Some(tmp.path().join("root")),
            niri_bin: Some("niri-dev".to_string()),
            settings_file: Some(file),
        };
        let settings = Settings::resolve(&env_with_home(tmp.path()), &overrides).unwrap();
        assert_eq!(settings.config_root, tmp.path().join("root"));
        assert_eq!(settings.fragment_dir, tmp.path().join("root/config.d"));
        assert_eq!(settings.niri_bin, "niri-dev");
    }

    #[test]
    fn missing_explicit_settings_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            settings_file: Some(tmp.path().join("nope.toml")),
            ..Overrides::default()
        };
        let settings = Settings::resolve(&env_with_home(tmp.path()), &overrides).unwrap();
        assert_eq!(settings, Settings::for_root(&tmp.path().join(".config/niri")));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("custom.toml");
        std::fs::write(&file, "colour = \"blue\"\n").unwrap();
        let overrides = Overrides {
            settings_file: Some(file),
            ..Overrides::default()
        };
        let err = Settings::resolve(&env_with_home(tmp.path()), &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
    }
}
