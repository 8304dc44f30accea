//! Fragment directory store (`config.d/`).
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::{
    ConfigItem, ConfigState, ConfigStore, DISABLED_SUFFIX, Locator, Unmatched, classify_file_name,
};
use crate::error::StoreError;

/// A directory of independently enable-able fragment files.
///
/// A fragment is excluded when its file name ends in `.disabled`; enabling
/// and disabling rename the file.
#[derive(Debug, Clone)]
pub struct FragmentDirectoryStore {
    dir: PathBuf,
    filter: Option<Regex>,
}

impl FragmentDirectoryStore {
    /// Create a store rooted at `dir`. The directory need not exist yet.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir, filter: None }
    }

    /// Restrict scans to file names matching `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<Regex>) -> Self {
        self.filter = filter;
        self
    }

    /// The fragment directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List regular files, sorted by name.
    ///
    /// A missing directory is created (with parents) and yields an empty
    /// inventory. Sizes are best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be listed or created.
    pub fn list(&self) -> Result<Vec<ConfigItem>, StoreError> {
        let io_err = |source: io::Error| StoreError::Io {
            path: self.dir.clone(),
            source,
        };

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("creating missing fragment directory {}", self.dir.display());
                std::fs::create_dir_all(&self.dir).map_err(io_err)?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(io_err(e)),
        };

        let mut items = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_err)?;
            let file_type = entry.file_type().map_err(io_err)?;
            if !file_type.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(filter) = &self.filter
                && !filter.is_match(&name)
            {
                continue;
            }

            let size = entry.metadata().ok().map(|m| m.len());
            items.push(ConfigItem {
                state: classify_file_name(&name),
                name,
                size,
                locator: Locator::File(entry.path()),
            });
        }

        items.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(
            "scanned {} fragment(s) in {}",
            items.len(),
            self.dir.display()
        );
        Ok(items)
    }
}

impl ConfigStore for FragmentDirectoryStore {
    fn scan(&mut self) -> Result<Vec<ConfigItem>, StoreError> {
        self.list()
    }

    fn unmatched(&self) -> Unmatched {
        Unmatched::Omit
    }

    fn mutate(&mut self, item: &ConfigItem, to: ConfigState) -> Result<(), StoreError> {
        let Locator::File(from) = &item.locator else {
            return Err(StoreError::ForeignItem(item.name.clone()));
        };
        let target = match to {
            ConfigState::Excluded => disabled_path(from),
            ConfigState::Included => enabled_path(from)?,
        };

        if target.symlink_metadata().is_ok() {
            return Err(StoreError::TargetExists { path: target });
        }

        std::fs::rename(from, &target).map_err(|source| StoreError::Rename {
            from: from.clone(),
            to: target.clone(),
            source,
        })?;
        tracing::info!("{} -> {}", from.display(), target.display());
        Ok(())
    }
}

/// `path` with the disabled suffix appended to its file name.
fn disabled_path(path: &Path) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_owned();
    os.push(DISABLED_SUFFIX);
    PathBuf::from(os)
}

/// `path` with the disabled suffix stripped from its file name.
fn enabled_path(path: &Path) -> Result<PathBuf, StoreError> {
    let stripped = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(DISABLED_SUFFIX))
        .filter(|n| !n.is_empty());

    stripped.map_or_else(
        || {
            Err(StoreError::Rename {
                from: path.to_path_buf(),
                to: path.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "file name has nothing left once the disabled suffix is removed",
                ),
            })
        },
        |name| Ok(path.with_file_name(name)),
    )
}
