//! Configuration backing stores and their shared state model.
//!
//! Two physical representations hold enable/disable state:
//!
//! - **[`fragments`]**: a directory of fragment files where a `.disabled`
//!   suffix excludes a file
//! - **[`includes`]**: a single KDL document whose `include` directives are
//!   excluded by a trailing `// disabled` comment
//!
//! Both implement [`ConfigStore`] so the [`toggle`] engine can drive either.
pub mod fragments;
pub mod includes;
pub mod toggle;

use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub use fragments::FragmentDirectoryStore;
pub use includes::IncludeDocumentStore;
pub use toggle::{ToggleAction, ToggleOutcome, ToggleReport};

/// File-name suffix marking an excluded fragment.
pub const DISABLED_SUFFIX: &str = ".disabled";

/// Trailing comment marking an excluded include directive.
pub const DISABLED_MARKER: &str = "// disabled";

/// Whether a configuration item is active.
///
/// # Examples
///
/// ```
/// use niri_mcp::store::ConfigState;
///
/// assert_eq!(ConfigState::Included.flipped(), ConfigState::Excluded);
/// assert_eq!(ConfigState::Excluded.flipped(), ConfigState::Included);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigState {
    /// Loaded by niri.
    Included,
    /// Present on disk but carrying the disabled marker.
    Excluded,
}

impl ConfigState {
    /// The opposite state.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Included => Self::Excluded,
            Self::Excluded => Self::Included,
        }
    }
}

/// Classify a fragment file name.
///
/// The check is case-sensitive and applies to the whole name, so
/// `a.DISABLED` is included while `a.conf.disabled` is excluded.
#[must_use]
pub fn classify_file_name(name: &str) -> ConfigState {
    if name.ends_with(DISABLED_SUFFIX) {
        ConfigState::Excluded
    } else {
        ConfigState::Included
    }
}

/// Classify a document line.
///
/// Only a marker in the comment region after the argument counts; the
/// argument itself may contain the marker text. Returns `None` when the
/// line is not an `include` directive at all.
#[must_use]
pub fn classify_line(line: &str) -> Option<ConfigState> {
    directive_body(line)?;
    Some(if includes::marker_offset(line).is_some() {
        ConfigState::Excluded
    } else {
        ConfigState::Included
    })
}

/// Text following the `include` keyword, or `None` if `line` is not a
/// directive. The keyword must be followed by whitespace or end the line.
pub(crate) fn directive_body(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("include")?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

/// Where an item lives inside its backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Absolute path of a fragment file.
    File(PathBuf),
    /// Zero-based line index within the include document, with the
    /// trimmed directive text as it was scanned.
    Line {
        /// Line index.
        index: usize,
        /// Trimmed directive text.
        text: String,
    },
}

/// One enable-able configuration item as seen by a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigItem {
    /// File name or include target.
    pub name: String,
    /// State derived from the backing representation.
    pub state: ConfigState,
    /// Size in bytes (fragment files only, best-effort).
    pub size: Option<u64>,
    /// Handle used to mutate the item.
    pub locator: Locator,
}

impl ConfigItem {
    /// Text a caller-supplied selector is matched against: the file name
    /// for fragments, the trimmed directive line for includes.
    #[must_use]
    pub fn match_text(&self) -> &str {
        match &self.locator {
            Locator::File(_) => &self.name,
            Locator::Line { text, .. } => text,
        }
    }

    /// Path of the item, if it is a file.
    #[must_use]
    pub const fn path(&self) -> Option<&PathBuf> {
        match &self.locator {
            Locator::File(path) => Some(path),
            Locator::Line { .. } => None,
        }
    }
}

/// What happens to items a selector does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unmatched {
    /// Leave them out of the report entirely.
    Omit,
    /// Report them as skipped with reason `does not match pattern`.
    Skip,
}

/// A backing store that can be scanned and mutated item by item.
///
/// Implementations keep whatever they need between [`scan`](Self::scan) and
/// [`commit`](Self::commit); the engine calls them in that order within one
/// toggle call and never reuses a store across calls.
pub trait ConfigStore {
    /// Produce the current inventory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the store is absent and cannot
    /// be created, or [`StoreError::Io`] for any other fatal I/O failure.
    fn scan(&mut self) -> Result<Vec<ConfigItem>, StoreError>;

    /// Policy for items rejected by a selector.
    fn unmatched(&self) -> Unmatched;

    /// Move `item` to state `to`.
    ///
    /// # Errors
    ///
    /// Returns the per-item failure; the engine records it as skipped.
    fn mutate(&mut self, item: &ConfigItem, to: ConfigState) -> Result<(), StoreError>;

    /// Flush pending mutations.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered changes could not be persisted; every
    /// mutation since the scan is then considered failed.
    fn commit(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Compile an optional caller-supplied pattern.
///
/// Empty patterns select everything, like an absent one.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPattern`] if the pattern does not compile.
pub fn compile_pattern(pattern: Option<&str>) -> Result<Option<Regex>, StoreError> {
    match pattern {
        None | Some("") => Ok(None),
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|source| StoreError::InvalidPattern {
                pattern: p.to_string(),
                source,
            }),
    }
}
