//! Toggle engine and result aggregation.
//!
//! [`apply`] drives any [`ConfigStore`]: scan, select, compute each item's
//! transition, mutate, commit. Per-item failures are recorded, never raised.
use std::path::PathBuf;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{ConfigItem, ConfigState, ConfigStore, Unmatched};
use crate::error::StoreError;

/// Reason recorded for items a selector rejects.
pub const UNMATCHED_REASON: &str = "does not match pattern";

/// Requested state change.
///
/// # Examples
///
/// ```
/// use niri_mcp::store::{ConfigState, ToggleAction};
///
/// assert_eq!(ToggleAction::On.target(ConfigState::Excluded), Some(ConfigState::Included));
/// assert_eq!(ToggleAction::On.target(ConfigState::Included), None);
/// assert_eq!(ToggleAction::default(), ToggleAction::Toggle);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    /// Include excluded items.
    On,
    /// Exclude included items.
    Off,
    /// Flip every item.
    #[default]
    Toggle,
}

impl ToggleAction {
    /// The state an item in `current` moves to, or `None` for a no-op.
    #[must_use]
    pub const fn target(self, current: ConfigState) -> Option<ConfigState> {
        match (self, current) {
            (Self::On, ConfigState::Excluded) => Some(ConfigState::Included),
            (Self::Off, ConfigState::Included) => Some(ConfigState::Excluded),
            (Self::Toggle, state) => Some(state.flipped()),
            (Self::On, ConfigState::Included) | (Self::Off, ConfigState::Excluded) => None,
        }
    }
}

impl FromStr for ToggleAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "toggle" => Ok(Self::Toggle),
            other => Err(format!("unknown action '{other}' (expected on, off or toggle)")),
        }
    }
}

/// An item whose state actually changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affected {
    /// File name or include target.
    pub name: String,
    /// State before the call.
    pub previous_state: ConfigState,
    /// State after the call.
    pub new_state: ConfigState,
    /// Fragment path as scanned (fragment directory only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// An item the call did not change, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    /// File name or include target.
    pub name: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Outcome for one processed item. No-op transitions produce no outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Mutation succeeded.
    Affected(Affected),
    /// Filtered out or failed.
    Skipped(Skipped),
}

impl ToggleOutcome {
    fn skipped(name: &str, reason: impl Into<String>) -> Self {
        Self::Skipped(Skipped {
            name: name.to_string(),
            reason: reason.into(),
        })
    }
}

/// The `{affected, skipped}` report returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToggleReport {
    /// Items whose state changed, in processing order.
    pub affected: Vec<Affected>,
    /// Items left alone with a reason, in processing order.
    pub skipped: Vec<Skipped>,
}

impl FromIterator<ToggleOutcome> for ToggleReport {
    fn from_iter<I: IntoIterator<Item = ToggleOutcome>>(iter: I) -> Self {
        let mut report = Self::default();
        for outcome in iter {
            match outcome {
                ToggleOutcome::Affected(a) => report.affected.push(a),
                ToggleOutcome::Skipped(s) => report.skipped.push(s),
            }
        }
        report
    }
}

/// Apply `action` to every item of `store` selected by `selector`.
///
/// # Errors
///
/// Only scan failures are returned; mutation and commit failures are
/// reported as skipped items.
pub fn apply<S: ConfigStore + ?Sized>(
    store: &mut S,
    action: ToggleAction,
    selector: Option<&Regex>,
) -> Result<ToggleReport, StoreError> {
    let items = store.scan()?;
    let mut outcomes = Vec::with_capacity(items.len());

    for item in &items {
        if let Some(re) = selector
            && !re.is_match(item.match_text())
        {
            if store.unmatched() == Unmatched::Skip {
                outcomes.push(ToggleOutcome::skipped(&item.name, UNMATCHED_REASON));
            }
            continue;
        }
        if let Some(outcome) = transition(store, item, action) {
            outcomes.push(outcome);
        }
    }

    if let Err(e) = store.commit() {
        tracing::warn!("commit failed: {e}");
        let reason = e.to_string();
        for outcome in &mut outcomes {
            if let ToggleOutcome::Affected(a) = outcome {
                *outcome = ToggleOutcome::skipped(&a.name, reason.clone());
            }
        }
    }

    let report: ToggleReport = outcomes.into_iter().collect();
    tracing::debug!(
        "{:?}: {} affected, {} skipped",
        action,
        report.affected.len(),
        report.skipped.len()
    );
    Ok(report)
}

fn transition<S: ConfigStore + ?Sized>(
    store: &mut S,
    item: &ConfigItem,
    action: ToggleAction,
) -> Option<ToggleOutcome> {
    let to = action.target(item.state)?;
    Some(match store.mutate(item, to) {
        Ok(()) => ToggleOutcome::Affected(Affected {
            name: item.name.clone(),
            previous_state: item.state,
            new_state: to,
            path: item.path().cloned(),
        }),
        Err(e) => {
            tracing::warn!("{}: {e}", item.name);
            ToggleOutcome::skipped(&item.name, e.to_string())
        }
    })
}
