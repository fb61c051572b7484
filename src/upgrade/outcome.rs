//! The record a check or update hands back to its caller.

use serde::{Serialize, Serializer};
use std::fmt;

/// How far the pipeline got for one invocation.
///
/// Ordered: every stage implies all the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Checked,
    Available,
    Downloaded,
    Installed,
}

/// Result of a `check` or `update` run.
///
/// The three flags (`update_available`, `downloaded`, `installed`) are derived
/// from a single ordered stage, so an outcome can never report an install
/// without a download, or a download without an available update. Transitions
/// consume the value and return a new one; nothing mutates an outcome after it
/// has been handed out.
///
/// # Examples
///
/// ```rust
/// use selfup::upgrade::UpdateOutcome;
///
/// let outcome = UpdateOutcome::available("v1.2.0", "tool-linux.zip").mark_downloaded();
/// assert!(outcome.update_available());
/// assert!(outcome.downloaded());
/// assert!(!outcome.installed());
/// assert_eq!(outcome.asset_name(), Some("tool-linux.zip"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    latest_version: String,
    asset_name: Option<String>,
    stage: Stage,
}

impl UpdateOutcome {
    /// The feed was read but there is nothing to install.
    ///
    /// Covers both "already on the latest tag" and "no asset for this platform".
    /// `asset_name` is kept when an asset matched so callers can still show it.
    #[must_use]
    pub fn no_update(latest_version: impl Into<String>, asset_name: Option<String>) -> Self {
        Self {
            latest_version: latest_version.into(),
            asset_name,
            stage: Stage::Checked,
        }
    }

    /// A newer release with an asset for this platform exists.
    #[must_use]
    pub fn available(latest_version: impl Into<String>, asset_name: impl Into<String>) -> Self {
        Self {
            latest_version: latest_version.into(),
            asset_name: Some(asset_name.into()),
            stage: Stage::Available,
        }
    }

    /// Mark the asset as fully downloaded.
    ///
    /// Has no effect unless an update was available: a download of nothing is
    /// not representable.
    #[must_use]
    pub fn mark_downloaded(self) -> Self {
        self.advance(Stage::Downloaded)
    }

    /// Mark the archive as unpacked into the install directory.
    ///
    /// Has no effect unless the download stage was reached.
    #[must_use]
    pub fn mark_installed(self) -> Self {
        self.advance(Stage::Installed)
    }

    fn advance(mut self, to: Stage) -> Self {
        // Only step forward one stage at a time from a reachable predecessor.
        let from = match to {
            Stage::Downloaded => Stage::Available,
            Stage::Installed => Stage::Downloaded,
            Stage::Checked | Stage::Available => return self,
        };
        if self.stage == from {
            self.stage = to;
        }
        self
    }

    /// Release tag seen on the feed.
    pub fn latest_version(&self) -> &str {
        &self.latest_version
    }

    /// Asset selected for this platform, if any.
    pub fn asset_name(&self) -> Option<&str> {
        self.asset_name.as_deref()
    }

    /// Whether an update exists for this platform.
    pub fn update_available(&self) -> bool {
        self.stage >= Stage::Available
    }

    /// Whether the asset download completed.
    pub fn downloaded(&self) -> bool {
        self.stage >= Stage::Downloaded
    }

    /// Whether the archive was fully unpacked.
    pub fn installed(&self) -> bool {
        self.stage >= Stage::Installed
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.stage {
            Stage::Checked => "no update",
            Stage::Available => "update available",
            Stage::Downloaded => "downloaded, not installed",
            Stage::Installed => "installed",
        };
        write!(f, "{} ({state})", self.latest_version)
    }
}

#[derive(Serialize)]
struct OutcomeReport<'a> {
    latest_version: &'a str,
    update_available: bool,
    downloaded: bool,
    installed: bool,
    asset_name: Option<&'a str>,
}

impl Serialize for UpdateOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        OutcomeReport {
            latest_version: &self.latest_version,
            update_available: self.update_available(),
            downloaded: self.downloaded(),
            installed: self.installed(),
            asset_name: self.asset_name(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_monotone(outcome: &UpdateOutcome) {
        if outcome.installed() {
            assert!(outcome.downloaded(), "installed without download: {outcome:?}");
        }
        if outcome.downloaded() {
            assert!(outcome.update_available(), "downloaded without update: {outcome:?}");
        }
    }

    #[test]
    fn test_no_update_has_no_flags() {
        let outcome = UpdateOutcome::no_update("v1.0.0", None);
        assert!(!outcome.update_available());
        assert!(!outcome.downloaded());
        assert!(!outcome.installed());
        assert_eq!(outcome.latest_version(), "v1.0.0");
        assert_eq!(outcome.asset_name(), None);
    }

    #[test]
    fn test_full_chain() {
        let outcome =
            UpdateOutcome::available("v2.0.0", "tool-macos.zip").mark_downloaded().mark_installed();
        assert!(outcome.update_available());
        assert!(outcome.downloaded());
        assert!(outcome.installed());
    }

    #[test]
    fn test_transitions_cannot_skip_stages() {
        // Installing straight from "available" skips the download.
        let skipped = UpdateOutcome::available("v2.0.0", "tool-linux.zip").mark_installed();
        assert!(!skipped.installed());
        assert!(!skipped.downloaded());

        // Nothing can be downloaded when no update exists.
        let none = UpdateOutcome::no_update("v2.0.0", None).mark_downloaded().mark_installed();
        assert!(!none.update_available());
        assert!(!none.downloaded());
        assert!(!none.installed());
    }

    #[test]
    fn test_every_reachable_outcome_is_monotone() {
        let starts = [
            UpdateOutcome::no_update("v1", None),
            UpdateOutcome::no_update("v1", Some("tool-linux.zip".to_string())),
            UpdateOutcome::available("v1", "tool-linux.zip"),
        ];
        for start in starts {
            let down: fn(UpdateOutcome) -> UpdateOutcome = UpdateOutcome::mark_downloaded;
            let inst: fn(UpdateOutcome) -> UpdateOutcome = UpdateOutcome::mark_installed;
            let sequences =
                [vec![], vec![down], vec![inst], vec![down, inst], vec![inst, down]];
            for steps in sequences {
                let outcome = steps.iter().fold(start.clone(), |o, step| step(o));
                assert_monotone(&outcome);
            }
        }
    }

    #[test]
    fn test_serializes_flat_flags() {
        let outcome = UpdateOutcome::available("v1.2.0", "tool-linux.zip").mark_downloaded();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["latest_version"], "v1.2.0");
        assert_eq!(json["update_available"], true);
        assert_eq!(json["downloaded"], true);
        assert_eq!(json["installed"], false);
        assert_eq!(json["asset_name"], "tool-linux.zip");
    }

    #[test]
    fn test_display() {
        let outcome = UpdateOutcome::available("v1.2.0", "tool-linux.zip");
        assert_eq!(outcome.to_string(), "v1.2.0 (update available)");
    }
}
