//! Release feed lookup.
//!
//! Reads the "latest release" document of a GitHub repository and reduces it
//! to a [`ReleaseSnapshot`]: the tag plus the ordered list of downloadable
//! assets. Nothing is cached; every [`ReleaseResolver::resolve`] call hits the
//! feed once.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::transport::{ACCEPT_JSON, HttpTransport};
use crate::constants::DEFAULT_API_URL;
use crate::core::UpdateError;

/// Where releases are published: a GitHub `owner/repo` pair.
///
/// # Examples
///
/// ```rust
/// use selfup::upgrade::ReleaseFeed;
///
/// let feed: ReleaseFeed = "acme/tool".parse().unwrap();
/// assert_eq!(feed.owner(), "acme");
/// assert_eq!(feed.repo(), "tool");
/// assert_eq!(feed.to_string(), "acme/tool");
///
/// assert!("acme".parse::<ReleaseFeed>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseFeed {
    owner: String,
    repo: String,
}

impl ReleaseFeed {
    /// Build a feed from its two parts.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::InvalidFeed`] when either part is empty or
    /// contains a `/`.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self, UpdateError> {
        let owner = owner.into();
        let repo = repo.into();
        let input = format!("{owner}/{repo}");
        for (part, what) in [(&owner, "owner"), (&repo, "repository")] {
            if part.trim().is_empty() {
                return Err(UpdateError::InvalidFeed {
                    input,
                    reason: format!("{what} is empty"),
                });
            }
            if part.contains('/') || part.chars().any(char::is_whitespace) {
                return Err(UpdateError::InvalidFeed {
                    input,
                    reason: format!("{what} '{part}' contains '/' or whitespace"),
                });
            }
        }
        Ok(Self {
            owner,
            repo,
        })
    }

    /// Repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl FromStr for ReleaseFeed {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((owner, repo)) = s.trim().split_once('/') else {
            return Err(UpdateError::InvalidFeed {
                input: s.to_string(),
                reason: "expected 'owner/repo'".to_string(),
            });
        };
        Self::new(owner, repo)
    }
}

impl fmt::Display for ReleaseFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// What the running program considers its own release stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTarget {
    /// Feed to read releases from
    pub feed: ReleaseFeed,
    /// Product part of asset names, e.g. `tool` in `tool-linux.tar.gz`
    pub asset_prefix: String,
}

impl UpdateTarget {
    /// Pair a feed with a logical asset prefix.
    pub fn new(feed: ReleaseFeed, asset_prefix: impl Into<String>) -> Self {
        Self {
            feed,
            asset_prefix: asset_prefix.into(),
        }
    }
}

/// One downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    /// File name as published
    pub name: String,
    /// Direct download location
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

impl ReleaseAsset {
    /// Build an asset record.
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
        }
    }
}

/// State of the feed at query time.
///
/// The tag is opaque: it is compared for equality only, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseSnapshot {
    /// Release tag, e.g. `v1.2.0`
    #[serde(rename = "tag_name")]
    pub tag: String,
    /// Assets in the order the feed listed them
    pub assets: Vec<ReleaseAsset>,
}

/// Reads the latest release of a feed through an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct ReleaseResolver<T> {
    transport: T,
    api_base: String,
}

impl<T: HttpTransport> ReleaseResolver<T> {
    /// Resolver against the public GitHub API.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            api_base: DEFAULT_API_URL.to_string(),
        }
    }

    /// Use another API root (GitHub Enterprise, or a mock server in tests).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// URL of the "latest release" endpoint for `feed`.
    pub fn latest_release_url(&self, feed: &ReleaseFeed) -> String {
        format!("{}/repos/{}/{}/releases/latest", self.api_base, feed.owner(), feed.repo())
    }

    /// Fetch and decode the latest release.
    ///
    /// Issues exactly one request and never retries.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::FeedUnreachable`] if no response was received
    /// - [`UpdateError::FeedRejected`] on a non-2xx status
    /// - [`UpdateError::FeedMalformed`] if the body is not a release document
    pub async fn resolve(&self, feed: &ReleaseFeed) -> Result<ReleaseSnapshot, UpdateError> {
        let url = self.latest_release_url(feed);
        debug!("Resolving latest release of {} from {}", feed, url);

        let response =
            self.transport.get(&url, ACCEPT_JSON).await.map_err(|e| {
                UpdateError::FeedUnreachable {
                    feed: feed.to_string(),
                    reason: e.to_string(),
                }
            })?;

        if !response.is_success() {
            return Err(UpdateError::FeedRejected {
                feed: feed.to_string(),
                status: response.status,
            });
        }

        let snapshot: ReleaseSnapshot =
            serde_json::from_slice(&response.body).map_err(|e| UpdateError::FeedMalformed {
                feed: feed.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Feed {} is at {} with {} asset(s)", feed, snapshot.tag, snapshot.assets.len());
        Ok(snapshot)
    }
}
