use std::path::PathBuf;
use tracing::{debug, info};

use super::asset::select_asset;
use super::installer::UpdateInstaller;
use super::outcome::UpdateOutcome;
use super::release::{ReleaseAsset, ReleaseResolver, ReleaseSnapshot, UpdateTarget};
use super::transport::HttpTransport;
use super::unpack::ArchiveUnpacker;
use crate::constants::DEFAULT_API_URL;
use crate::core::UpdateError;
use crate::utils::platform::Platform;

/// Check-and-install pipeline for the running executable.
///
/// `SelfUpdater` wires the four stages together:
///
/// ```text
/// check:  gate -> resolve -> match
/// update: gate -> resolve -> match -> install (only if an update is available)
/// ```
///
/// Each call is self-contained. Nothing is cached between calls and no state
/// is shared, so concurrent `check`s are independent. Running two `update`s
/// against the same installation at once is not supported.
///
/// # Update availability
///
/// An update is available when an asset for this platform exists **and**
/// either `force` is set or the release tag differs from the current version.
/// Tags are compared as opaque strings after dropping one leading `v`, so
/// `v1.2.0` equals `1.2.0` but `1.2` does not. A feed that moved to an older
/// tag therefore also counts as "available".
///
/// # Examples
///
/// ```rust,no_run
/// use selfup::upgrade::{NativeUnpacker, ReqwestTransport, SelfUpdater, UpdateTarget};
///
/// # async fn example() -> anyhow::Result<()> {
/// let updater = SelfUpdater::new(ReqwestTransport::new()?, NativeUnpacker::current());
/// let target = UpdateTarget::new("acme/tool".parse()?, "tool");
///
/// let outcome = updater.check(&target).await?;
/// if outcome.update_available() {
///     println!("{} -> {}", updater.current_version(), outcome.latest_version());
///     updater.update(&target).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SelfUpdater<T, U> {
    transport: T,
    unpacker: U,
    platform: Platform,
    current_version: String,
    force: bool,
    api_base: String,
    install_dir: Option<PathBuf>,
}

/// What the read-only stages found.
struct Plan {
    snapshot: ReleaseSnapshot,
    asset: Option<usize>,
    available: bool,
}

impl Plan {
    fn asset(&self) -> Option<&ReleaseAsset> {
        self.asset.map(|i| &self.snapshot.assets[i])
    }

    fn outcome(&self) -> UpdateOutcome {
        match self.asset() {
            Some(asset) if self.available => {
                UpdateOutcome::available(&self.snapshot.tag, &asset.name)
            }
            asset => {
                UpdateOutcome::no_update(&self.snapshot.tag, asset.map(|a| a.name.clone()))
            }
        }
    }
}

impl<T: HttpTransport, U: ArchiveUnpacker> SelfUpdater<T, U> {
    /// Updater for this build: current platform, crate version, public GitHub
    /// API, executable's own directory.
    pub fn new(transport: T, unpacker: U) -> Self {
        Self {
            transport,
            unpacker,
            platform: Platform::current(),
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            force: false,
            api_base: DEFAULT_API_URL.to_string(),
            install_dir: None,
        }
    }

    /// Treat any release with a matching asset as an update, even the same tag.
    ///
    /// Useful for reinstalling a damaged installation.
    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Override the platform identity.
    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Override the version compared against release tags.
    #[must_use]
    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = version.into();
        self
    }

    /// Use another API root for the release feed.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Install into `dir` instead of the executable's directory.
    #[must_use]
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    /// Version the running binary reports.
    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Platform identity used for the gate and asset selection.
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Find out whether an update exists. Touches nothing on disk.
    ///
    /// # Errors
    ///
    /// [`UpdateError::UnsupportedPlatform`] before any request is made when
    /// this platform cannot self-update, otherwise any resolver error.
    pub async fn check(&self, target: &UpdateTarget) -> Result<UpdateOutcome, UpdateError> {
        let plan = self.plan(target).await?;
        Ok(plan.outcome())
    }

    /// Check, and install the update if one is available.
    ///
    /// Returns the check outcome unchanged when there is nothing to install.
    ///
    /// # Errors
    ///
    /// Everything [`check`](Self::check) can return, plus the installer's
    /// errors. Post-download failures carry the partial outcome.
    pub async fn update(&self, target: &UpdateTarget) -> Result<UpdateOutcome, UpdateError> {
        let plan = self.plan(target).await?;

        let asset = match plan.asset() {
            Some(asset) if plan.available => asset,
            _ => {
                info!("Nothing to install from {}", target.feed);
                return Ok(plan.outcome());
            }
        };

        let mut installer = UpdateInstaller::new(&self.transport, &self.unpacker);
        if let Some(dir) = &self.install_dir {
            installer = installer.with_install_dir(dir);
        }
        installer.install(&plan.snapshot, asset).await
    }

    async fn plan(&self, target: &UpdateTarget) -> Result<Plan, UpdateError> {
        if !self.platform.can_self_update() {
            debug!("Self-update refused on {}", self.platform);
            return Err(UpdateError::UnsupportedPlatform {
                platform: self.platform,
            });
        }

        let resolver = ReleaseResolver::new(&self.transport).with_api_base(&self.api_base);
        let snapshot = resolver.resolve(&target.feed).await?;

        let asset = select_asset(&snapshot, &target.asset_prefix, self.platform)
            .and_then(|selected| snapshot.assets.iter().position(|a| a == selected));

        let available = match asset {
            None => {
                info!(
                    "Release {} has no asset for {} (prefix '{}')",
                    snapshot.tag, self.platform, target.asset_prefix
                );
                false
            }
            Some(_) if self.force => true,
            Some(_) => !same_version(&snapshot.tag, &self.current_version),
        };

        if available {
            info!("Update available: {} -> {}", self.current_version, snapshot.tag);
        } else {
            debug!("No update: current {}, latest {}", self.current_version, snapshot.tag);
        }

        Ok(Plan {
            snapshot,
            asset,
            available,
        })
    }
}

/// Compare two version tags, ignoring one leading `v` or `V` on each.
pub fn same_version(a: &str, b: &str) -> bool {
    strip_v(a.trim()) == strip_v(b.trim())
}

fn strip_v(tag: &str) -> &str {
    tag.strip_prefix(['v', 'V']).unwrap_or(tag)
}
