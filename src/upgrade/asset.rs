//! Picking the release asset built for this platform.
//!
//! Assets follow the naming convention `<prefix>-<label>...`, where `label`
//! is one of `macos`, `linux` or `windows` (see [`Platform::label`]). Anything
//! published under another scheme is never selected.

use super::release::{ReleaseAsset, ReleaseSnapshot};
use crate::utils::platform::Platform;

/// Name prefix an asset for `platform` must start with.
///
/// Returns `None` for [`Platform::Unsupported`], which has no label.
///
/// ```rust
/// use selfup::upgrade::expected_asset_prefix;
/// use selfup::utils::platform::Platform;
///
/// assert_eq!(expected_asset_prefix("tool", Platform::Linux).as_deref(), Some("tool-linux"));
/// assert_eq!(expected_asset_prefix("tool", Platform::Unsupported), None);
/// ```
pub fn expected_asset_prefix(asset_prefix: &str, platform: Platform) -> Option<String> {
    platform.label().map(|label| format!("{asset_prefix}-{label}"))
}

/// Select the asset for `platform`, first match in feed order.
///
/// `None` means no compatible asset exists. That is an ordinary result, not
/// an error: the pipeline reports it as "no update available".
pub fn select_asset<'a>(
    snapshot: &'a ReleaseSnapshot,
    asset_prefix: &str,
    platform: Platform,
) -> Option<&'a ReleaseAsset> {
    let expected = expected_asset_prefix(asset_prefix, platform)?;
    snapshot.assets.iter().find(|asset| asset.name.starts_with(&expected))
}
