//! Platform identity and the self-update capability gate
//!
//! Every platform-conditional decision in the updater goes through [`Platform`].
//! The gate ([`Platform::can_self_update`]) and the asset matcher
//! ([`crate::upgrade::asset::select_asset`]) both read the platform label from
//! [`Platform::label`], so the two can never disagree on spelling.
//!
//! # Platform Support Matrix
//!
//! | Platform      | Label     | In-place update |
//! |---------------|-----------|-----------------|
//! | macOS         | `macos`   | ✅              |
//! | Linux         | `linux`   | ✅              |
//! | Windows       | `windows` | ✅              |
//! | anything else | n/a       | ❌ (store/package channel) |
//!
//! iOS and Android builds run inside a sandbox that forbids rewriting the
//! application bundle, so they land in [`Platform::Unsupported`] together with
//! every other target the release feed does not publish assets for.
//!
//! # Examples
//!
//! ```rust
//! use selfup::utils::platform::{Platform, can_self_update};
//!
//! let platform = Platform::current();
//! assert_eq!(platform.can_self_update(), can_self_update());
//!
//! assert_eq!(Platform::from_os_name("macos").label(), Some("macos"));
//! assert_eq!(Platform::from_os_name("android").label(), None);
//! ```

use serde::Serialize;
use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Normalized operating-system family of the running executable.
///
/// This is a closed set: new targets must be mapped onto one of these variants,
/// never carried around as free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Apple macOS (Intel and Apple Silicon share one label).
    MacOs,
    /// Any Linux distribution.
    Linux,
    /// Microsoft Windows.
    Windows,
    /// Mobile, sandboxed, or otherwise unpublished targets.
    Unsupported,
}

impl Platform {
    /// All variants, in a stable order.
    pub const ALL: [Platform; 4] =
        [Platform::MacOs, Platform::Linux, Platform::Windows, Platform::Unsupported];

    /// The platform this binary was compiled for.
    ///
    /// Computed from `target_os`, so it is a pure function of the build and
    /// never touches the environment.
    #[must_use]
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Normalize an OS name as reported by [`std::env::consts::OS`].
    ///
    /// Matching is case-insensitive and accepts `darwin` as an alias for macOS.
    #[must_use]
    pub fn from_os_name(os: &str) -> Self {
        match os.to_ascii_lowercase().as_str() {
            "macos" | "darwin" => Platform::MacOs,
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            _ => Platform::Unsupported,
        }
    }

    /// The label release assets carry for this platform.
    ///
    /// Returns `None` for [`Platform::Unsupported`]: no asset is ever published
    /// for it, so nothing can match.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Platform::MacOs => Some("macos"),
            Platform::Linux => Some("linux"),
            Platform::Windows => Some("windows"),
            Platform::Unsupported => None,
        }
    }

    /// Whether the process may rewrite its own installation directory.
    ///
    /// Desktop platforms allow it; sandboxed runtimes must go through their
    /// store's update channel instead.
    #[must_use]
    pub const fn can_self_update(self) -> bool {
        matches!(self, Platform::MacOs | Platform::Linux | Platform::Windows)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or("unsupported"))
    }
}

/// Capability gate for the platform this binary targets.
#[must_use]
pub fn can_self_update() -> bool {
    Platform::current().can_self_update()
}

/// Directory containing the running executable, with symlinks resolved.
///
/// Package managers and version switchers commonly put a symlink on `PATH`;
/// the real installation is wherever that link points, so the path is
/// canonicalized before taking its parent.
///
/// # Errors
///
/// Fails if the executable path cannot be determined or resolved.
pub fn current_exe_dir() -> io::Result<PathBuf> {
    exe_parent_dir(&std::env::current_exe()?)
}

/// Resolve `exe` to its real location and return the containing directory.
///
/// # Errors
///
/// Fails if `exe` cannot be canonicalized or has no parent.
pub fn exe_parent_dir(exe: &Path) -> io::Result<PathBuf> {
    let real = dunce_canonicalize(exe)?;
    real.parent().map(Path::to_path_buf).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} has no parent directory", real.display()),
        )
    })
}

/// Canonicalize without the `\\?\` verbatim prefix on Windows.
///
/// Native archive tools reject verbatim paths, and the result is handed to
/// them as the extraction target.
fn dunce_canonicalize(path: &Path) -> io::Result<PathBuf> {
    let canonical = std::fs::canonicalize(path)?;
    #[cfg(windows)]
    {
        let s = canonical.to_string_lossy();
        if let Some(stripped) = s.strip_prefix(r"\\?\") {
            if !stripped.starts_with("UNC\\") {
                return Ok(PathBuf::from(stripped));
            }
        }
    }
    Ok(canonical)
}

/// Locate `cmd` on `search_path`, or on the process `PATH` when `None`.
///
/// The search path uses the platform's `PATH` syntax.
pub fn find_command(cmd: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    match search_path {
        Some(paths) => {
            let cwd = std::env::current_dir().ok()?;
            which::which_in(cmd, Some(paths), cwd).ok()
        }
        None => which::which(cmd).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_desktop_platforms_can_self_update() {
        for platform in [Platform::MacOs, Platform::Linux, Platform::Windows] {
            assert!(platform.can_self_update(), "{platform:?} should be updatable");
        }
    }

    #[test]
    fn test_unsupported_platform_cannot_self_update() {
        assert!(!Platform::Unsupported.can_self_update());
        for os in ["ios", "android", "wasm32", "freebsd", ""] {
            assert!(!Platform::from_os_name(os).can_self_update(), "{os} must be refused");
        }
    }

    #[test]
    fn test_from_os_name_normalizes() {
        assert_eq!(Platform::from_os_name("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os_name("Darwin"), Platform::MacOs);
        assert_eq!(Platform::from_os_name("LINUX"), Platform::Linux);
        assert_eq!(Platform::from_os_name("windows"), Platform::Windows);
        assert_eq!(Platform::from_os_name("android"), Platform::Unsupported);
    }

    #[test]
    fn test_labels_are_fixed() {
        assert_eq!(Platform::MacOs.label(), Some("macos"));
        assert_eq!(Platform::Linux.label(), Some("linux"));
        assert_eq!(Platform::Windows.label(), Some("windows"));
        assert_eq!(Platform::Unsupported.label(), None);
    }

    #[test]
    fn test_gate_and_label_agree() {
        // Every updatable platform has a label and vice versa.
        for platform in Platform::ALL {
            assert_eq!(platform.can_self_update(), platform.label().is_some());
        }
    }

    #[test]
    fn test_current_matches_target_os() {
        #[cfg(target_os = "macos")]
        assert_eq!(Platform::current(), Platform::MacOs);
        #[cfg(target_os = "linux")]
        assert_eq!(Platform::current(), Platform::Linux);
        #[cfg(target_os = "windows")]
        assert_eq!(Platform::current(), Platform::Windows);
    }

    #[test]
    fn test_display() {
        assert_eq!(Platform::Linux.to_string(), "linux");
        assert_eq!(Platform::Unsupported.to_string(), "unsupported");
    }

    #[test]
    fn test_exe_parent_dir_resolves_file() {
        let temp = TempDir::new().unwrap();
        let exe = temp.path().join("tool");
        std::fs::write(&exe, b"binary").unwrap();

        let dir = exe_parent_dir(&exe).unwrap();
        assert_eq!(dir, std::fs::canonicalize(temp.path()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_exe_parent_dir_follows_symlink() {
        let temp = TempDir::new().unwrap();
        let real_dir = temp.path().join("install");
        let link_dir = temp.path().join("bin");
        std::fs::create_dir_all(&real_dir).unwrap();
        std::fs::create_dir_all(&link_dir).unwrap();
        let exe = real_dir.join("tool");
        std::fs::write(&exe, b"binary").unwrap();
        let link = link_dir.join("tool");
        std::os::unix::fs::symlink(&exe, &link).unwrap();

        let dir = exe_parent_dir(&link).unwrap();
        assert_eq!(dir, std::fs::canonicalize(&real_dir).unwrap());
    }

    #[test]
    fn test_exe_parent_dir_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = exe_parent_dir(&temp.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_current_exe_dir_exists() {
        let dir = current_exe_dir().unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_find_command_in_empty_search_path() {
        let temp = TempDir::new().unwrap();
        assert_eq!(find_command("tar", Some(temp.path().as_os_str())), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_command_in_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("fake-unzip");
        std::fs::write(&tool, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(find_command("fake-unzip", Some(temp.path().as_os_str())), Some(tool));
    }
}
