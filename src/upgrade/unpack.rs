//! Unpacking a downloaded archive into the install directory.
//!
//! Archive decoding is delegated to the tools the operating system ships:
//! `unzip` and `tar` on macOS and Linux, bsdtar (`tar.exe`) on Windows.
//! The [`ArchiveUnpacker`] trait is the seam the installer calls through, so
//! tests can substitute a recorder and never spawn anything.

use futures::future::BoxFuture;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::utils::platform::{Platform, find_command};

/// An unpack attempt that did not complete.
///
/// Files may already have been written to the destination when this is
/// returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{tool}: {reason}")]
pub struct UnpackError {
    /// Tool that was (or would have been) run
    pub tool: String,
    /// Exit status and stderr, or why the tool could not run
    pub reason: String,
}

impl UnpackError {
    /// Build an error for `tool`.
    pub fn new(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

/// Extract an archive into a directory, overwriting same-named files.
pub trait ArchiveUnpacker: Send + Sync {
    /// Unpack `archive` into `dest`.
    ///
    /// `dest` exists. Implementations must not return before extraction has
    /// finished or failed.
    fn unpack<'a>(&'a self, archive: &'a Path, dest: &'a Path)
    -> BoxFuture<'a, Result<(), UnpackError>>;
}

impl<U: ArchiveUnpacker + ?Sized> ArchiveUnpacker for &U {
    fn unpack<'a>(
        &'a self,
        archive: &'a Path,
        dest: &'a Path,
    ) -> BoxFuture<'a, Result<(), UnpackError>> {
        (**self).unpack(archive, dest)
    }
}

/// Archive formats recognised by file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `.zip`
    Zip,
    /// `.tar.gz` or `.tgz`
    TarGz,
}

impl ArchiveKind {
    /// Detect the format from a file name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Some(Self::Zip)
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// File suffix to give the temporary download so unpack tools recognise it.
///
/// Multi-part suffixes like `.tar.gz` are kept whole; unknown names yield
/// their last extension, or nothing.
pub fn archive_suffix(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".tar.gz") {
        return name[name.len() - ".tar.gz".len()..].to_string();
    }
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// [`ArchiveUnpacker`] that runs the platform's own archive tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeUnpacker {
    platform: Platform,
    search_path: Option<OsString>,
}

impl NativeUnpacker {
    /// Unpacker for the given platform family.
    pub const fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            search_path: None,
        }
    }

    /// Look for the archive tool in `paths` (`PATH` syntax) instead of the
    /// process `PATH`.
    #[must_use]
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    /// Unpacker for the platform this binary was built for.
    pub fn current() -> Self {
        Self::for_platform(Platform::current())
    }

    /// Program and arguments that would unpack `archive` into `dest`.
    ///
    /// # Errors
    ///
    /// Fails when the platform has no native tool or the archive format is not
    /// recognised.
    pub fn command_for(
        &self,
        archive: &Path,
        dest: &Path,
    ) -> Result<(&'static str, Vec<OsString>), UnpackError> {
        let name = archive.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let archive = archive.as_os_str().to_owned();
        let dest = dest.as_os_str().to_owned();

        if self.platform == Platform::Unsupported {
            return Err(UnpackError::new("unpack", "no native archive tool on this platform"));
        }
        let Some(kind) = ArchiveKind::from_name(&name) else {
            return Err(UnpackError::new(
                "unpack",
                format!("unrecognised archive format for '{name}'"),
            ));
        };

        match (self.platform, kind) {
            // bsdtar reads both formats.
            (Platform::Windows, _) => Ok(("tar", vec!["-xf".into(), archive, "-C".into(), dest])),
            (_, ArchiveKind::Zip) => {
                Ok(("unzip", vec!["-o".into(), "-q".into(), archive, "-d".into(), dest]))
            }
            (_, ArchiveKind::TarGz) => Ok(("tar", vec!["-xzf".into(), archive, "-C".into(), dest])),
        }
    }
}

impl ArchiveUnpacker for NativeUnpacker {
    fn unpack<'a>(
        &'a self,
        archive: &'a Path,
        dest: &'a Path,
    ) -> BoxFuture<'a, Result<(), UnpackError>> {
        Box::pin(async move {
            let (tool, args) = self.command_for(archive, dest)?;
            let program = find_command(tool, self.search_path.as_deref())
                .ok_or_else(|| UnpackError::new(tool, format!("'{tool}' was not found on PATH")))?;

            debug!(
                "Executing command: {} {}",
                tool,
                args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" ")
            );

            let output = Command::new(&program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await
                .map_err(|e| UnpackError::new(tool, format!("failed to start: {e}")))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr = stderr.trim();
                let reason = if stderr.is_empty() {
                    format!("exited with {}", output.status)
                } else {
                    format!("exited with {}: {stderr}", output.status)
                };
                return Err(UnpackError::new(tool, reason));
            }

            debug!("{} completed successfully", tool);
            Ok(())
        })
    }
}
