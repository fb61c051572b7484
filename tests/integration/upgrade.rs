use anyhow::Result;
use selfup::core::UpdateError;
use selfup::test_utils::{RecordingUnpacker, init_test_logging, release_json_with_base};
use selfup::upgrade::{NativeUnpacker, ReqwestTransport, SelfUpdater, UpdateTarget};
use selfup::utils::platform::Platform;
use std::time::Duration;
use tempfile::TempDir;

const FEED_PATH: &str = "/repos/acme/tool/releases/latest";

fn target() -> UpdateTarget {
    UpdateTarget::new("acme/tool".parse().unwrap(), "tool")
}

fn transport() -> ReqwestTransport {
    ReqwestTransport::builder().timeout(Duration::from_secs(10)).build().unwrap()
}

/// A check over real HTTP selects the asset and downloads nothing.
#[tokio::test]
async fn test_check_against_mock_feed() -> Result<()> {
    init_test_logging(None);
    let mut server = mockito::Server::new_async().await;
    let feed = server
        .mock("GET", FEED_PATH)
        .match_header("accept", "application/vnd.github+json")
        .match_header("user-agent", mockito::Matcher::Regex("^selfup/".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(release_json_with_base(
            "v1.2.0",
            &["tool-macos.zip", "tool-linux.zip"],
            &server.url(),
        ))
        .expect(1)
        .create_async()
        .await;

    let unpacker = RecordingUnpacker::new();
    let updater = SelfUpdater::new(transport(), &unpacker)
        .with_platform(Platform::MacOs)
        .with_current_version("1.0.0")
        .with_api_base(server.url());

    let outcome = updater.check(&target()).await?;
    assert!(outcome.update_available());
    assert_eq!(outcome.asset_name(), Some("tool-macos.zip"));
    assert!(!outcome.downloaded());

    feed.assert_async().await;
    assert!(unpacker.calls().is_empty());
    Ok(())
}

/// The bearer token is sent when configured.
#[tokio::test]
async fn test_token_is_sent() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let feed = server
        .mock("GET", FEED_PATH)
        .match_header("authorization", "Bearer sekrit")
        .with_status(200)
        .with_body(release_json_with_base("v1.0.0", &[], &server.url()))
        .create_async()
        .await;

    let transport = ReqwestTransport::builder().token(Some("sekrit".to_string())).build()?;
    let updater = SelfUpdater::new(transport, RecordingUnpacker::new())
        .with_platform(Platform::Linux)
        .with_api_base(server.url());

    let outcome = updater.check(&target()).await?;
    assert!(!outcome.update_available());
    feed.assert_async().await;
    Ok(())
}

/// A 404 from the feed is `FeedRejected` and nothing else is requested.
#[tokio::test]
async fn test_not_found_feed() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let feed = server
        .mock("GET", FEED_PATH)
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .expect(1)
        .create_async()
        .await;

    let unpacker = RecordingUnpacker::new();
    let updater = SelfUpdater::new(transport(), &unpacker)
        .with_platform(Platform::Linux)
        .with_api_base(server.url());

    let err = updater.update(&target()).await.unwrap_err();
    assert!(matches!(
        err,
        UpdateError::FeedRejected {
            status: 404,
            ..
        }
    ));
    assert!(err.is_retryable());
    feed.assert_async().await;
    assert!(unpacker.calls().is_empty());
    Ok(())
}

/// A server error while downloading the asset is `DownloadFailed`.
#[tokio::test]
async fn test_asset_download_failure() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _feed = server
        .mock("GET", FEED_PATH)
        .with_status(200)
        .with_body(release_json_with_base("v2.0.0", &["tool-linux.zip"], &server.url()))
        .create_async()
        .await;
    let asset = server
        .mock("GET", "/download/v2.0.0/tool-linux.zip")
        .match_header("accept", "application/octet-stream")
        .with_status(502)
        .expect(1)
        .create_async()
        .await;

    let temp = TempDir::new()?;
    let unpacker = RecordingUnpacker::new();
    let updater = SelfUpdater::new(transport(), &unpacker)
        .with_platform(Platform::Linux)
        .with_current_version("1.0.0")
        .with_api_base(server.url())
        .with_install_dir(temp.path());

    let err = updater.update(&target()).await.unwrap_err();
    match err {
        UpdateError::DownloadFailed {
            asset,
            reason,
        } => {
            assert_eq!(asset, "tool-linux.zip");
            assert_eq!(reason, "HTTP 502");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    asset.assert_async().await;
    assert!(unpacker.calls().is_empty());
    Ok(())
}

/// Malformed feed bodies are reported, not retried.
#[tokio::test]
async fn test_malformed_feed() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let feed = server
        .mock("GET", FEED_PATH)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .expect(1)
        .create_async()
        .await;

    let updater = SelfUpdater::new(transport(), RecordingUnpacker::new())
        .with_platform(Platform::Linux)
        .with_api_base(server.url());

    let err = updater.check(&target()).await.unwrap_err();
    assert!(matches!(err, UpdateError::FeedMalformed { .. }));
    assert!(!err.is_retryable());
    feed.assert_async().await;
    Ok(())
}

/// With no archive tool available the update stops after download and the
/// installation is left alone.
#[tokio::test]
async fn test_missing_unpack_tool_is_extract_failure() -> Result<()> {
    let install = TempDir::new()?;
    let empty_path = TempDir::new()?;
    std::fs::write(install.path().join("tool"), b"old binary")?;

    let mut server = mockito::Server::new_async().await;
    let _feed = server
        .mock("GET", FEED_PATH)
        .with_status(200)
        .with_body(release_json_with_base("v2.0.0", &["tool-linux.tar.gz"], &server.url()))
        .create_async()
        .await;
    let asset = server
        .mock("GET", "/download/v2.0.0/tool-linux.tar.gz")
        .with_status(200)
        .with_body("archive bytes")
        .expect(1)
        .create_async()
        .await;

    let unpacker = NativeUnpacker::for_platform(Platform::Linux)
        .with_search_path(empty_path.path().as_os_str());
    let updater = SelfUpdater::new(transport(), unpacker)
        .with_platform(Platform::Linux)
        .with_current_version("1.0.0")
        .with_api_base(server.url())
        .with_install_dir(install.path());

    let err = updater.update(&target()).await.unwrap_err();
    let UpdateError::ExtractFailed {
        tool,
        reason,
        outcome,
    } = &err
    else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(tool, "tar");
    assert!(reason.contains("not found on PATH"), "{reason}");
    assert!(outcome.downloaded());
    assert!(!outcome.installed());
    assert_eq!(std::fs::read(install.path().join("tool"))?, b"old binary");
    asset.assert_async().await;
    Ok(())
}

#[cfg(unix)]
mod native_unpack {
    use super::*;
    use selfup::utils::platform::find_command;
    use std::process::Command;

    fn make_tarball(dir: &std::path::Path) -> Vec<u8> {
        let staging = dir.join("staging");
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::write(staging.join("tool"), b"#!/bin/sh\necho v2\n").unwrap();
        std::fs::write(staging.join("README.txt"), b"release notes").unwrap();

        let archive = dir.join("tool-linux.tar.gz");
        let status = Command::new("tar")
            .arg("-czf")
            .arg(&archive)
            .arg("-C")
            .arg(&staging)
            .arg("tool")
            .arg("README.txt")
            .status()
            .unwrap();
        assert!(status.success());
        std::fs::read(&archive).unwrap()
    }

    /// Full update: real download, real `tar`, files land in the install dir.
    #[tokio::test]
    async fn test_update_extracts_with_tar() -> Result<()> {
        if find_command("tar", None).is_none() {
            return Ok(());
        }
        let work = TempDir::new()?;
        let install = TempDir::new()?;
        std::fs::write(install.path().join("tool"), b"old binary")?;
        let tarball = make_tarball(work.path());

        let mut server = mockito::Server::new_async().await;
        let _feed = server
            .mock("GET", FEED_PATH)
            .with_status(200)
            .with_body(release_json_with_base("v2.0.0", &["tool-linux.tar.gz"], &server.url()))
            .create_async()
            .await;
        let _asset = server
            .mock("GET", "/download/v2.0.0/tool-linux.tar.gz")
            .with_status(200)
            .with_body(tarball)
            .create_async()
            .await;

        let updater =
            SelfUpdater::new(transport(), NativeUnpacker::for_platform(Platform::Linux))
                .with_platform(Platform::Linux)
                .with_current_version("1.0.0")
                .with_api_base(server.url())
                .with_install_dir(install.path());

        let outcome = updater.update(&target()).await?;
        assert!(outcome.installed());
        assert_eq!(std::fs::read(install.path().join("tool"))?, b"#!/bin/sh\necho v2\n");
        assert_eq!(std::fs::read(install.path().join("README.txt"))?, b"release notes");
        Ok(())
    }

    /// A corrupt archive makes `tar` fail; the outcome says downloaded but
    /// not installed.
    #[tokio::test]
    async fn test_corrupt_archive_is_extract_failure() -> Result<()> {
        if find_command("tar", None).is_none() {
            return Ok(());
        }
        let install = TempDir::new()?;
        std::fs::write(install.path().join("tool"), b"old binary")?;

        let mut server = mockito::Server::new_async().await;
        let _feed = server
            .mock("GET", FEED_PATH)
            .with_status(200)
            .with_body(release_json_with_base("v2.0.0", &["tool-linux.tar.gz"], &server.url()))
            .create_async()
            .await;
        let _asset = server
            .mock("GET", "/download/v2.0.0/tool-linux.tar.gz")
            .with_status(200)
            .with_body("definitely not gzip")
            .create_async()
            .await;

        let updater =
            SelfUpdater::new(transport(), NativeUnpacker::for_platform(Platform::Linux))
                .with_platform(Platform::Linux)
                .with_current_version("1.0.0")
                .with_api_base(server.url())
                .with_install_dir(install.path());

        let err = updater.update(&target()).await.unwrap_err();
        let UpdateError::ExtractFailed {
            tool,
            outcome,
            ..
        } = &err
        else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(tool, "tar");
        assert!(outcome.downloaded());
        assert!(!outcome.installed());
        assert_eq!(std::fs::read(install.path().join("tool"))?, b"old binary");
        Ok(())
    }
}
