//! Downloader retry and cleanup behavior

mod common;

use brokkr_vendors::Downloader;
use common::{mock_download, mock_failing_download, mock_flaky_download, temp_home};

#[tokio::test]
async fn test_successful_download_writes_dest() {
    let server = wiremock::MockServer::start().await;
    mock_download(&server, "/artifacts/tool.zip", b"artifact bytes").await;
    let (home, _temp) = temp_home();

    let dest = home.cached_artifact("tool.zip");
    let downloader = Downloader::new().with_progress(false);

    let ok = downloader
        .download(&format!("{}/artifacts/tool.zip", server.uri()), &dest, 3)
        .await;

    assert!(ok);
    assert_eq!(std::fs::read(&dest).unwrap(), b"artifact bytes");
}

#[tokio::test]
async fn test_exhausted_retries_leave_no_file() {
    let server = wiremock::MockServer::start().await;
    mock_failing_download(&server, "/artifacts/tool.zip").await;
    let (home, _temp) = temp_home();

    let dest = home.cached_artifact("tool.zip");
    let downloader = Downloader::new().with_progress(false);

    let ok = downloader
        .download(&format!("{}/artifacts/tool.zip", server.uri()), &dest, 3)
        .await;

    assert!(!ok);
    assert!(!dest.exists());

    let mut part = dest.as_os_str().to_owned();
    part.push(".part");
    assert!(!std::path::PathBuf::from(part).exists());

    // Fixed retry count: exactly three attempts, no more, no fewer
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_retry_recovers_from_transient_failures() {
    let server = wiremock::MockServer::start().await;
    mock_flaky_download(&server, "/artifacts/tool.zip", 2, b"eventually fine").await;
    let (home, _temp) = temp_home();

    let dest = home.cached_artifact("tool.zip");
    let downloader = Downloader::new().with_progress(false);

    let ok = downloader
        .download(&format!("{}/artifacts/tool.zip", server.uri()), &dest, 3)
        .await;

    assert!(ok);
    assert_eq!(std::fs::read(&dest).unwrap(), b"eventually fine");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_zero_retries_never_requests() {
    let server = wiremock::MockServer::start().await;
    mock_download(&server, "/artifacts/tool.zip", b"bytes").await;
    let (home, _temp) = temp_home();

    let dest = home.cached_artifact("tool.zip");
    let downloader = Downloader::new().with_progress(false);

    let ok = downloader
        .download(&format!("{}/artifacts/tool.zip", server.uri()), &dest, 0)
        .await;

    assert!(!ok);
    assert!(!dest.exists());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_redownload_replaces_cached_artifact() {
    let server = wiremock::MockServer::start().await;
    mock_download(&server, "/artifacts/tool.zip", b"new contents").await;
    let (home, _temp) = temp_home();

    let dest = home.cached_artifact("tool.zip");
    std::fs::write(&dest, b"stale contents").unwrap();

    let downloader = Downloader::new().with_progress(false);
    let ok = downloader
        .download(&format!("{}/artifacts/tool.zip", server.uri()), &dest, 1)
        .await;

    assert!(ok);
    assert_eq!(std::fs::read(&dest).unwrap(), b"new contents");
}
