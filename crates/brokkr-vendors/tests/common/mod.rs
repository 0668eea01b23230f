//! Shared fixtures for brokkr-vendors integration tests

#![allow(dead_code)]

use brokkr_core::types::VendorDefinition;
use brokkr_core::{VendorCatalog, VendorHome};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Parse a full catalog document and pull one definition out of it
pub fn vendor_def(catalog_yaml: &str, id: &str) -> VendorDefinition {
    VendorCatalog::from_yaml(catalog_yaml)
        .expect("test catalog must parse")
        .get(id)
        .unwrap_or_else(|| panic!("test catalog must contain {}", id))
        .clone()
}

/// Fresh vendor home under a temp dir
pub fn temp_home() -> (VendorHome, TempDir) {
    let temp = TempDir::new().expect("create temp dir");
    let home = VendorHome::new(temp.path().join("root"));
    home.ensure_layout().expect("create home layout");
    (home, temp)
}

/// Write a zip archive containing the given files
pub fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
    let file = File::create(path).expect("create zip fixture");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in files {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(content).expect("write zip entry");
    }
    writer.finish().expect("finish zip fixture");
}

/// Zip archive bytes containing the given files
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in files {
            writer.start_file(*name, options).expect("start zip entry");
            writer.write_all(content).expect("write zip entry");
        }
        writer.finish().expect("finish zip fixture");
    }
    cursor.into_inner()
}

/// Mount a GitHub latest-release endpoint for `owner/repo`
pub async fn mock_github_latest(
    server: &MockServer,
    repo: &str,
    tag: &str,
    assets: &[(&str, &str, u64)],
) {
    let assets: Vec<_> = assets
        .iter()
        .map(|(name, url, size)| {
            serde_json::json!({
                "name": name,
                "browser_download_url": url,
                "size": size,
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/releases/latest", repo)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tag_name": tag,
            "assets": assets,
        })))
        .mount(server)
        .await;
}

/// Mount a download endpoint serving raw bytes
pub async fn mock_download(server: &MockServer, url_path: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(url_path.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

/// Mount a download endpoint that always fails with 500
pub async fn mock_failing_download(server: &MockServer, url_path: &str) {
    Mock::given(method("GET"))
        .and(path(url_path.to_string()))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

/// Mount a download that fails `fail_count` times before succeeding
pub async fn mock_flaky_download(
    server: &MockServer,
    url_path: &str,
    fail_count: u64,
    content: &[u8],
) {
    Mock::given(method("GET"))
        .and(path(url_path.to_string()))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(fail_count)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(url_path.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}
