//! Lock file export/validate round trips

mod common;

use brokkr_core::types::{ReleaseInfo, SourceType};
use brokkr_core::{VendorCatalog, VendorHome};
use brokkr_vendors::{InstallReceipt, LockFileManager, LockIssueKind};
use common::temp_home;
use std::fs;

const CATALOG: &str = r#"
alpha:
  name: Alpha
  extract_dir: alpha
  executable: alpha.exe
  source:
    type: static
    version: "1.0.0"
    url: https://example.com/alpha-1.0.0.zip
    file_name: alpha-1.0.0.zip

beta:
  name: Beta
  extract_dir: beta
  executable: beta.exe
  source:
    type: static
    version: "2.0.0"
    url: https://example.com/beta-2.0.0.zip
    file_name: beta-2.0.0.zip
"#;

/// Install a vendor on disk: executable, cached archive, receipt
fn fake_install(home: &VendorHome, id: &str, version: &str, archive_bytes: &[u8]) {
    let extract = home.extract_dir(id);
    fs::create_dir_all(&extract).unwrap();
    fs::write(extract.join(format!("{}.exe", id)), b"binary").unwrap();

    let file_name = format!("{}-{}.zip", id, version);
    fs::write(home.cached_artifact(&file_name), archive_bytes).unwrap();

    let receipt = InstallReceipt::from_release(&ReleaseInfo {
        version: version.to_string(),
        download_url: format!("https://example.com/{}", file_name),
        file_name,
        approx_size_mb: 1.0,
        source_type: SourceType::Static,
    });
    receipt.write(home, id).unwrap();
}

#[test]
fn test_export_then_validate_is_clean() {
    let (home, _temp) = temp_home();
    let catalog = VendorCatalog::from_yaml(CATALOG).unwrap();
    fake_install(&home, "alpha", "1.0.0", b"alpha archive");
    fake_install(&home, "beta", "2.0.0", b"beta archive");

    let manager = LockFileManager::new(&catalog, &home);
    let lock_path = home.lock_file();
    let lock = manager.export_to(&lock_path, true).unwrap();

    assert_eq!(lock.vendors.len(), 2);
    assert!(lock.vendors["alpha"].sha256.is_some());
    assert_eq!(lock.vendors["alpha"].version, "1.0.0");

    let report = manager.validate(&lock_path, true).unwrap();
    assert_eq!(report.checked, 2);
    assert!(report.is_clean());
}

#[test]
fn test_corrupted_artifact_reports_exactly_one_mismatch() {
    let (home, _temp) = temp_home();
    let catalog = VendorCatalog::from_yaml(CATALOG).unwrap();
    fake_install(&home, "alpha", "1.0.0", b"alpha archive");
    fake_install(&home, "beta", "2.0.0", b"beta archive");

    let manager = LockFileManager::new(&catalog, &home);
    let lock_path = home.lock_file();
    manager.export_to(&lock_path, true).unwrap();

    // Flip one byte of one cached artifact
    let corrupted = home.cached_artifact("alpha-1.0.0.zip");
    let mut bytes = fs::read(&corrupted).unwrap();
    bytes[0] ^= 0xff;
    fs::write(&corrupted, bytes).unwrap();

    let report = manager.validate(&lock_path, true).unwrap();
    assert_eq!(report.mismatches(), 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].vendor, "alpha");
    assert_eq!(report.issues[0].kind, LockIssueKind::HashMismatch);
}

#[test]
fn test_hashing_is_opt_in() {
    let (home, _temp) = temp_home();
    let catalog = VendorCatalog::from_yaml(CATALOG).unwrap();
    fake_install(&home, "alpha", "1.0.0", b"alpha archive");

    let manager = LockFileManager::new(&catalog, &home);
    let lock = manager.export(false).unwrap();
    assert!(lock.vendors["alpha"].sha256.is_none());
}

#[test]
fn test_validation_without_hash_check_passes_corruption() {
    let (home, _temp) = temp_home();
    let catalog = VendorCatalog::from_yaml(CATALOG).unwrap();
    fake_install(&home, "alpha", "1.0.0", b"alpha archive");

    let manager = LockFileManager::new(&catalog, &home);
    let lock_path = home.lock_file();
    manager.export_to(&lock_path, true).unwrap();

    let corrupted = home.cached_artifact("alpha-1.0.0.zip");
    fs::write(&corrupted, b"tampered").unwrap();

    let report = manager.validate(&lock_path, false).unwrap();
    assert!(report.is_clean());
}

#[test]
fn test_uninstalled_vendor_not_exported() {
    let (home, _temp) = temp_home();
    let catalog = VendorCatalog::from_yaml(CATALOG).unwrap();
    fake_install(&home, "alpha", "1.0.0", b"alpha archive");
    // beta never installed

    let manager = LockFileManager::new(&catalog, &home);
    let lock = manager.export(false).unwrap();
    assert!(lock.vendors.contains_key("alpha"));
    assert!(!lock.vendors.contains_key("beta"));
}

#[test]
fn test_missing_cached_artifact_is_unverifiable_not_mismatch() {
    let (home, _temp) = temp_home();
    let catalog = VendorCatalog::from_yaml(CATALOG).unwrap();
    fake_install(&home, "alpha", "1.0.0", b"alpha archive");

    let manager = LockFileManager::new(&catalog, &home);
    let lock_path = home.lock_file();
    manager.export_to(&lock_path, true).unwrap();

    fs::remove_file(home.cached_artifact("alpha-1.0.0.zip")).unwrap();

    let report = manager.validate(&lock_path, true).unwrap();
    assert_eq!(report.mismatches(), 0);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, LockIssueKind::Unverifiable);
}

#[test]
fn test_export_without_receipt_records_unknown_version() {
    let (home, _temp) = temp_home();
    let catalog = VendorCatalog::from_yaml(CATALOG).unwrap();

    // Installed out-of-band: executable present, no receipt
    let extract = home.extract_dir("alpha");
    fs::create_dir_all(&extract).unwrap();
    fs::write(extract.join("alpha.exe"), b"binary").unwrap();

    let manager = LockFileManager::new(&catalog, &home);
    let lock = manager.export(false).unwrap();
    assert_eq!(lock.vendors["alpha"].version, "unknown");
    assert!(lock.vendors["alpha"].installed);
}
