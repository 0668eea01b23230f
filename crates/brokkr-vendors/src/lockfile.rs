//! Lock file export and validation
//!
//! Export enumerates the vendors actually installed on disk and records
//! their origin from install receipts; content hashing of cached artifacts
//! is opt-in because it re-reads potentially large files. Validation
//! recomputes hashes against the cache and reports mismatches per vendor
//! rather than aborting. Installing *from* a lock file is explicitly not
//! part of this engine.

use crate::download::sha256_file;
use crate::receipt::InstallReceipt;
use brokkr_core::types::{LockEntry, LockFile, PlatformDescriptor, LOCK_FORMAT_VERSION};
use brokkr_core::{Result, VendorCatalog, VendorHome};
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Exports and validates reproducibility manifests
pub struct LockFileManager<'a> {
    catalog: &'a VendorCatalog,
    home: &'a VendorHome,
}

/// Outcome of validating one manifest against disk
#[derive(Debug, Default)]
pub struct LockReport {
    /// Number of vendor entries examined
    pub checked: usize,

    /// Per-vendor validation failures
    pub issues: Vec<LockIssue>,
}

impl LockReport {
    /// Whether validation found no issues
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of hard hash mismatches
    pub fn mismatches(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.kind == LockIssueKind::HashMismatch)
            .count()
    }
}

/// One validation failure
#[derive(Debug, Clone)]
pub struct LockIssue {
    pub vendor: String,
    pub kind: LockIssueKind,
    pub message: String,
}

/// Kinds of validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockIssueKind {
    /// Recorded hash does not match the cached artifact
    HashMismatch,

    /// A hash is recorded but the cached artifact is gone
    Unverifiable,
}

impl<'a> LockFileManager<'a> {
    /// Create a manager over an injected catalog and home
    pub fn new(catalog: &'a VendorCatalog, home: &'a VendorHome) -> Self {
        Self { catalog, home }
    }

    /// Export a manifest describing the vendors installed on disk
    ///
    /// A vendor counts as installed when its extract directory exists and
    /// its defining executable is present. `with_hashes` additionally
    /// records the SHA256 of each still-cached artifact.
    pub fn export(&self, with_hashes: bool) -> Result<LockFile> {
        let mut vendors = BTreeMap::new();

        for vendor in self.catalog.iter() {
            let extract_dir = self.home.extract_dir(&vendor.extract_dir);
            let executable = self.home.executable_path(&vendor.extract_dir, &vendor.executable);
            if !extract_dir.is_dir() || !executable.is_file() {
                debug!("{} not installed, not exported", vendor.id);
                continue;
            }

            let mut entry = match InstallReceipt::load(self.home, &vendor.id) {
                Ok(receipt) => LockEntry {
                    name: vendor.name.clone(),
                    version: receipt.version,
                    url: receipt.url,
                    file_name: receipt.file_name,
                    size_mb: receipt.size_mb,
                    installed: true,
                    installed_date: Some(receipt.installed_date),
                    extract_dir: vendor.extract_dir.clone(),
                    sha256: None,
                },
                Err(_) => {
                    warn!(
                        "No install receipt for {}, exporting with unknown origin",
                        vendor.id
                    );
                    LockEntry {
                        name: vendor.name.clone(),
                        version: "unknown".to_string(),
                        url: String::new(),
                        file_name: String::new(),
                        size_mb: 0.0,
                        installed: true,
                        installed_date: None,
                        extract_dir: vendor.extract_dir.clone(),
                        sha256: None,
                    }
                }
            };

            if with_hashes && !entry.file_name.is_empty() {
                let cached = self.home.cached_artifact(&entry.file_name);
                if cached.is_file() {
                    entry.sha256 = Some(sha256_file(&cached)?);
                } else {
                    warn!(
                        "Cached artifact {} missing, exporting {} unverified",
                        entry.file_name, vendor.id
                    );
                }
            }

            vendors.insert(vendor.id.clone(), entry);
        }

        Ok(LockFile {
            version: LOCK_FORMAT_VERSION.to_string(),
            generated: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: current_platform(),
            vendors,
        })
    }

    /// Export and write the manifest, overwriting any previous one
    pub fn export_to(&self, path: &Path, with_hashes: bool) -> Result<LockFile> {
        let lock = self.export(with_hashes)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&lock)?)?;
        Ok(lock)
    }

    /// Load a manifest and validate it against the cache
    ///
    /// Hash checking is skipped for entries with no recorded hash
    /// ("unverified" by contract). Every mismatch becomes one issue for
    /// that vendor; validation itself never aborts the process.
    pub fn validate(&self, path: &Path, check_hashes: bool) -> Result<LockReport> {
        let content = fs::read_to_string(path)?;
        let lock: LockFile = serde_json::from_str(&content)?;

        let mut report = LockReport::default();
        for (id, entry) in &lock.vendors {
            report.checked += 1;

            if !check_hashes {
                continue;
            }
            let expected = match &entry.sha256 {
                Some(expected) => expected,
                None => continue,
            };

            let cached = self.home.cached_artifact(&entry.file_name);
            if !cached.is_file() {
                report.issues.push(LockIssue {
                    vendor: id.clone(),
                    kind: LockIssueKind::Unverifiable,
                    message: format!("cached artifact {} is missing", entry.file_name),
                });
                continue;
            }

            let actual = sha256_file(&cached)?;
            if !actual.eq_ignore_ascii_case(expected) {
                report.issues.push(LockIssue {
                    vendor: id.clone(),
                    kind: LockIssueKind::HashMismatch,
                    message: format!(
                        "sha256 mismatch for {}: expected {}, got {}",
                        entry.file_name, expected, actual
                    ),
                });
            }
        }

        Ok(report)
    }
}

fn current_platform() -> PlatformDescriptor {
    PlatformDescriptor {
        os: std::env::consts::OS.to_string(),
        runtime_version: option_env!("BROKKR_RUSTC_VERSION")
            .unwrap_or("unknown")
            .to_string(),
        architecture: std::env::consts::ARCH.to_string(),
    }
}
