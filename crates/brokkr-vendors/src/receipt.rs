//! Install receipts
//!
//! A small JSON record written after each successful install, capturing the
//! resolved version/url/file so lock export can describe installed vendors
//! without re-resolving over the network. Receipts are internal to the
//! engine; the lock file is the public manifest.

use brokkr_core::types::ReleaseInfo;
use brokkr_core::{Result, VendorHome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Record of one completed vendor install
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReceipt {
    pub version: String,
    pub url: String,
    pub file_name: String,
    #[serde(default)]
    pub size_mb: f64,
    pub installed_date: DateTime<Utc>,
}

impl InstallReceipt {
    /// Build a receipt from a freshly installed release
    pub fn from_release(release: &ReleaseInfo) -> Self {
        Self {
            version: release.version.clone(),
            url: release.download_url.clone(),
            file_name: release.file_name.clone(),
            size_mb: release.approx_size_mb,
            installed_date: Utc::now(),
        }
    }

    /// Receipt file path for a vendor
    pub fn path(home: &VendorHome, vendor_id: &str) -> PathBuf {
        home.receipts_dir().join(format!("{}.json", vendor_id))
    }

    /// Write the receipt, replacing any previous one
    pub fn write(&self, home: &VendorHome, vendor_id: &str) -> Result<()> {
        fs::create_dir_all(home.receipts_dir())?;
        fs::write(
            Self::path(home, vendor_id),
            serde_json::to_string_pretty(self)?,
        )?;
        Ok(())
    }

    /// Load a vendor's receipt
    pub fn load(home: &VendorHome, vendor_id: &str) -> Result<Self> {
        let content = fs::read_to_string(Self::path(home, vendor_id))?;
        Ok(serde_json::from_str(&content)?)
    }
}
