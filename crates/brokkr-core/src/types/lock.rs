//! Lock file types
//!
//! The lock file is a reproducibility manifest recording what is installed,
//! where it came from, and optionally a content hash of the cached artifact.
//! Export and validation live in `brokkr-vendors`; only the document shape
//! is defined here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current lock file format version
pub const LOCK_FORMAT_VERSION: &str = "1";

/// Reproducibility manifest for a vendor root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockFile {
    /// Lock file format version
    pub version: String,

    /// Generation timestamp
    pub generated: DateTime<Utc>,

    /// Version of the brokkr binary that produced this manifest
    pub tool_version: String,

    /// Host the manifest was generated on
    pub platform: PlatformDescriptor,

    /// Per-vendor entries keyed by vendor id
    pub vendors: BTreeMap<String, LockEntry>,
}

/// Host platform descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    /// Operating system (e.g. "windows", "linux")
    pub os: String,

    /// Toolchain the binary was built with
    pub runtime_version: String,

    /// CPU architecture (e.g. "x86_64", "aarch64")
    pub architecture: String,
}

/// One installed vendor in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockEntry {
    /// Display name
    pub name: String,

    /// Installed version ("unknown" when no install receipt exists)
    pub version: String,

    /// Origin download URL
    pub url: String,

    /// Cached artifact file name
    pub file_name: String,

    /// Approximate artifact size in megabytes
    #[serde(default)]
    pub size_mb: f64,

    /// Whether the vendor was installed at export time
    pub installed: bool,

    /// When the vendor was installed, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_date: Option<DateTime<Utc>>,

    /// Extract directory relative to the vendor root
    pub extract_dir: String,

    /// SHA256 of the cached artifact; absent means "unverified"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}
