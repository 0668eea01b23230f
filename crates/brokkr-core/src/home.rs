//! Vendor home directory layout
//!
//! All components receive a `VendorHome` value by parameter injection; there
//! is no ambient "current root" state anywhere in the workspace.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout of a Brokkr vendor root
///
/// ```text
/// <root>/
///   vendors/   per-vendor extract directories
///   cache/     downloaded artifacts, reused by lock validation
///   state/     portable tool state and install receipts
/// ```
#[derive(Debug, Clone)]
pub struct VendorHome {
    /// Root directory (default `~/.brokkr`)
    pub root: PathBuf,

    /// Per-vendor extract directories
    pub vendors_dir: PathBuf,

    /// Downloaded artifact cache
    pub cache_dir: PathBuf,

    /// Portable tool state and install receipts
    pub state_dir: PathBuf,
}

impl VendorHome {
    /// Create a home rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            vendors_dir: root.join("vendors"),
            cache_dir: root.join("cache"),
            state_dir: root.join("state"),
            root,
        }
    }

    /// Create a home at the default location (`~/.brokkr`)
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "home directory not found",
            ))
        })?;
        Ok(Self::new(home_dir.join(".brokkr")))
    }

    /// Create the directory layout, verifying the root is writable
    ///
    /// An unwritable root is the one batch-fatal filesystem condition: no
    /// vendor can be installed into it, so this fails the run up front.
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in [
            &self.root,
            &self.vendors_dir,
            &self.cache_dir,
            &self.state_dir,
        ] {
            fs::create_dir_all(dir).map_err(|_| Error::RootNotWritable {
                path: self.root.display().to_string(),
            })?;
        }

        let probe = self.root.join(".write-probe");
        fs::write(&probe, b"ok").map_err(|_| Error::RootNotWritable {
            path: self.root.display().to_string(),
        })?;
        let _ = fs::remove_file(&probe);

        Ok(())
    }

    /// Extract directory for a vendor
    pub fn extract_dir(&self, vendor_extract_dir: &str) -> PathBuf {
        self.vendors_dir.join(vendor_extract_dir)
    }

    /// Full path of a vendor's defining executable
    pub fn executable_path(&self, vendor_extract_dir: &str, executable: &str) -> PathBuf {
        self.extract_dir(vendor_extract_dir).join(executable)
    }

    /// Cache path for a downloaded artifact
    pub fn cached_artifact(&self, file_name: &str) -> PathBuf {
        self.cache_dir.join(file_name)
    }

    /// Per-vendor portable state directory (outside the extract tree)
    pub fn vendor_state_dir(&self, vendor_id: &str) -> PathBuf {
        self.state_dir.join(vendor_id)
    }

    /// Directory holding install receipts
    pub fn receipts_dir(&self) -> PathBuf {
        self.state_dir.join("receipts")
    }

    /// Default lock file location
    pub fn lock_file(&self) -> PathBuf {
        self.root.join("brokkr.lock.json")
    }
}

impl AsRef<Path> for VendorHome {
    fn as_ref(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let home = VendorHome::new("/opt/brokkr");
        assert_eq!(home.vendors_dir, PathBuf::from("/opt/brokkr/vendors"));
        assert_eq!(
            home.executable_path("git", "cmd/git.exe"),
            PathBuf::from("/opt/brokkr/vendors/git/cmd/git.exe")
        );
        assert_eq!(
            home.cached_artifact("git.zip"),
            PathBuf::from("/opt/brokkr/cache/git.zip")
        );
    }

    #[test]
    fn test_ensure_layout_creates_dirs() {
        let temp = TempDir::new().unwrap();
        let home = VendorHome::new(temp.path().join("root"));
        home.ensure_layout().unwrap();
        assert!(home.vendors_dir.is_dir());
        assert!(home.cache_dir.is_dir());
        assert!(home.state_dir.is_dir());
    }

    #[test]
    fn test_ensure_layout_root_under_file_fails() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let home = VendorHome::new(blocker.join("root"));
        let err = home.ensure_layout().unwrap_err();
        assert!(matches!(err, Error::RootNotWritable { .. }));
    }
}
