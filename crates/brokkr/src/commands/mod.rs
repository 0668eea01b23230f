//! Command implementations

pub mod completions;
pub mod install;
pub mod list;
pub mod lock;
pub mod version;

use anyhow::Result;
use brokkr_core::{VendorCatalog, VendorHome};
use camino::Utf8PathBuf;

/// Resolve the vendor home from an optional `--root` override
pub fn resolve_home(root: Option<&Utf8PathBuf>) -> Result<VendorHome> {
    match root {
        Some(root) => Ok(VendorHome::new(root.as_std_path())),
        None => Ok(VendorHome::default_location()?),
    }
}

/// Load the catalog from an optional `--catalog` override
pub fn load_catalog(catalog: Option<&Utf8PathBuf>) -> VendorCatalog {
    VendorCatalog::load(catalog.map(|p| p.as_path()))
}
