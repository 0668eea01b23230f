//! Error types for brokkr-core

use thiserror::Error;

/// Result type alias using brokkr-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Brokkr
#[derive(Error, Debug)]
pub enum Error {
    /// Vendor catalog file not found
    #[error("Vendor catalog not found: {path}")]
    CatalogNotFound { path: String },

    /// Invalid catalog structure
    #[error("Invalid vendor catalog: {message}")]
    InvalidCatalog { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Release resolution failed for a vendor
    #[error("Release resolution failed for {vendor}: {reason}")]
    Resolution { vendor: String, reason: String },

    /// Download retries exhausted
    #[error("Download failed after {attempts} attempts: {url}")]
    Download { url: String, attempts: u32 },

    /// Archive extraction failed
    #[error("Extraction failed for {archive}: {reason}")]
    Extraction { archive: String, reason: String },

    /// Post-install hook failed
    #[error("Post-install failed for {vendor}: {reason}")]
    PostInstall { vendor: String, reason: String },

    /// Lock file validation failure
    #[error("Lock validation failed for {vendor}: {reason}")]
    LockValidation { vendor: String, reason: String },

    /// Vendor id not present in the catalog
    #[error("Unknown vendor: {id}")]
    UnknownVendor { id: String },

    /// Vendor root directory cannot be written
    #[error("Vendor root is not writable: {path}")]
    RootNotWritable { path: String },
}

impl Error {
    /// Create a catalog not found error
    pub fn catalog_not_found(path: impl Into<String>) -> Self {
        Self::CatalogNotFound { path: path.into() }
    }

    /// Create an invalid catalog error
    pub fn invalid_catalog(message: impl Into<String>) -> Self {
        Self::InvalidCatalog {
            message: message.into(),
        }
    }

    /// Create a resolution error
    pub fn resolution(vendor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            vendor: vendor.into(),
            reason: reason.into(),
        }
    }

    /// Create a download error
    pub fn download(url: impl Into<String>, attempts: u32) -> Self {
        Self::Download {
            url: url.into(),
            attempts,
        }
    }

    /// Create an extraction error
    pub fn extraction(archive: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Extraction {
            archive: archive.into(),
            reason: reason.into(),
        }
    }

    /// Create a post-install error
    pub fn post_install(vendor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PostInstall {
            vendor: vendor.into(),
            reason: reason.into(),
        }
    }

    /// Create a lock validation error
    pub fn lock_validation(vendor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LockValidation {
            vendor: vendor.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown vendor error
    pub fn unknown_vendor(id: impl Into<String>) -> Self {
        Self::UnknownVendor { id: id.into() }
    }
}
