//! Vendor installation engine for Brokkr
//!
//! Sequences release resolution, artifact download, archive extraction, and
//! post-install configuration per vendor, and exports/validates the
//! reproducibility lock file. Everything here operates on an injected
//! [`brokkr_core::VendorCatalog`] and [`brokkr_core::VendorHome`].

pub mod download;
pub mod extract;
pub mod lockfile;
pub mod orchestrator;
pub mod postinstall;
pub mod receipt;
pub mod resolver;

pub use download::Downloader;
pub use extract::ArchiveExtractor;
pub use lockfile::{LockFileManager, LockIssue, LockIssueKind, LockReport};
pub use orchestrator::{
    BatchReport, InstallOrchestrator, InstallStage, VendorOutcome, VendorReport,
};
pub use postinstall::{HookContext, PostInstallHook, PostInstallRegistry};
pub use receipt::InstallReceipt;
pub use resolver::ReleaseResolver;
