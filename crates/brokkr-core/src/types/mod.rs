//! Shared types for Brokkr

mod lock;
mod vendor;

pub use lock::{LockEntry, LockFile, PlatformDescriptor, LOCK_FORMAT_VERSION};
pub use vendor::{
    ReleaseFallback, ReleaseInfo, ReleaseSource, SourceSpec, SourceType, VendorDefinition,
};
