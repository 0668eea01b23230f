//! Post-install normalization and configuration
//!
//! After extraction each vendor may need its layout flattened, portable
//! state directories created outside the extract tree, and small config
//! files written to point the tool at that state. Hooks are looked up by
//! name in a registry populated at startup; they must be idempotent, so
//! re-running one overwrites its config targets rather than appending.

mod hooks;

use async_trait::async_trait;
use brokkr_core::types::VendorDefinition;
use brokkr_core::{Error, Result, VendorHome};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Hook used when a vendor declares no `post_install` name
pub const DEFAULT_HOOK: &str = "default";

/// Everything a hook needs to normalize one installed vendor
pub struct HookContext {
    /// Vendor id
    pub vendor_id: String,

    /// The vendor's extract directory
    pub extract_dir: PathBuf,

    /// Portable state directory outside the extract tree
    ///
    /// Survives a reinstall of the tool itself.
    pub state_dir: PathBuf,

    /// Full path of the vendor's defining executable
    pub executable: PathBuf,
}

/// A named post-install routine
#[async_trait]
pub trait PostInstallHook: Send + Sync {
    /// Registry key this hook is looked up by
    fn name(&self) -> &'static str;

    /// Normalize and configure one installed vendor
    async fn run(&self, ctx: &HookContext) -> Result<()>;
}

/// Name -> hook registry, populated at startup
pub struct PostInstallRegistry {
    hooks: HashMap<&'static str, Box<dyn PostInstallHook>>,
}

impl PostInstallRegistry {
    /// Create a registry containing the built-in hooks
    pub fn with_builtin_hooks() -> Self {
        let mut registry = Self {
            hooks: HashMap::new(),
        };
        registry.register(Box::new(hooks::DefaultHook));
        registry.register(Box::new(hooks::GitHook));
        registry.register(Box::new(hooks::NodeHook));
        registry.register(Box::new(hooks::PythonHook));
        registry
    }

    /// Register a hook under its own name
    pub fn register(&mut self, hook: Box<dyn PostInstallHook>) {
        self.hooks.insert(hook.name(), hook);
    }

    /// Whether a hook name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    /// Run the hook declared by a vendor definition
    pub async fn initialize(&self, vendor: &VendorDefinition, home: &VendorHome) -> Result<()> {
        let name = vendor.post_install.as_deref().unwrap_or(DEFAULT_HOOK);
        let hook = self.hooks.get(name).ok_or_else(|| {
            Error::post_install(&vendor.id, format!("unknown post-install hook: {}", name))
        })?;

        let ctx = HookContext {
            vendor_id: vendor.id.clone(),
            extract_dir: home.extract_dir(&vendor.extract_dir),
            state_dir: home.vendor_state_dir(&vendor.id),
            executable: home.executable_path(&vendor.extract_dir, &vendor.executable),
        };

        debug!("Running post-install hook {} for {}", name, vendor.id);
        match hook.run(&ctx).await {
            Ok(()) => Ok(()),
            Err(e @ Error::PostInstall { .. }) => Err(e),
            Err(e) => Err(Error::post_install(&vendor.id, e.to_string())),
        }
    }
}

/// Flatten a single nested subdirectory
///
/// Source-style archives often expand to `dest/tool-1.2.3/...`; this moves
/// that inner root up so `dest` directly contains the tool's own tree.
/// Returns whether a flatten happened.
pub fn flatten_single_subdir(dir: &Path) -> Result<bool> {
    let entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    if entries.len() != 1 {
        return Ok(false);
    }

    let only = entries[0].path();
    if !only.is_dir() {
        return Ok(false);
    }

    // Move the nested root aside first so a child sharing its name cannot
    // collide during the moves
    let staging = dir.join(".flatten-staging");
    fs::rename(&only, &staging)?;
    for entry in fs::read_dir(&staging)? {
        let entry = entry?;
        fs::rename(entry.path(), dir.join(entry.file_name()))?;
    }
    fs::remove_dir(&staging)?;

    Ok(true)
}

/// Write a config/wrapper file, overwriting any previous contents
pub fn write_config(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Run the tool's own version probe and surface the result
///
/// Probe failures are warnings, never hook failures: an extracted tool that
/// cannot execute is still an installed tool.
pub async fn probe_version(executable: &Path, args: &[&str]) -> Option<String> {
    if !executable.exists() {
        warn!(
            "Version probe skipped, {} not found",
            executable.display()
        );
        return None;
    }

    match Command::new(executable).args(args).output().await {
        Ok(output) if output.status.success() => {
            let line = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("")
                .trim()
                .to_string();
            if line.is_empty() {
                None
            } else {
                info!("{} reports: {}", executable.display(), line);
                Some(line)
            }
        }
        Ok(output) => {
            warn!(
                "Version probe for {} exited with {:?}",
                executable.display(),
                output.status.code()
            );
            None
        }
        Err(e) => {
            warn!("Version probe for {} failed: {}", executable.display(), e);
            None
        }
    }
}
