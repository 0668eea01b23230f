//! Sequential install orchestration
//!
//! One vendor at a time, one stage at a time: resolve, download, extract,
//! post-install. A batch of N vendors always yields N outcomes; a stage
//! failure degrades to that vendor's outcome and never aborts the batch.
//! Batch success means no *required* vendor failed. Dependencies are
//! advisory ordering only: declared dependencies are attempted first, but
//! a failed dependency never blocks its dependents.

use crate::download::Downloader;
use crate::extract::ArchiveExtractor;
use crate::postinstall::PostInstallRegistry;
use crate::receipt::InstallReceipt;
use crate::resolver::ReleaseResolver;
use brokkr_core::types::VendorDefinition;
use brokkr_core::{Error, Result, VendorCatalog, VendorHome};
use std::collections::{HashMap, HashSet};
use std::fs;
use tracing::{debug, info, warn};

/// Default download retry attempts
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pipeline stage a vendor failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Resolve,
    Download,
    Extract,
    PostInstall,
}

impl std::fmt::Display for InstallStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallStage::Resolve => write!(f, "resolve"),
            InstallStage::Download => write!(f, "download"),
            InstallStage::Extract => write!(f, "extract"),
            InstallStage::PostInstall => write!(f, "post-install"),
        }
    }
}

/// Outcome of one vendor's pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum VendorOutcome {
    /// All stages completed
    Done,

    /// Nothing attempted
    Skipped { reason: String },

    /// A stage failed; the batch continued
    Failed {
        stage: InstallStage,
        message: String,
    },
}

impl VendorOutcome {
    /// Whether this outcome is a failure
    pub fn is_failed(&self) -> bool {
        matches!(self, VendorOutcome::Failed { .. })
    }
}

/// One vendor's report within a batch
#[derive(Debug, Clone)]
pub struct VendorReport {
    pub vendor_id: String,
    pub name: String,
    pub required: bool,
    pub outcome: VendorOutcome,
}

/// Aggregated outcomes of one orchestration run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<VendorReport>,
}

impl BatchReport {
    /// All failed vendors
    pub fn failures(&self) -> impl Iterator<Item = &VendorReport> {
        self.results.iter().filter(|r| r.outcome.is_failed())
    }

    /// Failed vendors marked required
    pub fn required_failures(&self) -> impl Iterator<Item = &VendorReport> {
        self.failures().filter(|r| r.required)
    }

    /// Batch success: no required vendor failed
    pub fn is_success(&self) -> bool {
        self.required_failures().next().is_none()
    }

    /// Count of completed installs
    pub fn done(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == VendorOutcome::Done)
            .count()
    }

    /// Count of skipped vendors
    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, VendorOutcome::Skipped { .. }))
            .count()
    }
}

/// Sequences the install pipeline over a catalog
pub struct InstallOrchestrator {
    catalog: VendorCatalog,
    home: VendorHome,
    resolver: ReleaseResolver,
    downloader: Downloader,
    extractor: ArchiveExtractor,
    hooks: PostInstallRegistry,
    force: bool,
    max_retries: u32,
}

impl InstallOrchestrator {
    /// Create an orchestrator over an injected catalog and home
    pub fn new(catalog: VendorCatalog, home: VendorHome) -> Self {
        let extractor = ArchiveExtractor::new(&home);
        Self {
            catalog,
            home,
            resolver: ReleaseResolver::new(),
            downloader: Downloader::new(),
            extractor,
            hooks: PostInstallRegistry::with_builtin_hooks(),
            force: false,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Reinstall vendors whose executable already exists
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Override the download retry count
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Replace the resolver (tests point it at a mock API)
    pub fn with_resolver(mut self, resolver: ReleaseResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the downloader
    pub fn with_downloader(mut self, downloader: Downloader) -> Self {
        self.downloader = downloader;
        self
    }

    /// Install all enabled vendors, or an explicit selection
    ///
    /// The only batch-fatal conditions are an unwritable vendor root and a
    /// selection naming unknown vendor ids; everything else degrades to
    /// per-vendor outcomes.
    pub async fn install(&self, selection: Option<&[String]>) -> Result<BatchReport> {
        self.home.ensure_layout()?;

        let order = self.plan_order(selection)?;
        let mut outcomes: HashMap<String, VendorOutcome> = HashMap::new();
        let mut report = BatchReport::default();

        for id in &order {
            let vendor = match self.catalog.get(id) {
                Some(vendor) => vendor,
                None => continue,
            };

            self.warn_failed_dependencies(vendor, &outcomes);

            let outcome = self.install_one(vendor).await;
            debug!("{} -> {:?}", vendor.id, outcome);

            outcomes.insert(vendor.id.clone(), outcome.clone());
            report.results.push(VendorReport {
                vendor_id: vendor.id.clone(),
                name: vendor.name.clone(),
                required: vendor.required,
                outcome,
            });
        }

        Ok(report)
    }

    /// Advisory ordering: declared dependencies first, catalog order otherwise
    fn plan_order(&self, selection: Option<&[String]>) -> Result<Vec<String>> {
        let selected: Vec<&VendorDefinition> = match selection {
            Some(ids) => ids
                .iter()
                .map(|id| {
                    self.catalog
                        .get(id)
                        .ok_or_else(|| Error::unknown_vendor(id.as_str()))
                })
                .collect::<Result<Vec<_>>>()?,
            None => self.catalog.iter().collect(),
        };

        let allowed: HashSet<&str> = selected.iter().map(|v| v.id.as_str()).collect();

        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut visiting = HashSet::new();
        for vendor in &selected {
            self.visit(&vendor.id, &allowed, &mut order, &mut seen, &mut visiting);
        }
        Ok(order)
    }

    fn visit(
        &self,
        id: &str,
        allowed: &HashSet<&str>,
        order: &mut Vec<String>,
        seen: &mut HashSet<String>,
        visiting: &mut HashSet<String>,
    ) {
        if seen.contains(id) {
            return;
        }
        if visiting.contains(id) {
            warn!(
                "Circular dependency involving {}, keeping declaration order",
                id
            );
            return;
        }
        visiting.insert(id.to_string());

        if let Some(vendor) = self.catalog.get(id) {
            for dep in &vendor.dependencies {
                if !self.catalog.contains(dep) {
                    warn!("Vendor {} declares unknown dependency {}", id, dep);
                } else if allowed.contains(dep.as_str()) {
                    self.visit(dep, allowed, order, seen, visiting);
                }
            }
        }

        visiting.remove(id);
        seen.insert(id.to_string());
        order.push(id.to_string());
    }

    fn warn_failed_dependencies(
        &self,
        vendor: &VendorDefinition,
        outcomes: &HashMap<String, VendorOutcome>,
    ) {
        for dep in &vendor.dependencies {
            if let Some(VendorOutcome::Failed { .. }) = outcomes.get(dep) {
                warn!(
                    "Dependency {} of {} failed to install, continuing anyway",
                    dep, vendor.id
                );
            }
        }
    }

    /// Run one vendor through the full pipeline
    async fn install_one(&self, vendor: &VendorDefinition) -> VendorOutcome {
        if !vendor.enabled {
            return VendorOutcome::Skipped {
                reason: "disabled in catalog".to_string(),
            };
        }

        let executable = self.home.executable_path(&vendor.extract_dir, &vendor.executable);
        if executable.exists() && !self.force {
            return VendorOutcome::Skipped {
                reason: "already installed".to_string(),
            };
        }

        info!("Installing {} ({})", vendor.name, vendor.id);

        let release = match self.resolver.resolve(vendor).await {
            Ok(release) => release,
            Err(e) => {
                return VendorOutcome::Failed {
                    stage: InstallStage::Resolve,
                    message: e.to_string(),
                }
            }
        };
        debug!(
            "Resolved {} {} -> {}",
            vendor.id, release.version, release.download_url
        );

        let archive = self.home.cached_artifact(&release.file_name);
        if !self
            .downloader
            .download(&release.download_url, &archive, self.max_retries)
            .await
        {
            return VendorOutcome::Failed {
                stage: InstallStage::Download,
                message: format!(
                    "download failed after {} attempts: {}",
                    self.max_retries, release.download_url
                ),
            };
        }

        let dest = self.home.extract_dir(&vendor.extract_dir);
        if self.force && dest.exists() {
            if let Err(e) = fs::remove_dir_all(&dest) {
                return VendorOutcome::Failed {
                    stage: InstallStage::Extract,
                    message: format!("failed to clear {}: {}", dest.display(), e),
                };
            }
        }
        if !self.extractor.extract(&archive, &dest).await {
            return VendorOutcome::Failed {
                stage: InstallStage::Extract,
                message: format!("unsupported or failed extraction: {}", release.file_name),
            };
        }

        if let Err(e) = self.hooks.initialize(vendor, &self.home).await {
            return VendorOutcome::Failed {
                stage: InstallStage::PostInstall,
                message: e.to_string(),
            };
        }

        let receipt = InstallReceipt::from_release(&release);
        if let Err(e) = receipt.write(&self.home, &vendor.id) {
            warn!("Failed to write install receipt for {}: {}", vendor.id, e);
        }

        VendorOutcome::Done
    }
}
