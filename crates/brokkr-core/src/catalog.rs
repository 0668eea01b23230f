//! Vendor catalog loading and validation
//!
//! The catalog file is a YAML mapping of vendor id to definition. Loading is
//! tolerant per entry: a definition that fails to deserialize or is missing
//! required fields is skipped with a warning, and a single bad entry never
//! aborts the load. When the file is absent or unparsable as a whole, the
//! compiled-in default set is used so the engine stays operable without
//! external configuration.

use crate::error::{Error, Result};
use crate::types::VendorDefinition;
use camino::Utf8Path;
use std::collections::HashMap;
use std::fs;
use tracing::warn;

/// Catalog file name searched in the working directory and vendor root
pub const CATALOG_FILE_NAME: &str = "vendors.yaml";

/// Built-in default catalog covering the minimum required tools
///
/// Used whenever no catalog file can be loaded. This is a documented
/// fallback, not a silent patch: `load` logs a warning when it applies.
const DEFAULT_CATALOG: &str = r#"
git:
  name: Git (MinGit)
  required: true
  extract_dir: git
  executable: cmd/git.exe
  source:
    type: github
    repo: git-for-windows/git
    asset_pattern: "MinGit-*-64-bit.zip"
    exclude_pattern: "*busybox*"
  post_install: git
  paths:
    - cmd

node:
  name: Node.js
  extract_dir: node
  executable: node.exe
  dependencies:
    - git
  source:
    type: language-api
    url: https://nodejs.org/dist/index.json
    file_filter: win-x64-zip
    download_url: "https://nodejs.org/dist/v{version}/node-v{version}-win-x64.zip"
    file_name: "node-v{version}-win-x64.zip"
  post_install: node
  paths:
    - ""

python:
  name: Python (embeddable)
  extract_dir: python
  executable: python.exe
  source:
    type: web-scrape
    url: https://www.python.org/downloads/windows/
    pattern: 'href="(https://www\.python\.org/ftp/python/[\d.]+/python-([\d.]+)-embed-amd64\.zip)"'
  post_install: python
  paths:
    - ""
    - Scripts

pwsh:
  name: PowerShell
  extract_dir: pwsh
  executable: pwsh.exe
  source:
    type: github
    repo: PowerShell/PowerShell
    asset_pattern: "PowerShell-*-win-x64.zip"
  paths:
    - ""
"#;

/// Ordered, validated id -> VendorDefinition mapping
///
/// Immutable after load; injected into every component that needs it.
#[derive(Debug, Clone)]
pub struct VendorCatalog {
    vendors: Vec<VendorDefinition>,
    index: HashMap<String, usize>,
}

impl VendorCatalog {
    /// Load a catalog, falling back to the built-in defaults
    ///
    /// Search order: the explicit path when given, then `vendors.yaml` in the
    /// working directory. Absent or wholly unparsable content falls back to
    /// the defaults with a warning.
    pub fn load(path: Option<&Utf8Path>) -> Self {
        let candidate = match path {
            Some(p) => p.to_owned(),
            None => CATALOG_FILE_NAME.into(),
        };

        let content = match fs::read_to_string(&candidate) {
            Ok(content) => content,
            Err(_) => {
                warn!(
                    "Vendor catalog {} not found, using built-in defaults",
                    candidate
                );
                return Self::builtin_defaults();
            }
        };

        match Self::from_yaml(&content) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(
                    "Vendor catalog {} is unparsable ({}), using built-in defaults",
                    candidate, e
                );
                Self::builtin_defaults()
            }
        }
    }

    /// Parse a catalog document, skipping invalid entries
    pub fn from_yaml(content: &str) -> Result<Self> {
        let doc: serde_yaml_ng::Value = serde_yaml_ng::from_str(content)?;
        let mapping = doc
            .as_mapping()
            .ok_or_else(|| Error::invalid_catalog("catalog root must be a mapping"))?;

        let mut vendors: Vec<VendorDefinition> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (key, value) in mapping {
            let id = match key.as_str() {
                Some(id) => id.to_string(),
                None => {
                    warn!("Skipping vendor entry with non-string key: {:?}", key);
                    continue;
                }
            };

            if index.contains_key(&id) {
                warn!("Duplicate vendor id {}, keeping the first definition", id);
                continue;
            }

            let mut definition: VendorDefinition =
                match serde_yaml_ng::from_value(value.clone()) {
                    Ok(d) => d,
                    Err(e) => {
                        warn!("Skipping vendor {}: {}", id, e);
                        continue;
                    }
                };
            definition.id = id.clone();

            if let Err(reason) = validate_entry(&definition) {
                warn!("Skipping vendor {}: {}", id, reason);
                continue;
            }

            index.insert(id, vendors.len());
            vendors.push(definition);
        }

        Ok(Self { vendors, index })
    }

    /// The compiled-in default vendor set
    pub fn builtin_defaults() -> Self {
        Self::from_yaml(DEFAULT_CATALOG).expect("Built-in default catalog must parse")
    }

    /// Look up a vendor by id
    pub fn get(&self, id: &str) -> Option<&VendorDefinition> {
        self.index.get(id).map(|&i| &self.vendors[i])
    }

    /// Whether the catalog contains a vendor id
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Vendors in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &VendorDefinition> {
        self.vendors.iter()
    }

    /// Number of vendors
    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}

/// Reject definitions missing the fields every pipeline stage relies on
fn validate_entry(vendor: &VendorDefinition) -> std::result::Result<(), String> {
    if vendor.name.trim().is_empty() {
        return Err("missing display name".to_string());
    }
    if vendor.extract_dir.trim().is_empty() {
        return Err("missing extract_dir".to_string());
    }
    if vendor.extract_dir.contains("..") {
        return Err("extract_dir must not contain parent components".to_string());
    }
    if vendor.executable.trim().is_empty() {
        return Err("missing executable".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReleaseSource;

    #[test]
    fn test_builtin_defaults_load() {
        let catalog = VendorCatalog::builtin_defaults();
        assert!(!catalog.is_empty());

        let git = catalog.get("git").expect("defaults include git");
        assert!(git.required);
        assert!(matches!(git.source.strategy, ReleaseSource::Github { .. }));

        // Catalog order is file order
        let ids: Vec<_> = catalog.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["git", "node", "python", "pwsh"]);
    }

    #[test]
    fn test_bad_entry_skipped_good_entry_kept() {
        let yaml = r#"
good:
  name: Good Tool
  extract_dir: good
  executable: good.exe
  source:
    type: static
    version: "1.0"
    url: https://example.com/good.zip
    file_name: good.zip

bad:
  name: Bad Tool
  source:
    type: teleport
"#;
        let catalog = VendorCatalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("good"));
        assert!(!catalog.contains("bad"));
    }

    #[test]
    fn test_missing_required_fields_skipped() {
        let yaml = r#"
incomplete:
  name: No Dirs
  extract_dir: ""
  executable: tool.exe
  source:
    type: static
    version: "1.0"
    url: https://example.com/t.zip
    file_name: t.zip
"#;
        let catalog = VendorCatalog::from_yaml(yaml).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_unparsable_document_is_an_error() {
        assert!(VendorCatalog::from_yaml("- not\n- a\n- mapping\n").is_err());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let catalog = VendorCatalog::load(Some(Utf8Path::new(
            "/tmp/nonexistent-brokkr-catalog-9042.yaml",
        )));
        assert!(catalog.contains("git"));
    }

    #[test]
    fn test_defaults_enabled_by_default() {
        let catalog = VendorCatalog::builtin_defaults();
        assert!(catalog.iter().all(|v| v.enabled));
    }
}
