//! Vendor definition and release types

use serde::{Deserialize, Serialize};

/// A single vendor entry in the catalog
///
/// The `id` is the mapping key in `vendors.yaml` and is filled in by the
/// catalog loader, not by serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorDefinition {
    /// Unique vendor id (the mapping key in the catalog file)
    #[serde(skip)]
    pub id: String,

    /// Human-readable display name
    pub name: String,

    /// Whether this vendor participates in installs
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether a failure of this vendor fails the whole batch
    #[serde(default)]
    pub required: bool,

    /// Directory under the vendor root that receives the archive contents
    pub extract_dir: String,

    /// Path of the defining executable, relative to `extract_dir`
    ///
    /// Used for the already-installed check and for lock file export.
    pub executable: String,

    /// Advisory install ordering: these ids are attempted first
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Release discovery strategy plus optional fallback
    pub source: SourceSpec,

    /// Name of the post-install hook to run after extraction
    #[serde(default)]
    pub post_install: Option<String>,

    /// PATH entries relative to `extract_dir`, consumed by the
    /// environment-assembly layer outside this engine
    #[serde(default)]
    pub paths: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Release source block: a discovery strategy and an optional fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    /// The discovery strategy, tagged by `type`
    #[serde(flatten)]
    pub strategy: ReleaseSource,

    /// Fully-specified alternate release used when the strategy fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<ReleaseFallback>,
}

/// Release discovery strategies
///
/// A closed set of variants; the catalog loader skips entries whose `type`
/// does not deserialize into one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ReleaseSource {
    /// Latest release of a GitHub repository, asset selected by glob
    Github {
        /// Repository in `owner/name` form
        repo: String,
        /// Glob matched against asset names; first match wins
        asset_pattern: String,
        /// Glob of asset names to exclude before matching
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exclude_pattern: Option<String>,
    },

    /// HTML page scraped with a regular expression
    ///
    /// Capture group 1 yields the asset URL or filename; the version comes
    /// from a `version` named group or group 2 when present, otherwise it is
    /// derived from the matched text.
    WebScrape {
        /// Page to fetch
        url: String,
        /// Regular expression applied to the page body
        pattern: String,
        /// Override for deriving the version from the matched text
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version_pattern: Option<String>,
    },

    /// Release fully specified in configuration, no network resolution
    Static {
        version: String,
        url: String,
        file_name: String,
        #[serde(default)]
        size_mb: f64,
    },

    /// Language-specific version index filtered by platform/architecture
    LanguageApi {
        /// JSON index endpoint returning entries in upstream order
        url: String,
        /// Token that must appear in an entry's `files` list
        file_filter: String,
        /// Download URL template; `{version}` is expanded
        download_url: String,
        /// File name template; `{version}` is expanded
        file_name: String,
    },
}

impl ReleaseSource {
    /// The source type tag for this strategy
    pub fn source_type(&self) -> SourceType {
        match self {
            ReleaseSource::Github { .. } => SourceType::Github,
            ReleaseSource::WebScrape { .. } => SourceType::WebScrape,
            ReleaseSource::Static { .. } => SourceType::Static,
            ReleaseSource::LanguageApi { .. } => SourceType::LanguageApi,
        }
    }
}

/// Discriminant of a release source, carried on resolved releases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    Github,
    WebScrape,
    Static,
    LanguageApi,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Github => write!(f, "github"),
            SourceType::WebScrape => write!(f, "web-scrape"),
            SourceType::Static => write!(f, "static"),
            SourceType::LanguageApi => write!(f, "language-api"),
        }
    }
}

/// Alternate release description used when the primary strategy fails
///
/// Returned verbatim, with no further validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseFallback {
    pub version: String,
    pub url: String,
    pub file_name: String,
    #[serde(default)]
    pub size_mb: f64,
}

/// A concrete release produced by one resolution attempt
///
/// Never persisted unless exported into a lock entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseInfo {
    /// Version string with any leading `v` stripped
    pub version: String,

    /// Absolute download URL
    pub download_url: String,

    /// File name the artifact is cached under
    pub file_name: String,

    /// Approximate size in megabytes (0.0 when the source does not report one)
    pub approx_size_mb: f64,

    /// Which strategy produced this release
    pub source_type: SourceType,
}
