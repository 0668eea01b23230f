//! Release discovery
//!
//! Turns a vendor definition into a concrete release by dispatching on the
//! configured [`ReleaseSource`] variant. "Latest" always means whatever the
//! upstream source's own ordering returns first: the latest GitHub release's
//! first matching asset, the first regex match on a scraped page, the first
//! qualifying entry of a version index. The resolver performs no version
//! comparison of its own.

use brokkr_core::types::{
    ReleaseFallback, ReleaseInfo, ReleaseSource, SourceType, VendorDefinition,
};
use brokkr_core::{Error, Result};
use globset::{Glob, GlobMatcher};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

/// Default GitHub API base, overridable for tests
const GITHUB_API_URL: &str = "https://api.github.com";

/// Version shape scanned for when a scrape pattern captures no version group
const DEFAULT_VERSION_PATTERN: &str = r"\d+(?:\.\d+)+";

/// GitHub release as returned by the releases API
#[derive(Debug, Clone, Deserialize)]
struct GithubRelease {
    tag_name: String,
    assets: Vec<GithubAsset>,
}

/// GitHub release asset
#[derive(Debug, Clone, Deserialize)]
struct GithubAsset {
    name: String,
    browser_download_url: String,
    size: u64,
}

/// One entry of a language version index (e.g. the Node.js dist index)
#[derive(Debug, Clone, Deserialize)]
struct VersionIndexEntry {
    version: String,
    #[serde(default)]
    files: Vec<String>,
}

/// Resolves vendor definitions into concrete releases
pub struct ReleaseResolver {
    client: reqwest::Client,
    github_api: String,
}

impl ReleaseResolver {
    /// Create a resolver with the default client configuration
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("brokkr/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
            github_api: GITHUB_API_URL.to_string(),
        }
    }

    /// Override the GitHub API base URL
    pub fn with_github_api(mut self, base: impl Into<String>) -> Self {
        self.github_api = base.into();
        self
    }

    /// Resolve a vendor to its latest release
    ///
    /// When the primary strategy fails and the vendor declares a fallback
    /// block, the fallback's fields are returned verbatim with no further
    /// validation. Without a fallback the resolution error propagates.
    pub async fn resolve(&self, vendor: &VendorDefinition) -> Result<ReleaseInfo> {
        match self.resolve_primary(vendor).await {
            Ok(release) => Ok(release),
            Err(err) => match &vendor.source.fallback {
                Some(fallback) => {
                    warn!(
                        "Resolution for {} failed ({}), using configured fallback {}",
                        vendor.id, err, fallback.version
                    );
                    Ok(fallback_release(
                        fallback,
                        vendor.source.strategy.source_type(),
                    ))
                }
                None => Err(err),
            },
        }
    }

    async fn resolve_primary(&self, vendor: &VendorDefinition) -> Result<ReleaseInfo> {
        match &vendor.source.strategy {
            ReleaseSource::Github {
                repo,
                asset_pattern,
                exclude_pattern,
            } => {
                self.resolve_github(vendor, repo, asset_pattern, exclude_pattern.as_deref())
                    .await
            }
            ReleaseSource::WebScrape {
                url,
                pattern,
                version_pattern,
            } => {
                self.resolve_web_scrape(vendor, url, pattern, version_pattern.as_deref())
                    .await
            }
            ReleaseSource::Static {
                version,
                url,
                file_name,
                size_mb,
            } => Ok(ReleaseInfo {
                version: version.clone(),
                download_url: url.clone(),
                file_name: file_name.clone(),
                approx_size_mb: *size_mb,
                source_type: SourceType::Static,
            }),
            ReleaseSource::LanguageApi {
                url,
                file_filter,
                download_url,
                file_name,
            } => {
                self.resolve_language_api(vendor, url, file_filter, download_url, file_name)
                    .await
            }
        }
    }

    /// Latest GitHub release, asset selected by include/exclude globs
    async fn resolve_github(
        &self,
        vendor: &VendorDefinition,
        repo: &str,
        asset_pattern: &str,
        exclude_pattern: Option<&str>,
    ) -> Result<ReleaseInfo> {
        let api = format!("{}/repos/{}/releases/latest", self.github_api, repo);
        debug!("Fetching latest release from: {}", api);

        let mut request = self.client.get(&api);
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::resolution(&vendor.id, format!("Failed to query {}: {}", api, e)))?;

        if !response.status().is_success() {
            return Err(Error::resolution(
                &vendor.id,
                format!("GitHub API returned {} for {}", response.status(), repo),
            ));
        }

        let release: GithubRelease = response.json().await.map_err(|e| {
            Error::resolution(&vendor.id, format!("Malformed release response: {}", e))
        })?;

        let include = compile_glob(&vendor.id, asset_pattern)?;
        let exclude = match exclude_pattern {
            Some(pattern) => Some(compile_glob(&vendor.id, pattern)?),
            None => None,
        };

        let asset = release
            .assets
            .iter()
            .filter(|a| exclude.as_ref().map_or(true, |m| !m.is_match(&a.name)))
            .find(|a| include.is_match(&a.name))
            .ok_or_else(|| {
                Error::resolution(
                    &vendor.id,
                    format!(
                        "No asset matching {} in release {}",
                        asset_pattern, release.tag_name
                    ),
                )
            })?;

        let version = release
            .tag_name
            .strip_prefix('v')
            .unwrap_or(&release.tag_name)
            .to_string();

        Ok(ReleaseInfo {
            version,
            download_url: asset.browser_download_url.clone(),
            file_name: asset.name.clone(),
            approx_size_mb: asset.size as f64 / (1024.0 * 1024.0),
            source_type: SourceType::Github,
        })
    }

    /// Regex scrape of an HTML page; group 1 yields the asset link
    async fn resolve_web_scrape(
        &self,
        vendor: &VendorDefinition,
        page_url: &str,
        pattern: &str,
        version_pattern: Option<&str>,
    ) -> Result<ReleaseInfo> {
        debug!("Scraping {} for {}", page_url, vendor.id);

        let response = self.client.get(page_url).send().await.map_err(|e| {
            Error::resolution(&vendor.id, format!("Failed to fetch {}: {}", page_url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::resolution(
                &vendor.id,
                format!("Page fetch returned {} for {}", response.status(), page_url),
            ));
        }

        let body = response.text().await.map_err(|e| {
            Error::resolution(&vendor.id, format!("Failed to read page body: {}", e))
        })?;

        let re = Regex::new(pattern)
            .map_err(|e| Error::resolution(&vendor.id, format!("Invalid scrape pattern: {}", e)))?;

        let captures = re.captures(&body).ok_or_else(|| {
            Error::resolution(
                &vendor.id,
                format!("No match for scrape pattern on {}", page_url),
            )
        })?;

        let target = captures
            .get(1)
            .ok_or_else(|| {
                Error::resolution(&vendor.id, "Scrape pattern has no capture group for the asset")
            })?
            .as_str();

        let download_url = if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            Url::parse(page_url)
                .and_then(|base| base.join(target))
                .map_err(|e| {
                    Error::resolution(
                        &vendor.id,
                        format!("Cannot resolve scraped link {}: {}", target, e),
                    )
                })?
                .to_string()
        };

        let file_name = download_url
            .rsplit('/')
            .next()
            .unwrap_or(target)
            .split('?')
            .next()
            .unwrap_or(target)
            .to_string();

        let version = derive_version(&captures, version_pattern).ok_or_else(|| {
            Error::resolution(&vendor.id, "Could not derive a version from the page match")
        })?;

        Ok(ReleaseInfo {
            version,
            download_url,
            file_name,
            approx_size_mb: 0.0,
            source_type: SourceType::WebScrape,
        })
    }

    /// First qualifying entry of a language version index
    async fn resolve_language_api(
        &self,
        vendor: &VendorDefinition,
        index_url: &str,
        file_filter: &str,
        download_url_template: &str,
        file_name_template: &str,
    ) -> Result<ReleaseInfo> {
        debug!("Querying version index {} for {}", index_url, vendor.id);

        let response = self.client.get(index_url).send().await.map_err(|e| {
            Error::resolution(&vendor.id, format!("Failed to query {}: {}", index_url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::resolution(
                &vendor.id,
                format!("Version index returned {}", response.status()),
            ));
        }

        let entries: Vec<VersionIndexEntry> = response.json().await.map_err(|e| {
            Error::resolution(&vendor.id, format!("Malformed version index: {}", e))
        })?;

        // Upstream orders newest first; take the first entry built for us
        let entry = entries
            .iter()
            .find(|e| e.files.iter().any(|f| f == file_filter))
            .ok_or_else(|| {
                Error::resolution(
                    &vendor.id,
                    format!("No index entry provides {}", file_filter),
                )
            })?;

        let version = entry
            .version
            .strip_prefix('v')
            .unwrap_or(&entry.version)
            .to_string();

        Ok(ReleaseInfo {
            download_url: expand_template(download_url_template, &version),
            file_name: expand_template(file_name_template, &version),
            version,
            approx_size_mb: 0.0,
            source_type: SourceType::LanguageApi,
        })
    }
}

impl Default for ReleaseResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_glob(vendor_id: &str, pattern: &str) -> Result<GlobMatcher> {
    Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|e| Error::resolution(vendor_id, format!("Invalid asset pattern: {}", e)))
}

/// Expand `{version}` placeholders in a URL or file name template
fn expand_template(template: &str, version: &str) -> String {
    template.replace("{version}", version)
}

/// Derive a version from a scrape match
///
/// Preference order: a `version` named group, then capture group 2, then a
/// version-shaped scan over the whole matched text.
fn derive_version(captures: &regex::Captures<'_>, version_pattern: Option<&str>) -> Option<String> {
    if let Some(m) = captures.name("version") {
        return Some(m.as_str().to_string());
    }
    if let Some(m) = captures.get(2) {
        return Some(m.as_str().to_string());
    }

    let pattern = version_pattern.unwrap_or(DEFAULT_VERSION_PATTERN);
    let re = Regex::new(pattern).ok()?;
    re.find(captures.get(0)?.as_str())
        .map(|m| m.as_str().to_string())
}

/// A fallback block mapped verbatim onto a release
fn fallback_release(fallback: &ReleaseFallback, source_type: SourceType) -> ReleaseInfo {
    ReleaseInfo {
        version: fallback.version.clone(),
        download_url: fallback.url.clone(),
        file_name: fallback.file_name.clone(),
        approx_size_mb: fallback.size_mb,
        source_type,
    }
}
