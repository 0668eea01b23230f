//! Archive extraction into vendor extract directories
//!
//! Dispatch is by file extension. Zip and tar.gz archives are unpacked
//! in-process; `.msi` installers are delegated to the platform installer;
//! `.tar.xz` artifacts need an external multi-format archiver because the
//! in-process tar stack cannot read the xz frame. An unrecognized extension
//! reports `false` without raising so the orchestrator records a clean
//! "unsupported format" outcome.

use anyhow::{anyhow, bail, Context};
use brokkr_core::VendorHome;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

/// Recognized archive container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    Zip,
    TarGz,
    TarXz,
    Msi,
}

/// Classify an archive by its file name
fn archive_kind(path: &Path) -> Option<ArchiveKind> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    if name.ends_with(".zip") {
        Some(ArchiveKind::Zip)
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Some(ArchiveKind::TarGz)
    } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
        Some(ArchiveKind::TarXz)
    } else if name.ends_with(".msi") {
        Some(ArchiveKind::Msi)
    } else {
        None
    }
}

/// Unpacks downloaded artifacts into a vendor's extract directory
pub struct ArchiveExtractor {
    /// External multi-format archiver, if one could be located
    archiver: Option<PathBuf>,
}

impl ArchiveExtractor {
    /// Create an extractor, locating the external archiver up front
    pub fn new(home: &VendorHome) -> Self {
        let archiver = locate_archiver(home);
        match &archiver {
            Some(path) => debug!("Using archiver: {}", path.display()),
            None => debug!("No multi-format archiver found, tar.xz will use the tar utility"),
        }
        Self { archiver }
    }

    /// Extract `archive` into `dest`
    ///
    /// Returns `false` on unsupported formats and on extraction failure;
    /// nothing is created in `dest` for an unrecognized extension.
    pub async fn extract(&self, archive: &Path, dest: &Path) -> bool {
        let kind = match archive_kind(archive) {
            Some(kind) => kind,
            None => {
                warn!("Unsupported archive format: {}", archive.display());
                return false;
            }
        };

        match self.extract_kind(kind, archive, dest).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Extraction of {} failed: {:#}", archive.display(), e);
                false
            }
        }
    }

    async fn extract_kind(
        &self,
        kind: ArchiveKind,
        archive: &Path,
        dest: &Path,
    ) -> anyhow::Result<()> {
        fs::create_dir_all(dest).context("Failed to create extract directory")?;
        match kind {
            ArchiveKind::Zip => extract_zip(archive, dest),
            ArchiveKind::TarGz => extract_tar_gz(archive, dest),
            ArchiveKind::Msi => extract_msi(archive, dest).await,
            ArchiveKind::TarXz => self.extract_tar_xz(archive, dest).await,
        }
    }

    /// Two-stage tar.xz extraction
    ///
    /// Stage one strips the xz frame into an intermediate tar in a staging
    /// directory; stage two expands that tar in-process. The staging
    /// directory (and with it the intermediate tar) is removed on success
    /// and failure alike.
    async fn extract_tar_xz(&self, archive: &Path, dest: &Path) -> anyhow::Result<()> {
        let archiver = match &self.archiver {
            Some(archiver) => archiver,
            None => return extract_tar_xz_with_tar(archive, dest).await,
        };

        let staging = tempfile::tempdir().context("Failed to create staging directory")?;

        let status = Command::new(archiver)
            .arg("x")
            .arg("-y")
            .arg(format!("-o{}", staging.path().display()))
            .arg(archive)
            .status()
            .await
            .with_context(|| format!("Failed to run archiver {}", archiver.display()))?;

        if !status.success() {
            bail!("Archiver exited with {:?}", status.code());
        }

        let tar_path = find_intermediate_tar(staging.path())?;
        let mut tar = tar::Archive::new(File::open(&tar_path)?);
        tar.unpack(dest).context("Failed to unpack intermediate tar")?;

        Ok(())
    }
}

/// In-process zip extraction, entry by entry
fn extract_zip(archive: &Path, dest: &Path) -> anyhow::Result<()> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).context("Failed to open zip archive")?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).context("Failed to read zip entry")?;

        // Entries with unsafe names (absolute, parent traversal) are skipped
        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => continue,
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&outpath)?;
            std::io::copy(&mut entry, &mut out)?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

/// In-process tar.gz extraction
fn extract_tar_gz(archive: &Path, dest: &Path) -> anyhow::Result<()> {
    let file = File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.unpack(dest).context("Failed to unpack tar.gz")?;
    Ok(())
}

/// Silent administrative install; the installer decides the internal layout
async fn extract_msi(archive: &Path, dest: &Path) -> anyhow::Result<()> {
    let target = fs::canonicalize(dest).context("Failed to canonicalize extract directory")?;

    let status = Command::new("msiexec")
        .arg("/a")
        .arg(archive)
        .arg("/qn")
        .arg(format!("TARGETDIR={}", target.display()))
        .status()
        .await
        .context("Failed to run msiexec")?;

    if !status.success() {
        bail!("msiexec exited with {:?}", status.code());
    }
    Ok(())
}

/// Last resort when no multi-format archiver exists: the raw tar utility
async fn extract_tar_xz_with_tar(archive: &Path, dest: &Path) -> anyhow::Result<()> {
    let tar_bin = which::which("tar").map_err(|_| {
        anyhow!(
            "No archiver or tar utility available for {}",
            archive.display()
        )
    })?;

    let status = Command::new(tar_bin)
        .arg("-xJf")
        .arg(archive)
        .arg("-C")
        .arg(dest)
        .status()
        .await
        .context("Failed to run tar")?;

    if !status.success() {
        bail!("tar exited with {:?}", status.code());
    }
    Ok(())
}

/// Find the tar the archiver produced in the staging directory
fn find_intermediate_tar(dir: &Path) -> anyhow::Result<PathBuf> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path
            .extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("tar"))
        {
            return Ok(path);
        }
    }
    bail!("Archiver produced no intermediate tar")
}

/// Locate a multi-format archiver: vendored copy preferred, then PATH
fn locate_archiver(home: &VendorHome) -> Option<PathBuf> {
    for candidate in ["7z.exe", "7z"] {
        let vendored = home.vendors_dir.join("7zip").join(candidate);
        if vendored.is_file() {
            return Some(vendored);
        }
    }

    for bin in ["7z", "7za", "7zz"] {
        if let Ok(path) = which::which(bin) {
            return Some(path);
        }
    }

    None
}
