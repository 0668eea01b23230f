//! Lock file commands

use anyhow::{bail, Result};
use brokkr_vendors::LockFileManager;
use std::path::PathBuf;

use crate::cli::{LockCommands, LockExportArgs, LockValidateArgs};
use crate::output;

pub fn run(cmd: LockCommands) -> Result<()> {
    match cmd {
        LockCommands::Export(args) => export(args),
        LockCommands::Validate(args) => validate(args),
    }
}

fn export(args: LockExportArgs) -> Result<()> {
    let home = super::resolve_home(args.root.as_ref())?;
    let catalog = super::load_catalog(args.catalog.as_ref());

    let path: PathBuf = match &args.output {
        Some(output) => output.as_std_path().to_path_buf(),
        None => home.lock_file(),
    };

    let manager = LockFileManager::new(&catalog, &home);
    let lock = manager.export_to(&path, args.hash)?;

    output::success(&format!(
        "Exported {} vendor(s) to {}",
        lock.vendors.len(),
        path.display()
    ));
    if !args.hash {
        output::info("Artifact hashes omitted; pass --hash to record them");
    }
    Ok(())
}

fn validate(args: LockValidateArgs) -> Result<()> {
    let home = super::resolve_home(args.root.as_ref())?;
    let catalog = super::load_catalog(args.catalog.as_ref());

    let path: PathBuf = match &args.file {
        Some(file) => file.as_std_path().to_path_buf(),
        None => home.lock_file(),
    };

    let manager = LockFileManager::new(&catalog, &home);
    let report = manager.validate(&path, args.hash)?;

    for issue in &report.issues {
        output::error(&format!("{}: {}", issue.vendor, issue.message));
    }

    if report.is_clean() {
        output::success(&format!("{} lock entries validated", report.checked));
        Ok(())
    } else {
        bail!(
            "{} validation issue(s) across {} entries",
            report.issues.len(),
            report.checked
        );
    }
}
