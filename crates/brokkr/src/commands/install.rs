//! Install command

use anyhow::{bail, Result};
use brokkr_vendors::{InstallOrchestrator, VendorOutcome};
use dialoguer::Confirm;

use crate::cli::InstallArgs;
use crate::output;

pub async fn run(args: InstallArgs) -> Result<()> {
    let home = super::resolve_home(args.root.as_ref())?;
    let catalog = super::load_catalog(args.catalog.as_ref());

    if catalog.is_empty() {
        output::warning("Vendor catalog is empty, nothing to install");
        return Ok(());
    }

    if args.force && !args.yes {
        let proceed = Confirm::new()
            .with_prompt("Force reinstall clears existing vendor directories. Continue?")
            .default(false)
            .interact()
            .unwrap_or(false);
        if !proceed {
            output::info("Aborted");
            return Ok(());
        }
    }

    let selection = if args.vendors.is_empty() {
        None
    } else {
        Some(args.vendors.as_slice())
    };

    let orchestrator = InstallOrchestrator::new(catalog, home)
        .with_force(args.force)
        .with_max_retries(args.max_retries);

    let report = orchestrator.install(selection).await?;

    // One terse status line per vendor
    for result in &report.results {
        match &result.outcome {
            VendorOutcome::Done => {
                output::success(&format!("{}: installed", result.vendor_id));
            }
            VendorOutcome::Skipped { reason } => {
                output::info(&format!("{}: skipped ({})", result.vendor_id, reason));
            }
            VendorOutcome::Failed { stage, message } => {
                output::error(&format!(
                    "{}: failed at {} ({})",
                    result.vendor_id, stage, message
                ));
            }
        }
    }

    let failed: Vec<_> = report.failures().collect();
    if !failed.is_empty() {
        output::header("Failed vendors");
        for failure in &failed {
            if let VendorOutcome::Failed { message, .. } = &failure.outcome {
                output::kv(&failure.vendor_id, message);
            }
        }
    }

    println!(
        "\n{} installed, {} skipped, {} failed",
        report.done(),
        report.skipped(),
        failed.len()
    );

    if !report.is_success() {
        let names: Vec<_> = report
            .required_failures()
            .map(|r| r.vendor_id.as_str())
            .collect();
        bail!("required vendor(s) failed: {}", names.join(", "));
    }

    Ok(())
}
