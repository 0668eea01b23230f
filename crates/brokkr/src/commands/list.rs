//! List command

use anyhow::Result;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::ListArgs;
use crate::output;

#[derive(Tabled)]
struct VendorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Enabled")]
    enabled: bool,
    #[tabled(rename = "Required")]
    required: bool,
}

pub fn run(args: ListArgs) -> Result<()> {
    let catalog = super::load_catalog(args.catalog.as_ref());

    if catalog.is_empty() {
        output::warning("Vendor catalog is empty");
        return Ok(());
    }

    let rows: Vec<VendorRow> = catalog
        .iter()
        .map(|vendor| VendorRow {
            id: vendor.id.clone(),
            name: vendor.name.clone(),
            source: vendor.source.strategy.source_type().to_string(),
            enabled: vendor.enabled,
            required: vendor.required,
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);
    Ok(())
}
