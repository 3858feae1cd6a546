use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use ecop_sch::{Catalog, Part};
use serde::Serialize;

use crate::compile::print_warnings;

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum CatalogFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for CatalogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogFormat::Table => write!(f, "table"),
            CatalogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "List the parts in a catalog file")]
pub struct CatalogArgs {
    /// Catalog JSON file
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, default_value_t = CatalogFormat::Table)]
    pub format: CatalogFormat,
}

#[derive(Serialize)]
struct CatalogListing<'a> {
    parts: Vec<&'a Part>,
    warnings: &'a [String],
}

pub fn execute(args: CatalogArgs) -> Result<()> {
    let catalog = Catalog::load(&args.file)
        .with_context(|| format!("Failed to load catalog {}", args.file.display()))?;

    let mut parts: Vec<&Part> = catalog.iter().collect();
    parts.sort_by(|a, b| natord::compare(&a.id, &b.id));

    let mut writer = io::stdout().lock();
    match args.format {
        CatalogFormat::Json => {
            let listing = CatalogListing {
                parts,
                warnings: catalog.warnings(),
            };
            writeln!(writer, "{}", serde_json::to_string_pretty(&listing)?)?;
        }
        CatalogFormat::Table => {
            write_parts_table(&parts, &mut writer)?;
            writeln!(writer, "{} parts", parts.len())?;
            print_warnings(catalog.warnings());
        }
    }

    Ok(())
}

fn write_parts_table<W: Write>(parts: &[&Part], mut writer: W) -> io::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(comfy_table::ContentArrangement::DynamicFullWidth);
    table.set_header(vec!["Part", "Kind", "Pins", "set_value"]);

    for part in parts {
        table.add_row(vec![
            part.id.clone(),
            part.kind.clone().unwrap_or_default(),
            part.pins.join(", "),
            if part.allows_value { "yes" } else { "no" }.to_string(),
        ]);
    }

    writeln!(writer, "{table}")
}
