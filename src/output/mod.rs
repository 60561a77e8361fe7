//! Output module for writing the crawl catalog
//!
//! This module handles:
//! - Writing the menu and merged products as JSON or CSV
//! - Recording and printing crawl statistics

mod csv_output;
mod json;
pub mod stats;
mod traits;

pub use csv_output::CsvWriter;
pub use json::JsonWriter;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{Catalog, CatalogWriter, OutputError, OutputResult};

use crate::config::OutputFormat;
use std::path::Path;

/// Returns the writer for an output format
pub fn writer_for(format: OutputFormat) -> Box<dyn CatalogWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter),
        OutputFormat::Csv => Box::new(CsvWriter),
    }
}

/// Writes the catalog in `format` to `path`
///
/// # Arguments
///
/// * `catalog` - Menu and products to write
/// * `format` - Output format
/// * `path` - Destination file; parent directories are created
pub fn write_catalog(catalog: &Catalog, format: OutputFormat, path: &Path) -> OutputResult<()> {
    writer_for(format).write(catalog, path)?;
    tracing::info!(
        "Wrote {} products and {} menu items to {}",
        catalog.products.len(),
        catalog.menu.len(),
        path.display()
    );
    Ok(())
}
