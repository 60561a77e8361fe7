//! JSON catalog writer

use super::traits::{ensure_parent_dir, Catalog, CatalogWriter, OutputResult};
use crate::page::MenuItem;
use crate::product::Product;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
struct JsonCatalog<'a> {
    generated_at: &'a DateTime<Utc>,
    menu: &'a [MenuItem],
    products: &'a [Product],
}

/// Writes `{generated_at, menu, products}` as pretty-printed JSON
#[derive(Debug, Default)]
pub struct JsonWriter;

impl CatalogWriter for JsonWriter {
    fn write(&self, catalog: &Catalog, path: &Path) -> OutputResult<()> {
        ensure_parent_dir(path)?;
        let mut out = BufWriter::new(File::create(path)?);
        let document = JsonCatalog {
            generated_at: &catalog.generated_at,
            menu: &catalog.menu,
            products: &catalog.products,
        };
        serde_json::to_writer_pretty(&mut out, &document)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}
