//! Output writer trait and shared types

use crate::page::MenuItem;
use crate::product::Product;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything a crawl produces for the output file
#[derive(Debug, Clone)]
pub struct Catalog {
    pub generated_at: DateTime<Utc>,
    pub menu: Vec<MenuItem>,
    pub products: Vec<Product>,
}

impl Catalog {
    pub fn new(menu: Vec<MenuItem>, products: Vec<Product>) -> Self {
        Self {
            generated_at: Utc::now(),
            menu,
            products,
        }
    }
}

/// Trait for catalog output formats
pub trait CatalogWriter {
    /// Writes the catalog to `path`, creating parent directories as needed
    fn write(&self, catalog: &Catalog, path: &Path) -> OutputResult<()>;
}

/// Creates the parent directory of `path` if it has one
pub(crate) fn ensure_parent_dir(path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
