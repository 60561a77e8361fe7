//! CSV catalog writer
//!
//! One table holds both menu and product rows, told apart by the
//! `record_type` column. List-valued fields are embedded as JSON text.

use super::traits::{ensure_parent_dir, Catalog, CatalogWriter, OutputResult};
use crate::page::MenuItem;
use crate::product::Product;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Default, Serialize)]
struct CsvRow {
    record_type: &'static str,
    text: String,
    menu_url: String,
    product_url: String,
    canonical_url: String,
    name: String,
    price: Option<f64>,
    currency: String,
    sku: String,
    brand: String,
    description: String,
    images: String,
    gender: String,
    categories: String,
    found_in: String,
}

impl CsvRow {
    fn menu(item: &MenuItem) -> Self {
        Self {
            record_type: "menu",
            text: item.text.clone(),
            menu_url: item.url.clone(),
            ..Default::default()
        }
    }

    fn product(product: &Product) -> OutputResult<Self> {
        Ok(Self {
            record_type: "product",
            product_url: product.url.clone(),
            canonical_url: product.canonical_url.clone(),
            name: product.name.clone(),
            price: product.price,
            currency: product.currency.clone(),
            sku: product.sku.clone(),
            brand: product.brand.clone(),
            description: product.description.clone(),
            images: serde_json::to_string(&product.images)?,
            gender: product.gender.to_string(),
            categories: serde_json::to_string(&product.categories)?,
            found_in: serde_json::to_string(&product.found_in)?,
            ..Default::default()
        })
    }
}

/// Writes menu rows followed by product rows
#[derive(Debug, Default)]
pub struct CsvWriter;

impl CatalogWriter for CsvWriter {
    fn write(&self, catalog: &Catalog, path: &Path) -> OutputResult<()> {
        ensure_parent_dir(path)?;
        let mut writer = csv::Writer::from_path(path)?;
        for item in &catalog.menu {
            writer.serialize(CsvRow::menu(item))?;
        }
        for product in &catalog.products {
            writer.serialize(CsvRow::product(product)?)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Gender;
    use crate::product::{GenderSummary, Provenance};
    use tempfile::TempDir;

    #[test]
    fn test_write_csv_rows() {
        let product = Product {
            url: "https://shop.example.com/isee-red-jacket".to_string(),
            canonical_url: "https://shop.example.com/isee-red-jacket".to_string(),
            name: "Red, \"Warm\" Jacket".to_string(),
            price: Some(89.5),
            currency: "EUR".to_string(),
            sku: String::new(),
            brand: String::new(),
            images: vec!["https://cdn.example.com/a.jpg".to_string()],
            description: String::new(),
            gender: GenderSummary::Both,
            categories: vec!["jackets".to_string()],
            found_in: vec![Provenance::new(
                Some(Gender::Women),
                None,
                "https://shop.example.com/women",
            )],
        };
        let catalog = Catalog::new(
            vec![MenuItem {
                text: "Men".to_string(),
                url: "https://shop.example.com/men".to_string(),
            }],
            vec![product],
        );

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/products.csv");
        CsvWriter.write(&catalog, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![
                "record_type", "text", "menu_url", "product_url", "canonical_url", "name",
                "price", "currency", "sku", "brand", "description", "images", "gender",
                "categories", "found_in"
            ]
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "menu");
        assert_eq!(&rows[0][1], "Men");
        assert_eq!(&rows[0][6], "");
        assert_eq!(&rows[1][0], "product");
        assert_eq!(&rows[1][5], "Red, \"Warm\" Jacket");
        assert_eq!(&rows[1][6], "89.5");
        assert_eq!(&rows[1][12], "both");
        assert_eq!(&rows[1][13], r#"["jackets"]"#);

        let found_in: serde_json::Value = serde_json::from_str(&rows[1][14]).unwrap();
        assert_eq!(found_in[0]["gender"], "women");
        assert!(found_in[0]["category"].is_null());
    }
}
