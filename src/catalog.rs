use std::path::{Path, PathBuf};

use crate::models::product::Product;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-only product snapshot. The checkout path treats this as ground truth
/// for which price ids exist and in which partition.
pub trait ProductCatalog: Send + Sync {
    fn read(&self) -> Result<Vec<Product>, CatalogError>;
}

/// Catalog sourced from a static JSON file, re-read on every call so edits
/// to the file show up without a restart.
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ProductCatalog for FileCatalog {
    fn read(&self) -> Result<Vec<Product>, CatalogError> {
        let bytes = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Fixed in-memory catalog, used by tests.
#[derive(Clone, Default)]
pub struct StaticCatalog {
    pub products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

impl ProductCatalog for StaticCatalog {
    fn read(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.clone())
    }
}
