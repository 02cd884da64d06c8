//! Persistence of the custom catalog.
//!
//! A catalog is an ordered list of `(name, definition)` pairs. The JSON file
//! format is a single object mapping names to definition strings, with sorted
//! keys and 2-space indentation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File name of the custom catalog when stored in a directory.
pub const CUSTOM_CATALOG_FILE: &str = "customFit.txt";

/// Backing storage for the custom catalog.
///
/// The registry reads the store on every access and writes it after every
/// mutation, so implementations must not cache.
pub trait CatalogStore {
    /// Read every entry. A store that was never written is empty.
    fn load(&self) -> Result<Vec<(String, String)>>;

    /// Replace the stored catalog with `entries`.
    fn save(&mut self, entries: &[(String, String)]) -> Result<()>;
}

/// A catalog persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store the catalog at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store the catalog as [`CUSTOM_CATALOG_FILE`] inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join(CUSTOM_CATALOG_FILE))
    }

    /// Location of the catalog file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogStore for JsonFileStore {
    fn load(&self) -> Result<Vec<(String, String)>> {
        if !self.path.exists() {
            log::debug!("no custom catalog at {}", self.path.display());
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        let catalog: BTreeMap<String, String> = serde_json::from_str(&contents)?;
        log::debug!(
            "read {} custom definitions from {}",
            catalog.len(),
            self.path.display()
        );
        Ok(catalog.into_iter().collect())
    }

    fn save(&mut self, entries: &[(String, String)]) -> Result<()> {
        let catalog: BTreeMap<&str, &str> = entries
            .iter()
            .map(|(name, definition)| (name.as_str(), definition.as_str()))
            .collect();
        let json = serde_json::to_string_pretty(&catalog)?;
        fs::write(&self.path, json)?;
        log::debug!(
            "wrote {} custom definitions to {}",
            catalog.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// An in-memory catalog that keeps insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<(String, String)>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl CatalogStore for MemoryStore {
    fn load(&self) -> Result<Vec<(String, String)>> {
        Ok(self.entries.clone())
    }

    fn save(&mut self, entries: &[(String, String)]) -> Result<()> {
        self.entries = entries.to_vec();
        Ok(())
    }
}
