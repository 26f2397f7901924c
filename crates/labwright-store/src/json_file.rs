//! JSON file persistence for the catalog

use crate::document::{catalog_to_records, records_to_catalog, ItemRecord};
use crate::LoadError;
use labwright_domain::{Catalog, CatalogSource};
use std::fs;
use std::path::{Path, PathBuf};

/// A catalog stored as a single JSON array of item records
///
/// Saving writes to a sibling temporary file and renames it into place, so
/// a crash mid-save leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonCatalogFile {
    path: PathBuf,
}

impl JsonCatalogFile {
    /// Create a handle for the catalog at `path` (nothing is read yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the catalog document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the document exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "catalog.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CatalogSource for JsonCatalogFile {
    type Error = LoadError;

    fn load(&self) -> Result<Catalog, LoadError> {
        if !self.path.exists() {
            return Err(LoadError::Missing(self.path.clone()));
        }

        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Err(LoadError::Empty(self.path.clone()));
        }

        let records: Vec<ItemRecord> = serde_json::from_str(&text)
            .map_err(|e| LoadError::Malformed(format!("{}: {}", self.path.display(), e)))?;
        if records.is_empty() {
            return Err(LoadError::Empty(self.path.clone()));
        }

        let catalog = records_to_catalog(&records)?;
        let issues = catalog.validate();
        if !issues.is_empty() {
            return Err(LoadError::Invalid(issues));
        }

        tracing::debug!(
            path = %self.path.display(),
            items = catalog.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    fn save(&self, catalog: &Catalog) -> Result<(), LoadError> {
        let records = catalog_to_records(catalog);
        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| LoadError::Malformed(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            items = catalog.len(),
            "Saved catalog"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let file = JsonCatalogFile::new(dir.path().join("nope.json"));
        assert!(matches!(file.load(), Err(LoadError::Missing(_))));
    }

    #[test]
    fn test_empty_file_and_empty_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");

        fs::write(&path, "  \n").unwrap();
        assert!(matches!(JsonCatalogFile::new(&path).load(), Err(LoadError::Empty(_))));

        fs::write(&path, "[]").unwrap();
        assert!(matches!(JsonCatalogFile::new(&path).load(), Err(LoadError::Empty(_))));
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{\"name\": ").unwrap();
        assert!(matches!(
            JsonCatalogFile::new(&path).load(),
            Err(LoadError::Malformed(_))
        ));
    }

    #[test]
    fn test_dangling_candidate_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"[{"name": "Pump", "category": "Component",
                 "slots": [{"role": "seal", "candidates": ["Ghost Seal"]}]}]"#,
        )
        .unwrap();

        match JsonCatalogFile::new(&path).load() {
            Err(LoadError::Invalid(issues)) => {
                assert_eq!(issues.len(), 1);
                assert!(issues[0].to_string().contains("Ghost Seal"));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"[{"name": "Pump", "category": "Part"}, {"name": "pump", "category": "Part"}]"#,
        )
        .unwrap();
        assert!(matches!(
            JsonCatalogFile::new(&path).load(),
            Err(LoadError::Catalog(_))
        ));
    }

    #[test]
    fn test_save_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("catalog.json");
        let file = JsonCatalogFile::new(&path);

        let catalog = Catalog::from_items([labwright_domain::CatalogItem::new(
            "Steel Rod",
            labwright_domain::Category::RawMaterial,
        )])
        .unwrap();
        file.save(&catalog).unwrap();

        assert!(file.exists());
        assert!(!file.temp_path().exists());
        assert_eq!(file.load().unwrap(), catalog);
    }
}
