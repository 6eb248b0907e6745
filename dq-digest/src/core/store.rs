//! File-backed persistence for rule sets.
//!
//! Layout under the context directory:
//!
//! ```text
//! <context>/expectations/<suite>.json
//! <context>/data_docs/<suite>.md
//! ```

use super::RuleSet;
use crate::prelude::*;
use crate::security::SqlSecurity;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

const EXPECTATIONS_DIR: &str = "expectations";
const DATA_DOCS_DIR: &str = "data_docs";

/// Stores rule sets as JSON documents in a context directory.
#[derive(Debug, Clone)]
pub struct SuiteStore {
    root: PathBuf,
}

impl SuiteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the JSON document for `name`.
    pub fn suite_path(&self, name: &str) -> Result<PathBuf> {
        Self::check_name(name)?;
        Ok(self.root.join(EXPECTATIONS_DIR).join(format!("{name}.json")))
    }

    /// Path of the rendered data docs page for `name`.
    pub fn data_docs_path(&self, name: &str) -> Result<PathBuf> {
        Self::check_name(name)?;
        Ok(self.root.join(DATA_DOCS_DIR).join(format!("{name}.md")))
    }

    /// Names of all stored rule sets, sorted.
    pub async fn list_names(&self) -> Result<Vec<String>> {
        let dir = self.root.join(EXPECTATIONS_DIR);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Loads a rule set, or `None` if it was never saved.
    pub async fn load(&self, name: &str) -> Result<Option<RuleSet>> {
        let path = self.suite_path(name)?;
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let set = serde_json::from_str(&raw).map_err(|e| {
            DigestError::suite(name, format!("corrupt rule set {}: {e}", path.display()))
        })?;
        Ok(Some(set))
    }

    /// Returns the stored rule set named `name`, or a fresh empty one.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, name: &str) -> Result<RuleSet> {
        if self.list_names().await?.iter().any(|n| n == name) {
            if let Some(set) = self.load(name).await? {
                debug!(rules = set.len(), "Reusing stored rule set");
                return Ok(set);
            }
        }
        debug!("Creating rule set");
        Ok(RuleSet::new(name))
    }

    /// Writes a rule set, replacing any previous version.
    pub async fn save(&self, set: &RuleSet) -> Result<PathBuf> {
        let path = self.suite_path(set.name())?;
        let json = serde_json::to_string_pretty(set)
            .map_err(|e| DigestError::Serialization(e.to_string()))?;
        write_atomically(&path, json.as_bytes()).await?;
        debug!(suite = set.name(), path = %path.display(), "Saved rule set");
        Ok(path)
    }

    /// Writes the data docs page for a rule set.
    pub async fn write_data_docs(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.data_docs_path(name)?;
        write_atomically(&path, contents.as_bytes()).await?;
        Ok(path)
    }

    fn check_name(name: &str) -> Result<()> {
        SqlSecurity::validate_identifier(name)
            .map_err(|e| DigestError::suite(name, format!("invalid rule set name: {e}")))
    }
}

async fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
