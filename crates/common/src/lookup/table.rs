//! In-memory case table

use super::CaseLookup;
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Case lookup backed by a fixed table (case number -> identifier).
///
/// Used offline, in tests, and with tables exported from a registry.
#[derive(Debug, Clone, Default)]
pub struct StaticCaseLookup {
    table: HashMap<String, String>,
}

impl StaticCaseLookup {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self { table }
    }

    /// Load a JSON object `{"145/83": "ECLI:EU:C:1985:448", ...}`
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let table: HashMap<String, String> = serde_json::from_str(&raw)?;
        tracing::info!(
            path = %path.as_ref().display(),
            entries = table.len(),
            "Loaded case table"
        );
        Ok(Self::new(table))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl FromIterator<(String, String)> for StaticCaseLookup {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl CaseLookup for StaticCaseLookup {
    async fn lookup(&self, case_number: &str) -> Result<Option<String>> {
        Ok(self.table.get(case_number).cloned())
    }

    fn name(&self) -> &str {
        "static"
    }
}
