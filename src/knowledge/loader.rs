//! Load knowledge templates from typed JSON lists
//!
//! Each data file is a list of `{"type": "CityData", "data": {...}}` items.
//! Malformed or unknown items are skipped with a warning; a file whose top
//! level is not a list is rejected.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

use crate::core::error::{EngineError, Result};
use crate::knowledge::{CityTemplate, Knowledge, PartyTemplate, ThreatTemplate, UnitTemplate};

/// Data files read by [`load_knowledge_dir`], in load order
const KNOWLEDGE_FILES: [&str; 4] = ["parties.json", "cities.json", "units.json", "threats.json"];

/// Accumulates templates from one or more typed JSON lists
#[derive(Debug, Default)]
pub struct KnowledgeLoader {
    knowledge: Knowledge,
    skipped: usize,
}

impl KnowledgeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> Knowledge {
        self.knowledge
    }

    /// Load one typed list, returning how many templates were accepted
    pub fn load_str(&mut self, source: &str, json: &str) -> Result<usize> {
        let payload: Value = serde_json::from_str(json)?;
        let items = payload.as_array().ok_or_else(|| {
            EngineError::DataFormat(format!("{}: expected a list of typed objects", source))
        })?;

        let mut accepted = 0;
        for (index, item) in items.iter().enumerate() {
            let (Some(kind), Some(data)) = (item.get("type").and_then(|v| v.as_str()), item.get("data")) else {
                tracing::error!("{}[{}]: item is missing 'type' or 'data', skipping", source, index);
                self.skipped += 1;
                continue;
            };

            let stored = match kind {
                "PartyData" => self.insert::<PartyTemplate>(source, index, data, |k, t| {
                    k.parties.insert(t.id, t).is_some()
                }),
                "CityData" => self.insert::<CityTemplate>(source, index, data, |k, t| {
                    k.cities.insert(t.id.clone(), t).is_some()
                }),
                "UnitData" => self.insert::<UnitTemplate>(source, index, data, |k, t| {
                    k.units.insert(t.id.clone(), t).is_some()
                }),
                "ThreatData" => self.insert::<ThreatTemplate>(source, index, data, |k, t| {
                    k.threats.insert(t.id.clone(), t).is_some()
                }),
                other => {
                    tracing::warn!("{}[{}]: unknown type '{}', skipping", source, index, other);
                    false
                }
            };

            if stored {
                accepted += 1;
            } else {
                self.skipped += 1;
            }
        }

        tracing::debug!("{}: loaded {} templates", source, accepted);
        Ok(accepted)
    }

    /// Load one typed list from disk
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        self.load_str(&path.display().to_string(), &content)
    }

    fn insert<T: DeserializeOwned>(
        &mut self,
        source: &str,
        index: usize,
        data: &Value,
        store: impl FnOnce(&mut Knowledge, T) -> bool,
    ) -> bool {
        match T::deserialize(data) {
            Ok(template) => {
                if store(&mut self.knowledge, template) {
                    tracing::warn!("{}[{}]: duplicate id, previous entry overwritten", source, index);
                }
                true
            }
            Err(e) => {
                tracing::error!("{}[{}]: validation failed: {}", source, index, e);
                false
            }
        }
    }
}

/// Load every knowledge file from a data directory
pub fn load_knowledge_dir(dir: &Path) -> Result<Knowledge> {
    let mut loader = KnowledgeLoader::new();
    for file in KNOWLEDGE_FILES {
        loader.load_file(&dir.join(file))?;
    }
    if loader.skipped() > 0 {
        tracing::warn!("{} knowledge items skipped while loading {}", loader.skipped(), dir.display());
    }
    Ok(loader.finish())
}
