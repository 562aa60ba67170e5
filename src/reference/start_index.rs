use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{document::CanonicalIndex, error::ReferenceError};

use super::StartIndexProvider;

// {"F001": {"Sig1": {"1r": [1, 1, 1, 1], ...}, ...}, ...}
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct StartIndexTable {
    table: HashMap<String, HashMap<String, HashMap<String, CanonicalIndex>>>,
}

impl StartIndexTable {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse start index table")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read start index table: {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, hist_id: &str, signature: &str, folio: &str, index: CanonicalIndex) {
        self.table
            .entry(hist_id.to_owned())
            .or_default()
            .entry(signature.to_owned())
            .or_default()
            .insert(folio.to_owned(), index);
    }
}

impl StartIndexProvider for StartIndexTable {
    fn start_index(
        &self,
        hist_id: &str,
        signature: &str,
        folio: &str,
    ) -> Result<CanonicalIndex, ReferenceError> {
        self.table
            .get(hist_id)
            .and_then(|signatures| signatures.get(signature))
            .and_then(|folios| folios.get(folio))
            .copied()
            .ok_or_else(|| ReferenceError::StartIndexNotFound {
                hist_id: hist_id.to_owned(),
                signature: signature.to_owned(),
                folio: folio.to_owned(),
            })
    }
}
