//! Which lead-table columns are shown, persisted per user.
//!
//! Stored as a JSON array of column keys in
//! `{paths.state}/leads.visibleColumns.json`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;

pub const STORAGE_FILE: &str = "leads.visibleColumns.json";

/// Known lead columns: key and header label
pub const LEAD_COLUMNS: &[(&str, &str)] = &[
    ("email", "Email"),
    ("bedrijf", "Bedrijf"),
    ("website", "Website"),
    ("linkedin", "LinkedIn"),
    ("image_path", "Avatar"),
    ("created_at", "Created"),
];

pub fn default_columns() -> Vec<String> {
    LEAD_COLUMNS.iter().map(|(key, _)| key.to_string()).collect()
}

pub fn column_label(key: &str) -> Option<&'static str> {
    LEAD_COLUMNS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

pub struct VisibleColumns {
    path: PathBuf,
    columns: Vec<String>,
}

impl VisibleColumns {
    /// Load from `path`; missing or unparseable files give the default set
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let columns = std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str::<Vec<String>>(&s).ok())
            .unwrap_or_else(default_columns);
        Self { path, columns }
    }

    pub fn for_config(config: &Config) -> Self {
        Self::load(config.state_path().join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Columns not currently shown
    pub fn hidden_count(&self) -> usize {
        LEAD_COLUMNS
            .iter()
            .filter(|(key, _)| !self.is_visible(key))
            .count()
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c == key)
    }

    /// Show or hide `key` and persist the result
    pub fn toggle(&mut self, key: &str) -> Result<()> {
        if let Some(index) = self.columns.iter().position(|c| c == key) {
            self.columns.remove(index);
        } else {
            self.columns.push(key.to_string());
        }
        self.save()
    }

    pub fn set(&mut self, columns: Vec<String>) -> Result<()> {
        self.columns = columns;
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        let json =
            serde_json::to_string(&self.columns).context("Failed to serialize column list")?;
        std::fs::write(&self.path, json).context("Failed to write column preferences")?;
        Ok(())
    }
}
