use std::env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSettings {
    /// Column holding a single index, for `sql_clause()`.
    pub index_column: String,
    /// Columns holding a stored range, for `sql_range_clause()`.
    pub range_begins_column: String,
    pub range_ends_column: String,
    pub chapter_grid_width: usize,
    /// Previous/next chapter wrap around within the book's library.
    pub wrap_navigation: bool,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        ReferenceSettings {
            index_column: "reference".to_string(),
            range_begins_column: "range_begins".to_string(),
            range_ends_column: "range_ends".to_string(),
            chapter_grid_width: 10,
            wrap_navigation: true,
        }
    }
}

impl ReferenceSettings {
    /// Missing keys keep their default value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: ReferenceSettings =
            serde_json::from_str(json).context("Failed to parse reference settings")?;
        Ok(settings)
    }

    /// Defaults overridden by `KOINOS_INDEX_COLUMN`, `KOINOS_RANGE_BEGINS_COLUMN`,
    /// `KOINOS_RANGE_ENDS_COLUMN`, `KOINOS_CHAPTER_GRID_WIDTH` and `KOINOS_WRAP_NAVIGATION`,
    /// read after loading `.env`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = ReferenceSettings::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = value("KOINOS_INDEX_COLUMN") {
            settings.index_column = v;
        }
        if let Some(v) = value("KOINOS_RANGE_BEGINS_COLUMN") {
            settings.range_begins_column = v;
        }
        if let Some(v) = value("KOINOS_RANGE_ENDS_COLUMN") {
            settings.range_ends_column = v;
        }
        if let Some(v) = value("KOINOS_CHAPTER_GRID_WIDTH") {
            settings.chapter_grid_width = v
                .parse()
                .with_context(|| format!("KOINOS_CHAPTER_GRID_WIDTH is not a number: {}", v))?;
        }
        if let Some(v) = value("KOINOS_WRAP_NAVIGATION") {
            settings.wrap_navigation = v.to_lowercase() == "true";
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use serial_test::serial;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = ReferenceSettings::from_json_str(r#"{"chapter_grid_width": 5}"#).unwrap();
        assert_eq!(settings.chapter_grid_width, 5);
        assert_eq!(settings.index_column, "reference");
        assert!(settings.wrap_navigation);

        assert!(ReferenceSettings::from_json_str(r#"{"chapter_grid_width": "wide"}"#).is_err());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("KOINOS_INDEX_COLUMN", "verse_index"),
            ("KOINOS_RANGE_ENDS_COLUMN", "  "),
            ("KOINOS_WRAP_NAVIGATION", "False"),
        ]
        .into_iter()
        .collect();
        let settings = ReferenceSettings::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(settings.index_column, "verse_index");
        assert_eq!(settings.range_ends_column, "range_ends");
        assert!(!settings.wrap_navigation);

        let bad = ReferenceSettings::from_lookup(|k| {
            (k == "KOINOS_CHAPTER_GRID_WIDTH").then(|| "ten".to_string())
        });
        assert!(bad.is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        unsafe { env::set_var("KOINOS_CHAPTER_GRID_WIDTH", "7"); }
        let settings = ReferenceSettings::from_env().unwrap();
        unsafe { env::remove_var("KOINOS_CHAPTER_GRID_WIDTH"); }
        assert_eq!(settings.chapter_grid_width, 7);
    }
}
