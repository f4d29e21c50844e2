//! View configuration

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Page size used when neither the URL nor the config say otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Delay between the last search keystroke and the filter commit.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Configuration for one mounted table view.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use memlane_lib::TableViewConfig;
///
/// let config = TableViewConfig::default()
///     .with_default_page_size(25)
///     .with_search_debounce(Duration::from_millis(150));
/// assert_eq!(config.default_page_size, 25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableViewConfig {
    /// Page size of a fresh view. `per_page` is omitted from the URL when it
    /// equals this value.
    ///
    /// Default: 10
    pub default_page_size: usize,

    /// Debounce delay for the free-text search input.
    ///
    /// Default: 300ms
    pub search_debounce: Duration,

    /// Column visibility a fresh view starts with. Absent columns are visible.
    pub column_visibility: BTreeMap<String, bool>,
}

impl Default for TableViewConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            column_visibility: BTreeMap::new(),
        }
    }
}

impl TableViewConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default page size. Zero is ignored.
    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        if page_size > 0 {
            self.default_page_size = page_size;
        }
        self
    }

    /// Sets the search debounce delay.
    pub fn with_search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }

    /// Hides a column in fresh views.
    pub fn with_hidden_column(mut self, column: impl Into<String>) -> Self {
        self.column_visibility.insert(column.into(), false);
        self
    }

    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json)?;
        file.try_into()
    }

    /// Reads and parses a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// On-disk shape of [`TableViewConfig`].
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    default_page_size: usize,
    search_debounce_ms: u64,
    hidden_columns: Vec<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64,
            hidden_columns: Vec::new(),
        }
    }
}

impl TryFrom<ConfigFile> for TableViewConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        if file.default_page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "default_page_size",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            default_page_size: file.default_page_size,
            search_debounce: Duration::from_millis(file.search_debounce_ms),
            column_visibility: file
                .hidden_columns
                .into_iter()
                .map(|column| (column, false))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableViewConfig::default();
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert!(config.column_visibility.is_empty());
    }

    #[test]
    fn test_zero_page_size_builder_ignored() {
        let config = TableViewConfig::default().with_default_page_size(0);
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn test_from_json_partial() {
        let config = TableViewConfig::from_json(r#"{ "default_page_size": 20 }"#).unwrap();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.search_debounce, DEFAULT_SEARCH_DEBOUNCE);
    }

    #[test]
    fn test_from_json_hidden_columns() {
        let config = TableViewConfig::from_json(
            r#"{ "search_debounce_ms": 50, "hidden_columns": ["reviewer", "estHours"] }"#,
        )
        .unwrap();
        assert_eq!(config.search_debounce, Duration::from_millis(50));
        assert_eq!(config.column_visibility.get("reviewer"), Some(&false));
        assert_eq!(config.column_visibility.get("estHours"), Some(&false));
    }

    #[test]
    fn test_from_json_rejects_zero_page_size() {
        let err = TableViewConfig::from_json(r#"{ "default_page_size": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "default_page_size",
                ..
            }
        ));
    }

    #[test]
    fn test_from_json_rejects_unknown_field() {
        let err = TableViewConfig::from_json(r#"{ "page_size": 5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
