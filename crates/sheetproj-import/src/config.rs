//! Import settings.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::ImportError;

/// Locale-dependent knobs of an import
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// chrono `strftime` pattern for dates in cells
    pub short_date_format: String,
    /// Separators inside "Resources" and "Predecessors" cells
    pub list_separators: Vec<char>,
    /// Field delimiter for delimited text input
    pub csv_delimiter: char,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            short_date_format: "%d/%m/%y".to_string(),
            list_separators: vec![';', ','],
            csv_delimiter: ',',
        }
    }
}

impl ImportConfig {
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.short_date_format = format.into();
        self
    }

    pub fn with_csv_delimiter(mut self, delimiter: char) -> Self {
        self.csv_delimiter = delimiter;
        self
    }

    /// Reject settings that would make formatting fail later on
    pub fn validate(&self) -> Result<(), ImportError> {
        let items: Vec<Item<'_>> = StrftimeItems::new(&self.short_date_format).collect();
        if items.is_empty() || items.iter().any(|i| matches!(i, Item::Error)) {
            return Err(ImportError::InvalidDateFormat(
                self.short_date_format.clone(),
            ));
        }
        if !self.csv_delimiter.is_ascii() {
            return Err(ImportError::InvalidDelimiter(self.csv_delimiter));
        }
        Ok(())
    }

    /// Separator used when writing lists back out
    pub fn primary_separator(&self) -> char {
        self.list_separators.first().copied().unwrap_or(';')
    }

    /// Split a list cell into trimmed, non-empty items
    pub fn split_list<'a>(&self, cell: &'a str) -> Vec<&'a str> {
        cell.split(|c| self.list_separators.contains(&c))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.short_date_format, "%d/%m/%y");
        assert_eq!(config.primary_separator(), ';');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_formats() {
        assert!(matches!(
            ImportConfig::default().with_date_format("%Q").validate(),
            Err(ImportError::InvalidDateFormat(_))
        ));
        assert!(ImportConfig::default().with_date_format("").validate().is_err());
        assert!(ImportConfig::default()
            .with_csv_delimiter('§')
            .validate()
            .is_err());
    }

    #[test]
    fn split_list_trims_and_drops_empties() {
        let config = ImportConfig::default();
        assert_eq!(config.split_list(" Joe ; John,, "), vec!["Joe", "John"]);
        assert!(config.split_list("").is_empty());
    }
}
