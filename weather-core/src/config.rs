use std::fs;
use std::path::Path;

use crate::error::{ConfigError, PersistenceError};

/// Working-directory file holding the API key: a single line of plain text,
/// trailing newline tolerated.
pub const API_KEY_FILE: &str = "api_key.txt";

/// Working-directory file holding the search history: one city per line.
pub const HISTORY_FILE: &str = "history.txt";

/// Seed entry when no usable history exists.
pub const DEFAULT_CITY: &str = "London";

/// The API key, held for the process lifetime.
///
/// Acquisition is separated from presentation: this type only reads files
/// and validates entered text. The in-window prompt shown when [`load`]
/// fails lives in the frontend.
///
/// [`load`]: Credentials::load
#[derive(Debug, Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Read the key from a plain-text file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_entry(&raw).ok_or_else(|| ConfigError::EmptyKey {
            path: path.display().to_string(),
        })
    }

    /// Build credentials from interactively entered text. Returns `None` for
    /// blank input, which keeps submission disabled.
    pub fn from_entry(text: &str) -> Option<Self> {
        let key = text.trim();
        if key.is_empty() {
            None
        } else {
            Some(Self {
                api_key: key.to_string(),
            })
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Previously searched city names, oldest first.
///
/// Loaded once at startup and saved once at graceful shutdown; there is no
/// incremental persistence, so an abrupt exit loses the session's additions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
}

impl Default for History {
    fn default() -> Self {
        Self {
            entries: vec![DEFAULT_CITY.to_string()],
        }
    }
}

impl History {
    /// Load newline-delimited entries, preserving order and skipping blank
    /// lines. Any failure falls back to the single-entry default.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(text) => {
                let entries: Vec<String> = text
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect();

                if entries.is_empty() {
                    History::default()
                } else {
                    History { entries }
                }
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "no usable history, seeding default");
                History::default()
            }
        }
    }

    /// Write the full list back, newline-joined, in memory order.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let path = path.as_ref();

        fs::write(path, self.entries.join("\n")).map_err(|source| PersistenceError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// Record a submitted city. An already-present name moves to the end so
    /// the list stays ordered by recency.
    pub fn push(&mut self, city: &str) {
        if let Some(pos) = self.entries.iter().position(|e| e == city) {
            self.entries.remove(pos);
        }
        self.entries.push(city.to_string());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The most recent entry, used to pre-fill the input field.
    pub fn most_recent(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn credentials_trim_trailing_newline() {
        let file = temp_file_with("abc123\n");
        let creds = Credentials::load(file.path()).expect("key must load");
        assert_eq!(creds.api_key(), "abc123");
    }

    #[test]
    fn credentials_missing_file_is_config_error() {
        let err = Credentials::load("definitely-not-here/api_key.txt").unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn credentials_blank_file_is_config_error() {
        let file = temp_file_with("\n\n");
        let err = Credentials::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyKey { .. }));
    }

    #[test]
    fn credentials_from_blank_entry_is_none() {
        assert!(Credentials::from_entry("   ").is_none());
        assert!(Credentials::from_entry("").is_none());

        let creds = Credentials::from_entry(" key ").expect("non-blank entry");
        assert_eq!(creds.api_key(), "key");
    }

    #[test]
    fn history_load_preserves_file_order() {
        let file = temp_file_with("Paris\nTokyo");
        let history = History::load(file.path());
        assert_eq!(history.entries(), ["Paris", "Tokyo"]);
    }

    #[test]
    fn history_round_trip_appends_submission() {
        let file = temp_file_with("Paris\nTokyo");

        let mut history = History::load(file.path());
        history.push("Berlin");
        history.save(file.path()).expect("save must succeed");

        let contents = std::fs::read_to_string(file.path()).expect("read back");
        assert_eq!(contents, "Paris\nTokyo\nBerlin");

        let reloaded = History::load(file.path());
        assert_eq!(reloaded.entries(), ["Paris", "Tokyo", "Berlin"]);
    }

    #[test]
    fn history_missing_file_defaults_to_london() {
        let history = History::load("definitely-not-here/history.txt");
        assert_eq!(history.entries(), [DEFAULT_CITY]);
        assert_eq!(history.most_recent(), Some(DEFAULT_CITY));
    }

    #[test]
    fn history_blank_file_defaults_to_london() {
        let file = temp_file_with("\n\n");
        let history = History::load(file.path());
        assert_eq!(history.entries(), [DEFAULT_CITY]);
    }

    #[test]
    fn history_push_moves_existing_entry_to_end() {
        let mut history = History::load("definitely-not-here/history.txt");
        history.push("Paris");
        history.push("London");
        assert_eq!(history.entries(), ["Paris", "London"]);
        assert_eq!(history.most_recent(), Some("London"));
    }

    #[test]
    fn history_save_failure_is_persistence_error() {
        let history = History::default();
        let err = history
            .save("definitely-not-here/history.txt")
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
    }
}
