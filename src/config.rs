use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Default cutoff date; posts published earlier are excluded from reports.
pub const DEFAULT_OLDEST_POST: &str = "2015-10-01";

/// Default minimum text length for posts and comments.
///
/// A body whose markup decodes to the literal string "None" is four
/// characters long; the default cutoff sits just above it.
pub const DEFAULT_MIN_CONTENT_LEN: usize = 5;

/// Default delay between consecutive page fetches, in seconds.
pub const DEFAULT_POLITENESS_DELAY_SECS: f64 = 1.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },
}

/// Application configuration, built once at startup and passed by reference
/// to each pipeline stage.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the WXR export document.
    pub export_path: PathBuf,
    /// Destination CSV for the per-post report.
    pub post_report_path: PathBuf,
    /// Directory where rendered pages are cached.
    pub cache_dir: PathBuf,
    /// Destination CSV for the flat rendered-page comment report.
    pub comment_report_path: PathBuf,
    /// Destination CSV for the per-author aggregate report.
    pub author_report_path: PathBuf,
    /// Minimum delay between consecutive page fetches.
    pub politeness_delay: Duration,
    /// Posts published before this instant are excluded.
    pub oldest_post: NaiveDateTime,
    /// Posts and comments with fewer text characters are excluded.
    pub min_content_len: usize,
}

impl Config {
    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if a required path is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.export_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "export",
                message: "export path cannot be empty".to_string(),
            });
        }
        if self.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "cache-dir",
                message: "cache directory cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Configuration with quiet defaults for tests: no politeness delay and
    /// no date cutoff.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            export_path: PathBuf::from("export.xml"),
            post_report_path: PathBuf::from("postReport.csv"),
            cache_dir: PathBuf::from("postData"),
            comment_report_path: PathBuf::from("commentReport.csv"),
            author_report_path: PathBuf::from("authorReport.csv"),
            politeness_delay: Duration::ZERO,
            oldest_post: NaiveDateTime::MIN,
            min_content_len: DEFAULT_MIN_CONTENT_LEN,
        }
    }
}
