//! Configuration management for dossier
//!
//! Settings are loaded from environment variables with defaults. Command-line
//! flags override whatever the environment provides.
//!
//! # Environment Variables
//!
//! - `DOSSIER_LOG_LEVEL`: Logging level - default: "info"
//! - `DOSSIER_MAX_FILE_SIZE`: Largest document loaded, in bytes - default: "1048576" (1MB)
//! - `DOSSIER_MAX_FILES`: Most documents loaded per run - default: "100"
//! - `DOSSIER_MAX_DEPTH`: Directory walk depth - default: "8"
//! - `DOSSIER_EXTENSIONS`: Comma separated document extensions - default: "md"
//!
//! # Example
//!
//! ```no_run
//! use dossier::DossierConfig;
//!
//! let config = DossierConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576; // 1MB
const DEFAULT_MAX_FILES: usize = 100;
const DEFAULT_MAX_DEPTH: usize = 8;
const DEFAULT_EXTENSIONS: &str = "md";

const MIN_FILE_SIZE: u64 = 1024;
const MAX_FILE_SIZE: u64 = 16 * 1_048_576;
const MAX_FILES: usize = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DossierConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Files larger than this are skipped by the loader
    pub max_file_size: u64,

    /// Documents beyond this count are ignored
    pub max_files: usize,

    pub max_depth: usize,

    /// Lowercase extensions without the leading dot
    pub extensions: Vec<String>,
}

impl Default for DossierConfig {
    /// Loads from `DOSSIER_*` environment variables, falling back to defaults
    /// for anything missing or unparsable.
    fn default() -> Self {
        let log_level = env::var("DOSSIER_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let max_file_size = env::var("DOSSIER_MAX_FILE_SIZE")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE);

        let max_files = env::var("DOSSIER_MAX_FILES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_FILES);

        let max_depth = env::var("DOSSIER_MAX_DEPTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_DEPTH);

        let extensions = parse_extensions(
            &env::var("DOSSIER_EXTENSIONS").unwrap_or_else(|_| DEFAULT_EXTENSIONS.to_string()),
        );

        Self {
            log_level,
            max_file_size,
            max_files,
            max_depth,
            extensions,
        }
    }
}

/// "md, .Markdown,," -> ["md", "markdown"]
pub fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

impl DossierConfig {
    /// Checks that limits are in range, the extension list is not empty and
    /// the log level is known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_size < MIN_FILE_SIZE {
            return Err(ConfigError::ValidationFailed(
                "Max file size must be at least 1KB".to_string(),
            ));
        }
        if self.max_file_size > MAX_FILE_SIZE {
            return Err(ConfigError::ValidationFailed(
                "Max file size cannot exceed 16MB".to_string(),
            ));
        }

        if self.max_files == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max files must be at least 1".to_string(),
            ));
        }
        if self.max_files > MAX_FILES {
            return Err(ConfigError::ValidationFailed(format!(
                "Max files cannot exceed {}",
                MAX_FILES
            )));
        }

        if self.max_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max depth must be at least 1".to_string(),
            ));
        }

        if self.extensions.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one document extension is required".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Applies `--max-file-size`-style overrides given as strings.
    pub fn set_value(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        let parse_error = |e: &dyn fmt::Display| ConfigError::ParseError {
            field: field.to_string(),
            error: e.to_string(),
        };

        match field {
            "log_level" => self.log_level = value.to_lowercase(),
            "max_file_size" => self.max_file_size = value.parse().map_err(|e| parse_error(&e))?,
            "max_files" => self.max_files = value.parse().map_err(|e| parse_error(&e))?,
            "max_depth" => self.max_depth = value.parse().map_err(|e| parse_error(&e))?,
            "extensions" => self.extensions = parse_extensions(value),
            _ => {
                return Err(ConfigError::ParseError {
                    field: field.to_string(),
                    error: "unknown configuration field".to_string(),
                })
            }
        }
        Ok(())
    }

    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();

        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert("max_file_size".to_string(), self.max_file_size.to_string());
        map.insert("max_files".to_string(), self.max_files.to_string());
        map.insert("max_depth".to_string(), self.max_depth.to_string());
        map.insert("extensions".to_string(), self.extensions.join(","));

        map
    }
}

impl fmt::Display for DossierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dossier Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Max File Size: {} bytes", self.max_file_size)?;
        writeln!(f, "  Max Files: {}", self.max_files)?;
        writeln!(f, "  Max Depth: {}", self.max_depth)?;
        writeln!(f, "  Extensions: {}", self.extensions.join(", "))?;
        Ok(())
    }
}
