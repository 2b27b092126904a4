//! Agent document loading
//!
//! Reads a single document or walks a directory for them. Everything past
//! this point works on in-memory [`RawDocument`]s.

use crate::agent::types::RawDocument;
use crate::config::DossierConfig;
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No agent documents found in {}", .0.display())]
    NoDocuments(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub max_file_size: u64,
    pub max_files: usize,
    pub max_depth: usize,
    pub extensions: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_file_size: 1_048_576,
            max_files: 100,
            max_depth: 8,
            extensions: vec!["md".to_string()],
        }
    }
}

impl From<&DossierConfig> for LoaderConfig {
    fn from(config: &DossierConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            max_files: config.max_files,
            max_depth: config.max_depth,
            extensions: config.extensions.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    config: LoaderConfig,
}

impl DocumentLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Loads one file, or every matching file under a directory in relative
    /// path order.
    pub fn load(&self, path: &Path) -> Result<Vec<RawDocument>, LoadError> {
        if !path.exists() {
            return Err(LoadError::PathNotFound(path.to_path_buf()));
        }

        let candidates = if path.is_dir() {
            self.collect_candidates(path)
        } else {
            vec![path.to_path_buf()]
        };

        let mut documents = Vec::new();
        for file in &candidates {
            if documents.len() >= self.config.max_files {
                warn!(
                    max_files = self.config.max_files,
                    ignored = candidates.len() - documents.len(),
                    "Reached document limit, ignoring remaining files"
                );
                break;
            }
            if let Some(document) = self.read_document(file)? {
                documents.push(document);
            }
        }

        if documents.is_empty() {
            return Err(LoadError::NoDocuments(path.to_path_buf()));
        }

        info!(
            path = %path.display(),
            documents = documents.len(),
            "Loaded agent documents"
        );
        Ok(documents)
    }

    fn collect_candidates(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for result in WalkBuilder::new(root)
            .max_depth(Some(self.config.max_depth))
            .hidden(true)
            .git_ignore(true)
            .require_git(false)
            .build()
        {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() && self.has_wanted_extension(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort_by(|a, b| {
            let a = a.strip_prefix(root).unwrap_or(a);
            let b = b.strip_prefix(root).unwrap_or(b);
            a.cmp(b)
        });
        debug!(root = %root.display(), candidates = files.len(), "Directory walk completed");
        files
    }

    fn has_wanted_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_lowercase();
                self.config.extensions.iter().any(|wanted| *wanted == e)
            })
            .unwrap_or(false)
    }

    /// Returns `None` for files over the size limit.
    fn read_document(&self, path: &Path) -> Result<Option<RawDocument>, LoadError> {
        let read_error = |source| LoadError::ReadError {
            path: path.to_path_buf(),
            source,
        };

        let size = fs::metadata(path).map_err(read_error)?.len();
        if size > self.config.max_file_size {
            warn!(
                path = %path.display(),
                size,
                max_file_size = self.config.max_file_size,
                "Skipping oversized document"
            );
            return Ok(None);
        }

        let bytes = fs::read(path).map_err(read_error)?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!(path = %path.display(), bytes = bytes.len(), "Read document");
        Ok(Some(RawDocument::new(text, filename)))
    }
}
