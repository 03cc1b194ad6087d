//! Dataset loading
//!
//! The dataset is a JSON array of authors. It is read once at startup,
//! sorted by surname and handed over as an immutable [`Catalog`].

use std::path::{Path, PathBuf};

use super::collation;
use super::model::Author;
use super::Catalog;

/// Startup failure while building the catalog
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read dataset '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Catalog {
    /// Read and sort the dataset file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse and sort an in-memory dataset
    pub fn from_json_str(raw: &str) -> Result<Self, LoadError> {
        let authors: Vec<Author> = serde_json::from_str(raw)?;
        Ok(Self::from_authors(authors))
    }

    /// Build a catalog from already parsed records
    ///
    /// Sorting is stable: authors whose surnames collate equal keep their
    /// relative order from the source.
    pub fn from_authors(mut authors: Vec<Author>) -> Self {
        authors.sort_by_key(|author| collation::sort_key(&author.last_name));
        Self { authors }
    }
}
