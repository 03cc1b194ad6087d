//! Author catalog
//!
//! In-memory, read-only dataset of authors and their works, sorted by
//! surname under Spanish collation at load time.

pub mod collation;
mod loader;
mod model;
mod query;

pub use loader::LoadError;
pub use model::{Author, Work};
pub use query::{Language, QueryError, QueryResult};

/// Immutable, sorted author collection
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    authors: Vec<Author>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// Total number of works across all authors
    pub fn work_count(&self) -> usize {
        self.authors.iter().map(|a| a.works.len()).sum()
    }
}
