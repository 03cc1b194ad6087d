//! Catalog queries
//!
//! Every query is a linear scan over the sorted catalog. Name comparisons
//! fold both sides to lowercase; results keep catalog order.

use hyper::StatusCode;
use serde::{Deserialize, Serialize};

use super::model::{Author, Work};
use super::Catalog;

/// Language used for plain-text error bodies
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

/// Request-level query failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("no author with this surname")]
    SurnameNotFound,

    #[error("no authors with this name and surname")]
    FullNameNotFound,

    #[error("author not found")]
    AuthorNotFound,

    #[error("missing surname parameter")]
    MissingSurname,

    #[error("no works edited in this year {0}")]
    NoWorksInYear(i64),

    #[error("invalid edition year: {0}")]
    InvalidYear(String),
}

impl QueryError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingSurname | Self::InvalidYear(_) => StatusCode::BAD_REQUEST,
            Self::SurnameNotFound
            | Self::FullNameNotFound
            | Self::AuthorNotFound
            | Self::NoWorksInYear(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Human-readable body in the configured language
    pub fn message(&self, language: Language) -> String {
        match language {
            Language::En => {
                let mut msg = self.to_string();
                if let Some(first) = msg.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                msg
            }
            Language::Es => match self {
                Self::SurnameNotFound => "No hay autor con este apellido".to_string(),
                Self::FullNameNotFound => "No hay autores con este nombre y apellido".to_string(),
                Self::AuthorNotFound => "Autor no encontrado".to_string(),
                Self::MissingSurname => "Falta el parámetro apellido".to_string(),
                Self::NoWorksInYear(year) => format!("No hay obras editadas en este año {year}"),
                Self::InvalidYear(raw) => format!("Año de edición no válido: {raw}"),
            },
        }
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Case-insensitive check that the first `prefix.chars().count()` characters
/// of `name` equal `prefix`
fn has_prefix(name: &str, prefix: &str) -> bool {
    let len = prefix.chars().count();
    let head: String = name.chars().take(len).collect();
    same_name(&head, prefix)
}

fn non_empty<T>(items: Vec<T>, err: QueryError) -> QueryResult<Vec<T>> {
    if items.is_empty() {
        Err(err)
    } else {
        Ok(items)
    }
}

impl Catalog {
    /// Full collection in surname order
    pub fn all(&self) -> &[Author] {
        &self.authors
    }

    pub fn by_surname(&self, surname: &str) -> QueryResult<Vec<&Author>> {
        let found = self
            .authors
            .iter()
            .filter(|a| same_name(&a.last_name, surname))
            .collect();
        non_empty(found, QueryError::SurnameNotFound)
    }

    pub fn by_full_name(&self, first_name: &str, surname: &str) -> QueryResult<Vec<&Author>> {
        let found = self
            .authors
            .iter()
            .filter(|a| same_name(&a.last_name, surname) && same_name(&a.first_name, first_name))
            .collect();
        non_empty(found, QueryError::FullNameNotFound)
    }

    /// First name exact, surname by prefix. An absent or empty prefix is
    /// rejected before any filtering.
    pub fn by_first_name_and_surname_prefix(
        &self,
        first_name: &str,
        surname_prefix: Option<&str>,
    ) -> QueryResult<Vec<&Author>> {
        let prefix = match surname_prefix {
            Some(p) if !p.is_empty() => p,
            _ => return Err(QueryError::MissingSurname),
        };

        let found = self
            .authors
            .iter()
            .filter(|a| same_name(&a.first_name, first_name) && has_prefix(&a.last_name, prefix))
            .collect();
        non_empty(found, QueryError::AuthorNotFound)
    }

    /// Works of every author edited in `year`, flattened in catalog order
    pub fn by_edition_year(&self, year: &str) -> QueryResult<Vec<&Work>> {
        let year: i64 = year
            .trim()
            .parse()
            .map_err(|_| QueryError::InvalidYear(year.to_string()))?;

        let found = self
            .authors
            .iter()
            .flat_map(|a| a.works.iter())
            .filter(|w| w.edition_year == year)
            .collect();
        non_empty(found, QueryError::NoWorksInYear(year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Catalog {
        Catalog::from_authors(vec![
            Author::new(
                "Alexandre",
                "Dumas",
                vec![
                    Work::new(1844).with_field("titulo", "Los tres mosqueteros"),
                    Work::new(2022).with_field("titulo", "El conde de Montecristo"),
                ],
            ),
            Author::new(
                "Miguel",
                "de Unamuno",
                vec![Work::new(2022).with_field("titulo", "Niebla")],
            ),
            Author::new("Alexandre", "Durand", vec![]),
            Author::new("Julio", "Verne", vec![Work::new(1870)]),
        ])
    }

    #[test]
    fn test_all_is_sorted() {
        let catalog = fixture();
        let surnames: Vec<&str> = catalog.all().iter().map(|a| a.last_name.as_str()).collect();
        assert_eq!(surnames, vec!["de Unamuno", "Dumas", "Durand", "Verne"]);
    }

    #[test]
    fn test_by_surname_ignores_case() {
        let catalog = fixture();
        let found = catalog.by_surname("dUMAS").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Alexandre");

        assert_eq!(
            catalog.by_surname("Nosuchname").unwrap_err(),
            QueryError::SurnameNotFound
        );
    }

    #[test]
    fn test_by_full_name() {
        let catalog = fixture();
        let found = catalog.by_full_name("alexandre", "DUMAS").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].last_name, "Dumas");

        assert_eq!(
            catalog.by_full_name("Julio", "Dumas").unwrap_err(),
            QueryError::FullNameNotFound
        );
    }

    #[test]
    fn test_by_surname_prefix() {
        let catalog = fixture();

        let found = catalog
            .by_first_name_and_surname_prefix("Alexandre", Some("Du"))
            .unwrap();
        assert_eq!(found.len(), 2);

        let found = catalog
            .by_first_name_and_surname_prefix("Alexandre", Some("dum"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].last_name, "Dumas");
    }

    #[test]
    fn test_surname_prefix_required() {
        let catalog = fixture();
        assert_eq!(
            catalog
                .by_first_name_and_surname_prefix("Alexandre", None)
                .unwrap_err(),
            QueryError::MissingSurname
        );
        assert_eq!(
            catalog
                .by_first_name_and_surname_prefix("Nobody", Some(""))
                .unwrap_err(),
            QueryError::MissingSurname
        );
    }

    #[test]
    fn test_prefix_longer_than_surname() {
        let catalog = fixture();
        assert_eq!(
            catalog
                .by_first_name_and_surname_prefix("Alexandre", Some("Dumasssssss"))
                .unwrap_err(),
            QueryError::AuthorNotFound
        );
    }

    #[test]
    fn test_prefix_counts_characters_not_bytes() {
        let catalog = Catalog::from_authors(vec![Author::new("Rafael", "Álvarez", vec![])]);
        assert!(catalog
            .by_first_name_and_surname_prefix("Rafael", Some("ál"))
            .is_ok());
        assert!(catalog
            .by_first_name_and_surname_prefix("Rafael", Some("al"))
            .is_err());
    }

    #[test]
    fn test_by_edition_year_flattens_works() {
        let catalog = fixture();
        let works = catalog.by_edition_year("2022").unwrap();
        let titles: Vec<&str> = works
            .iter()
            .map(|w| w.extra["titulo"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Niebla", "El conde de Montecristo"]);
    }

    #[test]
    fn test_by_edition_year_empty_and_invalid() {
        let catalog = fixture();
        assert_eq!(
            catalog.by_edition_year("1900").unwrap_err(),
            QueryError::NoWorksInYear(1900)
        );
        assert_eq!(
            catalog.by_edition_year("mil").unwrap_err(),
            QueryError::InvalidYear("mil".to_string())
        );
    }

    #[test]
    fn test_error_status_and_messages() {
        let err = QueryError::NoWorksInYear(1900);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(Language::Es), "No hay obras editadas en este año 1900");
        assert_eq!(err.message(Language::En), "No works edited in this year 1900");

        let err = QueryError::MissingSurname;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(Language::En), "Missing surname parameter");
        assert_eq!(err.message(Language::Es), "Falta el parámetro apellido");
    }
}
