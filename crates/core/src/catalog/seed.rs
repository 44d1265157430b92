//! Bulk import of catalog records from a JSON document.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{CatalogStore, NewMovie, NewShow};

/// Seed document: `{ "movies": [...], "shows": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub movies: Vec<NewMovie>,
    #[serde(default)]
    pub shows: Vec<NewShow>,
}

/// Counts of records written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub movies: usize,
    pub shows: usize,
}

/// Upsert every record of `seed` into the catalog.
pub fn import_seed(store: &dyn CatalogStore, seed: CatalogSeed) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for movie in seed.movies {
        let title = movie.title.clone();
        store
            .upsert_movie(movie)
            .with_context(|| format!("failed to import movie '{title}'"))?;
        summary.movies += 1;
    }

    for show in seed.shows {
        let title = show.title.clone();
        store
            .upsert_show(show)
            .with_context(|| format!("failed to import show '{title}'"))?;
        summary.shows += 1;
    }

    Ok(summary)
}

/// Read a seed document from disk and import it.
pub fn import_seed_file(store: &dyn CatalogStore, path: &Path) -> anyhow::Result<SeedSummary> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog seed {}", path.display()))?;
    let seed: CatalogSeed = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse catalog seed {}", path.display()))?;

    let summary = import_seed(store, seed)?;
    info!(
        path = %path.display(),
        movies = summary.movies,
        shows = summary.shows,
        "Imported catalog seed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteCatalog;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_import_seed_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "movies": [
                    {{
                        "id": "m1",
                        "title": "Heat",
                        "imdbId": "tt0113277",
                        "language": "en",
                        "releaseDate": "1995-12-15",
                        "summary": "A heist."
                    }}
                ],
                "shows": [
                    {{
                        "title": "Dark",
                        "imdbId": "tt5753856",
                        "language": "de",
                        "firstAirDate": "2017-12-01",
                        "lastAirDate": "2020-06-27",
                        "summary": "Time travel."
                    }}
                ]
            }}"#
        )
        .unwrap();

        let catalog = SqliteCatalog::in_memory().unwrap();
        let summary = import_seed_file(&catalog, file.path()).unwrap();
        assert_eq!(summary, SeedSummary { movies: 1, shows: 1 });

        assert_eq!(catalog.get_movie("m1").unwrap().title, "Heat");
        assert_eq!(catalog.count().unwrap().shows, 1);
    }

    #[test]
    fn test_import_seed_is_repeatable() {
        let catalog = SqliteCatalog::in_memory().unwrap();
        let seed = CatalogSeed {
            movies: vec![NewMovie {
                id: Some("m1".to_string()),
                ..crate::testing::fixtures::new_movie("Heat", "tt0113277")
            }],
            shows: Vec::new(),
        };

        import_seed(&catalog, seed.clone()).unwrap();
        import_seed(&catalog, seed).unwrap();
        assert_eq!(catalog.count().unwrap().movies, 1);
    }

    #[test]
    fn test_import_seed_file_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let catalog = SqliteCatalog::in_memory().unwrap();
        let err = import_seed_file(&catalog, file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse catalog seed"));
    }
}
