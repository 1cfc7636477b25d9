use serde::Deserialize;
use std::{collections::HashSet, path::Path};

use crate::{
    error::{AppError, AppResult},
    models::CatalogEntry,
    store::SimilarityStore,
};

/// One row of the persisted movie list. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    movie_id: u64,
    title: String,
}

/// Loads the movie list and similarity matrix artifacts
///
/// Any failure here is a configuration error: the process should not start
/// serving with a missing or inconsistent catalog.
pub fn load_catalog(catalog_path: &Path, similarity_path: &Path) -> AppResult<SimilarityStore> {
    let records: Vec<CatalogRecord> = read_json(catalog_path)?;
    let matrix: Vec<Vec<f64>> = read_json(similarity_path)?;

    let entries: Vec<CatalogEntry> = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| CatalogEntry {
            index,
            movie_id: record.movie_id,
            title: record.title,
        })
        .collect();

    let duplicates = count_duplicate_titles(&entries);
    if duplicates > 0 {
        tracing::warn!(
            duplicates,
            "Catalog contains duplicate titles; lookups use the first matching row"
        );
    }

    let store = SimilarityStore::new(entries, matrix)?;

    tracing::info!(
        entries = store.len(),
        catalog = %catalog_path.display(),
        similarity = %similarity_path.display(),
        "Loaded movie catalog"
    );

    Ok(store)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Configuration(format!("Failed to read {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&contents).map_err(|e| {
        AppError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
    })
}

fn count_duplicate_titles(entries: &[CatalogEntry]) -> usize {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| !seen.insert(entry.title.as_str()))
        .count()
}
