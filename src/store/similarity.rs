use std::cmp::Ordering;

use crate::{
    error::{AppError, AppResult},
    models::CatalogEntry,
};

/// Fixed catalog plus its square similarity matrix
///
/// Row `i` of the matrix belongs to `entries[i]`. Titles are matched exactly;
/// when a title appears more than once, the first row wins.
#[derive(Debug, Clone)]
pub struct SimilarityStore {
    entries: Vec<CatalogEntry>,
    matrix: Vec<Vec<f64>>,
}

impl SimilarityStore {
    /// Builds a store, checking that the matrix is square and matches the catalog
    pub fn new(entries: Vec<CatalogEntry>, matrix: Vec<Vec<f64>>) -> AppResult<Self> {
        if entries.is_empty() {
            return Err(AppError::Configuration("Catalog is empty".to_string()));
        }

        if matrix.len() != entries.len() {
            return Err(AppError::Configuration(format!(
                "Similarity matrix has {} rows but catalog has {} entries",
                matrix.len(),
                entries.len()
            )));
        }

        if let Some((row, values)) = matrix
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != entries.len())
        {
            return Err(AppError::Configuration(format!(
                "Similarity matrix row {} has {} columns, expected {}",
                row,
                values.len(),
                entries.len()
            )));
        }

        if let Some((position, entry)) = entries
            .iter()
            .enumerate()
            .find(|(position, entry)| entry.index != *position)
        {
            return Err(AppError::Configuration(format!(
                "Catalog entry '{}' has index {} at row {}",
                entry.title, entry.index, position
            )));
        }

        Ok(Self { entries, matrix })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    /// Index of the first entry whose title equals `title` exactly
    pub fn position(&self, title: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.title == title)
    }

    /// The `k` entries most similar to `title`, best first
    ///
    /// Ranks by score descending, breaking ties by higher index first. The
    /// queried entry itself is never returned.
    pub fn neighbors(&self, title: &str, k: usize) -> AppResult<Vec<&CatalogEntry>> {
        let query = self
            .position(title)
            .ok_or_else(|| AppError::NotFound(format!("Title '{}' is not in the catalog", title)))?;

        let mut ranked: Vec<(usize, f64)> = self.matrix[query]
            .iter()
            .copied()
            .enumerate()
            .filter(|(index, _)| *index != query)
            .collect();

        ranked.sort_by(|a, b| rank_descending(*a, *b));

        Ok(ranked
            .into_iter()
            .take(k)
            .map(|(index, _)| &self.entries[index])
            .collect())
    }
}

fn rank_descending(a: (usize, f64), b: (usize, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| b.0.cmp(&a.0))
}
