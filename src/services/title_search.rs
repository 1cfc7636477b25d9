use crate::store::SimilarityStore;

/// Catalog titles available for selection
///
/// Returns every title in catalog order, or only those containing `query`
/// (case-insensitive) when a non-blank query is given.
pub fn search_titles(store: &SimilarityStore, query: Option<&str>) -> Vec<String> {
    let needle = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    store
        .entries()
        .iter()
        .filter(|entry| match &needle {
            Some(needle) => entry.title.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .map(|entry| entry.title.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogEntry;

    fn create_test_store() -> SimilarityStore {
        let titles = ["Avatar", "The Dark Knight Rises", "Spectre", "The Avengers"];
        let entries = titles
            .iter()
            .enumerate()
            .map(|(index, title)| CatalogEntry {
                index,
                movie_id: index as u64,
                title: title.to_string(),
            })
            .collect();
        SimilarityStore::new(entries, vec![vec![0.0; 4]; 4]).unwrap()
    }

    #[test]
    fn test_no_query_lists_all_in_order() {
        let store = create_test_store();
        assert_eq!(
            search_titles(&store, None),
            vec!["Avatar", "The Dark Knight Rises", "Spectre", "The Avengers"]
        );
        assert_eq!(search_titles(&store, Some("  ")).len(), 4);
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let store = create_test_store();
        assert_eq!(
            search_titles(&store, Some("av")),
            vec!["Avatar", "The Avengers"]
        );
    }

    #[test]
    fn test_query_without_matches() {
        let store = create_test_store();
        assert!(search_titles(&store, Some("zzz")).is_empty());
    }
}
