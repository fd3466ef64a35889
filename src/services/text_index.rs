use std::sync::Arc;

use crate::models::{clean_text, MovieCatalog, SearchHit};

use super::vectorizer::{cosine_similarity, SparseVector, TfidfVectorizer};

/// Title search index.
///
/// The vectorizer is fitted once over every cleaned title when the index is
/// built; queries only ever transform against that fitted vocabulary.
#[derive(Debug)]
pub struct TextIndex {
    catalog: Arc<MovieCatalog>,
    vectorizer: TfidfVectorizer,
    /// One row per catalog movie, in catalog order
    matrix: Vec<SparseVector>,
    limit: usize,
}

impl TextIndex {
    pub fn build(catalog: Arc<MovieCatalog>, max_ngram: usize, limit: usize) -> Self {
        let documents: Vec<&str> = catalog
            .movies()
            .iter()
            .map(|movie| movie.clean_text.as_str())
            .collect();

        let vectorizer = TfidfVectorizer::fit(&documents, max_ngram);
        let matrix = documents
            .iter()
            .map(|doc| vectorizer.transform(doc))
            .collect();

        tracing::info!(
            movies = catalog.len(),
            vocabulary = vectorizer.vocabulary_size(),
            max_ngram,
            "Title index built"
        );

        Self {
            catalog,
            vectorizer,
            matrix,
            limit,
        }
    }

    /// Returns up to `limit` movies whose titles are most similar to `query`.
    ///
    /// Results are ordered by descending similarity, ties in catalog order. A
    /// query with no known terms scores zero everywhere and yields the first
    /// movies of the catalog.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let query_vec = self.vectorizer.transform(&clean_text(query));

        let mut scored: Vec<(usize, f64)> = self
            .matrix
            .iter()
            .enumerate()
            .map(|(pos, row)| (pos, cosine_similarity(&query_vec, row)))
            .collect();

        // Stable sort keeps catalog order among equal similarities.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.limit);

        tracing::debug!(
            query = %query,
            known_terms = query_vec.nnz(),
            top_similarity = scored.first().map(|s| s.1).unwrap_or(0.0),
            "Title search"
        );

        let movies = self.catalog.movies();
        scored
            .into_iter()
            .map(|(pos, similarity)| SearchHit {
                movie: movies[pos].clone(),
                similarity,
            })
            .collect()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Movie, MovieId};

    fn catalog(titles: &[&str]) -> Arc<MovieCatalog> {
        Arc::new(MovieCatalog::new(
            titles
                .iter()
                .enumerate()
                .map(|(i, title)| Movie::new(MovieId(i as u32 + 1), *title, "Drama"))
                .collect(),
        ))
    }

    fn sample_index() -> TextIndex {
        TextIndex::build(
            catalog(&[
                "Toy Story (1995)",
                "Jumanji (1995)",
                "Grumpier Old Men (1995)",
                "Toy Story 2 (1999)",
                "Heat (1995)",
                "Sabrina (1995)",
                "Tom and Huck (1995)",
                "Sudden Death (1995)",
                "GoldenEye (1995)",
                "Toy Soldiers (1991)",
                "Léon: The Professional (a.k.a. The Professional) (1994)",
            ]),
            2,
            8,
        )
    }

    #[test]
    fn test_search_ranks_closest_titles_first() {
        let index = sample_index();
        let hits = index.search("Toy Story");

        assert_eq!(hits.len(), 8);
        assert_eq!(hits[0].movie.id, MovieId(1));
        assert_eq!(hits[1].movie.id, MovieId(4));
        assert_eq!(hits[2].movie.id, MovieId(10));
        assert!(hits[0].similarity > hits[1].similarity);
        assert!(hits[1].similarity > hits[2].similarity);
        for pair in hits.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    #[test]
    fn test_search_cleans_query_like_catalog() {
        let index = sample_index();
        let hits = index.search("léon: the professional");
        assert_eq!(hits[0].movie.id, MovieId(11));
        assert!(hits[0].similarity > 0.5);
    }

    #[test]
    fn test_search_exact_title_is_best_match() {
        let index = sample_index();
        let hits = index.search("Heat (1995)");
        assert_eq!(hits[0].movie.id, MovieId(5));
        assert!(hits[0].similarity <= 1.0 + 1e-12);
    }

    #[test]
    fn test_empty_query_returns_catalog_order_without_error() {
        let index = sample_index();
        for query in ["", "   ", "!!! ???", "zzzz qqqq"] {
            let hits = index.search(query);
            assert_eq!(hits.len(), 8);
            assert!(hits.iter().all(|hit| hit.similarity == 0.0));
            let ids: Vec<u32> = hits.iter().map(|hit| hit.movie.id.0).collect();
            assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        }
    }

    #[test]
    fn test_small_catalog_returns_everything() {
        let index = TextIndex::build(catalog(&["Heat (1995)", "Casino (1995)"]), 2, 8);
        let hits = index.search("heat");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].movie.id, MovieId(1));
        assert_eq!(hits[1].similarity, 0.0);
    }

    #[test]
    fn test_empty_catalog() {
        let index = TextIndex::build(Arc::new(MovieCatalog::default()), 2, 8);
        assert!(index.search("anything").is_empty());
        assert_eq!(index.vocabulary_size(), 0);
    }

    #[test]
    fn test_search_is_deterministic() {
        let index = sample_index();
        let first = index.search("1995");
        for _ in 0..5 {
            assert_eq!(index.search("1995"), first);
        }
    }
}
