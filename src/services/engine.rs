use std::{collections::BTreeSet, sync::Arc, time::Instant};

use crate::{
    data::DatasetLoader,
    error::AppResult,
    models::{Movie, MovieCatalog, MovieId, Rating, RatingSet, Recommendation, SearchHit, UserId},
};

use super::{
    collaborative::{CollaborativeScorer, ScorerParams},
    text_index::TextIndex,
};

/// Engine construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub search_limit: usize,
    pub max_ngram: usize,
    pub scorer: ScorerParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_limit: 8,
            max_ngram: 2,
            scorer: ScorerParams::default(),
        }
    }
}

/// Title search and collaborative recommendations over one immutable dataset.
///
/// Built once at startup; both components read the same catalog.
#[derive(Debug)]
pub struct RecommendationEngine {
    catalog: Arc<MovieCatalog>,
    index: TextIndex,
    scorer: CollaborativeScorer,
}

impl RecommendationEngine {
    pub fn build(movies: Vec<Movie>, ratings: Vec<Rating>, config: &EngineConfig) -> Self {
        let started = Instant::now();

        let catalog = Arc::new(MovieCatalog::new(movies));
        let ratings = Arc::new(RatingSet::new(ratings));
        let index = TextIndex::build(catalog.clone(), config.max_ngram, config.search_limit);
        let scorer = CollaborativeScorer::new(catalog.clone(), ratings.clone(), config.scorer);

        tracing::info!(
            movies = catalog.len(),
            ratings = ratings.len(),
            users = ratings.user_count(),
            rated_movies = ratings.movie_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendation engine ready"
        );

        Self {
            catalog,
            index,
            scorer,
        }
    }

    /// Loads both datasets through `loader` and builds the engine
    pub async fn load(loader: &dyn DatasetLoader, config: &EngineConfig) -> AppResult<Self> {
        tracing::info!(loader = loader.name(), "Loading datasets");
        let (movies, ratings) = tokio::try_join!(loader.load_movies(), loader.load_ratings())?;
        Ok(Self::build(movies, ratings, config))
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        self.index.search(query)
    }

    pub fn recommend(&self, movie_id: MovieId) -> Vec<Recommendation> {
        self.scorer.recommend(movie_id)
    }

    pub fn fan_set(&self, movie_id: MovieId) -> BTreeSet<UserId> {
        self.scorer.fan_set(movie_id)
    }

    pub fn movie(&self, movie_id: MovieId) -> Option<&Movie> {
        self.catalog.get(movie_id)
    }

    pub fn catalog(&self) -> &MovieCatalog {
        &self.catalog
    }
}
