use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    sync::Arc,
};

use crate::models::{MovieCatalog, MovieId, Rating, RatingSet, Recommendation, UserId};

/// Tuning for the collaborative scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorerParams {
    /// Ratings strictly above this value count as "liked"
    pub high_rating: f32,
    /// Candidates need a fan share strictly above this value
    pub candidate_floor: f64,
    /// Maximum number of recommendations returned
    pub limit: usize,
    /// Drop the anchor movie from its own list
    pub exclude_anchor: bool,
}

impl Default for ScorerParams {
    fn default() -> Self {
        Self {
            high_rating: 4.0,
            candidate_floor: 0.10,
            limit: 10,
            exclude_anchor: false,
        }
    }
}

/// A candidate with the frequencies its score was derived from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    /// Share of the anchor's fans who also liked this movie
    pub fan_freq: f64,
    /// Share of the comparison population who liked this movie
    pub general_freq: f64,
    pub score: f64,
}

/// Lift of `fan_freq` over `general_freq`.
///
/// `None` when the ratio is undefined (zero or non-finite denominator, or a
/// non-finite result). Such candidates are left out of the ranking.
pub fn lift(fan_freq: f64, general_freq: f64) -> Option<f64> {
    if general_freq <= 0.0 || !general_freq.is_finite() {
        return None;
    }
    let score = fan_freq / general_freq;
    score.is_finite().then_some(score)
}

/// Ranks movies by how much more the anchor's fans like them than everyone else.
///
/// Holds shared read-only data only; every call is an independent computation.
#[derive(Debug)]
pub struct CollaborativeScorer {
    catalog: Arc<MovieCatalog>,
    ratings: Arc<RatingSet>,
    params: ScorerParams,
}

impl CollaborativeScorer {
    pub fn new(catalog: Arc<MovieCatalog>, ratings: Arc<RatingSet>, params: ScorerParams) -> Self {
        Self {
            catalog,
            ratings,
            params,
        }
    }

    fn is_high(&self, rating: &Rating) -> bool {
        rating.rating > self.params.high_rating
    }

    /// Distinct users who rated `movie_id` above the high threshold
    pub fn fan_set(&self, movie_id: MovieId) -> BTreeSet<UserId> {
        self.ratings
            .for_movie(movie_id)
            .filter(|r| self.is_high(r))
            .map(|r| r.user_id)
            .collect()
    }

    /// Full ranking for `anchor`, before catalog join and truncation.
    ///
    /// Sorted by score descending, then by movie id ascending.
    pub fn score(&self, anchor: MovieId) -> Vec<ScoredMovie> {
        let fans = self.fan_set(anchor);
        if fans.is_empty() {
            tracing::debug!(movie_id = %anchor, "No fans above threshold");
            return Vec::new();
        }
        let fan_count = fans.len() as f64;

        // Distinct fans per liked movie
        let mut fan_likes: HashMap<MovieId, usize> = HashMap::new();
        for &fan in &fans {
            let liked: HashSet<MovieId> = self
                .ratings
                .for_user(fan)
                .filter(|r| self.is_high(r))
                .map(|r| r.movie_id)
                .collect();
            for movie_id in liked {
                *fan_likes.entry(movie_id).or_insert(0) += 1;
            }
        }

        let pool: BTreeMap<MovieId, f64> = fan_likes
            .into_iter()
            .map(|(movie_id, count)| (movie_id, count as f64 / fan_count))
            .filter(|&(_, fan_freq)| fan_freq > self.params.candidate_floor)
            .collect();

        // Everyone who liked at least one pool movie forms the comparison population
        let mut population: HashSet<UserId> = HashSet::new();
        let mut general_likes: HashMap<MovieId, usize> = HashMap::with_capacity(pool.len());
        for &movie_id in pool.keys() {
            let likers: HashSet<UserId> = self
                .ratings
                .for_movie(movie_id)
                .filter(|r| self.is_high(r))
                .map(|r| r.user_id)
                .collect();
            general_likes.insert(movie_id, likers.len());
            population.extend(likers);
        }
        let population_size = population.len() as f64;

        let mut scored = Vec::with_capacity(pool.len());
        for (movie_id, fan_freq) in pool {
            if self.params.exclude_anchor && movie_id == anchor {
                continue;
            }
            let liked_by = general_likes.get(&movie_id).copied().unwrap_or(0) as f64;
            let general_freq = if population_size > 0.0 {
                liked_by / population_size
            } else {
                0.0
            };
            match lift(fan_freq, general_freq) {
                Some(score) => scored.push(ScoredMovie {
                    movie_id,
                    fan_freq,
                    general_freq,
                    score,
                }),
                None => {
                    tracing::debug!(movie_id = %movie_id, fan_freq, general_freq, "Undefined lift, skipping candidate");
                }
            }
        }

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.movie_id.cmp(&b.movie_id))
        });

        tracing::debug!(
            movie_id = %anchor,
            fans = fans.len(),
            candidates = scored.len(),
            population = population.len(),
            "Scored candidates"
        );

        scored
    }

    /// Top recommendations for `anchor`, joined with catalog title and genres.
    ///
    /// Returns an empty list when the anchor has no fans.
    pub fn recommend(&self, anchor: MovieId) -> Vec<Recommendation> {
        self.score(anchor)
            .into_iter()
            .filter_map(|scored| match self.catalog.get(scored.movie_id) {
                Some(movie) => Some(Recommendation {
                    movie_id: movie.id,
                    title: movie.title.clone(),
                    genres: movie.genres.clone(),
                    score: scored.score,
                }),
                None => {
                    tracing::warn!(movie_id = %scored.movie_id, "Scored movie missing from catalog");
                    None
                }
            })
            .take(self.params.limit)
            .collect()
    }
}
