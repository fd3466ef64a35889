use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display};

use super::MovieId;

/// Identifier of a user in the rating dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One observed rating event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: f32,
    /// Unix seconds
    pub timestamp: i64,
}

impl Rating {
    pub fn new(user_id: u32, movie_id: u32, rating: f32, timestamp: i64) -> Self {
        Self {
            user_id: UserId(user_id),
            movie_id: MovieId(movie_id),
            rating,
            timestamp,
        }
    }

    /// Time of the rating event, if the timestamp is representable
    pub fn rated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Earliest and latest rating times, skipping unrepresentable timestamps
pub fn rating_period(ratings: &[Rating]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut times = ratings.iter().filter_map(Rating::rated_at);
    let first = times.next()?;
    Some(times.fold((first, first), |(min, max), t| (min.min(t), max.max(t))))
}

/// Immutable rating dataset indexed by movie and by user
#[derive(Debug, Default)]
pub struct RatingSet {
    ratings: Vec<Rating>,
    by_movie: HashMap<MovieId, Vec<usize>>,
    by_user: HashMap<UserId, Vec<usize>>,
}

impl RatingSet {
    pub fn new(ratings: Vec<Rating>) -> Self {
        let mut by_movie: HashMap<MovieId, Vec<usize>> = HashMap::new();
        let mut by_user: HashMap<UserId, Vec<usize>> = HashMap::new();

        for (row, rating) in ratings.iter().enumerate() {
            by_movie.entry(rating.movie_id).or_default().push(row);
            by_user.entry(rating.user_id).or_default().push(row);
        }

        Self {
            ratings,
            by_movie,
            by_user,
        }
    }

    /// All ratings given to `movie_id`, in dataset order
    pub fn for_movie(&self, movie_id: MovieId) -> impl Iterator<Item = &Rating> + '_ {
        self.rows(self.by_movie.get(&movie_id))
    }

    /// All ratings given by `user_id`, in dataset order
    pub fn for_user(&self, user_id: UserId) -> impl Iterator<Item = &Rating> + '_ {
        self.rows(self.by_user.get(&user_id))
    }

    fn rows<'a>(&'a self, rows: Option<&'a Vec<usize>>) -> impl Iterator<Item = &'a Rating> + 'a {
        rows.into_iter()
            .flat_map(|rows| rows.iter())
            .map(move |&row| &self.ratings[row])
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    pub fn movie_count(&self) -> usize {
        self.by_movie.len()
    }
}
