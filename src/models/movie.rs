use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display};

/// Separator used between genres in the source catalog
pub const GENRE_SEPARATOR: &str = "|";

/// Identifier of a movie in the catalog and the rating dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u32);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Replaces every character outside `[A-Za-z0-9]` with a single space.
///
/// Each replaced character maps to exactly one space, so word boundaries are
/// preserved and the function is idempotent.
pub fn clean_text(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect()
}

/// A movie from the catalog
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    #[serde(skip)]
    pub clean_text: String,
}

impl Movie {
    /// Builds a movie from a raw catalog row, deriving `clean_text` from the title
    pub fn new(id: MovieId, title: impl Into<String>, genres: &str) -> Self {
        let title = title.into();
        let clean_text = clean_text(&title);
        Self {
            id,
            title,
            genres: split_genres(genres),
            clean_text,
        }
    }
}

pub fn split_genres(genres: &str) -> Vec<String> {
    genres
        .split(GENRE_SEPARATOR)
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_genres(genres: &[String]) -> String {
    genres.join(GENRE_SEPARATOR)
}

/// Immutable, ordered movie catalog with id lookup.
///
/// Catalog order is load order; it is what search ties fall back to.
#[derive(Debug, Default)]
pub struct MovieCatalog {
    movies: Vec<Movie>,
    positions: HashMap<MovieId, usize>,
}

impl MovieCatalog {
    /// Builds the catalog. Duplicate ids keep their first occurrence.
    pub fn new(movies: Vec<Movie>) -> Self {
        let mut kept = Vec::with_capacity(movies.len());
        let mut positions = HashMap::with_capacity(movies.len());

        for movie in movies {
            if positions.contains_key(&movie.id) {
                tracing::warn!(movie_id = %movie.id, title = %movie.title, "Duplicate movie id in catalog, keeping first");
                continue;
            }
            positions.insert(movie.id, kept.len());
            kept.push(movie);
        }

        Self {
            movies: kept,
            positions,
        }
    }

    pub fn get(&self, id: MovieId) -> Option<&Movie> {
        self.positions.get(&id).map(|&pos| &self.movies[pos])
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
