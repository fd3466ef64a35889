use serde::Serialize;

pub mod movie;
pub mod rating;

pub use movie::{clean_text, Movie, MovieCatalog, MovieId};
pub use rating::{rating_period, Rating, RatingSet, UserId};

/// A title search result
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub movie: Movie,
    /// Cosine similarity between the query and the title, in `[0, 1]`
    pub similarity: f64,
}

/// A collaborative recommendation joined with catalog data
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    /// Lift of the movie among the anchor's fans over the general population.
    /// Positive, not bounded above.
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_id_display() {
        assert_eq!(format!("{}", MovieId(1)), "1");
    }

    #[test]
    fn test_movie_id_serde_is_transparent() {
        let json = serde_json::to_string(&MovieId(318)).unwrap();
        assert_eq!(json, "318");

        let id: MovieId = serde_json::from_str("318").unwrap();
        assert_eq!(id, MovieId(318));
    }

    #[test]
    fn test_recommendation_serialization() {
        let rec = Recommendation {
            movie_id: MovieId(2),
            title: "Jumanji (1995)".to_string(),
            genres: vec!["Adventure".to_string()],
            score: 2.5,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["movie_id"], 2);
        assert_eq!(json["score"], 2.5);
        assert_eq!(json["genres"][0], "Adventure");
    }
}
