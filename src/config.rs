use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    services::{presentation::Presentation, EngineConfig, ScorerParams},
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Movie catalog CSV (`movieId,title,genres`)
    #[serde(default = "default_movies_path")]
    pub movies_path: String,

    /// Rating dataset (`userId, movieId, rating, timestamp`)
    #[serde(default = "default_ratings_path")]
    pub ratings_path: String,

    /// Rating file delimiter: `tab` or `comma`
    #[serde(default = "default_ratings_delimiter")]
    pub ratings_delimiter: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of titles returned by a search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Longest n-gram used by the title vectorizer
    #[serde(default = "default_max_ngram")]
    pub max_ngram: usize,

    /// Ratings strictly above this value count as "liked"
    #[serde(default = "default_high_rating")]
    pub high_rating: f32,

    /// Minimum share of fans a candidate needs to be scored
    #[serde(default = "default_candidate_floor")]
    pub candidate_floor: f64,

    /// Number of recommendations returned per anchor
    #[serde(default = "default_recommend_limit")]
    pub recommend_limit: usize,

    /// Drop the anchor movie from its own recommendations
    #[serde(default)]
    pub exclude_anchor: bool,

    /// Minimum score applied when a request does not specify one
    #[serde(default = "default_min_score")]
    pub default_min_score: f64,

    #[serde(default = "default_highly_recommended_threshold")]
    pub highly_recommended_threshold: f64,

    #[serde(default = "default_good_match_threshold")]
    pub good_match_threshold: f64,
}

fn default_movies_path() -> String {
    "data/movies.csv".to_string()
}

fn default_ratings_path() -> String {
    "data/u.data".to_string()
}

fn default_ratings_delimiter() -> String {
    "tab".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_search_limit() -> usize {
    8
}

fn default_max_ngram() -> usize {
    2
}

fn default_high_rating() -> f32 {
    4.0
}

fn default_candidate_floor() -> f64 {
    0.10
}

fn default_recommend_limit() -> usize {
    10
}

fn default_min_score() -> f64 {
    0.4
}

fn default_highly_recommended_threshold() -> f64 {
    1.2
}

fn default_good_match_threshold() -> f64 {
    0.6
}

impl Default for Config {
    fn default() -> Self {
        Self {
            movies_path: default_movies_path(),
            ratings_path: default_ratings_path(),
            ratings_delimiter: default_ratings_delimiter(),
            host: default_host(),
            port: default_port(),
            search_limit: default_search_limit(),
            max_ngram: default_max_ngram(),
            high_rating: default_high_rating(),
            candidate_floor: default_candidate_floor(),
            recommend_limit: default_recommend_limit(),
            exclude_anchor: false,
            default_min_score: default_min_score(),
            highly_recommended_threshold: default_highly_recommended_threshold(),
            good_match_threshold: default_good_match_threshold(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Byte delimiter for the rating file
    pub fn ratings_delimiter_byte(&self) -> AppResult<u8> {
        match self.ratings_delimiter.to_lowercase().as_str() {
            "tab" | "\t" => Ok(b'\t'),
            "comma" | "," => Ok(b','),
            other => Err(AppError::InvalidInput(format!(
                "Unsupported ratings delimiter '{}', expected 'tab' or 'comma'",
                other
            ))),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            search_limit: self.search_limit,
            max_ngram: self.max_ngram,
            scorer: ScorerParams {
                high_rating: self.high_rating,
                candidate_floor: self.candidate_floor,
                limit: self.recommend_limit,
                exclude_anchor: self.exclude_anchor,
            },
        }
    }

    pub fn presentation(&self) -> Presentation {
        Presentation {
            default_min_score: self.default_min_score,
            highly_recommended_threshold: self.highly_recommended_threshold,
            good_match_threshold: self.good_match_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        let engine = config.engine_config();
        assert_eq!(engine.search_limit, 8);
        assert_eq!(engine.max_ngram, 2);
        assert_eq!(engine.scorer.high_rating, 4.0);
        assert_eq!(engine.scorer.candidate_floor, 0.10);
        assert_eq!(engine.scorer.limit, 10);
        assert!(!engine.scorer.exclude_anchor);

        let presentation = config.presentation();
        assert_eq!(presentation.default_min_score, 0.4);
        assert_eq!(presentation.highly_recommended_threshold, 1.2);
        assert_eq!(presentation.good_match_threshold, 0.6);
    }

    #[test]
    fn test_ratings_delimiter() {
        let mut config = Config::default();
        assert_eq!(config.ratings_delimiter_byte().unwrap(), b'\t');

        config.ratings_delimiter = "Comma".to_string();
        assert_eq!(config.ratings_delimiter_byte().unwrap(), b',');

        config.ratings_delimiter = "pipe".to_string();
        assert!(matches!(
            config.ratings_delimiter_byte(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_iter_applies_overrides() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            ("HIGH_RATING".to_string(), "3.5".to_string()),
            ("EXCLUDE_ANCHOR".to_string(), "true".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.high_rating, 3.5);
        assert!(config.exclude_anchor);
        assert_eq!(config.movies_path, "data/movies.csv");
    }
}
