use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{
    config::Config,
    data::DatasetLoader,
    error::{AppError, AppResult},
    models::{rating_period, Movie, MovieId, Rating},
};

/// Reads the catalog and ratings from delimited files
#[derive(Debug, Clone)]
pub struct FileDatasetLoader {
    movies_path: PathBuf,
    ratings_path: PathBuf,
    ratings_delimiter: u8,
}

/// Catalog row. Extra columns (such as a precomputed `clean_text`) are ignored.
#[derive(Debug, Deserialize)]
struct MovieRow {
    #[serde(rename = "movieId")]
    movie_id: u32,
    title: String,
    #[serde(default)]
    genres: String,
}

/// Rating row, read by position: user, movie, rating, timestamp
#[derive(Debug, Deserialize)]
struct RatingRow(u32, u32, f32, i64);

impl FileDatasetLoader {
    pub fn new(
        movies_path: impl Into<PathBuf>,
        ratings_path: impl Into<PathBuf>,
        ratings_delimiter: u8,
    ) -> Self {
        Self {
            movies_path: movies_path.into(),
            ratings_path: ratings_path.into(),
            ratings_delimiter,
        }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self::new(
            &config.movies_path,
            &config.ratings_path,
            config.ratings_delimiter_byte()?,
        ))
    }
}

async fn read_file(path: &Path) -> AppResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read dataset file");
        AppError::Io(e)
    })
}

/// Parses a catalog CSV with a `movieId,title,genres` header
pub fn parse_movies(bytes: &[u8], source: &str) -> AppResult<Vec<Movie>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(strip_bom(bytes));

    let mut movies = Vec::new();
    for row in reader.deserialize::<MovieRow>() {
        let row = row.map_err(|e| AppError::Dataset(format!("{}: {}", source, e)))?;
        movies.push(Movie::new(MovieId(row.movie_id), row.title, &row.genres));
    }
    Ok(movies)
}

/// Parses `userId, movieId, rating, timestamp` records.
///
/// MovieLens 100K `u.data` has no header; newer comma-separated exports do.
/// Only a first line whose first column names the user is read as a header,
/// so a malformed first row fails the load instead of being skipped.
pub fn parse_ratings(bytes: &[u8], delimiter: u8, source: &str) -> AppResult<Vec<Rating>> {
    let bytes = strip_bom(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(starts_with_header(bytes, delimiter))
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut ratings = Vec::new();
    for row in reader.deserialize::<RatingRow>() {
        let RatingRow(user_id, movie_id, rating, timestamp) =
            row.map_err(|e| AppError::Dataset(format!("{}: {}", source, e)))?;
        ratings.push(Rating::new(user_id, movie_id, rating, timestamp));
    }
    Ok(ratings)
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

fn starts_with_header(bytes: &[u8], delimiter: u8) -> bool {
    let first_column = bytes
        .split(|&b| b == b'\n')
        .map(<[u8]>::trim_ascii)
        .find(|line| !line.is_empty())
        .and_then(|line| line.split(|&b| b == delimiter).next())
        .unwrap_or_default();

    let name = String::from_utf8_lossy(first_column)
        .trim()
        .trim_matches('"')
        .to_lowercase()
        .replace('_', "");
    matches!(name.as_str(), "userid" | "user")
}

#[async_trait::async_trait]
impl DatasetLoader for FileDatasetLoader {
    async fn load_movies(&self) -> AppResult<Vec<Movie>> {
        let bytes = read_file(&self.movies_path).await?;
        let movies = parse_movies(&bytes, &self.movies_path.display().to_string())?;
        tracing::info!(path = %self.movies_path.display(), count = movies.len(), "Loaded movie catalog");
        Ok(movies)
    }

    async fn load_ratings(&self) -> AppResult<Vec<Rating>> {
        let bytes = read_file(&self.ratings_path).await?;
        let ratings = parse_ratings(
            &bytes,
            self.ratings_delimiter,
            &self.ratings_path.display().to_string(),
        )?;
        let (first_rated, last_rated) = rating_period(&ratings).unzip();
        tracing::info!(
            path = %self.ratings_path.display(),
            count = ratings.len(),
            first_rated = ?first_rated,
            last_rated = ?last_rated,
            "Loaded ratings"
        );
        Ok(ratings)
    }

    fn name(&self) -> &'static str {
        "files"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;

    #[test]
    fn test_parse_movies() {
        let csv = "movieId,title,genres\n\
                   1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy\n\
                   11,\"American President, The (1995)\",Comedy|Drama|Romance\n";
        let movies = parse_movies(csv.as_bytes(), "movies.csv").unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].id, MovieId(1));
        assert_eq!(movies[0].genres.len(), 5);
        assert_eq!(movies[1].title, "American President, The (1995)");
        assert_eq!(movies[1].clean_text, "American President  The  1995 ");
    }

    #[test]
    fn test_parse_movies_ignores_extra_columns() {
        let csv = "movieId,title,genres,clean_text\n2,Jumanji (1995),Adventure,stale\n";
        let movies = parse_movies(csv.as_bytes(), "movies.csv").unwrap();
        assert_eq!(movies[0].clean_text, "Jumanji  1995 ");
    }

    #[test]
    fn test_parse_movies_rejects_bad_id() {
        let csv = "movieId,title,genres\nabc,Broken,Drama\n";
        let err = parse_movies(csv.as_bytes(), "movies.csv").unwrap_err();
        assert!(matches!(err, AppError::Dataset(ref msg) if msg.starts_with("movies.csv")));
    }

    #[test]
    fn test_parse_ratings_tab_separated() {
        let data = "196\t242\t3\t881250949\n186\t302\t3\t891717742\n";
        let ratings = parse_ratings(data.as_bytes(), b'\t', "u.data").unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].user_id, UserId(196));
        assert_eq!(ratings[0].movie_id, MovieId(242));
        assert_eq!(ratings[0].rating, 3.0);
        assert_eq!(ratings[1].timestamp, 891717742);
    }

    #[test]
    fn test_parse_ratings_comma_with_header() {
        let data = "userId,movieId,rating,timestamp\n1,1,4.5,964982703\n";
        let ratings = parse_ratings(data.as_bytes(), b',', "ratings.csv").unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating, 4.5);
    }

    #[test]
    fn test_parse_ratings_rejects_short_row() {
        let data = "1\t2\t5\n";
        assert!(parse_ratings(data.as_bytes(), b'\t', "u.data").is_err());
    }

    #[test]
    fn test_parse_ratings_with_byte_order_mark() {
        let data = "\u{feff}196\t242\t5\t881250949\n186\t302\t3\t891717742\n";
        let ratings = parse_ratings(data.as_bytes(), b'\t', "u.data").unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].user_id, UserId(196));
        assert_eq!(ratings[0].rating, 5.0);
    }

    #[test]
    fn test_parse_ratings_byte_order_mark_before_header() {
        let data = "\u{feff}user_id,movie_id,rating,timestamp\n3,7,4.0,964982703\n";
        let ratings = parse_ratings(data.as_bytes(), b',', "ratings.csv").unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].movie_id, MovieId(7));
    }

    #[test]
    fn test_parse_ratings_malformed_first_row_is_an_error() {
        let data = "x196\t242\t5\t881250949\n186\t302\t3\t891717742\n";
        let err = parse_ratings(data.as_bytes(), b'\t', "u.data").unwrap_err();
        assert!(matches!(err, AppError::Dataset(ref msg) if msg.starts_with("u.data")));
    }

    #[test]
    fn test_parse_movies_with_byte_order_mark() {
        let csv = "\u{feff}movieId,title,genres\n1,Toy Story (1995),Animation\n";
        let movies = parse_movies(csv.as_bytes(), "movies.csv").unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, MovieId(1));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("movie-recommender-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let movies_path = dir.join("movies.csv");
        let ratings_path = dir.join("u.data");
        std::fs::write(&movies_path, "movieId,title,genres\n1,Heat (1995),Action|Crime\n").unwrap();
        std::fs::write(&ratings_path, "7\t1\t5\t881250949\n").unwrap();

        let loader = FileDatasetLoader::new(&movies_path, &ratings_path, b'\t');
        let movies = tokio_test::block_on(loader.load_movies()).unwrap();
        let ratings = tokio_test::block_on(loader.load_ratings()).unwrap();
        assert_eq!(movies[0].title, "Heat (1995)");
        assert_eq!(ratings[0].user_id, UserId(7));
        assert_eq!(loader.name(), "files");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let loader = FileDatasetLoader::new("/nonexistent/movies.csv", "/nonexistent/u.data", b'\t');
        let err = tokio_test::block_on(loader.load_movies()).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
