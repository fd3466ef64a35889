//! Caller-side presentation policy: minimum-score filtering, strength labels
//! and CSV export. None of this feeds back into scoring.

use serde::Serialize;
use std::fmt::Display;

use crate::{
    error::{AppError, AppResult},
    models::{movie::join_genres, Recommendation},
};

/// File name offered for exported recommendations
pub const EXPORT_FILE_NAME: &str = "recommended_movies.csv";

/// Presentation thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    pub default_min_score: f64,
    pub highly_recommended_threshold: f64,
    pub good_match_threshold: f64,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            default_min_score: 0.4,
            highly_recommended_threshold: 1.2,
            good_match_threshold: 0.6,
        }
    }
}

/// Qualitative label for a recommendation score
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLabel {
    HighlyRecommended,
    GoodMatch,
    DecentChoice,
}

impl Display for StrengthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrengthLabel::HighlyRecommended => write!(f, "Highly Recommended"),
            StrengthLabel::GoodMatch => write!(f, "Good Match"),
            StrengthLabel::DecentChoice => write!(f, "Decent Choice"),
        }
    }
}

/// A recommendation decorated for display
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LabeledRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub label: StrengthLabel,
    /// `min(score / 2, 1)`, for progress-style rendering
    pub strength: f64,
}

pub fn strength_fraction(score: f64) -> f64 {
    (score / 2.0).min(1.0)
}

impl Presentation {
    pub fn label(&self, score: f64) -> StrengthLabel {
        if score > self.highly_recommended_threshold {
            StrengthLabel::HighlyRecommended
        } else if score > self.good_match_threshold {
            StrengthLabel::GoodMatch
        } else {
            StrengthLabel::DecentChoice
        }
    }

    /// Validates a requested minimum score, falling back to the default
    pub fn resolve_min_score(&self, requested: Option<f64>) -> AppResult<f64> {
        let min_score = requested.unwrap_or(self.default_min_score);
        if !min_score.is_finite() || min_score < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "min_score must be a non-negative number, got {}",
                min_score
            )));
        }
        Ok(min_score)
    }

    /// Keeps recommendations scoring at least `min_score` and labels them
    pub fn present(
        &self,
        recommendations: Vec<Recommendation>,
        min_score: f64,
    ) -> Vec<LabeledRecommendation> {
        recommendations
            .into_iter()
            .filter(|rec| rec.score >= min_score)
            .map(|rec| LabeledRecommendation {
                label: self.label(rec.score),
                strength: strength_fraction(rec.score),
                recommendation: rec,
            })
            .collect()
    }
}

#[derive(Serialize)]
struct ExportRow<'a> {
    score: f64,
    title: &'a str,
    genres: String,
}

/// Renders recommendations as CSV with a `score,title,genres` header
pub fn to_csv(recommendations: &[Recommendation]) -> AppResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    if recommendations.is_empty() {
        writer.write_record(["score", "title", "genres"])?;
    }
    for rec in recommendations {
        writer.serialize(ExportRow {
            score: rec.score,
            title: &rec.title,
            genres: join_genres(&rec.genres),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV export error: {}", e)))
}
