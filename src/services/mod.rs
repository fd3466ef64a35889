pub mod collaborative;
pub mod engine;
pub mod presentation;
pub mod text_index;
pub mod vectorizer;

pub use collaborative::{CollaborativeScorer, ScoredMovie, ScorerParams};
pub use engine::{EngineConfig, RecommendationEngine};
pub use text_index::TextIndex;
