pub mod alignment;
pub mod config;
pub mod error;
pub mod fluency;
pub mod phonetics;
pub mod pipeline;
pub mod types;

pub use alignment::report::{build_report, AssessmentReport};
pub use config::{AssessmentConfig, FallbackPolicy};
pub use error::AssessmentError;
pub use fluency::FluencyMetrics;
pub use phonetics::{NormalizedPhoneme, ScoringTables};
pub use pipeline::builder::AssessorBuilder;
pub use pipeline::runtime::PronunciationAssessor;
pub use pipeline::traits::{AcousticModel, Phonemizer};
pub use types::{AssessmentResult, FramePredictions, WordAssessment};
