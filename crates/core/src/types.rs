use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, FailureKind};

pub const ENGLISH_FALLBACK: &str = "Detailed explanation not available";
pub const TRANSLATION_FALLBACK: &str = "Translation not available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedExplanation {
    pub english: String,
    pub translated: String,
}

impl Default for DetailedExplanation {
    fn default() -> Self {
        Self {
            english: ENGLISH_FALLBACK.to_string(),
            translated: TRANSLATION_FALLBACK.to_string(),
        }
    }
}

/// One timed question. Before randomization `answers[0]` is the correct
/// choice; afterwards `answers[correct_index]` is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSegment {
    pub timestamp: String,
    #[serde(default)]
    pub content_covered: String,
    pub question: String,
    pub answers: [String; 4],
    #[serde(default)]
    pub correct_index: usize,
    pub praise: String,
    pub explanation: String,
    #[serde(default)]
    pub detailed_explanation: DetailedExplanation,
}

impl QuizSegment {
    /// `None` when `correct_index` is outside the four answer slots.
    pub fn correct_answer(&self) -> Option<&str> {
        self.answers.get(self.correct_index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizBatch {
    pub segments: Vec<QuizSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningReport {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Quiz batches for every video of one request, in request order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub results: Vec<QuizBatch>,
    pub language: String,
}

/// What the pipeline hands back to its caller: either the finished value or
/// a tagged failure. Nothing partial crosses this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome<T> {
    Success(T),
    Failure { kind: FailureKind, message: String },
}

impl<T> ExtractionOutcome<T> {
    pub fn success(self) -> Option<T> {
        match self {
            ExtractionOutcome::Success(value) => Some(value),
            ExtractionOutcome::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ExtractionOutcome::Success(_) => None,
            ExtractionOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl<T> From<Result<T, ExtractionError>> for ExtractionOutcome<T> {
    fn from(result: Result<T, ExtractionError>) -> Self {
        match result {
            Ok(value) => ExtractionOutcome::Success(value),
            Err(e) => ExtractionOutcome::Failure {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }
}
