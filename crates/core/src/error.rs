use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Everything that can go wrong while turning raw model text into a quiz batch
/// or a learning report. Every variant is terminal for the item being processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("No JSON object found in model response")]
    NoJsonFound,

    #[error("Failed to parse response as JSON: {reason}")]
    MalformedJson { candidate: String, reason: String },

    #[error("Response missing required segments")]
    MissingSegments,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Each segment must have exactly 4 answers, got {found}")]
    AnswerCountError { found: usize },

    #[error("Field {0} has the wrong type")]
    WrongFieldType(String),
}

impl ExtractionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractionError::NoJsonFound => FailureKind::NoJsonFound,
            ExtractionError::MalformedJson { .. } => FailureKind::MalformedJson,
            ExtractionError::MissingSegments => FailureKind::MissingSegments,
            ExtractionError::MissingField(_) => FailureKind::MissingField,
            ExtractionError::AnswerCountError { .. } => FailureKind::AnswerCountError,
            ExtractionError::WrongFieldType(_) => FailureKind::WrongFieldType,
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        ExtractionError::MissingField(field.to_string())
    }

    pub(crate) fn wrong_type(field: &str) -> Self {
        ExtractionError::WrongFieldType(field.to_string())
    }
}

/// Flat tag for an [`ExtractionError`], used where the detail is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NoJsonFound,
    MalformedJson,
    MissingSegments,
    MissingField,
    AnswerCountError,
    WrongFieldType,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::NoJsonFound => "no_json_found",
            FailureKind::MalformedJson => "malformed_json",
            FailureKind::MissingSegments => "missing_segments",
            FailureKind::MissingField => "missing_field",
            FailureKind::AnswerCountError => "answer_count_error",
            FailureKind::WrongFieldType => "wrong_field_type",
        };
        f.write_str(name)
    }
}

/// Cache and history file errors.
#[derive(Error, Debug)]
pub enum QuizcastError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuizcastError>;
