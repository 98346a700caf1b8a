//! Quizcast Core Library
//!
//! Turns free-form generative model output into timed video quizzes and
//! learning reports: isolate the JSON payload, validate and repair its shape,
//! shuffle the answers while keeping track of the correct one.

pub mod cache;
pub mod client;
pub mod error;
pub mod extract;
pub mod format;
pub mod history;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod randomize;
pub mod types;
pub mod validate;

// Re-export commonly used items at crate root
pub use client::{ChatClient, ClientError, GenerationConfig, ModelClient, ModelRequest};
pub use error::{ExtractionError, FailureKind, QuizcastError, Result};
pub use extract::{SEGMENTS_ANCHOR, Scan, extract_object, scan_object};
pub use format::{format_quiz_readable, format_report_readable, format_timestamp, parse_timestamp};
pub use history::{HistoryEntry, LearningHistory, QuestionData, load_history};
pub use pipeline::{
    Dispatch, ItemFailure, RawResponse, ScopedThreads, Sequential, process_quiz,
    process_quiz_items, process_report, quiz_from_text, report_from_text,
};
pub use provider::{Provider, ProviderConfig, ProviderError};
pub use randomize::{randomize_answers, randomize_answers_with_rng};
pub use types::{
    DetailedExplanation, ExtractionOutcome, LearningReport, QuizBatch, QuizSegment, VideoAnalysis,
};
