//! Raw model text in, typed outcome out.
//!
//! Extract -> parse -> validate -> randomize. Each stage returns a `Result`
//! and the first failure short-circuits the rest; there is no retry here.

use rand::{Rng, thread_rng};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    error::ExtractionError,
    extract::{SEGMENTS_ANCHOR, extract_object},
    randomize::randomize_batch_with_rng,
    types::{ExtractionOutcome, LearningReport, QuizBatch},
    validate::{parse_candidate, validate_quiz_batch, validate_report},
};

pub fn quiz_from_text_with_rng<R: Rng + ?Sized>(
    raw: &str,
    rng: &mut R,
) -> Result<QuizBatch, ExtractionError> {
    let candidate = extract_object(raw, SEGMENTS_ANCHOR)?;
    let value = parse_candidate(candidate)?;
    let batch = validate_quiz_batch(&value)?;
    let batch = randomize_batch_with_rng(batch, rng);

    info!(segments = batch.segments.len(), "quiz batch validated");
    Ok(batch)
}

pub fn quiz_from_text(raw: &str) -> Result<QuizBatch, ExtractionError> {
    quiz_from_text_with_rng(raw, &mut thread_rng())
}

pub fn report_from_text(raw: &str) -> Result<LearningReport, ExtractionError> {
    let candidate = extract_object(raw, SEGMENTS_ANCHOR)?;
    let value = parse_candidate(candidate)?;
    let report = validate_report(&value)?;

    info!("learning report validated");
    Ok(report)
}

/// The outcome keeps only kind and message, so the rejected text of a
/// malformed candidate goes to the debug log.
fn log_failure(what: &str, e: &ExtractionError) {
    if let ExtractionError::MalformedJson { candidate, .. } = e {
        debug!(%candidate, "{what} candidate rejected");
    }
    error!(kind = %e.kind(), "{what} extraction failed: {e}");
}

pub fn process_quiz(raw: &str) -> ExtractionOutcome<QuizBatch> {
    quiz_from_text(raw)
        .inspect_err(|e| log_failure("quiz", e))
        .into()
}

pub fn process_report(raw: &str) -> ExtractionOutcome<LearningReport> {
    report_from_text(raw)
        .inspect_err(|e| log_failure("report", e))
        .into()
}

/// Raw model output for one input item (one video of a request).
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub label: String,
    pub text: String,
}

impl RawResponse {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error analyzing video {label}: {error}")]
pub struct ItemFailure {
    pub label: String,
    pub error: ExtractionError,
}

/// Fan-out capability handed to the multi-item orchestrator.
///
/// Implementations may run `f` concurrently, but the output vector must be
/// in the same order as `items`.
pub trait Dispatch {
    fn map_ordered<T, U, F>(&self, items: Vec<T>, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Sync;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl Dispatch for Sequential {
    fn map_ordered<T, U, F>(&self, items: Vec<T>, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Sync,
    {
        items.into_iter().map(f).collect()
    }
}

/// Splits the items into contiguous chunks, one scoped thread per chunk.
#[derive(Debug, Clone, Copy)]
pub struct ScopedThreads {
    pub max_workers: usize,
}

impl Default for ScopedThreads {
    fn default() -> Self {
        Self { max_workers: 3 }
    }
}

impl Dispatch for ScopedThreads {
    fn map_ordered<T, U, F>(&self, items: Vec<T>, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Sync,
    {
        let workers = self.max_workers.max(1);
        if workers == 1 || items.len() <= 1 {
            return items.into_iter().map(f).collect();
        }

        let chunk_len = items.len().div_ceil(workers);
        let mut chunks: Vec<Vec<T>> = Vec::with_capacity(workers);
        let mut rest = items.into_iter();
        loop {
            let chunk: Vec<T> = rest.by_ref().take(chunk_len).collect();
            if chunk.is_empty() {
                break;
            }
            chunks.push(chunk);
        }

        let f = &f;
        std::thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|chunk| scope.spawn(move || chunk.into_iter().map(f).collect::<Vec<U>>()))
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }
}

/// Run the quiz pipeline over every item of a request.
///
/// Results come back in input order. If any item fails, the whole request
/// fails with the first failing item (in input order); partial results are
/// never returned.
pub fn process_quiz_items<D: Dispatch>(
    items: Vec<RawResponse>,
    dispatch: &D,
) -> Result<Vec<QuizBatch>, ItemFailure> {
    let total = items.len();
    let results = dispatch.map_ordered(items, |item| {
        quiz_from_text(&item.text).map_err(|error| ItemFailure {
            label: item.label,
            error,
        })
    });

    let batches = results
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|failure| {
            if let ExtractionError::MalformedJson { candidate, .. } = &failure.error {
                debug!(label = %failure.label, %candidate, "quiz candidate rejected");
            }
            error!(label = %failure.label, "{failure}");
        })?;

    info!(items = total, "all items processed");
    Ok(batches)
}
