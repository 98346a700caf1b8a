use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionData {
    pub question: String,
    pub correct_answer: String,
    pub user_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// One answered question, as recorded while the learner watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub answer: usize,
    pub is_correct: bool,
    pub question_data: QuestionData,
    #[serde(default)]
    pub video_index: usize,
    #[serde(default)]
    pub segment_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearningHistory(pub Vec<HistoryEntry>);

impl LearningHistory {
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn correct_count(&self) -> usize {
        self.0.iter().filter(|entry| entry.is_correct).count()
    }

    /// Fraction of correct answers, `0.0` for an empty history.
    pub fn score(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.correct_count() as f64 / self.0.len() as f64
    }
}

/// Load a learning history from a JSON file
pub async fn load_history(path: &Path) -> Result<LearningHistory> {
    let json_content = fs::read_to_string(path).await?;
    let history: LearningHistory = serde_json::from_str(&json_content)?;
    Ok(history)
}
