//! Shape checks for parsed model output.
//!
//! Only the translation fields of `detailed_explanation` are ever defaulted.
//! Anything that shapes the quiz itself (question, answers, timing) fails
//! fast and takes the whole batch down with it.

use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    error::ExtractionError,
    types::{
        DetailedExplanation, ENGLISH_FALLBACK, LearningReport, QuizBatch, QuizSegment,
        TRANSLATION_FALLBACK,
    },
};

pub const SEGMENT_REQUIRED_FIELDS: [&str; 5] =
    ["timestamp", "question", "answers", "praise", "explanation"];

pub const REPORT_FIELDS: [&str; 3] = ["strengths", "improvements", "recommendations"];

type Object = Map<String, Value>;

pub fn parse_candidate(candidate: &str) -> Result<Value, ExtractionError> {
    serde_json::from_str(candidate).map_err(|e| ExtractionError::MalformedJson {
        candidate: candidate.to_string(),
        reason: e.to_string(),
    })
}

pub fn validate_quiz_batch(value: &Value) -> Result<QuizBatch, ExtractionError> {
    let segments = value
        .get("segments")
        .and_then(Value::as_array)
        .filter(|segments| !segments.is_empty())
        .ok_or(ExtractionError::MissingSegments)?;

    let segments = segments
        .iter()
        .map(validate_segment)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuizBatch { segments })
}

/// Validate one segment object. The returned segment still carries the
/// correct answer at index 0.
pub fn validate_segment(value: &Value) -> Result<QuizSegment, ExtractionError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ExtractionError::wrong_type("segments"))?;

    if let Some(field) = SEGMENT_REQUIRED_FIELDS
        .iter()
        .find(|field| !obj.contains_key(**field))
    {
        return Err(ExtractionError::missing(field));
    }

    let detailed_explanation = detailed_explanation(obj)?;
    let answers = answers(obj)?;

    Ok(QuizSegment {
        timestamp: string_field(obj, "timestamp")?,
        content_covered: optional_string_field(obj, "content_covered")?.unwrap_or_default(),
        question: string_field(obj, "question")?,
        answers,
        correct_index: 0,
        praise: string_field(obj, "praise")?,
        explanation: string_field(obj, "explanation")?,
        detailed_explanation,
    })
}

fn string_field(obj: &Object, field: &str) -> Result<String, ExtractionError> {
    optional_string_field(obj, field)?.ok_or_else(|| ExtractionError::missing(field))
}

fn optional_string_field(obj: &Object, field: &str) -> Result<Option<String>, ExtractionError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ExtractionError::wrong_type(field)),
    }
}

fn answers(obj: &Object) -> Result<[String; 4], ExtractionError> {
    let list = obj
        .get("answers")
        .and_then(Value::as_array)
        .ok_or_else(|| ExtractionError::wrong_type("answers"))?;

    if list.len() != 4 {
        return Err(ExtractionError::AnswerCountError { found: list.len() });
    }

    let answers = list
        .iter()
        .map(|answer| {
            answer
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ExtractionError::wrong_type("answers"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    answers
        .try_into()
        .map_err(|_: Vec<String>| ExtractionError::AnswerCountError { found: list.len() })
}

fn detailed_explanation(obj: &Object) -> Result<DetailedExplanation, ExtractionError> {
    let nested = match obj.get("detailed_explanation") {
        None | Some(Value::Null) => {
            warn!("segment has no detailed_explanation, using defaults");
            return Ok(DetailedExplanation::default());
        }
        Some(Value::Object(nested)) => nested,
        Some(_) => return Err(ExtractionError::wrong_type("detailed_explanation")),
    };

    let english = optional_string_field(nested, "english")
        .map_err(|_| ExtractionError::wrong_type("detailed_explanation.english"))?;
    let translated = optional_string_field(nested, "translated")
        .map_err(|_| ExtractionError::wrong_type("detailed_explanation.translated"))?;

    if english.is_none() {
        warn!("detailed_explanation.english missing, using default");
    }
    if translated.is_none() {
        warn!("detailed_explanation.translated missing, using default");
    }

    Ok(DetailedExplanation {
        english: english.unwrap_or_else(|| ENGLISH_FALLBACK.to_string()),
        translated: translated.unwrap_or_else(|| TRANSLATION_FALLBACK.to_string()),
    })
}

pub fn validate_report(value: &Value) -> Result<LearningReport, ExtractionError> {
    Ok(LearningReport {
        strengths: string_list(value, "strengths")?,
        improvements: string_list(value, "improvements")?,
        recommendations: string_list(value, "recommendations")?,
    })
}

fn string_list(value: &Value, field: &str) -> Result<Vec<String>, ExtractionError> {
    let list = value
        .get(field)
        .ok_or_else(|| ExtractionError::missing(field))?
        .as_array()
        .ok_or_else(|| ExtractionError::wrong_type(field))?;

    list.iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ExtractionError::wrong_type(field))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn segment_json() -> Value {
        json!({
            "timestamp": "01:30",
            "content_covered": "Why leaves are green",
            "question": "Hi explorer! What makes leaves green?",
            "answers": ["Chlorophyll", "Carotene", "Melanin", "Hemoglobin"],
            "praise": "Great job!",
            "explanation": "Let's understand this better: chlorophyll...",
            "detailed_explanation": {
                "english": "Chlorophyll absorbs red and blue light...",
                "translated": "La clorofila absorbe..."
            }
        })
    }

    #[test]
    fn parses_complete_segment() {
        let segment = validate_segment(&segment_json()).unwrap();
        assert_eq!(segment.timestamp, "01:30");
        assert_eq!(segment.answers[0], "Chlorophyll");
        assert_eq!(segment.correct_index, 0);
        assert_eq!(segment.detailed_explanation.translated, "La clorofila absorbe...");
    }

    #[test]
    fn missing_translated_gets_default_only() {
        let mut value = segment_json();
        value["detailed_explanation"]
            .as_object_mut()
            .unwrap()
            .remove("translated");

        let segment = validate_segment(&value).unwrap();
        let reference = validate_segment(&segment_json()).unwrap();

        assert_eq!(segment.detailed_explanation.translated, "Translation not available");
        assert_eq!(
            segment.detailed_explanation.english,
            reference.detailed_explanation.english
        );
        assert_eq!(segment.question, reference.question);
        assert_eq!(segment.answers, reference.answers);
        assert_eq!(segment.praise, reference.praise);
        assert_eq!(segment.explanation, reference.explanation);
        assert_eq!(segment.timestamp, reference.timestamp);
        assert_eq!(segment.content_covered, reference.content_covered);
    }

    #[test]
    fn missing_english_gets_default() {
        let mut value = segment_json();
        value["detailed_explanation"]
            .as_object_mut()
            .unwrap()
            .remove("english");

        let segment = validate_segment(&value).unwrap();
        assert_eq!(segment.detailed_explanation.english, "Detailed explanation not available");
        assert_eq!(segment.detailed_explanation.translated, "La clorofila absorbe...");
    }

    #[test]
    fn absent_detailed_explanation_is_synthesized() {
        let mut value = segment_json();
        value.as_object_mut().unwrap().remove("detailed_explanation");

        let segment = validate_segment(&value).unwrap();
        assert_eq!(segment.detailed_explanation, DetailedExplanation::default());
    }

    #[test]
    fn non_object_detailed_explanation_is_rejected() {
        let mut value = segment_json();
        value["detailed_explanation"] = json!("just a string");
        assert_eq!(
            validate_segment(&value),
            Err(ExtractionError::WrongFieldType("detailed_explanation".into()))
        );
    }

    #[test]
    fn each_required_field_is_enforced() {
        for field in SEGMENT_REQUIRED_FIELDS {
            let mut value = segment_json();
            value.as_object_mut().unwrap().remove(field);
            assert_eq!(
                validate_segment(&value),
                Err(ExtractionError::MissingField(field.to_string())),
                "field {field}"
            );
        }
    }

    #[test]
    fn content_covered_is_optional() {
        let mut value = segment_json();
        value.as_object_mut().unwrap().remove("content_covered");
        assert_eq!(validate_segment(&value).unwrap().content_covered, "");
    }

    #[test]
    fn three_answers_is_answer_count_error() {
        let mut value = segment_json();
        value["answers"] = json!(["a", "b", "c"]);
        assert_eq!(
            validate_segment(&value),
            Err(ExtractionError::AnswerCountError { found: 3 })
        );
    }

    #[test]
    fn non_string_answer_is_wrong_type() {
        let mut value = segment_json();
        value["answers"] = json!(["a", 2, "c", "d"]);
        assert_eq!(
            validate_segment(&value),
            Err(ExtractionError::WrongFieldType("answers".into()))
        );
    }

    #[test]
    fn batch_fails_when_any_segment_fails() {
        let mut bad = segment_json();
        bad["answers"] = json!(["a", "b", "c"]);
        let batch = json!({ "segments": [segment_json(), bad, segment_json()] });

        assert_eq!(
            validate_quiz_batch(&batch),
            Err(ExtractionError::AnswerCountError { found: 3 })
        );
    }

    #[test]
    fn empty_or_missing_segments() {
        assert_eq!(
            validate_quiz_batch(&json!({ "segments": [] })),
            Err(ExtractionError::MissingSegments)
        );
        assert_eq!(
            validate_quiz_batch(&json!({ "questions": [segment_json()] })),
            Err(ExtractionError::MissingSegments)
        );
        assert_eq!(
            validate_quiz_batch(&json!({ "segments": "none" })),
            Err(ExtractionError::MissingSegments)
        );
    }

    #[test]
    fn report_scalar_field_is_wrong_type() {
        let value = json!({
            "strengths": "not a list",
            "improvements": ["more counting practice"],
            "recommendations": ["read together"]
        });
        assert_eq!(
            validate_report(&value),
            Err(ExtractionError::WrongFieldType("strengths".into()))
        );
    }

    #[test]
    fn report_map_field_is_wrong_type() {
        let value = json!({
            "strengths": ["shapes"],
            "improvements": { "first": "colors" },
            "recommendations": ["read together"]
        });
        assert_eq!(
            validate_report(&value),
            Err(ExtractionError::WrongFieldType("improvements".into()))
        );
    }

    #[test]
    fn report_missing_field() {
        let value = json!({
            "strengths": ["shapes"],
            "improvements": ["colors"]
        });
        assert_eq!(
            validate_report(&value),
            Err(ExtractionError::MissingField("recommendations".into()))
        );
    }

    #[test]
    fn valid_report() {
        let value = json!({
            "strengths": ["shapes", "counting"],
            "improvements": [],
            "recommendations": ["read together"]
        });
        let report = validate_report(&value).unwrap();
        assert_eq!(report.strengths.len(), 2);
        assert!(report.improvements.is_empty());
    }

    #[test]
    fn malformed_candidate_keeps_text() {
        let err = parse_candidate("{\"segments\": [").unwrap_err();
        match err {
            ExtractionError::MalformedJson { candidate, .. } => {
                assert_eq!(candidate, "{\"segments\": [")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
