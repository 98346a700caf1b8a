use crate::types::{LearningReport, QuizBatch};

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse an `MM:SS` (or `H:MM:SS`) timestamp into seconds.
pub fn parse_timestamp(timestamp: &str) -> Option<u32> {
    let parts = timestamp
        .trim()
        .split(':')
        .map(|part| part.trim().parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [mins, secs] if *secs < 60 => Some(mins * 60 + secs),
        [hours, mins, secs] if *mins < 60 && *secs < 60 => Some(hours * 3600 + mins * 60 + secs),
        _ => None,
    }
}

/// Format a quiz batch as human-readable markdown
pub fn format_quiz_readable(batch: &QuizBatch) -> String {
    let mut output = String::new();

    for (i, segment) in batch.segments.iter().enumerate() {
        // Normalize what the model wrote, keep it verbatim if it doesn't parse.
        let at = parse_timestamp(&segment.timestamp)
            .map(format_timestamp)
            .unwrap_or_else(|| segment.timestamp.clone());

        output.push_str(&format!("### [{}] Question {}\n\n", at, i + 1));
        if !segment.content_covered.is_empty() {
            output.push_str(&format!("_{}_\n\n", segment.content_covered));
        }
        output.push_str(&format!("{}\n\n", segment.question));

        for (j, answer) in segment.answers.iter().enumerate() {
            let marker = if j == segment.correct_index { "✓" } else { " " };
            output.push_str(&format!("{} {}. {}\n", marker, (b'A' + j as u8) as char, answer));
        }
        output.push('\n');

        output.push_str(&format!("**Praise:** {}\n\n", segment.praise));
        output.push_str(&format!("**Explanation:** {}\n\n", segment.explanation));
        output.push_str(&format!(
            "**In depth:** {}\n\n",
            segment.detailed_explanation.english
        ));
        output.push_str(&format!(
            "**Translated:** {}\n\n",
            segment.detailed_explanation.translated
        ));
    }

    output
}

/// Format a learning report as human-readable markdown
pub fn format_report_readable(report: &LearningReport) -> String {
    let mut output = String::new();

    let sections = [
        ("Strengths", &report.strengths),
        ("Areas for improvement", &report.improvements),
        ("Recommendations for parents", &report.recommendations),
    ];

    for (title, points) in sections {
        output.push_str(&format!("## {}\n\n", title));
        for point in points {
            output.push_str(&format!("• {}\n", point));
        }
        output.push('\n');
    }

    output
}
