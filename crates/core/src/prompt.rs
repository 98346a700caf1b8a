//! Prompts sent to the model. What matters to the rest of the crate is the
//! output shape each one demands; the validators enforce that shape.

use crate::history::LearningHistory;

pub fn quiz_prompt(language: &str) -> String {
    format!(
        r#"Analyze this educational video for young middle school students and create interactive questions.

1. Content understanding:
  - Watch a complete concept (about 1-2 minutes) and stop at a natural break point after it is explained
  - Ask only about content covered BEFORE the break point, never about upcoming content
  - Questions test understanding, not memory
  - Use the primary language of the video (usually English)
  - Wrong answers must be serious and very plausible, close to the correct one

2. Timing:
  - The first question comes after 1-2 minutes of content
  - The timestamp is where the video STOPS, after the concept is fully explained
  - Each new question covers the content since the previous one

3. Question format:
  - Simple and clear, suitable for children up to 12 years old
  - Exactly four answers: the FIRST one is correct, the other three are plausible distractors
  - An encouraging message for correct answers and a child-friendly explanation for wrong ones

4. Detailed explanations:
  - For each question give a thorough step-by-step explanation in English and in {language}
  - If a {language} translation is not possible, write "Translation not available"

5. Number of questions:
  - At least 2 if the video is longer than 240 seconds
  - At least 3 if longer than 500 seconds
  - At least 4 if longer than 900 seconds
  - At least 5 if longer than 1500 seconds
  - At most 10 per video

Output ONLY this JSON, it is rendered directly in the app:
{{
  "segments": [
    {{
      "timestamp": "MM:SS",
      "content_covered": "Brief summary of what was explained",
      "question": "Greet the kid, then ask about the content just covered",
      "answers": ["correct", "incorrect1", "incorrect2", "incorrect3"],
      "praise": "Great job! [why this answer is correct]",
      "explanation": "Let's understand this better: [brief explanation]",
      "detailed_explanation": {{
        "english": "Thorough step-by-step explanation in English",
        "translated": "Same explanation in {language}"
      }}
    }}
  ]
}}"#,
        language = language
    )
}

pub fn report_prompt(user_name: &str, history: &LearningHistory) -> serde_json::Result<String> {
    let history_json = serde_json::to_string(history)?;
    let score = history.score() * 100.0;

    Ok(format!(
        r#"Analyze this learning history for {user_name}, a young child, and write a parent-friendly report.

1. Strengths (3-4 points): concepts {user_name} clearly understood, patterns of correct answers, quick learning.
2. Areas for improvement (2-3 points): concepts that need more practice, patterns in wrong answers. Stay positive and constructive.
3. Recommendations for parents (3-4 points): specific structured and play-based activities, tips that fit {user_name}'s learning style.

Overall score so far: {score:.0}% correct.

Output ONLY this JSON:
{{
  "strengths": ["point1", "point2", "point3"],
  "improvements": ["point1", "point2"],
  "recommendations": ["rec1", "rec2", "rec3"]
}}

Learning history: {history_json}"#
    ))
}
