use rand::{Rng, seq::SliceRandom, thread_rng};
use tracing::debug;

use crate::types::{QuizBatch, QuizSegment};

/// Shuffle the answers of `segment` and point `correct_index` at the new
/// position of the correct one.
///
/// The model always lists the correct answer first, so the answer at index 0
/// is tagged correct whatever `correct_index` held before. The index is
/// recovered from the tag, so answers with identical text never confuse the
/// lookup.
pub fn randomize_answers_with_rng<R: Rng + ?Sized>(
    mut segment: QuizSegment,
    rng: &mut R,
) -> QuizSegment {
    let mut pairs: Vec<(String, bool)> = std::mem::take(&mut segment.answers)
        .into_iter()
        .enumerate()
        .map(|(i, answer)| (answer, i == 0))
        .collect();

    pairs.shuffle(rng);

    for (i, (answer, is_correct)) in pairs.into_iter().enumerate() {
        if is_correct {
            segment.correct_index = i;
        }
        segment.answers[i] = answer;
    }

    debug!(
        answers = ?segment.answers,
        correct_index = segment.correct_index,
        "randomized answers"
    );
    segment
}

pub fn randomize_answers(segment: QuizSegment) -> QuizSegment {
    randomize_answers_with_rng(segment, &mut thread_rng())
}

pub fn randomize_batch_with_rng<R: Rng + ?Sized>(batch: QuizBatch, rng: &mut R) -> QuizBatch {
    QuizBatch {
        segments: batch
            .segments
            .into_iter()
            .map(|segment| randomize_answers_with_rng(segment, rng))
            .collect(),
    }
}
