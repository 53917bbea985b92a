//! Presentation order for a question's answer choices.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::Question;

/// Returns the correct answer and all incorrect answers in a uniformly random order.
///
/// Uses an in-place Fisher–Yates shuffle; the caller supplies the RNG so sessions
/// and tests can control the sequence.
pub fn present_answers<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Vec<String> {
    let mut answers = Vec::with_capacity(question.choice_count());
    answers.push(question.correct_answer().to_string());
    answers.extend(question.incorrect_answers().iter().cloned());
    answers.shuffle(rng);
    answers
}
