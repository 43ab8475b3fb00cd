//! Quiz attempt state machine and scoring.
//!
//! `Browsing → InProgress → Results → Browsing`. The machine is synchronous;
//! the one-second countdown that drives [`QuizMachine::tick`] lives in
//! [`crate::assessment::QuizSession`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Quiz;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("no quiz is in progress")]
    NotInProgress,

    #[error("option {option} does not exist (question has {available} options)")]
    OptionOutOfRange { option: usize, available: usize },
}

/// Coarse lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Browsing,
    InProgress,
    Results,
}

/// Why an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// Advanced past the last question.
    Completed,
    /// Explicit submit.
    Submitted,
    /// The countdown reached zero.
    TimedOut,
}

/// Result of a state-changing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Cursor moved to the given question index.
    NextQuestion(usize),
    Finished(FinishReason),
}

/// One pass through a quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    quiz: Quiz,
    cursor: usize,
    answers: BTreeMap<usize, usize>,
    remaining_secs: u64,
    finish: Option<FinishReason>,
}

impl Attempt {
    fn new(quiz: Quiz) -> Self {
        let remaining_secs = quiz.time_limit_secs();
        Self {
            quiz,
            cursor: 0,
            answers: BTreeMap::new(),
            remaining_secs,
            finish: None,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// Index of the question on screen.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Selected option for `question`, if answered.
    pub fn answer_for(&self, question: usize) -> Option<usize> {
        self.answers.get(&question).copied()
    }

    pub fn current_answer(&self) -> Option<usize> {
        self.answer_for(self.cursor)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn is_last_question(&self) -> bool {
        self.cursor + 1 >= self.quiz.questions.len()
    }

    /// Fraction of the quiz reached, counting the current question.
    pub fn progress(&self) -> f64 {
        let total = self.quiz.questions.len();
        if total == 0 {
            return 1.0;
        }
        (self.cursor + 1) as f64 / total as f64
    }

    pub fn results(&self) -> QuizResults {
        let outcomes: Vec<QuestionOutcome> = self
            .quiz
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                let selected = self.answer_for(index);
                QuestionOutcome {
                    index,
                    selected,
                    correct_answer: q.correct_answer,
                    is_correct: selected == Some(q.correct_answer),
                    explanation: q.explanation.clone(),
                }
            })
            .collect();
        let correct = outcomes.iter().filter(|o| o.is_correct).count();
        let score = percentage(correct, outcomes.len());
        QuizResults {
            score,
            passed: score >= self.quiz.passing_score,
            passing_score: self.quiz.passing_score,
            correct,
            total: outcomes.len(),
            outcomes,
            finish: self.finish,
            remaining_secs: self.remaining_secs,
        }
    }
}

/// Per-question verdict shown on the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub index: usize,
    pub selected: Option<usize>,
    pub correct_answer: usize,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResults {
    /// Rounded percentage in `0..=100`.
    pub score: u32,
    pub passed: bool,
    pub passing_score: u32,
    pub correct: usize,
    pub total: usize,
    pub outcomes: Vec<QuestionOutcome>,
    pub finish: Option<FinishReason>,
    pub remaining_secs: u64,
}

/// `round(100 * correct / total)`, with an empty quiz scoring 0.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u64;
    let total = total as u64;
    ((200 * correct + total) / (2 * total)) as u32
}

/// Score `answers` against `quiz`. Unanswered questions never match.
pub fn score(quiz: &Quiz, answers: &BTreeMap<usize, usize>) -> u32 {
    let correct = quiz
        .questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(i) == Some(&q.correct_answer))
        .count();
    percentage(correct, quiz.questions.len())
}

/// Render seconds as `m:ss`.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[derive(Debug, Clone, PartialEq, Default)]
enum State {
    #[default]
    Browsing,
    InProgress(Attempt),
    Results(Attempt),
}

/// Holds at most one attempt; starting another discards the previous one.
#[derive(Debug, Clone, Default)]
pub struct QuizMachine {
    state: State,
}

impl QuizMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Browsing => Phase::Browsing,
            State::InProgress(_) => Phase::InProgress,
            State::Results(_) => Phase::Results,
        }
    }

    /// The active or finished attempt.
    pub fn attempt(&self) -> Option<&Attempt> {
        match &self.state {
            State::Browsing => None,
            State::InProgress(a) | State::Results(a) => Some(a),
        }
    }

    /// Results of the finished attempt.
    pub fn results(&self) -> Option<QuizResults> {
        match &self.state {
            State::Results(a) => Some(a.results()),
            _ => None,
        }
    }

    /// Begin a fresh attempt at `quiz`, whatever the current state.
    ///
    /// A quiz with a zero time limit is over before it starts.
    pub fn start(&mut self, quiz: Quiz) {
        let attempt = Attempt::new(quiz);
        if attempt.remaining_secs == 0 {
            self.state = State::Results(Attempt {
                finish: Some(FinishReason::TimedOut),
                ..attempt
            });
        } else {
            self.state = State::InProgress(attempt);
        }
    }

    /// Record `option` for the current question, replacing any earlier
    /// choice. Does not move the cursor.
    pub fn answer(&mut self, option: usize) -> Result<(), QuizError> {
        let attempt = self.in_progress_mut()?;
        let available = attempt
            .quiz
            .questions
            .get(attempt.cursor)
            .map_or(0, |q| q.options.len());
        if option >= available {
            return Err(QuizError::OptionOutOfRange { option, available });
        }
        attempt.answers.insert(attempt.cursor, option);
        Ok(())
    }

    /// Move to the next question, or finish on the last one.
    ///
    /// Advancing from an unanswered question is accepted here; front ends
    /// that want to require an answer check [`Attempt::current_answer`]
    /// first.
    pub fn advance(&mut self) -> Result<Transition, QuizError> {
        let attempt = self.in_progress_mut()?;
        if attempt.is_last_question() {
            self.finish(FinishReason::Completed);
            return Ok(Transition::Finished(FinishReason::Completed));
        }
        attempt.cursor += 1;
        Ok(Transition::NextQuestion(attempt.cursor))
    }

    /// End the attempt now.
    pub fn submit(&mut self) -> Result<Transition, QuizError> {
        self.in_progress_mut()?;
        self.finish(FinishReason::Submitted);
        Ok(Transition::Finished(FinishReason::Submitted))
    }

    /// Apply one elapsed second. Only meaningful while in progress; reaching
    /// zero finishes the attempt exactly once.
    pub fn tick(&mut self) -> Option<Transition> {
        let State::InProgress(attempt) = &mut self.state else {
            return None;
        };
        attempt.remaining_secs = attempt.remaining_secs.saturating_sub(1);
        if attempt.remaining_secs == 0 {
            self.finish(FinishReason::TimedOut);
            return Some(Transition::Finished(FinishReason::TimedOut));
        }
        None
    }

    /// Abandon or close the attempt and return to browsing.
    pub fn reset(&mut self) {
        self.state = State::Browsing;
    }

    fn in_progress_mut(&mut self) -> Result<&mut Attempt, QuizError> {
        match &mut self.state {
            State::InProgress(a) => Ok(a),
            _ => Err(QuizError::NotInProgress),
        }
    }

    fn finish(&mut self, reason: FinishReason) {
        if let State::InProgress(mut attempt) = std::mem::take(&mut self.state) {
            attempt.finish = Some(reason);
            self.state = State::Results(attempt);
        }
    }
}
