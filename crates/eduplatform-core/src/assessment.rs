//! Assessment screen controllers: the quiz catalog and the timed quiz
//! session.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiError;
use crate::model::{Quiz, QuizRequest};
use crate::quiz::{Attempt, Phase, QuizError, QuizMachine, QuizResults, Transition};
use crate::session::Session;
use crate::timer::Countdown;
use crate::traits::Backend;

/// Quizzes generated during this session.
pub struct QuizCatalog {
    backend: Arc<dyn Backend>,
    quizzes: Vec<Quiz>,
    generating: bool,
}

impl QuizCatalog {
    pub fn new(session: &Session) -> Self {
        Self {
            backend: session.backend(),
            quizzes: Vec::new(),
            generating: false,
        }
    }

    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Ask the backend for a new quiz and append it on success.
    ///
    /// On failure nothing is added and the error is returned so the form can
    /// stay open for a retry.
    pub async fn generate(&mut self, request: &QuizRequest) -> Result<&Quiz, ApiError> {
        self.generating = true;
        let result = self.backend.generate_quiz(request).await;
        self.generating = false;

        match result {
            Ok(quiz) => {
                tracing::info!(
                    topic = %quiz.topic,
                    questions = quiz.questions.len(),
                    "quiz generated"
                );
                self.quizzes.push(quiz);
                Ok(&self.quizzes[self.quizzes.len() - 1])
            }
            Err(e) => {
                tracing::warn!(topic = %request.topic, "quiz generation failed: {e}");
                Err(e)
            }
        }
    }
}

/// What a countdown tick did to the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// Still running with this many seconds left.
    Remaining(u64),
    /// Time ran out; the attempt is now in results.
    TimedOut,
}

/// A [`QuizMachine`] plus the countdown that drives it.
///
/// The countdown exists exactly while the attempt is in progress. Every exit
/// from `InProgress` (last-question advance, submit, timeout, reset, or a new
/// start) cancels it.
pub struct QuizSession {
    machine: QuizMachine,
    countdown: Option<Countdown>,
    tick_period: Duration,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self::with_tick_period(Duration::from_secs(1))
    }

    pub fn with_tick_period(tick_period: Duration) -> Self {
        Self {
            machine: QuizMachine::new(),
            countdown: None,
            tick_period,
        }
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        self.machine.attempt()
    }

    pub fn results(&self) -> Option<QuizResults> {
        self.machine.results()
    }

    pub fn countdown_active(&self) -> bool {
        self.countdown.as_ref().is_some_and(|c| !c.is_cancelled())
    }

    /// Start `quiz`, discarding whatever attempt existed. Must be called from
    /// within a tokio runtime.
    pub fn start(&mut self, quiz: Quiz) {
        self.stop_countdown();
        tracing::info!(quiz = %quiz.id, topic = %quiz.topic, "quiz started");
        self.machine.start(quiz);
        if self.machine.phase() == Phase::InProgress {
            self.countdown = Some(Countdown::start(self.tick_period));
        }
    }

    pub fn answer(&mut self, option: usize) -> Result<(), QuizError> {
        self.machine.answer(option)
    }

    pub fn advance(&mut self) -> Result<Transition, QuizError> {
        let transition = self.machine.advance()?;
        if matches!(transition, Transition::Finished(_)) {
            self.stop_countdown();
        }
        Ok(transition)
    }

    pub fn submit(&mut self) -> Result<Transition, QuizError> {
        let transition = self.machine.submit()?;
        self.stop_countdown();
        Ok(transition)
    }

    pub fn reset(&mut self) {
        self.stop_countdown();
        self.machine.reset();
    }

    /// Wait for the next countdown tick and apply it.
    ///
    /// Pends forever when no countdown is running, so it can sit in a
    /// `tokio::select!` next to input handling.
    pub async fn next_tick(&mut self) -> TickEvent {
        let ticked = match self.countdown.as_mut() {
            Some(countdown) => countdown.tick().await,
            None => None,
        };
        if ticked.is_none() {
            return std::future::pending().await;
        }

        match self.machine.tick() {
            Some(Transition::Finished(_)) => {
                tracing::info!("quiz time expired");
                self.stop_countdown();
                TickEvent::TimedOut
            }
            _ => TickEvent::Remaining(
                self.machine
                    .attempt()
                    .map_or(0, |attempt| attempt.remaining_secs()),
            ),
        }
    }

    fn stop_countdown(&mut self) {
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockBackend};
    use crate::quiz::FinishReason;
    use crate::traits::MemoryTokenStore;

    fn timed_quiz(correct: &[usize], secs: u64) -> Quiz {
        let mut quiz = mock::quiz(correct);
        quiz.time_limit = Some(secs);
        quiz
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_runs_to_timeout() {
        let mut session = QuizSession::new();
        session.start(timed_quiz(&[0, 1], 3));
        session.answer(0).unwrap();

        assert_eq!(session.next_tick().await, TickEvent::Remaining(2));
        assert_eq!(session.next_tick().await, TickEvent::Remaining(1));
        assert_eq!(session.next_tick().await, TickEvent::TimedOut);

        assert_eq!(session.phase(), Phase::Results);
        assert!(!session.countdown_active());
        let results = session.results().unwrap();
        assert_eq!(results.finish, Some(FinishReason::TimedOut));
        assert_eq!(results.score, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_stops_countdown() {
        let mut session = QuizSession::new();
        session.start(timed_quiz(&[0], 60));
        assert!(session.countdown_active());
        assert_eq!(session.next_tick().await, TickEvent::Remaining(59));

        session.submit().unwrap();
        assert!(!session.countdown_active());

        let outcome =
            tokio::time::timeout(Duration::from_secs(5), session.next_tick()).await;
        assert!(outcome.is_err(), "no tick may arrive after submit");
        assert_eq!(session.results().unwrap().remaining_secs, 59);
    }

    #[tokio::test(start_paused = true)]
    async fn finishing_last_question_stops_countdown() {
        let mut session = QuizSession::new();
        session.start(timed_quiz(&[1], 30));
        session.answer(1).unwrap();
        assert_eq!(
            session.advance().unwrap(),
            Transition::Finished(FinishReason::Completed)
        );
        assert!(!session.countdown_active());
        assert_eq!(session.results().unwrap().score, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_and_restart_use_fresh_countdown() {
        let mut session = QuizSession::new();
        session.start(timed_quiz(&[0, 0], 10));
        session.next_tick().await;
        session.next_tick().await;

        session.reset();
        assert_eq!(session.phase(), Phase::Browsing);
        assert!(!session.countdown_active());

        session.start(timed_quiz(&[0, 0], 10));
        assert_eq!(session.attempt().unwrap().remaining_secs(), 10);
        assert_eq!(session.next_tick().await, TickEvent::Remaining(9));
    }

    #[tokio::test]
    async fn catalog_appends_generated_quizzes() {
        let backend = Arc::new(MockBackend::new());
        let session = Session::new(backend.clone(), Arc::new(MemoryTokenStore::new()));
        let mut catalog = QuizCatalog::new(&session);

        catalog.generate(&QuizRequest::new("Rust")).await.unwrap();
        catalog.generate(&QuizRequest::new("Go")).await.unwrap();

        let topics: Vec<&str> = catalog.quizzes().iter().map(|q| q.topic.as_str()).collect();
        assert_eq!(topics, vec!["Rust", "Go"]);
        assert!(!catalog.is_generating());
    }

    #[tokio::test]
    async fn catalog_failure_adds_nothing() {
        let backend = Arc::new(MockBackend::new());
        backend.fail(crate::error::Operation::GenerateQuiz, 500, None);
        let session = Session::new(backend.clone(), Arc::new(MemoryTokenStore::new()));
        let mut catalog = QuizCatalog::new(&session);

        let err = catalog.generate(&QuizRequest::new("Rust")).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate quiz");
        assert!(catalog.quizzes().is_empty());
        assert!(!catalog.is_generating());
    }
}
