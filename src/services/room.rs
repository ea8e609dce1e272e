use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    config::Config,
    models::{demo_questions, Question},
    services::{
        generator::QuestionSource,
        pool::QuestionPoolService,
        scan_router::{self, QrCommand, ScanAction},
        session::{AnswerOutcome, QuizPhase, QuizSession, QuizSnapshot},
    },
};

const FALLBACK_NOTICE: &str = "Could not load questions, showing samples";

/// One room's quiz: the state machine plus the timing, pool and generation
/// policy around it. All mutation funnels through the session mutex, so there
/// is exactly one logical writer per room.
pub struct RoomSession {
    room_id: String,
    session: Mutex<QuizSession>,
    /// Pre-generated question set for the next round, staged while showing
    /// results so a restart rarely waits on the network.
    staged: Mutex<Option<Vec<Question>>>,
    pool: Arc<QuestionPoolService>,
    generator: Arc<dyn QuestionSource>,
    config: Arc<Config>,
    help_open: AtomicBool,
    scanner_enabled: AtomicBool,
    replenishing: AtomicBool,
}

impl RoomSession {
    pub fn new(
        room_id: impl Into<String>,
        pool: Arc<QuestionPoolService>,
        generator: Arc<dyn QuestionSource>,
        config: Arc<Config>,
    ) -> Arc<Self> {
        Arc::new(Self {
            room_id: room_id.into(),
            session: Mutex::new(QuizSession::new()),
            staged: Mutex::new(None),
            pool,
            generator,
            config,
            help_open: AtomicBool::new(false),
            scanner_enabled: AtomicBool::new(true),
            replenishing: AtomicBool::new(false),
        })
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Starts (or restarts) a round: staged questions first, then the pool
    /// topped up by a timeout-bounded generator call, then the demo fallback.
    /// Never blocks past the configured first-load timeout.
    pub async fn start_round(self: &Arc<Self>) {
        let count = self.config.questions_per_round;

        let staged = self.staged.lock().await.take();
        let (questions, notice) = match staged {
            Some(questions) if questions.len() >= count => (questions, None),
            _ => self.assemble_round(count).await,
        };

        let mut session = self.session.lock().await;
        session.start_round(questions);
        if let Some(notice) = notice {
            session.set_error(notice);
        }
        log::info!("Room {}: started round {}", self.room_id, session.round());
    }

    async fn assemble_round(&self, count: usize) -> (Vec<Question>, Option<String>) {
        let mut questions = self.pool.draw(count).await;
        if questions.len() >= count {
            return (questions, None);
        }

        let missing = count - questions.len();
        let generation = tokio::time::timeout(
            Duration::from_secs(self.config.first_load_timeout_secs),
            self.generator.generate(missing),
        )
        .await;

        match generation {
            Ok(Ok(mut generated)) => {
                let surplus = generated.split_off(missing.min(generated.len()));
                questions.extend(generated);
                if !surplus.is_empty() {
                    self.pool.add_unique(surplus).await;
                }
                if questions.len() >= count {
                    return (questions, None);
                }
                // Generator under-delivered; pad below
            }
            Ok(Err(err)) => {
                log::warn!("Room {}: generation failed ({})", self.room_id, err);
            }
            Err(_) => {
                log::warn!("Room {}: generation timed out", self.room_id);
            }
        }

        let have: std::collections::HashSet<String> =
            questions.iter().map(|q| q.text.clone()).collect();
        questions.extend(
            demo_questions()
                .into_iter()
                .filter(|q| !have.contains(&q.text))
                .take(count - questions.len()),
        );
        (questions, Some(FALLBACK_NOTICE.to_string()))
    }

    /// Entry point for every scan token, whether it arrived over the relay or
    /// the phone callout.
    pub async fn handle_scan(self: &Arc<Self>, token: &str) -> ScanAction {
        let current = self.session.lock().await.current_question().cloned();
        let action = scan_router::classify(token, current.as_ref());

        match &action {
            ScanAction::Command(command) => self.apply_command(*command).await,
            ScanAction::Answer(option_id) => self.apply_answer(option_id.clone()).await,
            ScanAction::UnknownCommand(_) | ScanAction::Ignored => {}
        }

        action
    }

    async fn apply_command(self: &Arc<Self>, command: QrCommand) {
        match command {
            QrCommand::Restart => {
                log::info!("Room {}: restart requested", self.room_id);
                self.start_round().await;
            }
            QrCommand::StartRound => {
                self.scanner_enabled.store(true, Ordering::SeqCst);
                self.start_round().await;
            }
            QrCommand::OpenHelp => self.help_open.store(true, Ordering::SeqCst),
            QrCommand::CloseHelp => self.help_open.store(false, Ordering::SeqCst),
        }
    }

    async fn apply_answer(self: &Arc<Self>, option_id: String) {
        let outcome = self.session.lock().await.answer(&option_id);

        if let AnswerOutcome::Recorded { round, correct, .. } = outcome {
            log::debug!(
                "Room {}: answer {} recorded ({})",
                self.room_id,
                option_id,
                if correct { "correct" } else { "incorrect" }
            );
            self.schedule_advance(round);
        }
    }

    /// Closes the feedback window after the configured delay. The captured
    /// round id makes a timer that outlives its round harmless.
    fn schedule_advance(self: &Arc<Self>, round: u64) {
        let room = Arc::clone(self);
        let delay = Duration::from_millis(self.config.feedback_delay_ms);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut session = room.session.lock().await;
            let advanced = session.advance(round);
            let finished = advanced && session.phase() == QuizPhase::Results;
            drop(session);

            if finished {
                room.on_round_complete().await;
            }
        });
    }

    async fn on_round_complete(self: &Arc<Self>) {
        log::info!("Room {}: round complete", self.room_id);

        // Retract consumed questions so a shared pool never re-serves them
        let consumed = self.session.lock().await.snapshot().questions;
        self.pool.remove(&consumed).await;

        if self.pool.len().await >= self.config.pool_low_water {
            return;
        }
        if self.replenishing.swap(true, Ordering::SeqCst) {
            return;
        }

        let room = Arc::clone(self);
        tokio::spawn(async move {
            let count = room.config.questions_per_round;
            match room.generator.generate(count + room.config.pool_low_water).await {
                Ok(mut generated) => {
                    let overflow = generated.split_off(count.min(generated.len()));
                    *room.staged.lock().await = Some(generated);
                    let pooled = room.pool.add_unique(overflow).await;
                    log::info!(
                        "Room {}: staged next round, pooled {} extra questions",
                        room.room_id,
                        pooled
                    );
                }
                Err(err) => {
                    log::warn!("Room {}: background replenishment failed ({})", room.room_id, err);
                }
            }
            room.replenishing.store(false, Ordering::SeqCst);
        });
    }

    pub async fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id.clone(),
            quiz: self.session.lock().await.snapshot(),
            help_open: self.help_open.load(Ordering::SeqCst),
            scanner_enabled: self.scanner_enabled.load(Ordering::SeqCst),
            pool_size: self.pool.len().await,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: String,
    pub quiz: QuizSnapshot,
    pub help_open: bool,
    pub scanner_enabled: bool,
    pub pool_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockPoolRepository;
    use crate::services::generator::MockQuestionSource;
    use crate::test_utils::fixtures::test_questions;

    fn pool_with(initial: Vec<Question>) -> MockPoolRepository {
        let mut repository = MockPoolRepository::new();
        repository.expect_load().returning(move || Ok(initial.clone()));
        repository.expect_save().returning(|_| Ok(()));
        repository
    }

    async fn room_with(
        initial_pool: Vec<Question>,
        generator: MockQuestionSource,
    ) -> Arc<RoomSession> {
        let config = Arc::new(Config::test_config());
        let pool = Arc::new(
            QuestionPoolService::new(Arc::new(pool_with(initial_pool)), config.pool_cap).await,
        );
        RoomSession::new("quiz", pool, Arc::new(generator), config)
    }

    fn failing_generator() -> MockQuestionSource {
        let mut generator = MockQuestionSource::new();
        generator.expect_generate().returning(|_| {
            Err(crate::errors::AppError::Generation("upstream down".into()))
        });
        generator
    }

    #[tokio::test]
    async fn start_round_draws_from_pool_without_generation() {
        let mut generator = MockQuestionSource::new();
        generator.expect_generate().never();

        let room = room_with(test_questions(8), generator).await;
        room.start_round().await;

        let snapshot = room.snapshot().await;
        assert_eq!(snapshot.quiz.questions.len(), 4);
        assert_eq!(snapshot.quiz.phase, QuizPhase::InRound);
        assert!(snapshot.quiz.error.is_none());
        assert_eq!(snapshot.pool_size, 4);
    }

    #[tokio::test]
    async fn empty_pool_and_failed_generator_still_produce_a_playable_round() {
        let room = room_with(Vec::new(), failing_generator()).await;
        room.start_round().await;

        let snapshot = room.snapshot().await;
        assert_eq!(snapshot.quiz.questions.len(), 4);
        assert!(snapshot.quiz.questions.iter().all(|q| q.is_demo));
        assert_eq!(snapshot.quiz.error.as_deref(), Some(FALLBACK_NOTICE));
        assert_eq!(snapshot.quiz.phase, QuizPhase::InRound);
    }

    #[tokio::test]
    async fn short_pool_is_topped_up_by_the_generator() {
        let mut generator = MockQuestionSource::new();
        generator.expect_generate().returning(|count| {
            Ok(test_questions(count + 2)
                .into_iter()
                .map(|mut q| {
                    q.id = format!("g{}", q.id);
                    q.text = format!("Generated {}", q.text);
                    q
                })
                .collect())
        });

        let room = room_with(test_questions(1), generator).await;
        room.start_round().await;

        let snapshot = room.snapshot().await;
        assert_eq!(snapshot.quiz.questions.len(), 4);
        assert!(snapshot.quiz.error.is_none());
        // Surplus generated questions landed in the pool
        assert!(snapshot.pool_size > 0);
    }

    #[tokio::test]
    async fn answer_scan_advances_after_feedback_delay() {
        let mut generator = MockQuestionSource::new();
        generator.expect_generate().returning(|_| {
            Err(crate::errors::AppError::Generation("upstream down".into()))
        });

        let room = room_with(test_questions(8), generator).await;
        room.start_round().await;

        let first = room.snapshot().await.quiz.questions[0].clone();
        let action = room.handle_scan(&first.options[0].id).await;
        assert!(matches!(action, ScanAction::Answer(_)));
        assert_eq!(room.snapshot().await.quiz.phase, QuizPhase::Feedback);

        tokio::time::sleep(Duration::from_millis(80)).await;
        let snapshot = room.snapshot().await;
        assert_eq!(snapshot.quiz.phase, QuizPhase::InRound);
        assert_eq!(snapshot.quiz.current_question_index, 1);
    }

    #[tokio::test]
    async fn two_scans_in_one_feedback_window_apply_only_the_first() {
        let room = room_with(test_questions(8), failing_generator()).await;
        room.start_round().await;

        let first = room.snapshot().await.quiz.questions[0].clone();
        room.handle_scan(&first.options[1].id).await;
        room.handle_scan(&first.options[0].id).await;

        let snapshot = room.snapshot().await;
        assert_eq!(
            snapshot.quiz.last_answer.as_deref(),
            Some(first.options[1].id.as_str())
        );
        assert_eq!(snapshot.quiz.score, 0);
    }

    #[tokio::test]
    async fn restart_command_during_feedback_leaves_new_round_untouched() {
        let room = room_with(test_questions(16), failing_generator()).await;
        room.start_round().await;

        let first = room.snapshot().await.quiz.questions[0].clone();
        room.handle_scan(&first.options[0].id).await;

        // Restart before the feedback timer fires
        room.handle_scan("c:r").await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        let snapshot = room.snapshot().await;
        assert_eq!(snapshot.quiz.current_question_index, 0);
        assert_eq!(snapshot.quiz.score, 0);
        assert_eq!(snapshot.quiz.phase, QuizPhase::InRound);
    }

    #[tokio::test]
    async fn help_commands_toggle_the_modal_flag() {
        let room = room_with(test_questions(8), failing_generator()).await;

        room.handle_scan("c:i").await;
        assert!(room.snapshot().await.help_open);

        room.handle_scan("c:c").await;
        assert!(!room.snapshot().await.help_open);
    }

    #[tokio::test]
    async fn completing_a_round_reaches_results() {
        let room = room_with(test_questions(8), failing_generator()).await;
        room.start_round().await;

        for _ in 0..4 {
            let current = room
                .snapshot()
                .await
                .quiz
                .questions
                .get(room.snapshot().await.quiz.current_question_index)
                .cloned()
                .expect("round should have a current question");
            room.handle_scan(&current.options[0].id).await;
            tokio::time::sleep(Duration::from_millis(80)).await;
        }

        let snapshot = room.snapshot().await;
        assert!(snapshot.quiz.show_result);
        assert_eq!(snapshot.quiz.current_question_index, 4);
        assert_eq!(snapshot.quiz.score, 4);
        assert_eq!(snapshot.quiz.phase, QuizPhase::Results);
    }

    #[tokio::test]
    async fn restart_from_results_with_dead_generator_falls_back_to_demo() {
        // Pool holds exactly one round; after it completes, nothing is left.
        let room = room_with(test_questions(4), failing_generator()).await;
        room.start_round().await;

        for _ in 0..4 {
            let snapshot = room.snapshot().await.quiz;
            let current = snapshot.questions[snapshot.current_question_index].clone();
            room.handle_scan(&current.options[0].id).await;
            tokio::time::sleep(Duration::from_millis(80)).await;
        }
        assert_eq!(room.snapshot().await.quiz.phase, QuizPhase::Results);

        room.handle_scan("c:r").await;
        let snapshot = room.snapshot().await;
        assert_eq!(snapshot.quiz.questions.len(), 4);
        assert!(snapshot.quiz.questions.iter().all(|q| q.is_demo));
        assert_eq!(snapshot.quiz.phase, QuizPhase::InRound);
    }
}
