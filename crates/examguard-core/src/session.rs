//! The quiz session state machine.
//!
//! Single authoritative owner of session state. Platform events (timer
//! ticks, visibility changes, key events) funnel through
//! [`Session::handle_event`]; user intents (start, answer selection,
//! manual submit) arrive through dedicated methods. The submission path is
//! guarded so the sink is invoked for exactly one logical submission per
//! session: the first trigger to reach [`Session::request_submit`] wins and
//! every later trigger is silently ignored.
//!
//! Everything runs on one cooperative loop. At most one event is processed
//! per turn, so state transitions are serialized by construction and the
//! first-caller-wins check is sufficient without a lock.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::answers::AnswerSheet;
use crate::guard::{CaptureGuard, GuardAction, GuardPolicy, KeyInput};
use crate::model::{Answer, QuizDefinition};
use crate::monitor::{
    IntegrityAction, IntegrityMonitor, IntegrityPhase, IntegrityPolicy, Visibility,
};
use crate::timer::{CountdownTimer, Tick as TimerTick};
use crate::traits::{SubmissionPayload, SubmissionReceipt, SubmissionSink};

/// The authoritative session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Submitting,
    Terminated,
}

/// Why a submission was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitReason {
    /// The student clicked submit.
    Manual,
    /// The countdown reached zero.
    TimeExpired,
    /// The violation limit was reached.
    ViolationLimit,
}

/// Tuning knobs for a session, normally read from configuration.
#[derive(Debug, Clone, Default, serde::Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub integrity: IntegrityPolicy,
    #[serde(default)]
    pub guard: GuardPolicy,
}

/// A platform event delivered to the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// One second of wall-clock time.
    Tick,
    VisibilityChanged(Visibility),
    KeyDown(KeyInput),
    KeyUp(KeyInput),
    ContextMenu,
    SelectStart,
    Copy,
}

/// What the presentation layer must do in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Cancel the platform event's default behavior.
    SuppressDefault,
    /// Blank (true) or restore (false) the quiz content.
    BlackoutChanged(bool),
    /// Show the violation warning banner.
    WarningShown { count: u32, limit: u32 },
    /// Dismiss the warning banner.
    WarningCleared,
    /// A submission was accepted for exactly-once processing; the owner
    /// must now drive [`Session::submit`].
    SubmitRequested(SubmitReason),
}

/// Result of asking the session to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Manual submit with unanswered questions. Confirm or decline before
    /// anything happens; no submission call has been made.
    NeedsConfirmation { unanswered: usize },
    /// Transitioned to Submitting; call [`Session::submit`] next.
    Accepted,
    /// A submission was already requested, or the session is not in
    /// progress. Nothing happened.
    Ignored,
}

/// Errors surfaced by session methods.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("student name must not be empty")]
    EmptyStudentName,
    #[error("session has already been started")]
    AlreadyStarted,
    #[error("no submission is pending")]
    NotSubmitting,
}

/// Outcome of driving the submission call.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The sink accepted the submission; the session is Terminated.
    Accepted(SessionResult),
    /// The sink call failed. `recovered` is true when the session returned
    /// to InProgress (manual submit with time remaining); false when it
    /// stays in Submitting awaiting a manual retry of the same payload.
    Failed { error: anyhow::Error, recovered: bool },
}

/// Final result handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    /// The sink's receipt; its score is the authoritative one.
    pub receipt: SubmissionReceipt,
    /// Locally computed percentage, display-only (the definition carries
    /// the answer key, so this value is inherently untrusted).
    pub client_score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
}

/// Warning banner state as shown to the student.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WarningBanner {
    pub count: u32,
    pub limit: u32,
    /// False once the session is being auto-submitted: the banner stays.
    pub dismissible: bool,
}

/// Derived view state for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    pub time_remaining: u32,
    pub time_display: String,
    pub answered: usize,
    pub total: usize,
    pub violation_count: u32,
    pub warning: Option<WarningBanner>,
    pub content_hidden: bool,
    pub current_question: usize,
    pub current_answered: bool,
    /// True while a failed submission awaits a manual retry.
    pub submit_failed: bool,
}

/// One student's single attempt at one quiz.
pub struct Session {
    quiz: QuizDefinition,
    config: SessionConfig,
    attempt_id: Uuid,
    state: SessionState,
    student_name: String,
    sheet: AnswerSheet,
    timer: CountdownTimer,
    monitor: IntegrityMonitor,
    guard: CaptureGuard,
    cursor: usize,
    pending_confirmation: bool,
    submit_reason: Option<SubmitReason>,
    payload: Option<SubmissionPayload>,
    submit_failed: bool,
}

impl Session {
    pub fn new(quiz: QuizDefinition, config: SessionConfig) -> Self {
        let timer = CountdownTimer::new(quiz.duration_seconds());
        let monitor = IntegrityMonitor::new(
            config.integrity.clone(),
            quiz.security.tab_switch_detection,
        );
        let guard = CaptureGuard::new(config.guard.clone(), quiz.security.screenshot_protection);
        Self {
            quiz,
            config,
            attempt_id: Uuid::new_v4(),
            state: SessionState::NotStarted,
            student_name: String::new(),
            sheet: AnswerSheet::default(),
            timer,
            monitor,
            guard,
            cursor: 0,
            pending_confirmation: false,
            submit_reason: None,
            payload: None,
            submit_failed: false,
        }
    }

    /// Begin the attempt. Initializes one empty answer slot per question,
    /// starts the countdown, and activates the monitors the quiz enables.
    pub fn start(&mut self, student_name: &str) -> Result<(), SessionError> {
        if self.state != SessionState::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        let name = student_name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyStudentName);
        }
        self.student_name = name.to_string();
        self.sheet = AnswerSheet::new(&self.quiz.questions);
        self.timer.start();
        self.monitor.activate();
        self.guard.activate();
        self.state = SessionState::InProgress;
        tracing::info!(
            quiz_id = %self.quiz.id,
            attempt_id = %self.attempt_id,
            questions = self.quiz.questions.len(),
            duration_secs = self.quiz.duration_seconds(),
            "session started"
        );
        Ok(())
    }

    /// Record a selection. No-op outside InProgress; overwrite-idempotent.
    pub fn select_answer(&mut self, question_id: &str, option: usize) -> bool {
        if self.state != SessionState::InProgress {
            return false;
        }
        match self.quiz.question(question_id) {
            Some(q) if option < q.options.len() => self.sheet.select(question_id, option),
            Some(_) => {
                tracing::warn!(question_id, option, "option index out of range, ignoring");
                false
            }
            None => {
                tracing::debug!(question_id, "selection for unknown question, ignoring");
                false
            }
        }
    }

    /// The single ingestion point for platform events. Inert in every state
    /// but InProgress, so callbacks firing against a Submitting or
    /// Terminated session cannot change anything.
    pub fn handle_event(&mut self, event: PlatformEvent) -> Vec<Effect> {
        if self.state != SessionState::InProgress {
            return Vec::new();
        }
        match event {
            PlatformEvent::Tick => {
                if let TimerTick::Expired = self.timer.tick() {
                    tracing::info!("countdown expired, auto-submitting");
                    return self.auto_submit(SubmitReason::TimeExpired);
                }
                let mut effects = Vec::new();
                if self.monitor.tick(self.timer.elapsed_seconds()) {
                    effects.push(Effect::WarningCleared);
                }
                effects
            }
            PlatformEvent::VisibilityChanged(visibility) => {
                match self
                    .monitor
                    .observe(visibility, self.timer.elapsed_seconds())
                {
                    IntegrityAction::None => Vec::new(),
                    IntegrityAction::Warn { count, limit } => {
                        vec![Effect::WarningShown { count, limit }]
                    }
                    IntegrityAction::Escalate { count } => {
                        // The banner stays up without a dismissal countdown;
                        // the session is ending.
                        let mut effects = vec![Effect::WarningShown {
                            count,
                            limit: count,
                        }];
                        effects.extend(self.auto_submit(SubmitReason::ViolationLimit));
                        effects
                    }
                }
            }
            PlatformEvent::KeyDown(key) => guard_effects(self.guard.key_down(&key)),
            PlatformEvent::KeyUp(key) => guard_effects(self.guard.key_up(&key)),
            PlatformEvent::ContextMenu | PlatformEvent::SelectStart | PlatformEvent::Copy => {
                guard_effects(self.guard.suppress_copy_event())
            }
        }
    }

    fn auto_submit(&mut self, reason: SubmitReason) -> Vec<Effect> {
        if self.state != SessionState::InProgress {
            return Vec::new();
        }
        self.enter_submitting(reason);
        vec![Effect::SubmitRequested(reason)]
    }

    /// The only way into Submitting. First caller wins; any later request
    /// (a second click, a late timer expiry) is ignored. Manual submits
    /// with unanswered questions require confirmation first.
    pub fn request_submit(&mut self, reason: SubmitReason) -> SubmitDecision {
        if self.state != SessionState::InProgress {
            return SubmitDecision::Ignored;
        }
        if reason == SubmitReason::Manual {
            let unanswered = self.sheet.unanswered_count();
            if unanswered > 0 {
                self.pending_confirmation = true;
                return SubmitDecision::NeedsConfirmation { unanswered };
            }
        }
        self.enter_submitting(reason);
        SubmitDecision::Accepted
    }

    /// Confirm a pending manual submission with unanswered questions.
    pub fn confirm_submit(&mut self) -> SubmitDecision {
        if self.state != SessionState::InProgress || !self.pending_confirmation {
            return SubmitDecision::Ignored;
        }
        self.pending_confirmation = false;
        self.enter_submitting(SubmitReason::Manual);
        SubmitDecision::Accepted
    }

    /// Decline a pending confirmation. The session stays InProgress and no
    /// submission call is made.
    pub fn decline_submit(&mut self) {
        self.pending_confirmation = false;
    }

    fn enter_submitting(&mut self, reason: SubmitReason) {
        debug_assert_eq!(self.state, SessionState::InProgress);
        self.pending_confirmation = false;
        self.timer.stop();
        self.monitor.deactivate();
        self.guard.deactivate();
        self.state = SessionState::Submitting;
        self.submit_reason = Some(reason);
        let elapsed = u64::from(self.timer.elapsed_seconds());
        self.payload = Some(SubmissionPayload {
            quiz_id: self.quiz.id.clone(),
            attempt_id: self.attempt_id,
            student_name: self.student_name.clone(),
            answers: self.sheet.answers().to_vec(),
            violation_count: self.monitor.violations(),
            elapsed_seconds: elapsed,
        });
        tracing::info!(
            ?reason,
            elapsed_secs = elapsed,
            violations = self.monitor.violations(),
            answered = self.sheet.answered_count(),
            "submission requested"
        );
    }

    /// Drive the one outstanding submission call. On success the session
    /// terminates; on a retryable failure it either returns to InProgress
    /// (manual submit with time remaining) or stays in Submitting, where a
    /// later call resends the identical payload. Never called twice for the
    /// same logical submission unless the previous call failed.
    pub async fn submit(
        &mut self,
        sink: &dyn SubmissionSink,
    ) -> Result<SubmitOutcome, SessionError> {
        if self.state != SessionState::Submitting {
            return Err(SessionError::NotSubmitting);
        }
        let payload = self.payload.clone().ok_or(SessionError::NotSubmitting)?;

        match sink.submit(&payload).await {
            Ok(receipt) => {
                self.state = SessionState::Terminated;
                self.submit_failed = false;
                let (client_score, correct_count) = self.client_score();
                tracing::info!(
                    sink = sink.name(),
                    score = receipt.score,
                    client_score,
                    "submission accepted"
                );
                Ok(SubmitOutcome::Accepted(SessionResult {
                    receipt,
                    client_score,
                    correct_count,
                    total_questions: self.quiz.questions.len(),
                }))
            }
            Err(error) => {
                let manual = self.submit_reason == Some(SubmitReason::Manual);
                let time_left = self.timer.remaining_seconds() > 0;
                if manual && time_left {
                    // Recoverable: drop the staged payload and resume the
                    // attempt with monitors re-armed.
                    self.state = SessionState::InProgress;
                    self.submit_reason = None;
                    self.payload = None;
                    self.submit_failed = false;
                    self.timer.start();
                    self.monitor.activate();
                    self.guard.activate();
                    tracing::warn!(error = %error, "submission failed, session resumed");
                    Ok(SubmitOutcome::Failed {
                        error,
                        recovered: true,
                    })
                } else {
                    // Terminal failure sub-state: same payload, manual retry.
                    self.submit_failed = true;
                    tracing::error!(error = %error, "submission failed, awaiting manual retry");
                    Ok(SubmitOutcome::Failed {
                        error,
                        recovered: false,
                    })
                }
            }
        }
    }

    /// Abandon the attempt (navigation away). Deterministic teardown: the
    /// timer and both monitors are released, nothing is submitted.
    pub fn abandon(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }
        self.timer.stop();
        self.monitor.deactivate();
        self.guard.deactivate();
        self.state = SessionState::Terminated;
        tracing::info!(attempt_id = %self.attempt_id, "session abandoned");
    }

    /// Locally computed percentage and correct count. Display-only: the
    /// answer key this reads should never be trusted client-side.
    pub fn client_score(&self) -> (f64, usize) {
        let correct = self
            .quiz
            .questions
            .iter()
            .filter(|q| self.sheet.selected(&q.id) == Some(q.correct_option))
            .count();
        let total = self.quiz.questions.len();
        if total == 0 {
            return (0.0, 0);
        }
        ((correct as f64 / total as f64) * 100.0, correct)
    }

    /// Move to the next question, clamped to the last.
    pub fn next_question(&mut self) {
        if self.state == SessionState::InProgress && !self.quiz.questions.is_empty() {
            self.cursor = (self.cursor + 1).min(self.quiz.questions.len() - 1);
        }
    }

    /// Move to the previous question, clamped to the first.
    pub fn prev_question(&mut self) {
        if self.state == SessionState::InProgress {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    /// Derived state for the presentation layer.
    pub fn view(&self) -> SessionView {
        let warning = match self.monitor.phase() {
            IntegrityPhase::Calm => None,
            IntegrityPhase::Warning { count, .. } => Some(WarningBanner {
                count,
                limit: self.config.integrity.violation_limit,
                dismissible: true,
            }),
            IntegrityPhase::Escalated { count } => Some(WarningBanner {
                count,
                limit: self.config.integrity.violation_limit,
                dismissible: false,
            }),
        };
        let current_answered = self
            .quiz
            .questions
            .get(self.cursor)
            .map(|q| self.sheet.selected(&q.id).is_some())
            .unwrap_or(false);
        SessionView {
            state: self.state,
            time_remaining: self.timer.remaining_seconds(),
            time_display: self.timer.format_remaining(),
            answered: self.sheet.answered_count(),
            total: self.quiz.questions.len(),
            violation_count: self.monitor.violations(),
            warning,
            content_hidden: self.guard.content_hidden(),
            current_question: self.cursor,
            current_answered,
            submit_failed: self.submit_failed,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn quiz(&self) -> &QuizDefinition {
        &self.quiz
    }

    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    pub fn violation_count(&self) -> u32 {
        self.monitor.violations()
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.timer.elapsed_seconds()
    }

    pub fn answers(&self) -> &[Answer] {
        self.sheet.answers()
    }
}

fn guard_effects(action: GuardAction) -> Vec<Effect> {
    match action {
        GuardAction::Pass => Vec::new(),
        GuardAction::Suppress => vec![Effect::SuppressDefault],
        GuardAction::SuppressAndHide => {
            vec![Effect::SuppressDefault, Effect::BlackoutChanged(true)]
        }
        GuardAction::Reveal => vec![Effect::BlackoutChanged(false)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, SecurityFlags};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    fn quiz(questions: usize, duration_minutes: u32, security: SecurityFlags) -> QuizDefinition {
        QuizDefinition {
            id: "1".into(),
            url_id: "js-intro-2024".into(),
            title: "Introduction to JavaScript".into(),
            instructions: String::new(),
            duration_minutes,
            security,
            questions: (1..=questions)
                .map(|i| Question {
                    id: format!("q{i}"),
                    prompt: format!("Question {i}"),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct_option: 1,
                })
                .collect(),
        }
    }

    fn proctored() -> SecurityFlags {
        SecurityFlags {
            tab_switch_detection: true,
            screenshot_protection: true,
        }
    }

    fn started(questions: usize, duration_minutes: u32, security: SecurityFlags) -> Session {
        let mut session = Session::new(quiz(questions, duration_minutes, security), config());
        session.start("Ada Lovelace").unwrap();
        session
    }

    fn config() -> SessionConfig {
        SessionConfig::default()
    }

    /// Counting sink stub; fails the first `fail_times` calls.
    struct StubSink {
        calls: AtomicU32,
        fail_times: AtomicU32,
        last: Mutex<Option<SubmissionPayload>>,
    }

    impl StubSink {
        fn accepting() -> Self {
            Self::failing(0)
        }

        fn failing(n: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_times: AtomicU32::new(n),
                last: Mutex::new(None),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::Relaxed)
        }

        fn last_payload(&self) -> Option<SubmissionPayload> {
            self.last.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SubmissionSink for StubSink {
        fn name(&self) -> &str {
            "stub"
        }

        async fn submit(&self, payload: &SubmissionPayload) -> anyhow::Result<SubmissionReceipt> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            *self.last.lock().unwrap() = Some(payload.clone());
            if self.fail_times.load(Ordering::Relaxed) > 0 {
                self.fail_times.fetch_sub(1, Ordering::Relaxed);
                anyhow::bail!("connection reset by peer");
            }
            Ok(SubmissionReceipt {
                score: 100.0,
                correct_count: None,
                message: None,
            })
        }
    }

    #[test]
    fn start_rejects_blank_name() {
        let mut session = Session::new(quiz(2, 5, proctored()), config());
        assert!(matches!(
            session.start("   "),
            Err(SessionError::EmptyStudentName)
        ));
        assert_eq!(session.state(), SessionState::NotStarted);
        assert!(session.start("Ada").is_ok());
        assert!(matches!(
            session.start("Ada"),
            Err(SessionError::AlreadyStarted)
        ));
    }

    #[test]
    fn start_initializes_one_empty_slot_per_question() {
        let session = started(5, 45, proctored());
        assert_eq!(session.answers().len(), 5);
        assert!(session
            .answers()
            .iter()
            .all(|a| a.selected_option.is_none()));
        assert_eq!(session.view().time_remaining, 45 * 60);
        assert_eq!(session.view().time_display, "45:00");
    }

    #[test]
    fn answer_overwrite_is_idempotent() {
        let mut session = started(3, 5, proctored());
        assert!(session.select_answer("q1", 1));
        assert!(session.select_answer("q1", 2));
        assert_eq!(session.answers()[0].selected_option, Some(2));
        assert_eq!(session.view().answered, 1);
    }

    #[test]
    fn selection_is_inert_outside_in_progress() {
        let mut session = Session::new(quiz(2, 5, proctored()), config());
        assert!(!session.select_answer("q1", 0));
        session.start("Ada").unwrap();
        session.request_submit(SubmitReason::TimeExpired);
        assert!(!session.select_answer("q1", 0));
    }

    #[test]
    fn out_of_range_option_is_ignored() {
        let mut session = started(1, 5, proctored());
        assert!(!session.select_answer("q1", 99));
        assert_eq!(session.view().answered, 0);
    }

    #[tokio::test]
    async fn submission_happens_exactly_once_across_all_triggers() {
        let mut session = started(2, 1, proctored());

        // Time expiry, third violation, and a manual click all land in the
        // same window; only the first wins.
        for _ in 0..59 {
            session.handle_event(PlatformEvent::Tick);
        }
        let effects = session.handle_event(PlatformEvent::Tick);
        assert!(effects.contains(&Effect::SubmitRequested(SubmitReason::TimeExpired)));
        assert_eq!(session.state(), SessionState::Submitting);

        for _ in 0..3 {
            assert!(session
                .handle_event(PlatformEvent::VisibilityChanged(Visibility::Hidden))
                .is_empty());
            session.handle_event(PlatformEvent::VisibilityChanged(Visibility::Visible));
        }
        assert_eq!(
            session.request_submit(SubmitReason::Manual),
            SubmitDecision::Ignored
        );

        let sink = StubSink::accepting();
        let outcome = session.submit(&sink).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Accepted(_)));
        assert_eq!(sink.call_count(), 1);
        assert_eq!(session.state(), SessionState::Terminated);

        // Late triggers against the terminated session stay inert.
        assert!(session.handle_event(PlatformEvent::Tick).is_empty());
        assert!(matches!(
            session.submit(&sink).await,
            Err(SessionError::NotSubmitting)
        ));
        assert_eq!(sink.call_count(), 1);
    }

    #[tokio::test]
    async fn three_violations_in_ten_seconds_auto_submit() {
        let mut session = started(2, 1, proctored());

        // ~10 seconds in, three rapid hide/show/hide transitions.
        for _ in 0..10 {
            session.handle_event(PlatformEvent::Tick);
        }
        let first = session.handle_event(PlatformEvent::VisibilityChanged(Visibility::Hidden));
        assert_eq!(
            first,
            vec![Effect::WarningShown { count: 1, limit: 3 }]
        );
        session.handle_event(PlatformEvent::VisibilityChanged(Visibility::Visible));
        session.handle_event(PlatformEvent::VisibilityChanged(Visibility::Hidden));
        session.handle_event(PlatformEvent::VisibilityChanged(Visibility::Visible));
        let third = session.handle_event(PlatformEvent::VisibilityChanged(Visibility::Hidden));
        assert!(third.contains(&Effect::SubmitRequested(SubmitReason::ViolationLimit)));

        let sink = StubSink::accepting();
        session.submit(&sink).await.unwrap();
        assert_eq!(sink.call_count(), 1);
        let payload = sink.last_payload().unwrap();
        assert_eq!(payload.violation_count, 3);
        assert_eq!(payload.elapsed_seconds, 10);
        assert_eq!(payload.answers.len(), 2);
    }

    #[test]
    fn detection_disabled_never_escalates() {
        let security = SecurityFlags {
            tab_switch_detection: false,
            screenshot_protection: true,
        };
        let mut session = started(2, 5, security);
        for _ in 0..5 {
            assert!(session
                .handle_event(PlatformEvent::VisibilityChanged(Visibility::Hidden))
                .is_empty());
            session.handle_event(PlatformEvent::VisibilityChanged(Visibility::Visible));
        }
        assert_eq!(session.violation_count(), 0);
        assert_eq!(session.state(), SessionState::InProgress);
    }

    #[test]
    fn warning_banner_clears_after_window() {
        let mut session = started(2, 5, proctored());
        session.handle_event(PlatformEvent::VisibilityChanged(Visibility::Hidden));
        assert!(session.view().warning.is_some());
        let mut cleared = false;
        for _ in 0..6 {
            if session
                .handle_event(PlatformEvent::Tick)
                .contains(&Effect::WarningCleared)
            {
                cleared = true;
            }
        }
        assert!(cleared);
        assert!(session.view().warning.is_none());
        assert_eq!(session.violation_count(), 1);
    }

    #[tokio::test]
    async fn manual_submit_with_unanswered_requires_confirmation() {
        let mut session = started(3, 5, proctored());
        session.select_answer("q1", 0);

        let decision = session.request_submit(SubmitReason::Manual);
        assert_eq!(decision, SubmitDecision::NeedsConfirmation { unanswered: 2 });
        assert_eq!(session.state(), SessionState::InProgress);

        // Declining keeps the session running and makes zero sink calls.
        session.decline_submit();
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.confirm_submit(), SubmitDecision::Ignored);

        let decision = session.request_submit(SubmitReason::Manual);
        assert_eq!(decision, SubmitDecision::NeedsConfirmation { unanswered: 2 });
        assert_eq!(session.confirm_submit(), SubmitDecision::Accepted);
        assert_eq!(session.state(), SessionState::Submitting);

        let sink = StubSink::accepting();
        session.submit(&sink).await.unwrap();
        assert_eq!(sink.call_count(), 1);
    }

    #[test]
    fn fully_answered_manual_submit_skips_confirmation() {
        let mut session = started(2, 5, proctored());
        session.select_answer("q1", 1);
        session.select_answer("q2", 1);
        assert_eq!(
            session.request_submit(SubmitReason::Manual),
            SubmitDecision::Accepted
        );
    }

    #[test]
    fn expiry_fires_once_with_no_confirmation() {
        let mut session = started(3, 1, proctored());
        let mut submits = 0;
        for _ in 0..120 {
            for effect in session.handle_event(PlatformEvent::Tick) {
                if matches!(effect, Effect::SubmitRequested(SubmitReason::TimeExpired)) {
                    submits += 1;
                }
            }
        }
        assert_eq!(submits, 1);
        assert_eq!(session.view().time_remaining, 0);
    }

    #[tokio::test]
    async fn manual_submit_failure_resumes_session() {
        let mut session = started(1, 5, proctored());
        session.select_answer("q1", 1);
        session.request_submit(SubmitReason::Manual);

        let sink = StubSink::failing(1);
        let outcome = session.submit(&sink).await.unwrap();
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed {
                recovered: true,
                ..
            }
        ));
        assert_eq!(session.state(), SessionState::InProgress);

        // Answers survive the failure; the retry is a fresh manual submit.
        assert_eq!(session.answers()[0].selected_option, Some(1));
        assert_eq!(
            session.request_submit(SubmitReason::Manual),
            SubmitDecision::Accepted
        );
        let outcome = session.submit(&sink).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Accepted(_)));
        assert_eq!(sink.call_count(), 2);
    }

    #[tokio::test]
    async fn auto_submit_failure_is_terminal_until_retried() {
        let mut session = started(1, 1, proctored());
        session.select_answer("q1", 1);
        for _ in 0..60 {
            session.handle_event(PlatformEvent::Tick);
        }
        assert_eq!(session.state(), SessionState::Submitting);

        let sink = StubSink::failing(1);
        let outcome = session.submit(&sink).await.unwrap();
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed {
                recovered: false,
                ..
            }
        ));
        assert_eq!(session.state(), SessionState::Submitting);
        assert!(session.view().submit_failed);
        let first_payload = sink.last_payload().unwrap();

        // Manual retry resends the identical payload.
        let outcome = session.submit(&sink).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Accepted(_)));
        assert_eq!(sink.last_payload().unwrap(), first_payload);
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[test]
    fn capture_key_blanks_and_any_other_key_up_restores() {
        let mut session = started(1, 5, proctored());
        let effects = session.handle_event(PlatformEvent::KeyDown(KeyInput::plain("PrintScreen")));
        assert_eq!(
            effects,
            vec![Effect::SuppressDefault, Effect::BlackoutChanged(true)]
        );
        assert!(session.view().content_hidden);

        let effects = session.handle_event(PlatformEvent::KeyUp(KeyInput::plain("Shift")));
        assert_eq!(effects, vec![Effect::BlackoutChanged(false)]);
        assert!(!session.view().content_hidden);
    }

    #[test]
    fn copy_events_suppressed_regardless_of_screenshot_flag() {
        let security = SecurityFlags {
            tab_switch_detection: true,
            screenshot_protection: false,
        };
        let mut session = started(1, 5, security);
        assert_eq!(
            session.handle_event(PlatformEvent::Copy),
            vec![Effect::SuppressDefault]
        );
        assert_eq!(
            session.handle_event(PlatformEvent::ContextMenu),
            vec![Effect::SuppressDefault]
        );
        // Screenshot keys pass through when the flag is off.
        assert!(session
            .handle_event(PlatformEvent::KeyDown(KeyInput::plain("PrintScreen")))
            .is_empty());
    }

    #[test]
    fn abandon_tears_down_without_submitting() {
        let mut session = started(2, 5, proctored());
        session.handle_event(PlatformEvent::KeyDown(KeyInput::plain("PrintScreen")));
        session.abandon();
        assert_eq!(session.state(), SessionState::Terminated);
        assert!(!session.view().content_hidden);
        assert!(session.handle_event(PlatformEvent::Tick).is_empty());
        assert!(session
            .handle_event(PlatformEvent::VisibilityChanged(Visibility::Hidden))
            .is_empty());
    }

    #[test]
    fn client_score_matches_source_formula() {
        let mut session = started(4, 5, proctored());
        session.select_answer("q1", 1); // correct
        session.select_answer("q2", 1); // correct
        session.select_answer("q3", 0); // wrong
        let (score, correct) = session.client_score();
        assert_eq!(correct, 2);
        assert!((score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn navigation_clamps_to_question_range() {
        let mut session = started(3, 5, proctored());
        session.prev_question();
        assert_eq!(session.view().current_question, 0);
        for _ in 0..10 {
            session.next_question();
        }
        assert_eq!(session.view().current_question, 2);
        session.prev_question();
        assert_eq!(session.view().current_question, 1);
    }
}
