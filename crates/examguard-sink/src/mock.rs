//! In-process provider and sink for tests and dry runs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use examguard_core::model::QuizDefinition;
use examguard_core::traits::{
    QuizProvider, SubmissionPayload, SubmissionReceipt, SubmissionSink,
};

/// Serves a fixed quiz definition without touching the network.
pub struct MockQuizProvider {
    quiz: QuizDefinition,
}

impl MockQuizProvider {
    pub fn new(quiz: QuizDefinition) -> Self {
        Self { quiz }
    }
}

#[async_trait]
impl QuizProvider for MockQuizProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, _quiz_ref: &str) -> anyhow::Result<QuizDefinition> {
        Ok(self.quiz.clone())
    }
}

/// Records submissions instead of delivering them. The receipt score is
/// fixed at construction; `fail_times` makes the first n calls error.
pub struct MockSink {
    score: f64,
    correct_count: Option<u32>,
    fail_times: u32,
    call_count: AtomicU32,
    last_payload: Mutex<Option<SubmissionPayload>>,
}

impl MockSink {
    pub fn accepting() -> Self {
        Self::with_score(100.0)
    }

    pub fn with_score(score: f64) -> Self {
        Self {
            score,
            correct_count: None,
            fail_times: 0,
            call_count: AtomicU32::new(0),
            last_payload: Mutex::new(None),
        }
    }

    pub fn with_correct_count(mut self, correct_count: u32) -> Self {
        self.correct_count = Some(correct_count);
        self
    }

    pub fn fail_times(mut self, n: u32) -> Self {
        self.fail_times = n;
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<SubmissionPayload> {
        self.last_payload.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionSink for MockSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, payload: &SubmissionPayload) -> anyhow::Result<SubmissionReceipt> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());

        if call < self.fail_times {
            anyhow::bail!("mock sink failure {}", call + 1);
        }

        Ok(SubmissionReceipt {
            score: self.score,
            correct_count: self.correct_count,
            message: Some("Submission recorded".to_string()),
        })
    }
}
