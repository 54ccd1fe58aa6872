//! External collaborator seams: quiz definitions in, submissions out.
//!
//! These async traits are implemented by the `examguard-sink` crate (HTTP
//! and mock). The session engine depends only on the trait surface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Answer, QuizDefinition};

/// Source of quiz definitions, keyed by an opaque reference.
///
/// The returned definition is immutable for the session's lifetime.
#[async_trait]
pub trait QuizProvider: Send + Sync {
    /// Human-readable provider name (e.g. "http").
    fn name(&self) -> &str;

    /// Fetch the definition for an opaque quiz reference.
    async fn fetch(&self, quiz_ref: &str) -> anyhow::Result<QuizDefinition>;
}

/// Destination for completed quiz attempts.
///
/// A session sends at most one logically distinct submission; manual retries
/// resend the identical payload (same `attempt_id`). Deduplicating
/// network-level repeats is the sink's concern.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Human-readable sink name (e.g. "http").
    fn name(&self) -> &str;

    /// Deliver one submission. The receipt carries the authoritative score.
    async fn submit(&self, payload: &SubmissionPayload) -> anyhow::Result<SubmissionReceipt>;
}

/// The one logical submission a session produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub quiz_id: String,
    /// Stable across retries of the same logical submission.
    pub attempt_id: Uuid,
    pub student_name: String,
    /// All answer slots in quiz order, including unanswered ones.
    pub answers: Vec<Answer>,
    pub violation_count: u32,
    pub elapsed_seconds: u64,
}

/// What the sink returns for an accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Authoritative score in percent, computed by the sink. The client's
    /// own score is display-only and must not be trusted.
    pub score: f64,
    #[serde(default)]
    pub correct_count: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}
