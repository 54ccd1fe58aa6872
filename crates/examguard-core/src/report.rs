//! Session result report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Answer;
use crate::session::{Session, SessionResult};

/// A completed attempt, as written to disk after submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub attempt_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub quiz: QuizSummary,
    pub student_name: String,
    /// The sink's authoritative score.
    pub score: f64,
    /// Display-only score computed client-side.
    pub client_score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub violation_count: u32,
    pub elapsed_seconds: u64,
    pub answers: Vec<Answer>,
}

/// Summary of the quiz (without the full question definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub question_count: usize,
}

impl SessionReport {
    /// Build a report from a terminated session and its submission result.
    pub fn from_session(session: &Session, result: &SessionResult) -> Self {
        Self {
            attempt_id: session.attempt_id(),
            created_at: Utc::now(),
            quiz: QuizSummary {
                id: session.quiz().id.clone(),
                title: session.quiz().title.clone(),
                question_count: session.quiz().questions.len(),
            },
            student_name: session.student_name().to_string(),
            score: result.receipt.score,
            client_score: result.client_score,
            correct_count: result.correct_count,
            total_questions: result.total_questions,
            violation_count: session.violation_count(),
            elapsed_seconds: u64::from(session.elapsed_seconds()),
            answers: session.answers().to_vec(),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
