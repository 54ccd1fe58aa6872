//! TOML quiz definition parser.
//!
//! Loads quiz definitions from TOML files and directories, and validates
//! them for common authoring mistakes.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Question, QuizDefinition, SecurityFlags};

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    #[serde(default)]
    url_id: String,
    title: String,
    #[serde(default)]
    instructions: String,
    duration_minutes: u32,
    #[serde(default)]
    security: TomlSecurity,
}

#[derive(Debug, Default, Deserialize)]
struct TomlSecurity {
    #[serde(default)]
    tab_switch_detection: bool,
    #[serde(default)]
    screenshot_protection: bool,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    prompt: String,
    options: Vec<String>,
    correct_option: usize,
}

/// Parse a single TOML file into a `QuizDefinition`.
pub fn parse_quiz(path: &Path) -> Result<QuizDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `QuizDefinition` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<QuizDefinition> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            prompt: q.prompt,
            options: q.options,
            correct_option: q.correct_option,
        })
        .collect();

    Ok(QuizDefinition {
        id: parsed.quiz.id,
        url_id: parsed.quiz.url_id,
        title: parsed.quiz.title,
        instructions: parsed.quiz.instructions,
        duration_minutes: parsed.quiz.duration_minutes,
        security: SecurityFlags {
            tab_switch_detection: parsed.quiz.security.tab_switch_detection,
            screenshot_protection: parsed.quiz.security.screenshot_protection,
        },
        questions,
    })
}

/// Recursively load all `.toml` quiz files from a directory.
pub fn load_quiz_dir(dir: &Path) -> Result<Vec<QuizDefinition>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_dir(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz definition for common issues.
pub fn validate_quiz(quiz: &QuizDefinition) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "quiz has no questions".into(),
        });
    }

    // Duration bounds mirror the authoring form.
    if !(5..=300).contains(&quiz.duration_minutes) {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!(
                "duration is {} minutes; expected 5-300",
                quiz.duration_minutes
            ),
        });
    }

    // Check for duplicate question IDs
    let mut seen_ids = std::collections::HashSet::new();
    for question in &quiz.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    for question in &quiz.questions {
        if question.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "prompt is empty".into(),
            });
        }
        if question.options.len() < 2 {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("only {} option(s); at least 2 required", question.options.len()),
            });
        }
        if question.correct_option >= question.options.len() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!(
                    "correct_option {} is out of range for {} options",
                    question.correct_option,
                    question.options.len()
                ),
            });
        }
    }

    // Standing advisory: these files carry answer keys.
    if !quiz.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "definition includes correct_option answer keys; never serve this file to quiz takers".into(),
        });
    }

    warnings
}
