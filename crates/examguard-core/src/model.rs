//! Core data model types for examguard.
//!
//! A [`QuizDefinition`] is loaded once per session and treated as immutable
//! for the session's lifetime.

use serde::{Deserialize, Serialize};

/// Anti-cheat features enabled for a quiz.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SecurityFlags {
    /// Count visibility losses (tab switch, window minimize) as violations.
    #[serde(default)]
    pub tab_switch_detection: bool,
    /// Blank the quiz content while a capture shortcut is held down.
    #[serde(default)]
    pub screenshot_protection: bool,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique within the quiz.
    pub id: String,
    /// The question text.
    pub prompt: String,
    /// Ordered option texts (2 or more).
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    ///
    /// Carried here because the upstream system ships the full definition to
    /// the taking client. A trusted deployment must keep scoring on the
    /// submission sink and hand out [`Question::redacted`] views instead;
    /// any score computed from this field is for display only.
    pub correct_option: usize,
}

impl Question {
    /// Client-safe view of this question, without the answer key.
    pub fn redacted(&self) -> RedactedQuestion {
        RedactedQuestion {
            id: self.id.clone(),
            prompt: self.prompt.clone(),
            options: self.options.clone(),
        }
    }
}

/// A question as presented to a quiz taker — no answer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
}

/// A quiz definition, immutable for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDefinition {
    /// Internal identifier.
    pub id: String,
    /// URL-safe public identifier handed out to quiz takers.
    #[serde(default)]
    pub url_id: String,
    /// Title shown on the start screen.
    pub title: String,
    /// Instructions shown before the quiz begins.
    #[serde(default)]
    pub instructions: String,
    /// Time allowed, in minutes.
    pub duration_minutes: u32,
    /// Which proctoring features are enabled.
    #[serde(default)]
    pub security: SecurityFlags,
    /// Questions in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    /// The full countdown, in seconds. Saturates rather than overflowing
    /// on absurd (but parseable) durations; `validate_quiz` flags anything
    /// outside 5-300 minutes.
    pub fn duration_seconds(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }

    /// Look up a question by its id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// One answer slot. Created per question at session start, mutated only by
/// the answer sheet, never removed until session teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    /// `None` until the student picks an option.
    pub selected_option: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> Question {
        Question {
            id: "q1".into(),
            prompt: "What does DOM stand for?".into(),
            options: vec!["Document Object Model".into(), "Data Object Management".into()],
            correct_option: 0,
        }
    }

    #[test]
    fn duration_in_seconds() {
        let quiz = QuizDefinition {
            id: "1".into(),
            url_id: "js-intro-2024".into(),
            title: "Intro".into(),
            instructions: String::new(),
            duration_minutes: 45,
            security: SecurityFlags::default(),
            questions: vec![sample_question()],
        };
        assert_eq!(quiz.duration_seconds(), 2700);
        assert!(quiz.question("q1").is_some());
    }

    #[test]
    fn duration_saturates_instead_of_overflowing() {
        let quiz = QuizDefinition {
            id: "1".into(),
            url_id: String::new(),
            title: "Intro".into(),
            instructions: String::new(),
            duration_minutes: u32::MAX,
            security: SecurityFlags::default(),
            questions: Vec::new(),
        };
        assert_eq!(quiz.duration_seconds(), u32::MAX);
        assert!(quiz.question("nope").is_none());
    }

    #[test]
    fn redacted_drops_answer_key() {
        let q = sample_question();
        let public = q.redacted();
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("correct_option"));
        assert_eq!(public.options.len(), 2);
    }

    #[test]
    fn quiz_serde_roundtrip() {
        let quiz = QuizDefinition {
            id: "1".into(),
            url_id: String::new(),
            title: "Roundtrip".into(),
            instructions: "Read carefully.".into(),
            duration_minutes: 10,
            security: SecurityFlags {
                tab_switch_detection: true,
                screenshot_protection: false,
            },
            questions: vec![sample_question()],
        };
        let json = serde_json::to_string(&quiz).unwrap();
        let back: QuizDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "1");
        assert!(back.security.tab_switch_detection);
        assert!(!back.security.screenshot_protection);
        assert_eq!(back.questions[0].correct_option, 0);
    }
}
