//! Event scripts for the `replay` command.
//!
//! A script is a TOML file of timestamped steps that stand in for the
//! platform events a live client would deliver.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// A single scripted step.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptStep {
    /// The quiz surface lost visibility (tab switch, minimize).
    Hidden,
    /// The quiz surface became visible again.
    Visible,
    /// Select an option for a question.
    Answer { question: String, option: usize },
    KeyDown {
        key: String,
        #[serde(default)]
        meta: bool,
    },
    KeyUp {
        key: String,
        #[serde(default)]
        meta: bool,
    },
    Copy,
    ContextMenu,
    SelectStart,
    /// Request a manual submit.
    Submit,
    /// Confirm a pending submit-with-unanswered prompt.
    Confirm,
    /// Decline it and keep working.
    Decline,
}

/// A step plus the session second it fires at.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEntry {
    /// Seconds since the session started.
    pub at_secs: u32,
    #[serde(flatten)]
    pub step: ScriptStep,
}

#[derive(Debug, Deserialize)]
struct ScriptFile {
    #[serde(default)]
    events: Vec<ScriptEntry>,
}

/// Load a script file, ordered by timestamp.
pub fn load_script(path: &Path) -> Result<Vec<ScriptEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script: {}", path.display()))?;
    parse_script(&content, path)
}

pub fn parse_script(content: &str, source_path: &Path) -> Result<Vec<ScriptEntry>> {
    let parsed: ScriptFile = toml::from_str(content)
        .with_context(|| format!("failed to parse script: {}", source_path.display()))?;

    let mut events = parsed.events;
    events.sort_by_key(|e| e.at_secs);
    Ok(events)
}
