//! Capture-deterrence: screenshot-key blackout and copy suppression.
//!
//! Best-effort only. A hosted client cannot stop OS-level screen capture;
//! this discourages casual screenshots and copying, nothing more, and must
//! never be presented to end users as a guarantee.

use serde::{Deserialize, Serialize};

/// A key event as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    /// Platform key name, e.g. `"PrintScreen"` or `"Shift"`.
    pub key: String,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyInput {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            meta: false,
            ctrl: false,
            shift: false,
        }
    }
}

/// Which key combinations count as capture attempts. Configuration, not
/// hardcoded constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardPolicy {
    /// Dedicated capture keys.
    #[serde(default = "default_capture_keys")]
    pub capture_keys: Vec<String>,
    /// Treat any meta/command chord as a capture attempt, as the upstream
    /// client does.
    #[serde(default = "default_meta_is_capture")]
    pub meta_is_capture: bool,
}

fn default_capture_keys() -> Vec<String> {
    vec!["PrintScreen".to_string()]
}

fn default_meta_is_capture() -> bool {
    true
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            capture_keys: default_capture_keys(),
            meta_is_capture: default_meta_is_capture(),
        }
    }
}

/// What the presentation layer should do with an observed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    /// Let the event through.
    Pass,
    /// Cancel the event's default behavior.
    Suppress,
    /// Cancel the event and blank the quiz content.
    SuppressAndHide,
    /// Restore the quiz content.
    Reveal,
}

#[derive(Debug, Clone)]
pub struct CaptureGuard {
    policy: GuardPolicy,
    /// The quiz's `screenshot_protection` flag.
    screenshot_protection: bool,
    /// Subscribed, i.e. the session is in progress.
    active: bool,
    content_hidden: bool,
}

impl CaptureGuard {
    pub fn new(policy: GuardPolicy, screenshot_protection: bool) -> Self {
        Self {
            policy,
            screenshot_protection,
            active: false,
            content_hidden: false,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Unsubscribe and restore content visibility.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.content_hidden = false;
    }

    /// Whether the presentation layer should blank the quiz content.
    pub fn content_hidden(&self) -> bool {
        self.content_hidden
    }

    fn is_capture(&self, key: &KeyInput) -> bool {
        (self.policy.meta_is_capture && key.meta)
            || self.policy.capture_keys.iter().any(|k| k == &key.key)
    }

    /// Key pressed. Matching a capture combination blanks the content and
    /// cancels the event.
    pub fn key_down(&mut self, key: &KeyInput) -> GuardAction {
        if !self.active || !self.screenshot_protection {
            return GuardAction::Pass;
        }
        if self.is_capture(key) {
            self.content_hidden = true;
            GuardAction::SuppressAndHide
        } else {
            GuardAction::Pass
        }
    }

    /// Key released. Upstream quirk kept deliberately: any non-capture
    /// key-up restores visibility, even one released mid-chord.
    pub fn key_up(&mut self, key: &KeyInput) -> GuardAction {
        if !self.active || !self.screenshot_protection {
            return GuardAction::Pass;
        }
        if !self.is_capture(key) && self.content_hidden {
            self.content_hidden = false;
            GuardAction::Reveal
        } else {
            GuardAction::Pass
        }
    }

    /// Context-menu, select-start, and copy events are suppressed whenever
    /// the guard is active, independent of the screenshot flag.
    pub fn suppress_copy_event(&self) -> GuardAction {
        if self.active {
            GuardAction::Suppress
        } else {
            GuardAction::Pass
        }
    }
}
