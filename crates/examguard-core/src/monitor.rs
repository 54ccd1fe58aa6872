//! Tab-switch integrity monitoring.
//!
//! Watches platform visibility notifications while a session is in
//! progress, counts violations on each visible-to-hidden edge, and applies
//! the escalation policy: warnings up to the limit, auto-submission at it.

use serde::{Deserialize, Serialize};

/// Platform visibility of the quiz surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Escalation policy. These are configuration values, not constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityPolicy {
    /// Violation count at which the session is auto-submitted.
    #[serde(default = "default_violation_limit")]
    pub violation_limit: u32,
    /// How long a warning banner stays up, in seconds of session time.
    #[serde(default = "default_warning_secs")]
    pub warning_secs: u32,
}

fn default_violation_limit() -> u32 {
    3
}

fn default_warning_secs() -> u32 {
    5
}

impl Default for IntegrityPolicy {
    fn default() -> Self {
        Self {
            violation_limit: default_violation_limit(),
            warning_secs: default_warning_secs(),
        }
    }
}

/// Where the session sits in the escalation ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityPhase {
    /// No outstanding warning.
    Calm,
    /// A warning banner is up until `clears_at` seconds of session time.
    Warning { count: u32, clears_at: u32 },
    /// The limit was reached; the session is ending. Never clears.
    Escalated { count: u32 },
}

/// What the session should do after a visibility notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityAction {
    None,
    /// Show the warning banner.
    Warn { count: u32, limit: u32 },
    /// Auto-submit the session.
    Escalate { count: u32 },
}

#[derive(Debug, Clone)]
pub struct IntegrityMonitor {
    policy: IntegrityPolicy,
    /// The quiz's `tab_switch_detection` flag.
    enabled: bool,
    /// Subscribed, i.e. the session is in progress.
    active: bool,
    visibility: Visibility,
    violations: u32,
    phase: IntegrityPhase,
}

impl IntegrityMonitor {
    pub fn new(policy: IntegrityPolicy, enabled: bool) -> Self {
        Self {
            policy,
            enabled,
            active: false,
            visibility: Visibility::Visible,
            violations: 0,
            phase: IntegrityPhase::Calm,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Unsubscribe. No notification observed after this call has any effect.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Monotone while the session runs; reset only by a new session.
    pub fn violations(&self) -> u32 {
        self.violations
    }

    pub fn phase(&self) -> IntegrityPhase {
        self.phase
    }

    /// Process a visibility notification at `elapsed` seconds of session
    /// time. Only a visible-to-hidden edge counts: a repeated "hidden"
    /// notification does not double-count, while rapid hide/show/hide
    /// sequences count once per hide.
    pub fn observe(&mut self, visibility: Visibility, elapsed: u32) -> IntegrityAction {
        if !self.active || !self.enabled {
            return IntegrityAction::None;
        }
        let was = self.visibility;
        self.visibility = visibility;
        if visibility != Visibility::Hidden || was == Visibility::Hidden {
            return IntegrityAction::None;
        }

        self.violations += 1;
        tracing::warn!(
            violations = self.violations,
            limit = self.policy.violation_limit,
            "integrity violation detected"
        );

        if self.violations >= self.policy.violation_limit {
            self.phase = IntegrityPhase::Escalated {
                count: self.violations,
            };
            IntegrityAction::Escalate {
                count: self.violations,
            }
        } else {
            self.phase = IntegrityPhase::Warning {
                count: self.violations,
                clears_at: elapsed + self.policy.warning_secs,
            };
            IntegrityAction::Warn {
                count: self.violations,
                limit: self.policy.violation_limit,
            }
        }
    }

    /// Banner housekeeping, driven by the session tick stream. Returns true
    /// when a warning banner just cleared.
    pub fn tick(&mut self, elapsed: u32) -> bool {
        if let IntegrityPhase::Warning { clears_at, .. } = self.phase {
            if elapsed >= clears_at {
                self.phase = IntegrityPhase::Calm;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_monitor(policy: IntegrityPolicy) -> IntegrityMonitor {
        let mut m = IntegrityMonitor::new(policy, true);
        m.activate();
        m
    }

    #[test]
    fn counts_each_hide_edge() {
        let mut m = active_monitor(IntegrityPolicy::default());
        assert!(matches!(
            m.observe(Visibility::Hidden, 1),
            IntegrityAction::Warn { count: 1, limit: 3 }
        ));
        m.observe(Visibility::Visible, 2);
        assert!(matches!(
            m.observe(Visibility::Hidden, 3),
            IntegrityAction::Warn { count: 2, .. }
        ));
        assert_eq!(m.violations(), 2);
    }

    #[test]
    fn repeated_hidden_does_not_double_count() {
        let mut m = active_monitor(IntegrityPolicy::default());
        m.observe(Visibility::Hidden, 1);
        assert_eq!(m.observe(Visibility::Hidden, 2), IntegrityAction::None);
        assert_eq!(m.violations(), 1);
    }

    #[test]
    fn escalates_at_configured_limit() {
        let mut m = active_monitor(IntegrityPolicy {
            violation_limit: 2,
            warning_secs: 5,
        });
        m.observe(Visibility::Hidden, 1);
        m.observe(Visibility::Visible, 2);
        assert!(matches!(
            m.observe(Visibility::Hidden, 3),
            IntegrityAction::Escalate { count: 2 }
        ));
        assert!(matches!(m.phase(), IntegrityPhase::Escalated { count: 2 }));
    }

    #[test]
    fn disabled_flag_never_counts() {
        let mut m = IntegrityMonitor::new(IntegrityPolicy::default(), false);
        m.activate();
        for _ in 0..5 {
            assert_eq!(m.observe(Visibility::Hidden, 0), IntegrityAction::None);
            m.observe(Visibility::Visible, 0);
        }
        assert_eq!(m.violations(), 0);
    }

    #[test]
    fn deactivated_monitor_is_inert() {
        let mut m = active_monitor(IntegrityPolicy::default());
        m.deactivate();
        assert_eq!(m.observe(Visibility::Hidden, 1), IntegrityAction::None);
        assert_eq!(m.violations(), 0);
    }

    #[test]
    fn warning_clears_after_configured_window() {
        let mut m = active_monitor(IntegrityPolicy {
            violation_limit: 3,
            warning_secs: 5,
        });
        m.observe(Visibility::Hidden, 10);
        assert!(matches!(m.phase(), IntegrityPhase::Warning { clears_at: 15, .. }));
        assert!(!m.tick(14));
        assert!(m.tick(15));
        assert_eq!(m.phase(), IntegrityPhase::Calm);
        // Violation count is untouched by banner dismissal.
        assert_eq!(m.violations(), 1);
    }

    #[test]
    fn escalated_banner_never_clears() {
        let mut m = active_monitor(IntegrityPolicy {
            violation_limit: 1,
            warning_secs: 5,
        });
        m.observe(Visibility::Hidden, 0);
        assert!(!m.tick(100));
        assert!(matches!(m.phase(), IntegrityPhase::Escalated { .. }));
    }
}
