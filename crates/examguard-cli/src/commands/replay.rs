//! The `examguard replay` command.
//!
//! Drives a full session from a scripted event stream, one simulated
//! second at a time, then delivers the submission and writes a report.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examguard_core::guard::KeyInput;
use examguard_core::monitor::Visibility;
use examguard_core::parser;
use examguard_core::report::SessionReport;
use examguard_core::session::{
    Effect, PlatformEvent, Session, SessionState, SubmitDecision, SubmitOutcome, SubmitReason,
};
use examguard_sink::{load_config_from, HttpSink, MockSink};

use crate::script::{self, ScriptEntry, ScriptStep};

pub async fn execute(
    quiz_path: PathBuf,
    script_path: PathBuf,
    student: String,
    dry_run: bool,
    output: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let quiz = parser::parse_quiz(&quiz_path)?;
    let entries = script::load_script(&script_path)?;

    let duration = quiz.duration_seconds();
    let mut session = Session::new(quiz, config.session_config());
    session.start(&student)?;

    eprintln!(
        "Replaying {} events over up to {} seconds",
        entries.len(),
        duration
    );

    let pending = run_script(&mut session, &entries, duration)?;

    let Some(reason) = pending else {
        anyhow::bail!("script finished without a submission (state: {:?})", session.state());
    };

    eprintln!("Submitting ({reason:?})...");

    // The client-side score uses the bundled answer key, so it is
    // display-only; a dry run echoes it back as the receipt score.
    let (client_score, correct_count) = session.client_score();

    let outcome = if dry_run {
        let sink = MockSink::with_score(client_score).with_correct_count(correct_count as u32);
        session.submit(&sink).await?
    } else {
        let sink = HttpSink::new(&config.sink.base_url, config.sink.api_token.clone());
        session.submit(&sink).await?
    };

    match outcome {
        SubmitOutcome::Accepted(result) => {
            print_summary(&session, &result);

            let report = SessionReport::from_session(&session, &result);
            std::fs::create_dir_all(&output)?;
            let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
            let path = output.join(format!("report-{timestamp}.json"));
            report.save_json(&path)?;
            eprintln!("Report saved to: {}", path.display());
            Ok(())
        }
        SubmitOutcome::Failed { error, recovered } => {
            if recovered {
                eprintln!("Submission failed; session returned to in-progress.");
            } else {
                eprintln!("Submission failed; the attempt is locked awaiting a retry.");
            }
            Err(error.context("submission failed"))
        }
    }
}

/// Deliver script entries and ticks until a submission is requested.
fn run_script(
    session: &mut Session,
    entries: &[ScriptEntry],
    duration: u32,
) -> Result<Option<SubmitReason>> {
    let mut next = 0;

    for sec in 0..=duration {
        while next < entries.len() && entries[next].at_secs <= sec {
            if let Some(reason) = apply_step(session, &entries[next].step) {
                return Ok(Some(reason));
            }
            next += 1;
        }

        for effect in session.handle_event(PlatformEvent::Tick) {
            if let Some(reason) = report_effect(sec, &effect) {
                return Ok(Some(reason));
            }
        }

        if session.state() != SessionState::InProgress {
            break;
        }
    }

    Ok(None)
}

fn apply_step(session: &mut Session, step: &ScriptStep) -> Option<SubmitReason> {
    let sec = session.elapsed_seconds();
    let events = match step {
        ScriptStep::Hidden => vec![PlatformEvent::VisibilityChanged(Visibility::Hidden)],
        ScriptStep::Visible => vec![PlatformEvent::VisibilityChanged(Visibility::Visible)],
        ScriptStep::Answer { question, option } => {
            if !session.select_answer(question, *option) {
                eprintln!("  [{sec}s] ignored answer for unknown question '{question}'");
            }
            vec![]
        }
        ScriptStep::KeyDown { key, meta } => vec![PlatformEvent::KeyDown(KeyInput {
            key: key.clone(),
            meta: *meta,
            ctrl: false,
            shift: false,
        })],
        ScriptStep::KeyUp { key, meta } => vec![PlatformEvent::KeyUp(KeyInput {
            key: key.clone(),
            meta: *meta,
            ctrl: false,
            shift: false,
        })],
        ScriptStep::Copy => vec![PlatformEvent::Copy],
        ScriptStep::ContextMenu => vec![PlatformEvent::ContextMenu],
        ScriptStep::SelectStart => vec![PlatformEvent::SelectStart],
        ScriptStep::Submit => {
            match session.request_submit(SubmitReason::Manual) {
                SubmitDecision::Accepted => return Some(SubmitReason::Manual),
                SubmitDecision::NeedsConfirmation { unanswered } => {
                    eprintln!(
                        "  [{sec}s] {unanswered} unanswered question(s); waiting for confirm/decline"
                    );
                }
                SubmitDecision::Ignored => {}
            }
            vec![]
        }
        ScriptStep::Confirm => {
            if session.confirm_submit() == SubmitDecision::Accepted {
                return Some(SubmitReason::Manual);
            }
            vec![]
        }
        ScriptStep::Decline => {
            session.decline_submit();
            eprintln!("  [{sec}s] submission declined, continuing");
            vec![]
        }
    };

    for event in events {
        for effect in session.handle_event(event) {
            if let Some(reason) = report_effect(sec, &effect) {
                return Some(reason);
            }
        }
    }
    None
}

/// Narrate an effect; returns the reason when a submission fires.
fn report_effect(sec: u32, effect: &Effect) -> Option<SubmitReason> {
    match effect {
        Effect::SubmitRequested(reason) => return Some(*reason),
        Effect::WarningShown { count, limit } => {
            eprintln!("  [{sec}s] violation warning {count}/{limit}");
        }
        Effect::WarningCleared => eprintln!("  [{sec}s] warning cleared"),
        Effect::BlackoutChanged(true) => eprintln!("  [{sec}s] content hidden"),
        Effect::BlackoutChanged(false) => eprintln!("  [{sec}s] content restored"),
        Effect::SuppressDefault => {}
    }
    None
}

fn print_summary(session: &Session, result: &examguard_core::session::SessionResult) {
    let mut table = Table::new();
    table.set_header(vec!["Student", "Quiz", "Score", "Correct", "Violations", "Elapsed"]);
    table.add_row(vec![
        Cell::new(session.student_name()),
        Cell::new(&session.quiz().title),
        Cell::new(format!("{:.1}%", result.receipt.score)),
        Cell::new(format!(
            "{}/{}",
            result.correct_count, result.total_questions
        )),
        Cell::new(session.violation_count()),
        Cell::new(format!("{}s", session.elapsed_seconds())),
    ]);

    eprintln!("\n{table}");
}
