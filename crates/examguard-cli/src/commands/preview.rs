//! The `examguard preview` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examguard_core::timer::format_clock;

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let quiz = examguard_core::parser::parse_quiz(&quiz_path)?;

    println!("{}", quiz.title);
    if !quiz.instructions.is_empty() {
        println!("{}", quiz.instructions);
    }
    println!(
        "Time limit: {} | Tab-switch detection: {} | Screenshot protection: {}",
        format_clock(quiz.duration_seconds()),
        if quiz.security.tab_switch_detection { "on" } else { "off" },
        if quiz.security.screenshot_protection { "on" } else { "off" },
    );

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Options"]);

    // Redacted view only: the answer key must never reach a quiz taker.
    for (i, question) in quiz.questions.iter().enumerate() {
        let redacted = question.redacted();
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&redacted.prompt),
            Cell::new(redacted.options.join("\n")),
        ]);
    }

    println!("\n{table}");
    Ok(())
}
