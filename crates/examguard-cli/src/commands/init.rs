//! The `examguard init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create examguard.toml
    if std::path::Path::new("examguard.toml").exists() {
        println!("examguard.toml already exists, skipping.");
    } else {
        std::fs::write("examguard.toml", SAMPLE_CONFIG)?;
        println!("Created examguard.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let quiz_path = std::path::Path::new("quizzes/example.toml");
    if quiz_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(quiz_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    // Create example replay script
    std::fs::create_dir_all("scripts")?;
    let script_path = std::path::Path::new("scripts/example.toml");
    if script_path.exists() {
        println!("scripts/example.toml already exists, skipping.");
    } else {
        std::fs::write(script_path, EXAMPLE_SCRIPT)?;
        println!("Created scripts/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit examguard.toml with your platform URL and API token");
    println!("  2. Run: examguard validate --quiz quizzes/example.toml");
    println!("  3. Run: examguard replay --quiz quizzes/example.toml --script scripts/example.toml --dry-run");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examguard configuration

output_dir = "./examguard-results"

[sink]
base_url = "http://localhost:8080"
api_token = "${EXAMGUARD_API_TOKEN}"

[integrity]
violation_limit = 3
warning_secs = 5

[guard]
capture_keys = ["PrintScreen"]
meta_is_capture = true
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "1"
url_id = "js-intro-2024"
title = "Introduction to JavaScript"
instructions = "Read each question carefully and select the best answer. You have 45 minutes to complete this quiz. Do not switch tabs or take screenshots during the quiz."
duration_minutes = 45

[quiz.security]
tab_switch_detection = true
screenshot_protection = true

[[questions]]
id = "q1"
prompt = "What is JavaScript primarily used for?"
options = [
    "Creating databases",
    "Making web pages interactive",
    "Designing graphics",
    "Managing servers",
]
correct_option = 1

[[questions]]
id = "q2"
prompt = "Which keyword is used to declare a variable in JavaScript?"
options = ["var", "let", "const", "All of the above"]
correct_option = 3

[[questions]]
id = "q3"
prompt = "What does DOM stand for?"
options = [
    "Document Object Model",
    "Data Object Management",
    "Digital Output Method",
    "Dynamic Object Manipulation",
]
correct_option = 0

[[questions]]
id = "q4"
prompt = "Which operator is used for strict equality in JavaScript?"
options = ["==", "===", "=", "!="]
correct_option = 1

[[questions]]
id = "q5"
prompt = "What is the output of: console.log(typeof [])?"
options = ["array", "object", "list", "undefined"]
correct_option = 1
"#;

const EXAMPLE_SCRIPT: &str = r#"# A scripted session: answer every question, switch away once, submit.

[[events]]
at_secs = 5
kind = "answer"
question = "q1"
option = 1

[[events]]
at_secs = 10
kind = "answer"
question = "q2"
option = 3

[[events]]
at_secs = 15
kind = "answer"
question = "q3"
option = 0

[[events]]
at_secs = 20
kind = "answer"
question = "q4"
option = 2

[[events]]
at_secs = 25
kind = "answer"
question = "q5"
option = 1

[[events]]
at_secs = 30
kind = "hidden"

[[events]]
at_secs = 32
kind = "visible"

[[events]]
at_secs = 60
kind = "submit"
"#;
