//! The `edukit init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create edukit.toml
    if std::path::Path::new("edukit.toml").exists() {
        println!("edukit.toml already exists, skipping.");
    } else {
        std::fs::write("edukit.toml", SAMPLE_CONFIG)?;
        println!("Created edukit.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit edukit.toml with your persistence-service URL and token");
    println!("  2. Run: edukit validate --quiz quizzes/example.toml");
    println!("  3. Run: edukit grade --quiz quizzes/example.toml --answers answers.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# edukit configuration

base_url = "http://localhost:8080"
api_token = "${EDUKIT_API_TOKEN}"
pass_threshold = 70
timeout_secs = 30
output_dir = "./edukit-results"
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
title = "Getting Started"
description = "A small example quiz covering every question type"
difficulty = "basic"
assessment_type = "mixed"
time_limit_minutes = 5

[[questions]]
text = "Which planet is closest to the sun?"
type = "single_choice"
options = ["Venus", "Mercury", "Earth", "Mars"]
correct_index = 1
explanation = "Mercury orbits at about 58 million km."

[[questions]]
text = "Which of these are prime numbers?"
type = "multi_choice"
points = 2
options = ["2", "4", "7", "9"]
correct_indexes = [0, 2]

[[questions]]
text = "What is the chemical symbol for water?"
type = "fill_blank"
accepted_answers = ["H2O", "h2o"]
"#;
