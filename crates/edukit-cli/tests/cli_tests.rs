//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn edukit() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("edukit").unwrap()
}

#[test]
fn validate_valid_quiz() {
    edukit()
        .arg("validate")
        .arg("--quiz")
        .arg("../../quizzes/capitals.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("European Capitals"))
        .stdout(predicate::str::contains("3 questions"))
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn validate_directory() {
    edukit()
        .arg("validate")
        .arg("--quiz")
        .arg("../../quizzes")
        .assert()
        .success()
        .stdout(predicate::str::contains("European Capitals"))
        .stdout(predicate::str::contains("General Science"));
}

#[test]
fn validate_nonexistent_file() {
    edukit()
        .arg("validate")
        .arg("--quiz")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_flags_excluded_question() {
    let dir = TempDir::new().unwrap();
    let quiz = r#"
[quiz]
title = "Single choice only"
assessment_type = "quiz"

[[questions]]
text = "Pick one"
options = ["a", "b"]
correct_index = 0

[[questions]]
text = "Fill this in"
type = "fill_blank"
accepted_answers = ["x"]
"#;
    let path = dir.path().join("mismatch.toml");
    std::fs::write(&path, quiz).unwrap();

    edukit()
        .arg("validate")
        .arg("--quiz")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("will be excluded"))
        .stdout(predicate::str::contains("issue(s) found"));
}

#[test]
fn grade_full_marks() {
    let dir = TempDir::new().unwrap();
    let answers = r#"{ "1": 0, "2": [0, 2], "3": "rome" }"#;
    let answers_path = dir.path().join("answers.json");
    std::fs::write(&answers_path, answers).unwrap();

    edukit()
        .arg("grade")
        .arg("--quiz")
        .arg("../../quizzes/capitals.toml")
        .arg("--answers")
        .arg(&answers_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 100 (3/3 correct)"))
        .stdout(predicate::str::contains("Result: PASS (threshold 70)"));
}

#[test]
fn grade_partial_answers_fail_strict_threshold() {
    let dir = TempDir::new().unwrap();
    // Correct single choice, wrong multi select, blank unanswered.
    let answers = r#"{ "1": 0, "2": [1] }"#;
    let answers_path = dir.path().join("answers.json");
    std::fs::write(&answers_path, answers).unwrap();

    edukit()
        .arg("grade")
        .arg("--quiz")
        .arg("../../quizzes/capitals.toml")
        .arg("--answers")
        .arg(&answers_path)
        .arg("--threshold")
        .arg("50")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 33 (1/3 correct)"))
        .stdout(predicate::str::contains("Result: FAIL (threshold 50)"));
}

#[test]
fn grade_rejects_malformed_answers() {
    let dir = TempDir::new().unwrap();
    let answers_path = dir.path().join("answers.json");
    std::fs::write(&answers_path, "{ not json").unwrap();

    edukit()
        .arg("grade")
        .arg("--quiz")
        .arg("../../quizzes/capitals.toml")
        .arg("--answers")
        .arg(&answers_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    edukit()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created edukit.toml"))
        .stdout(predicate::str::contains("Created quizzes/example.toml"));

    assert!(dir.path().join("edukit.toml").exists());
    assert!(dir.path().join("quizzes/example.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    edukit()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    edukit()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_then_validate_example() {
    let dir = TempDir::new().unwrap();

    edukit()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    edukit()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--quiz")
        .arg("quizzes/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn help_lists_subcommands() {
    edukit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("grade"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("init"));
}
