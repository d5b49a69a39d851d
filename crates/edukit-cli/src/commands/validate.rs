//! The `edukit validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let drafts = if quiz_path.is_dir() {
        edukit_core::parser::load_quiz_directory(&quiz_path)?
    } else {
        vec![edukit_core::parser::parse_quiz_file(&quiz_path)?]
    };

    let mut total_warnings = 0;

    for draft in &drafts {
        println!("Quiz: {} ({} questions)", draft.title, draft.questions.len());

        let warnings = edukit_core::parser::validate_quiz(draft);
        for w in &warnings {
            let prefix = w
                .question
                .map(|i| format!("  [question {}]", i + 1))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();

        match draft.serialize() {
            Ok(out) => {
                for rejected in &out.rejected {
                    println!("  INVALID: {rejected}");
                    total_warnings += 1;
                }
            }
            Err(e) => {
                println!("  INVALID QUIZ: {e}");
                total_warnings += 1;
            }
        }
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} issue(s) found.");
    }

    Ok(())
}
