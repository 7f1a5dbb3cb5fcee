//! The `quizforge init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("quizforge.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("question-sets")?;
    write_if_missing(Path::new("question-sets/example.json"), EXAMPLE_QUESTION_SET)?;

    std::fs::create_dir_all("responses")?;
    write_if_missing(Path::new("responses/example.json"), EXAMPLE_RESPONSES)?;

    println!("\nNext steps:");
    println!("  1. Run: quizforge validate --question-set question-sets/example.json");
    println!("  2. Run: quizforge show --question-set question-sets/example.json");
    println!(
        "  3. Run: quizforge grade --question-set question-sets/example.json --responses responses/example.json"
    );

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration
#
# Per-type rollout toggles. Unset fields keep the built-in defaults.
# QUIZFORGE_ENABLED_TYPES / QUIZFORGE_DISABLED_TYPES (comma-separated tags)
# override whatever is set here.

[types.multiple-choice]
enabled = true
production_ready = true

[types.completion]
enabled = true
production_ready = true
"#;

const EXAMPLE_QUESTION_SET: &str = r#"{
  "id": "example",
  "name": "Example Quiz",
  "description": "One question of each built-in type",
  "questions": [
    {
      "id": "capital-of-france",
      "type": "multiple-choice",
      "question": "What is the capital of France?",
      "difficulty": "easy",
      "explanation": "Paris has been the capital of France for most of its history.",
      "content": {
        "options": ["Berlin", "Paris", "Rome", "Madrid"],
        "correctAnswer": "B"
      }
    },
    {
      "id": "weekend-plans",
      "type": "completion",
      "question": "Complete the sentence.",
      "difficulty": "medium",
      "explanation": "Good weather words fit the first blank; the second is a place outdoors.",
      "content": {
        "template": "It was a ___ day, so we went to the ___.",
        "blanks": [
          { "id": "b1", "position": 9, "answer": "sunny", "alternatives": ["nice", "warm"] },
          { "id": "b2", "position": 36, "acceptedAnswers": ["park"], "hint": "somewhere with grass" }
        ]
      }
    }
  ]
}
"#;

const EXAMPLE_RESPONSES: &str = r#"{
  "0": { "type": "multiple-choice", "selectedOption": "B" },
  "1": {
    "type": "completion",
    "answers": [
      { "blankId": "b1", "value": "Sunny" },
      { "blankId": "b2", "value": "garden" }
    ]
  }
}
"#;
