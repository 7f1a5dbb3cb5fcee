//! The `quizforge types` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(json: bool, config_path: Option<PathBuf>) -> Result<()> {
    use comfy_table::{Cell, Table};

    let engine = super::engine_from_config(config_path.as_deref())?;
    let status = engine.status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let yes_no = |flag: bool| if flag { "yes" } else { "no" };

    let mut table = Table::new();
    table.set_header(vec![
        "Type",
        "Name",
        "Registered",
        "Enabled",
        "Production",
        "Partial credit",
    ]);
    for row in &status {
        table.add_row(vec![
            Cell::new(row.question_type),
            Cell::new(row.display_name.as_deref().unwrap_or("-")),
            Cell::new(yes_no(row.registered)),
            Cell::new(yes_no(row.enabled)),
            Cell::new(yes_no(row.production_ready)),
            Cell::new(yes_no(row.supports_partial_credit)),
        ]);
    }
    println!("{table}");

    let production = engine.production_types();
    println!(
        "\n{} of {} known types in production",
        production.len(),
        status.len()
    );

    Ok(())
}
