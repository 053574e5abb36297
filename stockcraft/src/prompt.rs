//! Interactive target entry

use crate::formatter;
use anyhow::{Context, Result};
use colored::*;
use dialoguer::Input;
use stockcraft_core::Session;

/// Ask for box and piece targets for every item, showing a live preview
///
/// Existing targets are offered as defaults, so a targets file can be
/// loaded first and only adjusted here.
pub fn enter_targets(session: &mut Session) -> Result<()> {
    let items = session.items().to_vec();
    println!(
        "{}",
        format!("Set target stock for {} items", items.len()).bold()
    );

    for (n, item) in items.iter().enumerate() {
        println!();
        println!(
            "[{}/{}] {} {}",
            n + 1,
            items.len(),
            item.material_no.as_str().cyan().bold(),
            item.description
        );
        println!(
            "  {} {} boxes, {} pieces, {} per box",
            "Current:".bold(),
            display(item.stock_boxes),
            display(item.stock_pieces),
            display(item.pieces_per_box)
        );

        let (default_boxes, default_pieces) = session
            .targets()
            .get(&item.material_no)
            .map(|t| (t.boxes, t.pieces))
            .unwrap_or((0, 0));

        let boxes = ask("  Target boxes", default_boxes)?;
        let pieces = ask("  Target pieces", default_pieces)?;
        session
            .set_target(&item.material_no, boxes, pieces)
            .with_context(|| format!("Failed to set target for Material {}", item.material_no))?;

        match session.preview(&item.material_no) {
            Some(row) => println!("  {} {}", "Preview:".bold(), formatter::preview_line(&row)),
            None => println!(
                "  {}",
                "Stock quantities are incomplete; this item will be skipped.".yellow()
            ),
        }
    }
    println!();
    Ok(())
}

fn ask(prompt: &str, default: i64) -> Result<i64> {
    let value = Input::<i64>::new()
        .with_prompt(prompt)
        .default(default)
        .validate_with(|value: &i64| -> Result<(), &'static str> {
            if *value >= 0 {
                Ok(())
            } else {
                Err("Target must not be negative")
            }
        })
        .interact_text()
        .context("Failed to read target")?;
    Ok(value)
}

fn display(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
}
