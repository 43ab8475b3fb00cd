//! The `eduplatform paths` commands.

use std::path::Path;

use anyhow::{bail, Result};
use comfy_table::{Cell, Table};

use eduplatform_core::model::{Difficulty, LearningStyle, PathPreferences};
use eduplatform_core::paths::PathCatalog;
use eduplatform_core::session::Route;

use super::{api_error, App};

pub async fn list(
    config_path: Option<&Path>,
    search: Option<String>,
    difficulty: Option<Difficulty>,
) -> Result<()> {
    let app = App::signed_in(config_path, Route::Learning).await?;
    let mut catalog = PathCatalog::new(&app.session);
    catalog.refresh().await.map_err(api_error)?;

    catalog.set_search(search.unwrap_or_default());
    catalog.set_difficulty(difficulty);
    let visible = catalog.visible();

    if catalog.paths().is_empty() {
        println!("No learning paths yet. Create one with `eduplatform paths generate`.");
        return Ok(());
    }
    if visible.is_empty() {
        println!("No learning paths match.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Title", "Difficulty", "Hours", "Modules", "Created"]);
    for path in visible {
        table.add_row(vec![
            Cell::new(&path.title),
            Cell::new(path.difficulty),
            Cell::new(path.estimated_duration),
            Cell::new(path.modules.len()),
            Cell::new(
                path.created_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn generate(
    config_path: Option<&Path>,
    topics: &str,
    difficulty: Option<Difficulty>,
    style: LearningStyle,
    hours: u32,
    goals: String,
) -> Result<()> {
    let app = App::signed_in(config_path, Route::Learning).await?;

    let mut preferences = PathPreferences::from_topic_list(topics);
    if preferences.topics_of_interest.is_empty() {
        bail!("at least one topic is required");
    }
    preferences.difficulty_preference = difficulty.unwrap_or(app.config.default_difficulty);
    preferences.learning_style = style;
    preferences.time_commitment_hours = hours;
    preferences.learning_goals = goals;

    let mut catalog = PathCatalog::new(&app.session);
    println!("Generating a learning path, this can take a moment...");
    let path = catalog.generate(&preferences).await.map_err(api_error)?;

    println!("\n{} ({}, ~{} h)", path.title, path.difficulty, path.estimated_duration);
    if !path.description.is_empty() {
        println!("{}", path.description);
    }
    if !path.prerequisites.is_empty() {
        println!("Prerequisites: {}", path.prerequisites.join(", "));
    }
    for (i, module) in path.modules.iter().enumerate() {
        match &module.duration {
            Some(duration) => println!("  {}. {} [{duration}]", i + 1, module.title),
            None => println!("  {}. {}", i + 1, module.title),
        }
        if !module.description.is_empty() {
            println!("     {}", module.description);
        }
    }
    Ok(())
}
