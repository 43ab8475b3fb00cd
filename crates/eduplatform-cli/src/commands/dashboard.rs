//! The `eduplatform dashboard` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};

use eduplatform_core::dashboard::Dashboard;
use eduplatform_core::session::Route;

use super::{api_error, App};

pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let app = App::signed_in(config_path, Route::Dashboard).await?;
    let mut dashboard = Dashboard::new(&app.session);
    dashboard.load().await.map_err(api_error)?;

    let Some(stats) = dashboard.stats() else {
        return Ok(());
    };
    let user_stats = &stats.user_stats;

    if let Some(user) = app.session.user() {
        println!("Welcome back, {}!\n", user.full_name);
    }

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Points"),
        Cell::new(user_stats.total_points),
    ]);
    table.add_row(vec![
        Cell::new("Level"),
        Cell::new(&user_stats.current_level),
    ]);
    table.add_row(vec![
        Cell::new("Modules"),
        Cell::new(format!(
            "{}/{} ({}%)",
            user_stats.completed_modules,
            user_stats.total_modules,
            dashboard.module_progress()
        )),
    ]);
    table.add_row(vec![
        Cell::new("Completion"),
        Cell::new(format!("{:.1}%", user_stats.completion_rate)),
    ]);
    table.add_row(vec![
        Cell::new("Badges"),
        Cell::new(user_stats.badges.len()),
    ]);
    table.add_row(vec![
        Cell::new("Recent chats"),
        Cell::new(stats.recent_activities.chats.len()),
    ]);
    table.add_row(vec![
        Cell::new("Recent quizzes"),
        Cell::new(stats.recent_activities.quizzes.len()),
    ]);
    println!("{table}");

    Ok(())
}
