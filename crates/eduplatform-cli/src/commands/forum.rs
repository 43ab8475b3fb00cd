//! The `eduplatform forum` commands.

use std::path::Path;

use anyhow::{bail, Result};
use comfy_table::{Cell, Table};

use eduplatform_core::forum::ForumBoard;
use eduplatform_core::model::{Category, NewPost};
use eduplatform_core::session::Route;

use super::{api_error, App};

pub async fn list(
    config_path: Option<&Path>,
    category: Option<Category>,
    search: Option<String>,
) -> Result<()> {
    let app = App::signed_in(config_path, Route::Forum).await?;
    let mut board = ForumBoard::new(&app.session, app.config.forum_page_size);
    board.select_category(category).await.map_err(api_error)?;
    board.set_search(search.unwrap_or_default());

    let visible = board.visible();
    if visible.is_empty() {
        println!("No posts found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Title", "Category", "Author", "Posted", "Likes"]);
    for post in visible {
        table.add_row(vec![
            Cell::new(&post.title),
            Cell::new(post.category.label()),
            Cell::new(&post.author_name),
            Cell::new(post.created_at.format("%Y-%m-%d %H:%M")),
            Cell::new(post.likes),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn post(
    config_path: Option<&Path>,
    title: String,
    content: String,
    category: Category,
) -> Result<()> {
    if title.trim().is_empty() || content.trim().is_empty() {
        bail!("title and content are required");
    }

    let app = App::signed_in(config_path, Route::Forum).await?;
    let mut board = ForumBoard::new(&app.session, app.config.forum_page_size);
    let created = board
        .create_post(NewPost {
            title,
            content,
            category,
        })
        .await
        .map_err(api_error)?;

    println!(
        "Posted \"{}\" in {} as {}",
        created.title,
        created.category.label(),
        created.author_name
    );
    Ok(())
}
