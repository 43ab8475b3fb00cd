//! The `eduplatform profile` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use eduplatform_core::model::{ProfileEdit, User};
use eduplatform_core::session::Route;
use eduplatform_report::{write_certificate, Certificate};

use super::App;

pub async fn execute(
    config_path: Option<&Path>,
    name: Option<String>,
    email: Option<String>,
    certificate_dir: Option<PathBuf>,
) -> Result<()> {
    let mut app = App::signed_in(config_path, Route::Profile).await?;

    let edited = name.is_some() || email.is_some();
    let user = if edited {
        app.session
            .update_profile(ProfileEdit {
                full_name: name,
                email,
                learning_preferences: None,
            })
            .cloned()
    } else {
        app.session.user().cloned()
    }
    .context("no signed-in user")?;

    print_profile(&user);
    if edited {
        println!("(edits apply to this run only and are not saved on the server)");
    }

    if let Some(dir) = certificate_dir {
        let certificate = Certificate::for_user(&user, chrono::Local::now().date_naive());
        let path = write_certificate(&certificate, &dir)?;
        println!("Certificate written to {}", path.display());
    }

    Ok(())
}

fn print_profile(user: &User) {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Name"), Cell::new(&user.full_name)]);
    table.add_row(vec![Cell::new("Email"), Cell::new(&user.email)]);
    table.add_row(vec![
        Cell::new("Badges"),
        Cell::new(if user.badges.is_empty() {
            "-".to_string()
        } else {
            user.badges.join(", ")
        }),
    ]);
    table.add_row(vec![
        Cell::new("Member since"),
        Cell::new(
            user.created_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".into()),
        ),
    ]);
    table.add_row(vec![
        Cell::new("Last login"),
        Cell::new(
            user.last_login
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| "-".into()),
        ),
    ]);
    println!("{table}");
}
