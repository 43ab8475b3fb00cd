//! The `eduplatform init` command.

use std::path::Path;

use anyhow::Result;

use eduplatform_client::config::STARTER_CONFIG;

pub fn execute() -> Result<()> {
    if Path::new("eduplatform.toml").exists() {
        println!("eduplatform.toml already exists, skipping.");
    } else {
        std::fs::write("eduplatform.toml", STARTER_CONFIG)?;
        println!("Created eduplatform.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point backend_url in eduplatform.toml at your server");
    println!("  2. Run: eduplatform register --email you@example.com --name \"Your Name\"");
    println!("  3. Run: eduplatform dashboard");

    Ok(())
}
