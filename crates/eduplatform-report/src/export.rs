//! Chat transcript download.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use eduplatform_core::chat::{export_file_name, Transcript};

/// Write the plain-text export of `transcript` into `dir`, named for `date`.
pub fn write_transcript(transcript: &Transcript, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(export_file_name(date));
    std::fs::write(&path, transcript.export())
        .with_context(|| format!("failed to write transcript: {}", path.display()))?;
    Ok(path)
}
