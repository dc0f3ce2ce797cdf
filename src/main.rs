use anyhow::Result;
use std::path::Path;

mod config;
mod error;
mod logging;
mod models;
mod services;

use error::AppError;
use services::file_info::is_spreadsheet;
use services::report::StructureAnalyzer;

fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::Config::from_env()?;
    let analyzer = StructureAnalyzer::new(config);

    match analyzer.run() {
        Ok(saved) => {
            tracing::info!("Analysis finished");
            if let Some(path) = saved.json {
                tracing::info!("JSON report: {}", path.display());
            }
            if let Some(path) = saved.markdown {
                tracing::info!("Markdown report: {}", path.display());
            }
        }
        Err(AppError::FileNotFound(path)) => {
            tracing::error!("File does not exist: {}", path.display());
            list_spreadsheets(Path::new("."));
        }
        Err(e) => tracing::error!("Analysis failed: {}", e),
    }

    Ok(())
}

fn list_spreadsheets(dir: &Path) {
    let cwd = std::env::current_dir().unwrap_or_else(|_| dir.to_path_buf());
    tracing::info!("Current directory: {}", cwd.display());

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot list {}: {}", cwd.display(), e);
            return;
        }
    };

    let candidates: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_spreadsheet(path))
        .filter_map(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .collect();

    if candidates.is_empty() {
        tracing::info!("No spreadsheet files in the current directory");
    } else {
        tracing::info!("Spreadsheet files in the current directory: {}", candidates.join(", "));
    }
}
