use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::AppError;
use crate::models::{AnalysisInfo, Report};
use crate::services::excel::analyze_workbook;
use crate::services::file_info::collect_file_metadata;
use crate::services::markdown::render_markdown;

pub const JSON_REPORT: &str = "excel_structure_analysis.json";
pub const MARKDOWN_REPORT: &str = "excel_structure_analysis.md";

/// Where each report landed; `None` when writing it failed.
#[derive(Debug, Default)]
pub struct SavedReports {
    pub json: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
}

pub struct StructureAnalyzer {
    config: Config,
}

impl StructureAnalyzer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<SavedReports, AppError> {
        tracing::info!("Target file: {}", self.config.input_path.display());
        tracing::info!("Output directory: {}", self.config.output_dir.display());

        let report = self.analyze()?;
        tracing::info!("Analysis complete, saving reports");

        let saved = SavedReports {
            json: self.save_json_report(&report).ok(),
            markdown: self.save_markdown_report(&report).ok(),
        };
        Ok(saved)
    }

    pub fn analyze(&self) -> Result<Report, AppError> {
        let start = std::time::Instant::now();

        tracing::info!("Collecting file information");
        let file_info = collect_file_metadata(&self.config.input_path)?;

        tracing::info!("Analyzing workbook structure");
        let workbook = analyze_workbook(&self.config.input_path, &self.config.profiler);

        tracing::info!("Workbook analyzed in {:?}", start.elapsed());
        Ok(Report {
            file_info,
            workbook,
            analysis_info: AnalysisInfo {
                analyzed_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                analyzer_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    pub fn save_json_report(&self, report: &Report) -> Result<PathBuf, AppError> {
        let path = self.config.output_dir.join(JSON_REPORT);
        let result = serde_json::to_string_pretty(report)
            .map_err(AppError::from)
            .and_then(|json| write_report(&path, &json));
        log_outcome("JSON", &path, result)
    }

    pub fn save_markdown_report(&self, report: &Report) -> Result<PathBuf, AppError> {
        let path = self.config.output_dir.join(MARKDOWN_REPORT);
        let result = write_report(&path, &render_markdown(report));
        log_outcome("Markdown", &path, result)
    }
}

fn write_report(path: &Path, contents: &str) -> Result<(), AppError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            tracing::info!("Created output directory: {}", dir.display());
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn log_outcome(kind: &str, path: &Path, result: Result<(), AppError>) -> Result<PathBuf, AppError> {
    match result {
        Ok(()) => {
            tracing::info!("{} report saved: {}", kind, path.display());
            Ok(path.to_path_buf())
        }
        Err(e) => {
            tracing::error!("Failed to save {} report {}: {}", kind, path.display(), e);
            Err(e)
        }
    }
}
