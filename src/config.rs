use crate::error::AppError;
use dotenvy::dotenv;
use std::path::PathBuf;

const DEFAULT_INPUT: &str = "input.xls";
const DEFAULT_OUTPUT_DIR: &str = "docs";

pub const MAX_SAMPLE_ROWS: usize = 5;
pub const MAX_EXAMPLES: usize = 10;

/// Limits applied while profiling sheets and columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilerConfig {
    /// Only the first `max_columns` columns of a sheet get a detailed profile.
    pub max_columns: usize,
    pub sample_rows: usize,
    pub max_examples: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            max_columns: 20,
            sample_rows: MAX_SAMPLE_ROWS,
            max_examples: MAX_EXAMPLES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub profiler: ProfilerConfig,
}

impl Config {
    pub fn new(input_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            profiler: ProfilerConfig::default(),
        }
    }

    /// Builds the configuration from `.env`, the process environment and the
    /// positional arguments `[input] [output-dir]`, in increasing precedence.
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file first
        dotenv().ok();

        let mut args = std::env::args().skip(1);
        let input_path = args
            .next()
            .or_else(|| std::env::var("SHEET_INPUT_PATH").ok())
            .unwrap_or_else(|| DEFAULT_INPUT.to_string());
        let output_dir = args
            .next()
            .or_else(|| std::env::var("SHEET_OUTPUT_DIR").ok())
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

        let defaults = ProfilerConfig::default();
        let profiler = ProfilerConfig {
            max_columns: read_limit("SHEET_MAX_COLUMNS", defaults.max_columns)?,
            sample_rows: read_limit("SHEET_SAMPLE_ROWS", defaults.sample_rows)?
                .min(MAX_SAMPLE_ROWS),
            max_examples: read_limit("SHEET_MAX_EXAMPLES", defaults.max_examples)?
                .min(MAX_EXAMPLES),
        };

        let mut config = Config::new(input_path, output_dir);
        config.profiler = profiler;
        Ok(config)
    }
}

fn read_limit(key: &str, default: usize) -> Result<usize, AppError> {
    match std::env::var(key) {
        Ok(raw) => parse_limit(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_limit(key: &str, raw: &str) -> Result<usize, AppError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| AppError::Config(format!("{} must be a non-negative integer ({}): {}", key, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_profiling_limits() {
        let config = Config::new("book.xls", "out");
        assert_eq!(config.profiler.max_columns, 20);
        assert_eq!(config.profiler.sample_rows, 5);
        assert_eq!(config.profiler.max_examples, 10);
        assert_eq!(config.input_path, PathBuf::from("book.xls"));
    }

    #[test]
    fn parse_limit_rejects_garbage() {
        assert_eq!(parse_limit("SHEET_MAX_COLUMNS", " 12 ").unwrap(), 12);
        let err = parse_limit("SHEET_MAX_COLUMNS", "twelve").unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("SHEET_MAX_COLUMNS")));
    }
}
