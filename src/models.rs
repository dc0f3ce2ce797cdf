use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::config::MAX_EXAMPLES;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub file_info: FileMetadata,
    pub workbook: WorkbookStructure,
    pub analysis_info: AnalysisInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file_name: String,
    pub absolute_path: String,
    pub size_bytes: u64,
    pub size: String,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInfo {
    pub analyzed_at: String,
    pub analyzer_version: String,
}

/// Which reader produced the workbook profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaderKind {
    /// Legacy `.xls` reader exposing per-cell type tags.
    Xls,
    /// Format-sniffing reader profiled through a data frame.
    DataFrame,
}

impl std::fmt::Display for ReaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReaderKind::Xls => write!(f, "xls (cell type tags)"),
            ReaderKind::DataFrame => write!(f, "auto-detected format (data frame)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkbookStructure {
    Profiled(WorkbookProfile),
    Failed { error: String },
}

impl WorkbookStructure {
    pub fn sheets(&self) -> &[SheetEntry] {
        match self {
            WorkbookStructure::Profiled(profile) => &profile.sheets,
            WorkbookStructure::Failed { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbookProfile {
    pub reader: ReaderKind,
    pub sheet_count: usize,
    pub sheet_names: Vec<String>,
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetEntry {
    Profiled(SheetProfile),
    Failed(SheetFailure),
}

impl SheetEntry {
    pub fn sheet_name(&self) -> &str {
        match self {
            SheetEntry::Profiled(profile) => &profile.sheet_name,
            SheetEntry::Failed(failure) => &failure.sheet_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetProfile {
    pub sheet_name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub data_range: String,
    pub headers: Vec<String>,
    pub columns: Vec<ColumnEntry>,
    pub type_distribution: BTreeMap<String, usize>,
    pub sample_rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetFailure {
    pub sheet_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnEntry {
    Profiled(ColumnProfile),
    Failed(ColumnFailure),
}

impl ColumnEntry {
    pub fn profile(&self) -> Option<&ColumnProfile> {
        match self {
            ColumnEntry::Profiled(profile) => Some(profile),
            ColumnEntry::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub column_name: String,
    pub column_index: usize,
    pub column_letter: String,
    pub data_type: String,
    pub type_counts: TypeCounts,
    pub non_null_count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    pub examples: SmallVec<[String; MAX_EXAMPLES]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<NumericSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFailure {
    pub column_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    pub text: usize,
    pub numeric: usize,
    pub date: usize,
    pub empty: usize,
    pub other: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation, absent for fewer than two values.
    pub std_dev: Option<f64>,
}
