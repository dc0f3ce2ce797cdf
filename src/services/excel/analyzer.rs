use super::types::CellCategory;
use super::utils::*;
use super::WorkbookSource;
use calamine::{Data, Range};
use crate::config::ProfilerConfig;
use crate::error::AppError;
use crate::models::{
    ColumnEntry, ColumnFailure, ColumnProfile, SheetEntry, SheetFailure, SheetProfile, TypeCounts,
};

/// Profiles sheets from the cell type tags of the `.xls` reader. Row 0 is the
/// header; every later row is data.
pub struct ExcelAnalyzer {
    config: ProfilerConfig,
}

impl ExcelAnalyzer {
    pub fn new(config: ProfilerConfig) -> Self {
        Self { config }
    }

    pub fn analyze_sheet<W: WorkbookSource>(&self, workbook: &mut W, sheet_name: &str) -> SheetEntry {
        tracing::info!("Analyzing sheet: {}", sheet_name);
        match workbook.sheet_range(sheet_name) {
            Ok(range) => SheetEntry::Profiled(self.analyze_range(sheet_name, &range)),
            Err(e) => {
                tracing::warn!("Skipping sheet {}: {}", sheet_name, e);
                SheetEntry::Failed(SheetFailure {
                    sheet_name: sheet_name.to_string(),
                    error: format!("analysis failed: {}", e),
                })
            }
        }
    }

    /// Positions are absolute: a sheet whose first used cell is B2 still
    /// reports row 0 as its header row and column A as its first column.
    pub fn analyze_range(&self, sheet_name: &str, sheet_range: &Range<Data>) -> SheetProfile {
        let anchored = anchor_at_origin(sheet_range);
        let range = &anchored;
        let (row_count, column_count) = range.get_size();
        tracing::debug!("Sheet {} spans {} rows x {} columns", sheet_name, row_count, column_count);

        let headers: Vec<String> = if row_count > 0 {
            (0..column_count)
                .map(|col| header_label(range.get((0, col)), col))
                .collect()
        } else {
            Vec::new()
        };

        let columns: Vec<ColumnEntry> = headers
            .iter()
            .take(self.config.max_columns)
            .enumerate()
            .map(|(col, name)| match self.analyze_column(range, col, name) {
                Ok(profile) => ColumnEntry::Profiled(profile),
                Err(e) => {
                    tracing::warn!("Column {} of sheet {} failed: {}", name, sheet_name, e);
                    ColumnEntry::Failed(ColumnFailure {
                        column_name: name.clone(),
                        error: format!("analysis failed: {}", e),
                    })
                }
            })
            .collect();

        let sample_rows = range
            .rows()
            .take(self.config.sample_rows)
            .map(|row| row.iter().map(render_cell).collect())
            .collect();

        SheetProfile {
            sheet_name: sheet_name.to_string(),
            row_count,
            column_count,
            data_range: data_range(column_count, row_count),
            headers,
            type_distribution: type_distribution(&columns),
            columns,
            sample_rows,
        }
    }

    pub fn analyze_column(&self, range: &Range<Data>, col: usize, name: &str) -> Result<ColumnProfile, AppError> {
        let (height, width) = range.get_size();
        if col >= width {
            return Err(AppError::ColumnOutOfRange { index: col, width });
        }

        let mut type_counts = TypeCounts::default();
        let mut distinct = DistinctValues::default();
        let mut numbers = Vec::new();

        for row in 1..height {
            let category = match range.get((row, col)) {
                Some(cell) => {
                    let category = classify_cell(cell);
                    if category != CellCategory::Empty {
                        distinct.insert(&render_cell(cell), self.config.max_examples);
                        numbers.extend(numeric_value(cell));
                    }
                    category
                }
                // Unreadable cells still count as values.
                None => CellCategory::Other,
            };
            type_counts.record(category);
        }

        let non_null_count = type_counts.non_empty();
        let is_numeric = non_null_count > 0 && type_counts.numeric == non_null_count;

        Ok(ColumnProfile {
            column_name: name.to_string(),
            column_index: col + 1,
            column_letter: excel_column_name(col + 1),
            data_type: type_counts.dominant_label().to_string(),
            non_null_count,
            null_count: type_counts.empty,
            unique_count: distinct.len(),
            examples: distinct.into_examples(),
            statistics: if is_numeric { summarize(&numbers) } else { None },
            type_counts,
        })
    }
}

fn header_label(cell: Option<&Data>, col: usize) -> String {
    match cell {
        Some(Data::Error(_)) | None => format!("Column {}", col + 1),
        Some(cell) => render_cell(cell),
    }
}
