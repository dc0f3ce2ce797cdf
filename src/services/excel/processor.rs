use super::types::ColumnKind;
use super::utils::*;
use super::WorkbookSource;
use calamine::{Data, Range};
use std::collections::HashSet;
use crate::config::ProfilerConfig;
use crate::error::AppError;
use crate::models::{
    ColumnEntry, ColumnFailure, ColumnProfile, NumericSummary, SheetEntry, SheetFailure, SheetProfile,
    TypeCounts,
};
use polars::prelude::*;

const EXCEL_EPOCH_OFFSET_DAYS: f64 = 25569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;
// Integral floats beyond this cannot be stored as i64 without saturating.
const I64_SAFE_LIMIT: f64 = 9.2e18;

/// Profiles sheets by loading them into a `DataFrame` first: row 0 becomes the
/// column names and each column gets one inferred dtype.
pub struct ExcelProcessor {
    config: ProfilerConfig,
}

impl ExcelProcessor {
    pub fn new(config: ProfilerConfig) -> Self {
        Self { config }
    }

    pub fn process_sheet<W: WorkbookSource>(&self, workbook: &mut W, sheet_name: &str) -> SheetEntry {
        tracing::info!("Processing sheet: {}", sheet_name);
        let result = workbook
            .sheet_range(sheet_name)
            .and_then(|range| create_dataframe(&range))
            .and_then(|df| self.profile_dataframe(sheet_name, &df));

        match result {
            Ok(profile) => SheetEntry::Profiled(profile),
            Err(e) => {
                tracing::warn!("Skipping sheet {}: {}", sheet_name, e);
                SheetEntry::Failed(SheetFailure {
                    sheet_name: sheet_name.to_string(),
                    error: format!("analysis failed: {}", e),
                })
            }
        }
    }

    pub fn profile_dataframe(&self, sheet_name: &str, df: &DataFrame) -> Result<SheetProfile, AppError> {
        let row_count = df.height();
        let column_count = df.width();
        tracing::debug!("Frame for {} has {} rows x {} columns", sheet_name, row_count, column_count);

        let headers: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();

        let columns: Vec<ColumnEntry> = df
            .get_columns()
            .iter()
            .take(self.config.max_columns)
            .enumerate()
            .map(|(idx, series)| match self.profile_series(series, idx) {
                Ok(profile) => ColumnEntry::Profiled(profile),
                Err(e) => {
                    tracing::warn!("Column {} of sheet {} failed: {}", series.name(), sheet_name, e);
                    ColumnEntry::Failed(ColumnFailure {
                        column_name: series.name().to_string(),
                        error: format!("analysis failed: {}", e),
                    })
                }
            })
            .collect();

        Ok(SheetProfile {
            sheet_name: sheet_name.to_string(),
            row_count,
            column_count,
            data_range: data_range(column_count, row_count),
            headers,
            type_distribution: type_distribution(&columns),
            columns,
            sample_rows: self.sample_rows(df)?,
        })
    }

    pub fn profile_series(&self, series: &Series, idx: usize) -> Result<ColumnProfile, AppError> {
        let null_count = series.null_count();
        let non_null_count = series.len() - null_count;

        let rendered = series.cast(&DataType::String)?;
        let mut distinct = DistinctValues::default();
        for value in rendered.str()?.into_iter().flatten() {
            distinct.insert(value, self.config.max_examples);
        }

        let dtype = series.dtype();
        let mut type_counts = TypeCounts {
            empty: null_count,
            ..TypeCounts::default()
        };
        match dtype {
            dt if dt.is_numeric() => type_counts.numeric = non_null_count,
            DataType::Datetime(_, _) | DataType::Date => type_counts.date = non_null_count,
            DataType::String => type_counts.text = non_null_count,
            _ => type_counts.other = non_null_count,
        }

        let statistics = if dtype.is_numeric() && non_null_count > 0 {
            numeric_summary(series)?
        } else {
            None
        };

        Ok(ColumnProfile {
            column_name: series.name().to_string(),
            column_index: idx + 1,
            column_letter: excel_column_name(idx + 1),
            data_type: dtype.to_string(),
            type_counts,
            non_null_count,
            null_count,
            unique_count: distinct.len(),
            examples: distinct.into_examples(),
            statistics,
        })
    }

    fn sample_rows(&self, df: &DataFrame) -> Result<Vec<Vec<String>>, AppError> {
        let head = df.head(Some(self.config.sample_rows));
        let rendered = head
            .get_columns()
            .iter()
            .map(|series| series.cast(&DataType::String))
            .collect::<PolarsResult<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(head.height());
        for row in 0..head.height() {
            let mut values = Vec::with_capacity(rendered.len());
            for series in &rendered {
                values.push(series.str()?.get(row).unwrap_or_default().to_string());
            }
            rows.push(values);
        }
        Ok(rows)
    }
}

fn numeric_summary(series: &Series) -> Result<Option<NumericSummary>, AppError> {
    let floats = series.cast(&DataType::Float64)?;
    let ca = floats.f64()?;
    let summary = match (ca.min(), ca.max(), ca.mean()) {
        (Some(min), Some(max), Some(mean)) => Some(NumericSummary {
            min,
            max,
            mean,
            std_dev: ca.std(1).filter(|v| v.is_finite()),
        }),
        _ => None,
    };
    Ok(summary)
}

/// Builds one series per column from the data rows below the header row.
pub fn create_dataframe(sheet_range: &Range<Data>) -> Result<DataFrame, AppError> {
    let anchored = anchor_at_origin(sheet_range);
    let range = &anchored;
    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok(DataFrame::empty());
    }

    let mut existing_names = HashSet::new();
    let mut columns = Vec::with_capacity(width);
    for col in 0..width {
        let header = range.get((0, col)).map(render_cell).unwrap_or_default();
        let name = unique_column_name(&header, col, &mut existing_names);

        let values: Vec<&Data> = (1..height)
            .map(|row| range.get((row, col)).unwrap_or(&Data::Empty))
            .collect();
        columns.push(build_series(&name, &values)?);
    }

    DataFrame::new(columns)
        .map_err(|e| AppError::Sheet(format!("Failed to create DataFrame: {}", e)))
}

fn build_series(name: &str, values: &[&Data]) -> Result<Series, AppError> {
    let series = match detect_column_kind(values) {
        ColumnKind::Integer => {
            let ints: Vec<Option<i64>> = values.iter().map(|v| match v {
                Data::Int(i) => Some(*i),
                Data::Float(f) => Some(*f as i64),
                _ => None,
            }).collect();
            Series::new(name, ints)
        }
        ColumnKind::Float => {
            let nums: Vec<Option<f64>> = values.iter().map(|v| numeric_value(v)).collect();
            Series::new(name, nums)
        }
        ColumnKind::Boolean => {
            let flags: Vec<Option<bool>> = values.iter().map(|v| match v {
                Data::Bool(b) => Some(*b),
                _ => None,
            }).collect();
            Series::new(name, flags)
        }
        ColumnKind::DateTime => {
            let millis: Vec<Option<i64>> = values.iter().map(|v| match v {
                Data::DateTime(d) => {
                    Some(((d.as_f64() - EXCEL_EPOCH_OFFSET_DAYS) * MILLIS_PER_DAY).round() as i64)
                }
                Data::DateTimeIso(s) => {
                    parse_iso_datetime(s).map(|dt| dt.and_utc().timestamp_millis())
                }
                _ => None,
            }).collect();
            Series::new(name, millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        ColumnKind::Text => {
            let strings: Vec<Option<String>> = values.iter().map(|v| {
                if is_empty_cell(v) { None } else { Some(render_cell(v)) }
            }).collect();
            Series::new(name, strings)
        }
    };
    Ok(series)
}

/// Integers stay integers only without gaps; any gap or fraction widens the
/// column to floats, and disagreeing cells make it text.
pub fn detect_column_kind(values: &[&Data]) -> ColumnKind {
    let (mut ints, mut floats, mut bools, mut dates, mut empty) = (0, 0, 0, 0, 0);
    for value in values {
        match value {
            v if is_empty_cell(v) => empty += 1,
            Data::Int(_) => ints += 1,
            Data::Float(f) if f.fract() == 0.0 && f.abs() < I64_SAFE_LIMIT => ints += 1,
            Data::Float(_) => floats += 1,
            Data::Bool(_) => bools += 1,
            Data::DateTime(_) => dates += 1,
            Data::DateTimeIso(s) if parse_iso_datetime(s).is_some() => dates += 1,
            _ => {}
        }
    }

    let present = values.len() - empty;
    match () {
        _ if present == 0 => ColumnKind::Float,
        _ if ints == present && empty == 0 => ColumnKind::Integer,
        _ if ints + floats == present => ColumnKind::Float,
        _ if bools == present => ColumnKind::Boolean,
        _ if dates == present => ColumnKind::DateTime,
        _ => ColumnKind::Text,
    }
}
