use std::collections::{BTreeMap, HashSet};
use calamine::{Data, Range};
use chrono::{NaiveDate, NaiveDateTime};
use smallvec::SmallVec;

use super::types::CellCategory;
use crate::config::MAX_EXAMPLES;
use crate::models::{ColumnEntry, NumericSummary};

/// Converts a 1-based column number into its spreadsheet label (1 → A, 27 → AA).
pub fn excel_column_name(mut col_num: usize) -> String {
    let mut letters = Vec::new();
    while col_num > 0 {
        col_num -= 1;
        letters.push(b'A' + (col_num % 26) as u8);
        col_num /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Re-bases a range so that position (0, 0) is cell A1, filling the leading
/// rows and columns with empty cells.
pub fn anchor_at_origin(range: &Range<Data>) -> Range<Data> {
    match (range.start(), range.end()) {
        (Some((row, col)), Some(end)) if (row, col) != (0, 0) => {
            let mut anchored = Range::new((0, 0), end);
            for (r, c, cell) in range.cells() {
                anchored.set_value((row + r as u32, col + c as u32), cell.clone());
            }
            anchored
        }
        _ => range.clone(),
    }
}

/// Parses the ISO 8601 text calamine uses for dates in OpenDocument files.
pub fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ];

    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn data_range(column_count: usize, row_count: usize) -> String {
    format!("A1:{}{}", excel_column_name(column_count), row_count)
}

/// Keeps the header text but makes it unique within the sheet, naming blank
/// headers after their position.
pub fn unique_column_name(name: &str, index: usize, existing_names: &mut HashSet<String>) -> String {
    let base_name = if name.trim().is_empty() {
        format!("Unnamed: {}", index)
    } else {
        name.to_string()
    };

    // If the name already exists, add a numeric suffix
    let mut cleaned = base_name.clone();
    let mut counter = 1;
    while !existing_names.insert(cleaned.clone()) {
        cleaned = format!("{}.{}", base_name, counter);
        counter += 1;
    }

    cleaned
}

pub fn is_empty_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

pub fn classify_cell(cell: &Data) -> CellCategory {
    match cell {
        _ if is_empty_cell(cell) => CellCategory::Empty,
        Data::String(_) => CellCategory::Text,
        Data::Int(_) | Data::Float(_) => CellCategory::Numeric,
        Data::DateTime(_) | Data::DateTimeIso(_) => CellCategory::Date,
        _ => CellCategory::Other,
    }
}

pub fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Error(e) => format!("#{:?}", e),
        _ => cell.to_string(),
    }
}

pub fn numeric_value(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) if f.is_finite() => Some(*f),
        _ => None,
    }
}

/// Min, max, mean and sample standard deviation; `None` for no values.
pub fn summarize(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }

    let (min, max, sum) = values.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
    );
    let n = values.len() as f64;
    let mean = sum / n;
    let std_dev = if values.len() > 1 {
        let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        Some((squares / (n - 1.0)).sqrt())
    } else {
        None
    };

    Some(NumericSummary { min, max, mean, std_dev })
}

/// Tracks distinct renderings and keeps the first few as examples.
#[derive(Debug, Default)]
pub struct DistinctValues {
    seen: HashSet<String>,
    examples: SmallVec<[String; MAX_EXAMPLES]>,
}

impl DistinctValues {
    pub fn insert(&mut self, value: &str, max_examples: usize) {
        if self.seen.contains(value) {
            return;
        }
        self.seen.insert(value.to_string());
        if self.examples.len() < max_examples {
            self.examples.push(value.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn into_examples(self) -> SmallVec<[String; MAX_EXAMPLES]> {
        self.examples
    }
}

pub fn type_distribution(columns: &[ColumnEntry]) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for profile in columns.iter().filter_map(ColumnEntry::profile) {
        *distribution.entry(profile.data_type.clone()).or_insert(0) += 1;
    }
    distribution
}
