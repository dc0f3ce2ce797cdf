pub mod analyzer;
pub mod processor;
pub mod types;
pub mod utils;

pub use analyzer::ExcelAnalyzer;
pub use processor::ExcelProcessor;

use std::io::{Read, Seek};
use std::path::Path;
use calamine::{open_workbook, open_workbook_auto, Data, Range, Reader, Sheets, Xls};

use crate::config::ProfilerConfig;
use crate::error::AppError;
use crate::models::{ReaderKind, SheetEntry, WorkbookProfile, WorkbookStructure};

/// A workbook whose sheets can be loaded one cell range at a time.
pub trait WorkbookSource {
    fn sheet_names(&self) -> Vec<String>;
    fn sheet_range(&mut self, name: &str) -> Result<Range<Data>, AppError>;
}

impl<RS: Read + Seek> WorkbookSource for Xls<RS> {
    fn sheet_names(&self) -> Vec<String> {
        <Self as Reader<RS>>::sheet_names(self).to_vec()
    }

    fn sheet_range(&mut self, name: &str) -> Result<Range<Data>, AppError> {
        self.worksheet_range(name)
            .map_err(|e| AppError::Sheet(format!("Failed to read worksheet {}: {}", name, e)))
    }
}

impl<RS: Read + Seek> WorkbookSource for Sheets<RS> {
    fn sheet_names(&self) -> Vec<String> {
        <Self as Reader<RS>>::sheet_names(self).to_vec()
    }

    fn sheet_range(&mut self, name: &str) -> Result<Range<Data>, AppError> {
        self.worksheet_range(name)
            .map_err(|e| AppError::Sheet(format!("Failed to read worksheet {}: {}", name, e)))
    }
}

/// Opens `path` with the `.xls` reader and falls back to format sniffing when
/// that fails.
pub fn analyze_workbook(path: &Path, config: &ProfilerConfig) -> WorkbookStructure {
    tracing::info!("Opening workbook {} with the xls reader", path.display());
    let primary = open_workbook::<Xls<_>, _>(path)
        .map_err(|e| AppError::Workbook(format!("xls reader: {}", e)));

    analyze_with_fallback(primary, || {
        tracing::info!("Reopening workbook {} with format detection", path.display());
        open_workbook_auto(path).map_err(|e| AppError::Workbook(format!("auto reader: {}", e)))
    }, config)
}

pub fn analyze_with_fallback<P, S, F>(
    primary: Result<P, AppError>,
    secondary: F,
    config: &ProfilerConfig,
) -> WorkbookStructure
where
    P: WorkbookSource,
    S: WorkbookSource,
    F: FnOnce() -> Result<S, AppError>,
{
    let primary_error = match primary {
        Ok(mut workbook) => {
            let analyzer = ExcelAnalyzer::new(config.clone());
            return profile_workbook(&mut workbook, ReaderKind::Xls, |source, name| {
                analyzer.analyze_sheet(source, name)
            });
        }
        Err(e) => e,
    };
    tracing::warn!("Primary reader failed: {}", primary_error);

    match secondary() {
        Ok(mut workbook) => {
            let processor = ExcelProcessor::new(config.clone());
            profile_workbook(&mut workbook, ReaderKind::DataFrame, |source, name| {
                processor.process_sheet(source, name)
            })
        }
        Err(secondary_error) => {
            tracing::error!("Secondary reader failed: {}", secondary_error);
            WorkbookStructure::Failed {
                error: format!("unable to read workbook: {}, {}", primary_error, secondary_error),
            }
        }
    }
}

fn profile_workbook<W, F>(workbook: &mut W, reader: ReaderKind, mut profile_sheet: F) -> WorkbookStructure
where
    W: WorkbookSource,
    F: FnMut(&mut W, &str) -> SheetEntry,
{
    let sheet_names = workbook.sheet_names();
    tracing::info!("Found {} sheets: {:?}", sheet_names.len(), sheet_names);

    let sheets = sheet_names
        .iter()
        .map(|name| profile_sheet(&mut *workbook, name))
        .collect();

    WorkbookStructure::Profiled(WorkbookProfile {
        reader,
        sheet_count: sheet_names.len(),
        sheet_names,
        sheets,
    })
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    /// Builds a range whose first cell sits at A1.
    pub fn range_from_rows(rows: Vec<Vec<Data>>) -> Range<Data> {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Range::empty();
        }
        let mut range = Range::new((0, 0), (height as u32 - 1, width as u32 - 1));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    pub fn text(value: &str) -> Data {
        Data::String(value.to_string())
    }

    /// In-memory workbook; a sheet stored as `Err` fails to load.
    #[derive(Default)]
    pub struct MemoryWorkbook {
        pub sheets: Vec<(String, Result<Range<Data>, String>)>,
    }

    impl MemoryWorkbook {
        pub fn with_sheet(mut self, name: &str, rows: Vec<Vec<Data>>) -> Self {
            self.sheets.push((name.to_string(), Ok(range_from_rows(rows))));
            self
        }

        pub fn with_broken_sheet(mut self, name: &str, error: &str) -> Self {
            self.sheets.push((name.to_string(), Err(error.to_string())));
            self
        }
    }

    impl WorkbookSource for MemoryWorkbook {
        fn sheet_names(&self) -> Vec<String> {
            self.sheets.iter().map(|(name, _)| name.clone()).collect()
        }

        fn sheet_range(&mut self, name: &str) -> Result<Range<Data>, AppError> {
            match self.sheets.iter().find(|(sheet, _)| sheet == name) {
                Some((_, Ok(range))) => Ok(range.clone()),
                Some((_, Err(e))) => Err(AppError::Sheet(e.clone())),
                None => Err(AppError::Sheet(format!("no sheet named {}", name))),
            }
        }
    }

    /// The 3-column, 4-data-row workbook used across the profiling tests.
    pub fn people_workbook() -> MemoryWorkbook {
        MemoryWorkbook::default().with_sheet(
            "People",
            vec![
                vec![text("Age"), text("Name"), text("Note")],
                vec![Data::Int(31), text("Ann"), text("vip")],
                vec![Data::Float(42.5), text("Bob"), Data::Empty],
                vec![Data::Int(27), text("Cy"), text("")],
                vec![Data::Int(31), text("Di"), text("late")],
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use std::io::Write;

    #[test]
    fn primary_reader_is_used_when_it_opens() {
        let structure = analyze_with_fallback(
            Ok(people_workbook()),
            || -> Result<MemoryWorkbook, AppError> { panic!("secondary reader must not run") },
            &ProfilerConfig::default(),
        );

        match structure {
            WorkbookStructure::Profiled(profile) => {
                assert_eq!(profile.reader, ReaderKind::Xls);
                assert_eq!(profile.sheet_count, 1);
                assert_eq!(profile.sheets.len(), profile.sheet_count);
                assert_eq!(profile.sheet_names, vec!["People".to_string()]);
            }
            WorkbookStructure::Failed { error } => panic!("unexpected failure: {}", error),
        }
    }

    #[test]
    fn secondary_reader_takes_over_after_primary_failure() {
        let structure = analyze_with_fallback(
            Err::<MemoryWorkbook, _>(AppError::Workbook("not an xls file".into())),
            || Ok(people_workbook().with_sheet("Empty", vec![])),
            &ProfilerConfig::default(),
        );

        match structure {
            WorkbookStructure::Profiled(profile) => {
                assert_eq!(profile.reader, ReaderKind::DataFrame);
                assert_eq!(profile.sheets.len(), 2);
                assert_eq!(profile.sheets[1].sheet_name(), "Empty");
            }
            WorkbookStructure::Failed { error } => panic!("unexpected failure: {}", error),
        }
    }

    #[test]
    fn both_reader_errors_are_reported_together() {
        let structure = analyze_with_fallback(
            Err::<MemoryWorkbook, _>(AppError::Workbook("first".into())),
            || Err::<MemoryWorkbook, _>(AppError::Workbook("second".into())),
            &ProfilerConfig::default(),
        );

        assert!(structure.sheets().is_empty());
        match structure {
            WorkbookStructure::Failed { error } => {
                assert!(error.contains("first"));
                assert!(error.contains("second"));
            }
            WorkbookStructure::Profiled(_) => panic!("expected a failure record"),
        }
    }

    #[test]
    fn unreadable_file_fails_both_readers() {
        let mut file = tempfile::Builder::new().suffix(".xls").tempfile().unwrap();
        writeln!(file, "this is not a spreadsheet").unwrap();

        let structure = analyze_workbook(file.path(), &ProfilerConfig::default());
        match structure {
            WorkbookStructure::Failed { error } => {
                assert!(error.contains("xls reader"));
                assert!(error.contains("auto reader"));
            }
            WorkbookStructure::Profiled(_) => panic!("plain text must not parse as a workbook"),
        }
    }
}
