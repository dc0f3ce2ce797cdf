use crate::models::{
    ColumnEntry, FileMetadata, Report, SheetEntry, SheetProfile, TypeCounts, WorkbookProfile,
    WorkbookStructure,
};

const UNKNOWN: &str = "Unknown";
const TABLE_EXAMPLES: usize = 3;

pub fn render_markdown(report: &Report) -> String {
    let mut md = Vec::new();

    md.push("# Spreadsheet Structure Analysis Report".to_string());
    md.push(String::new());
    md.push(format!("**Analyzed at**: {}", or_unknown(&report.analysis_info.analyzed_at)));
    md.push(String::new());

    render_file_info(&mut md, &report.file_info);

    md.push("## Workbook Overview".to_string());
    md.push(String::new());
    match &report.workbook {
        WorkbookStructure::Failed { error } => {
            md.push(format!("**Analysis error**: {}", error));
            md.push(String::new());
        }
        WorkbookStructure::Profiled(profile) => render_workbook(&mut md, profile),
    }

    md.push("## Analysis Information".to_string());
    md.push(String::new());
    md.push(format!("- **Analyzed at**: {}", or_unknown(&report.analysis_info.analyzed_at)));
    md.push(format!("- **Analyzer version**: {}", or_unknown(&report.analysis_info.analyzer_version)));

    md.join("\n")
}

fn render_file_info(md: &mut Vec<String>, info: &FileMetadata) {
    md.push("## File Information".to_string());
    md.push(String::new());
    md.push(format!("- **File name**: {}", or_unknown(&info.file_name)));
    md.push(format!("- **File path**: {}", or_unknown(&info.absolute_path)));
    md.push(format!("- **File size**: {}", or_unknown(&info.size)));
    md.push(format!("- **Created**: {}", info.created.as_deref().unwrap_or(UNKNOWN)));
    md.push(format!("- **Modified**: {}", info.modified.as_deref().unwrap_or(UNKNOWN)));
    md.push(format!("- **Format**: {}", or_unknown(&info.format)));
    md.push(String::new());
}

fn render_workbook(md: &mut Vec<String>, profile: &WorkbookProfile) {
    md.push(format!("- **Reader**: {}", profile.reader));
    md.push(format!("- **Sheet count**: {}", profile.sheet_count));
    md.push(format!("- **Sheets**: {}", profile.sheet_names.join(", ")));
    md.push(String::new());

    for (i, sheet) in profile.sheets.iter().enumerate() {
        md.push(format!("### Sheet {}: {}", i + 1, or_unknown(sheet.sheet_name())));
        md.push(String::new());
        match sheet {
            SheetEntry::Failed(failure) => {
                md.push(format!("**Analysis error**: {}", failure.error));
                md.push(String::new());
            }
            SheetEntry::Profiled(sheet) => render_sheet(md, sheet),
        }
        md.push("---".to_string());
        md.push(String::new());
    }
}

fn render_sheet(md: &mut Vec<String>, sheet: &SheetProfile) {
    md.push("#### Basic Information".to_string());
    md.push(String::new());
    md.push(format!("- **Rows**: {}", sheet.row_count));
    md.push(format!("- **Columns**: {}", sheet.column_count));
    md.push(format!("- **Data range**: {}", or_unknown(&sheet.data_range)));
    md.push(String::new());

    md.push("#### Columns".to_string());
    md.push(String::new());

    if !sheet.headers.is_empty() {
        md.push("**Headers**:".to_string());
        md.push(String::new());
        for (j, header) in sheet.headers.iter().enumerate() {
            md.push(format!("{}. {}", j + 1, header));
        }
        md.push(String::new());
    }

    if !sheet.columns.is_empty() {
        md.push("**Column details**:".to_string());
        md.push(String::new());
        md.push("| Column | Data type | Non-null | Null | Unique | Examples |".to_string());
        md.push("|--------|-----------|----------|------|--------|----------|".to_string());
        for column in &sheet.columns {
            md.push(column_row(column));
        }
        md.push(String::new());
    }

    if !sheet.type_distribution.is_empty() {
        let summary: Vec<String> = sheet
            .type_distribution
            .iter()
            .map(|(label, count)| format!("{} × {}", label, count))
            .collect();
        md.push(format!("**Type distribution**: {}", summary.join(", ")));
        md.push(String::new());
    }

    if !sheet.sample_rows.is_empty() {
        md.push(format!("#### Sample Data (first {} rows)", sheet.sample_rows.len()));
        md.push(String::new());
        md.push("```".to_string());
        for (row_idx, row) in sheet.sample_rows.iter().enumerate() {
            md.push(format!("Row {}: {:?}", row_idx + 1, row));
        }
        md.push("```".to_string());
        md.push(String::new());
    }
}

fn column_row(column: &ColumnEntry) -> String {
    match column {
        ColumnEntry::Profiled(profile) => {
            let examples: Vec<String> = profile
                .examples
                .iter()
                .take(TABLE_EXAMPLES)
                .map(|v| escape_cell(v))
                .collect();
            format!(
                "| {} | {} ({}) | {} | {} | {} | {} |",
                escape_cell(or_unknown(&profile.column_name)),
                escape_cell(or_unknown(&profile.data_type)),
                type_counts_summary(&profile.type_counts),
                profile.non_null_count,
                profile.null_count,
                profile.unique_count,
                examples.join(", "),
            )
        }
        ColumnEntry::Failed(failure) => format!(
            "| {} | error: {} | - | - | - | - |",
            escape_cell(or_unknown(&failure.column_name)),
            escape_cell(&failure.error),
        ),
    }
}

fn type_counts_summary(counts: &TypeCounts) -> String {
    format!(
        "text {}, numeric {}, date {}, empty {}, other {}",
        counts.text, counts.numeric, counts.date, counts.empty, counts.other
    )
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() { UNKNOWN } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisInfo, ColumnFailure, ReaderKind, SheetFailure};
    use crate::services::excel::test_support::*;
    use crate::services::excel::{analyze_with_fallback, WorkbookSource};
    use crate::config::ProfilerConfig;
    use crate::error::AppError;

    fn file_info() -> FileMetadata {
        FileMetadata {
            file_name: "book.xls".into(),
            absolute_path: "/data/book.xls".into(),
            size_bytes: 10,
            size: "10 bytes (0.01 KB)".into(),
            created: None,
            modified: Some("2024-05-01 08:00:00".into()),
            format: "Microsoft Excel 97-2003 Workbook (.xls)".into(),
        }
    }

    fn report(workbook: WorkbookStructure) -> Report {
        Report {
            file_info: file_info(),
            workbook,
            analysis_info: AnalysisInfo {
                analyzed_at: "2024-05-02 09:30:00".into(),
                analyzer_version: "0.1.0".into(),
            },
        }
    }

    fn profiled_people() -> WorkbookStructure {
        analyze_with_fallback(
            Ok(people_workbook()),
            || Err::<MemoryWorkbook, AppError>(AppError::Workbook("unused".into())),
            &ProfilerConfig::default(),
        )
    }

    #[test]
    fn renders_sections_in_order() {
        let md = render_markdown(&report(profiled_people()));

        let title = md.find("# Spreadsheet Structure Analysis Report").unwrap();
        let file = md.find("## File Information").unwrap();
        let overview = md.find("## Workbook Overview").unwrap();
        let sheet = md.find("### Sheet 1: People").unwrap();
        let info = md.find("## Analysis Information").unwrap();
        assert!(title < file && file < overview && overview < sheet && sheet < info);

        assert!(md.contains("- **Created**: Unknown"));
        assert!(md.contains("- **Reader**: xls (cell type tags)"));
        assert!(md.contains("1. Age"));
        assert!(md.contains("| Note | text (text 2, numeric 0, date 0, empty 2, other 0) | 2 | 2 | 2 | vip, late |"));
        assert!(md.contains("Row 1: [\"Age\", \"Name\", \"Note\"]"));
        assert!(md.contains("- **Analyzer version**: 0.1.0"));
    }

    #[test]
    fn table_shows_at_most_three_examples() {
        let mut rows = vec![vec![text("code")]];
        rows.extend(["a", "b", "c", "d", "e"].iter().map(|v| vec![text(v)]));
        let workbook = MemoryWorkbook::default().with_sheet("Codes", rows);
        assert_eq!(workbook.sheet_names(), vec!["Codes".to_string()]);

        let structure = analyze_with_fallback(
            Ok(workbook),
            || Err::<MemoryWorkbook, AppError>(AppError::Workbook("unused".into())),
            &ProfilerConfig::default(),
        );
        let md = render_markdown(&report(structure));
        let row = md.lines().find(|line| line.starts_with("| code |")).unwrap();
        assert!(row.ends_with("| a, b, c |"));
    }

    #[test]
    fn failures_render_as_errors() {
        let workbook = WorkbookStructure::Profiled(WorkbookProfile {
            reader: ReaderKind::DataFrame,
            sheet_count: 1,
            sheet_names: vec!["Broken".into()],
            sheets: vec![SheetEntry::Failed(SheetFailure {
                sheet_name: "Broken".into(),
                error: "analysis failed: bad record".into(),
            })],
        });
        let md = render_markdown(&report(workbook));
        assert!(md.contains("### Sheet 1: Broken"));
        assert!(md.contains("**Analysis error**: analysis failed: bad record"));

        let failed = render_markdown(&report(WorkbookStructure::Failed {
            error: "unable to read workbook: a, b".into(),
        }));
        assert!(failed.contains("**Analysis error**: unable to read workbook: a, b"));
        assert!(failed.contains("## Analysis Information"));
    }

    #[test]
    fn failed_column_row_and_pipe_escaping() {
        let row = column_row(&ColumnEntry::Failed(ColumnFailure {
            column_name: "a|b".into(),
            error: "boom".into(),
        }));
        assert_eq!(row, "| a\\|b | error: boom | - | - | - | - |");
    }
}
