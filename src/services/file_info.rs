use chrono::{DateTime, Local};
use std::path::Path;
use std::time::SystemTime;

use crate::error::AppError;
use crate::models::FileMetadata;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn collect_file_metadata(path: &Path) -> Result<FileMetadata, AppError> {
    if !path.exists() {
        return Err(AppError::FileNotFound(path.to_path_buf()));
    }

    let metadata = std::fs::metadata(path)?;
    let absolute_path = std::fs::canonicalize(path)?;
    let size_bytes = metadata.len();

    Ok(FileMetadata {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        absolute_path: absolute_path.display().to_string(),
        size_bytes,
        size: format!("{} bytes ({:.2} KB)", size_bytes, size_bytes as f64 / 1024.0),
        created: metadata.created().ok().map(format_time),
        modified: metadata.modified().ok().map(format_time),
        format: format_label(path).to_string(),
    })
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(TIME_FORMAT).to_string()
}

pub fn format_label(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xls" => "Microsoft Excel 97-2003 Workbook (.xls)",
        "xlsx" => "Microsoft Excel Workbook (.xlsx)",
        "xlsm" => "Microsoft Excel Macro-Enabled Workbook (.xlsm)",
        "xlsb" => "Microsoft Excel Binary Workbook (.xlsb)",
        "ods" => "OpenDocument Spreadsheet (.ods)",
        _ => "Unknown spreadsheet format",
    }
}

pub fn is_spreadsheet(path: &Path) -> bool {
    format_label(path) != "Unknown spreadsheet format"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn metadata_reports_size_and_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.XLS");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0u8; 2048]).unwrap();

        let info = collect_file_metadata(&path).unwrap();
        assert_eq!(info.file_name, "ledger.XLS");
        assert_eq!(info.size_bytes, 2048);
        assert_eq!(info.size, "2048 bytes (2.00 KB)");
        assert_eq!(info.format, "Microsoft Excel 97-2003 Workbook (.xls)");
        assert!(info.modified.is_some());
        assert!(info.absolute_path.ends_with("ledger.XLS"));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_file_metadata(&dir.path().join("absent.xls")).unwrap_err();
        assert!(matches!(err, AppError::FileNotFound(_)));
    }

    #[test]
    fn spreadsheet_extensions_are_recognised() {
        assert!(is_spreadsheet(Path::new("a.xlsx")));
        assert!(is_spreadsheet(Path::new("b.ods")));
        assert!(!is_spreadsheet(Path::new("notes.txt")));
        assert!(!is_spreadsheet(Path::new("README")));
    }
}
