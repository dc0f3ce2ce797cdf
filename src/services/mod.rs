pub mod excel;
pub mod file_info;
pub mod markdown;
pub mod report;
