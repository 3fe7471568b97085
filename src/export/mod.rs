//! CSV出力モジュール

mod csv;
mod download;

pub use self::csv::{
    escape_field, preview, to_csv, to_report_csv, ReportEntry, ARTICLE_HEADERS,
    DEFAULT_PREVIEW_LINES, REPORT_HEADERS,
};
pub use download::{download, file_name, file_name_today, save_csv, try_download};
