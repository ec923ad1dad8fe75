//! Per-record report files (xlsx, XHTML, JSON) and the run summary.

#![deny(unsafe_code)]

pub mod error;
pub mod formats;
pub mod html;
pub mod json;
pub mod record;
pub mod summary;
pub mod xlsx;

pub use error::{ReportError, Result};
pub use formats::{ReportFormats, ReportWriter};
pub use html::{HtmlReporter, render_html};
pub use json::JsonReporter;
pub use record::{RecordReport, RecordReporter, report_file_name, sanitize_id};
pub use summary::{SUMMARY_FILE_NAME, write_summary, write_summary_csv};
pub use xlsx::XlsxReporter;
