//! Run summary CSV: one row per record listing computed and missed scores.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use risk_model::RecordScores;

use crate::error::{ReportError, Result};

pub const SUMMARY_FILE_NAME: &str = "summary.csv";

const HEADER: [&str; 3] = ["patient_id", "computed_scores", "missed_scores"];

/// Writes the summary rows to `writer`; score names are joined with `;`.
pub fn write_summary<'a, W, I>(writer: W, rows: I) -> std::result::Result<(), csv::Error>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, &'a RecordScores)>,
{
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;
    for (record_id, scores) in rows {
        let computed = scores.computed_names().collect::<Vec<_>>().join(";");
        let missed = scores.missed_names().collect::<Vec<_>>().join(";");
        csv.write_record([record_id, computed.as_str(), missed.as_str()])?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes `summary.csv` at `path`.
pub fn write_summary_csv<'a, I>(path: &Path, rows: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a RecordScores)>,
{
    let file = File::create(path).map_err(|source| ReportError::io(path, source))?;
    write_summary(file, rows).map_err(|source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "summary written");
    Ok(())
}
