//! Writes batch rows and reports to disk.

use crate::core::error::Result;
use crate::core::models::BatchResultRow;

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const CSV_HEADER: [&str; 3] = ["Keyword", "Name", "Email"];

/// Pretty-printed JSON of any serializable value.
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    tracing::debug!("Wrote JSON output to {}", path.display());
    Ok(())
}

pub fn save_csv(rows: &[BatchResultRow], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv(rows, BufWriter::new(file))?;
    tracing::debug!("Wrote {} CSV row(s) to {}", rows.len(), path.display());
    Ok(())
}

/// Writes rows as `Keyword,Name,Email` CSV.
pub fn write_csv<W: Write>(rows: &[BatchResultRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for row in rows {
        csv_writer.write_record([&row.group_key, &row.name, &row.email])?;
    }
    csv_writer.flush()?;
    Ok(())
}
