//! CSV export for chronics tables.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::chronics::TimeSeriesTable;
use crate::params::DATETIME_FORMAT;

/// Name of the first column of every exported table.
pub const INDEX_COLUMN: &str = "datetime";

/// Exports a table to a CSV file at the given path, creating parent
/// directories as needed.
///
/// Writes a header row (`datetime` then the table columns) followed by one
/// row per timestep. Values use four decimals, so identical tables produce
/// byte-identical files.
///
/// # Errors
///
/// Returns an `io::Error` if directory creation, file creation or writing
/// fails.
pub fn export_table(table: &TimeSeriesTable, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_table_csv(table, buf)
}

/// Writes a table as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_table_csv(table: &TimeSeriesTable, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(
        std::iter::once(INDEX_COLUMN).chain(table.columns().iter().map(String::as_str)),
    )?;

    for (stamp, row) in table.index().iter().zip(table.rows()) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(stamp.format(DATETIME_FORMAT).to_string());
        record.extend(row.iter().map(|v| format!("{v:.4}")));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
