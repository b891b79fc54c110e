//! CSV import for chronics tables and characteristics files.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;

use super::export::INDEX_COLUMN;
use crate::chronics::{CharacteristicsTable, TableError, TimeSeriesTable};
use crate::params::DATETIME_FORMAT;

fn parse_error(table: &str, message: impl Into<String>) -> TableError {
    TableError::Parse {
        table: table.to_string(),
        message: message.into(),
    }
}

/// Reads a table previously written by [`export_table`](super::export::export_table).
///
/// The table is named after the file stem.
pub fn read_table(path: &Path) -> Result<TimeSeriesTable, TableError> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string();
    let file = std::fs::File::open(path)
        .map_err(|e| parse_error(&name, format!("cannot open {}: {e}", path.display())))?;
    read_table_csv(&name, file)
}

/// Reads a table from any CSV source with a `datetime` first column.
pub fn read_table_csv(name: &str, reader: impl Read) -> Result<TimeSeriesTable, TableError> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| parse_error(name, e.to_string()))?
        .clone();
    if headers.get(0) != Some(INDEX_COLUMN) {
        return Err(parse_error(
            name,
            format!("first column must be \"{INDEX_COLUMN}\""),
        ));
    }
    let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut index = Vec::new();
    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| parse_error(name, e.to_string()))?;
        let stamp = record.get(0).unwrap_or("");
        let stamp = NaiveDateTime::parse_from_str(stamp, DATETIME_FORMAT)
            .map_err(|e| parse_error(name, format!("row {i}: bad timestamp \"{stamp}\": {e}")))?;
        let values = record
            .iter()
            .skip(1)
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| parse_error(name, format!("row {i}: \"{v}\" is not a number")))
            })
            .collect::<Result<Vec<f64>, _>>()?;
        index.push(stamp);
        rows.push(values);
    }

    TimeSeriesTable::new(name, index, columns, rows)
}

/// Reads a characteristics CSV file (header row, one element per row).
pub fn read_characteristics(path: &Path) -> Result<CharacteristicsTable, TableError> {
    let file = std::fs::File::open(path).map_err(|e| {
        parse_error("characteristics", format!("cannot open {}: {e}", path.display()))
    })?;
    read_characteristics_csv(file)
}

pub fn read_characteristics_csv(reader: impl Read) -> Result<CharacteristicsTable, TableError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let columns: Vec<String> = rdr
        .headers()
        .map_err(|e| parse_error("characteristics", e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    let rows = rdr
        .records()
        .map(|r| {
            r.map(|rec| rec.iter().map(str::to_string).collect::<Vec<_>>())
                .map_err(|e| parse_error("characteristics", e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    CharacteristicsTable::new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::export::write_table_csv;

    #[test]
    fn reads_back_exported_table() {
        let raw = "datetime,a,b\n2012-01-01 00:00,1.0000,2.5000\n2012-01-01 01:00,3.0000,4.0000\n";
        let table = read_table_csv("load_p", raw.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["a", "b"]);
        assert_eq!(table.column("b").unwrap(), vec![2.5, 4.0]);

        let mut out = Vec::new();
        write_table_csv(&table, &mut out).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert_eq!(
            written.lines().collect::<Vec<_>>(),
            raw.lines().collect::<Vec<_>>()
        );
    }

    #[test]
    fn rejects_missing_index_column() {
        let raw = "time,a\n2012-01-01 00:00,1\n";
        assert!(read_table_csv("t", raw.as_bytes()).is_err());
    }

    #[test]
    fn rejects_non_numeric_values() {
        let raw = "datetime,a\n2012-01-01 00:00,abc\n";
        let err = read_table_csv("t", raw.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn reads_characteristics_with_spaces() {
        let raw = "name, type, Pmax\ngen_0, solar, 20\ngen_1, wind, 40\n";
        let charac = read_characteristics_csv(raw.as_bytes()).unwrap();
        assert_eq!(charac.names(), vec!["gen_0", "gen_1"]);
        assert_eq!(charac.f64("gen_1", "Pmax"), Ok(40.0));
    }
}
