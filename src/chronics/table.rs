//! Time-indexed tables exchanged between stages.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors raised when building or combining tables.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("table \"{table}\": {rows} rows but index has {index} entries")]
    RowCount {
        table: String,
        rows: usize,
        index: usize,
    },
    #[error("table \"{table}\": row {row} has {found} values, expected {expected}")]
    RowWidth {
        table: String,
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("table \"{table}\": duplicate column \"{column}\"")]
    DuplicateColumn { table: String, column: String },
    #[error("table \"{table}\": duplicate element \"{name}\"")]
    DuplicateName { table: String, name: String },
    #[error("cannot combine \"{left}\" and \"{right}\": indices differ")]
    IndexMismatch { left: String, right: String },
    #[error("table \"{table}\": unknown column \"{column}\"")]
    UnknownColumn { table: String, column: String },
    #[error("table \"{table}\": {message}")]
    Parse { table: String, message: String },
}

/// A named table of `f64` values with one row per timestamp.
///
/// Values are stored row-major, one `Vec` per timestep, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    name: String,
    index: Vec<NaiveDateTime>,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TimeSeriesTable {
    /// Builds a table, checking that every row matches the index and
    /// column count and that column names are unique.
    pub fn new(
        name: impl Into<String>,
        index: Vec<NaiveDateTime>,
        columns: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, TableError> {
        let name = name.into();
        if rows.len() != index.len() {
            return Err(TableError::RowCount {
                table: name,
                rows: rows.len(),
                index: index.len(),
            });
        }
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(TableError::RowWidth {
                table: name,
                row,
                found: values.len(),
                expected: columns.len(),
            });
        }
        if let Some(column) = first_duplicate(&columns) {
            return Err(TableError::DuplicateColumn {
                table: name,
                column: column.to_string(),
            });
        }
        Ok(Self {
            name,
            index,
            columns,
            rows,
        })
    }

    /// A table with the given index and no columns.
    pub fn empty(name: impl Into<String>, index: Vec<NaiveDateTime>) -> Self {
        let rows = vec![Vec::new(); index.len()];
        Self {
            name: name.into(),
            index,
            columns: Vec::new(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Values of one column, in index order.
    pub fn column(&self, column: &str) -> Result<Vec<f64>, TableError> {
        let pos = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| TableError::UnknownColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })?;
        Ok(self.rows.iter().map(|row| row[pos]).collect())
    }

    /// Sum across columns for every timestep.
    pub fn row_sums(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.iter().sum()).collect()
    }

    /// Places the columns of `other` after the columns of `self`.
    ///
    /// Fails when the indices differ or a column name appears in both.
    pub fn concat_columns(
        &self,
        other: &TimeSeriesTable,
        name: impl Into<String>,
    ) -> Result<TimeSeriesTable, TableError> {
        let name = name.into();
        if self.index != other.index {
            return Err(TableError::IndexMismatch {
                left: self.name.clone(),
                right: other.name.clone(),
            });
        }
        let columns: Vec<String> = self
            .columns
            .iter()
            .chain(other.columns.iter())
            .cloned()
            .collect();
        let rows = self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(a, b)| a.iter().chain(b.iter()).copied().collect())
            .collect();
        TimeSeriesTable::new(name, self.index.clone(), columns, rows)
    }

    /// Returns a copy with every value transformed by `f(row, column, value)`.
    pub fn map_values(&self, mut f: impl FnMut(usize, usize, f64) -> f64) -> TimeSeriesTable {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, v)| f(r, c, *v))
                    .collect()
            })
            .collect();
        TimeSeriesTable {
            name: self.name.clone(),
            index: self.index.clone(),
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Same data under another name.
    pub fn renamed(mut self, name: impl Into<String>) -> TimeSeriesTable {
        self.name = name.into();
        self
    }
}

fn first_duplicate(columns: &[String]) -> Option<&str> {
    let mut seen = std::collections::HashSet::with_capacity(columns.len());
    columns
        .iter()
        .find(|c| !seen.insert(c.as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn index(n: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2012, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        (0..n)
            .map(|i| start + chrono::TimeDelta::hours(i as i64))
            .collect()
    }

    fn table(name: &str, columns: &[&str], n: usize, value: f64) -> TimeSeriesTable {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = vec![vec![value; columns.len()]; n];
        TimeSeriesTable::new(name, index(n), columns, rows).unwrap()
    }

    #[test]
    fn rejects_shape_mismatch() {
        let err = TimeSeriesTable::new("t", index(2), vec!["a".into()], vec![vec![1.0]]);
        assert!(matches!(err, Err(TableError::RowCount { .. })));

        let err = TimeSeriesTable::new(
            "t",
            index(1),
            vec!["a".into(), "b".into()],
            vec![vec![1.0]],
        );
        assert!(matches!(err, Err(TableError::RowWidth { row: 0, .. })));
    }

    #[test]
    fn concat_keeps_left_columns_first() {
        let solar = table("solar", &["s1", "s2"], 3, 1.0);
        let wind = table("wind", &["w1"], 3, 2.0);
        let prods = solar.concat_columns(&wind, "prods").unwrap();
        assert_eq!(prods.columns(), &["s1", "s2", "w1"]);
        assert_eq!(prods.rows()[0], vec![1.0, 1.0, 2.0]);
        assert_eq!(prods.row_sums(), vec![4.0; 3]);
    }

    #[test]
    fn concat_rejects_column_collision() {
        let solar = table("solar", &["gen_1"], 2, 1.0);
        let wind = table("wind", &["gen_1"], 2, 2.0);
        let err = solar.concat_columns(&wind, "prods").unwrap_err();
        assert_eq!(
            err,
            TableError::DuplicateColumn {
                table: "prods".into(),
                column: "gen_1".into()
            }
        );
    }

    #[test]
    fn concat_rejects_index_mismatch() {
        let a = table("a", &["x"], 2, 1.0);
        let b = table("b", &["y"], 3, 1.0);
        assert!(matches!(
            a.concat_columns(&b, "ab"),
            Err(TableError::IndexMismatch { .. })
        ));
    }

    #[test]
    fn column_lookup() {
        let t = table("t", &["a", "b"], 2, 0.5);
        assert_eq!(t.column("b").unwrap(), vec![0.5, 0.5]);
        assert!(t.column("c").is_err());
    }
}
