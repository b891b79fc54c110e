//! Static attributes of grid elements (load points, generators).

use std::collections::HashMap;

use super::table::TableError;

/// Column that identifies each element.
pub const NAME_COLUMN: &str = "name";

/// Per-element attribute table keyed by the `name` column.
///
/// Read once per run and shared read-only by every scenario. Row order is
/// the order of the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacteristicsTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    by_name: HashMap<String, usize>,
}

impl CharacteristicsTable {
    /// Builds a table from raw string records. `columns` must contain
    /// [`NAME_COLUMN`] and element names must be unique.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        let name_pos = columns
            .iter()
            .position(|c| c == NAME_COLUMN)
            .ok_or_else(|| TableError::UnknownColumn {
                table: "characteristics".to_string(),
                column: NAME_COLUMN.to_string(),
            })?;
        let mut by_name = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TableError::RowWidth {
                    table: "characteristics".to_string(),
                    row: i,
                    found: row.len(),
                    expected: columns.len(),
                });
            }
            if by_name.insert(row[name_pos].clone(), i).is_some() {
                return Err(TableError::DuplicateName {
                    table: "characteristics".to_string(),
                    name: row[name_pos].clone(),
                });
            }
        }
        Ok(Self {
            columns,
            rows,
            by_name,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Element names in file order.
    pub fn names(&self) -> Vec<&str> {
        let pos = self.column_pos(NAME_COLUMN).unwrap_or(0);
        self.rows.iter().map(|row| row[pos].as_str()).collect()
    }

    fn column_pos(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Raw value of `column` for element `name`.
    pub fn get(&self, name: &str, column: &str) -> Option<&str> {
        let row = *self.by_name.get(name)?;
        let pos = self.column_pos(column)?;
        Some(self.rows[row][pos].as_str())
    }

    /// Value of `column` for element `name` parsed as a number.
    pub fn f64(&self, name: &str, column: &str) -> Result<f64, TableError> {
        let raw = self.get(name, column).ok_or_else(|| TableError::UnknownColumn {
            table: "characteristics".to_string(),
            column: format!("{name}.{column}"),
        })?;
        raw.trim().parse::<f64>().map_err(|_| TableError::Parse {
            table: "characteristics".to_string(),
            message: format!("{name}.{column}: \"{raw}\" is not a number"),
        })
    }

    /// Names of elements whose `column` equals `value`, in file order.
    pub fn names_where(&self, column: &str, value: &str) -> Vec<&str> {
        let (Some(pos), Some(name_pos)) = (self.column_pos(column), self.column_pos(NAME_COLUMN))
        else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter(|row| row[pos] == value)
            .map(|row| row[name_pos].as_str())
            .collect()
    }
}
