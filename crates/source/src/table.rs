//! CSV tables read through Polars
//!
//! Every column is read as text (`infer_schema_length = 0`) so that the
//! lenient parsers in [`crate::parse`] decide how a cell is interpreted,
//! instead of Polars guessing a dtype from the first rows.

use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;

use crate::error::{Result, SourceError};

/// A source table loaded into memory
#[derive(Debug, Clone)]
pub struct Table {
    /// Logical table name, used in errors and logs
    name: &'static str,

    /// File the table was read from
    path: PathBuf,

    frame: DataFrame,
}

impl Table {
    /// Read a CSV file with a header row
    pub fn read_csv(name: &'static str, path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SourceError::MissingFile {
                table: name,
                path: path.display().to_string(),
            });
        }

        let start = Instant::now();

        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        tracing::debug!(
            table = name,
            path = %path.display(),
            rows = frame.height(),
            cols = frame.width(),
            time_ms = start.elapsed().as_millis() as u64,
            "read source table"
        );

        Ok(Self {
            name,
            path: path.to_path_buf(),
            frame,
        })
    }

    /// Logical table name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Source file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Check whether a column exists
    pub fn has_column(&self, column: &str) -> bool {
        self.frame.column(column).is_ok()
    }

    /// Fail unless every listed column exists
    pub fn require(&self, columns: &[&str]) -> Result<()> {
        for column in columns {
            if !self.has_column(column) {
                return Err(SourceError::missing_column(self.name, *column));
            }
        }
        Ok(())
    }

    /// Text values of a required column, one entry per row
    pub fn text(&self, column: &str) -> Result<Vec<Option<String>>> {
        let col = self
            .frame
            .column(column)
            .map_err(|_| SourceError::missing_column(self.name, column))?;

        let series = col.as_materialized_series().cast(&DataType::String)?;
        let values = series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_all_columns_as_text() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "orgs.csv", "id,name\n1,Acme\n2,Globex\n");

        let table = Table::read_csv("organizations", &path).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(
            table.text("id").unwrap(),
            vec![Some("1".to_string()), Some("2".to_string())]
        );
        assert_eq!(table.text("name").unwrap()[1].as_deref(), Some("Globex"));
    }

    #[test]
    fn test_quoted_json_cell_survives() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "companies.csv",
            "id,tag_list\n1,\"[{\"\"name\"\":\"\"Secteur\"\",\"\"list\"\":[{\"\"id\"\":5}]}]\"\n",
        );

        let table = Table::read_csv("companies", &path).unwrap();
        let tags = table.text("tag_list").unwrap();
        assert_eq!(
            tags[0].as_deref(),
            Some(r#"[{"name":"Secteur","list":[{"id":5}]}]"#)
        );
    }

    #[test]
    fn test_missing_column() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "orgs.csv", "id\n1\n");

        let table = Table::read_csv("organizations", &path).unwrap();
        let err = table.require(&["id", "name"]).unwrap_err();
        assert!(matches!(err, SourceError::MissingColumn { .. }));
        assert!(table.text("name").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Table::read_csv("users", Path::new("/nonexistent/users.csv")).unwrap_err();
        assert!(matches!(err, SourceError::MissingFile { table: "users", .. }));
    }
}
