// 💾 Loader - CSV + SQLite sinks and read-only queries
//
// Both write paths are full overwrites and safe to re-run:
// - CSV goes to a sibling temp file first and is renamed into place
// - the table is dropped and recreated inside one transaction

use crate::config::is_identifier;
use crate::error::{EtlError, EtlResult};
use crate::record::{EnrichedBankRecord, COLUMNS, NAME_COLUMN};
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// CSV SINK
// ============================================================================

/// Write `dataset` as CSV (header row, no index column), replacing `path`
///
/// A failed write leaves the previous file untouched.
pub fn write_csv(dataset: &[EnrichedBankRecord], path: &Path) -> EtlResult<()> {
    let tmp_path = temp_sibling(path);

    if let Err(err) = write_csv_file(dataset, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        EtlError::io(format!("replacing {}", path.display()), e)
    })?;

    debug!(path = %path.display(), rows = dataset.len(), "csv written");
    Ok(())
}

fn write_csv_file(dataset: &[EnrichedBankRecord], path: &Path) -> EtlResult<()> {
    let context = || format!("writing {}", path.display());

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| EtlError::io(context(), io::Error::from(e)))?;

    // Explicit header so an empty dataset still produces one
    writer
        .write_record(COLUMNS)
        .map_err(|e| EtlError::io(context(), io::Error::from(e)))?;

    for record in dataset {
        writer
            .serialize(record)
            .map_err(|e| EtlError::io(context(), io::Error::from(e)))?;
    }

    writer.flush().map_err(|e| EtlError::io(context(), e))?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("dataset.csv");
    path.with_file_name(format!(".{}.tmp", file_name))
}

/// Read a dataset back from the CSV sink
pub fn read_csv(path: &Path) -> EtlResult<Vec<EnrichedBankRecord>> {
    let context = || format!("reading {}", path.display());

    let mut reader =
        csv::Reader::from_path(path).map_err(|e| EtlError::io(context(), io::Error::from(e)))?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: EnrichedBankRecord =
            result.map_err(|e| EtlError::io(context(), io::Error::from(e)))?;
        records.push(record);
    }

    Ok(records)
}

// ============================================================================
// DATABASE SINK
// ============================================================================

pub fn open_database(path: &Path) -> EtlResult<Connection> {
    Connection::open(path)
        .map_err(|e| EtlError::Storage(format!("failed to open {}: {}", path.display(), e)))
}

/// Replace `table_name` with the contents of `dataset`
///
/// Drop, create and insert run in one transaction: on failure the previous
/// table stays as it was.
pub fn write_table(
    conn: &Connection,
    table_name: &str,
    dataset: &[EnrichedBankRecord],
) -> EtlResult<usize> {
    if !is_identifier(table_name) {
        return Err(EtlError::Storage(format!(
            "'{}' is not a valid table name",
            table_name
        )));
    }

    replace_table(conn, table_name, dataset)
        .map_err(|e| EtlError::Storage(format!("writing table {}: {}", table_name, e)))
}

fn replace_table(
    conn: &Connection,
    table_name: &str,
    dataset: &[EnrichedBankRecord],
) -> rusqlite::Result<usize> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS \"{table}\";
         CREATE TABLE \"{table}\" (
            \"{}\" TEXT NOT NULL,
            \"{}\" REAL NOT NULL,
            \"{}\" REAL NOT NULL,
            \"{}\" REAL NOT NULL,
            \"{}\" REAL NOT NULL
         );",
        COLUMNS[0],
        COLUMNS[1],
        COLUMNS[2],
        COLUMNS[3],
        COLUMNS[4],
        table = table_name,
    ))?;

    let mut inserted = 0;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO \"{}\" VALUES (?1, ?2, ?3, ?4, ?5)",
            table_name
        ))?;

        for record in dataset {
            inserted += stmt.execute(params![
                record.name,
                record.market_cap_usd_billion,
                record.market_cap_gbp_billion,
                record.market_cap_eur_billion,
                record.market_cap_inr_billion,
            ])?;
        }
    }

    tx.commit()?;
    Ok(inserted)
}

pub fn verify_count(conn: &Connection, table_name: &str) -> EtlResult<i64> {
    if !is_identifier(table_name) {
        return Err(EtlError::Query(format!("'{}' is not a valid table name", table_name)));
    }

    conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table_name), [], |row| {
        row.get(0)
    })
    .map_err(|e| EtlError::Query(e.to_string()))
}

// ============================================================================
// READ QUERIES
// ============================================================================

/// Column names plus rows, in the order the query returned them
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, `None` if the column is not in the result
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Text values of the `Name` column
    pub fn names(&self) -> Vec<String> {
        self.column(NAME_COLUMN)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| match value {
                Value::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(t) => t.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

impl fmt::Display for QueryResult {
    /// Aligned text table with a leading row index
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(render_value).collect())
            .collect();

        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|row| row[i].len())
                    .chain(std::iter::once(name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:width$}", "", width = index_width)?;
        for (name, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", name, width = width)?;
        }
        writeln!(f)?;

        for (row_idx, row) in cells.iter().enumerate() {
            write!(f, "{:<width$}", row_idx, width = index_width)?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell, width = width)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Run one read-only statement; statements that would write are rejected
pub fn run_query(conn: &Connection, query: &str) -> EtlResult<QueryResult> {
    let mut stmt = conn
        .prepare(query)
        .map_err(|e| EtlError::Query(format!("{}: {}", query, e)))?;

    if !stmt.readonly() {
        return Err(EtlError::Query(format!("refusing to run a mutating statement: {}", query)));
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let column_count = columns.len();

    let mut rows = stmt
        .query([])
        .map_err(|e| EtlError::Query(format!("{}: {}", query, e)))?;

    let mut result_rows = Vec::new();
    while let Some(row) = rows.next().map_err(|e| EtlError::Query(e.to_string()))? {
        let values = (0..column_count)
            .map(|i| row.get::<_, Value>(i))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| EtlError::Query(e.to_string()))?;
        result_rows.push(values);
    }

    Ok(QueryResult {
        columns,
        rows: result_rows,
    })
}
