//! Query execution against the metadata database.
//!
//! One session, one statement per run. The result cursor is fully drained
//! into memory: reports are bounded administrative queries, not bulk
//! exports, so whole-result materialization is acceptable.

use crate::error::{ReportError, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::fmt;

// ---------------------------------------------------------------------------
// SqlValue
// ---------------------------------------------------------------------------

/// A scalar cell captured from the database.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    fn from_ref(value: ValueRef<'_>) -> SqlValue {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(r) => SqlValue::Real(r),
            ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for SqlValue {
    /// Textual rendering used in report cells. NULL renders empty; blobs
    /// render as lowercase hex.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => Ok(()),
            SqlValue::Integer(i) => write!(f, "{i}"),
            SqlValue::Real(r) => write!(f, "{r}"),
            SqlValue::Text(t) => f.write_str(t),
            SqlValue::Blob(b) => {
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ResultSet
// ---------------------------------------------------------------------------

/// Captured query output: column names in declaration order and rows
/// aligned positionally with them. Read-only after capture.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

// ---------------------------------------------------------------------------
// connect / execute
// ---------------------------------------------------------------------------

/// Open a session to the metadata database. The database must already
/// exist; a report run never creates one.
pub fn connect(uri: &str) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI;
    Connection::open_with_flags(uri, flags).map_err(|e| ReportError::Connection(e.to_string()))
}

/// Execute one statement and capture its full result set.
pub fn execute(conn: &Connection, sql: &str) -> Result<ResultSet> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ReportError::QueryExecution(e.to_string()))?;

    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let column_count = columns.len();

    let mut rows = stmt
        .query([])
        .map_err(|e| ReportError::QueryExecution(e.to_string()))?;

    let mut data = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|e| ReportError::QueryExecution(e.to_string()))?
    {
        let mut record = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let value = row
                .get_ref(i)
                .map_err(|e| ReportError::QueryExecution(e.to_string()))?;
            record.push(SqlValue::from_ref(value));
        }
        data.push(record);
    }

    Ok(ResultSet {
        columns,
        rows: data,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
