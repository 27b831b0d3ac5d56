//! SQLite access used by the built-in tools.
//!
//! Every operation opens its own connection on the blocking thread pool, so
//! a [`Database`] is cheap to clone and can be shared by several tools.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::task::{JoinError, spawn_blocking};

/// Rendered for statements that produce no result columns.
pub const EXECUTED: &str = "Query executed successfully.";

/// Rendered for a query that matched no rows.
pub const NO_ROWS: &str = "(no rows)";

/// Number of sample rows taken per table by [`Database::summarize`].
pub const SAMPLE_ROWS: usize = 3;

/// Errors produced by database operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The database file could not be opened as a SQLite database.
    #[error("cannot open database `{}`: {reason}", .path.display())]
    Open {
        /// Path of the database file.
        path: PathBuf,
        /// Why the file was rejected.
        reason: String,
    },

    /// SQLite rejected a statement.
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The blocking task running the statement did not complete.
    #[error("database task failed: {0}")]
    Join(#[from] JoinError),

    /// The schema overview could not be serialized.
    #[error("cannot serialize schema overview: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A handle to a SQLite database file.
#[derive(Clone, Debug)]
pub struct Database {
    path: Arc<Path>,
}

impl Database {
    /// Opens an existing database file.
    ///
    /// The file is never created; a missing or non-SQLite file is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::Open {
                path: path.to_owned(),
                reason: "no such file".to_owned(),
            });
        }

        let conn = connect(path)?;
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|err| Error::Open {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;

        debug!("opened database {}", path.display());
        Ok(Self { path: path.into() })
    }

    /// Returns the path of the database file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Executes one SQL statement and renders its result as text.
    ///
    /// Rows are rendered one per line with values separated by ` | `.
    pub async fn query(&self, sql: &str) -> Result<String, Error> {
        let sql = sql.to_owned();
        self.with_connection(move |conn| run_query(conn, &sql)).await
    }

    /// Returns the `CREATE` statements of all tables, one per line.
    pub async fn schema(&self) -> Result<String, Error> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT sql FROM sqlite_master WHERE type = 'table' \
                 AND sql IS NOT NULL",
            )?;
            let statements = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(statements.join("\n"))
        })
        .await
    }

    /// Returns a structured overview of all tables and their columns.
    pub async fn explore(&self) -> Result<SchemaOverview, Error> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table'",
            )?;
            let tables = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;

            let mut columns_stmt = conn.prepare(
                "SELECT name, type, \"notnull\", dflt_value, pk \
                 FROM pragma_table_info(?1)",
            )?;
            let mut details = Vec::with_capacity(tables.len());
            for table in tables {
                let columns = columns_stmt
                    .query_map([&table], |row| {
                        Ok(ColumnOverview {
                            name: row.get(0)?,
                            column_type: row.get(1)?,
                            notnull: row.get::<_, i64>(2)? != 0,
                            default: row.get(3)?,
                            pk: row.get::<_, i64>(4)? != 0,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                details.push(TableOverview { table, columns });
            }

            Ok(SchemaOverview {
                tables: details.len(),
                details,
            })
        })
        .await
    }

    /// Returns the row count and the first few rows of every table.
    pub async fn summarize(&self) -> Result<DatabaseSummary, Error> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table'",
            )?;
            let tables = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;

            let mut summaries = Vec::with_capacity(tables.len());
            for table in tables {
                let ident = quote_identifier(&table);
                let row_count = conn.query_row(
                    &format!("SELECT COUNT(*) FROM {ident}"),
                    [],
                    |row| row.get::<_, i64>(0),
                )?;

                let mut sample_stmt = conn
                    .prepare(&format!("SELECT * FROM {ident} LIMIT {SAMPLE_ROWS}"))?;
                let columns = sample_stmt
                    .column_names()
                    .into_iter()
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>();
                let mut rows = sample_stmt.query([])?;
                let mut sample_rows = Vec::new();
                while let Some(row) = rows.next()? {
                    let mut sample = Map::new();
                    for (idx, column) in columns.iter().enumerate() {
                        sample.insert(column.clone(), json_value(row.get_ref(idx)?));
                    }
                    sample_rows.push(sample);
                }

                summaries.push(TableSummary {
                    table,
                    row_count,
                    sample_rows,
                });
            }
            Ok(DatabaseSummary { tables: summaries })
        })
        .await
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
    {
        let path = Arc::clone(&self.path);
        spawn_blocking(move || {
            let conn = connect(&path)?;
            f(&conn)
        })
        .await?
    }
}

/// Tables of a database, as returned by [`Database::explore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SchemaOverview {
    /// Number of tables.
    pub tables: usize,
    /// Per-table column listing.
    pub details: Vec<TableOverview>,
}

impl SchemaOverview {
    /// Serializes the overview as compact JSON.
    #[inline]
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Columns of one table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableOverview {
    /// Table name.
    pub table: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnOverview>,
}

/// One column as reported by `PRAGMA table_info`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnOverview {
    /// Column name.
    pub name: String,
    /// Declared type, empty if none.
    #[serde(rename = "type")]
    pub column_type: String,
    /// Whether the column is `NOT NULL`.
    pub notnull: bool,
    /// Default value expression, if any.
    pub default: Option<String>,
    /// Whether the column is part of the primary key.
    pub pk: bool,
}

/// Row counts and sample rows, as returned by [`Database::summarize`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatabaseSummary {
    /// One entry per table.
    pub tables: Vec<TableSummary>,
}

impl DatabaseSummary {
    /// Serializes the summary as compact JSON.
    #[inline]
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Size and leading rows of one table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    /// Table name.
    pub table: String,
    /// Total number of rows.
    pub row_count: i64,
    /// Up to [`SAMPLE_ROWS`] rows keyed by column name.
    pub sample_rows: Vec<Map<String, Value>>,
}

fn connect(path: &Path) -> Result<Connection, Error> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Connection::open_with_flags(path, flags).map_err(|err| Error::Open {
        path: path.to_owned(),
        reason: err.to_string(),
    })
}

fn run_query(conn: &Connection, sql: &str) -> Result<String, Error> {
    let mut stmt = conn.prepare(sql)?;
    let column_count = stmt.column_count();
    if column_count == 0 {
        stmt.execute([])?;
        return Ok(EXECUTED.to_owned());
    }

    let mut rows = stmt.query([])?;
    let mut lines = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            values.push(render_value(row.get_ref(idx)?));
        }
        lines.push(values.join(" | "));
    }

    if lines.is_empty() {
        return Ok(NO_ROWS.to_owned());
    }
    Ok(lines.join("\n"))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(value) => Value::from(value),
        ValueRef::Real(value) => Value::from(value),
        ValueRef::Text(text) => {
            Value::String(String::from_utf8_lossy(text).into_owned())
        }
        ValueRef::Blob(blob) => {
            Value::String(format!("<blob {} bytes>", blob.len()))
        }
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_owned(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
        ValueRef::Blob(blob) => format!("<blob {} bytes>", blob.len()),
    }
}
