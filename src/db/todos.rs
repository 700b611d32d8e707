//! Todo CRUD operations.

use super::Database;
use crate::error::AppError;
use crate::types::{Todo, TodoStatus, is_valid_task};
use anyhow::Result;
use chrono::NaiveDateTime;
use rusqlite::types::{Type, ValueRef};
use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

const TODO_COLUMNS: &str = "id, task, status, created_at";

/// `created_at` as epoch milliseconds whether stored as integer or timestamp text.
const CREATED_AT_MILLIS: &str = "CASE WHEN typeof(created_at) = 'text' \
     THEN CAST((julianday(created_at) - 2440587.5) * 86400000 AS INTEGER) \
     ELSE created_at END";

/// Text layouts SQLite's `CURRENT_TIMESTAMP` and `datetime()` produce (UTC).
const SQLITE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Read `created_at` as epoch milliseconds.
///
/// Rows written by this crate hold integer milliseconds. Stores created with a
/// `TIMESTAMP DEFAULT CURRENT_TIMESTAMP` column hold SQLite timestamp text instead.
fn created_at_millis(row: &Row, idx: usize) -> rusqlite::Result<i64> {
    match row.get_ref(idx)? {
        ValueRef::Integer(ms) => Ok(ms),
        ValueRef::Real(ms) => Ok(ms as i64),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?;
            parse_sqlite_timestamp(text).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    Type::Text,
                    format!("unrecognised timestamp '{}'", text).into(),
                )
            })
        }
        other => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "created_at".to_string(),
            other.data_type(),
        )),
    }
}

/// Parse SQLite timestamp text (UTC) into epoch milliseconds.
pub fn parse_sqlite_timestamp(text: &str) -> Option<i64> {
    SQLITE_TIMESTAMP_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(text.trim(), fmt)
            .ok()
            .map(|dt| dt.and_utc().timestamp_millis())
    })
}

pub fn parse_todo_row(row: &Row) -> rusqlite::Result<Todo> {
    let status: String = row.get("status")?;
    let status = status
        .parse::<TodoStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(Todo {
        id: row.get("id")?,
        task: row.get("task")?,
        status,
        created_at: created_at_millis(row, 3)?,
    })
}

impl Database {
    /// Insert a new todo and return its store-assigned id.
    pub fn create_todo(&self, task: &str, status: TodoStatus) -> Result<i64> {
        if !is_valid_task(task) {
            return Err(AppError::missing_field("task").into());
        }

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO todos (task, status) VALUES (?1, ?2)",
                params![task, status.as_str()],
            )?;
            let id = conn.last_insert_rowid();
            debug!(id, status = %status, "Created todo");
            Ok(id)
        })
    }

    /// List every todo, newest first.
    pub fn list_todos(&self) -> Result<Vec<Todo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM todos ORDER BY {} DESC, id DESC",
                TODO_COLUMNS, CREATED_AT_MILLIS
            ))?;
            let todos = stmt
                .query_map([], parse_todo_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(todos)
        })
    }

    /// Get a single todo by id.
    pub fn get_todo(&self, id: i64) -> Result<Option<Todo>> {
        self.with_conn(|conn| {
            let todo = conn
                .query_row(
                    &format!("SELECT {} FROM todos WHERE id = ?1", TODO_COLUMNS),
                    params![id],
                    parse_todo_row,
                )
                .optional()?;
            Ok(todo)
        })
    }

    /// Change the status of a todo.
    ///
    /// Fails with `TodoNotFound` when no row has this id.
    pub fn update_todo_status(&self, id: i64, status: TodoStatus) -> Result<()> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE todos SET status = ?1 WHERE id = ?2",
                params![status.as_str(), id],
            )?;
            if updated == 0 {
                return Err(AppError::todo_not_found(id).into());
            }
            debug!(id, status = %status, "Updated todo status");
            Ok(())
        })
    }

    /// Permanently delete a todo. Deleting a missing id is a no-op.
    pub fn delete_todo(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
            debug!(id, deleted, "Deleted todo");
            Ok(())
        })
    }
}
