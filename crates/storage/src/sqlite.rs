use std::sync::Mutex;

use rusqlite::types::Value;
use rusqlite::Connection;

use crate::store::{RowSet, StorageError, Store};
use crate::value::SqlValue;


/// SQLite-backed [`Store`]. The connection sits behind a mutex, so
/// concurrent facade calls serialize at the driver boundary.
pub struct SqliteStore {
    conn: Mutex<Connection>
}


impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|err| {
            StorageError::with_source(format!("failed to open database '{}'", path), err)
        })?;
        Ok(Self {
            conn: Mutex::new(conn)
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|err| {
            StorageError::with_source("failed to open in-memory database", err)
        })?;
        Ok(Self {
            conn: Mutex::new(conn)
        })
    }

    /// Runs a batch of statements verbatim. Table setup belongs to the
    /// indexing pipeline; this exists for test fixtures.
    pub fn execute_batch(&self, sql: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(|err| {
            StorageError::with_source("failed to execute statement batch", err)
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| {
            StorageError::new("database connection lock was poisoned")
        })
    }
}


impl Store for SqliteStore {
    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RowSet, StorageError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(sql).map_err(|err| {
            StorageError::with_source("failed to prepare statement", err)
        })?;

        let columns: Vec<String> = stmt.column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut cursor = stmt.query(
            rusqlite::params_from_iter(params.iter().map(bind_value))
        ).map_err(|err| {
            StorageError::with_source("failed to execute statement", err)
        })?;

        let mut rows = Vec::new();
        loop {
            let row = match cursor.next() {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(err) => {
                    return Err(StorageError::with_source("failed to read result row", err))
                }
            };
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                let value: Value = row.get(idx).map_err(|err| {
                    StorageError::with_source(
                        format!("failed to read column {}", idx),
                        err
                    )
                })?;
                values.push(result_value(value, idx)?);
            }
            rows.push(values);
        }

        Ok(RowSet {
            columns,
            rows
        })
    }
}


fn bind_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Int(v) => Value::Integer(*v),
        SqlValue::Real(v) => Value::Real(*v),
        SqlValue::Text(v) => Value::Text(v.clone())
    }
}


fn result_value(value: Value, idx: usize) -> Result<SqlValue, StorageError> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Integer(v) => Ok(SqlValue::Int(v)),
        Value::Real(v) => Ok(SqlValue::Real(v)),
        Value::Text(v) => Ok(SqlValue::Text(v)),
        Value::Blob(_) => Err(
            StorageError::new(format!("unexpected blob value in column {}", idx))
        )
    }
}


#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn test_query_binds_params_and_preserves_row_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.execute_batch(
            "CREATE TABLE t (n INTEGER, label TEXT);
             INSERT INTO t VALUES (3, 'c'), (1, 'a'), (2, 'b');"
        ).unwrap();

        let result = store.query(
            "SELECT n, label FROM t WHERE n >= ? ORDER BY n",
            &[SqlValue::Int(2)]
        ).unwrap();

        assert_eq!(result.columns, vec!["n", "label"]);
        assert_eq!(result.rows, vec![
            vec![SqlValue::Int(2), SqlValue::Text("b".to_string())],
            vec![SqlValue::Int(3), SqlValue::Text("c".to_string())]
        ]);
    }

    #[test]
    fn test_prepare_failure_is_a_storage_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.query("SELECT * FROM missing_table", &[]).unwrap_err();
        assert!(err.to_string().contains("failed to prepare statement"));
    }
}
