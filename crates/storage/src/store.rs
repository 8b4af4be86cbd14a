use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::value::SqlValue;


pub type Row = Vec<SqlValue>;

pub type StoreRef = Arc<dyn Store>;


/// An ordered query result - column names plus one value vector per row.
#[derive(Debug, Clone)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>
}


/// Read-only access to the tables maintained by the external indexing
/// pipeline. Implementations must tolerate concurrent callers.
pub trait Store: Send + Sync {
    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RowSet, StorageError>;
}


#[derive(Debug)]
pub struct StorageError {
    pub message: String,
    source: Option<Box<dyn Error + Send + Sync>>
}


impl StorageError {
    pub fn new<S: ToString>(message: S) -> Self {
        Self {
            message: message.to_string(),
            source: None
        }
    }

    pub fn with_source<S, E>(message: S, source: E) -> Self
    where
        S: ToString,
        E: Error + Send + Sync + 'static
    {
        Self {
            message: message.to_string(),
            source: Some(Box::new(source))
        }
    }
}


impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.source.as_ref() {
            Some(source) => write!(f, "StorageError: {}: {}", self.message, source),
            None => write!(f, "StorageError: {}", self.message)
        }
    }
}


impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|err| err as &(dyn Error + 'static))
    }
}
