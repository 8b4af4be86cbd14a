use std::error::Error;
use std::fmt::{Display, Formatter};

use chq_storage::{RowSet, SqlValue};


/// A result row did not fit the target record shape.
#[derive(Debug)]
pub struct ScanError {
    pub message: String,
    pub column: Option<usize>
}


impl ScanError {
    pub fn new<S: ToString>(message: S) -> Self {
        Self {
            message: message.to_string(),
            column: None
        }
    }

    pub fn at(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}


impl Display for ScanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.column {
            Some(column) => write!(f, "ScanError: column {}: {}", column, self.message),
            None => write!(f, "ScanError: {}", self.message)
        }
    }
}


impl Error for ScanError {}


macro_rules! scan_error {
    ($($arg:tt)*) => {
        ScanError::new(format!($($arg)*))
    };
}
pub(crate) use scan_error;


/// One row of a result set, with typed positional accessors.
pub struct RowView<'a> {
    values: &'a [SqlValue]
}


impl<'a> RowView<'a> {
    pub fn new(values: &'a [SqlValue]) -> Self {
        Self {
            values
        }
    }

    pub fn int(&self, idx: usize) -> Result<i64, ScanError> {
        match self.value(idx)? {
            SqlValue::Int(v) => Ok(*v),
            other => Err(scan_error!("expected integer, got {:?}", other).at(idx))
        }
    }

    pub fn uint(&self, idx: usize) -> Result<u64, ScanError> {
        let v = self.int(idx)?;
        u64::try_from(v).map_err(|_| {
            scan_error!("expected non-negative integer, got {}", v).at(idx)
        })
    }

    /// NULL-tolerant variant of [`Self::uint`] for aggregate projections
    /// that yield NULL over an empty row set.
    pub fn opt_uint(&self, idx: usize) -> Result<Option<u64>, ScanError> {
        match self.value(idx)? {
            SqlValue::Null => Ok(None),
            _ => self.uint(idx).map(Some)
        }
    }

    pub fn real(&self, idx: usize) -> Result<f64, ScanError> {
        match self.value(idx)? {
            SqlValue::Real(v) => Ok(*v),
            SqlValue::Int(v) => Ok(*v as f64),
            other => Err(scan_error!("expected real, got {:?}", other).at(idx))
        }
    }

    pub fn text(&self, idx: usize) -> Result<&'a str, ScanError> {
        match self.value(idx)? {
            SqlValue::Text(v) => Ok(v),
            other => Err(scan_error!("expected text, got {:?}", other).at(idx))
        }
    }

    /// Decimal amounts are transported verbatim as strings to preserve
    /// precision. Aggregates may surface with integer or real affinity
    /// depending on the backend, so those are rendered, never converted.
    pub fn decimal(&self, idx: usize) -> Result<String, ScanError> {
        match self.value(idx)? {
            SqlValue::Text(v) => Ok(v.clone()),
            SqlValue::Int(v) => Ok(v.to_string()),
            SqlValue::Real(v) => Ok(v.to_string()),
            SqlValue::Null => Err(scan_error!("expected decimal, got NULL").at(idx))
        }
    }

    fn value(&self, idx: usize) -> Result<&'a SqlValue, ScanError> {
        self.values.get(idx).ok_or_else(|| {
            scan_error!("row has only {} columns", self.values.len()).at(idx)
        })
    }
}


/// An explicit per-shape column list - the record names its width and
/// how each position maps onto a field. One generic scan routine then
/// serves every shape without runtime reflection.
pub trait FromRow: Sized {
    const COLUMNS: usize;

    fn from_row(row: &RowView<'_>) -> Result<Self, ScanError>;
}


/// Maps a result set into typed records, preserving row order.
/// Zero rows produce an empty vector, not an error - translating that
/// into a domain-level "not found" is the facade's job.
pub fn scan_rows<T: FromRow>(set: &RowSet) -> Result<Vec<T>, ScanError> {
    if set.columns.len() != T::COLUMNS {
        return Err(scan_error!(
            "result has {} columns, target shape wants {}",
            set.columns.len(),
            T::COLUMNS
        ))
    }
    set.rows.iter()
        .map(|row| T::from_row(&RowView::new(row)))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;


    #[derive(Debug)]
    struct Pair {
        name: String,
        epoch: u64
    }

    impl FromRow for Pair {
        const COLUMNS: usize = 2;

        fn from_row(row: &RowView<'_>) -> Result<Self, ScanError> {
            Ok(Self {
                name: row.text(0)?.to_string(),
                epoch: row.uint(1)?
            })
        }
    }

    fn row_set(rows: Vec<Vec<SqlValue>>) -> RowSet {
        RowSet {
            columns: vec!["name".to_string(), "epoch".to_string()],
            rows
        }
    }

    #[test]
    fn test_scan_preserves_row_order() {
        let set = row_set(vec![
            vec![SqlValue::Text("a".to_string()), SqlValue::Int(3)],
            vec![SqlValue::Text("b".to_string()), SqlValue::Int(1)]
        ]);
        let pairs: Vec<Pair> = scan_rows(&set).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].name, "a");
        assert_eq!(pairs[0].epoch, 3);
        assert_eq!(pairs[1].name, "b");
        assert_eq!(pairs[1].epoch, 1);
    }

    #[test]
    fn test_zero_rows_is_not_an_error() {
        let pairs: Vec<Pair> = scan_rows(&row_set(vec![])).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_width_mismatch() {
        let set = RowSet {
            columns: vec!["name".to_string()],
            rows: vec![]
        };
        let err = scan_rows::<Pair>(&set).unwrap_err();
        assert!(err.to_string().contains("target shape wants 2"));
    }

    #[test]
    fn test_type_mismatch_names_the_column() {
        let set = row_set(vec![
            vec![SqlValue::Int(7), SqlValue::Int(3)]
        ]);
        let err = scan_rows::<Pair>(&set).unwrap_err();
        assert_eq!(err.column, Some(0));
    }

    #[test]
    fn test_decimal_accepts_aggregate_affinities() {
        let row = vec![SqlValue::Int(0)];
        assert_eq!(RowView::new(&row).decimal(0).unwrap(), "0");

        let row = vec![SqlValue::Text("123456789012345678901234567890".to_string())];
        assert_eq!(
            RowView::new(&row).decimal(0).unwrap(),
            "123456789012345678901234567890"
        );
    }
}
