mod sqlite;
mod store;
mod value;


pub use sqlite::SqliteStore;
pub use store::{Row, RowSet, StorageError, Store, StoreRef};
pub use value::SqlValue;
