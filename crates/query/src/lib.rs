mod error;
mod metrics;
mod scan;
mod stmt;
mod tables;


pub use error::{NotExist, ValidationError};
pub use metrics::{block_window, transactions_per_second, BlockStat};
pub use scan::{scan_rows, FromRow, RowView, ScanError};
pub use stmt::{quoted_list, CompositionError, JoinedTables, SelectBuilder, Statement};
pub use tables::{BALANCE_HISTORY, BLOCK_HISTORY, HERMES_CONTRACT, VOTING_RESULT};
