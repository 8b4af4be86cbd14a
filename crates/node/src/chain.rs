use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;

use chq_primitives::{BlockHeight, EpochNumber, Pagination};
use chq_query::{scan_rows, FromRow, NotExist, RowView, ScanError, SelectBuilder, BLOCK_HISTORY};
use chq_storage::StoreRef;


pub const BLOCKS_PROTOCOL: &str = "blocks";


pub type ChainStateRef = Arc<dyn ChainState>;

pub type RegistryRef = Arc<dyn ProtocolRegistry>;


/// Where the chain currently stands, according to the indexed tables.
pub trait ChainState: Send + Sync {
    fn current_epoch_and_height(&self) -> anyhow::Result<(EpochNumber, BlockHeight)>;
}


/// Reports whether a named indexing sub-protocol populates its tables.
pub trait ProtocolRegistry: Send + Sync {
    fn is_registered(&self, name: &str) -> bool;
}


struct ChainTip {
    epoch: EpochNumber,
    height: BlockHeight
}


impl FromRow for ChainTip {
    const COLUMNS: usize = 2;

    fn from_row(row: &RowView<'_>) -> Result<Self, ScanError> {
        Ok(Self {
            epoch: row.uint(0)?,
            height: row.uint(1)?
        })
    }
}


/// Chain state read from the block history table.
pub struct StoreChainState {
    store: StoreRef
}


impl StoreChainState {
    pub fn new(store: StoreRef) -> Self {
        Self {
            store
        }
    }
}


impl ChainState for StoreChainState {
    fn current_epoch_and_height(&self) -> anyhow::Result<(EpochNumber, BlockHeight)> {
        let stmt = SelectBuilder::select("SELECT epoch_number, block_height")
            .from_table(BLOCK_HISTORY)
            .order_by_desc("block_height")
            .paginate(Pagination::new(0, 1).expect("size is positive"))
            .build()
            .context("failed to compose chain tip query")?;

        let rows = self.store.query(&stmt.sql, &stmt.params)
            .context("failed to execute chain tip query")?;

        let tips: Vec<ChainTip> = scan_rows(&rows)
            .context("failed to scan chain tip")?;

        match tips.first() {
            Some(tip) => Ok((tip.epoch, tip.height)),
            None => Err(NotExist).context("chain has no indexed blocks")
        }
    }
}


/// Registry backed by the configured protocol list.
pub struct ConfigRegistry {
    protocols: HashSet<String>
}


impl ConfigRegistry {
    pub fn new<I: IntoIterator<Item = String>>(protocols: I) -> Self {
        Self {
            protocols: protocols.into_iter().collect()
        }
    }
}


impl ProtocolRegistry for ConfigRegistry {
    fn is_registered(&self, name: &str) -> bool {
        self.protocols.contains(name)
    }
}
