use anyhow::{bail, Context};

use chq_primitives::EpochRange;
use chq_query::{
    block_window, scan_rows, transactions_per_second, BlockStat, FromRow, NotExist, RowView,
    ScanError, SelectBuilder, ValidationError, BLOCK_HISTORY
};
use chq_storage::StoreRef;

use crate::chain::{ChainStateRef, RegistryRef, BLOCKS_PROTOCOL};


const SELECT_BLOCK_COUNTERS: &str =
    "SELECT transfer, execution, deposit_to_rewarding_fund, claim_from_rewarding_fund, \
     grant_reward, put_poll_result, `timestamp`";

const SELECT_ACTION_SUM: &str =
    "SELECT SUM(transfer)+SUM(execution)+SUM(deposit_to_rewarding_fund)+\
     SUM(claim_from_rewarding_fund)+SUM(grant_reward)+SUM(put_poll_result)";


/// Snapshot of where the chain stands right now. Derived fresh on every
/// request, never cached.
#[derive(Debug, Clone, Copy)]
pub struct ChainMeta {
    pub most_recent_epoch: u64,
    pub most_recent_block_height: u64,
    pub most_recent_tps: u64
}


struct ActionSum {
    total: Option<u64>
}


impl FromRow for ActionSum {
    const COLUMNS: usize = 1;

    fn from_row(row: &RowView<'_>) -> Result<Self, ScanError> {
        Ok(Self {
            total: row.opt_uint(0)?
        })
    }
}


/// Chain metadata facade. Stateless; all dependencies are injected at
/// construction and only read afterwards.
pub struct ChainMetaProtocol {
    store: StoreRef,
    chain: ChainStateRef,
    registry: RegistryRef
}


impl ChainMetaProtocol {
    pub fn new(store: StoreRef, chain: ChainStateRef, registry: RegistryRef) -> Self {
        Self {
            store,
            chain,
            registry
        }
    }

    /// Floor-rounded TPS over the trailing `window` blocks, clamped to
    /// the chain height when the chain is shorter than the window.
    pub fn most_recent_tps(&self, window: u64) -> anyhow::Result<u64> {
        if !self.registry.is_registered(BLOCKS_PROTOCOL) {
            bail!("blocks protocol is not registered");
        }
        if window == 0 {
            return Err(ValidationError::new("TPS block window must be greater than zero").into())
        }

        let (_, tip_height) = self.chain.current_epoch_and_height()
            .context("failed to get most recent block height")?;

        let (start, end) = block_window(tip_height, window);

        let stmt = SelectBuilder::select(SELECT_BLOCK_COUNTERS)
            .from_table(BLOCK_HISTORY)
            .filter_height_range(start, end)
            .build()
            .context("failed to compose block window query")?;

        let rows = self.store.query(&stmt.sql, &stmt.params)
            .context("failed to execute block window query")?;

        let stats: Vec<BlockStat> = scan_rows(&rows)
            .context("failed to scan block window")?;

        match transactions_per_second(&stats) {
            Some(tps) => Ok(tps),
            None => Err(NotExist).context("block window is empty")
        }
    }

    pub fn get_chain_meta(&self, window: u64) -> anyhow::Result<ChainMeta> {
        let (epoch, height) = self.chain.current_epoch_and_height()
            .context("failed to get most recent block height")?;

        let tps = self.most_recent_tps(window)
            .context("failed to get most recent TPS")?;

        Ok(ChainMeta {
            most_recent_epoch: epoch,
            most_recent_block_height: height,
            most_recent_tps: tps
        })
    }

    /// Total number of actions over the epoch range, summed query-side.
    pub fn get_number_of_actions(&self, range: EpochRange) -> anyhow::Result<u64> {
        let (current_epoch, _) = self.chain.current_epoch_and_height()
            .context("failed to get current epoch")?;

        if range.start_epoch > current_epoch {
            return Err(ValidationError::new(
                "start epoch should not be greater than current epoch"
            ).into())
        }

        let stmt = SelectBuilder::select(SELECT_ACTION_SUM)
            .from_table(BLOCK_HISTORY)
            .filter_epoch_range(range)
            .build()
            .context("failed to compose action count query")?;

        let rows = self.store.query(&stmt.sql, &stmt.params)
            .context("failed to execute action count query")?;

        let sums: Vec<ActionSum> = scan_rows(&rows)
            .context("failed to scan action count")?;

        match sums.first().and_then(|sum| sum.total) {
            Some(total) => Ok(total),
            None => Err(NotExist).context("no blocks within the epoch range")
        }
    }
}
