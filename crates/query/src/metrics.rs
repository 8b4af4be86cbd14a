use chq_primitives::BlockHeight;

use crate::scan::{FromRow, RowView, ScanError};


/// Per-block action counters from the block history table. Immutable
/// once read; the source of TPS and action-count aggregation.
#[derive(Debug, Clone, Copy)]
pub struct BlockStat {
    pub transfer: u64,
    pub execution: u64,
    pub deposit_to_rewarding_fund: u64,
    pub claim_from_rewarding_fund: u64,
    pub grant_reward: u64,
    pub put_poll_result: u64,
    pub timestamp: u64
}


impl BlockStat {
    pub fn action_count(&self) -> u64 {
        self.transfer
            + self.execution
            + self.deposit_to_rewarding_fund
            + self.claim_from_rewarding_fund
            + self.grant_reward
            + self.put_poll_result
    }
}


impl FromRow for BlockStat {
    const COLUMNS: usize = 7;

    fn from_row(row: &RowView<'_>) -> Result<Self, ScanError> {
        Ok(Self {
            transfer: row.uint(0)?,
            execution: row.uint(1)?,
            deposit_to_rewarding_fund: row.uint(2)?,
            claim_from_rewarding_fund: row.uint(3)?,
            grant_reward: row.uint(4)?,
            put_poll_result: row.uint(5)?,
            timestamp: row.uint(6)?
        })
    }
}


/// The trailing block window `[tip - window + 1, tip]`, clamped to
/// `[1, tip]` when the chain holds fewer blocks than requested.
pub fn block_window(tip_height: BlockHeight, window: u64) -> (BlockHeight, BlockHeight) {
    let span = window.min(tip_height);
    (tip_height - span + 1, tip_height)
}


/// Floor-rounded actions-per-second over a block window.
///
/// Elapsed time is `max(timestamp) - min(timestamp)`, floored at one
/// second so a single-block window (or blocks sharing a timestamp)
/// cannot divide by zero. Integer division throughout - the rate is a
/// floor-rounded whole number, matching what the API reports.
pub fn transactions_per_second(stats: &[BlockStat]) -> Option<u64> {
    if stats.is_empty() {
        return None
    }

    let mut total = 0;
    let mut earliest = stats[0].timestamp;
    let mut latest = stats[0].timestamp;

    for stat in stats.iter() {
        total += stat.action_count();
        earliest = earliest.min(stat.timestamp);
        latest = latest.max(stat.timestamp);
    }

    let elapsed = (latest - earliest).max(1);
    Some(total / elapsed)
}
