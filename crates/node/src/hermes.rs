use anyhow::Context;

use chq_primitives::{EpochRange, Name, Pagination};
use chq_query::{
    scan_rows, FromRow, JoinedTables, NotExist, RowView, ScanError, SelectBuilder, Statement,
    BALANCE_HISTORY, HERMES_CONTRACT, VOTING_RESULT
};
use chq_storage::StoreRef;

use crate::config::HermesConfig;


const SELECT_VOTER_REWARD: &str =
    "SELECT `to`, from_epoch, to_epoch, amount, t1.action_hash, `timestamp`";

const SELECT_DELEGATE_REWARD: &str =
    "SELECT delegate_name, from_epoch, to_epoch, amount, t1.action_hash, `timestamp`";

const SELECT_DISTRIBUTION_RATIO: &str =
    "SELECT block_reward_percentage AS block_reward_ratio, \
     epoch_reward_percentage AS epoch_reward_ratio, \
     foundation_bonus_percentage AS foundation_bonus_ratio, epoch_number";

const SELECT_COUNT_AND_TOTAL: &str = "SELECT COUNT(*), IFNULL(SUM(amount), 0)";

const SELECT_DISTRIBUTION_META: &str =
    "SELECT COUNT(DISTINCT delegate_name), COUNT(DISTINCT `to`), IFNULL(SUM(amount), 0)";


/// One reward-distribution event received by a voter.
#[derive(Debug, Clone, PartialEq)]
pub struct VoterReward {
    pub voter_address: String,
    pub from_epoch: u64,
    pub to_epoch: u64,
    pub amount: String,
    pub action_hash: String,
    pub timestamp: String
}


impl FromRow for VoterReward {
    const COLUMNS: usize = 6;

    fn from_row(row: &RowView<'_>) -> Result<Self, ScanError> {
        Ok(Self {
            voter_address: row.text(0)?.to_string(),
            from_epoch: row.uint(1)?,
            to_epoch: row.uint(2)?,
            amount: row.decimal(3)?,
            action_hash: row.text(4)?.to_string(),
            timestamp: row.text(5)?.to_string()
        })
    }
}


/// One reward-distribution event sent by a delegate.
#[derive(Debug, Clone, PartialEq)]
pub struct DelegateReward {
    pub delegate_name: String,
    pub from_epoch: u64,
    pub to_epoch: u64,
    pub amount: String,
    pub action_hash: String,
    pub timestamp: String
}


impl FromRow for DelegateReward {
    const COLUMNS: usize = 6;

    fn from_row(row: &RowView<'_>) -> Result<Self, ScanError> {
        Ok(Self {
            delegate_name: row.text(0)?.to_string(),
            from_epoch: row.uint(1)?,
            to_epoch: row.uint(2)?,
            amount: row.decimal(3)?,
            action_hash: row.text(4)?.to_string(),
            timestamp: row.text(5)?.to_string()
        })
    }
}


/// Per-epoch reward split fractions, returned verbatim per row.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRatio {
    pub block_reward_ratio: f64,
    pub epoch_reward_ratio: f64,
    pub foundation_bonus_ratio: f64,
    pub epoch_number: u64
}


impl FromRow for DistributionRatio {
    const COLUMNS: usize = 4;

    fn from_row(row: &RowView<'_>) -> Result<Self, ScanError> {
        Ok(Self {
            block_reward_ratio: row.real(0)?,
            epoch_reward_ratio: row.real(1)?,
            foundation_bonus_ratio: row.real(2)?,
            epoch_number: row.uint(3)?
        })
    }
}


/// Count + precision-preserving total of distribution amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionCount {
    pub count: u64,
    pub total: String
}


impl FromRow for DistributionCount {
    const COLUMNS: usize = 2;

    fn from_row(row: &RowView<'_>) -> Result<Self, ScanError> {
        Ok(Self {
            count: row.uint(0)?,
            total: row.decimal(1)?
        })
    }
}


#[derive(Debug, Clone, PartialEq)]
pub struct DistributionMeta {
    pub delegate_count: u64,
    pub recipient_count: u64,
    pub total_amount: String
}


impl FromRow for DistributionMeta {
    const COLUMNS: usize = 3;

    fn from_row(row: &RowView<'_>) -> Result<Self, ScanError> {
        Ok(Self {
            delegate_count: row.uint(0)?,
            recipient_count: row.uint(1)?,
            total_amount: row.decimal(2)?
        })
    }
}


/// Hermes reward-distribution facade. Stateless; every operation
/// composes a statement, runs it, and shapes the rows.
pub struct HermesProtocol {
    store: StoreRef,
    source_addresses: Vec<String>
}


impl HermesProtocol {
    pub fn new(store: StoreRef, config: HermesConfig) -> Self {
        Self {
            store,
            source_addresses: config.multi_send_contract_addresses
        }
    }

    /// Voters rewarded through the given delegate, newest first.
    pub fn rewards_by_delegate(
        &self,
        range: EpochRange,
        page: Pagination,
        delegate_name: &str
    ) -> anyhow::Result<Vec<VoterReward>> {
        let stmt = SelectBuilder::select(SELECT_VOTER_REWARD)
            .from_joined(self.joined(range))
            .filter_eq("delegate_name", delegate_name)
            .order_by_desc("`timestamp`")
            .paginate(page)
            .build()
            .context("failed to compose rewards-by-delegate query")?;

        let rewards: Vec<VoterReward> = self.fetch(&stmt)
            .context("failed to fetch rewards by delegate")?;

        if rewards.is_empty() {
            return Err(NotExist).context("no distributions for the delegate")
        }
        Ok(rewards)
    }

    /// Delegates that rewarded the given voter, newest first.
    pub fn rewards_by_voter(
        &self,
        range: EpochRange,
        page: Pagination,
        voter_address: &str
    ) -> anyhow::Result<Vec<DelegateReward>> {
        let stmt = SelectBuilder::select(SELECT_DELEGATE_REWARD)
            .from_joined(self.joined(range))
            .filter_eq("`to`", voter_address)
            .order_by_desc("`timestamp`")
            .paginate(page)
            .build()
            .context("failed to compose rewards-by-voter query")?;

        let rewards: Vec<DelegateReward> = self.fetch(&stmt)
            .context("failed to fetch rewards by voter")?;

        if rewards.is_empty() {
            return Err(NotExist).context("no distributions for the voter")
        }
        Ok(rewards)
    }

    /// Stored per-epoch split ratios for a delegate - a plain filtered
    /// projection, no aggregation.
    pub fn distribution_ratio(
        &self,
        range: EpochRange,
        delegate_name: &str
    ) -> anyhow::Result<Vec<DistributionRatio>> {
        let stmt = SelectBuilder::select(SELECT_DISTRIBUTION_RATIO)
            .from_table(VOTING_RESULT)
            .filter_eq("delegate_name", delegate_name)
            .filter_epoch_range(range)
            .build()
            .context("failed to compose distribution ratio query")?;

        let ratios: Vec<DistributionRatio> = self.fetch(&stmt)
            .context("failed to fetch distribution ratios")?;

        if ratios.is_empty() {
            return Err(NotExist).context("no ratios for the delegate")
        }
        Ok(ratios)
    }

    pub fn count_by_delegate(
        &self,
        range: EpochRange,
        delegate_name: &str
    ) -> anyhow::Result<DistributionCount> {
        self.distribution_count(range, "delegate_name", delegate_name)
            .context("failed to count distributions by delegate")
    }

    pub fn count_by_voter(
        &self,
        range: EpochRange,
        voter_address: &str
    ) -> anyhow::Result<DistributionCount> {
        self.distribution_count(range, "`to`", voter_address)
            .context("failed to count distributions by voter")
    }

    /// Distinct delegate / recipient counts and the grand total over the
    /// epoch range. Always yields a row; an untouched range reports
    /// zeros rather than not-found.
    pub fn distribution_meta(&self, range: EpochRange) -> anyhow::Result<DistributionMeta> {
        let stmt = SelectBuilder::select(SELECT_DISTRIBUTION_META)
            .from_joined(self.joined(range))
            .build()
            .context("failed to compose distribution meta query")?;

        let metas: Vec<DistributionMeta> = self.fetch(&stmt)
            .context("failed to fetch distribution meta")?;

        metas.into_iter().next().ok_or_else(|| {
            anyhow::anyhow!("distribution meta aggregate returned no row")
        })
    }

    fn distribution_count(
        &self,
        range: EpochRange,
        column: Name,
        value: &str
    ) -> anyhow::Result<DistributionCount> {
        let stmt = SelectBuilder::select(SELECT_COUNT_AND_TOTAL)
            .from_joined(self.joined(range))
            .filter_eq(column, value)
            .build()
            .context("failed to compose distribution count query")?;

        let counts: Vec<DistributionCount> = self.fetch(&stmt)?;

        counts.into_iter().next().ok_or_else(|| {
            anyhow::anyhow!("distribution count aggregate returned no row")
        })
    }

    fn fetch<T: FromRow>(&self, stmt: &Statement) -> anyhow::Result<Vec<T>> {
        let rows = self.store.query(&stmt.sql, &stmt.params)
            .context("failed to execute query")?;
        let records = scan_rows(&rows).context("failed to scan result rows")?;
        Ok(records)
    }

    fn joined(&self, range: EpochRange) -> JoinedTables<'_> {
        JoinedTables {
            transfers: BALANCE_HISTORY,
            actions: HERMES_CONTRACT,
            sources: &self.source_addresses,
            range
        }
    }
}
