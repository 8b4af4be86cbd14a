use std::sync::Arc;

use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use chq_primitives::{EpochRange, Pagination};

use crate::api::error::ApiError;
use crate::chainmeta::ChainMetaProtocol;
use crate::hermes::HermesProtocol;


mod error;


#[derive(Debug, Deserialize)]
struct WindowParams {
    window: Option<u64>
}


#[derive(Debug, Deserialize)]
struct RangeParams {
    start_epoch: u64,
    epoch_count: u64
}


#[derive(Debug, Deserialize)]
struct PageParams {
    start_epoch: u64,
    epoch_count: u64,
    #[serde(default)]
    offset: u64,
    #[serde(default = "default_page_size")]
    size: u64
}


fn default_page_size() -> u64 {
    25
}


impl RangeParams {
    fn epoch_range(&self) -> Result<EpochRange, ApiError> {
        epoch_range(self.start_epoch, self.epoch_count)
    }
}


impl PageParams {
    fn epoch_range(&self) -> Result<EpochRange, ApiError> {
        epoch_range(self.start_epoch, self.epoch_count)
    }

    fn pagination(&self) -> Result<Pagination, ApiError> {
        Pagination::new(self.offset, self.size).map_err(|msg| {
            ApiError::UserError(msg.to_string())
        })
    }
}


fn epoch_range(start_epoch: u64, epoch_count: u64) -> Result<EpochRange, ApiError> {
    EpochRange::new(start_epoch, epoch_count).map_err(|msg| {
        ApiError::UserError(msg.to_string())
    })
}


/// The thin API binding over the protocol facades. Holds no state of
/// its own beyond the facade handles.
#[derive(Clone)]
pub struct Api {
    chain_meta: Arc<ChainMetaProtocol>,
    hermes: Arc<HermesProtocol>,
    default_window: u64
}


impl Api {
    pub fn new(
        chain_meta: Arc<ChainMetaProtocol>,
        hermes: Arc<HermesProtocol>,
        default_window: u64
    ) -> Self {
        Self {
            chain_meta,
            hermes,
            default_window
        }
    }

    fn get_chain_meta(&self, params: WindowParams) -> Result<Json<JsonValue>, ApiError> {
        let window = params.window.unwrap_or(self.default_window);
        let meta = self.chain_meta.get_chain_meta(window)?;
        Ok(Json(json!({
            "mostRecentEpoch": meta.most_recent_epoch,
            "mostRecentBlockHeight": meta.most_recent_block_height,
            "mostRecentTPS": meta.most_recent_tps
        })))
    }

    fn get_action_count(&self, params: RangeParams) -> Result<Json<JsonValue>, ApiError> {
        let count = self.chain_meta.get_number_of_actions(params.epoch_range()?)?;
        Ok(Json(json!({
            "count": count
        })))
    }

    fn get_rewards_by_delegate(
        &self,
        delegate_name: &str,
        params: PageParams
    ) -> Result<Json<JsonValue>, ApiError> {
        let rewards = self.hermes.rewards_by_delegate(
            params.epoch_range()?,
            params.pagination()?,
            delegate_name
        )?;
        let rows: Vec<JsonValue> = rewards.iter().map(|reward| {
            json!({
                "voterAddress": reward.voter_address,
                "fromEpoch": reward.from_epoch,
                "toEpoch": reward.to_epoch,
                "amount": reward.amount,
                "actionHash": reward.action_hash,
                "timestamp": reward.timestamp
            })
        }).collect();
        Ok(Json(json!({
            "rewardDistribution": rows
        })))
    }

    fn get_rewards_by_voter(
        &self,
        voter_address: &str,
        params: PageParams
    ) -> Result<Json<JsonValue>, ApiError> {
        let rewards = self.hermes.rewards_by_voter(
            params.epoch_range()?,
            params.pagination()?,
            voter_address
        )?;
        let rows: Vec<JsonValue> = rewards.iter().map(|reward| {
            json!({
                "delegateName": reward.delegate_name,
                "fromEpoch": reward.from_epoch,
                "toEpoch": reward.to_epoch,
                "amount": reward.amount,
                "actionHash": reward.action_hash,
                "timestamp": reward.timestamp
            })
        }).collect();
        Ok(Json(json!({
            "rewardDistribution": rows
        })))
    }

    fn get_distribution_ratio(
        &self,
        delegate_name: &str,
        params: RangeParams
    ) -> Result<Json<JsonValue>, ApiError> {
        let ratios = self.hermes.distribution_ratio(params.epoch_range()?, delegate_name)?;
        let rows: Vec<JsonValue> = ratios.iter().map(|ratio| {
            json!({
                "blockRewardRatio": ratio.block_reward_ratio,
                "epochRewardRatio": ratio.epoch_reward_ratio,
                "foundationBonusRatio": ratio.foundation_bonus_ratio,
                "epochNumber": ratio.epoch_number
            })
        }).collect();
        Ok(Json(json!({
            "distributionRatio": rows
        })))
    }

    fn get_count_by_delegate(
        &self,
        delegate_name: &str,
        params: RangeParams
    ) -> Result<Json<JsonValue>, ApiError> {
        let count = self.hermes.count_by_delegate(params.epoch_range()?, delegate_name)?;
        Ok(Json(json!({
            "count": count.count,
            "totalAmount": count.total
        })))
    }

    fn get_count_by_voter(
        &self,
        voter_address: &str,
        params: RangeParams
    ) -> Result<Json<JsonValue>, ApiError> {
        let count = self.hermes.count_by_voter(params.epoch_range()?, voter_address)?;
        Ok(Json(json!({
            "count": count.count,
            "totalAmount": count.total
        })))
    }

    fn get_distribution_meta(&self, params: RangeParams) -> Result<Json<JsonValue>, ApiError> {
        let meta = self.hermes.distribution_meta(params.epoch_range()?)?;
        Ok(Json(json!({
            "numberOfDelegates": meta.delegate_count,
            "numberOfRecipients": meta.recipient_count,
            "totalRewardsDistributed": meta.total_amount
        })))
    }

    pub fn build_router(&self) -> Router {
        use axum::extract::*;
        use axum::response::IntoResponse;
        use axum::routing::get;

        async fn chain_meta(
            State(api): State<Api>,
            Query(params): Query<WindowParams>
        ) -> impl IntoResponse
        {
            api.get_chain_meta(params)
        }

        async fn action_count(
            State(api): State<Api>,
            Query(params): Query<RangeParams>
        ) -> impl IntoResponse
        {
            api.get_action_count(params)
        }

        async fn rewards_by_delegate(
            State(api): State<Api>,
            Path(delegate_name): Path<String>,
            Query(params): Query<PageParams>
        ) -> impl IntoResponse
        {
            api.get_rewards_by_delegate(&delegate_name, params)
        }

        async fn rewards_by_voter(
            State(api): State<Api>,
            Path(voter_address): Path<String>,
            Query(params): Query<PageParams>
        ) -> impl IntoResponse
        {
            api.get_rewards_by_voter(&voter_address, params)
        }

        async fn distribution_ratio(
            State(api): State<Api>,
            Path(delegate_name): Path<String>,
            Query(params): Query<RangeParams>
        ) -> impl IntoResponse
        {
            api.get_distribution_ratio(&delegate_name, params)
        }

        async fn count_by_delegate(
            State(api): State<Api>,
            Path(delegate_name): Path<String>,
            Query(params): Query<RangeParams>
        ) -> impl IntoResponse
        {
            api.get_count_by_delegate(&delegate_name, params)
        }

        async fn count_by_voter(
            State(api): State<Api>,
            Path(voter_address): Path<String>,
            Query(params): Query<RangeParams>
        ) -> impl IntoResponse
        {
            api.get_count_by_voter(&voter_address, params)
        }

        async fn distribution_meta(
            State(api): State<Api>,
            Query(params): Query<RangeParams>
        ) -> impl IntoResponse
        {
            api.get_distribution_meta(params)
        }

        Router::new()
            .route("/chain/meta", get(chain_meta))
            .route("/chain/actions/count", get(action_count))
            .route("/hermes/delegate/{name}/rewards", get(rewards_by_delegate))
            .route("/hermes/delegate/{name}/ratio", get(distribution_ratio))
            .route("/hermes/delegate/{name}/count", get(count_by_delegate))
            .route("/hermes/voter/{address}/rewards", get(rewards_by_voter))
            .route("/hermes/voter/{address}/count", get(count_by_voter))
            .route("/hermes/meta", get(distribution_meta))
            .with_state(self.clone())
    }
}
