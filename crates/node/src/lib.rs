mod api;
mod chain;
mod chainmeta;
mod cli;
mod config;
mod hermes;


pub use api::Api;
pub use chain::{ChainState, ChainStateRef, ConfigRegistry, ProtocolRegistry, RegistryRef, StoreChainState, BLOCKS_PROTOCOL};
pub use chainmeta::{ChainMeta, ChainMetaProtocol};
pub use cli::CLI;
pub use config::{Config, HermesConfig};
pub use hermes::{DelegateReward, DistributionCount, DistributionMeta, DistributionRatio, HermesProtocol, VoterReward};
