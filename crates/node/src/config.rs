use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub hermes: HermesConfig,
    #[serde(default = "default_tps_window")]
    pub tps_window: u64,
    #[serde(default = "default_protocols")]
    pub protocols: Vec<String>,
    #[serde(default = "default_listen")]
    pub listen: String
}


/// Hermes reward-distribution settings. The multi-send contract
/// addresses are operator-supplied and trusted - they are rendered into
/// the IN-clause as quoted literals rather than bound parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HermesConfig {
    pub multi_send_contract_addresses: Vec<String>
}


fn default_tps_window() -> u64 {
    20
}


fn default_protocols() -> Vec<String> {
    vec!["blocks".to_string()]
}


fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}


impl Config {
    pub fn read(file: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_reader(
            std::io::BufReader::new(std::fs::File::open(file)?)
        )?;
        config.validate().context("invalid config")?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            !self.hermes.multi_send_contract_addresses.is_empty(),
            "at least one hermes multi-send contract address is required"
        );
        ensure!(self.tps_window > 0, "tps window must be positive");
        Ok(())
    }
}
