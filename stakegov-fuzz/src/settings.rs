//! Where a run's configuration comes from: the confy store, an explicit file,
//! then command line overrides.

use std::path::Path;

use anyhow::Context;
use stakegov_contracts::{Fault, LocalChain, LocalChainConfig};
use stakegov_sim::FuzzRunConfig;
use tracing::{error, info};

pub const APP_NAME: &str = "stakegov";
pub const CONFIG_NAME: &str = "fuzz-config";

/// Command line values that replace their configured counterpart when given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub runs: Option<u64>,
    pub seed: Option<u64>,
    pub stakers: Option<usize>,
    pub epoch_period: Option<u64>,
}

/// Loads `path` when given. Otherwise reads the user's stored configuration and
/// falls back to the defaults if there is none or it cannot be parsed.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FuzzRunConfig> {
    if let Some(path) = path {
        return confy::load_path(path).with_context(|| format!("loading configuration from {}", path.display()));
    }
    if let Ok(path) = confy::get_configuration_file_path(APP_NAME, CONFIG_NAME) {
        info!("Configuration file path: {:?}", path);
    }
    match confy::load(APP_NAME, CONFIG_NAME) {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}. Using default.", e);
            Ok(FuzzRunConfig::default())
        }
    }
}

pub fn store_config(config: &FuzzRunConfig) -> anyhow::Result<()> {
    confy::store(APP_NAME, CONFIG_NAME, config).context("storing configuration")
}

pub fn apply_overrides(config: &mut FuzzRunConfig, overrides: &Overrides) {
    if let Some(runs) = overrides.runs {
        config.num_runs = runs;
    }
    if overrides.seed.is_some() {
        config.seed = overrides.seed;
    }
    if let Some(stakers) = overrides.stakers {
        config.num_stakers = stakers;
    }
    if let Some(epoch_period) = overrides.epoch_period {
        config.epoch_period = epoch_period;
    }
}

/// Deploys a local chain matching `config` and funds every staker.
pub fn deploy_local_chain(config: &FuzzRunConfig, fault: Option<Fault>) -> LocalChain {
    let mut chain = LocalChain::new(LocalChainConfig {
        genesis_time: config.genesis_time,
        start_time: config.start_time(),
        epoch_period: config.epoch_period,
        min_campaign_duration: config.rules.min_campaign_duration,
        network_fee_bps: config.initial_parameters.network_fee_bps,
        reward_bps: config.initial_parameters.reward_bps,
        rebate_bps: config.initial_parameters.rebate_bps,
    });
    chain.inject_fault(fault);
    for staker in config.stakers() {
        chain.mint(staker, config.initial_balance);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakegov_sim::types::{ChainClock, DaoEndpoint};

    #[test]
    fn test_overrides_replace_only_given_values() {
        let mut config = FuzzRunConfig::default();
        apply_overrides(
            &mut config,
            &Overrides {
                runs: Some(40),
                seed: Some(3),
                ..Overrides::default()
            },
        );
        assert_eq!(config.num_runs, 40);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.num_stakers, FuzzRunConfig::default().num_stakers);
        assert_eq!(config.epoch_period, FuzzRunConfig::default().epoch_period);
    }

    #[test]
    fn test_unreadable_config_path_is_an_error() {
        // confy creates missing files with defaults, so point it below a file
        let blocker = std::env::temp_dir().join("stakegov-config-blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        assert!(load_config(Some(&blocker.join("fuzz.toml"))).is_err());
    }

    #[tokio::test]
    async fn test_deployed_chain_matches_config() {
        let config = FuzzRunConfig::default();
        let chain = deploy_local_chain(&config, Some(Fault::TieGoesToFirst));
        assert_eq!(chain.fault(), Some(Fault::TieGoesToFirst));
        assert_eq!(chain.token_total_supply().await.unwrap(), config.total_supply());
        assert_eq!(chain.token_balance(config.creator()).await.unwrap(), config.initial_balance);
        assert_eq!(chain.block_time().await.unwrap(), config.genesis_time);
        assert_eq!(chain.current_epoch().await.unwrap(), 0);
    }
}
