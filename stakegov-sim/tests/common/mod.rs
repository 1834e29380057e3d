use stakegov_contracts::{LocalChain, LocalChainConfig};
use stakegov_sim::FuzzRunConfig;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A fresh chain deployed with `config`'s clock and parameters, every staker
/// holding the initial balance.
pub fn local_chain(config: &FuzzRunConfig) -> LocalChain {
    let mut chain = LocalChain::new(LocalChainConfig {
        genesis_time: config.genesis_time,
        start_time: config.start_time(),
        epoch_period: config.epoch_period,
        min_campaign_duration: config.rules.min_campaign_duration,
        network_fee_bps: config.initial_parameters.network_fee_bps,
        reward_bps: config.initial_parameters.reward_bps,
        rebate_bps: config.initial_parameters.rebate_bps,
    });
    for staker in config.stakers() {
        chain.mint(staker, config.initial_balance);
    }
    chain
}

pub fn seeded_config(seed: u64, num_runs: u64) -> FuzzRunConfig {
    FuzzRunConfig {
        seed: Some(seed),
        num_runs,
        ..FuzzRunConfig::default()
    }
}
