mod common;

use stakegov_sim::types::{
    encode_brr_option, precision, Address, Amount, CampaignParams, CampaignType, ChainClock, DaoEndpoint,
    EpochClock, Timestamp,
};
use stakegov_sim::{CampaignRegistry, CampaignRules, InitialParameters, ReferenceModel, StakeLedger};

use common::{init_logger, local_chain, seeded_config};

fn pct(percent: u64) -> Amount {
    precision() * Amount::from(percent) / Amount::from(100u64)
}

#[test]
fn test_deposit_without_delegation_counts_fully() {
    let mut ledger = StakeLedger::new();
    let s = Address::derive("S");
    ledger.deposit(s, Amount::from(100u64), 1).unwrap();
    assert_eq!(ledger.resolved_stake(s, 1), Amount::from(100u64));
    assert_eq!(ledger.total_voting_power(s, 1), Amount::from(100u64));
}

#[test]
fn test_deposit_after_delegation_goes_to_representative() {
    let mut ledger = StakeLedger::new();
    let (s, r) = (Address::derive("S"), Address::derive("R"));
    ledger.delegate(s, r, 1).unwrap();
    let before = ledger.resolved_delegated_received(r, 1);
    ledger.deposit(s, Amount::from(50u64), 1).unwrap();
    assert_eq!(ledger.resolved_delegated_received(r, 1), before + Amount::from(50u64));
    assert_eq!(ledger.total_voting_power(s, 1), Amount::zero());
}

#[test]
fn test_quorum_met_at_twenty_percent() {
    let mut registry = CampaignRegistry::new(
        EpochClock::new(1_000, 500),
        CampaignRules::default(),
        InitialParameters::default(),
    );
    for c_percent in [0u64, 10, 20, 60, 80] {
        let params = CampaignParams {
            campaign_type: CampaignType::General,
            start_time: 1_100,
            end_time: 1_400,
            min_percentage: pct(20),
            c_param: pct(c_percent),
            t_param: Amount::zero(),
            options: vec![Amount::from(7u64), Amount::from(9u64)],
        };
        let id = registry.submit(params, Amount::from(1_000u64), 1_050).unwrap();
        registry
            .vote(id, 1, Address::derive("a"), Amount::from(150u64), 1, 1_200)
            .unwrap();
        registry
            .vote(id, 2, Address::derive("b"), Amount::from(50u64), 1, 1_200)
            .unwrap();
        let winner = registry.resolve_winner(id);
        if c_percent <= 75 {
            assert_eq!(winner.option_id, 1, "c = {}%", c_percent);
            assert_eq!(winner.value, Amount::from(7u64));
        } else {
            assert!(!winner.has_winner(), "c = {}%", c_percent);
        }
    }
}

/// Drives the same scripted history through the model and a local chain and
/// compares what both report at the end of every step.
#[tokio::test]
async fn test_scripted_history_matches_local_chain() {
    init_logger();
    let config = seeded_config(0, 0);
    let mut chain = local_chain(&config);
    let mut model = ReferenceModel::new(config.clock(), config.rules, config.initial_parameters);
    for staker in config.stakers() {
        model.fund(staker, config.initial_balance);
    }
    let stakers = config.stakers();
    let (alice, bob, carol) = (stakers[0], stakers[1], stakers[2]);
    let clock = config.clock();
    let unit = precision();
    let mut t: Timestamp = config.genesis_time;

    // epoch 0: stake and delegate
    t += 1;
    let now = t;
    chain.set_next_block_timestamp(now).await.unwrap();
    chain.deposit(alice, unit * 1_000).await.unwrap();
    model.deposit(alice, unit * 1_000, now).unwrap();

    t += 1;
    let now = t;
    chain.set_next_block_timestamp(now).await.unwrap();
    chain.deposit(bob, unit * 600).await.unwrap();
    model.deposit(bob, unit * 600, now).unwrap();

    t += 1;
    let now = t;
    chain.set_next_block_timestamp(now).await.unwrap();
    chain.delegate(bob, carol).await.unwrap();
    model.delegate(bob, carol, now).unwrap();

    // epoch 1: a network fee and a brr campaign
    let epoch_one = clock.epoch_start(1);
    t = epoch_one;
    let fee = CampaignParams {
        campaign_type: CampaignType::NetworkFee,
        start_time: epoch_one + 10,
        end_time: epoch_one + 200,
        min_percentage: Amount::zero(),
        c_param: Amount::zero(),
        t_param: precision(),
        options: vec![Amount::zero(), Amount::from(200u64), Amount::from(4_999u64)],
    };
    let brr = CampaignParams {
        campaign_type: CampaignType::FeeBrr,
        options: vec![
            encode_brr_option(0, 2_000),
            encode_brr_option(3_000, 0),
            encode_brr_option(3_000, 2_000),
        ],
        ..fee.clone()
    };
    for params in [fee, brr] {
        t += 1;
        let now = t;
        chain.set_next_block_timestamp(now).await.unwrap();
        let id = chain.submit_campaign(carol, &params).await.unwrap();
        assert_eq!(model.submit_campaign(params, now), Ok(id));
    }
    assert_eq!(chain.campaign_ids(1).await.unwrap(), model.registry().campaign_ids(1).to_vec());

    t = epoch_one + 20;
    for (voter, campaign, option) in [(alice, 1, 2), (carol, 1, 3), (alice, 2, 3), (carol, 2, 1), (alice, 1, 3)] {
        t += 1;
        let now = t;
        chain.set_next_block_timestamp(now).await.unwrap();
        chain.vote(voter, campaign, option).await.unwrap();
        model.vote(voter, campaign, option, now).unwrap();
        let actual = chain.campaign_vote_data(campaign).await.unwrap();
        assert_eq!(Some(&actual), model.registry().vote_data(campaign));
    }
    assert_eq!(chain.total_epoch_points(1).await.unwrap(), model.total_points(1));

    // bob's withdrawal lowers carol's votes
    t += 1;
    let now = t;
    chain.set_next_block_timestamp(now).await.unwrap();
    chain.withdraw(bob, unit * 400).await.unwrap();
    let effect = model.withdraw(bob, unit * 400, now).unwrap();
    assert_eq!(effect.representative, carol);
    assert_eq!(effect.reduced, unit * 400);
    for campaign in [1, 2] {
        let actual = chain.campaign_vote_data(campaign).await.unwrap();
        assert_eq!(Some(&actual), model.registry().vote_data(campaign));
    }
    for staker in [alice, bob, carol] {
        assert_eq!(chain.staker_data(staker, 1).await.unwrap(), model.staker_data(staker, 1, 1));
        assert_eq!(chain.latest_staker_data(staker).await.unwrap(), model.latest_staker_data(staker));
        assert_eq!(
            chain.current_reward_percentage(staker).await.unwrap(),
            model.current_reward_percentage(staker, now)
        );
    }

    // epoch 2: outcomes of epoch 1
    let rollover = clock.epoch_start(2) + 5;
    chain.mine_block_at(rollover).await.unwrap();
    for campaign in [1, 2] {
        let winner = chain.winning_option(campaign).await.unwrap();
        assert_eq!(winner, model.winning_option(campaign, rollover));
        assert!(winner.has_winner());
    }
    let fee = chain.refresh_network_fee().await.unwrap();
    assert_eq!(fee, model.refresh_network_fee(rollover));
    assert_eq!(fee.fee_bps, 4_999);
    let brr = chain.refresh_brr_data().await.unwrap();
    assert_eq!(brr, model.refresh_brr_data(rollover));
    assert_eq!((brr.reward_bps, brr.rebate_bps, brr.burn_bps), (2_000, 3_000, 5_000));
    for staker in [alice, bob, carol] {
        assert_eq!(
            chain.past_reward_percentage(staker, 1).await.unwrap(),
            model.past_reward_percentage(staker, 1, rollover)
        );
    }

    // epoch 3 has no campaign for epoch 2 and keeps the refreshed values
    chain.mine_block_at(clock.epoch_start(3)).await.unwrap();
    assert_eq!(chain.network_fee().await.unwrap().fee_bps, 4_999);
    assert_eq!(model.network_fee(clock.epoch_start(3)).fee_bps, 4_999);
}
