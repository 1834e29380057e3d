use stakegov_shared_types::{decode_brr_option, encode_brr_option, power_128, Amount, BrrData, BPS};

#[test]
fn test_brr_codec_is_reachable_from_crate_root() {
    let packed = encode_brr_option(3_000, 2_000);
    assert_eq!(packed, Amount::from(3_000u64) * power_128() + Amount::from(2_000u64));

    let (rebate, reward) = decode_brr_option(packed);
    let data = BrrData::new(reward.as_u64(), rebate.as_u64(), 4, 9_999);
    assert_eq!(data.reward_bps, 2_000);
    assert_eq!(data.rebate_bps, 3_000);
    assert_eq!(data.burn_bps, BPS - 5_000);
}
