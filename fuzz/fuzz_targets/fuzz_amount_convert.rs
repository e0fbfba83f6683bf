#![no_main]

use libfuzzer_sys::fuzz_target;

use iov_types::amount::{iov_micro_total, FRACTIONAL_SCALE};
use iov_types::{LegacyCoin, MicroIov};

// Micro conversion of arbitrary whole/fractional pairs never panics and the
// total of a coin list equals the sum of its parts.
fuzz_target!(|data: &[u8]| {
    let coins: Vec<LegacyCoin> = data
        .chunks_exact(16)
        .map(|chunk| {
            let mut whole = [0u8; 8];
            let mut fractional = [0u8; 8];
            whole.copy_from_slice(&chunk[..8]);
            fractional.copy_from_slice(&chunk[8..]);
            LegacyCoin::iov(
                u64::from_le_bytes(whole),
                u64::from_le_bytes(fractional) % FRACTIONAL_SCALE,
            )
        })
        .collect();

    let sum: MicroIov = coins.iter().map(LegacyCoin::micro).sum();
    assert_eq!(iov_micro_total(&coins), sum);
    for coin in &coins {
        assert!(coin.micro().raw() >= u128::from(coin.whole) * 1_000_000);
    }
});
