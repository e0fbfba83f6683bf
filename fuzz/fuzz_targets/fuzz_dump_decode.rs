#![no_main]

use libfuzzer_sys::fuzz_target;

use iov_types::{Dump, Indicative, LegacyGenesis, PremiumDataset};

// Decoding arbitrary bytes as any input document must never panic, and a
// dump that decodes must survive the steps that only read or relabel it.
fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<LegacyGenesis>(data);
    let _ = serde_json::from_slice::<PremiumDataset>(data);
    if let Ok(indicatives) = serde_json::from_slice::<Vec<Indicative>>(data) {
        for indicative in &indicatives {
            let _ = indicative.claimed_address();
        }
    }

    if let Ok(mut dump) = serde_json::from_slice::<Dump>(data) {
        let total = dump.total_micro();
        iov_migration::label_all_accounts(&mut dump, &LegacyGenesis::default());
        iov_migration::remap_foreign_chain_ids(&mut dump, &Default::default());
        assert_eq!(dump.total_micro(), total);
        let _ = serde_json::to_vec(&dump);
    }
});
