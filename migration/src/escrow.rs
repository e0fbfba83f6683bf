//! Escrow consolidation.
//!
//! Every legacy escrow is grouped by the account that funded it and folded
//! into one new account per source at the address the escrow-source registry
//! designates. The escrow's own wallet is burned so its balance is not also
//! migrated as an ordinary account.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use iov_types::amount::{iov_float_total, iov_micro_total};
use iov_types::{Dump, Escrow, EscrowSourceRegistry, LegacyAddress, NewAccount, IOV_TICKER, TAG_NAME};
use iov_utils::unix_to_rfc3339;

use crate::audit::{BurnLedger, BurnReason};
use crate::normalize::burn;
use crate::MigrationError;

/// Audit tag listing each escrow folded into a consolidated account.
pub const TAG_TIMEOUTS: &str = "//timeouts";

/// Consolidate every escrow in the dump, returning one account per source.
///
/// All sources are checked against the registry before the dump is touched,
/// so an unknown source leaves the dump unchanged.
pub fn consolidate_escrows(
    dump: &mut Dump,
    sources: &EscrowSourceRegistry,
    burns: &mut BurnLedger,
) -> Result<BTreeMap<LegacyAddress, NewAccount>, MigrationError> {
    let mut groups: BTreeMap<LegacyAddress, Vec<Escrow>> = BTreeMap::new();
    for escrow in &dump.escrow {
        groups
            .entry(escrow.source.clone())
            .or_default()
            .push(escrow.clone());
    }

    if let Some(unknown) = groups.keys().find(|source| sources.get(source).is_none()) {
        return Err(MigrationError::UnknownEscrowSource(unknown.clone()));
    }

    let mut consolidated = BTreeMap::new();
    for (source, escrows) in groups {
        let Some(target) = sources.get(&source) else {
            return Err(MigrationError::UnknownEscrowSource(source));
        };

        for escrow in &escrows {
            let micro = iov_micro_total(&escrow.amount);
            let iov = iov_float_total(&escrow.amount);

            let wallets = burn(dump, std::slice::from_ref(&escrow.address))?;
            burns.record_all(BurnReason::Escrow, &wallets);

            let account = consolidated.entry(source.clone()).or_insert_with(|| {
                NewAccount::new(target.star1.clone(), Default::default())
                    .with_tag(TAG_NAME, target.name.clone())
                    .with_tag(TAG_TIMEOUTS, Value::Array(Vec::new()))
            });
            account.credit(micro, iov);

            let ticker = escrow
                .amount
                .first()
                .map(|c| c.ticker.as_str())
                .unwrap_or(IOV_TICKER);
            if let Some(Value::Array(timeouts)) = account.tags.get_mut(TAG_TIMEOUTS) {
                timeouts.push(json!({
                    "iov1": escrow.address.as_str(),
                    "iov": iov,
                    "ticker": ticker,
                    "timeout": escrow.timeout,
                    "iso": unix_to_rfc3339(escrow.timeout),
                }));
            }
        }

        tracing::info!(
            %source,
            target = %target.star1,
            escrows = escrows.len(),
            "consolidated escrows"
        );
    }

    Ok(consolidated)
}
