//! Identity resolution: legacy `iov1` owner → new `star1` address.
//!
//! Four evidence sources are applied in fixed precedence:
//!
//! 1. username targets (first `star1` target per owner),
//! 2. the multisig registry (authoritative, always overwrites),
//! 3. indicative transfers (must agree with anything already resolved),
//! 4. the premium dataset (fills gaps; disagreement only warns).
//!
//! The asymmetry between 3 and 4 is deliberate: a conflicting indicative
//! aborts the run, a conflicting premium entry does not.

use iov_types::{Dump, IdentityMap, Indicative, MultisigRegistry, NewAddress, PremiumDataset};

use crate::MigrationError;

/// Build the identity map from every evidence source.
pub fn resolve_identities(
    dump: &Dump,
    multisigs: &MultisigRegistry,
    indicatives: &[Indicative],
    premiums: &PremiumDataset,
) -> Result<IdentityMap, MigrationError> {
    let mut identities = IdentityMap::new();

    from_username_targets(&mut identities, dump);
    from_multisig_registry(&mut identities, multisigs);
    from_indicatives(&mut identities, indicatives)?;
    from_premiums(&mut identities, premiums);

    tracing::info!(
        known = identities.len(),
        resolved = identities.resolved_count(),
        "resolved legacy identities"
    );
    Ok(identities)
}

fn from_username_targets(identities: &mut IdentityMap, dump: &Dump) {
    for binding in &dump.username {
        if !identities.is_unresolved(&binding.owner) {
            continue;
        }
        let star1 = binding
            .targets
            .iter()
            .find_map(|t| NewAddress::parse(t.address.as_str()).ok());
        match star1 {
            Some(star1) => {
                identities.set(binding.owner.clone(), star1);
            }
            None if identities.get(&binding.owner).is_none() => {
                identities.mark_absent(binding.owner.clone());
            }
            None => {}
        }
    }
}

fn from_multisig_registry(identities: &mut IdentityMap, multisigs: &MultisigRegistry) {
    for (iov1, entry) in multisigs.iter() {
        if let Some(previous) = identities.set(iov1.clone(), entry.star1.clone()) {
            tracing::debug!(%iov1, ?previous, star1 = %entry.star1, "multisig registry overrides");
        }
    }
}

fn from_indicatives(
    identities: &mut IdentityMap,
    indicatives: &[Indicative],
) -> Result<(), MigrationError> {
    for indicative in indicatives {
        let iov1 = indicative.source();
        let claimed = indicative
            .claimed_address()
            .ok_or_else(|| MigrationError::MalformedMemo {
                payer: iov1.clone(),
                height: indicative.block_height,
                memo: indicative.memo().to_string(),
            })?;

        match identities.resolve(iov1) {
            None => {
                identities.set(iov1.clone(), claimed);
            }
            Some(current) if *current == claimed => {}
            Some(current) => {
                return Err(MigrationError::ConflictingIdentity {
                    legacy: iov1.clone(),
                    current: current.clone(),
                    claimed,
                });
            }
        }
    }
    Ok(())
}

fn from_premiums(identities: &mut IdentityMap, premiums: &PremiumDataset) {
    for (iov1, entry) in premiums.iter() {
        let Some(star1) = &entry.star1 else {
            continue;
        };
        match identities.resolve(iov1) {
            None => {
                identities.set(iov1.clone(), star1.clone());
            }
            Some(current) if current == star1 => {}
            Some(current) => {
                tracing::warn!(
                    %iov1,
                    current = %current,
                    premium = %star1,
                    "premium dataset disagrees with resolved star1; keeping resolved"
                );
            }
        }
    }
}
