//! Conversion of the normalized dump into new-ledger records.
//!
//! Stages run in a fixed order because each one reads what the previous one
//! left in the dump:
//!
//! 1. registered multisig wallets become accounts at their registered address;
//! 2. remaining wallets, largest first, become accounts when their owner is
//!    resolved and are swept into the custodian otherwise;
//! 3. usernames become starnames;
//! 4. premium names become domains;
//! 5. reserved names become domains held until a staggered release date.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use iov_types::{
    CustodianLedger, DomainKind, DomainRecord, Dump, IdentityMap, LegacyAddress, MultisigRegistry,
    NameRecord, NewAccount, NewAddress, PremiumDataset, Provenance, Resource, UsernameBinding,
    Wallet, TAG_ID, TAG_IOV1, TAG_NAME,
};

use crate::audit::{BurnLedger, BurnReason};
use crate::normalize::burn;
use crate::policy::MigrationPolicy;
use crate::MigrationError;

/// Everything the converter produces.
#[derive(Clone, Debug, Default)]
pub struct Conversion {
    pub accounts: Vec<NewAccount>,
    pub names: Vec<NameRecord>,
    pub domains: Vec<DomainRecord>,
    /// What the custodian holds on behalf of each unresolved owner. Also
    /// rendered into the custodian account's tags.
    pub custodian: CustodianLedger,
}

/// Inputs the converter reads besides the dump.
#[derive(Clone, Copy, Debug)]
pub struct ConvertContext<'a> {
    pub identities: &'a IdentityMap,
    pub multisigs: &'a MultisigRegistry,
    pub premiums: &'a PremiumDataset,
    pub reserved: &'a [String],
    pub policy: &'a MigrationPolicy,
}

/// Convert the dump. Wallets for multisigs and unresolved owners are burned
/// from the dump and recorded in `burns`.
pub fn convert(
    dump: &mut Dump,
    ctx: ConvertContext<'_>,
    burns: &mut BurnLedger,
) -> Result<Conversion, MigrationError> {
    ctx.policy.validate()?;

    let custodian_star1 = ctx
        .multisigs
        .get(&ctx.policy.custodian)
        .map(|entry| entry.star1.clone())
        .ok_or_else(|| MigrationError::not_found("custodian multisig", &ctx.policy.custodian))?;

    let mut converter = Converter {
        ctx,
        accounts: Vec::new(),
        by_address: BTreeMap::new(),
        custodian_index: 0,
        custodian_star1,
        ledger: CustodianLedger::new(),
    };

    converter.convert_multisigs(dump, burns)?;
    converter.convert_wallets(dump, burns);
    let names = converter.convert_usernames(dump)?;
    let mut domains = converter.convert_premiums();
    let claimed: BTreeSet<&str> = ctx.premiums.domains().collect();
    domains.extend(converter.convert_reserved(&claimed));

    Ok(converter.finish(names, domains))
}

struct Converter<'a> {
    ctx: ConvertContext<'a>,
    accounts: Vec<NewAccount>,
    /// Position of each address in `accounts`; every address appears once.
    by_address: BTreeMap<NewAddress, usize>,
    custodian_index: usize,
    custodian_star1: NewAddress,
    ledger: CustodianLedger,
}

impl Converter<'_> {
    fn convert_multisigs(
        &mut self,
        dump: &mut Dump,
        burns: &mut BurnLedger,
    ) -> Result<(), MigrationError> {
        let multisigs = self.ctx.multisigs;
        for (iov1, entry) in multisigs.iter() {
            let wallets = burn(dump, std::slice::from_ref(iov1))?;
            burns.record_all(BurnReason::Multisig, &wallets);
            let wallet = &wallets[0];

            let mut account = NewAccount::new(entry.star1.clone(), wallet.micro())
                .with_tag(TAG_NAME, entry.name.clone())
                .with_tag(TAG_IOV1, iov1.as_str());
            account.iov = Some(wallet.iov());
            if let Some(id) = wallet.tag(TAG_ID) {
                account.tags.insert(TAG_ID.to_string(), id.clone());
            }

            let index = self.push_account(account);
            if *iov1 == self.ctx.policy.custodian {
                self.custodian_index = index;
            }
        }
        tracing::info!(multisigs = self.accounts.len(), "converted multisig accounts");
        Ok(())
    }

    fn convert_wallets(&mut self, dump: &mut Dump, burns: &mut BurnLedger) {
        dump.cash.sort_by(|a, b| {
            b.micro()
                .cmp(&a.micro())
                .then_with(|| a.address.cmp(&b.address))
        });

        let identities = self.ctx.identities;
        let (resolved, unresolved): (Vec<Wallet>, Vec<Wallet>) = std::mem::take(&mut dump.cash)
            .into_iter()
            .partition(|w| identities.resolve(&w.address).is_some());

        for wallet in &resolved {
            if let Some(star1) = identities.resolve(&wallet.address) {
                self.push_account(ordinary_account(wallet, star1.clone()));
            }
        }

        burns.record_all(BurnReason::Custodial, &unresolved);
        let custodian = &mut self.accounts[self.custodian_index];
        for wallet in &unresolved {
            custodian.credit(wallet.micro(), wallet.iov());
            self.ledger
                .record(&wallet.address, Provenance::Balance(wallet.iov()));
        }

        tracing::info!(
            resolved = resolved.len(),
            custodial = unresolved.len(),
            custodian_balance = %custodian.balance(),
            "converted wallets"
        );
        dump.cash = resolved;
    }

    fn convert_usernames(&mut self, dump: &mut Dump) -> Result<Vec<NameRecord>, MigrationError> {
        dump.username.sort_by(|a, b| a.username.cmp(&b.username));

        let mut names = Vec::with_capacity(dump.username.len());
        for binding in &dump.username {
            let (name, domain) = binding
                .split()
                .ok_or_else(|| MigrationError::MalformedUsername(binding.username.clone()))?;
            let owner = self.owner_or_custodian(&binding.owner, &binding.username);

            names.push(NameRecord {
                domain: domain.to_string(),
                name: name.to_string(),
                owner,
                valid_until: self.ctx.policy.name_valid_until,
                resources: resources(binding),
                certificates: None,
                broker: String::new(),
                metadata_uri: String::new(),
            });
        }
        tracing::info!(starnames = names.len(), "converted usernames");
        Ok(names)
    }

    fn convert_premiums(&mut self) -> Vec<DomainRecord> {
        let premiums = self.ctx.premiums;
        let mut seen = BTreeSet::new();
        let mut domains = Vec::new();
        for (iov1, entry) in premiums.iter() {
            for starname in &entry.starnames {
                let name = starname.trim_start_matches('*');
                if !seen.insert(name) {
                    tracing::warn!(
                        %name,
                        holder = %iov1,
                        "premium domain listed twice, keeping first holder"
                    );
                    continue;
                }
                let admin = self.owner_or_custodian(iov1, &format!("*{name}"));
                domains.push(DomainRecord {
                    name: name.to_string(),
                    admin,
                    kind: DomainKind::Closed,
                    valid_until: self.ctx.policy.premium_valid_until,
                    broker: String::new(),
                });
            }
        }
        tracing::info!(premiums = domains.len(), "converted premium domains");
        domains
    }

    fn convert_reserved(&self, claimed: &BTreeSet<&str>) -> Vec<DomainRecord> {
        let mut seen = BTreeSet::new();
        let mut domains = Vec::new();
        for name in self.ctx.reserved {
            if claimed.contains(name.as_str()) || !seen.insert(name.as_str()) {
                tracing::debug!(%name, "reserved name already claimed");
                continue;
            }
            domains.push(DomainRecord {
                name: name.clone(),
                admin: self.ctx.policy.reservation_admin.clone(),
                kind: DomainKind::Closed,
                valid_until: self.ctx.policy.release_for(domains.len()),
                broker: String::new(),
            });
        }
        tracing::info!(reserved = domains.len(), "converted reserved domains");
        domains
    }

    /// Resolve `iov1`, or route `starname` to the custodian on its behalf.
    /// Append `account`, or fold it into the account already at its address.
    fn push_account(&mut self, account: NewAccount) -> usize {
        match self.by_address.get(&account.address) {
            Some(&index) => {
                tracing::info!(
                    address = %account.address,
                    iov1 = ?account.tags.get(TAG_IOV1),
                    "merging legacy wallets that share a star1"
                );
                self.accounts[index].absorb(account);
                index
            }
            None => {
                let index = self.accounts.len();
                self.by_address.insert(account.address.clone(), index);
                self.accounts.push(account);
                index
            }
        }
    }

    fn owner_or_custodian(&mut self, iov1: &LegacyAddress, starname: &str) -> NewAddress {
        match self.ctx.identities.resolve(iov1) {
            Some(star1) => star1.clone(),
            None => {
                self.ledger
                    .record(iov1, Provenance::Starname(starname.to_string()));
                self.custodian_star1.clone()
            }
        }
    }

    fn finish(mut self, names: Vec<NameRecord>, domains: Vec<DomainRecord>) -> Conversion {
        let custodian = &mut self.accounts[self.custodian_index];
        self.ledger.render_into(&mut custodian.tags);
        tracing::info!(
            owners = self.ledger.len(),
            balance = %custodian.balance(),
            "custodian holds unresolved owners"
        );
        Conversion {
            accounts: self.accounts,
            names,
            domains,
            custodian: self.ledger,
        }
    }
}

fn ordinary_account(wallet: &Wallet, star1: NewAddress) -> NewAccount {
    let mut account = NewAccount::new(star1, wallet.micro())
        .with_tag(TAG_IOV1, Value::from(wallet.address.as_str()));
    account.iov = Some(wallet.iov());
    if let Some(id) = wallet.tag(TAG_ID) {
        account.tags.insert(TAG_ID.to_string(), id.clone());
    }
    account
}

/// Targets other than the stale self-reference, as starname resources.
fn resources(binding: &UsernameBinding) -> Option<Vec<Resource>> {
    let resources: Vec<Resource> = binding
        .targets
        .iter()
        .filter(|t| t.address != binding.owner.as_str())
        .map(|t| Resource {
            uri: t.blockchain_id.clone(),
            resource: t.address.clone(),
        })
        .collect();
    (!resources.is_empty()).then_some(resources)
}
