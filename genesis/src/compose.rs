//! Merge migration output into a Starname genesis template.
//!
//! The template is an arbitrary JSON document; only three collections are
//! touched and every one of them must already exist (an explicit `null` counts
//! as an empty collection).

use serde::Serialize;
use serde_json::{json, Map, Value};

use iov_migration::MigrationOutput;
use iov_types::NewAccount;

use crate::GenesisError;

pub const AUTH_ACCOUNTS: &[&str] = &["app_state", "auth", "accounts"];
pub const STARNAME_ACCOUNTS: &[&str] = &["app_state", "starname", "accounts"];
pub const STARNAME_DOMAINS: &[&str] = &["app_state", "starname", "domains"];

/// Amino type of every account in `app_state.auth.accounts`.
pub const ACCOUNT_TYPE: &str = "cosmos-sdk/Account";

/// Append accounts, starnames and domains to `genesis`.
///
/// Converted accounts come first, consolidated escrow accounts after them.
pub fn compose(genesis: &mut Value, output: &MigrationOutput) -> Result<(), GenesisError> {
    let accounts = output
        .all_accounts()
        .map(auth_account)
        .collect::<Result<Vec<_>, _>>()?;
    let names = encode_all(&output.conversion.names, "starname")?;
    let domains = encode_all(&output.conversion.domains, "domain")?;

    // look up every section before appending to any of them
    section(genesis, AUTH_ACCOUNTS)?;
    section(genesis, STARNAME_ACCOUNTS)?;
    section(genesis, STARNAME_DOMAINS)?;

    let counts = (accounts.len(), names.len(), domains.len());
    section(genesis, AUTH_ACCOUNTS)?.extend(accounts);
    section(genesis, STARNAME_ACCOUNTS)?.extend(names);
    section(genesis, STARNAME_DOMAINS)?.extend(domains);

    tracing::info!(
        accounts = counts.0,
        starnames = counts.1,
        domains = counts.2,
        "composed genesis"
    );
    Ok(())
}

/// Wrap a migrated account the way the auth module expects it.
pub fn auth_account(account: &NewAccount) -> Result<Value, GenesisError> {
    let mut value = encode(account, "account")?;
    if let Value::Object(fields) = &mut value {
        fields.insert("public_key".into(), Value::Null);
        fields.insert("account_number".into(), Value::from("0"));
        fields.insert("sequence".into(), Value::from("0"));
    }
    Ok(json!({ "type": ACCOUNT_TYPE, "value": value }))
}

/// Mutable handle on the array at `path`, turning `null` into `[]`.
pub fn section<'a>(
    genesis: &'a mut Value,
    path: &[&str],
) -> Result<&'a mut Vec<Value>, GenesisError> {
    let missing = || GenesisError::MissingSection(path.join("."));

    let mut cursor = genesis;
    for key in path {
        cursor = cursor
            .as_object_mut()
            .and_then(|object| object.get_mut(*key))
            .ok_or_else(missing)?;
    }
    if cursor.is_null() {
        *cursor = Value::Array(Vec::new());
    }
    cursor.as_array_mut().ok_or_else(missing)
}

/// Mutable handle on the object at `path`.
pub fn object<'a>(
    genesis: &'a mut Value,
    path: &[&str],
) -> Result<&'a mut Map<String, Value>, GenesisError> {
    let mut cursor = genesis;
    for key in path {
        cursor = cursor
            .as_object_mut()
            .and_then(|object| object.get_mut(*key))
            .ok_or_else(|| GenesisError::MissingSection(path.join(".")))?;
    }
    cursor
        .as_object_mut()
        .ok_or_else(|| GenesisError::MissingSection(path.join(".")))
}

fn encode<T: Serialize>(value: &T, what: &'static str) -> Result<Value, GenesisError> {
    serde_json::to_value(value).map_err(|source| GenesisError::Encode { what, source })
}

fn encode_all<T: Serialize>(items: &[T], what: &'static str) -> Result<Vec<Value>, GenesisError> {
    items.iter().map(|item| encode(item, what)).collect()
}
