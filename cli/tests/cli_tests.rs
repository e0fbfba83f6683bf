use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};

const CUSTODIAN_STAR1: &str = "star1cccccccccccccccccccccccccccccccccccccc";
const ALICE_STAR1: &str = "star1nnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnn";
const ESCROW_STAR1: &str = "star1mmmmmmmmmmmmmmmmmmmmmmmmmmmmmmmmmmmmmm";
const ADMIN_STAR1: &str = "star1rrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrr";

fn iov(whole: u64) -> Value {
    json!([{ "whole": whole, "ticker": "IOV" }])
}

/// Writes a complete set of inputs into `dir` and returns the config path.
fn write_fixture(dir: &Path, escrow_source: &str) -> std::path::PathBuf {
    let dump = json!({
        "height": 1000,
        "cash": [
            { "address": "iov1custodian", "coins": iov(0) },
            { "address": "iov1alice", "coins": iov(10) },
            { "address": "iov1bob", "coins": iov(4) },
            { "address": "iov1burn", "coins": iov(7) },
            { "address": "iov1escrow", "coins": iov(3) },
        ],
        "username": [
            { "Username": "alice*iov", "Owner": "iov1alice",
              "Targets": [{ "blockchain_id": "iov-mainnet", "address": ALICE_STAR1 }] },
            { "Username": "bob*iov", "Owner": "iov1bob", "Targets": [] },
        ],
        "escrow": [
            { "source": escrow_source, "address": "iov1escrow", "amount": iov(3), "timeout": 1614556800 },
        ],
        "contract": {},
    });
    let template = json!({
        "chain_id": "iov-mainnet-ibc",
        "app_state": {
            "auth": { "accounts": [] },
            "starname": { "accounts": [], "domains": [] },
            "configuration": { "config": {} },
        },
    });

    fs::write(dir.join("dump.json"), dump.to_string()).unwrap();
    fs::write(dir.join("template.json"), template.to_string()).unwrap();
    fs::write(dir.join("flammable.json"), r#"["iov1burn"]"#).unwrap();
    fs::write(dir.join("reserved.json"), r#"["bank", "x", "Shop", "wallet"]"#).unwrap();

    let config = format!(
        r#"
network = "mainnet"
home = "home"
dump = "dump.json"
template = "template.json"
flammable = "flammable.json"
reserved = "reserved.json"
identity_map_out = "identities.json"
apply_corrections = false

[policy]
custodian = "iov1custodian"
reservation_admin = "{ADMIN_STAR1}"

[multisigs.iov1custodian]
name = "custodian of missing star1 accounts"
star1 = "{CUSTODIAN_STAR1}"

[escrow_sources.iov1source]
name = "vesting"
star1 = "{ESCROW_STAR1}"
"#
    );
    let path = dir.join("migrate.toml");
    fs::write(&path, config).unwrap();
    path
}

fn run(config: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_iov-migrate"))
        .arg("--config")
        .arg(config)
        .env_remove("RUST_LOG")
        .output()
        .expect("should execute iov-migrate")
}

#[test]
fn writes_patched_genesis_and_identity_map() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path(), "iov1source");

    let output = run(&config);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = fs::read_to_string(dir.path().join("home/config/genesis.json")).unwrap();
    assert!(text.ends_with("}\n"));
    let genesis: Value = serde_json::from_str(&text).unwrap();

    let accounts = genesis["app_state"]["auth"]["accounts"].as_array().unwrap();
    let balance = |address: &str| {
        accounts
            .iter()
            .find(|a| a["value"]["address"] == address)
            .map(|a| a["value"]["coins"][0]["amount"].as_str().unwrap().to_string())
    };
    assert_eq!(balance(ALICE_STAR1).as_deref(), Some("10000000"));
    // bob has no star1, so the custodian holds his 4 IOV
    assert_eq!(balance(CUSTODIAN_STAR1).as_deref(), Some("4000000"));
    assert_eq!(balance(ESCROW_STAR1).as_deref(), Some("3000000"));
    // 7 IOV burned
    assert_eq!(accounts.len(), 3);

    let names = genesis["app_state"]["starname"]["accounts"].as_array().unwrap();
    assert_eq!(names.len(), 2);
    let domains = genesis["app_state"]["starname"]["domains"].as_array().unwrap();
    let reserved: Vec<&str> = domains.iter().map(|d| d["name"].as_str().unwrap()).collect();
    assert_eq!(reserved, ["bank", "wallet"]);

    assert_eq!(
        genesis["app_state"]["configuration"]["config"]["configurer"],
        ADMIN_STAR1
    );

    let identities: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("identities.json")).unwrap())
            .unwrap();
    assert_eq!(identities["iov1alice"], ALICE_STAR1);
    assert_eq!(identities["iov1bob"], false);
}

#[test]
fn second_run_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path(), "iov1source");
    let genesis = dir.path().join("home/config/genesis.json");

    assert!(run(&config).status.success());
    let first = fs::read(&genesis).unwrap();
    assert!(run(&config).status.success());
    assert_eq!(first, fs::read(&genesis).unwrap());
}

#[test]
fn failure_exits_nonzero_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path(), "iov1stranger");

    let output = run(&config);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("iov1stranger"));
    assert!(!dir.path().join("home/config/genesis.json").exists());
}

#[test]
fn network_flag_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path(), "iov1source");

    // the template declares the mainnet chain id, so the testnet patch must refuse it
    let output = Command::new(env!("CARGO_BIN_EXE_iov-migrate"))
        .arg("--config")
        .arg(&config)
        .arg("--network")
        .arg("testnet")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("iovns-galaxynet"));
}
