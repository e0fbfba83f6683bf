//! Gentx collection against stand-in chain binaries (unix shell scripts).
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use iov_genesis::{genesis_path, GenesisError, GentxCollector};

fn script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("starnamed");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A home with a genesis and one gentx, plus the binary's scaffolding.
fn home_with_gentx() -> (tempfile::TempDir, PathBuf) {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("config");
    fs::create_dir_all(&config).unwrap();
    fs::write(genesis_path(home.path()), r#"{"b":[],"a":"x"}"#).unwrap();

    let gentxs = home.path().join("gentxs");
    fs::create_dir_all(&gentxs).unwrap();
    fs::write(gentxs.join("gentx-validator.json"), "{}").unwrap();
    (home, gentxs)
}

#[tokio::test]
async fn successful_collection_cleans_up_and_normalizes() {
    let bin = tempfile::tempdir().unwrap();
    let (home, gentxs) = home_with_gentx();
    // behaves like the chain binary: touches scaffolding and reformats genesis
    let binary = script(
        bin.path(),
        r#"home="$3"
mkdir -p "$home/data"
echo '{}' > "$home/config/node_key.json"
echo '{}' > "$home/config/app.toml"
printf '{"b":[1],"a":"x"}' > "$home/config/genesis.json"
echo "collected 1 gentx""#,
    );

    let ran = GentxCollector::new(binary)
        .collect(home.path(), &gentxs)
        .await
        .unwrap();

    assert!(ran);
    assert!(!home.path().join("data").exists());
    assert!(!home.path().join("config/node_key.json").exists());
    assert!(!home.path().join("config/app.toml").exists());
    assert_eq!(
        fs::read_to_string(genesis_path(home.path())).unwrap(),
        "{\n  \"a\": \"x\",\n  \"b\": [\n    1\n  ]\n}\n"
    );
}

#[tokio::test]
async fn error_marker_fails_even_on_zero_exit() {
    let bin = tempfile::tempdir().unwrap();
    let (home, gentxs) = home_with_gentx();
    let binary = script(bin.path(), "echo 'ERROR: invalid gentx signature'");

    let err = GentxCollector::new(binary)
        .collect(home.path(), &gentxs)
        .await
        .unwrap_err();

    match err {
        GenesisError::ExternalToolFailure { output, .. } => {
            assert!(output.contains("invalid gentx signature"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn panic_on_stderr_is_detected() {
    let bin = tempfile::tempdir().unwrap();
    let (home, gentxs) = home_with_gentx();
    let binary = script(bin.path(), "echo 'panic: runtime error' >&2");

    let result = GentxCollector::new(binary).collect(home.path(), &gentxs).await;
    assert!(matches!(result, Err(GenesisError::ExternalToolFailure { .. })));
}

#[tokio::test]
async fn non_zero_exit_fails() {
    let bin = tempfile::tempdir().unwrap();
    let (home, gentxs) = home_with_gentx();
    let binary = script(bin.path(), "echo 'bad flags'; exit 3");

    let result = GentxCollector::new(binary).collect(home.path(), &gentxs).await;
    assert!(matches!(
        result,
        Err(GenesisError::ExternalToolFailure { ref output, .. }) if output.contains("bad flags")
    ));
}

#[tokio::test]
async fn slow_binary_times_out() {
    let bin = tempfile::tempdir().unwrap();
    let (home, gentxs) = home_with_gentx();
    let binary = script(bin.path(), "sleep 5");

    let result = GentxCollector::new(binary)
        .with_timeout(Duration::from_millis(200))
        .collect(home.path(), &gentxs)
        .await;
    assert!(matches!(
        result,
        Err(GenesisError::ExternalToolFailure { ref reason, .. }) if reason.starts_with("timed out")
    ));
}
