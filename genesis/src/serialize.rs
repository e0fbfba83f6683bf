//! Byte-stable genesis encoding.
//!
//! Keys come out sorted because `serde_json` is built without
//! `preserve_order`; indentation is two spaces and the file ends in a newline.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::GenesisError;

/// `<home>/config/genesis.json`.
pub fn genesis_path(home: &Path) -> PathBuf {
    home.join("config").join("genesis.json")
}

pub fn to_canonical_string(genesis: &Value) -> Result<String, GenesisError> {
    let mut text = serde_json::to_string_pretty(genesis).map_err(|source| GenesisError::Encode {
        what: "genesis",
        source,
    })?;
    text.push('\n');
    Ok(text)
}

/// Write `genesis` under `home`, creating `config/` if needed.
pub fn write_genesis(home: &Path, genesis: &Value) -> Result<PathBuf, GenesisError> {
    let path = genesis_path(home);
    let text = to_canonical_string(genesis)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| GenesisError::io(dir, source))?;
    }
    fs::write(&path, text).map_err(|source| GenesisError::io(&path, source))?;
    tracing::info!(path = %path.display(), "wrote genesis");
    Ok(path)
}

pub fn read_json(path: &Path) -> Result<Value, GenesisError> {
    let text = fs::read_to_string(path).map_err(|source| GenesisError::io(path, source))?;
    serde_json::from_str(&text).map_err(|source| GenesisError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Re-read the genesis under `home` and write it back canonically.
pub fn normalize_genesis(home: &Path) -> Result<PathBuf, GenesisError> {
    let genesis = read_json(&genesis_path(home))?;
    write_genesis(home, &genesis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_sorted_and_newline_terminated() {
        let doc = json!({ "b": 1, "a": { "d": [1, 2], "c": null } });
        let text = to_canonical_string(&doc).unwrap();
        assert_eq!(
            text,
            "{\n  \"a\": {\n    \"c\": null,\n    \"d\": [\n      1,\n      2\n    ]\n  },\n  \"b\": 1\n}\n"
        );
    }

    #[test]
    fn encoding_is_byte_stable() {
        let doc = json!({ "z": "last", "m": [{ "y": 2, "x": 1 }], "a": 1.5 });
        assert_eq!(
            to_canonical_string(&doc).unwrap(),
            to_canonical_string(&doc).unwrap()
        );
    }

    #[test]
    fn write_creates_config_dir() {
        let home = tempfile::tempdir().unwrap();
        let doc = json!({ "chain_id": "iov-mainnet-ibc" });

        let path = write_genesis(home.path(), &doc).unwrap();
        assert_eq!(path, home.path().join("config/genesis.json"));
        assert_eq!(read_json(&path).unwrap(), doc);
    }

    #[test]
    fn normalize_rewrites_foreign_formatting() {
        let home = tempfile::tempdir().unwrap();
        let path = genesis_path(home.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"b":1,    "a":2}"#).unwrap();

        normalize_genesis(home.path()).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\n  \"a\": 2,\n  \"b\": 1\n}\n"
        );
    }

    #[test]
    fn invalid_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(read_json(&path), Err(GenesisError::Json { path: p, .. }) if p == path));
    }
}
