//! Migration run configuration with TOML file support.
//!
//! Relative paths in the file are taken relative to the file's directory so a
//! config can live next to its inputs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use iov_migration::MigrationPolicy;
use iov_types::{ChainIdTable, EscrowSourceRegistry, MultisigRegistry, NetworkId};
use iov_utils::LogFormat;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Network whose patch is applied. No patch when absent.
    #[serde(default)]
    pub network: Option<NetworkId>,

    /// Chain home; the genesis is written to `<home>/config/genesis.json`.
    #[serde(default = "default_home")]
    pub home: PathBuf,

    pub dump: PathBuf,

    /// Starname genesis template the output is appended to.
    pub template: PathBuf,

    #[serde(default)]
    pub legacy_genesis: Option<PathBuf>,

    #[serde(default)]
    pub flammable: Option<PathBuf>,

    #[serde(default)]
    pub indicatives: Option<PathBuf>,

    #[serde(default)]
    pub premiums: Option<PathBuf>,

    #[serde(default)]
    pub reserved: Option<PathBuf>,

    /// Directory of pre-collected validator gentxs.
    #[serde(default)]
    pub gentx_dir: Option<PathBuf>,

    /// Chain binary used for `collect-gentxs`.
    #[serde(default = "default_chain_binary")]
    pub chain_binary: PathBuf,

    #[serde(default = "default_gentx_timeout_secs")]
    pub gentx_timeout_secs: u64,

    /// Where to write the resolved identity map, for auditing.
    #[serde(default)]
    pub identity_map_out: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub apply_corrections: bool,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    pub policy: MigrationPolicy,

    #[serde(default)]
    pub multisigs: MultisigRegistry,

    #[serde(default)]
    pub escrow_sources: EscrowSourceRegistry,

    #[serde(default)]
    pub chain_ids: ChainIdTable,
}

fn default_home() -> PathBuf {
    PathBuf::from("./starname_home")
}

fn default_chain_binary() -> PathBuf {
    PathBuf::from("starnamed")
}

fn default_gentx_timeout_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl MigrationConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Make every relative input path relative to `base`.
    fn rebase(&mut self, base: &Path) {
        let join = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        join(&mut self.home);
        join(&mut self.dump);
        join(&mut self.template);
        for path in [
            &mut self.legacy_genesis,
            &mut self.flammable,
            &mut self.indicatives,
            &mut self.premiums,
            &mut self.reserved,
            &mut self.gentx_dir,
            &mut self.identity_map_out,
        ]
        .into_iter()
        .flatten()
        {
            join(path);
        }
    }
}
