use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_HISTORY_LIMIT: u64 = 30;

#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct Configuration {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    /// Roster seeded into an empty store, keyed by a short handle
    #[serde(default)]
    pub members: BTreeMap<String, Member>,
}

impl Configuration {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        Self::parse(&config)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let cfg: Self = toml::from_str(raw).context("invalid configuration")?;
        Ok(cfg)
    }
}

#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct DatabaseConfig {
    /// Directory holding `db.sqlite`
    pub path: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RotationConfig {
    #[serde(default = "default_history_limit")]
    pub history_limit: u64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        RotationConfig {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

fn default_history_limit() -> u64 {
    DEFAULT_HISTORY_LIMIT
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    pub birthday: Option<NaiveDate>,
    #[serde(default = "default_reliability")]
    pub reliability: f64,
}

fn default_reliability() -> f64 {
    1.0
}
