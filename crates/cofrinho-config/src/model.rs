use serde::{de::Deserializer, Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
};

use cofrinho_domain::{Category, ContractPolicy, OwnerId};

use crate::ConfigError;

pub const DEFAULT_BACKUP_RETENTION: usize = 5;

/// Stores user-configurable CLI preferences and the wallet location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Identity the wallet is scoped to.
    #[serde(default = "Config::default_owner")]
    pub owner: String,
    #[serde(default)]
    pub default_category: Category,
    /// Overrides the build default (strict in debug, lenient in release).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_policy: Option<ContractPolicy>,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom root for wallets and backups. Defaults to the app data directory.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "pt-BR".into(),
            currency: "BRL".into(),
            owner: Self::default_owner(),
            default_category: Category::default(),
            contract_policy: None,
            backup_retention: Self::default_backup_retention(),
            theme: Theme::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_owner() -> String {
        "local".into()
    }

    pub fn default_backup_retention() -> usize {
        DEFAULT_BACKUP_RETENTION
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn owner_id(&self) -> Result<OwnerId, ConfigError> {
        OwnerId::new(self.owner.as_str())
            .ok_or_else(|| ConfigError::Invalid("owner must not be blank".into()))
    }

    pub fn resolve_contract_policy(&self) -> ContractPolicy {
        self.contract_policy.unwrap_or_else(ContractPolicy::for_build)
    }

    /// Configured data root, or `home` when unset.
    pub fn resolve_data_root(&self, home: &Path) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| home.to_path_buf())
    }

    pub fn resolve_wallets_dir(&self, home: &Path) -> PathBuf {
        self.resolve_data_root(home).join("wallets")
    }

    pub fn resolve_backups_dir(&self, home: &Path) -> PathBuf {
        self.resolve_data_root(home).join("backups")
    }
}

/// Whether CLI messages carry status icons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Plain,
    #[default]
    Iconic,
}

impl Theme {
    /// Unknown stored values fall back to the default theme.
    fn from_value(value: Option<String>) -> Self {
        value
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default()
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plain" => Some(Theme::Plain),
            "iconic" => Some(Theme::Iconic),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Theme::Plain => "plain",
            Theme::Iconic => "iconic",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(Theme::from_value(value))
    }
}
