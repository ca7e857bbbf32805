//! Shared runtime state for CLI interactions and command execution.

use dialoguer::theme::ColorfulTheme;
use tracing::debug;

use cofrinho_config::{Config, ConfigManager, Theme};
use cofrinho_core::format::BrlFormatter;
use cofrinho_storage_json::JsonWalletStorage;

use crate::{session::PlanSession, utils::app_data_dir};

use super::{
    commands,
    core::CliError,
    output::{self, OutputPreferences},
    registry::CommandRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub session: PlanSession,
    pub storage: JsonWalletStorage,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub formatter: BrlFormatter,
    pub theme: ColorfulTheme,
    pub running: bool,
}

impl ShellContext {
    /// Loads the config under the data directory and opens the owner's wallet.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let home = app_data_dir();
        let config_manager = ConfigManager::with_base_dir(home.clone())?;
        let config = config_manager.load()?;

        let storage = JsonWalletStorage::with_retention(
            config.resolve_wallets_dir(&home),
            config.resolve_backups_dir(&home),
            config.backup_retention,
        )?;
        let session = PlanSession::open(
            config.owner_id()?,
            Box::new(storage.clone()),
            config.resolve_contract_policy(),
        )?;
        debug!(root = %config.resolve_data_root(&home).display(), ?mode, "shell context ready");

        let context = Self {
            mode,
            registry,
            session,
            storage,
            config_manager,
            config,
            formatter: BrlFormatter,
            theme: ColorfulTheme::default(),
            running: true,
        };
        context.apply_output_preferences();
        Ok(context)
    }

    pub fn prompt(&self) -> String {
        format!("cofrinho ({})> ", self.session.owner())
    }

    /// Scripts never get colours.
    pub fn apply_output_preferences(&self) {
        output::set_preferences(OutputPreferences {
            color_enabled: self.config.ui_color_enabled && self.mode == CliMode::Interactive,
            icons: self.config.theme == Theme::Iconic,
        });
    }
}
