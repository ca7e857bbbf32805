use cofrinho_config::Theme;
use cofrinho_domain::{ContractPolicy, CURRENT_SCHEMA_VERSION};

use crate::cli::args;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::utils::build_info;

const CONFIG_USAGE: &str = "config [set <category|policy|retention|theme|color> <value>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("config", "Show or change settings", CONFIG_USAGE, cmd_config),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.command(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        }
        return Ok(());
    }

    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|action| action.to_lowercase()).as_deref() {
        None => show_config(context),
        Some("set") => set_config(
            context,
            args::require(args, 1, CONFIG_USAGE)?,
            args::require(args, 2, CONFIG_USAGE)?,
        ),
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{other}`; usage: {CONFIG_USAGE}"
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let config = &context.config;
    output::section("Settings");
    output::two_column(&[
        ("Owner", config.owner.clone()),
        ("Locale", config.locale.clone()),
        ("Currency", config.currency.clone()),
        ("Default category", config.default_category.to_string()),
        ("Contract policy", context.session.policy().to_string()),
        ("Backups kept", config.backup_retention.to_string()),
        ("Theme", config.theme.to_string()),
        ("Colors", on_off(config.ui_color_enabled).to_string()),
        (
            "Config file",
            context.config_manager.config_path().display().to_string(),
        ),
        (
            "Wallet file",
            context
                .storage
                .wallet_path(context.session.owner())
                .display()
                .to_string(),
        ),
    ]);
    Ok(())
}

/// Persists one setting. Policy and retention apply from the next start.
fn set_config(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut next_start = false;
    let config = &mut context.config;
    match key.to_lowercase().as_str() {
        "category" => config.default_category = args::category(value)?,
        "policy" => {
            let policy = ContractPolicy::parse(value).ok_or_else(|| {
                CommandError::InvalidArguments("policy must be `strict` or `lenient`".into())
            })?;
            config.contract_policy = Some(policy);
            next_start = true;
        }
        "retention" => {
            let retention = args::number::<usize>(value, "backup count")?;
            if retention == 0 {
                return Err(CommandError::InvalidArguments(
                    "keep at least one backup".into(),
                ));
            }
            config.backup_retention = retention;
            next_start = true;
        }
        "theme" => {
            config.theme = Theme::parse(value).ok_or_else(|| {
                CommandError::InvalidArguments("theme must be `iconic` or `plain`".into())
            })?
        }
        "color" => {
            config.ui_color_enabled = match value.to_lowercase().as_str() {
                "on" | "true" | "sim" => true,
                "off" | "false" | "nao" | "não" => false,
                _ => {
                    return Err(CommandError::InvalidArguments(
                        "color must be `on` or `off`".into(),
                    ))
                }
            }
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown setting `{other}`; usage: {CONFIG_USAGE}"
            )))
        }
    }

    context.config_manager.save(&context.config)?;
    context.apply_output_preferences();
    output::success(format!("Setting `{key}` saved."));
    if next_start {
        output::hint("Takes effect the next time the shell starts.");
    }
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Cofrinho {}", meta.version));
    let mut rows = meta.rows();
    rows.push(("Schema", format!("v{CURRENT_SCHEMA_VERSION}")));
    output::two_column(&rows);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
