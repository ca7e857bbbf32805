pub mod backup;
pub mod cards;
pub mod plans;
pub mod system;

use crate::cli::registry::{CommandEntry, CommandRegistry};

const ROOT_COMMAND_ORDER: &[&str] = &[
    "plans",
    "add",
    "show",
    "toggle",
    "edit",
    "delete",
    "calendar",
    "upcoming",
    "summary",
    "cards",
    "card-add",
    "card-status",
    "card-delete",
    "backup",
    "backups",
    "restore",
    "config",
    "help",
    "version",
    "exit",
];

pub(crate) fn all_entries() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(plans::definitions());
    commands.extend(cards::definitions());
    commands.extend(backup::definitions());
    commands.extend(system::definitions());
    commands
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let mut entries = all_entries();
    entries.sort_by_key(|entry| {
        ROOT_COMMAND_ORDER
            .iter()
            .position(|name| entry.name.eq_ignore_ascii_case(name))
            .unwrap_or(ROOT_COMMAND_ORDER.len())
    });
    for entry in entries {
        registry.register(entry);
    }
}
