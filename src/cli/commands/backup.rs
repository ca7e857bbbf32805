use chrono::Local;

use crate::cli::args;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Table};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "backup",
            "Save a timestamped copy of the wallet",
            "backup [note]",
            cmd_backup,
        ),
        CommandEntry::new("backups", "List wallet backups", "backups", cmd_backups),
        CommandEntry::new(
            "restore",
            "Replace the wallet with a backup",
            "restore <backup>",
            cmd_restore,
        ),
    ]
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = (!args.is_empty()).then(|| args.join(" "));
    let info = context
        .storage
        .backup_wallet(context.session.wallet(), note.as_deref())?;
    output::success(format!("Backup `{}` created.", info.id));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let backups = context.storage.list_backups(context.session.owner())?;
    if backups.is_empty() {
        output::info("No backups yet. Use `backup` to create one.");
        return Ok(());
    }
    let mut table = Table::new(vec!["#", "Created", "File"]);
    for (idx, backup) in backups.iter().enumerate() {
        let created = backup
            .created_at
            .map(|at| at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string())
            .unwrap_or_else(|| "?".into());
        table.add_row(vec![(idx + 1).to_string(), created, backup.id.clone()]);
    }
    table.render();
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let position = args::number::<usize>(args::require(args, 0, "restore <backup>")?, "backup")?;
    let backups = context.storage.list_backups(context.session.owner())?;
    let backup = position
        .checked_sub(1)
        .and_then(|idx| backups.get(idx))
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!("no backup at position {position}"))
        })?;

    if !context.confirm(&format!("Replace the current wallet with `{}`?", backup.id))? {
        output::info("Nothing restored.");
        return Ok(());
    }
    context
        .storage
        .restore_backup(context.session.owner(), backup)?;
    context.session.reload()?;
    output::success(format!(
        "Wallet restored from `{}` ({} plans).",
        backup.id,
        context.session.plans().len()
    ));
    Ok(())
}
