use cofrinho_core::format::DateFormatter;
use cofrinho_domain::{
    CardBrand, CardDraft, CardId, CardKind, CardStatus, CardStatusFilter, Displayable,
};

use crate::cli::args;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Table};
use crate::cli::registry::CommandEntry;
use crate::cli::selectors;

const ADD_USAGE: &str = "card-add <name> <due-day> [last-digits] [type] [brand] [nickname]";
const STATUS_USAGE: &str = "card-status <card> <ativo|inativo>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "cards",
            "List cards, optionally filtered by text and status",
            "cards [query] [todos|ativo|inativo]",
            cmd_cards,
        ),
        CommandEntry::new("card-add", "Register a card", ADD_USAGE, cmd_card_add),
        CommandEntry::new(
            "card-status",
            "Activate or deactivate a card",
            STATUS_USAGE,
            cmd_card_status,
        ),
        CommandEntry::new(
            "card-delete",
            "Delete a card",
            "card-delete <card>",
            cmd_card_delete,
        ),
    ]
}

fn cmd_cards(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let query = args.first().copied().unwrap_or("");
    let filter = match args.get(1) {
        Some(value) => value
            .parse::<CardStatusFilter>()
            .map_err(CommandError::InvalidArguments)?,
        None => CardStatusFilter::All,
    };

    let session = &context.session;
    let found = session.search_cards(query, filter);
    if found.is_empty() {
        output::info("No cards found.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        "#", "Name", "Nickname", "Type", "Brand", "Digits", "Next due", "Status",
    ]);
    for card in found {
        let position = session
            .cards()
            .iter()
            .position(|candidate| candidate.id == card.id)
            .map(|idx| (idx + 1).to_string())
            .unwrap_or_default();
        let next_due = session
            .next_card_due(card)
            .map(|date| context.formatter.format_date(date))
            .unwrap_or_default();
        table.add_row(vec![
            position,
            card.name.clone(),
            card.nickname.clone().unwrap_or_default(),
            card.kind.to_string(),
            card.brand.to_string(),
            card.last_digits.clone().unwrap_or_default(),
            next_due,
            card.status.to_string(),
        ]);
    }
    table.render();
    Ok(())
}

fn cmd_card_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args::require(args, 0, ADD_USAGE)?;
    let due_day = args::number::<u32>(args::require(args, 1, ADD_USAGE)?, "due day")?;
    let kind = match args.get(3) {
        Some(value) => value
            .parse::<CardKind>()
            .map_err(CommandError::InvalidArguments)?,
        None => CardKind::default(),
    };
    let brand = match args.get(4) {
        Some(value) => value
            .parse::<CardBrand>()
            .map_err(CommandError::InvalidArguments)?,
        None => CardBrand::default(),
    };

    let draft = CardDraft {
        name: name.to_string(),
        nickname: args.get(5).map(|value| value.to_string()),
        last_digits: args.get(2).map(|value| value.to_string()),
        kind,
        brand,
        due_day,
        advance_days: None,
    };
    let id = context.session.add_card(draft)?;
    let label = card_label(context, id)?;
    output::success(format!("Card `{label}` registered."));
    Ok(())
}

fn cmd_card_status(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = resolve_card(context, args::require(args, 0, STATUS_USAGE)?)?;
    let status = args::require(args, 1, STATUS_USAGE)?
        .parse::<CardStatus>()
        .map_err(CommandError::InvalidArguments)?;
    context.session.set_card_status(id, status)?;
    let label = card_label(context, id)?;
    output::success(format!("Card `{label}` is now {status}."));
    Ok(())
}

fn cmd_card_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = resolve_card(context, args::require(args, 0, "card-delete <card>")?)?;
    let label = card_label(context, id)?;
    if !context.confirm(&format!("Delete card `{label}`?"))? {
        output::info("Nothing deleted.");
        return Ok(());
    }
    context.session.delete_card(id)?;
    output::success(format!("Card `{label}` deleted."));
    Ok(())
}

fn resolve_card(context: &ShellContext, arg: &str) -> Result<CardId, CommandError> {
    selectors::resolve(context.session.cards(), arg, "card").map(|card| card.id)
}

fn card_label(context: &ShellContext, id: CardId) -> Result<String, CommandError> {
    context
        .session
        .cards()
        .iter()
        .find(|card| card.id == id)
        .map(Displayable::display_label)
        .ok_or_else(|| CommandError::Message(format!("card {id} disappeared")))
}
