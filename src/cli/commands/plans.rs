use chrono::Datelike;

use cofrinho_core::{
    format::{CurrencyFormatter, DateFormatter},
    ScheduleService, ScheduledParcel, ToggleOutcome,
};
use cofrinho_domain::{PlanDraft, PlanId};

use crate::cli::args;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Table};
use crate::cli::registry::CommandEntry;
use crate::cli::selectors;

const ADD_USAGE: &str = "add <description> <total> <count> <start-date> [category]";
const EDIT_USAGE: &str = "edit <plan> <description|total|count|start|category> <value>";
const DEFAULT_UPCOMING_DAYS: i64 = 7;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("plans", "List installment plans", "plans", cmd_plans),
        CommandEntry::new("add", "Create an installment plan", ADD_USAGE, cmd_add),
        CommandEntry::new(
            "show",
            "Show a plan with its parcel schedule",
            "show <plan>",
            cmd_show,
        ),
        CommandEntry::new(
            "toggle",
            "Mark a parcel as paid or unpaid",
            "toggle <plan> <parcel>",
            cmd_toggle,
        ),
        CommandEntry::new("edit", "Change one field of a plan", EDIT_USAGE, cmd_edit),
        CommandEntry::new("delete", "Delete a plan", "delete <plan>", cmd_delete),
        CommandEntry::new(
            "calendar",
            "List the parcels due in a month",
            "calendar [YYYY-MM]",
            cmd_calendar,
        ),
        CommandEntry::new(
            "upcoming",
            "List the parcels due in the next days",
            "upcoming [days]",
            cmd_upcoming,
        ),
        CommandEntry::new("summary", "Show wallet totals", "summary", cmd_summary),
    ]
}

fn cmd_plans(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let plans = context.session.plans();
    if plans.is_empty() {
        output::info("No plans yet. Use `add` to create one.");
        return Ok(());
    }

    let fmt = &context.formatter;
    let mut table = Table::new(vec![
        "#",
        "Description",
        "Category",
        "Parcel",
        "Paid",
        "Remaining",
        "Status",
    ]);
    for (idx, plan) in plans.iter().enumerate() {
        let summary = context.session.summary(plan.id)?;
        table.add_row(vec![
            (idx + 1).to_string(),
            plan.description.clone(),
            plan.category.to_string(),
            fmt.format_amount(plan.installment_value),
            format!("{}/{}", summary.paid_count, plan.installments_count),
            fmt.format_amount(summary.remaining_balance),
            summary.status.to_string(),
        ]);
    }
    table.render();
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let description = args::require(args, 0, ADD_USAGE)?;
    let total = args::amount(args::require(args, 1, ADD_USAGE)?)?;
    let count = args::number::<u32>(args::require(args, 2, ADD_USAGE)?, "parcel count")?;
    let start = args::date(args::require(args, 3, ADD_USAGE)?)?;
    let category = match args.get(4) {
        Some(value) => args::category(value)?,
        None => context.config.default_category,
    };

    let draft = PlanDraft::new(description, total, count, start, category);
    let id = context.session.create_plan(&draft)?;
    let plan = context.session.plan(id)?;
    output::success(format!(
        "Plan `{}` created: {}x {}.",
        plan.description,
        plan.installments_count,
        context.formatter.format_amount(plan.installment_value)
    ));
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = resolve_plan(context, args::require(args, 0, "show <plan>")?)?;
    let session = &context.session;
    let fmt = &context.formatter;
    let plan = session.plan(id)?;
    let summary = session.summary(id)?;

    output::section(&plan.description);
    output::two_column(&[
        ("Category", plan.category.to_string()),
        ("Total", fmt.format_amount(plan.total_value)),
        (
            "Parcels",
            format!(
                "{}x {}",
                plan.installments_count,
                fmt.format_amount(plan.installment_value)
            ),
        ),
        ("First due", fmt.format_date(plan.start_date)),
        (
            "Paid",
            format!(
                "{}/{} ({})",
                summary.paid_count,
                plan.installments_count,
                fmt.format_amount(summary.paid_amount)
            ),
        ),
        ("Remaining", fmt.format_amount(summary.remaining_balance)),
        ("Progress", fmt.format_percent(summary.progress_percent)),
        ("Status", summary.status.to_string()),
        ("Id", plan.id.to_string()),
    ]);
    println!();

    let mut table = Table::new(vec!["#", "Due", "Amount", "Paid"]);
    for line in session.schedule(id)? {
        table.add_row(vec![
            line.number.to_string(),
            fmt.format_date(line.due_date),
            fmt.format_amount(line.amount),
            if line.paid { "Sim" } else { "Não" }.to_string(),
        ]);
    }
    table.render();
    Ok(())
}

fn cmd_toggle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "toggle <plan> <parcel>";
    let id = resolve_plan(context, args::require(args, 0, USAGE)?)?;
    let parcel = args::number::<u32>(args::require(args, 1, USAGE)?, "parcel number")?;

    let outcome = context.session.toggle_parcel(id, parcel)?;
    let plan = context.session.plan(id)?;
    match outcome {
        ToggleOutcome::Paid => output::success(format!(
            "Parcel {parcel}/{} of `{}` marked as paid.",
            plan.installments_count, plan.description
        )),
        ToggleOutcome::Unpaid => output::success(format!(
            "Parcel {parcel}/{} of `{}` marked as unpaid.",
            plan.installments_count, plan.description
        )),
        ToggleOutcome::Ignored => output::warning(format!(
            "`{}` has no parcel {parcel}; nothing changed.",
            plan.description
        )),
    }
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = resolve_plan(context, args::require(args, 0, EDIT_USAGE)?)?;
    let field = args::require(args, 1, EDIT_USAGE)?;
    let value = args::require(args, 2, EDIT_USAGE)?;

    let mut draft = PlanDraft::from_plan(context.session.plan(id)?);
    match field.to_lowercase().as_str() {
        "description" => draft.description = value.to_string(),
        "total" => draft.total_value = args::amount(value)?,
        "count" => draft.installments_count = args::number(value, "parcel count")?,
        "start" => draft.start_date = args::date(value)?,
        "category" => draft.category = args::category(value)?,
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown field `{other}`; usage: {EDIT_USAGE}"
            )))
        }
    }

    let update = context.session.edit_plan(id, &draft)?;
    let fmt = &context.formatter;
    if update.installment_value != update.previous_installment_value {
        output::info(format!(
            "Parcel value: {} -> {}",
            fmt.format_amount(update.previous_installment_value),
            fmt.format_amount(update.installment_value)
        ));
    }
    if !update.dropped_parcels.is_empty() {
        let dropped: Vec<String> = update
            .dropped_parcels
            .iter()
            .map(u32::to_string)
            .collect();
        output::warning(format!(
            "Paid parcels no longer in the plan were dropped: {}",
            dropped.join(", ")
        ));
    }
    output::success("Plan updated.");
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = resolve_plan(context, args::require(args, 0, "delete <plan>")?)?;
    let description = context.session.plan(id)?.description.clone();
    if !context.confirm(&format!("Delete plan `{description}`?"))? {
        output::info("Nothing deleted.");
        return Ok(());
    }
    context.session.delete_plan(id)?;
    output::success(format!("Plan `{description}` deleted."));
    Ok(())
}

fn cmd_calendar(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (year, month) = match args.first() {
        Some(value) => args::month(value)?,
        None => {
            let today = context.session.today();
            (today.year(), today.month())
        }
    };
    let parcels = context.session.parcels_in_month(year, month)?;
    output::section(format!("Parcels due in {month:02}/{year}"));
    render_parcels(context, &parcels);
    Ok(())
}

fn cmd_upcoming(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let days = match args.first() {
        Some(value) => args::number::<i64>(value, "number of days")?,
        None => DEFAULT_UPCOMING_DAYS,
    };
    if days < 0 {
        return Err(CommandError::InvalidArguments(
            "days must not be negative".into(),
        ));
    }
    let parcels = context.session.upcoming(days)?;
    output::section(format!("Parcels due in the next {days} days"));
    render_parcels(context, &parcels);
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let summary = context.session.wallet_summary();
    let fmt = &context.formatter;
    output::section("Wallet summary");
    output::two_column(&[
        (
            "Plans",
            format!("{} ({} paid off)", summary.plan_count, summary.fully_paid_count),
        ),
        ("Financed", fmt.format_amount(summary.total_financed)),
        ("Paid", fmt.format_amount(summary.total_paid)),
        ("Remaining", fmt.format_amount(summary.total_remaining)),
        ("Per month", fmt.format_amount(summary.monthly_commitment)),
    ]);
    Ok(())
}

fn render_parcels(context: &ShellContext, parcels: &[ScheduledParcel]) {
    if parcels.is_empty() {
        output::info("No parcels in this period.");
        return;
    }
    let fmt = &context.formatter;
    let mut table = Table::new(vec!["Due", "Plan", "Parcel", "Amount", "Status"]);
    for parcel in parcels {
        table.add_row(vec![
            fmt.format_date(parcel.due_date),
            parcel.description.clone(),
            format!("{}/{}", parcel.number, parcel.installments_count),
            fmt.format_amount(parcel.amount),
            parcel.status.label().to_string(),
        ]);
    }
    table.render();
    output::info(format!(
        "Still due: {}",
        fmt.format_amount(ScheduleService::amount_due(parcels))
    ));
}

fn resolve_plan(context: &ShellContext, arg: &str) -> Result<PlanId, CommandError> {
    selectors::resolve(context.session.plans(), arg, "plan").map(|plan| plan.id)
}
