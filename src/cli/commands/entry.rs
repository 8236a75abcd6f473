//! Commands that add, edit, or delete a day.

use chrono::NaiveDate;

use crate::cli::{output, CliError, ShellContext};
use crate::errors::LedgerError;
use crate::ledger::{parse_whole, DailyInputs, Mutation};

use super::{usage_error, CommandDefinition, CommandResult};

const ADD_USAGE: &str = "add <date|today> <placed> <delivered> <revenue> <costs> <ad_spend>";
const EDIT_USAGE: &str = "edit <date> <placed> <delivered> <revenue> <costs> <ad_spend>";
const DELETE_USAGE: &str = "delete <date>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("add", "Record a new day", ADD_USAGE, cmd_add),
        CommandDefinition::new("edit", "Replace an existing day's inputs", EDIT_USAGE, cmd_edit),
        CommandDefinition::new("delete", "Remove a day", DELETE_USAGE, cmd_delete),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let inputs = parse_entry(context, args, ADD_USAGE)?;
    context.ledger_manager.apply(Mutation::Insert(inputs))?;
    output::success(format!("Recorded {}", inputs.date));
    print_day(context, inputs.date);
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let inputs = parse_entry(context, args, EDIT_USAGE)?;
    context.ledger_manager.apply(Mutation::Update {
        date: inputs.date,
        inputs,
    })?;
    output::success(format!("Updated {}", inputs.date));
    print_day(context, inputs.date);
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw_date] = args else {
        return Err(usage_error(DELETE_USAGE));
    };
    let date = parse_date_arg(context, raw_date)?;
    context.ledger_manager.apply(Mutation::Delete(date))?;
    output::success(format!("Deleted {date}"));
    if let Some(ledger) = context.ledger_manager.current() {
        output::info(format!(
            "Monthly parcel deficit is now {}",
            ledger.cumulative_deficit()
        ));
    }
    Ok(())
}

fn parse_entry(context: &ShellContext, args: &[&str], usage: &str) -> Result<DailyInputs, CliError> {
    let [raw_date, placed, delivered, revenue, costs, ad_spend] = args else {
        return Err(usage_error(usage));
    };
    let date = parse_date_arg(context, raw_date)?;
    let inputs = DailyInputs::try_new(
        date,
        parse_whole("orders_placed", placed)?,
        parse_whole("orders_delivered", delivered)?,
        parse_whole("revenue", revenue)?,
        parse_whole("costs", costs)?,
        parse_whole("ad_spend", ad_spend)?,
    )?;
    Ok(inputs)
}

/// Accepts `today`, an ISO date, or a bare day of the open month.
pub(crate) fn parse_date_arg(context: &ShellContext, raw: &str) -> Result<NaiveDate, CliError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("today") {
        return Ok(context.today);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let (Ok(day), Some(period)) = (raw.parse::<u32>(), context.current_period()) {
        if let Some(date) = NaiveDate::from_ymd_opt(period.year(), period.month(), day) {
            return Ok(date);
        }
    }
    Err(LedgerError::Validation(format!(
        "`{raw}` is not a date; use YYYY-MM-DD, a day of the open month, or `today`"
    ))
    .into())
}

fn print_day(context: &ShellContext, date: NaiveDate) {
    let Some(record) = context
        .ledger_manager
        .current()
        .and_then(|ledger| ledger.get(date))
    else {
        return;
    };
    let currency = &context.config.currency;
    output::info(format!(
        "Net profit {} ({}), effective ads {}",
        output::format_money(record.net_profit, currency),
        output::format_rate(record.profit_rate),
        output::format_unsigned_money(record.ad_spend_effective, currency)
    ));
    output::info(format!(
        "Objective {} parcel(s), delivered {}, monthly deficit {}",
        record.daily_objective, record.orders_delivered, record.cumulative_deficit
    ));
}
