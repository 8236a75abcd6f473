//! Read-only views: the monthly table and the period summary.

use crate::cli::{output, ShellContext};
use crate::errors::LedgerError;
use crate::ledger::parse_whole;

use super::{usage_error, CommandDefinition, CommandResult};

const SUMMARY_USAGE: &str = "summary [days_remaining]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("list", "Show every recorded day of the month", "list", cmd_list),
        CommandDefinition::new(
            "summary",
            "Totals, deficit status, and progress toward the monthly goal",
            SUMMARY_USAGE,
            cmd_summary,
        ),
    ]
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let ledger = context
        .ledger_manager
        .current()
        .ok_or(LedgerError::NotLoaded)?;
    output::section(format!("Monthly view {}", ledger.period()));
    if ledger.is_empty() {
        output::info("No days recorded yet.");
        return Ok(());
    }
    println!(
        "{:<10} {:>6} {:>6} {:>5} {:>8} {:>12} {:>12} {:>12} {:>12} {:>8} {:>4} {:>7}",
        "date", "placed", "deliv", "lost", "deliv%", "revenue", "costs", "ads(eff)", "net", "profit%", "obj", "deficit"
    );
    for record in ledger.list() {
        println!(
            "{:<10} {:>6} {:>6} {:>5} {:>8.2} {:>12} {:>12} {:>12} {:>12} {:>8.2} {:>4} {:>7}",
            record.date.to_string(),
            record.orders_placed,
            record.orders_delivered,
            record.orders_lost,
            record.delivery_rate,
            output::format_amount(record.revenue as i64),
            output::format_amount(record.costs as i64),
            output::format_amount(record.ad_spend_effective as i64),
            output::format_amount(record.net_profit),
            record.profit_rate,
            record.daily_objective,
            record.cumulative_deficit,
        );
    }
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let period = context.current_period().ok_or(LedgerError::NotLoaded)?;
    let days_remaining = match args {
        [] => period.days_remaining_after(context.today),
        [days] => {
            let days = parse_whole("days_remaining", days)?;
            u32::try_from(days).map_err(|_| {
                LedgerError::Validation(format!("days_remaining is out of range ({days})"))
            })?
        }
        _ => return Err(usage_error(SUMMARY_USAGE)),
    };
    let summary = context.ledger_manager.summary(days_remaining)?;
    let currency = &context.config.currency;
    let totals = &summary.totals;

    output::section(format!("Summary {}", summary.period));
    output::info(format!("Days recorded: {}", summary.days_recorded));
    output::info(format!(
        "Orders: {} placed, {} delivered, {} lost",
        totals.orders_placed, totals.orders_delivered, totals.orders_lost
    ));
    output::info(format!(
        "Revenue {} | Costs {} | Ads {} (effective {})",
        output::format_unsigned_money(totals.revenue, currency),
        output::format_unsigned_money(totals.costs, currency),
        output::format_unsigned_money(totals.ad_spend_nominal, currency),
        output::format_unsigned_money(totals.ad_spend_effective, currency),
    ));
    output::info(format!(
        "Monthly net profit: {} ({})",
        output::format_money(totals.net_profit, currency),
        output::format_rate(summary.overall_profit_rate)
    ));
    if let Some(latest) = &summary.latest {
        output::info(format!(
            "Latest day {}: net profit {}",
            latest.date,
            output::format_money(latest.net_profit, currency)
        ));
    }

    output::info(format!("Monthly parcel deficit: {}", summary.cumulative_deficit));
    if summary.cumulative_deficit > 0 {
        output::warning(format!(
            "Real deficit of {} parcel(s). Pause ads if needed and deliver pending orders.",
            summary.cumulative_deficit
        ));
    } else {
        output::success("No parcel deficit. Situation healthy.");
    }

    let goal = &summary.goal;
    output::section(format!(
        "Monthly goal {}",
        output::format_unsigned_money(goal.goal_amount, currency)
    ));
    output::info(format!(
        "Remaining: {} over {} day(s)",
        output::format_unsigned_money(goal.remaining, currency),
        goal.days_remaining
    ));
    if goal.is_met() {
        output::success("Goal reached.");
    } else if let Some(parcels) = goal.required_daily_parcels {
        output::info(format!("Aim for {parcels} parcel(s) per day."));
    } else {
        output::warning("Set goal.profit_per_parcel to get a daily parcel target.");
    }

    output::info(format!(
        "Status: {} ({})",
        summary.advisory,
        summary.advisory.describe()
    ));
    Ok(())
}
