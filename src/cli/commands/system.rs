use crate::cli::{output, CliError, ShellContext};
use crate::ledger::{parse_whole, Period};
use crate::utils::build_info;

use super::{usage_error, CommandDefinition, CommandResult};

const OPEN_USAGE: &str = "open <YYYY-MM>";
const RESTORE_USAGE: &str = "restore <backup-name>";
const CONFIG_USAGE: &str = "config [set <key> <value>]";
const CONFIG_KEYS: &str = "currency, tax_rate, objective_floor, reference_spend, monthly_goal, \
profit_per_parcel, backup_retention";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("open", "Switch to another month", OPEN_USAGE, cmd_open),
        CommandDefinition::new("backups", "List saved copies of this month", "backups", cmd_backups),
        CommandDefinition::new(
            "restore",
            "Replace this month with a saved copy",
            RESTORE_USAGE,
            cmd_restore,
        ),
        CommandDefinition::new(
            "config",
            "Show or change the active configuration",
            CONFIG_USAGE,
            cmd_config,
        ),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
        CommandDefinition::new("quit", "Exit the shell", "quit", cmd_exit),
    ]
}

fn cmd_open(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(usage_error(OPEN_USAGE));
    };
    let period: Period = raw.parse()?;
    let metadata = context.ledger_manager.open(period)?;
    context.report_load(&metadata);
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let backups = context.ledger_manager.list_backups()?;
    if backups.is_empty() {
        output::info("No backups for this month.");
        return Ok(());
    }
    output::section("Backups (newest first)");
    for backup in backups {
        let stamp = backup
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown time".into());
        println!("  {}  ({})", backup.name, stamp);
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(usage_error(RESTORE_USAGE));
    };
    let metadata = context.ledger_manager.restore(name)?;
    output::success(format!("Restored {} from `{}`", metadata.period, name));
    context.report_load(&metadata);
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => show_config(context),
        ["set", key, value] => set_config(context, key, value),
        _ => Err(usage_error(CONFIG_USAGE)),
    }
}

fn set_config(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut config = context.config.clone();
    match key {
        "currency" => config.currency = value.trim().to_string(),
        "tax_rate" => {
            config.metrics.tax_rate = value
                .trim()
                .parse()
                .map_err(|_| CliError::Input(format!("tax_rate must be a number, got `{value}`")))?;
        }
        "objective_floor" => config.metrics.objective_floor = whole_setting(key, value)?,
        "reference_spend" => config.metrics.reference_spend = whole_setting(key, value)?,
        "monthly_goal" => config.goal.monthly_goal = whole_setting(key, value)?,
        "profit_per_parcel" => config.goal.profit_per_parcel = whole_setting(key, value)?,
        "backup_retention" => config.backup_retention = whole_setting(key, value)?,
        _ => {
            return Err(CliError::Input(format!(
                "unknown setting `{key}`; expected one of {CONFIG_KEYS}"
            )))
        }
    }

    context.config_manager.save(&config)?;
    context
        .ledger_manager
        .reconfigure(config.metrics, config.goal)?;
    context.config = config;
    output::success(format!("Set {key} = {value}"));
    if key == "backup_retention" {
        output::info("Backup retention applies from the next start.");
    }
    Ok(())
}

fn whole_setting<T: TryFrom<i64>>(key: &str, value: &str) -> Result<T, CliError> {
    let parsed = parse_whole(key, value)?;
    T::try_from(parsed)
        .map_err(|_| CliError::Input(format!("{key} is out of range ({parsed})")))
}

fn show_config(context: &ShellContext) -> CommandResult {
    let config = &context.config;
    output::section("Configuration");
    output::info(format!("File: {}", context.config_manager.config_path().display()));
    output::info(format!("Currency: {}", config.currency));
    output::info(format!(
        "Ad tax rate: {} | objective floor: {} parcels | reference spend: {}",
        config.metrics.tax_rate,
        config.metrics.objective_floor,
        output::format_unsigned_money(config.metrics.reference_spend, &config.currency)
    ));
    output::info(format!(
        "Monthly goal: {} | profit per parcel: {}",
        output::format_unsigned_money(config.goal.monthly_goal, &config.currency),
        output::format_unsigned_money(config.goal.profit_per_parcel, &config.currency)
    ));
    output::info(format!("Backups kept per month: {}", config.backup_retention));
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(build_info::current());
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        match context.command(&name) {
            Some(definition) => {
                output::info(format!("{}: {}", definition.name, definition.description));
                output::info(format!("usage: {}", definition.usage));
            }
            None => context.suggest_command(&name),
        }
        return Ok(());
    }

    output::section("Commands");
    for definition in context.registry.definitions() {
        println!("  {:<10} {}", definition.name, definition.description);
    }
    Ok(())
}

fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.running = false;
    Ok(())
}
