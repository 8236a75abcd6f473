use std::env;

use chrono::{Local, NaiveDate};
use strsim::levenshtein;

use crate::{
    config::{Config, ConfigManager},
    core::ledger_manager::{LedgerManager, LoadMetadata},
    ledger::Period,
    storage::CsvStorage,
    utils,
};

use super::{
    commands::{all_definitions, CommandDefinition, CommandRegistry},
    output, CliError, TODAY_ENV,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub ledger_manager: LedgerManager,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub today: NaiveDate,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    /// Loads configuration from the data directory and opens the current month.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = utils::app_data_dir();
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load()?;
        let storage = CsvStorage::new(
            config.resolve_data_root(&base),
            Some(config.backup_retention),
        )?;
        let ledger_manager = LedgerManager::new(Box::new(storage), config.metrics, config.goal);

        let mut context = Self {
            mode,
            registry: CommandRegistry::new(all_definitions()),
            ledger_manager,
            config_manager,
            config,
            today: resolve_today()?,
            last_command: None,
            running: true,
        };
        let metadata = context
            .ledger_manager
            .open(Period::containing(context.today))?;
        context.report_load(&metadata);
        Ok(context)
    }

    pub fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub fn command_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    pub fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<(), CliError> {
        let handler = match self.command(command) {
            Some(definition) => definition.handler,
            None => {
                output::warning(format!("Unknown command `{command}`."));
                self.suggest_command(command);
                return Ok(());
            }
        };
        handler(self, args)
    }

    pub fn suggest_command(&self, input: &str) {
        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    /// Script runs name the failing line so a batch log can be traced back.
    pub fn report_error(&self, err: &CliError) {
        match (self.mode, &self.last_command) {
            (CliMode::Script, Some(line)) => output::error(format!("{err} (in `{line}`)")),
            _ => output::error(err),
        }
    }

    pub fn report_load(&self, metadata: &LoadMetadata) {
        if metadata.existed {
            output::info(format!(
                "Opened {} ({} day(s)) from {}",
                metadata.period,
                metadata.record_count,
                metadata.path.display()
            ));
        } else {
            output::info(format!("Started a new ledger for {}", metadata.period));
        }
        for warning in &metadata.warnings {
            output::warning(warning);
        }
    }

    pub fn current_period(&self) -> Option<Period> {
        self.ledger_manager.current_period()
    }

    pub fn prompt(&self) -> String {
        match self.current_period() {
            Some(period) => format!("parcels [{period}]> "),
            None => "parcels> ".to_string(),
        }
    }
}

fn resolve_today() -> Result<NaiveDate, CliError> {
    match env::var(TODAY_ENV) {
        Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| CliError::Input(format!("{TODAY_ENV} must be YYYY-MM-DD, got `{raw}`"))),
        Err(_) => Ok(Local::now().date_naive()),
    }
}
