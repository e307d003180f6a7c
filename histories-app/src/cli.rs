//! Sub-commands of the `histories` binary.

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::session::{Command, CommandOutcome, Session};
use crate::snapshot;
use clap::{Parser, Subcommand};
use histories_core::{schema, Combinator, Condition, FilterOperator, Record, RecordId, Sheet};
use histories_storage::LmdbPresetStore;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "histories", about = "Device-history filters, presets and statistics")]
pub struct Cli {
    #[arg(long, env = "HISTORIES_CONFIG")]
    pub config: PathBuf,

    /// Allow record changes even when `start_in_edit_mode` is off.
    #[arg(long)]
    pub edit: bool,

    #[command(subcommand)]
    pub command: Invocation,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Per-sheet statistics and dashboard totals.
    Summary,
    /// Saved preset names.
    Presets,
    /// Apply a saved preset to a sheet.
    Filter {
        preset: String,
        #[arg(long, value_parser = parse_sheet, default_value = "Ohio - Meters")]
        sheet: Sheet,
    },
    /// Save conditions under a preset name, replacing any existing preset.
    SavePreset {
        name: String,
        /// `field:operator[:value]`, e.g. `unit_cost:greater_than:15`.
        #[arg(long = "where", value_parser = parse_condition)]
        conditions: Vec<Condition>,
        /// Join conditions with OR instead of AND.
        #[arg(long)]
        or: bool,
    },
    DeletePreset {
        name: String,
    },
    /// Add a record to a sheet and write the snapshot back.
    Insert {
        #[arg(long, value_parser = parse_sheet, default_value = "Ohio - Meters")]
        sheet: Sheet,
        /// `field=value`, repeatable.
        #[arg(long = "set", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// Remove a record by id and write the snapshot back.
    DeleteRecord {
        id: i64,
    },
}

impl Invocation {
    fn mutates_records(&self) -> bool {
        matches!(self, Invocation::Insert { .. } | Invocation::DeleteRecord { .. })
    }
}

/// Sheet by display name ("Ohio - Meters") or workbook tab name ("OH - Meters").
pub fn parse_sheet(name: &str) -> Result<Sheet, String> {
    Sheet::from_display_name(name)
        .or_else(|| Sheet::from_import_name(name))
        .ok_or_else(|| format!("unknown sheet '{}'", name))
}

/// `field:operator[:value]`. Field types come from the schema.
pub fn parse_condition(raw: &str) -> Result<Condition, String> {
    let mut parts = raw.splitn(3, ':');
    let field = parts.next().map(str::trim).unwrap_or_default();
    if field.is_empty() {
        return Err(format!("missing field in '{}'", raw));
    }
    let operator: FilterOperator = parts
        .next()
        .ok_or_else(|| format!("missing operator in '{}'", raw))?
        .parse()
        .map_err(|e: histories_core::ValidationError| e.to_string())?;
    let value = parts.next().map(str::to_string);

    let condition = Condition::new(schema::descriptor(field), operator, value);
    condition.validate().map_err(|e| e.to_string())?;
    Ok(condition)
}

/// `field=value`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected field=value, got '{}'", raw)),
    }
}

/// Execute an invocation against the configured stores.
pub fn run(config: &AppConfig, invocation: Invocation, edit: bool) -> AppResult<CommandOutcome> {
    let records = snapshot::load(&config.records_path)?;
    let presets =
        LmdbPresetStore::open(&config.preset_store_path, config.preset_store_max_size_mb)?;
    let mut session = Session::new(
        records,
        presets,
        config.core.clone(),
        config.start_in_edit_mode || edit,
    );
    let mutates = invocation.mutates_records();

    let outcome = match invocation {
        Invocation::Summary => session.execute(Command::Dashboard)?,
        Invocation::Presets => session.execute(Command::ListPresets)?,
        Invocation::Filter { preset, sheet } => {
            session.execute(Command::SelectSheet(sheet))?;
            session.execute(Command::LoadPreset(preset))?;
            session.execute(Command::Apply)?
        }
        Invocation::SavePreset {
            name,
            conditions,
            or,
        } => {
            for condition in conditions {
                session.execute(Command::AddCondition(condition))?;
            }
            let combinator = if or { Combinator::Or } else { Combinator::And };
            session.execute(Command::SetCombinator(combinator))?;
            session.execute(Command::SavePreset(name))?
        }
        Invocation::DeletePreset { name } => session.execute(Command::DeletePreset(name))?,
        Invocation::Insert { sheet, fields } => {
            session.execute(Command::SelectSheet(sheet))?;
            let record: Record = fields.into_iter().collect();
            session.execute(Command::InsertRecord(record))?
        }
        Invocation::DeleteRecord { id } => session.execute(Command::DeleteRecord(RecordId(id)))?,
    };

    if mutates {
        snapshot::save(&config.records_path, session.records())?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use histories_core::{DeviceType, FieldType, OpCo};

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("histories").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = parse(&["--config", "c.toml", "summary"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("c.toml"));
        assert_eq!(cli.command, Invocation::Summary);
        assert!(!cli.edit);

        let cli = parse(&["--config", "c.toml", "filter", "HighCost"]).unwrap();
        assert_eq!(
            cli.command,
            Invocation::Filter {
                preset: "HighCost".to_string(),
                sheet: Sheet::new(OpCo::Ohio, DeviceType::Meters),
            }
        );
    }

    #[test]
    fn test_config_flag_needs_a_value() {
        assert!(parse(&["summary", "--config"]).is_err());
        assert!(parse(&["--config"]).is_err());
    }

    #[test]
    fn test_sheet_names() {
        let expected = Sheet::new(OpCo::Ohio, DeviceType::Transformers);
        for name in ["Ohio - Transformers", "OH - Transformers"] {
            let cli = parse(&["--config", "c.toml", "filter", "p", "--sheet", name]).unwrap();
            match cli.command {
                Invocation::Filter { sheet, .. } => assert_eq!(sheet, expected),
                other => panic!("expected filter, got {:?}", other),
            }
        }
        assert!(parse(&["--config", "c.toml", "filter", "p", "--sheet", "Kentucky - Meters"]).is_err());
    }

    #[test]
    fn test_save_preset_arguments() {
        let cli = parse(&[
            "--config",
            "c.toml",
            "save-preset",
            "Open",
            "--where",
            "status:equals:Active",
            "--where",
            "unit_cost:greater_than:15",
            "--or",
        ])
        .unwrap();
        match cli.command {
            Invocation::SavePreset {
                name,
                conditions,
                or,
            } => {
                assert_eq!(name, "Open");
                assert!(or);
                assert_eq!(conditions.len(), 2);
                assert_eq!(conditions[1].field.field_type, FieldType::Number);
                assert_eq!(conditions[1].operand(), Some("15"));
            }
            other => panic!("expected save-preset, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_condition() {
        let c = parse_condition("notes1:is_empty").unwrap();
        assert_eq!(c.operator, FilterOperator::IsEmpty);
        assert_eq!(c.value, None);

        let c = parse_condition("notes1:contains:a:b").unwrap();
        assert_eq!(c.operand(), Some("a:b"));

        assert!(parse_condition("status").is_err());
        assert!(parse_condition(":equals:x").is_err());
        assert!(parse_condition("status:bigger:x").is_err());
        assert!(parse_condition("status:equals").is_err());
        assert!(parse_condition("status:greater_than:5").is_err());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("dev_code=A=1").unwrap(),
            ("dev_code".to_string(), "A=1".to_string())
        );
        assert!(parse_assignment("dev_code").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(parse(&["--config", "c.toml"]).is_err());
        assert!(parse(&["--config", "c.toml", "export"]).is_err());
    }
}
