//! Interactive session state and command dispatch.
//!
//! A [`Session`] holds what a user has open: the current sheet, the working
//! condition set, the quick-search text and whether edits are allowed. Every
//! user action is a [`Command`]; [`Session::execute`] applies it and returns a
//! [`CommandOutcome`]. Record mutations are rejected unless edit mode is on.

use crate::error::{AppError, AppResult};
use histories_core::schema::{FIELD_BEG_SER, FIELD_END_SER, FIELD_OOR_SERIAL};
use histories_core::{
    derive_quantity, quick_search, rollup, summarize_with, Combinator, Condition, ConditionSet,
    DashboardTotals, FilterEvaluator, HistoriesConfig, Record, RecordId, Sheet, Summary,
};
use histories_storage::{PresetManager, PresetStore, RecordStore};
use serde::Serialize;

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectSheet(Sheet),
    AddCondition(Condition),
    /// Remove the condition at a zero-based position.
    RemoveCondition(usize),
    SetCombinator(Combinator),
    ClearFilters,
    SetQuickSearch(String),
    /// Evaluate the working set and quick search against the current sheet.
    Apply,
    SavePreset(String),
    LoadPreset(String),
    DeletePreset(String),
    ListPresets,
    /// Statistics over every record on the current sheet.
    Summarize,
    Dashboard,
    SetEditMode(bool),
    InsertRecord(Record),
    UpdateRecord { id: RecordId, record: Record },
    DeleteRecord(RecordId),
    ClearSheet,
}

impl Command {
    /// Whether the command changes stored records.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::InsertRecord(_)
                | Command::UpdateRecord { .. }
                | Command::DeleteRecord(_)
                | Command::ClearSheet
        )
    }

    fn name(&self) -> &'static str {
        match self {
            Command::SelectSheet(_) => "select sheet",
            Command::AddCondition(_) => "add condition",
            Command::RemoveCondition(_) => "remove condition",
            Command::SetCombinator(_) => "set combinator",
            Command::ClearFilters => "clear filters",
            Command::SetQuickSearch(_) => "quick search",
            Command::Apply => "apply",
            Command::SavePreset(_) => "save preset",
            Command::LoadPreset(_) => "load preset",
            Command::DeletePreset(_) => "delete preset",
            Command::ListPresets => "list presets",
            Command::Summarize => "summarize",
            Command::Dashboard => "dashboard",
            Command::SetEditMode(_) => "set edit mode",
            Command::InsertRecord(_) => "insert record",
            Command::UpdateRecord { .. } => "update record",
            Command::DeleteRecord(_) => "delete record",
            Command::ClearSheet => "clear sheet",
        }
    }
}

/// Filtered records for display, with the badge count of active conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredView {
    pub sheet: Sheet,
    pub records: Vec<Record>,
    /// Records on the sheet before filtering.
    pub total: usize,
    pub active_filters: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSummary {
    pub sheet: Sheet,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub sheets: Vec<SheetSummary>,
    pub totals: DashboardTotals,
}

/// Result of executing a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CommandOutcome {
    Done,
    View(FilteredView),
    Presets(Vec<String>),
    Filters(ConditionSet),
    Summary(SheetSummary),
    Dashboard(Dashboard),
    Inserted(RecordId),
    Cleared(usize),
}

pub struct Session<R, P> {
    records: R,
    presets: PresetManager<P>,
    config: HistoriesConfig,
    evaluator: FilterEvaluator,
    sheet: Sheet,
    filters: ConditionSet,
    search: String,
    edit_mode: bool,
}

impl<R: RecordStore, P: PresetStore> Session<R, P> {
    /// Open a session on the first sheet with no filters.
    pub fn new(records: R, presets: P, config: HistoriesConfig, edit_mode: bool) -> Self {
        let evaluator = FilterEvaluator::from_config(&config);
        Self {
            records,
            presets: PresetManager::new(presets),
            config,
            evaluator,
            sheet: Sheet::ALL[0],
            filters: ConditionSet::default(),
            search: String::new(),
            edit_mode,
        }
    }

    pub fn sheet(&self) -> Sheet {
        self.sheet
    }

    pub fn filters(&self) -> &ConditionSet {
        &self.filters
    }

    pub fn quick_search_text(&self) -> &str {
        &self.search
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn execute(&mut self, command: Command) -> AppResult<CommandOutcome> {
        if command.is_mutation() && !self.edit_mode {
            tracing::warn!(command = command.name(), "rejected outside edit mode");
            return Err(AppError::ReadOnly {
                operation: command.name(),
            });
        }

        match command {
            Command::SelectSheet(sheet) => {
                self.sheet = sheet;
                tracing::debug!(sheet = %sheet, "sheet selected");
                Ok(CommandOutcome::Done)
            }
            Command::AddCondition(condition) => {
                self.filters.push(condition);
                Ok(CommandOutcome::Filters(self.filters.clone()))
            }
            Command::RemoveCondition(index) => {
                self.filters
                    .remove(index)
                    .ok_or(AppError::NoSuchCondition { index })?;
                Ok(CommandOutcome::Filters(self.filters.clone()))
            }
            Command::SetCombinator(combinator) => {
                self.filters.combinator = combinator;
                Ok(CommandOutcome::Filters(self.filters.clone()))
            }
            Command::ClearFilters => {
                self.filters.clear();
                Ok(CommandOutcome::Filters(self.filters.clone()))
            }
            Command::SetQuickSearch(text) => {
                self.search = text;
                Ok(CommandOutcome::Done)
            }
            Command::Apply => self.apply().map(CommandOutcome::View),
            Command::SavePreset(name) => {
                self.presets.save_set(&name, &self.filters)?;
                Ok(CommandOutcome::Done)
            }
            Command::LoadPreset(name) => {
                self.filters = self.presets.load_or_default(&name)?;
                Ok(CommandOutcome::Filters(self.filters.clone()))
            }
            Command::DeletePreset(name) => {
                self.presets.delete(&name)?;
                Ok(CommandOutcome::Done)
            }
            Command::ListPresets => Ok(CommandOutcome::Presets(self.presets.list()?)),
            Command::Summarize => self.summarize(self.sheet).map(CommandOutcome::Summary),
            Command::Dashboard => self.dashboard().map(CommandOutcome::Dashboard),
            Command::SetEditMode(on) => {
                self.edit_mode = on;
                tracing::info!(edit_mode = on, "edit mode changed");
                Ok(CommandOutcome::Done)
            }
            Command::InsertRecord(record) => {
                let record = self.with_derived_quantity(record);
                let id = self.records.insert(self.sheet, record)?;
                Ok(CommandOutcome::Inserted(id))
            }
            Command::UpdateRecord { id, record } => {
                let record = self.with_derived_quantity(record);
                self.records.update(id, record)?;
                Ok(CommandOutcome::Done)
            }
            Command::DeleteRecord(id) => {
                self.records.delete(id)?;
                Ok(CommandOutcome::Done)
            }
            Command::ClearSheet => {
                let removed = self.records.clear_sheet(self.sheet)?;
                tracing::info!(sheet = %self.sheet, removed, "sheet cleared");
                Ok(CommandOutcome::Cleared(removed))
            }
        }
    }

    /// Filter the current sheet by the working set, then by quick search.
    pub fn apply(&self) -> AppResult<FilteredView> {
        for (index, err) in self.filters.malformed() {
            tracing::warn!(index, error = %err, "skipping malformed condition");
        }
        let all = self.records.records_for(self.sheet)?;
        let filtered = self.evaluator.evaluate(&all, &self.filters);
        let records = quick_search(&filtered, &self.search);
        Ok(FilteredView {
            sheet: self.sheet,
            total: all.len(),
            records,
            active_filters: self.filters.active_count(),
        })
    }

    pub fn summarize(&self, sheet: Sheet) -> AppResult<SheetSummary> {
        let records = self.records.records_for(sheet)?;
        Ok(SheetSummary {
            sheet,
            summary: summarize_with(&records, &self.config),
        })
    }

    pub fn dashboard(&self) -> AppResult<Dashboard> {
        let sheets = Sheet::ALL
            .iter()
            .map(|&sheet| self.summarize(sheet))
            .collect::<AppResult<Vec<_>>>()?;
        let totals = rollup(sheets.iter().map(|s| &s.summary));
        Ok(Dashboard { sheets, totals })
    }

    fn with_derived_quantity(&self, mut record: Record) -> Record {
        let typed = record
            .number(&self.config.quantity_field)
            .map(|qty| qty as i64);
        let qty = derive_quantity(
            &record.text(FIELD_OOR_SERIAL),
            &record.text(FIELD_BEG_SER),
            &record.text(FIELD_END_SER),
            typed,
        );
        record.set(self.config.quantity_field.clone(), qty);
        record
    }
}
