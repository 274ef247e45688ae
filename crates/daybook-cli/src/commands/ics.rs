//! iCalendar commands: export and import.

use std::path::Path;

use daybook_core::EventRecord;

use super::load_record;
use crate::config::DaybookConfig;
use crate::error::{CliError, CliResult};

fn read_record_from_ics(path: &Path, config: &DaybookConfig) -> CliResult<EventRecord> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    Ok(daybook_ics::from_ics_with_format(&text, &config.record_format())?)
}

/// Print a record as an iCalendar document.
pub fn export(file: &Path, config: &DaybookConfig) -> CliResult<()> {
    let record = load_record(file, config)?;
    print!("{}", daybook_ics::to_ics_string(&record)?);
    Ok(())
}

/// Print the first event of an iCalendar file as a record.
pub fn import(ics: &Path, config: &DaybookConfig) -> CliResult<()> {
    let record = read_record_from_ics(ics, config)?;
    print!("{}", record.dump());
    Ok(())
}
