//! Subcommand implementations.

pub mod config;
pub mod ics;
pub mod record;

use std::path::Path;

use daybook_core::EventRecord;
use tracing::debug;

use crate::config::DaybookConfig;
use crate::error::CliResult;

/// Reads a record file with the configured header prefix.
///
/// The body is loaded on first access.
pub(crate) fn load_record(path: &Path, config: &DaybookConfig) -> CliResult<EventRecord> {
    let record = config.record_format().parse_file(path, true)?;
    if !record.field_errors().is_empty() {
        debug!(
            path = %path.display(),
            errors = record.field_errors().len(),
            "Record has invalid header values"
        );
    }
    Ok(record)
}
