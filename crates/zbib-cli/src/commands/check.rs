use std::path::Path;

use tracing::info;
use zbib_core::validate::{ConsistencyValidator, ProblemLog};
use zbib_core::ItemRecord;

use crate::cli::ReportArgs;
use crate::commands::common::{emit, load_config, load_mirror_records, resolve_library_url};
use crate::error::CliError;

/// Result of a consistency check, mapped to the process exit status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CheckOutcome {
    Clean,
    DefectsFound,
}

pub fn run_check(file: Option<&Path>, args: ReportArgs) -> Result<CheckOutcome, CliError> {
    let config = load_config()?;
    let items = load_mirror_records(&config, file)?;
    let library_url = resolve_library_url(args.library_url.clone(), &config)?;
    let (outcome, markdown) = check_records(&items, library_url, &args);
    emit(&markdown, args.output.as_deref())?;
    Ok(outcome)
}

pub fn check_records(
    items: &[ItemRecord],
    library_url: String,
    args: &ReportArgs,
) -> (CheckOutcome, String) {
    let validator =
        ConsistencyValidator::new().with_parent_resolution(args.parent_resolution.into());
    let mut log = ProblemLog::new(library_url);
    validator.validate(items, &mut log);

    info!(items = items.len(), defects = log.len(), "consistency check finished");
    let outcome = if log.is_empty() {
        CheckOutcome::Clean
    } else {
        CheckOutcome::DefectsFound
    };
    (outcome, log.render().to_markdown())
}
