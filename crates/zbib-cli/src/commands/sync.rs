use std::path::Path;

use zbib_core::sync::{sync_library, FileVersionStore, ZoteroClient};

use crate::cli::ReportArgs;
use crate::commands::check::{check_records, CheckOutcome};
use crate::commands::common::{
    emit, format_sync_summary, load_config, open_mirror, resolve_library_url, resolve_tag,
};
use crate::error::CliError;

pub async fn run_sync(
    file: Option<&Path>,
    version_file: Option<&Path>,
    tag: Option<String>,
    check: Option<ReportArgs>,
) -> Result<CheckOutcome, CliError> {
    let config = load_config()?;
    let mirror = open_mirror(&config, file)?;
    let store = FileVersionStore::new(config.resolve_version_file(version_file, mirror.path()));
    let client = ZoteroClient::new(&config)?;
    let tag = resolve_tag(tag, &config);

    let report = sync_library(&client, &store, &mirror, tag).await?;
    eprintln!("{}", format_sync_summary(&report, mirror.path()));

    let Some(args) = check else {
        return Ok(CheckOutcome::Clean);
    };
    let library_url = resolve_library_url(args.library_url.clone(), &config)?;
    let items = mirror.load()?;
    let (outcome, markdown) = check_records(&items, library_url, &args);
    emit(&markdown, args.output.as_deref())?;
    Ok(outcome)
}
