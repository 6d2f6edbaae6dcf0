use std::path::Path;

use zbib_core::config::ZoteroConfig;
use zbib_core::sync::{CommitOutcome, FetchStatus, MirrorFile, SyncReport};
use zbib_core::util::{normalize_base_url, normalize_text_option};
use zbib_core::ItemRecord;

use crate::error::CliError;

pub fn load_config() -> Result<ZoteroConfig, CliError> {
    Ok(ZoteroConfig::from_env()?)
}

pub fn open_mirror(config: &ZoteroConfig, file: Option<&Path>) -> Result<MirrorFile, CliError> {
    Ok(MirrorFile::new(config.resolve_mirror_file(file)?))
}

pub fn load_mirror_records(
    config: &ZoteroConfig,
    file: Option<&Path>,
) -> Result<Vec<ItemRecord>, CliError> {
    Ok(open_mirror(config, file)?.load()?)
}

/// Explicit `--tag` wins over `ZB_SEARCH_TAG`.
pub fn resolve_tag(explicit: Option<String>, config: &ZoteroConfig) -> Option<String> {
    normalize_text_option(explicit).or_else(|| config.search_tag.clone())
}

pub fn resolve_library_url(
    explicit: Option<String>,
    config: &ZoteroConfig,
) -> Result<String, CliError> {
    let Some(raw) = normalize_text_option(explicit) else {
        return Ok(config.library_web_url()?);
    };
    normalize_base_url(&raw).ok_or_else(|| {
        CliError::Config(format!(
            "Library URL must be an http:// or https:// URL: {raw}"
        ))
    })
}

/// Write `rendered` to `output_path`, or print it when no path is given.
pub fn emit(rendered: &str, output_path: Option<&Path>) -> Result<(), CliError> {
    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        print!("{rendered}");
    }
    Ok(())
}

pub fn format_sync_summary(report: &SyncReport, mirror_path: &Path) -> String {
    let status = match &report.status {
        FetchStatus::Unchanged => "library unchanged".to_string(),
        FetchStatus::Complete => "complete".to_string(),
        FetchStatus::Interrupted(error) => format!("interrupted ({error})"),
    };

    match &report.commit {
        CommitOutcome::Unchanged => format!(
            "Sync {status}: nothing written (version {})",
            report.previous_version
        ),
        CommitOutcome::Written {
            records,
            watermark: Some(version),
        } => format!(
            "Sync {status}: {} fetched, {records} records in {}, version {} -> {version}",
            report.fetched,
            mirror_path.display(),
            report.previous_version
        ),
        CommitOutcome::Written {
            records,
            watermark: None,
        } => format!(
            "Sync {status}: {} fetched, {records} records in {}, version kept at {}",
            report.fetched,
            mirror_path.display(),
            report.previous_version
        ),
    }
}
