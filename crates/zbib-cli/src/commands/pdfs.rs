use std::path::Path;

use tracing::{info, warn};
use zbib_core::attachments::select_pdf_attachments;
use zbib_core::sync::ZoteroClient;

use crate::commands::common::{load_config, load_mirror_records, resolve_tag};
use crate::error::CliError;

/// Download every selected PDF; failures of single files are logged and skipped.
pub async fn run_pdfs(
    file: Option<&Path>,
    tag: Option<String>,
    output_dir: &Path,
) -> Result<(), CliError> {
    let config = load_config()?;
    let items = load_mirror_records(&config, file)?;
    let tag = resolve_tag(tag, &config);
    let client = ZoteroClient::new(&config)?;

    let downloads = select_pdf_attachments(&items, tag.as_deref());
    std::fs::create_dir_all(output_dir)?;

    let mut saved = 0usize;
    for download in &downloads {
        let path = output_dir.join(&download.file_name);
        match client.download_attachment(&download.attachment_key).await {
            Ok(bytes) => {
                std::fs::write(&path, bytes)?;
                info!(
                    attachment = %download.attachment_key,
                    parent = %download.parent_key,
                    path = %path.display(),
                    "saved attachment"
                );
                saved += 1;
            }
            Err(error) => warn!(
                attachment = %download.attachment_key,
                %error,
                "skipping attachment"
            ),
        }
    }

    println!(
        "Saved {saved} of {} PDF attachments to {}",
        downloads.len(),
        output_dir.display()
    );
    Ok(())
}
