use std::path::Path;

use zbib_core::export::render_biblatex_export;

use crate::commands::common::{emit, load_config, load_mirror_records, resolve_tag};
use crate::error::CliError;

pub fn run_bibtex(
    file: Option<&Path>,
    tag: Option<String>,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let config = load_config()?;
    let items = load_mirror_records(&config, file)?;
    let tag = resolve_tag(tag, &config);
    let rendered = render_biblatex_export(&items, tag.as_deref());
    emit(&rendered, output_path)
}
