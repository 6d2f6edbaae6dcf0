use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use zbib_core::validate::ParentResolution;

#[derive(Parser)]
#[command(name = "zbib")]
#[command(about = "Mirror a Zotero library and report inconsistent records")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download changes since the last sync into the mirror file
    Sync {
        /// Mirror file (defaults to ZB_FILE)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
        /// Watermark file (defaults to ZB_VERSION_FILE, then FILE.version)
        #[arg(long, value_name = "PATH")]
        version_file: Option<PathBuf>,
        /// Only sync items carrying this tag (defaults to ZB_SEARCH_TAG)
        #[arg(long)]
        tag: Option<String>,
        /// Run the consistency check on the mirror afterwards
        #[arg(long)]
        check: bool,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Check the mirror file and print a consistency report
    Check {
        /// Mirror file (defaults to ZB_FILE)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Print the biblatex entries of the mirror
    Bibtex {
        /// Mirror file (defaults to ZB_FILE)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
        /// Only export entries carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Download PDF attachments of the mirrored records
    Pdfs {
        /// Mirror file (defaults to ZB_FILE)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
        /// Only download attachments of records carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Directory receiving the PDFs
        #[arg(long, value_name = "DIR", default_value = "bib/preprints")]
        output_dir: PathBuf,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Options shared by every command that prints a consistency report.
#[derive(Debug, Clone, clap::Args)]
pub struct ReportArgs {
    /// Write the report here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Web base for item links (defaults to ZB_LIBRARY_URL)
    #[arg(long, value_name = "URL")]
    pub library_url: Option<String>,
    /// How parent records are resolved for the file naming rule
    #[arg(long, value_enum, default_value_t = ParentOrder::InOrder)]
    pub parent_resolution: ParentOrder,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ParentOrder {
    /// Parents must appear before their children
    InOrder,
    /// Parents may appear anywhere in the mirror
    WholeCollection,
}

impl From<ParentOrder> for ParentResolution {
    fn from(value: ParentOrder) -> Self {
        match value {
            ParentOrder::InOrder => Self::InOrder,
            ParentOrder::WholeCollection => Self::WholeCollection,
        }
    }
}
