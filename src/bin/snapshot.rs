use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use ygocatalog::config::{CatalogArgs, HttpArgs};
use ygocatalog::logging::LoggingArgs;
use ygocatalog::{fetch_all, SnapshotSource};

#[derive(Parser, Debug)]
#[command(
    name = "ygocatalog-snapshot",
    about = "Download the card-info listings into a snapshot directory for offline runs"
)]
struct SnapshotCli {
    /// Directory the listings are written into
    #[arg(long, env = "YGOCATALOG_SNAPSHOT_DIR", default_value = "snapshot")]
    output_dir: PathBuf,

    #[command(flatten)]
    http: HttpArgs,

    #[command(flatten)]
    catalog: CatalogArgs,

    #[command(flatten)]
    logging: LoggingArgs,
}

fn main() -> ExitCode {
    let cli = SnapshotCli::parse();
    if let Err(err) = cli.logging.init() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }
    match snapshot(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn snapshot(cli: &SnapshotCli) -> Result<()> {
    let config = cli
        .catalog
        .build_config()
        .context("invalid catalog configuration")?;
    let source = cli.http.build_source()?;

    let languages = std::iter::once(None).chain(config.translated_languages.iter().copied().map(Some));
    let mut total = 0usize;
    for language in languages {
        let items = fetch_all(&source, language, config.page_size)?;
        let count = items.len();
        let path = SnapshotSource::write(&cli.output_dir, language, items)?;
        info!(path = %path.display(), cards = count, "wrote snapshot listing");
        total += count;
    }

    println!(
        "Wrote {} listing{} ({} cards) to {}.",
        config.translated_languages.len() + 1,
        if config.translated_languages.is_empty() { "" } else { "s" },
        total,
        cli.output_dir.display()
    );
    Ok(())
}
