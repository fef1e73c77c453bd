use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use ygocatalog::config::{CatalogArgs, SourceArgs, StoreArgs};
use ygocatalog::logging::LoggingArgs;
use ygocatalog::{manifest, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "ygocatalog-publish",
    about = "Build the multilingual card catalog and publish it in size-bounded chunks"
)]
struct PublishCli {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    logging: LoggingArgs,

    /// Append one JSONL record per published chunk to this file
    #[arg(long, env = "YGOCATALOG_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Fetch, merge, and partition, but write nothing
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = PublishCli::parse();
    if let Err(err) = cli.logging.init() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }
    match publish(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn publish(cli: &PublishCli) -> Result<()> {
    let config = cli
        .catalog
        .build_config()
        .context("invalid catalog configuration")?;
    let fetcher = cli.source.build_fetcher()?;

    if cli.dry_run {
        let plan = pipeline::plan(&config, fetcher.as_ref()).context("failed to plan catalog")?;
        println!(
            "Dry run: {} cards ({} translated) in {} chunk{}, largest {} bytes; nothing written.",
            plan.total_items,
            plan.translated_items,
            plan.chunks.len(),
            if plan.chunks.len() == 1 { "" } else { "s" },
            plan.chunk_bytes().into_iter().max().unwrap_or(0)
        );
        return Ok(());
    }

    let mut store = cli.store.open().context("failed to open catalog store")?;
    let summary = pipeline::run(&config, fetcher.as_ref(), &mut store)
        .context("failed to publish catalog")?;

    if let Some(path) = &cli.manifest {
        manifest::append_records(path, &summary.report.records)
            .with_context(|| format!("failed to append manifest {:?}", path))?;
    }

    println!(
        "Published {} cards ({} translated) in {} chunk{} in {:.1}s.",
        summary.total_items,
        summary.translated_items,
        summary.report.records.len(),
        if summary.report.records.len() == 1 { "" } else { "s" },
        summary.elapsed.as_secs_f64()
    );
    Ok(())
}
