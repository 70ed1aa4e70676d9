use anyhow::{bail, Result};
use pokedex_to_sqlite::{
    cli::{Cli, Commands, SourceArgs},
    download::{CacheManager, DirectoryProvider, HttpProvider, TableProvider},
    filter::resolve_sources,
    ingest_all,
    sources::{load_catalog, DataSource},
    writer::{open_read_only, read_status, SqliteWriter},
    ConsoleUi, IngestOptions, IngestReport, Ui, UiApp,
};
use std::path::Path;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    // The dashboard owns the terminal; drop log lines instead of tearing it
    if quiet {
        builder.with_writer(std::io::sink).init();
    } else {
        builder.init();
    }
}

fn select_sources(select: SourceArgs) -> Result<Vec<DataSource>> {
    let catalog = load_catalog(select.sources.as_deref())?;
    resolve_sources(&catalog, select.include, select.exclude)
}

fn run(
    output_db: &Path,
    provider: &mut impl TableProvider,
    sources: &[DataSource],
    options: IngestOptions,
    ui: &mut impl Ui,
) -> Result<IngestReport> {
    let mut writer = SqliteWriter::open(output_db)?;
    let report = ingest_all(&mut writer, provider, sources, options, ui)?;
    writer.finalize()?;
    Ok(report)
}

fn finish(report: &IngestReport, output_db: &Path, start: Instant) -> Result<()> {
    info!(
        "{:?}: {} in {:.1}s",
        output_db,
        report,
        start.elapsed().as_secs_f64()
    );
    if !report.is_success() {
        let names: Vec<&str> = report.failed.iter().map(|(n, _)| n.as_str()).collect();
        bail!("{} source(s) failed: {}", names.len(), names.join(", "));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let tui = matches!(cli.command, Commands::Sync { tui: true, .. });
    init_tracing(cli.verbose, tui);

    match cli.command {
        Commands::Sync {
            output_db,
            select,
            force,
            cache_dir,
            no_cache,
            fail_fast,
            tui,
        } => {
            let start = Instant::now();
            let sources = select_sources(select)?;

            let cache = if no_cache {
                None
            } else {
                Some(CacheManager::new(cache_dir)?)
            };
            let mut provider = HttpProvider::new(cache, force)?;
            let options = IngestOptions {
                force,
                keep_going: !fail_fast,
            };

            let report = if tui {
                let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
                let mut ui = UiApp::new(&names)?;
                match run(&output_db, &mut provider, &sources, options, &mut ui) {
                    Ok(report) => {
                        ui.finish(&report.to_string())?;
                        report
                    }
                    Err(e) => {
                        ui.restore()?;
                        return Err(e);
                    }
                }
            } else {
                run(&output_db, &mut provider, &sources, options, &mut ConsoleUi::new())?
            };

            finish(&report, &output_db, start)?;
        }

        Commands::Import {
            input_dir,
            output_db,
            select,
            force,
            fail_fast,
        } => {
            let start = Instant::now();
            let sources = select_sources(select)?;
            let mut provider = DirectoryProvider::new(input_dir);
            let options = IngestOptions {
                force,
                keep_going: !fail_fast,
            };

            let report = run(&output_db, &mut provider, &sources, options, &mut ConsoleUi::new())?;
            finish(&report, &output_db, start)?;
        }

        Commands::ListSources { json, sources } => {
            let catalog = load_catalog(sources.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                println!("Configured sources:\n");
                for source in &catalog {
                    println!("  {:<22} {}", source.name, source.url);
                }
            }
        }

        Commands::Status { db } => {
            if !db.exists() {
                bail!("Database not found: {:?}", db);
            }
            let conn = open_read_only(&db)?;
            let status = read_status(&conn)?;
            if status.is_empty() {
                println!("No sources registered in {:?}", db);
            }
            for entry in status {
                let rows = match entry.rows {
                    Some(rows) => format!("{} rows", rows),
                    None => "missing".to_string(),
                };
                println!("  {:<22} {:>12}  {}", entry.source.name, rows, entry.source.url);
            }
        }

        Commands::ClearCache { cache_dir } => {
            let cache = CacheManager::new(cache_dir)?;
            let removed = cache.clear()?;
            println!("Removed {} cached file(s) from {:?}", removed, cache.cache_dir());
        }
    }

    Ok(())
}
