//! Check-then-load ingestion of each configured source

use anyhow::{Context, Result};
use std::fmt;
use tracing::{error, info};

use crate::download::TableProvider;
use crate::error::{validate_table_name, LoadError};
use crate::parser::parse_csv;
use crate::schema::infer_schema;
use crate::sources::{DataSource, REGISTRY_TABLE};
use crate::ui::{Phase, SourceStatus, Ui};
use crate::writer::SqliteWriter;

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Drop and reload tables that already exist
    pub force: bool,
    /// Continue with the next source after a failure
    pub keep_going: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            force: false,
            keep_going: true,
        }
    }
}

/// Result of ingesting a single source
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The table already existed; nothing was fetched
    Skipped,
    Loaded { rows: u64, columns: usize },
}

/// Summary of a run over several sources
#[derive(Debug, Default)]
pub struct IngestReport {
    pub loaded: Vec<(String, u64)>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub cancelled: bool,
}

impl IngestReport {
    pub fn total_rows(&self) -> u64 {
        self.loaded.iter().map(|(_, rows)| rows).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} loaded ({} rows), {} already present, {} failed",
            self.loaded.len(),
            self.total_rows(),
            self.skipped.len(),
            self.failed.len()
        )?;
        if self.cancelled {
            write!(f, ", cancelled")?;
        }
        Ok(())
    }
}

/// Load one source unless its table is already present
pub fn ingest_source(
    writer: &mut SqliteWriter,
    provider: &mut impl TableProvider,
    source: &DataSource,
    options: IngestOptions,
    ui: &mut impl Ui,
) -> Result<Outcome> {
    if source.name == REGISTRY_TABLE {
        return Err(LoadError::ReservedName(source.name.clone()).into());
    }
    validate_table_name(&source.name)?;

    ui.set_phase(Phase::Checking);
    ui.set_info(format!("{} <- {}", source.name, source.url));

    let exists = writer.table_exists(&source.name)?;
    if exists && !options.force {
        return Ok(Outcome::Skipped);
    }

    ui.set_phase(Phase::Fetching);
    let payload = provider.fetch(source, ui)?;

    ui.set_phase(Phase::Loading);
    let table =
        parse_csv(&payload).with_context(|| format!("Failed to parse CSV for {}", source.name))?;
    let schema = infer_schema(&source.name, &table);
    if exists {
        info!("Replacing existing table {}", source.name);
    }
    let rows = writer.load_table(source, &schema, &table, exists, ui)?;
    ui.clear_progress();

    Ok(Outcome::Loaded {
        rows,
        columns: schema.columns.len(),
    })
}

/// Run `ingest_source` over every source in order
pub fn ingest_all(
    writer: &mut SqliteWriter,
    provider: &mut impl TableProvider,
    sources: &[DataSource],
    options: IngestOptions,
    ui: &mut impl Ui,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for source in sources {
        if ui.cancelled() {
            report.cancelled = true;
            break;
        }

        match ingest_source(writer, provider, source, options, ui) {
            Ok(Outcome::Skipped) => {
                ui.set_source_status(&source.name, SourceStatus::Skipped);
                report.skipped.push(source.name.clone());
            }
            Ok(Outcome::Loaded { rows, columns }) => {
                ui.log(format!("{}: {} rows, {} columns", source.name, rows, columns));
                ui.set_source_status(&source.name, SourceStatus::Loaded { rows });
                report.loaded.push((source.name.clone(), rows));
            }
            Err(e) => {
                ui.clear_progress();
                let reason = format!("{:#}", e);
                ui.set_source_status(&source.name, SourceStatus::Failed(reason.clone()));
                if !options.keep_going {
                    return Err(e.context(format!("Failed to ingest {}", source.name)));
                }
                error!("{} failed: {}", source.name, reason);
                report.failed.push((source.name.clone(), reason));
            }
        }
    }

    ui.set_phase(Phase::Complete);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SilentUi;
    use rusqlite::Connection;
    use std::collections::HashMap;

    /// Serves payloads from memory and counts fetches
    #[derive(Default)]
    struct MemoryProvider {
        payloads: HashMap<String, &'static str>,
        fetches: Vec<String>,
    }

    impl MemoryProvider {
        fn with(mut self, name: &str, csv: &'static str) -> Self {
            self.payloads.insert(name.to_string(), csv);
            self
        }
    }

    impl TableProvider for MemoryProvider {
        fn fetch(&mut self, source: &DataSource, _ui: &mut impl Ui) -> Result<Vec<u8>> {
            self.fetches.push(source.name.clone());
            self.payloads
                .get(&source.name)
                .map(|csv| csv.as_bytes().to_vec())
                .ok_or_else(|| anyhow::anyhow!("404 for {}", source.url))
        }
    }

    fn writer() -> SqliteWriter {
        SqliteWriter::from_connection(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn test_loads_then_skips() {
        let mut writer = writer();
        let mut provider = MemoryProvider::default().with("stats", "id,identifier\n1,hp\n2,attack\n");
        let source = DataSource::veekun("stats");
        let mut ui = SilentUi::new();

        let first = ingest_source(&mut writer, &mut provider, &source, IngestOptions::default(), &mut ui)
            .unwrap();
        assert_eq!(first, Outcome::Loaded { rows: 2, columns: 2 });

        let second = ingest_source(&mut writer, &mut provider, &source, IngestOptions::default(), &mut ui)
            .unwrap();
        assert_eq!(second, Outcome::Skipped);
        assert_eq!(provider.fetches, vec!["stats"]);
        assert_eq!(writer.row_count("stats").unwrap(), 2);
    }

    #[test]
    fn test_differently_cased_table_is_skipped() {
        let mut writer = writer();
        writer
            .connection()
            .execute("CREATE TABLE Types (id INTEGER)", [])
            .unwrap();
        let mut provider = MemoryProvider::default().with("types", "id\n1\n");

        let outcome = ingest_source(
            &mut writer,
            &mut provider,
            &DataSource::veekun("types"),
            IngestOptions::default(),
            &mut SilentUi::new(),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert!(provider.fetches.is_empty());
    }

    #[test]
    fn test_force_reloads() {
        let mut writer = writer();
        let mut provider = MemoryProvider::default().with("stats", "id\n1\n");
        let source = DataSource::veekun("stats");
        let options = IngestOptions {
            force: true,
            ..Default::default()
        };
        let mut ui = SilentUi::new();

        ingest_source(&mut writer, &mut provider, &source, options, &mut ui).unwrap();
        let again = ingest_source(&mut writer, &mut provider, &source, options, &mut ui).unwrap();

        assert_eq!(again, Outcome::Loaded { rows: 1, columns: 1 });
        assert_eq!(provider.fetches.len(), 2);
        assert_eq!(writer.row_count("stats").unwrap(), 1);
        assert_eq!(writer.registered().unwrap().len(), 1);
    }

    #[test]
    fn test_force_with_failed_fetch_keeps_table() {
        let mut writer = writer();
        let mut provider = MemoryProvider::default().with("stats", "id\n1\n");
        let source = DataSource::veekun("stats");
        let mut ui = SilentUi::new();
        ingest_source(&mut writer, &mut provider, &source, IngestOptions::default(), &mut ui)
            .unwrap();

        provider.payloads.clear();
        let options = IngestOptions {
            force: true,
            ..Default::default()
        };
        assert!(ingest_source(&mut writer, &mut provider, &source, options, &mut ui).is_err());
        assert_eq!(writer.row_count("stats").unwrap(), 1);
    }

    #[test]
    fn test_invalid_name_is_rejected_before_fetch() {
        let mut writer = writer();
        let mut provider = MemoryProvider::default();
        let source = DataSource::new("bad name", "https://example.com/x.csv");

        let result = ingest_source(
            &mut writer,
            &mut provider,
            &source,
            IngestOptions::default(),
            &mut SilentUi::new(),
        );
        assert!(result.is_err());
        assert!(provider.fetches.is_empty());
    }

    #[test]
    fn test_registry_name_is_rejected() {
        let mut writer = writer();
        let mut provider = MemoryProvider::default();
        let source = DataSource::new(REGISTRY_TABLE, "https://example.com/x.csv");

        let err = ingest_source(
            &mut writer,
            &mut provider,
            &source,
            IngestOptions::default(),
            &mut SilentUi::new(),
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::ReservedName(REGISTRY_TABLE.into()))
        );
        assert!(provider.fetches.is_empty());
    }

    #[test]
    fn test_failed_fetch_leaves_no_trace() {
        let mut writer = writer();
        let mut provider = MemoryProvider::default();
        let source = DataSource::veekun("types");

        let result = ingest_source(
            &mut writer,
            &mut provider,
            &source,
            IngestOptions::default(),
            &mut SilentUi::new(),
        );
        assert!(result.is_err());
        assert!(!writer.table_exists("types").unwrap());
        assert!(writer.registered().unwrap().is_empty());
    }

    #[test]
    fn test_ingest_all_keeps_going() {
        let mut writer = writer();
        let mut provider = MemoryProvider::default()
            .with("stats", "id\n1\n")
            .with("languages", "id,iso639\n9,en\n");
        let sources = vec![
            DataSource::veekun("stats"),
            DataSource::veekun("types"),
            DataSource::veekun("languages"),
        ];

        let report = ingest_all(
            &mut writer,
            &mut provider,
            &sources,
            IngestOptions::default(),
            &mut SilentUi::new(),
        )
        .unwrap();

        assert_eq!(report.loaded, vec![("stats".to_string(), 1), ("languages".to_string(), 1)]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "types");
        assert!(!report.is_success());
        assert_eq!(report.to_string(), "2 loaded (2 rows), 0 already present, 1 failed");
    }

    #[test]
    fn test_ingest_all_fail_fast() {
        let mut writer = writer();
        let mut provider = MemoryProvider::default().with("languages", "id\n9\n");
        let sources = vec![DataSource::veekun("types"), DataSource::veekun("languages")];
        let options = IngestOptions {
            keep_going: false,
            ..Default::default()
        };

        let result = ingest_all(&mut writer, &mut provider, &sources, options, &mut SilentUi::new());
        assert!(result.is_err());
        assert!(!writer.table_exists("languages").unwrap());
    }

    #[test]
    fn test_ingest_all_second_run_skips_everything() {
        let mut writer = writer();
        let mut provider = MemoryProvider::default()
            .with("stats", "id\n1\n")
            .with("types", "id\n1\n");
        let sources = vec![DataSource::veekun("stats"), DataSource::veekun("types")];
        let mut ui = SilentUi::new();

        ingest_all(&mut writer, &mut provider, &sources, IngestOptions::default(), &mut ui).unwrap();
        let report =
            ingest_all(&mut writer, &mut provider, &sources, IngestOptions::default(), &mut ui)
                .unwrap();

        assert_eq!(report.skipped, vec!["stats", "types"]);
        assert!(report.loaded.is_empty());
        assert_eq!(provider.fetches.len(), 2);
    }

    struct CancelAfter(usize);

    impl Ui for CancelAfter {
        fn set_phase(&mut self, _phase: Phase) {}
        fn set_info(&mut self, _info: impl Into<String>) {}
        fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
        fn clear_progress(&mut self) {}
        fn log(&mut self, _message: impl Into<String>) {}
        fn set_source_status(&mut self, _name: &str, _status: SourceStatus) {}
        fn cancelled(&mut self) -> bool {
            if self.0 == 0 {
                return true;
            }
            self.0 -= 1;
            false
        }
    }

    #[test]
    fn test_cancel_between_sources() {
        let mut writer = writer();
        let mut provider = MemoryProvider::default()
            .with("stats", "id\n1\n")
            .with("types", "id\n1\n");
        let sources = vec![DataSource::veekun("stats"), DataSource::veekun("types")];

        let report = ingest_all(
            &mut writer,
            &mut provider,
            &sources,
            IngestOptions::default(),
            &mut CancelAfter(1),
        )
        .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.loaded.len(), 1);
        assert!(!writer.table_exists("types").unwrap());
    }
}
