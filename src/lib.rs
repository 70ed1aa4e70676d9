pub mod cli;
pub mod download;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod parser;
pub mod schema;
pub mod sources;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::LoadError;
pub use ingest::{ingest_all, ingest_source, IngestOptions, IngestReport, Outcome};
pub use ui::{ConsoleUi, Phase, SilentUi, SourceStatus, Ui, UiApp};
