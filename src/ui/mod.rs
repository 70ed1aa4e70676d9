//! Terminal UI module
//!
//! Provides a simple API for displaying ingestion state:
//! - Current phase (Checking, Fetching, Loading)
//! - Progress (current/total with optional details)
//! - Per-source outcome (skipped, loaded, failed)
//! - Activity log (scrollable history)
//!
//! `ConsoleUi` is the default line-oriented renderer, `UiApp` the full-screen
//! ratatui dashboard and `SilentUi` the no-op used by tests.

mod components;
mod console;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use components::{LogPanel, ProgressPanel, SourcesPanel, StatusPanel};

pub use console::ConsoleUi;

/// Application phases shown in the status panel
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Checking,
    Fetching,
    Loading,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Checking => write!(f, "Checking database"),
            Phase::Fetching => write!(f, "Fetching CSV"),
            Phase::Loading => write!(f, "Loading into SQLite"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// What happened to one source during a run
#[derive(Debug, Clone, PartialEq)]
pub enum SourceStatus {
    Pending,
    Skipped,
    Loaded { rows: u64 },
    Failed(String),
}

impl std::fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceStatus::Pending => write!(f, "pending"),
            SourceStatus::Skipped => write!(f, "already present"),
            SourceStatus::Loaded { rows } => write!(f, "{} rows", rows),
            SourceStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Progress information for the current operation
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Trait for UI implementations - allows both real TUI and silent/test modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);
    fn set_source_status(&mut self, name: &str, status: SourceStatus);

    /// Whether the user asked to stop before the next source
    fn cancelled(&mut self) -> bool {
        false
    }
}

/// Main UI application state - full TUI implementation
pub struct UiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: StatusPanel,
    progress: ProgressPanel,
    sources: SourcesPanel,
    log: LogPanel,
    should_quit: bool,
}

impl UiApp {
    /// Create a new UI application and enter the alternate screen
    pub fn new(source_names: &[&str]) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            status: StatusPanel::new(),
            progress: ProgressPanel::new(),
            sources: SourcesPanel::new(source_names),
            log: LogPanel::new(),
            should_quit: false,
        })
    }

    /// Check for quit signal (Ctrl+C or 'q')
    fn check_quit(&mut self) -> bool {
        if event::poll(Duration::from_millis(0)).unwrap_or(false) {
            if let Ok(CrosstermEvent::Key(KeyEvent {
                code, modifiers, ..
            })) = event::read()
            {
                let ctrl_c =
                    code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL);
                if code == KeyCode::Char('q') || ctrl_c {
                    self.should_quit = true;
                    self.log.add("Stopping after the current source...");
                }
            }
        }
        self.should_quit
    }

    fn draw(&mut self) -> Result<()> {
        let status = &self.status;
        let progress = &self.progress;
        let sources = &self.sources;
        let log = &self.log;

        self.terminal.draw(|frame| {
            let area = frame.area();
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(5), // Status panel
                    Constraint::Length(3), // Progress bar
                    Constraint::Min(5),    // Sources + log
                ])
                .split(area);
            let bottom = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(44), Constraint::Min(20)])
                .split(rows[2]);

            status.render(frame, rows[0]);
            progress.render(frame, rows[1]);
            sources.render(frame, bottom[0]);
            log.render(frame, bottom[1]);
        })?;

        Ok(())
    }

    /// Finish the UI and restore the terminal
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.set_phase(Phase::Complete);
        self.clear_progress();
        self.log(summary);
        self.log("Press any key to exit...");

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let CrosstermEvent::Key(_) = event::read()? {
                    break;
                }
            }
        }

        self.restore()
    }

    /// Restore terminal without waiting
    pub fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.status.set_phase(phase);
        self.draw().ok();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.status.set_info(info);
        self.draw().ok();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.progress
            .set_progress(Progress::new(current, total, label));
        self.draw().ok();
    }

    fn clear_progress(&mut self) {
        self.progress.clear();
        self.draw().ok();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.add(message);
        self.draw().ok();
    }

    fn set_source_status(&mut self, name: &str, status: SourceStatus) {
        self.sources.set(name, status);
        self.draw().ok();
    }

    fn cancelled(&mut self) -> bool {
        let quit = self.check_quit();
        self.draw().ok();
        quit
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        // Best effort cleanup
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
    fn set_source_status(&mut self, _name: &str, _status: SourceStatus) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio() {
        assert_eq!(Progress::new(5, 0, "x").ratio(), 0.0);
        assert_eq!(Progress::new(5, 10, "x").ratio(), 0.5);
    }

    #[test]
    fn test_source_status_display() {
        assert_eq!(SourceStatus::Loaded { rows: 18 }.to_string(), "18 rows");
        assert_eq!(SourceStatus::Skipped.to_string(), "already present");
        assert_eq!(
            SourceStatus::Failed("HTTP 404".into()).to_string(),
            "failed: HTTP 404"
        );
    }
}
