//! Line-oriented UI: an indicatif progress bar plus tracing events

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::{Phase, SourceStatus, Ui};

pub struct ConsoleUi {
    bar: Option<ProgressBar>,
    style: ProgressStyle,
}

impl ConsoleUi {
    pub fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template("{msg:24} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        Self { bar: None, style }
    }

    /// Emit through the bar so log lines do not tear it
    fn emit(&self, f: impl FnOnce()) {
        match &self.bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

impl Default for ConsoleUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        if phase == Phase::Complete {
            self.clear_progress();
        }
    }

    fn set_info(&mut self, info: impl Into<String>) {
        let info = info.into();
        self.emit(|| info!("{}", info));
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        let style = &self.style;
        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total);
            bar.set_style(style.clone());
            bar
        });
        bar.set_length(total);
        bar.set_position(current);
        bar.set_message(label.into());
    }

    fn clear_progress(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.emit(|| info!("{}", message));
    }

    fn set_source_status(&mut self, name: &str, status: SourceStatus) {
        self.emit(|| match &status {
            SourceStatus::Failed(reason) => warn!(source = name, "{}", reason),
            other => info!(source = name, "{}", other),
        });
    }
}
