use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::sources::DataSource;
use crate::ui::Ui;

/// Supplies the raw CSV payload for a source
pub trait TableProvider {
    fn fetch(&mut self, source: &DataSource, ui: &mut impl Ui) -> Result<Vec<u8>>;
}

/// Reads `<dir>/<name>.csv` instead of downloading
pub struct DirectoryProvider {
    dir: PathBuf,
}

impl DirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TableProvider for DirectoryProvider {
    fn fetch(&mut self, source: &DataSource, ui: &mut impl Ui) -> Result<Vec<u8>> {
        let path = self.dir.join(format!("{}.csv", source.name));
        ui.log(format!("Reading {}", path.display()));
        fs::read(&path).with_context(|| format!("Failed to read: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SilentUi;

    #[test]
    fn test_directory_provider() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stats.csv"), "id,identifier\n1,hp\n").unwrap();

        let mut provider = DirectoryProvider::new(dir.path());
        let mut ui = SilentUi::new();
        let bytes = provider.fetch(&DataSource::veekun("stats"), &mut ui).unwrap();
        assert_eq!(bytes, b"id,identifier\n1,hp\n");

        assert!(provider.fetch(&DataSource::veekun("types"), &mut ui).is_err());
    }
}
