use std::path::{Path, PathBuf};

/// Which files a run produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Xpt,
    Both,
}

impl OutputFormat {
    pub fn includes_csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }

    pub fn includes_xpt(self) -> bool {
        matches!(self, Self::Xpt | Self::Both)
    }
}

/// Files written by [`crate::write_outputs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPaths {
    pub csv: Option<PathBuf>,
    pub xpt: Option<PathBuf>,
}

impl OutputPaths {
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.csv.iter().chain(self.xpt.iter()).map(PathBuf::as_path)
    }
}
