//! Platform location of the user config file.

use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "sma-tools";
const APPLICATION: &str = "sunny-scrape";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Per-user directories for sunny-scrape.
///
/// `config_dir` is `None` when the platform exposes no home directory, in
/// which case only the explicit and working-directory config locations apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: Option<PathBuf>,
}

impl AppPaths {
    /// Ask the platform, e.g. `~/.config/sunny-scrape` on Linux.
    #[must_use]
    pub fn discover() -> Self {
        Self {
            config_dir: ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
                .map(|dirs| dirs.config_dir().to_path_buf()),
        }
    }

    #[must_use]
    pub fn config_file(&self) -> Option<PathBuf> {
        self.config_dir
            .as_ref()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
    }
}
