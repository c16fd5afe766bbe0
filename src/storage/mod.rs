//! Configuration and output storage.

pub mod config;
pub mod output;
pub mod paths;

pub use config::{
    Config, ConfigLocation, ConfigSource, ENV_CONFIG, ENV_NO_COLOR,
    ENV_NO_COLOR_STD, ENV_PASSWORD, ENV_RENEWAL_THRESHOLD, ENV_TIMEOUT, ENV_USERNAME,
    ResolvedConfig, locate_config,
};
pub use output::{CsvDirectorySink, OutputSink, day_file_name};
pub use paths::AppPaths;
