pub mod persistence;

use std::{env, path::PathBuf, sync::Once};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIR_NAME: &str = ".cashbook";
const HOME_ENV: &str = "CASHBOOK_HOME";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const SNAPSHOT_FILE: &str = "store.json";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "cashbook_core=info".parse() {
            filter = filter.add_directive(directive);
        }

        // A host may already own the global subscriber.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

/// Resolves where configuration and snapshots live on disk.
pub struct PathResolver;

impl PathResolver {
    /// Returns the application data directory, defaulting to `~/.cashbook`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn config_dir_in(base: &std::path::Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &std::path::Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }

    pub fn snapshot_file_in(base: &std::path::Path) -> PathBuf {
        base.join(SNAPSHOT_FILE)
    }
}
