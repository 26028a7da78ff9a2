use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".daily_budget";
const CONFIG_FILE: &str = "config.json";
const STORE_FILE: &str = "store.json";

/// Application data directory: `$DAILY_BUDGET_HOME`, else `~/.daily_budget`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("DAILY_BUDGET_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_file_in(base: &std::path::Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn store_file_in(base: &std::path::Path) -> PathBuf {
    base.join(STORE_FILE)
}
