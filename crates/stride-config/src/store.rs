use std::path::PathBuf;

use serde::Deserialize;

/// Path that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Conversation storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLite database file, or `:memory:`
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: default_path() }
    }
}

impl StoreConfig {
    /// Whether the database lives only for the lifetime of the process
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("data/chat.db")
}
