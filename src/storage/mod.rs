//! Storage: engine configuration and reading progress persistence.

pub mod config;
pub mod progress;

pub use config::{
    load_config, load_config_from, save_config, save_config_to, ConfigError, EngineConfig,
    PersistenceSettings,
};
pub use progress::{HttpProgressStore, MemoryProgressStore, PersistenceError, ProgressStore};
