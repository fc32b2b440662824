//! Configuration Management Module
//!
//! Provides persistent configuration storage with:
//! - JSON file-based storage
//! - Validation of listener, capability, store and transcoder settings
//! - Thread-safe access

mod storage;

pub use storage::{
    AppConfig, CapsConfig, ConfigError, ConfigResult, ConfigStore, ConfigStoreConfig,
    ServerConfig, StoreConfig, TranscodeConfig,
};
