//! Local infrastructure for ETHOS: paths, atomic TOML storage, configuration
//! loading, and the pending-result cache.

pub mod config_service;
pub mod paths;
pub mod result_cache;
pub mod storage;

pub use config_service::ConfigService;
pub use paths::EthosPaths;
pub use result_cache::TomlResultCache;
