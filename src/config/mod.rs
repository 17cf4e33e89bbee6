//! Configuration management for boardsync.
//!
//! This module handles loading and saving configuration from `~/.boardsync/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{ColorSetting, Config, GeneralConfig, RemoteConfig, SyncConfig};
