//! Credential persistence for Milk: a TOML configuration file with a
//! `[settings]` table.

pub mod config_file;

pub use config_file::ConfigFileStore;
