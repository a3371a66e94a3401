//! tidyfolder - sort the top-level files of a folder into category subfolders
//!
//! This library provides the extension-based classifier, the organizer that
//! creates category folders and moves files into them, folder selection
//! (native dialog or text menu), configuration loading, and console output.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod notify;
pub mod output;
pub mod platform;
pub mod selector;

pub use config::{AppConfig, CompiledFilters, ConfigError, LoadedConfig};
pub use file_category::{CategoryTable, ExtensionIndex, OTHER_CATEGORY};
pub use file_organizer::{FileEntry, Organizer, OrganizeError, RunSummary};
pub use selector::{FolderSelector, TextMenuSelector};

pub use cli::{RunOptions, run_cli, run_organize};
