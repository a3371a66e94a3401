//! Command-line interface module for tidyfolder.
//!
//! This module handles:
//! - Argument parsing
//! - Configuration loading
//! - Choosing the target folder (argument, dialog or text menu)
//! - Running the organizer and reporting its summary

use anyhow::Context;
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

use crate::config::LoadedConfig;
use crate::file_category::ExtensionIndex;
use crate::file_organizer::{Organizer, RunSummary, SilentReporter};
use crate::notify;
use crate::output::{ConsoleReporter, OutputFormatter};
use crate::selector::{self, FolderSelector};

/// Sort the top-level files of a folder into category subfolders.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "tidyfolder", version, about)]
pub struct Args {
    /// Folder to organize. When omitted you are asked to choose one.
    pub path: Option<PathBuf>,

    /// Show what would happen without creating or moving anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Configuration file to use instead of the default lookup.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Never open graphical dialogs.
    #[arg(long)]
    pub no_gui: bool,

    /// Print the run summary as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// More diagnostics on stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// How a run presents itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    /// Suppress progress lines and print JSON.
    pub json: bool,
    /// Graphical environment in use; enables the completion dialog.
    pub gui: bool,
}

/// Runs the application for parsed arguments.
///
/// A cancelled selection is not an error: it is reported and the run ends
/// without touching anything.
pub fn run_cli(args: Args) -> anyhow::Result<()> {
    let config = LoadedConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(source) = &config.source {
        tracing::info!(config = %source.display(), "using configuration file");
    }

    let gui = !args.no_gui && selector::gui_available();
    let options = RunOptions {
        dry_run: args.dry_run,
        json: args.json,
        gui,
    };

    let target = match args.path {
        Some(path) => path,
        None => {
            let mut chooser = selector::select_strategy(gui);
            match choose_folder(chooser.as_mut())? {
                Some(path) => path,
                None => {
                    if options.json {
                        tracing::warn!("no folder selected, nothing was changed");
                    } else {
                        OutputFormatter::warning("No folder selected. Nothing was changed.");
                    }
                    return Ok(());
                }
            }
        }
    };

    run_organize(&target, &config, options)?;
    Ok(())
}

/// Asks the selector for a folder.
pub fn choose_folder(chooser: &mut dyn FolderSelector) -> anyhow::Result<Option<PathBuf>> {
    tracing::debug!(strategy = chooser.name(), "asking for target folder");
    let selected = chooser.select().context("selecting a folder")?;
    if let Some(path) = &selected {
        tracing::info!(folder = %path.display(), "folder selected");
    }
    Ok(selected)
}

/// Organizes `target` with an already loaded configuration and prints the
/// outcome.
///
/// The extension index is built here, once, and lent to the organizer.
///
/// # Arguments
///
/// * `target` - Folder whose top-level files are sorted
/// * `config` - Validated categories and filters
/// * `options` - Dry run, JSON output and whether dialogs may be shown
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tidyfolder::{LoadedConfig, RunOptions, run_organize};
///
/// let summary = run_organize(
///     Path::new("/home/user/Downloads"),
///     &LoadedConfig::default(),
///     RunOptions { dry_run: true, ..RunOptions::default() },
/// )?;
/// println!("{} files would move", summary.moved);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn run_organize(
    target: &Path,
    config: &LoadedConfig,
    options: RunOptions,
) -> anyhow::Result<RunSummary> {
    let index = ExtensionIndex::new(&config.categories);
    let organizer = Organizer::new(&index, &config.filters).dry_run(options.dry_run);

    if !options.json {
        if options.dry_run {
            OutputFormatter::dry_run_notice(&format!(
                "Analyzing contents of: {}",
                target.display()
            ));
        } else {
            OutputFormatter::info(&format!("Organizing contents of: {}", target.display()));
        }
    }

    let result = if options.json {
        organizer.organize(target, &mut SilentReporter)
    } else {
        let mut reporter = ConsoleReporter::new(options.dry_run);
        let result = organizer.organize(target, &mut reporter);
        reporter.finish();
        result
    };
    let summary = result.with_context(|| format!("organizing {}", target.display()))?;

    report(&summary, options)?;

    if options.gui && notify::should_notify(&summary) {
        notify::notify_completion(&summary);
    }

    Ok(summary)
}

fn report(summary: &RunSummary, options: RunOptions) -> anyhow::Result<()> {
    if options.json {
        let json = serde_json::to_string_pretty(summary).context("serializing run summary")?;
        OutputFormatter::plain(&json);
        return Ok(());
    }

    if summary.is_empty() {
        return Ok(());
    }

    OutputFormatter::summary_table(summary);
    if summary.dry_run {
        OutputFormatter::success("Dry run complete. No files were modified.");
    } else if summary.failed() > 0 {
        OutputFormatter::warning("Some files could not be moved. Please review errors above.");
    } else {
        OutputFormatter::success("Organization completed!");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_arguments() {
        let args = Args::try_parse_from(["tidyfolder"]).unwrap();
        assert!(args.path.is_none());
        assert!(!args.dry_run);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_parse_all_flags() {
        let args = Args::try_parse_from([
            "tidyfolder",
            "/tmp/inbox",
            "--dry-run",
            "--config",
            "rules.toml",
            "--no-gui",
            "--json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.path, Some(PathBuf::from("/tmp/inbox")));
        assert!(args.dry_run);
        assert_eq!(args.config, Some(PathBuf::from("rules.toml")));
        assert!(args.no_gui);
        assert!(args.json);
        assert_eq!(args.verbose, 2);
    }

    struct FixedSelector(Option<PathBuf>);

    impl FolderSelector for FixedSelector {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn select(&mut self) -> Result<Option<PathBuf>, selector::SelectError> {
            Ok(self.0.take())
        }
    }

    #[test]
    fn test_choose_folder_passes_through_selection() {
        let mut chooser = FixedSelector(Some(PathBuf::from("/tmp")));
        assert_eq!(
            choose_folder(&mut chooser).unwrap(),
            Some(PathBuf::from("/tmp"))
        );
        assert_eq!(choose_folder(&mut chooser).unwrap(), None);
    }

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
