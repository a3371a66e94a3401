//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: coloured status
//! lines, the progress bar shown while files move, and the end-of-run
//! summary. [`ConsoleReporter`] plugs this into the organizer.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use crate::file_organizer::{FileEntry, OrganizeError, ProgressReporter, RunSummary};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use tidyfolder::output::OutputFormatter;
    /// OutputFormatter::success("Moved photo.png to Images");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for `total` files.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        // the template is a literal; fall back to the default style rather than panic
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Prints the end-of-run summary.
    ///
    /// Shows per-category moved counts, then totals for moved, skipped and
    /// failed files, and the folders the run created.
    pub fn summary_table(summary: &RunSummary) {
        Self::header(if summary.dry_run {
            "DRY RUN SUMMARY"
        } else {
            "SUMMARY"
        });

        let width = summary
            .moved_by_category
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        if !summary.moved_by_category.is_empty() {
            println!(
                "{:<width$} | {}",
                "Category".bold(),
                "Files".bold(),
                width = width
            );
            println!("{}", "-".repeat(width + 10));
            for (category, count) in &summary.moved_by_category {
                println!(
                    "{:<width$} | {} {}",
                    category,
                    count.to_string().green(),
                    plural(*count, "file", "files"),
                    width = width
                );
            }
            println!("{}", "-".repeat(width + 10));
        }

        let moved_label = if summary.dry_run {
            "Files to move"
        } else {
            "Files moved"
        };
        println!("{}: {}", moved_label, summary.moved.to_string().green().bold());
        println!("Files skipped: {}", summary.skipped.to_string().yellow());
        if summary.failed() > 0 {
            println!("Files failed: {}", summary.failed().to_string().red());
        }

        let folders_label = if summary.dry_run {
            "Folders to create"
        } else {
            "Folders created"
        };
        if summary.created_folders.is_empty() {
            println!("{}: 0", folders_label);
        } else {
            println!(
                "{}: {} ({})",
                folders_label,
                summary.folders_created(),
                summary.created_folders.join(", ")
            );
        }
    }
}

fn plural<'s>(count: usize, one: &'s str, many: &'s str) -> &'s str {
    if count == 1 { one } else { many }
}

/// Renders organizer progress on the terminal.
///
/// Lines are printed with the progress bar suspended so they are never
/// swallowed when stdout is not a terminal.
pub struct ConsoleReporter {
    dry_run: bool,
    progress: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            progress: None,
        }
    }

    fn line(&self, print: impl FnOnce()) {
        match &self.progress {
            Some(pb) => pb.suspend(print),
            None => print(),
        }
    }

    fn tick(&self) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    /// Clears the progress bar. Called once the run is over.
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn files_found(&mut self, count: usize) {
        OutputFormatter::info(&format!(
            "Found {} {} to organize...",
            count,
            plural(count, "file", "files")
        ));
        self.progress = Some(OutputFormatter::create_progress_bar(count as u64));
    }

    fn no_files(&mut self, _target: &Path) {
        OutputFormatter::warning("No files found to organize.");
    }

    fn category_started(&mut self, category: &str, count: usize) {
        self.line(|| {
            OutputFormatter::header(&format!(
                "Processing {} {} for category: {}",
                count,
                plural(count, "file", "files"),
                category
            ))
        });
        if let Some(pb) = &self.progress {
            pb.set_message(category.to_string());
        }
    }

    fn folder_created(&mut self, folder: &Path) {
        let dry_run = self.dry_run;
        self.line(|| {
            if dry_run {
                OutputFormatter::dry_run_notice(&format!(
                    "Would create folder: {}",
                    folder.display()
                ))
            } else {
                OutputFormatter::plain(&format!("Created folder: {}", folder.display()))
            }
        });
    }

    fn file_moved(&mut self, entry: &FileEntry, category: &str) {
        let dry_run = self.dry_run;
        self.line(|| {
            if dry_run {
                OutputFormatter::dry_run_notice(&format!(
                    "Would move {} to {} folder",
                    entry.name, category
                ))
            } else {
                OutputFormatter::success(&format!("Moved {} to {} folder", entry.name, category))
            }
        });
        self.tick();
    }

    fn file_skipped(&mut self, entry: &FileEntry, category: &str) {
        self.line(|| {
            OutputFormatter::warning(&format!(
                "File {} already exists in {} folder. Skipping...",
                entry.name, category
            ))
        });
        self.tick();
    }

    fn file_failed(&mut self, entry: &FileEntry, error: &OrganizeError) {
        self.line(|| OutputFormatter::error(&format!("Error moving {}: {}", entry.name, error)));
        self.tick();
    }
}

impl Drop for ConsoleReporter {
    fn drop(&mut self) {
        self.finish();
    }
}
