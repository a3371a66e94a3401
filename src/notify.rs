//! Completion dialog shown after a graphical run.

use rfd::{MessageButtons, MessageDialog, MessageLevel};

use crate::file_organizer::RunSummary;

/// Whether a finished run deserves a completion dialog: something actually
/// moved.
pub fn should_notify(summary: &RunSummary) -> bool {
    !summary.dry_run && summary.moved > 0
}

/// Text of the completion dialog.
pub fn completion_message(summary: &RunSummary) -> String {
    let mut message = format!(
        "Files moved: {}\nFolders created: {}\nFiles skipped: {}",
        summary.moved,
        summary.folders_created(),
        summary.skipped
    );
    if summary.failed() > 0 {
        message.push_str(&format!("\nFiles failed: {}", summary.failed()));
    }
    message
}

/// Shows a modal info dialog with the run's counts. Blocks until the user
/// dismisses it.
pub fn notify_completion(summary: &RunSummary) {
    tracing::debug!("showing completion dialog");
    let _ = MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title("Organization complete")
        .set_description(completion_message(summary))
        .set_buttons(MessageButtons::Ok)
        .show();
}
