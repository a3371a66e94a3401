//! Choosing the folder to organize.
//!
//! Two strategies implement [`FolderSelector`]: a native folder picker and a
//! numbered text menu. [`select_strategy`] picks one once, at start-up, from
//! [`gui_available`].

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("could not read the folder choice: {0}")]
    Io(#[from] io::Error),
}

/// Obtains one directory from the user.
///
/// `Ok(None)` means the user cancelled. A returned path always exists and is
/// a directory.
pub trait FolderSelector {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn select(&mut self) -> Result<Option<PathBuf>, SelectError>;
}

/// Whether a graphical folder picker and dialogs can be shown.
///
/// Windows and macOS always have a desktop session; elsewhere an X11 or
/// Wayland display must be advertised.
pub fn gui_available() -> bool {
    if cfg!(any(target_os = "windows", target_os = "macos")) {
        return true;
    }
    env::var_os("DISPLAY").is_some_and(|v| !v.is_empty())
        || env::var_os("WAYLAND_DISPLAY").is_some_and(|v| !v.is_empty())
}

/// Returns the selector matching the environment.
pub fn select_strategy(use_gui: bool) -> Box<dyn FolderSelector> {
    if use_gui {
        Box::new(DialogSelector::new())
    } else {
        Box::new(TextMenuSelector::stdio())
    }
}

/// Native folder picker.
pub struct DialogSelector {
    start_dir: Option<PathBuf>,
}

impl DialogSelector {
    pub fn new() -> Self {
        Self {
            start_dir: env::current_dir().ok(),
        }
    }
}

impl Default for DialogSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl FolderSelector for DialogSelector {
    fn name(&self) -> &'static str {
        "dialog"
    }

    fn select(&mut self) -> Result<Option<PathBuf>, SelectError> {
        let mut dialog = rfd::FileDialog::new().set_title("Select the folder to organize");
        if let Some(dir) = &self.start_dir {
            dialog = dialog.set_directory(dir);
        }

        // the dialog is modal and closes before pick_folder returns
        Ok(dialog.pick_folder().filter(|path| path.is_dir()))
    }
}

/// Numbered text menu over any reader and writer.
///
/// ```text
/// Select the folder to organize:
///   1. Use current directory (/home/me/Downloads)
///   2. Enter a custom path
///   3. Cancel
/// ```
pub struct TextMenuSelector<R, W> {
    input: R,
    output: W,
    current_dir: PathBuf,
}

impl TextMenuSelector<io::StdinLock<'static>, io::Stderr> {
    /// Menu on standard input, prompting on stderr so stdout only carries
    /// the run's results.
    pub fn stdio() -> Self {
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(io::stdin().lock(), io::stderr(), current_dir)
    }
}

impl<R: BufRead, W: Write> TextMenuSelector<R, W> {
    pub fn new(input: R, output: W, current_dir: PathBuf) -> Self {
        Self {
            input,
            output,
            current_dir,
        }
    }

    /// Reads one trimmed line; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        self.read_line()
    }

    fn show_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "Select the folder to organize:")?;
        writeln!(
            self.output,
            "  1. Use current directory ({})",
            self.current_dir.display()
        )?;
        writeln!(self.output, "  2. Enter a custom path")?;
        writeln!(self.output, "  3. Cancel")
    }

    /// Asks for a path until a directory is given. Blank input cancels.
    fn ask_custom_path(&mut self) -> io::Result<Option<PathBuf>> {
        loop {
            let Some(answer) = self.prompt("Folder path (leave blank to cancel): ")? else {
                return Ok(None);
            };
            let answer = strip_quotes(&answer);
            if answer.is_empty() {
                return Ok(None);
            }

            let path = PathBuf::from(answer);
            let path = if path.is_relative() {
                self.current_dir.join(path)
            } else {
                path
            };

            if path.is_dir() {
                return Ok(Some(path));
            }
            if path.exists() {
                writeln!(self.output, "Not a folder: {}", path.display())?;
            } else {
                writeln!(self.output, "Folder does not exist: {}", path.display())?;
            }
        }
    }
}

impl<R: BufRead, W: Write> FolderSelector for TextMenuSelector<R, W> {
    fn name(&self) -> &'static str {
        "text menu"
    }

    fn select(&mut self) -> Result<Option<PathBuf>, SelectError> {
        loop {
            self.show_menu()?;
            let Some(choice) = self.prompt("Choice [1-3]: ")? else {
                return Ok(None);
            };

            match choice.as_str() {
                "1" => {
                    if self.current_dir.is_dir() {
                        return Ok(Some(self.current_dir.clone()));
                    }
                    writeln!(
                        self.output,
                        "Current directory is not available: {}",
                        self.current_dir.display()
                    )?;
                }
                "2" => return Ok(self.ask_custom_path()?),
                "3" => return Ok(None),
                other => writeln!(self.output, "Invalid choice '{}'. Enter 1, 2 or 3.", other)?,
            }
        }
    }
}

/// Strips one pair of matching surrounding quotes, as left by drag-and-drop
/// into a terminal.
fn strip_quotes(input: &str) -> &str {
    for quote in ['"', '\''] {
        if input.len() >= 2 && input.starts_with(quote) && input.ends_with(quote) {
            return input[1..input.len() - 1].trim();
        }
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::TempDir;

    fn run_menu(input: &str, cwd: &Path) -> (Option<PathBuf>, String) {
        let mut output = Vec::new();
        let selected = {
            let mut selector = TextMenuSelector::new(
                Cursor::new(input.as_bytes()),
                &mut output,
                cwd.to_path_buf(),
            );
            selector.select().expect("menu I/O should not fail")
        };
        (selected, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_use_current_directory() {
        let temp_dir = TempDir::new().unwrap();
        let (selected, output) = run_menu("1\n", temp_dir.path());

        assert_eq!(selected.as_deref(), Some(temp_dir.path()));
        assert!(output.contains("1. Use current directory"));
    }

    #[test]
    fn test_cancel() {
        let temp_dir = TempDir::new().unwrap();
        let (selected, _) = run_menu("3\n", temp_dir.path());
        assert!(selected.is_none());
    }

    #[test]
    fn test_end_of_input_cancels() {
        let temp_dir = TempDir::new().unwrap();
        assert!(run_menu("", temp_dir.path()).0.is_none());
        assert!(run_menu("2\n", temp_dir.path()).0.is_none());
    }

    #[test]
    fn test_invalid_choice_shows_menu_again() {
        let temp_dir = TempDir::new().unwrap();
        let (selected, output) = run_menu("9\nabc\n3\n", temp_dir.path());

        assert!(selected.is_none());
        assert_eq!(output.matches("Select the folder to organize:").count(), 3);
        assert!(output.contains("Invalid choice '9'"));
    }

    #[test]
    fn test_custom_path_reprompts_until_valid() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("Downloads");
        fs_create(&target);
        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        let input = format!(
            "2\n{}\n{}\n\"{}\"\n",
            temp_dir.path().join("missing").display(),
            file.display(),
            target.display()
        );
        let (selected, output) = run_menu(&input, temp_dir.path());

        assert_eq!(selected, Some(target));
        assert!(output.contains("Folder does not exist"));
        assert!(output.contains("Not a folder"));
    }

    #[test]
    fn test_custom_relative_path_resolves_against_current_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs_create(&temp_dir.path().join("inbox"));

        let (selected, _) = run_menu("2\ninbox\n", temp_dir.path());
        assert_eq!(selected, Some(temp_dir.path().join("inbox")));
    }

    #[test]
    fn test_blank_custom_path_cancels() {
        let temp_dir = TempDir::new().unwrap();
        let (selected, _) = run_menu("2\n\n", temp_dir.path());
        assert!(selected.is_none());
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'/tmp/a b'"), "/tmp/a b");
        assert_eq!(strip_quotes("\"C:\\Users\""), "C:\\Users");
        assert_eq!(strip_quotes("plain"), "plain");
        assert_eq!(strip_quotes("\""), "\"");
    }

    fn fs_create(path: &Path) {
        std::fs::create_dir(path).unwrap();
    }
}
