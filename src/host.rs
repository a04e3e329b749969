//! Platform collaborators: native dialogs, the file browser and the
//! audible cue.
//!
//! The session only sees the `Host` trait so it can run headless in
//! tests. `RfdHost` is the real implementation used by the app.

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

use crate::error::Error;

/// Questions the session may need to ask the user mid-operation
pub trait Host {
    /// Ask for an output folder. `None` means the user cancelled.
    fn pick_output_folder(&mut self, initial: Option<&Path>) -> Option<PathBuf>;

    /// Yes/no confirmation
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

/// Native dialogs via rfd
#[derive(Debug, Default)]
pub struct RfdHost;

impl Host for RfdHost {
    fn pick_output_folder(&mut self, initial: Option<&Path>) -> Option<PathBuf> {
        pick_folder("Select Output Folder", initial)
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        let answer = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::YesNo)
            .show();
        matches!(answer, MessageDialogResult::Yes)
    }
}

/// Show the native folder picker
pub fn pick_folder(title: &str, initial: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new().set_title(title);
    if let Some(dir) = initial.filter(|d| d.is_dir()) {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_folder()
}

/// Show `error` as a modal and log it.
///
/// rfd modals block the update loop, so two of them can never be up at
/// the same time.
pub fn report(error: &Error) {
    let message = error.to_string();
    let (level, title) = dialog_for(error);
    match level {
        MessageLevel::Error => tracing::error!("{}", message),
        _ => tracing::info!("{}", message),
    }
    show(level, title, &message);
}

/// Informational modal
pub fn show_info(title: &str, message: &str) {
    tracing::info!("{}", message);
    show(MessageLevel::Info, title, message);
}

/// Help/About dialog
pub fn show_about() {
    show(MessageLevel::Info, "About", &about_text());
}

pub fn about_text() -> String {
    format!(
        "MaskPruner {}\n\n\
         Paints circular color or mosaic masks over images\n\
         and saves the results as PNG.\n\n\
         Based on PixelPruner.",
        env!("CARGO_PKG_VERSION")
    )
}

/// Level and title for an error modal. Notices are mistakes the user
/// can fix, everything else is a failure.
fn dialog_for(error: &Error) -> (MessageLevel, &'static str) {
    match error {
        Error::SafeMode => (MessageLevel::Info, "Safe Mode"),
        e if e.is_notice() => (MessageLevel::Info, "Information"),
        _ => (MessageLevel::Error, "Error"),
    }
}

fn show(level: MessageLevel, title: &str, message: &str) {
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// Open `dir` in the OS file browser
pub fn open_in_file_browser(dir: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "windows")]
    let program = "explorer";
    #[cfg(target_os = "macos")]
    let program = "open";
    #[cfg(all(unix, not(target_os = "macos")))]
    let program = "xdg-open";

    Command::new(program).arg(dir).spawn()?;
    Ok(())
}

/// Fire-and-forget click sound. Silently does nothing when the platform
/// player is missing.
pub fn play_cue() {
    run_detached(cue_command());
}

fn cue_command() -> Command {
    #[cfg(target_os = "windows")]
    let command = {
        let mut command = Command::new("powershell");
        command.args(["-NoProfile", "-Command", "[System.Media.SystemSounds]::Asterisk.Play()"]);
        command
    };
    #[cfg(target_os = "macos")]
    let command = {
        let mut command = Command::new("afplay");
        command.arg("/System/Library/Sounds/Tink.aiff");
        command
    };
    #[cfg(all(unix, not(target_os = "macos")))]
    let command = {
        let mut command = Command::new("canberra-gtk-play");
        command.args(["-i", "camera-shutter"]);
        command
    };
    command
}

/// Run `command` on a short-lived thread that waits for it, so the child
/// is reaped instead of lingering as a zombie.
fn run_detached(mut command: Command) -> thread::JoinHandle<()> {
    thread::spawn(move || match command.status() {
        Ok(status) if !status.success() => tracing::debug!("cue exited with {}", status),
        Ok(_) => {}
        Err(e) => tracing::debug!("cue unavailable: {}", e),
    })
}
