//! Platform integration for clipboard writes and opening links.
//!
//! [`SystemDesktop`] shells out to the platform's standard tools:
//!
//! | Platform | Clipboard | Browser |
//! |----------|-----------|---------|
//! | macOS    | `pbcopy`  | `open`  |
//! | Windows  | `clip`    | `cmd /C start` |
//! | Linux    | `wl-copy`, `xclip`, `xsel` | `xdg-open` |

use crate::error::ConsoleError;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;

const NO_ARGS: &[&str] = &[];
const XCLIP_ARGS: &[&str] = &["-selection", "clipboard"];
const XSEL_ARGS: &[&str] = &["--clipboard", "--input"];

/// Writes text to the system clipboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ConsoleError>;
}

/// Opens a URL in a new browsing context.
pub trait Browser: Send + Sync {
    fn open(&self, url: &str) -> Result<(), ConsoleError>;
}

/// Both halves of the desktop integration.
pub trait Desktop: Clipboard + Browser {}

impl<T: Clipboard + Browser> Desktop for T {}

/// Desktop integration backed by platform command-line tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDesktop;

impl SystemDesktop {
    /// Clipboard commands to try, most specific first.
    fn clipboard_commands() -> Vec<(&'static str, &'static [&'static str])> {
        if cfg!(target_os = "macos") {
            vec![("pbcopy", NO_ARGS)]
        } else if cfg!(target_os = "windows") {
            vec![("clip", NO_ARGS)]
        } else {
            let mut commands = Vec::new();
            if std::env::var_os("WAYLAND_DISPLAY").is_some() {
                commands.push(("wl-copy", NO_ARGS));
            }
            commands.push(("xclip", XCLIP_ARGS));
            commands.push(("xsel", XSEL_ARGS));
            commands
        }
    }

    /// Pipe `text` into `program` and wait for it to exit.
    fn pipe_into(program: &str, args: &[&str], text: &str) -> Result<(), String> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("failed to spawn {program}: {e}"))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| format!("failed to write to {program}: {e}"))?;
        }

        let status = child
            .wait()
            .map_err(|e| format!("failed to wait for {program}: {e}"))?;
        if !status.success() {
            let code = status.code().unwrap_or(-1);
            return Err(format!("{program} exited with code {code}"));
        }
        Ok(())
    }
}

impl Clipboard for SystemDesktop {
    fn write_text(&self, text: &str) -> Result<(), ConsoleError> {
        let mut failures = Vec::new();
        for (program, args) in Self::clipboard_commands() {
            match Self::pipe_into(program, args, text) {
                Ok(()) => {
                    tracing::debug!(program, "copied to clipboard");
                    return Ok(());
                }
                Err(e) => failures.push(e),
            }
        }
        Err(ConsoleError::Clipboard(failures.join("; ")))
    }
}

impl Browser for SystemDesktop {
    fn open(&self, url: &str) -> Result<(), ConsoleError> {
        let mut command = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else {
            Command::new("xdg-open")
        };
        command
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|e| ConsoleError::Browser(format!("failed to launch browser: {e}")))
    }
}

/// In-memory desktop that records clipboard writes and opened links.
#[derive(Debug, Default)]
pub struct MemoryDesktop {
    clipboard: Mutex<Option<String>>,
    opened: Mutex<Vec<String>>,
    deny_clipboard: bool,
}

impl MemoryDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    /// A desktop whose clipboard always refuses writes.
    pub fn without_clipboard() -> Self {
        Self {
            deny_clipboard: true,
            ..Self::default()
        }
    }

    /// Last text written to the clipboard.
    pub fn clipboard(&self) -> Option<String> {
        self.clipboard.lock().ok().and_then(|c| c.clone())
    }

    /// Links opened so far, oldest first.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl Clipboard for MemoryDesktop {
    fn write_text(&self, text: &str) -> Result<(), ConsoleError> {
        if self.deny_clipboard {
            return Err(ConsoleError::Clipboard("clipboard access denied".into()));
        }
        let mut clipboard = self
            .clipboard
            .lock()
            .map_err(|_| ConsoleError::Clipboard("clipboard lock poisoned".into()))?;
        *clipboard = Some(text.to_string());
        Ok(())
    }
}

impl Browser for MemoryDesktop {
    fn open(&self, url: &str) -> Result<(), ConsoleError> {
        self.opened
            .lock()
            .map_err(|_| ConsoleError::Browser("browser lock poisoned".into()))?
            .push(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_desktop_records_clipboard_and_links() {
        let desktop = MemoryDesktop::new();
        desktop.write_text("https://a.com").expect("copy");
        desktop.open("https://b.com").expect("open");
        assert_eq!(desktop.clipboard().as_deref(), Some("https://a.com"));
        assert_eq!(desktop.opened(), vec!["https://b.com".to_string()]);
    }

    #[test]
    fn denied_clipboard_reports_clipboard_failure() {
        let desktop = MemoryDesktop::without_clipboard();
        let err = desktop.write_text("x").unwrap_err();
        assert!(matches!(err, ConsoleError::Clipboard(_)));
        assert!(desktop.clipboard().is_none());
    }

    #[test]
    fn clipboard_commands_not_empty() {
        assert!(!SystemDesktop::clipboard_commands().is_empty());
    }

    #[test]
    fn missing_program_is_reported() {
        let err = SystemDesktop::pipe_into("unisearch-definitely-missing-tool", &[], "x")
            .unwrap_err();
        assert!(err.contains("failed to spawn"));
    }

    #[test]
    fn desktops_are_send_sync() {
        fn assert_desktop<T: Desktop>() {}
        assert_desktop::<SystemDesktop>();
        assert_desktop::<MemoryDesktop>();
    }
}
