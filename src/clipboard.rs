//! Copying share links to the system clipboard.
//!
//! Strategies are tried in order until one succeeds:
//!
//! 1. pipe the text into the platform clipboard tool;
//! 2. stage the text in a temporary file that the tool reads from (the file
//!    is removed when the copy finishes, whatever the outcome);
//! 3. send an OSC 52 escape to the controlling terminal, which needs no
//!    clipboard tool at all and also works over SSH.
//!
//! If every strategy fails the user is shown the text to copy by hand.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use tracing::{debug, warn};

/// Known clipboard tools, in order of preference.
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
];

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no clipboard tool found in PATH")]
    NoTool,
    #[error("stderr is not a terminal")]
    NoTerminal,
    #[error("clipboard tool '{tool}' failed: {reason}")]
    ToolFailed { tool: String, reason: String },
    #[error("clipboard I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something text can be copied into.
pub trait Clipboard {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// External program that reads clipboard contents from stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardTool {
    pub program: String,
    pub args: Vec<String>,
}

impl ClipboardTool {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// First known clipboard tool available in PATH.
    pub fn detect() -> Option<Self> {
        CLIPBOARD_TOOLS
            .iter()
            .find(|(program, _)| which::which(program).is_ok())
            .map(|(program, args)| Self::new(program, args))
    }

    /// Run the tool and wait for it to exit.
    ///
    /// xclip, xsel and wl-copy fork a child that keeps serving the selection,
    /// so only the exit status of the tool itself is waited on. Its output
    /// streams are discarded; a piped stream would stay open as long as that
    /// child lives.
    fn run(&self, stdin: Stdio, input: Option<&str>) -> Result<(), ClipboardError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(stdin)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let written = match (input, child.stdin.take()) {
            (Some(text), Some(mut pipe)) => pipe.write_all(text.as_bytes()),
            _ => Ok(()),
        };
        // Pipe is closed by now, so the tool sees EOF.
        let status = child.wait()?;

        if !status.success() {
            return Err(ClipboardError::ToolFailed {
                tool: self.program.clone(),
                reason: status.to_string(),
            });
        }
        written.map_err(|e| ClipboardError::ToolFailed {
            tool: self.program.clone(),
            reason: format!("input not consumed: {}", e),
        })
    }
}

/// Pipes text straight into the clipboard tool.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    tool: Option<ClipboardTool>,
}

impl CommandClipboard {
    pub fn detect() -> Self {
        Self {
            tool: ClipboardTool::detect(),
        }
    }

    pub fn with_tool(tool: ClipboardTool) -> Self {
        Self { tool: Some(tool) }
    }
}

impl Clipboard for CommandClipboard {
    fn name(&self) -> &str {
        "system clipboard"
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let tool = self.tool.as_ref().ok_or(ClipboardError::NoTool)?;
        debug!("Copying {} bytes via {}", text.len(), tool.program);
        tool.run(Stdio::piped(), Some(text))
    }
}

/// Stages text in a scoped temporary file and feeds that file to the tool.
///
/// Only helps when the tool cannot be fed through a pipe; with no tool at
/// all it fails like [`CommandClipboard`].
#[derive(Debug, Clone)]
pub struct StagedFileClipboard {
    tool: Option<ClipboardTool>,
    staging_dir: Option<PathBuf>,
}

impl StagedFileClipboard {
    pub fn detect() -> Self {
        Self {
            tool: ClipboardTool::detect(),
            staging_dir: None,
        }
    }

    pub fn with_tool(tool: ClipboardTool) -> Self {
        Self {
            tool: Some(tool),
            staging_dir: None,
        }
    }

    /// Stage files under `dir` instead of the system temp directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }
}

impl Clipboard for StagedFileClipboard {
    fn name(&self) -> &str {
        "staged file"
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let tool = self.tool.as_ref().ok_or(ClipboardError::NoTool)?;

        // Removed on drop, including on early return.
        let mut staged = match &self.staging_dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
            None => tempfile::NamedTempFile::new()?,
        };
        staged.write_all(text.as_bytes())?;
        staged.flush()?;

        debug!("Copying staged {} via {}", staged.path().display(), tool.program);
        let input = staged.reopen()?;
        tool.run(Stdio::from(input), None)
    }
}

/// OSC 52 "set clipboard" escape for `text`.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

/// Asks the terminal emulator to set the clipboard with an OSC 52 escape.
///
/// Terminals that ignore OSC 52 drop the escape silently, so success means
/// the request was sent, not that it was honoured.
pub struct TerminalClipboard {
    out: Mutex<Box<dyn Write + Send>>,
    attached: bool,
}

impl TerminalClipboard {
    /// Write to stderr, which stays on the terminal when stdout is piped.
    pub fn stderr() -> Self {
        Self {
            out: Mutex::new(Box::new(std::io::stderr())),
            attached: console::Term::stderr().is_term(),
        }
    }

    /// Write to `out`, treating it as a terminal.
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            attached: true,
        }
    }
}

impl Clipboard for TerminalClipboard {
    fn name(&self) -> &str {
        "terminal (OSC 52)"
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if !self.attached {
            return Err(ClipboardError::NoTerminal);
        }
        let mut out = self
            .out
            .lock()
            .map_err(|_| std::io::Error::other("terminal writer poisoned"))?;
        out.write_all(osc52_sequence(text).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Tells the user when the link could not be copied.
pub trait Notifier {
    fn report_copy_failure(&self, text: &str, error: &ClipboardError);
}

/// Prints the failure and the text to stderr for manual copying.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn report_copy_failure(&self, text: &str, error: &ClipboardError) {
        eprintln!(
            "{} {}",
            console::style("Copy to clipboard failed:").yellow().bold(),
            error
        );
        eprintln!("Copy it manually: {}", console::style(text).cyan());
    }
}

/// How a copy request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Text is on the clipboard; `via` names the strategy that worked.
    Copied { via: String },
    /// Every strategy failed and the user was notified.
    Reported,
}

/// Try each strategy in order; if all fail, notify the user with the last
/// error. Never fails.
pub fn copy_with_fallback(
    text: &str,
    strategies: &[&dyn Clipboard],
    notifier: &dyn Notifier,
) -> CopyOutcome {
    let mut last_error = ClipboardError::NoTool;
    for strategy in strategies {
        match strategy.write_text(text) {
            Ok(()) => {
                return CopyOutcome::Copied {
                    via: strategy.name().to_string(),
                }
            }
            Err(e) => {
                warn!("{} copy failed: {}", strategy.name(), e);
                last_error = e;
            }
        }
    }
    notifier.report_copy_failure(text, &last_error);
    CopyOutcome::Reported
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeClipboard {
        name: &'static str,
        fail: bool,
        written: RefCell<Vec<String>>,
    }

    impl FakeClipboard {
        fn new(name: &'static str, fail: bool) -> Self {
            Self {
                name,
                fail,
                written: RefCell::new(Vec::new()),
            }
        }
    }

    impl Clipboard for FakeClipboard {
        fn name(&self) -> &str {
            self.name
        }

        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::NoTool);
            }
            self.written.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        reports: RefCell<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn report_copy_failure(&self, text: &str, _error: &ClipboardError) {
            self.reports.borrow_mut().push(text.to_string());
        }
    }

    #[test]
    fn test_primary_success_skips_fallback() {
        let primary = FakeClipboard::new("primary", false);
        let fallback = FakeClipboard::new("fallback", false);
        let notifier = RecordingNotifier::default();

        let outcome = copy_with_fallback("link", &[&primary, &fallback], &notifier);
        assert_eq!(
            outcome,
            CopyOutcome::Copied {
                via: "primary".to_string()
            }
        );
        assert!(fallback.written.borrow().is_empty());
        assert!(notifier.reports.borrow().is_empty());
    }

    #[test]
    fn test_fallback_used_when_primary_fails() {
        let primary = FakeClipboard::new("primary", true);
        let fallback = FakeClipboard::new("fallback", false);
        let notifier = RecordingNotifier::default();

        let outcome = copy_with_fallback("link", &[&primary, &fallback], &notifier);
        assert_eq!(
            outcome,
            CopyOutcome::Copied {
                via: "fallback".to_string()
            }
        );
        assert_eq!(*fallback.written.borrow(), vec!["link".to_string()]);
    }

    #[test]
    fn test_user_notified_when_both_fail() {
        let primary = FakeClipboard::new("primary", true);
        let fallback = FakeClipboard::new("fallback", true);
        let notifier = RecordingNotifier::default();

        let outcome = copy_with_fallback("link", &[&primary, &fallback], &notifier);
        assert_eq!(outcome, CopyOutcome::Reported);
        assert_eq!(*notifier.reports.borrow(), vec!["link".to_string()]);
    }

    #[test]
    fn test_later_strategy_reached_past_two_failures() {
        let first = FakeClipboard::new("first", true);
        let second = FakeClipboard::new("second", true);
        let third = FakeClipboard::new("third", false);
        let notifier = RecordingNotifier::default();

        let outcome = copy_with_fallback("link", &[&first, &second, &third], &notifier);
        assert_eq!(
            outcome,
            CopyOutcome::Copied {
                via: "third".to_string()
            }
        );
        assert!(notifier.reports.borrow().is_empty());
    }

    #[test]
    fn test_no_strategies_reports() {
        let notifier = RecordingNotifier::default();
        assert_eq!(copy_with_fallback("link", &[], &notifier), CopyOutcome::Reported);
        assert_eq!(*notifier.reports.borrow(), vec!["link".to_string()]);
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_osc52_sequence() {
        // "link" in base64 is "bGluaw==".
        assert_eq!(osc52_sequence("link"), "\x1b]52;c;bGluaw==\x07");
    }

    #[test]
    fn test_terminal_clipboard_writes_escape() {
        let buffer = SharedBuffer::default();
        let clipboard = TerminalClipboard::with_writer(buffer.clone());

        clipboard
            .write_text("https://goes.example.com/search/img/single/e30=")
            .unwrap();

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(
            written,
            osc52_sequence("https://goes.example.com/search/img/single/e30=")
        );
    }

    #[test]
    fn test_terminal_clipboard_needs_terminal() {
        let clipboard = TerminalClipboard {
            out: Mutex::new(Box::new(std::io::sink())),
            attached: false,
        };
        assert!(matches!(
            clipboard.write_text("x"),
            Err(ClipboardError::NoTerminal)
        ));
    }

    #[test]
    fn test_terminal_used_when_no_tool_exists() {
        let buffer = SharedBuffer::default();
        let notifier = RecordingNotifier::default();
        let outcome = copy_with_fallback(
            "link",
            &[
                &CommandClipboard { tool: None },
                &StagedFileClipboard {
                    tool: None,
                    staging_dir: None,
                },
                &TerminalClipboard::with_writer(buffer.clone()),
            ],
            &notifier,
        );

        assert_eq!(
            outcome,
            CopyOutcome::Copied {
                via: "terminal (OSC 52)".to_string()
            }
        );
        assert!(!buffer.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_tool() {
        let clipboard = CommandClipboard { tool: None };
        assert!(matches!(
            clipboard.write_text("x"),
            Err(ClipboardError::NoTool)
        ));
    }

    #[cfg(unix)]
    fn capture_tool(out: &std::path::Path) -> ClipboardTool {
        let script = format!("cat > '{}'", out.display());
        ClipboardTool::new("sh", &["-c", &script])
    }

    #[cfg(unix)]
    #[test]
    fn test_command_clipboard_pipes_text() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("clip.txt");

        CommandClipboard::with_tool(capture_tool(&out))
            .write_text("https://goes.example.com/search/img/single/e30=")
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "https://goes.example.com/search/img/single/e30="
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_staged_file_removed_after_copy() {
        let staging = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("clip.txt");

        StagedFileClipboard::with_tool(capture_tool(&out))
            .in_dir(staging.path())
            .write_text("staged link")
            .unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "staged link");
        assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_background_child_does_not_block_copy() {
        // Forks a child that outlives the tool, as xclip and wl-copy do.
        let tool = ClipboardTool::new("sh", &["-c", "cat >/dev/null; sleep 5 &"]);
        let start = std::time::Instant::now();

        CommandClipboard::with_tool(tool).write_text("link").unwrap();

        assert!(
            start.elapsed() < std::time::Duration::from_secs(3),
            "copy waited {:?} for a background child",
            start.elapsed()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_exiting_without_reading_is_reaped() {
        let tool = ClipboardTool::new("sh", &["-c", "exit 3"]);
        let big = "x".repeat(1 << 20);

        let result = CommandClipboard::with_tool(tool).write_text(&big);

        assert!(matches!(result, Err(ClipboardError::ToolFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_staged_file_removed_after_failure() {
        let staging = tempfile::tempdir().unwrap();

        let result = StagedFileClipboard::with_tool(ClipboardTool::new("false", &[]))
            .in_dir(staging.path())
            .write_text("staged link");

        assert!(matches!(result, Err(ClipboardError::ToolFailed { .. })));
        assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
    }
}
