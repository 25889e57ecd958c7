//! Tray menu commands.
//!
//! The tray is driven by text lines: each line on stdin is one menu click or
//! one view-layer call. This keeps the application scriptable from a shell
//! and from tests without a desktop session.
//!
//! | Line | Event |
//! |------|-------|
//! | `show`, `compose` | [`TrayCommand::Compose`] |
//! | `toggle` | [`TrayCommand::Toggle`] (tray icon click) |
//! | `reload` | [`TrayCommand::Reload`] |
//! | `quit` | [`TrayCommand::Quit`] |
//! | `post <text>` | [`ViewAction::Post`] |
//! | `accounts` | [`ViewAction::ListAccounts`] |
//! | `select <index> <true\|false>` | [`ViewAction::Select`] |
//! | `add <platform> <username>` | [`ViewAction::AddAccount`] |
//! | `auth <platform>` | [`ViewAction::OpenAuth`] |

use std::fmt;
use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, warn};

use crate::Error;
use crate::backend::ViewAction;
use crate::event::AppEvent;

/// A tray menu action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    /// "Compose Post": show and focus the composer.
    Compose,
    /// Tray icon click: show if hidden, hide if visible.
    Toggle,
    /// "Reload UI": reload immediately, bypassing the debouncer.
    Reload,
    /// "Quit"
    Quit,
}

impl fmt::Display for TrayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Compose => "Compose Post",
            Self::Toggle => "Toggle",
            Self::Reload => "Reload UI",
            Self::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// A tray line that could not be understood.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ParseCommandError {
    /// The first word is not a known command.
    #[error("unknown command: {command}")]
    #[diagnostic(
        code(bhejo::tray::unknown_command),
        help("expected one of: show, toggle, reload, quit, post, accounts, select, add, auth")
    )]
    Unknown {
        /// The word that was read.
        command: String,
    },

    /// A command is missing an argument or has a malformed one.
    #[error("invalid arguments for `{command}`: expected `{usage}`")]
    #[diagnostic(code(bhejo::tray::invalid_arguments))]
    InvalidArguments {
        /// The command.
        command: &'static str,
        /// Expected form.
        usage: &'static str,
    },
}

/// Parse one tray line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns [`ParseCommandError`] for unknown commands or bad arguments.
pub fn parse_line(line: &str) -> Result<Option<AppEvent>, ParseCommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(c, r)| (c, r.trim()));

    let event: AppEvent = match command.to_ascii_lowercase().as_str() {
        "show" | "compose" => TrayCommand::Compose.into(),
        "toggle" => TrayCommand::Toggle.into(),
        "reload" => TrayCommand::Reload.into(),
        "quit" | "exit" => TrayCommand::Quit.into(),

        "post" => {
            if rest.is_empty() {
                return Err(invalid("post", "post <text>"));
            }
            ViewAction::Post(rest.to_string()).into()
        }

        "accounts" => ViewAction::ListAccounts.into(),

        "select" => {
            let mut args = rest.split_whitespace();
            let index = args.next().and_then(|s| s.parse::<usize>().ok());
            let selected = args.next().and_then(|s| s.parse::<bool>().ok());
            match (index, selected, args.next()) {
                (Some(index), Some(selected), None) => {
                    ViewAction::Select { index, selected }.into()
                }
                _ => return Err(invalid("select", "select <index> <true|false>")),
            }
        }

        "add" => match rest.split_once(char::is_whitespace) {
            Some((platform, username)) if !username.trim().is_empty() => {
                ViewAction::AddAccount {
                    platform: platform.to_string(),
                    username: username.trim().to_string(),
                }
                .into()
            }
            _ => return Err(invalid("add", "add <platform> <username>")),
        },

        "auth" => {
            if rest.is_empty() {
                return Err(invalid("auth", "auth <platform>"));
            }
            ViewAction::OpenAuth(rest.to_string()).into()
        }

        _ => {
            return Err(ParseCommandError::Unknown {
                command: command.to_string(),
            });
        }
    };

    Ok(Some(event))
}

const fn invalid(command: &'static str, usage: &'static str) -> ParseCommandError {
    ParseCommandError::InvalidArguments { command, usage }
}

/// Read tray lines from stdin on a background thread.
///
/// The thread stops at end of input or once the receiving side is gone.
/// Reaching end of input does not quit the application.
///
/// # Errors
///
/// Returns [`Error::Thread`] if the thread cannot be spawned.
pub fn spawn_stdin_reader(events: Sender<AppEvent>) -> Result<JoinHandle<()>, Error> {
    const NAME: &str = "bhejo-tray";

    thread::Builder::new()
        .name(NAME.to_string())
        .spawn(move || read_lines(io::stdin().lock(), &events))
        .map_err(|source| Error::Thread { name: NAME, source })
}

fn read_lines(input: impl BufRead, events: &Sender<AppEvent>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to read tray input");
                break;
            }
        };

        match parse_line(&line) {
            Ok(Some(event)) => {
                if events.send(event).is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, line = %line.trim(), "ignoring tray input"),
        }
    }
    debug!("tray input closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_menu_commands() {
        assert_eq!(
            parse_line("show").unwrap(),
            Some(AppEvent::Tray(TrayCommand::Compose))
        );
        assert_eq!(
            parse_line("  Reload \n").unwrap(),
            Some(AppEvent::Tray(TrayCommand::Reload))
        );
        assert_eq!(
            parse_line("quit").unwrap(),
            Some(AppEvent::Tray(TrayCommand::Quit))
        );
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_view_actions() {
        assert_eq!(
            parse_line("post hello  world").unwrap(),
            Some(AppEvent::View(ViewAction::Post("hello  world".to_string())))
        );
        assert_eq!(
            parse_line("select 1 true").unwrap(),
            Some(AppEvent::View(ViewAction::Select {
                index: 1,
                selected: true
            }))
        );
        assert_eq!(
            parse_line("add Threads demo.threads").unwrap(),
            Some(AppEvent::View(ViewAction::AddAccount {
                platform: "Threads".to_string(),
                username: "demo.threads".to_string(),
            }))
        );
    }

    #[test]
    fn test_bad_lines() {
        assert!(matches!(
            parse_line("dance"),
            Err(ParseCommandError::Unknown { .. })
        ));
        assert_eq!(
            parse_line("select one yes").unwrap_err(),
            invalid("select", "select <index> <true|false>")
        );
        assert!(parse_line("post").is_err());
        assert!(parse_line("add Threads").is_err());
    }

    #[test]
    fn test_read_lines_skips_bad_input_and_stops_at_eof() {
        let (tx, rx) = unbounded();
        read_lines("reload\nnonsense\n\nquit\n".as_bytes(), &tx);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                AppEvent::Tray(TrayCommand::Reload),
                AppEvent::Tray(TrayCommand::Quit)
            ]
        );
    }
}
