//! Yes/no confirmation used before destructive operations.

use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};

use tracing::warn;

/// Prompt text shown before a note is deleted.
pub const DELETE_PROMPT: &str = "Delete this Post-it?";

/// A blocking yes/no prompt. The controller waits for the answer before it
/// handles the next message.
pub trait ConfirmPrompt {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

/// Asks on stderr and reads the answer from stdin. Declines when stdin is not a tty.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        if !atty::is(atty::Stream::Stdin) {
            warn!("stdin is not a terminal, declining confirmation");
            return false;
        }
        eprint!("{} [y/N] ", prompt);
        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(_) => is_yes(&input),
            Err(e) => {
                warn!(error = %e, "failed to read confirmation");
                false
            }
        }
    }
}

/// Asks on the controlling terminal. Used while stdin carries protocol traffic.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirm;

impl ConfirmPrompt for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        let tty = match OpenOptions::new().read(true).write(true).open("/dev/tty") {
            Ok(tty) => tty,
            Err(e) => {
                warn!(error = %e, "no controlling terminal, declining confirmation");
                return false;
            }
        };

        let mut writer = &tty;
        if write!(writer, "{} [y/N] ", prompt).and_then(|_| writer.flush()).is_err() {
            return false;
        }

        let mut input = String::new();
        match BufReader::new(&tty).read_line(&mut input) {
            Ok(_) => is_yes(&input),
            Err(_) => false,
        }
    }
}

fn is_yes(input: &str) -> bool {
    let answer = input.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
