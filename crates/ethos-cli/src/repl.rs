use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

pub const COMMANDS: [&str; 4] = ["/choices", "/feedback", "/restart", "/help"];

/// Completion, highlighting, and hints for the practice REPL.
#[derive(Clone)]
pub struct PracticeHelper {
    commands: Vec<String>,
}

impl PracticeHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for PracticeHelper {}

impl Completer for PracticeHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for PracticeHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for PracticeHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for PracticeHelper {}

/// What the user typed at the practice prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// 0-based choice index
    Choice(usize),
    ShowChoices,
    Feedback,
    Restart,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Input {
    /// Parses a prompt line. Choices are entered 1-based.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "" => Input::Empty,
            "quit" | "exit" | "/quit" => Input::Quit,
            "/choices" => Input::ShowChoices,
            "/feedback" => Input::Feedback,
            "/restart" => Input::Restart,
            "/help" | "?" => Input::Help,
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => Input::Choice(n - 1),
                _ => Input::Unknown(other.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_based_choices() {
        assert_eq!(Input::parse(" 2 "), Input::Choice(1));
        assert_eq!(Input::parse("0"), Input::Unknown("0".to_string()));
        assert_eq!(Input::parse("two"), Input::Unknown("two".to_string()));
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse("/feedback"), Input::Feedback);
        assert_eq!(Input::parse("/restart"), Input::Restart);
        assert_eq!(Input::parse("exit"), Input::Quit);
        assert_eq!(Input::parse("   "), Input::Empty);
    }
}
