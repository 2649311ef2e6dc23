//! Delimiter-aware statement splitting
//!
//! Turns one script's source text into an ordered sequence of executable
//! statements. The splitter understands the `DELIMITER <token>` directive
//! used by MySQL-family client tooling to define stored routines: while a
//! non-default delimiter is active, embedded default delimiters inside the
//! routine body do not terminate the statement.
//!
//! The lexer is an explicit three-state machine so every edge case is
//! testable without a database:
//!
//! - `Default` — statements terminate on the active delimiter
//! - `AwaitingDelimiterToken` — a bare `DELIMITER` line was seen; the next
//!   non-blank, non-comment line supplies the new token
//! - `InRoutineBody` — a non-default delimiter is active; termination also
//!   requires an `END` marker immediately followed by the delimiter
//!
//! A script that never reverts a custom delimiter stays in routine-body
//! mode for the rest of its text. That matches how the underlying engine's
//! client behaves and is a valid (if unusual) state, not an error.

use crate::script::Statement;

/// The default statement delimiter
pub const DEFAULT_DELIMITER: &str = ";";

/// Line-comment markers; full-line comments never contribute statement text
const COMMENT_MARKERS: [&str; 2] = ["--", "#"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Default,
    AwaitingDelimiterToken,
    InRoutineBody,
}

struct Splitter {
    state: LexState,
    delimiter: String,
    buffer: Vec<String>,
    statements: Vec<Statement>,
}

impl Splitter {
    fn new() -> Self {
        Self {
            state: LexState::Default,
            delimiter: DEFAULT_DELIMITER.to_string(),
            buffer: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// Emit the pending buffer as one statement, if non-empty.
    ///
    /// Default-delimiter statements retain their trailing `;`; routine
    /// bodies have the trailing custom token stripped, since the token is
    /// a client-side splitting artifact rather than server SQL.
    fn flush(&mut self, routine_body: bool) {
        if self.buffer.is_empty() {
            return;
        }

        let mut text = self.buffer.join("\n");
        if routine_body {
            if let Some(stripped) = text.strip_suffix(&self.delimiter) {
                text = stripped.trim_end().to_string();
            }
        }

        self.statements.push(Statement {
            text,
            index: self.statements.len() + 1,
            routine_body,
        });
        self.buffer.clear();
    }

    /// Install a new active delimiter and move to the matching state
    fn set_delimiter(&mut self, token: &str) {
        self.delimiter = token.to_string();
        self.state = if token == DEFAULT_DELIMITER {
            LexState::Default
        } else {
            LexState::InRoutineBody
        };
    }

    fn feed_line(&mut self, raw: &str) {
        let line = raw.trim();

        // Blank lines and full-line comments never reach the buffer
        if line.is_empty() || COMMENT_MARKERS.iter().any(|m| line.starts_with(m)) {
            return;
        }

        // A bare DELIMITER line left us waiting for the token
        if self.state == LexState::AwaitingDelimiterToken {
            if let Some(token) = line.split_whitespace().next() {
                self.set_delimiter(token);
            }
            return;
        }

        // Delimiter directive: change the active token, never emit the line
        if line.to_ascii_uppercase().starts_with("DELIMITER") {
            let routine = self.state == LexState::InRoutineBody;
            self.flush(routine);

            match line.split_whitespace().nth(1) {
                Some(token) => self.set_delimiter(token),
                None => self.state = LexState::AwaitingDelimiterToken,
            }
            return;
        }

        self.buffer.push(line.to_string());

        if !line.ends_with(&self.delimiter) {
            return;
        }

        match self.state {
            LexState::Default => self.flush(false),
            LexState::InRoutineBody => {
                // Completion requires an explicit END marker immediately
                // followed by the active delimiter on this line
                let end_marker = format!("END{}", self.delimiter);
                if line.to_ascii_uppercase().contains(&end_marker) {
                    self.flush(true);
                    self.delimiter = DEFAULT_DELIMITER.to_string();
                    self.state = LexState::Default;
                }
            }
            LexState::AwaitingDelimiterToken => unreachable!("handled above"),
        }
    }

    fn finish(mut self) -> Vec<Statement> {
        // Tolerate scripts missing a trailing delimiter
        let routine = self.state == LexState::InRoutineBody;
        self.flush(routine);
        self.statements
    }
}

/// Split raw script text into ordered, 1-indexed statements.
///
/// Empty scripts yield zero statements. No SQL validation is performed;
/// malformed SQL surfaces only at execution time.
pub fn split_statements(source: &str) -> Vec<Statement> {
    let mut splitter = Splitter::new();
    for line in source.lines() {
        splitter.feed_line(line);
    }
    splitter.finish()
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
