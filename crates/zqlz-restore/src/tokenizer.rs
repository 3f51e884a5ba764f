//! Quote-aware statement tokenizer
//!
//! Splits dump text on semicolons that are not inside a quoted string, so a
//! `;` in row data such as `INSERT INTO t VALUES ('a;b')` never cuts a
//! statement in two.
//!
//! Quote tracking is a two-state machine, see [`QuoteState`]. Two known
//! limitations follow from keeping it that small:
//!
//! - An escaped quote is recognised only by a preceding backslash. SQL's
//!   doubled-quote escape (`'it''s'`) is not special-cased: the second quote
//!   closes the string and the third reopens it, which happens to keep the
//!   contents protected but means the state is briefly `Normal` in between.
//! - `--` comments are not a state of their own, so quotes and semicolons
//!   inside comments are scanned like any other text.

/// Quote tracking state while scanning dump text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteState {
    /// Outside any string literal; semicolons end statements
    #[default]
    Normal,
    /// Inside a string opened by the contained quote character
    InString(char),
}

impl QuoteState {
    /// Compute the state after consuming `current`.
    ///
    /// `previous` is the character immediately before `current` in the
    /// input, or `None` at the start of the text.
    pub fn advance(self, current: char, previous: Option<char>) -> Self {
        match self {
            QuoteState::Normal if is_quote(current) => QuoteState::InString(current),
            QuoteState::Normal => QuoteState::Normal,
            QuoteState::InString(quote) if current == quote && previous != Some('\\') => {
                QuoteState::Normal
            }
            in_string @ QuoteState::InString(_) => in_string,
        }
    }

    pub fn is_in_string(self) -> bool {
        matches!(self, QuoteState::InString(_))
    }
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// One SQL statement cut from the dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Position among emitted statements (0-based)
    pub index: usize,
    /// Trimmed statement text, including its terminating semicolon when it
    /// had one
    pub text: String,
}

/// Split dump text into statements.
///
/// Candidates that trim to nothing, consist only of `--` comment lines, or
/// are a bare `BEGIN;` / `COMMIT;` are dropped; batches supply their own
/// transaction framing. Text after the final semicolon is emitted as the
/// last statement, even when a string literal was left open.
pub fn tokenize(text: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut state = QuoteState::Normal;
    let mut previous = None;
    let mut start = 0;

    for (offset, c) in text.char_indices() {
        state = state.advance(c, previous);
        previous = Some(c);

        if c == ';' && state == QuoteState::Normal {
            let end = offset + c.len_utf8();
            push_candidate(&mut statements, &text[start..end]);
            start = end;
        }
    }

    let remainder = text[start..].trim();
    if !remainder.is_empty() {
        if state.is_in_string() {
            tracing::warn!(
                statement_index = statements.len(),
                "dump ends inside an unterminated string literal"
            );
        }
        let index = statements.len();
        statements.push(Statement {
            index,
            text: remainder.to_string(),
        });
    }

    statements
}

/// Split dump text into statement strings
pub fn split_statements(text: &str) -> Vec<String> {
    tokenize(text).into_iter().map(|s| s.text).collect()
}

fn push_candidate(statements: &mut Vec<Statement>, candidate: &str) {
    let trimmed = candidate.trim();
    if is_discarded(trimmed) {
        return;
    }
    let index = statements.len();
    statements.push(Statement {
        index,
        text: trimmed.to_string(),
    });
}

fn is_discarded(trimmed: &str) -> bool {
    if trimmed.is_empty() || is_comment_only(trimmed) {
        return true;
    }
    let body = trimmed.trim_end_matches(';').trim();
    body.is_empty() || body.eq_ignore_ascii_case("BEGIN") || body.eq_ignore_ascii_case("COMMIT")
}

fn is_comment_only(trimmed: &str) -> bool {
    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .all(|line| line.starts_with("--"))
}
