//! Splitting a command line into argument tokens.
//!
//! Tokens are separated by whitespace. A pair of double quotes groups
//! whitespace into a single token; the quote characters themselves are not
//! part of the token text. There is no other quoting, escaping or expansion
//! at this level.

use std::borrow::Cow;

/// Maximum number of tokens accepted on one line.
pub const MAX_ARGS: usize = 255;

/// One argument of a command line, borrowed from the line it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    raw: &'a str,
}

impl<'a> Token<'a> {
    /// The token exactly as it appears in the line, quotes included.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// The token with quote delimiters removed.
    ///
    /// Borrows the line unless a quote had to be removed.
    pub fn text(&self) -> Cow<'a, str> {
        if !self.raw.contains('"') {
            return Cow::Borrowed(self.raw);
        }

        let mut out = String::with_capacity(self.raw.len());
        let mut escaped = false;
        let mut chars = self.raw.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' if !escaped && chars.peek() == Some(&'"') => {
                    out.push('"');
                    chars.next();
                    continue;
                }
                '"' => {}
                c => out.push(c),
            }
            // A backslash escaped by another one cannot escape a quote.
            escaped = ch == '\\' && !escaped;
        }
        Cow::Owned(out)
    }
}

/// Errors that can occur while splitting a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexingError {
    /// The line holds more than [`MAX_ARGS`] tokens.
    TooManyArguments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingQuoted,
}

struct LexingFSM<'a> {
    line: &'a str,
    state: LexingState,
    token_start: usize,
    escaped: bool,
    out: Vec<Token<'a>>,
}

impl<'a> LexingFSM<'a> {
    fn new(line: &'a str) -> Self {
        // A line never extends past its newline.
        let line = match line.find('\n') {
            Some(end) => &line[..end],
            None => line,
        };
        LexingFSM {
            line,
            state: LexingState::Start,
            token_start: 0,
            escaped: false,
            out: Vec::new(),
        }
    }

    fn make_tokens(mut self) -> Result<Vec<Token<'a>>, LexingError> {
        for (pos, ch) in self.line.char_indices() {
            match self.state {
                LexingState::Start => self.handle_start(pos, ch),
                LexingState::ReadingWord => self.handle_word(pos, ch)?,
                LexingState::ReadingQuoted => self.handle_quoted(ch),
            }
        }

        // An unterminated quote runs to the end of the line.
        if self.state != LexingState::Start {
            self.push_token(self.line.len())?;
        }
        Ok(self.out)
    }

    fn handle_start(&mut self, pos: usize, ch: char) {
        if is_blank(ch) {
            return;
        }
        self.token_start = pos;
        self.state = match ch {
            '"' => LexingState::ReadingQuoted,
            _ => LexingState::ReadingWord,
        };
        self.escaped = ch == '\\';
    }

    fn handle_word(&mut self, pos: usize, ch: char) -> Result<(), LexingError> {
        match ch {
            c if is_blank(c) => {
                self.push_token(pos)?;
                self.state = LexingState::Start;
            }
            '"' if !self.escaped => self.state = LexingState::ReadingQuoted,
            _ => {}
        }
        self.escaped = ch == '\\' && !self.escaped;
        Ok(())
    }

    fn handle_quoted(&mut self, ch: char) {
        if ch == '"' && !self.escaped {
            self.state = LexingState::ReadingWord;
        }
        self.escaped = ch == '\\' && !self.escaped;
    }

    fn push_token(&mut self, end: usize) -> Result<(), LexingError> {
        if self.out.len() == MAX_ARGS {
            return Err(LexingError::TooManyArguments);
        }
        self.out.push(Token {
            raw: &self.line[self.token_start..end],
        });
        Ok(())
    }
}

/// Whitespace as classified by the C locale's `isspace`.
fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

/// Split `line` into tokens.
///
/// An empty result means there is nothing to run.
pub fn split_into_tokens(line: &str) -> Result<Vec<Token<'_>>, LexingError> {
    LexingFSM::new(line).make_tokens()
}
