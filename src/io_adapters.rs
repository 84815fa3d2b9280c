//! Sources of input lines for the read-eval loop.

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Read, Write};

/// Size of the line buffer, terminator included.
pub const LINE_CAPACITY: usize = 2096;

/// Longest line handed out, counting its newline.
pub const MAX_LINE_LEN: usize = LINE_CAPACITY - 1;

/// Something that prints a prompt and hands back one line of input.
pub trait LineReader {
    /// Returns the next line, or `None` at end of input.
    ///
    /// Lines longer than [`MAX_LINE_LEN`] are cut short; the rest of that
    /// line is dropped.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Line reader over any buffered stream.
///
/// The prompt goes to `prompt_out`. One buffer is reused for every line and
/// cleared before each read.
pub struct StreamReader<R, W> {
    input: R,
    prompt_out: W,
    buf: Vec<u8>,
}

impl<R: BufRead, W: Write> StreamReader<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        Self {
            input,
            prompt_out,
            buf: Vec::with_capacity(LINE_CAPACITY),
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.prompt_out)
    }
}

impl<R: BufRead, W: Write> LineReader for StreamReader<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.prompt_out, "{prompt}")?;
        self.prompt_out.flush()?;

        self.buf.clear();
        let limit = MAX_LINE_LEN as u64;
        let n = (&mut self.input).take(limit).read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        if self.buf.last() != Some(&b'\n') && n as u64 == limit {
            skip_line(&mut self.input)?;
        }
        Ok(Some(decode(&self.buf)))
    }
}

/// Consume input up to and including the next newline.
fn skip_line(input: &mut impl BufRead) -> io::Result<()> {
    loop {
        let available = input.fill_buf()?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(i) => {
                input.consume(i + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                input.consume(len);
            }
        }
    }
}

/// Decode a line, dropping a character cut in half by truncation.
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(e) if e.error_len().is_none() => {
            String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned()
        }
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Cut an edited line so that, with its newline, it fits [`MAX_LINE_LEN`].
fn truncate_line(mut line: String) -> String {
    let max = MAX_LINE_LEN - 1;
    if line.len() > max {
        let mut end = max;
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        line.truncate(end);
    }
    line
}

/// Interactive line editor for terminals.
///
/// History lives in memory for the session and is never written to disk.
/// Ctrl-C discards the current line, Ctrl-D ends the input.
pub struct InteractiveReader {
    editor: DefaultEditor,
}

impl InteractiveReader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineReader for InteractiveReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(truncate_line(line)))
            }
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(input: &[u8]) -> StreamReader<Cursor<Vec<u8>>, Vec<u8>> {
        StreamReader::new(Cursor::new(input.to_vec()), Vec::new())
    }

    #[test]
    fn test_reads_lines_with_newline() {
        let mut r = reader(b"echo a\necho b");
        assert_eq!(r.read_line("$ ").unwrap().as_deref(), Some("echo a\n"));
        assert_eq!(r.read_line("$ ").unwrap().as_deref(), Some("echo b"));
        assert_eq!(r.read_line("$ ").unwrap(), None);
        assert_eq!(r.into_inner().1, b"$ $ $ ".to_vec());
    }

    #[test]
    fn test_empty_input_is_end_of_stream() {
        let mut r = reader(b"");
        assert_eq!(r.read_line("> ").unwrap(), None);
    }

    #[test]
    fn test_long_line_is_truncated_and_rest_dropped() {
        let mut input = vec![b'a'; MAX_LINE_LEN + 100];
        input.extend_from_slice(b"\nnext\n");
        let mut r = reader(&input);

        let first = r.read_line("").unwrap().unwrap();
        assert_eq!(first.len(), MAX_LINE_LEN);
        assert!(first.bytes().all(|b| b == b'a'));
        assert_eq!(r.read_line("").unwrap().as_deref(), Some("next\n"));
    }

    #[test]
    fn test_line_filling_buffer_exactly_keeps_next_line() {
        let mut input = vec![b'a'; MAX_LINE_LEN];
        input.extend_from_slice(b"\nnext\n");
        let mut r = reader(&input);

        assert_eq!(r.read_line("").unwrap().unwrap().len(), MAX_LINE_LEN);
        assert_eq!(r.read_line("").unwrap().as_deref(), Some("next\n"));
    }

    #[test]
    fn test_truncation_never_splits_a_character() {
        let mut input = vec![b'a'; MAX_LINE_LEN - 1];
        input.extend_from_slice("é\n".as_bytes());
        let mut r = reader(&input);

        let line = r.read_line("").unwrap().unwrap();
        assert_eq!(line.len(), MAX_LINE_LEN - 1);
        assert!(!line.contains('\u{fffd}'));
    }

    #[test]
    fn test_truncate_line_respects_boundaries() {
        assert_eq!(truncate_line("short".to_string()), "short");
        let long = "é".repeat(MAX_LINE_LEN);
        let cut = truncate_line(long);
        assert!(cut.len() <= MAX_LINE_LEN - 1);
        assert!(cut.chars().all(|c| c == 'é'));
    }
}
