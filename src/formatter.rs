// SPDX-FileCopyrightText: 2026 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0

//! Does the actual formatting/pretty-printing:
//! a single pass over the token stream,
//! emitting one indented, colorized line per value or delimiter.

use crate::colors::{Category, ColorWriter};
use crate::context::ContainerStack;
use crate::error::FmtResult;
use crate::lexer::TokenSource;
use crate::options::Settings;
use crate::token::{Delim, Token};
use std::fmt;
use std::io::{self, Write};

/// Pretty-prints the JSON document(s) in `input` to `sink`.
///
/// # Errors
///
/// Fails on the first lexical or structural error in `input`,
/// or when writing to `sink` fails.
/// An indeterminate prefix of the rendering
/// may already have reached the sink by then;
/// it is not rewound.
pub fn format<W: Write>(sink: &mut W, input: &[u8], settings: &Settings) -> FmtResult<()> {
    tracing::debug!("Formatting {} byte(s) of input", input.len());
    let mut source = TokenSource::new(input);
    let mut formatter = JsonFormatter::new(sink, settings);
    while let Some(token) = source.next_token()? {
        formatter.fmt_token(token)?;
    }
    Ok(())
}

/// Convenience wrapper of [`format`] on the process's standard output.
///
/// # Errors
///
/// See [`format`]; additionally fails if flushing standard output fails.
pub fn format_to_stdout(input: &[u8], settings: &Settings) -> FmtResult<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    format(&mut handle, input, settings)?;
    handle.flush()?;
    Ok(())
}

struct JsonFormatter<'sink, W: Write> {
    sink: &'sink mut W,
    colors: ColorWriter,
    containers: ContainerStack,
    indent_level: usize,
    indent_amount: usize,
    /// True iff the next string token renders as an object key.
    /// Starts out false: a bare top-level scalar is a value;
    /// `{` raises the flag explicitly.
    expecting_key: bool,
    /// The current logical line, colorized but not yet indented.
    /// Buffering the payload keeps the color escapes off
    /// the leading whitespace.
    line: String,
}

impl<'sink, W: Write> JsonFormatter<'sink, W> {
    fn new(sink: &'sink mut W, settings: &Settings) -> Self {
        Self {
            sink,
            colors: ColorWriter::new(&settings.colors, settings.highlight),
            containers: ContainerStack::new(),
            indent_level: 0,
            indent_amount: settings.indent_amount,
            expecting_key: false,
            line: String::new(),
        }
    }

    fn fmt_token(&mut self, token: Token) -> FmtResult<()> {
        match token {
            Token::Delim(delim) => self.fmt_delim(delim),
            Token::String(value) => self.fmt_string(&value),
            Token::Number(value) => self.fmt_scalar(Category::Number, value),
            Token::Bool(value) => self.fmt_scalar(Category::Bool, value),
            Token::Null => self.fmt_scalar(Category::Bool, "null"),
        }
    }

    fn fmt_delim(&mut self, delim: Delim) -> FmtResult<()> {
        self.colors
            .write(Category::Delim, &mut self.line, delim.as_char())?;
        let mut indent_after = false;
        match delim {
            Delim::BraceOpen => {
                self.expecting_key = true;
                self.containers.push(false);
                indent_after = true;
            }
            Delim::BracketOpen => {
                self.expecting_key = false;
                self.containers.push(true);
                indent_after = true;
            }
            Delim::BraceClose | Delim::BracketClose => {
                // The token source has already rejected unbalanced input.
                self.indent_level = self.indent_level.saturating_sub(1);
                self.containers.pop();
                self.expecting_key = !self.containers.peek();
                if !self.containers.is_empty() {
                    self.line.push(',');
                }
            }
        }
        self.flush()?;
        if indent_after {
            self.indent_level += 1;
        }
        Ok(())
    }

    fn fmt_string(&mut self, value: &str) -> FmtResult<()> {
        let mut quoted = String::with_capacity(value.len() + 2);
        write_quoted_str(value, &mut quoted)?;
        if self.expecting_key {
            self.colors.write(Category::Key, &mut self.line, &quoted)?;
            // The value completes this line; no flush yet.
            self.line.push_str(": ");
            self.expecting_key = false;
            Ok(())
        } else {
            self.fmt_scalar(Category::String, &quoted)
        }
    }

    fn fmt_scalar<D: fmt::Display>(&mut self, category: Category, value: D) -> FmtResult<()> {
        self.colors.write(category, &mut self.line, value)?;
        self.line.push(',');
        self.expecting_key = !self.containers.peek();
        self.flush()
    }

    /// Writes a newline, the current indentation
    /// and the buffered line to the sink, then clears the buffer.
    fn flush(&mut self) -> FmtResult<()> {
        self.sink.write_all(b"\n")?;
        for _ in 0..self.indent_level * self.indent_amount {
            self.sink.write_all(b" ")?;
        }
        self.sink.write_all(self.line.as_bytes())?;
        self.line.clear();
        Ok(())
    }
}

/// Writes `string` as a quoted, JSON-escaped string literal:
/// the canonical form every string token is re-encoded through.
#[inline]
pub fn write_quoted_str(string: &str, f: &mut impl fmt::Write) -> fmt::Result {
    f.write_char('"')?;
    for c in string.chars() {
        match c {
            '\u{08}' => f.write_str("\\b"),
            '\t' => f.write_str("\\t"),
            '\n' => f.write_str("\\n"),
            '\u{0C}' => f.write_str("\\f"),
            '\r' => f.write_str("\\r"),
            '"' => f.write_str("\\\""),
            '\\' => f.write_str("\\\\"),
            '\0'..='\u{1F}' | '\u{7F}' => write!(f, "\\u{:04X}", u32::from(c)),
            _ => f.write_char(c),
        }?;
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted(input: &str) -> String {
        let mut out = String::new();
        write_quoted_str(input, &mut out).unwrap();
        out
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(quoted("hello"), "\"hello\"");
        assert_eq!(quoted("héllo \u{1234}"), "\"héllo \u{1234}\"");
    }

    #[test]
    fn named_escapes() {
        assert_eq!(quoted("a\nb\tc"), "\"a\\nb\\tc\"");
        assert_eq!(quoted("q\"b\\s"), "\"q\\\"b\\\\s\"");
        assert_eq!(quoted("\u{08}\u{0C}\r"), "\"\\b\\f\\r\"");
    }

    #[test]
    fn remaining_control_characters_use_unicode_escapes() {
        assert_eq!(quoted("\u{01}"), "\"\\u0001\"");
        assert_eq!(quoted("\u{1F}"), "\"\\u001F\"");
        assert_eq!(quoted("\u{7F}"), "\"\\u007F\"");
    }
}
