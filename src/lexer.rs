// SPDX-FileCopyrightText: 2026 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0

//! The streaming token source: a validating JSON lexer.
//!
//! [`TokenSource`] is pulled one [`Token`] at a time and owns *all*
//! lexical and structural validation of the input.
//! The separators `:` and `,` are checked and consumed internally,
//! so consumers only ever see the five public token kinds.

use crate::token::{Delim, Token};
use memchr::memchr;
use regex::Regex;
use std::str;
use std::sync::LazyLock;
use thiserror::Error;

/// The regex to match a number from the JSON grammar (RFC 8259, section 6).
static RE_JSON_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^-?(0|[1-9][0-9]*)([.][0-9]+)?([eE][+-]?[0-9]+)?$").unwrap());

/// Maximum container nesting depth.
/// Bounds the grammar state stack on adversarial input.
const MAX_DEPTH: usize = 1024;

/// A lexical or structural error,
/// located at the 1-based line and column where it was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

fn err_at(message: impl Into<String>, line: usize, column: usize) -> SyntaxError {
    SyntaxError {
        message: message.into(),
        line,
        column,
    }
}

/// A raw lexical unit, including the separators
/// that [`TokenSource`] consumes internally.
#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Delim(Delim),
    Colon,
    Comma,
    String(String),
    Number(f64),
    Bool(bool),
    Null,
}

/// A [`Lexeme`] plus the position of its first character.
#[derive(Debug)]
struct Lexed {
    lexeme: Lexeme,
    line: usize,
    column: usize,
}

/// The raw lexer: byte cursor, line/column tracking, no grammar knowledge.
struct Scanner<'input> {
    bytes: &'input [u8],
    cursor: usize,
    line: usize,
    column: usize,
}

impl<'input> Scanner<'input> {
    const fn new(input: &'input [u8]) -> Self {
        Self {
            bytes: input,
            cursor: 0,
            line: 1,
            column: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        err_at(message, self.line, self.column)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&byte) = self.bytes.get(self.cursor) {
            match byte {
                b' ' | b'\t' | b'\r' => self.column += 1,
                b'\n' => {
                    self.line += 1;
                    self.column = 1;
                }
                _ => break,
            }
            self.cursor += 1;
        }
    }

    fn advance_byte(&mut self) {
        if self.bytes.get(self.cursor) == Some(&b'\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.cursor += 1;
    }

    fn next_lexeme(&mut self) -> Result<Option<Lexed>, SyntaxError> {
        self.skip_whitespace();
        let Some(&byte) = self.bytes.get(self.cursor) else {
            return Ok(None);
        };
        let (line, column) = (self.line, self.column);
        let lexeme = match byte {
            b'{' => {
                self.advance_byte();
                Lexeme::Delim(Delim::BraceOpen)
            }
            b'}' => {
                self.advance_byte();
                Lexeme::Delim(Delim::BraceClose)
            }
            b'[' => {
                self.advance_byte();
                Lexeme::Delim(Delim::BracketOpen)
            }
            b']' => {
                self.advance_byte();
                Lexeme::Delim(Delim::BracketClose)
            }
            b':' => {
                self.advance_byte();
                Lexeme::Colon
            }
            b',' => {
                self.advance_byte();
                Lexeme::Comma
            }
            b'"' => self.lex_string()?,
            b't' => self.lex_literal("true", Lexeme::Bool(true))?,
            b'f' => self.lex_literal("false", Lexeme::Bool(false))?,
            b'n' => self.lex_literal("null", Lexeme::Null)?,
            b'-' | b'0'..=b'9' => self.lex_number()?,
            other => {
                return Err(self.error(format!("Unexpected character '{}'", char::from(other))));
            }
        };
        Ok(Some(Lexed {
            lexeme,
            line,
            column,
        }))
    }

    fn lex_literal(
        &mut self,
        expected: &'static str,
        lexeme: Lexeme,
    ) -> Result<Lexeme, SyntaxError> {
        let end = self.cursor + expected.len();
        if self.bytes.get(self.cursor..end) == Some(expected.as_bytes()) {
            for _ in 0..expected.len() {
                self.advance_byte();
            }
            Ok(lexeme)
        } else {
            Err(self.error(format!("Expected '{expected}'")))
        }
    }

    fn lex_number(&mut self) -> Result<Lexeme, SyntaxError> {
        let start = self.cursor;
        while let Some(&byte) = self.bytes.get(self.cursor) {
            match byte {
                b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E' => self.advance_byte(),
                _ => break,
            }
        }
        // The consumed bytes are all ASCII, so this cannot fail.
        let lexeme = str::from_utf8(self.bytes.get(start..self.cursor).unwrap_or(&[]))
            .map_err(|_| self.error("Invalid number"))?;
        if !RE_JSON_NUMBER.is_match(lexeme) {
            return Err(self.error(format!("Invalid number '{lexeme}'")));
        }
        lexeme
            .parse::<f64>()
            .map(Lexeme::Number)
            .map_err(|_| self.error(format!("Invalid number '{lexeme}'")))
    }

    fn lex_string(&mut self) -> Result<Lexeme, SyntaxError> {
        self.advance_byte(); // opening '"'
        let start = self.cursor;

        // Scan for the closing quote; a quote preceded by an odd number
        // of backslashes is escaped and the search continues behind it.
        let mut search_from = start;
        let close = loop {
            let Some(found) = memchr(b'"', self.bytes.get(search_from..).unwrap_or(&[])) else {
                return Err(self.error("Unterminated string"));
            };
            let pos = search_from + found;
            let mut backslashes = 0;
            while pos > start + backslashes && self.bytes.get(pos - 1 - backslashes) == Some(&b'\\')
            {
                backslashes += 1;
            }
            if backslashes % 2 == 0 {
                break pos;
            }
            search_from = pos + 1;
        };

        let content = self.bytes.get(start..close).unwrap_or(&[]);
        let text =
            str::from_utf8(content).map_err(|_| self.error("Invalid UTF-8 in string"))?;
        let value = if memchr(b'\\', content).is_some() {
            self.decode_escapes(text)?
        } else {
            if text.chars().any(|c| u32::from(c) < 0x20) {
                return Err(self.error("Unescaped control character in string"));
            }
            text.to_owned()
        };

        // A valid string body contains no raw newline, so only the column moves.
        self.column += text.chars().count() + 1;
        self.cursor = close + 1;
        Ok(Lexeme::String(value))
    }

    fn decode_escapes(&self, text: &str) -> Result<String, SyntaxError> {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if u32::from(c) < 0x20 {
                return Err(self.error("Unescaped control character in string"));
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some('/') => out.push('/'),
                Some('b') => out.push('\u{0008}'),
                Some('f') => out.push('\u{000C}'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('u') => out.push(self.decode_uchar(&mut chars)?),
                Some(other) => {
                    return Err(
                        self.error(format!("The escaped character '\\{other}' is not valid"))
                    );
                }
                None => return Err(self.error("Incomplete escape sequence")),
            }
        }
        Ok(out)
    }

    /// Decodes the four hex digits after `\u`,
    /// combining UTF-16 surrogate pairs into a single scalar value.
    fn decode_uchar(&self, chars: &mut str::Chars<'_>) -> Result<char, SyntaxError> {
        let high = self.hex4(chars)?;
        if (0xD800..=0xDBFF).contains(&high) {
            if chars.next() != Some('\\') || chars.next() != Some('u') {
                return Err(self.error("Unpaired surrogate in Unicode escape"));
            }
            let low = self.hex4(chars)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.error("Unpaired surrogate in Unicode escape"));
            }
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(code)
                .ok_or_else(|| self.error("Invalid Unicode code point"));
        }
        char::from_u32(high).ok_or_else(|| self.error("Unpaired surrogate in Unicode escape"))
    }

    fn hex4(&self, chars: &mut str::Chars<'_>) -> Result<u32, SyntaxError> {
        let mut code = 0;
        for _ in 0..4 {
            let digit = chars
                .next()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("Incomplete Unicode escape"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }
}

/// What the grammar allows next, per open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Top level: before (or between) complete documents.
    ExpectValue,
    /// After `[`: a value or `]` (empty array).
    ExpectArrayFirstValueOrEnd,
    /// After `,` in an array: a value; `]` is not allowed.
    ExpectArrayValue,
    /// After a value in an array: `,` or `]`.
    ExpectArrayCommaOrEnd,
    /// After `{`: a key or `}` (empty object).
    ExpectObjectFirstKeyOrEnd,
    /// After `,` in an object: a key; `}` is not allowed.
    ExpectObjectKey,
    /// After a key: `:`.
    ExpectObjectColon,
    /// After `:`: a value.
    ExpectObjectValue,
    /// After a value in an object: `,` or `}`.
    ExpectObjectCommaOrEnd,
}

/// The streaming token source.
///
/// Yields the five public token kinds one at a time,
/// enforcing the full JSON grammar as it goes.
/// After a complete top-level value,
/// a further whitespace-separated document may follow;
/// [`Self::next_token`] returns `Ok(None)` only on clean end-of-stream.
pub struct TokenSource<'input> {
    scanner: Scanner<'input>,
    states: Vec<State>,
}

impl<'input> TokenSource<'input> {
    #[must_use]
    pub fn new(input: &'input [u8]) -> Self {
        Self {
            scanner: Scanner::new(input),
            states: vec![State::ExpectValue],
        }
    }

    /// Pulls the next token.
    ///
    /// # Errors
    ///
    /// Fails on the first lexical or structural error in the input.
    pub fn next_token(&mut self) -> Result<Option<Token>, SyntaxError> {
        loop {
            let state = self.states.last().copied().unwrap_or(State::ExpectValue);
            let Some(lexed) = self.scanner.next_lexeme()? else {
                return self.end_of_input(state);
            };
            let (line, column) = (lexed.line, lexed.column);

            match state {
                State::ExpectValue
                | State::ExpectArrayFirstValueOrEnd
                | State::ExpectArrayValue
                | State::ExpectObjectValue => match lexed.lexeme {
                    Lexeme::Delim(delim @ Delim::BraceOpen) => {
                        self.complete_value();
                        self.enter(State::ExpectObjectFirstKeyOrEnd, line, column)?;
                        return Ok(Some(Token::Delim(delim)));
                    }
                    Lexeme::Delim(delim @ Delim::BracketOpen) => {
                        self.complete_value();
                        self.enter(State::ExpectArrayFirstValueOrEnd, line, column)?;
                        return Ok(Some(Token::Delim(delim)));
                    }
                    Lexeme::Delim(delim @ Delim::BracketClose)
                        if state == State::ExpectArrayFirstValueOrEnd =>
                    {
                        self.states.pop();
                        return Ok(Some(Token::Delim(delim)));
                    }
                    Lexeme::String(value) => {
                        self.complete_value();
                        return Ok(Some(Token::String(value)));
                    }
                    Lexeme::Number(value) => {
                        self.complete_value();
                        return Ok(Some(Token::Number(value)));
                    }
                    Lexeme::Bool(value) => {
                        self.complete_value();
                        return Ok(Some(Token::Bool(value)));
                    }
                    Lexeme::Null => {
                        self.complete_value();
                        return Ok(Some(Token::Null));
                    }
                    Lexeme::Delim(delim) => {
                        return Err(err_at(
                            format!("Unexpected '{}'", delim.as_char()),
                            line,
                            column,
                        ));
                    }
                    Lexeme::Colon => return Err(err_at("Unexpected ':'", line, column)),
                    Lexeme::Comma => return Err(err_at("Unexpected ','", line, column)),
                },
                State::ExpectObjectFirstKeyOrEnd => match lexed.lexeme {
                    Lexeme::String(key) => {
                        self.set_top(State::ExpectObjectColon);
                        return Ok(Some(Token::String(key)));
                    }
                    Lexeme::Delim(delim @ Delim::BraceClose) => {
                        self.states.pop();
                        return Ok(Some(Token::Delim(delim)));
                    }
                    Lexeme::Delim(_)
                    | Lexeme::Colon
                    | Lexeme::Comma
                    | Lexeme::Number(_)
                    | Lexeme::Bool(_)
                    | Lexeme::Null => {
                        return Err(err_at("Expected an object key or '}'", line, column));
                    }
                },
                State::ExpectObjectKey => match lexed.lexeme {
                    Lexeme::String(key) => {
                        self.set_top(State::ExpectObjectColon);
                        return Ok(Some(Token::String(key)));
                    }
                    Lexeme::Delim(_)
                    | Lexeme::Colon
                    | Lexeme::Comma
                    | Lexeme::Number(_)
                    | Lexeme::Bool(_)
                    | Lexeme::Null => {
                        return Err(err_at("Expected an object key", line, column));
                    }
                },
                State::ExpectObjectColon => match lexed.lexeme {
                    Lexeme::Colon => self.set_top(State::ExpectObjectValue),
                    Lexeme::Delim(_)
                    | Lexeme::Comma
                    | Lexeme::String(_)
                    | Lexeme::Number(_)
                    | Lexeme::Bool(_)
                    | Lexeme::Null => {
                        return Err(err_at("Expected ':' after an object key", line, column));
                    }
                },
                State::ExpectObjectCommaOrEnd => match lexed.lexeme {
                    Lexeme::Comma => self.set_top(State::ExpectObjectKey),
                    Lexeme::Delim(delim @ Delim::BraceClose) => {
                        self.states.pop();
                        return Ok(Some(Token::Delim(delim)));
                    }
                    Lexeme::Delim(_)
                    | Lexeme::Colon
                    | Lexeme::String(_)
                    | Lexeme::Number(_)
                    | Lexeme::Bool(_)
                    | Lexeme::Null => {
                        return Err(err_at("Expected ',' or '}'", line, column));
                    }
                },
                State::ExpectArrayCommaOrEnd => match lexed.lexeme {
                    Lexeme::Comma => self.set_top(State::ExpectArrayValue),
                    Lexeme::Delim(delim @ Delim::BracketClose) => {
                        self.states.pop();
                        return Ok(Some(Token::Delim(delim)));
                    }
                    Lexeme::Delim(_)
                    | Lexeme::Colon
                    | Lexeme::String(_)
                    | Lexeme::Number(_)
                    | Lexeme::Bool(_)
                    | Lexeme::Null => {
                        return Err(err_at("Expected ',' or ']'", line, column));
                    }
                },
            }
        }
    }

    fn end_of_input(&self, state: State) -> Result<Option<Token>, SyntaxError> {
        if self.states.len() == 1 && state == State::ExpectValue {
            return Ok(None);
        }
        let message = match state {
            State::ExpectObjectFirstKeyOrEnd
            | State::ExpectObjectKey
            | State::ExpectObjectColon
            | State::ExpectObjectValue
            | State::ExpectObjectCommaOrEnd => "Unclosed object",
            State::ExpectArrayFirstValueOrEnd
            | State::ExpectArrayValue
            | State::ExpectArrayCommaOrEnd => "Unclosed array",
            State::ExpectValue => "Unexpected end of input",
        };
        Err(self.scanner.error(message))
    }

    /// A value just finished in the current state;
    /// advance to what the grammar allows after it.
    fn complete_value(&mut self) {
        if let Some(top) = self.states.last_mut() {
            *top = match *top {
                State::ExpectArrayFirstValueOrEnd | State::ExpectArrayValue => {
                    State::ExpectArrayCommaOrEnd
                }
                State::ExpectObjectValue => State::ExpectObjectCommaOrEnd,
                // At the top level a further concatenated document may follow.
                State::ExpectValue => State::ExpectValue,
                State::ExpectArrayCommaOrEnd
                | State::ExpectObjectFirstKeyOrEnd
                | State::ExpectObjectKey
                | State::ExpectObjectColon
                | State::ExpectObjectCommaOrEnd => *top,
            };
        }
    }

    fn set_top(&mut self, state: State) {
        if let Some(top) = self.states.last_mut() {
            *top = state;
        }
    }

    fn enter(&mut self, state: State, line: usize, column: usize) -> Result<(), SyntaxError> {
        if self.states.len() > MAX_DEPTH {
            return Err(err_at("Maximum nesting depth exceeded", line, column));
        }
        self.states.push(state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_tokens(input: &str) -> Result<Vec<Token>, SyntaxError> {
        let mut source = TokenSource::new(input.as_bytes());
        let mut tokens = Vec::new();
        while let Some(token) = source.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    #[test]
    fn separators_are_consumed() {
        let tokens = collect_tokens("{\"key\": 123}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Delim(Delim::BraceOpen),
                Token::String("key".to_string()),
                Token::Number(123.0),
                Token::Delim(Delim::BraceClose),
            ]
        );
    }

    #[test]
    fn literals() {
        let tokens = collect_tokens("[true, false, null]").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Delim(Delim::BracketOpen),
                Token::Bool(true),
                Token::Bool(false),
                Token::Null,
                Token::Delim(Delim::BracketClose),
            ]
        );
    }

    #[test]
    fn numbers() {
        let tokens = collect_tokens("[123, -0.5, 1e10]").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Delim(Delim::BracketOpen),
                Token::Number(123.0),
                Token::Number(-0.5),
                Token::Number(10_000_000_000.0),
                Token::Delim(Delim::BracketClose),
            ]
        );
    }

    #[test]
    fn string_escapes() {
        let tokens = collect_tokens(r#"["a\nb", "\u1234", "\"", "\\"]"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Delim(Delim::BracketOpen),
                Token::String("a\nb".to_string()),
                Token::String("\u{1234}".to_string()),
                Token::String("\"".to_string()),
                Token::String("\\".to_string()),
                Token::Delim(Delim::BracketClose),
            ]
        );
    }

    #[test]
    fn surrogate_pair_combines() {
        let tokens = collect_tokens(r#""\ud834\udd1e""#).unwrap();
        assert_eq!(tokens, vec![Token::String("\u{1D11E}".to_string())]);
    }

    #[test]
    fn lone_surrogate_is_rejected() {
        let err = collect_tokens(r#""\ud834""#).unwrap_err();
        assert!(err.message.contains("surrogate"));
    }

    #[test]
    fn unterminated_string() {
        let err = collect_tokens("\"hello").unwrap_err();
        assert_eq!(err.message, "Unterminated string");
    }

    #[test]
    fn raw_control_character_is_rejected() {
        let err = collect_tokens("\"a\tb\"").unwrap_err();
        assert_eq!(err.message, "Unescaped control character in string");
    }

    #[test]
    fn leading_zeros_are_rejected() {
        let err = collect_tokens("01").unwrap_err();
        assert!(err.message.starts_with("Invalid number"));
    }

    #[test]
    fn trailing_decimal_point_is_rejected() {
        let err = collect_tokens("1.").unwrap_err();
        assert!(err.message.starts_with("Invalid number"));
    }

    #[test]
    fn bare_decimal_point_is_rejected() {
        let err = collect_tokens(".5").unwrap_err();
        assert_eq!(err.message, "Unexpected character '.'");
    }

    #[test]
    fn truncated_literal() {
        let err = collect_tokens("tru").unwrap_err();
        assert_eq!(err.message, "Expected 'true'");
    }

    #[test]
    fn missing_colon() {
        let err = collect_tokens("{\"a\" 1}").unwrap_err();
        assert_eq!(err.message, "Expected ':' after an object key");
    }

    #[test]
    fn missing_comma_in_array() {
        let err = collect_tokens("[1 2]").unwrap_err();
        assert_eq!(err.message, "Expected ',' or ']'");
    }

    #[test]
    fn trailing_comma_in_object_is_rejected() {
        let err = collect_tokens("{\"a\":1,}").unwrap_err();
        assert_eq!(err.message, "Expected an object key");
    }

    #[test]
    fn mismatched_close() {
        let err = collect_tokens("[}").unwrap_err();
        assert_eq!(err.message, "Unexpected '}'");
    }

    #[test]
    fn unclosed_object() {
        let err = collect_tokens("{\"a\":1").unwrap_err();
        assert_eq!(err.message, "Unclosed object");
    }

    #[test]
    fn unclosed_array() {
        let err = collect_tokens("[1,").unwrap_err();
        assert_eq!(err.message, "Unclosed array");
    }

    #[test]
    fn trailing_garbage() {
        let err = collect_tokens("{}]").unwrap_err();
        assert_eq!(err.message, "Unexpected ']'");
    }

    #[test]
    fn empty_input_is_clean_end_of_stream() {
        assert_eq!(collect_tokens("").unwrap(), vec![]);
        assert_eq!(collect_tokens("  \n ").unwrap(), vec![]);
    }

    #[test]
    fn concatenated_documents() {
        let tokens = collect_tokens("1 2").unwrap();
        assert_eq!(tokens, vec![Token::Number(1.0), Token::Number(2.0)]);
    }

    #[test]
    fn error_positions_are_tracked() {
        let err = collect_tokens("{\n  \"a\" 1\n}").unwrap_err();
        assert_eq!((err.line, err.column), (2, 7));
    }

    #[test]
    fn nesting_depth_is_capped() {
        let deep = "[".repeat(2000);
        let err = collect_tokens(&deep).unwrap_err();
        assert_eq!(err.message, "Maximum nesting depth exceeded");
    }
}
