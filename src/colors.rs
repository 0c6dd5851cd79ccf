// SPDX-FileCopyrightText: 2026 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0

//! Styling: map token categories to ANSI SGR escape sequences (or nothing).

use std::fmt::{self, Write};

/// SGR sequence that returns the terminal to its default attributes.
const RESET: &str = "\x1b[0m";

/// One of the eight classic terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// SGR code when used as a foreground color (30-37).
    #[must_use]
    pub const fn fg_code(self) -> u8 {
        30 + self.offset()
    }

    /// SGR code when used as a background color (40-47).
    #[must_use]
    pub const fn bg_code(self) -> u8 {
        40 + self.offset()
    }

    const fn offset(self) -> u8 {
        match self {
            Self::Black => 0,
            Self::Red => 1,
            Self::Green => 2,
            Self::Yellow => 3,
            Self::Blue => 4,
            Self::Magenta => 5,
            Self::Cyan => 6,
            Self::White => 7,
        }
    }
}

/// Semantic category of a piece of output.
/// Each category maps to one foreground/background pair in [`ColorSpec`].
///
/// `null` shares the [`Category::Bool`] styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `{`, `}`, `[` and `]`
    Delim,
    /// Object keys
    Key,
    /// `true`, `false` and `null`
    Bool,
    /// String values
    String,
    /// Numbers
    Number,
}

/// The ten color attributes of the output:
/// one foreground/background pair per token category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSpec {
    pub delim_fg: Color,
    pub delim_bg: Color,
    pub key_fg: Color,
    pub key_bg: Color,
    pub bool_fg: Color,
    pub bool_bg: Color,
    pub string_fg: Color,
    pub string_bg: Color,
    pub number_fg: Color,
    pub number_bg: Color,
}

impl Default for ColorSpec {
    fn default() -> Self {
        Self {
            delim_fg: Color::White,
            delim_bg: Color::Black,
            key_fg: Color::Blue,
            key_bg: Color::Black,
            bool_fg: Color::Cyan,
            bool_bg: Color::Black,
            string_fg: Color::Magenta,
            string_bg: Color::Black,
            number_fg: Color::Red,
            number_bg: Color::Black,
        }
    }
}

/// Writes payload text into a line buffer,
/// bracketed by the SGR prefix of its category and a reset,
/// or untouched when highlighting is disabled.
///
/// The prefix strings are built once at construction;
/// there is no further state.
#[derive(Debug)]
pub struct ColorWriter {
    delim: String,
    key: String,
    boolean: String,
    string: String,
    number: String,
    highlight: bool,
}

impl ColorWriter {
    #[must_use]
    pub fn new(colors: &ColorSpec, highlight: bool) -> Self {
        Self {
            delim: sgr_prefix(colors.delim_bg, colors.delim_fg),
            key: sgr_prefix(colors.key_bg, colors.key_fg),
            boolean: sgr_prefix(colors.bool_bg, colors.bool_fg),
            string: sgr_prefix(colors.string_bg, colors.string_fg),
            number: sgr_prefix(colors.number_bg, colors.number_fg),
            highlight,
        }
    }

    fn prefix(&self, category: Category) -> &str {
        match category {
            Category::Delim => self.delim.as_str(),
            Category::Key => self.key.as_str(),
            Category::Bool => self.boolean.as_str(),
            Category::String => self.string.as_str(),
            Category::Number => self.number.as_str(),
        }
    }

    /// Appends `value` to `line`, colorized according to `category`.
    ///
    /// # Errors
    ///
    /// Fails only if formatting `value` into the in-memory buffer fails.
    pub fn write<D: fmt::Display>(
        &self,
        category: Category,
        line: &mut String,
        value: D,
    ) -> fmt::Result {
        if self.highlight {
            write!(line, "{}{value}{RESET}", self.prefix(category))
        } else {
            write!(line, "{value}")
        }
    }
}

/// `ESC[<bg>;<fg>m`, background first,
/// matching the attribute order of `color.New(bg, fg)` setups.
fn sgr_prefix(bg: Color, fg: Color) -> String {
    format!("\x1b[{};{}m", bg.bg_code(), fg.fg_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_off_no_ansi() {
        let writer = ColorWriter::new(&ColorSpec::default(), false);
        let mut line = String::new();
        writer.write(Category::Key, &mut line, "\"a\"").unwrap();
        assert_eq!(line, "\"a\"");
        assert!(!line.contains('\x1b'));
    }

    #[test]
    fn highlight_on_brackets_payload() {
        let writer = ColorWriter::new(&ColorSpec::default(), true);
        let mut line = String::new();
        writer.write(Category::Key, &mut line, "\"a\"").unwrap();
        // Key defaults to blue (34) on black (40).
        assert_eq!(line, "\x1b[40;34m\"a\"\x1b[0m");
    }

    #[test]
    fn categories_use_their_own_prefix() {
        let writer = ColorWriter::new(&ColorSpec::default(), true);
        let mut line = String::new();
        writer.write(Category::Number, &mut line, 42).unwrap();
        assert_eq!(line, "\x1b[40;31m42\x1b[0m");
        line.clear();
        writer.write(Category::Bool, &mut line, true).unwrap();
        assert_eq!(line, "\x1b[40;36mtrue\x1b[0m");
    }

    #[test]
    fn sgr_codes() {
        assert_eq!(Color::Black.fg_code(), 30);
        assert_eq!(Color::White.fg_code(), 37);
        assert_eq!(Color::Black.bg_code(), 40);
        assert_eq!(Color::Magenta.bg_code(), 45);
    }
}
