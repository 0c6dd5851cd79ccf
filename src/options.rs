// SPDX-FileCopyrightText: 2026 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0

use crate::colors::ColorSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Reserved.
    /// Accepted for compatibility with earlier configuration records,
    /// but currently without effect:
    /// output is always indented.
    pub indent: bool,
    /// Whether to wrap output in ANSI color escapes.
    /// When `false`, the rendering contains no escape byte at all.
    pub highlight: bool,
    /// Spaces of indentation per nesting level.
    /// `0` is permitted and yields flush-left lines.
    pub indent_amount: usize,
    /// The color attributes used when [`Self::highlight`] is set.
    pub colors: ColorSpec,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            indent: false,
            highlight: true,
            indent_amount: 2,
            colors: ColorSpec::default(),
        }
    }
}
