// SPDX-FileCopyrightText: 2026 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0

use crate::lexer;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A lexical or structural failure reported by the token source.
    #[error("Failed to parse input as JSON: {0}")]
    Parse(#[from] lexer::SyntaxError),

    /// An error from the output sink.
    #[error("Error while writing to the output sink: {0}")]
    Sink(#[from] std::io::Error),

    /// Represents all cases of `std::fmt::Error`.
    #[error(transparent)]
    Format(#[from] std::fmt::Error),

    #[error("The input file {} does not seem to exist", .0.display())]
    InputFileDoesNotExist(PathBuf),

    #[error("Error while reading {}", .0.display())]
    FailedToReadInput(PathBuf),

    #[error("Error while writing {}", .0.display())]
    FailedToWriteOutput(PathBuf),
}

pub type FmtResult<T> = std::result::Result<T, Error>;
