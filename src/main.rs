// SPDX-FileCopyrightText: 2026 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0

use cli::InitError;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod cli;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to initialize the CLI tool: {0}")]
    Init(#[from] InitError),

    #[error("Failed to run the formatter: {0}")]
    Format(#[from] prjson::error::Error),
}

fn read_input(src: Option<&Path>) -> Result<Vec<u8>, prjson::error::Error> {
    use prjson::error::Error;

    match src {
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buffer)
                .map_err(|_| Error::FailedToReadInput(PathBuf::from("-")))?;
            Ok(buffer)
        }
        Some(path) => {
            if !path.is_file() {
                return Err(Error::InputFileDoesNotExist(path.to_path_buf()));
            }
            fs::read(path).map_err(|_| Error::FailedToReadInput(path.to_path_buf()))
        }
    }
}

fn main() -> Result<(), CliError> {
    let (settings, src, output) = cli::init()?;

    let input = read_input(src.as_deref())?;
    tracing::debug!(
        "Read {} input byte(s); highlight={}, indent_amount={}",
        input.len(),
        settings.highlight,
        settings.indent_amount
    );

    match output {
        None => prjson::formatter::format_to_stdout(&input, &settings)?,
        Some(path) => {
            let mut file = fs::File::create(&path)
                .map_err(|_| prjson::error::Error::FailedToWriteOutput(path.clone()))?;
            prjson::formatter::format(&mut file, &input, &settings)?;
        }
    }
    Ok(())
}
