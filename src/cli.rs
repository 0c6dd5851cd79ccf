// SPDX-FileCopyrightText: 2026 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0

use std::{path::PathBuf, sync::LazyLock};

use clap::{command, crate_name, value_parser, Arg, ArgAction, Command, ValueHint};
use cli_utils::logging;
use const_format::formatcp;
use prjson::options::Settings;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

pub const A_L_INDENTATION: &str = "indentation";
pub const A_S_INDENTATION: char = 'i';
pub const A_L_NO_HIGHLIGHT: &str = "no-highlight";
pub const A_L_OUTPUT: &str = "output";
pub const A_S_OUTPUT: char = 'O';
pub const A_L_QUIET: &str = "quiet";
pub const A_S_QUIET: char = 'q';
pub const A_L_VERBOSE: &str = "verbose";
pub const A_S_VERBOSE: char = 'v';
pub const A_L_VERSION: &str = "version";
pub const A_S_VERSION: char = 'V';
pub const A_L_SRC: &str = "src";

pub const DEFAULT_INDENTATION: u8 = 2;
static DEFAULT_INDENTATION_STR: LazyLock<String> =
    LazyLock::new(|| DEFAULT_INDENTATION.to_string());

fn arg_indentation() -> Arg {
    Arg::new(A_L_INDENTATION)
        .help("Number of spaces per level of indentation; 0 yields flush-left lines")
        .num_args(1)
        .short(A_S_INDENTATION)
        .long(A_L_INDENTATION)
        .action(ArgAction::Set)
        .value_name("NUM")
        .value_parser(value_parser!(u8))
        .default_value(DEFAULT_INDENTATION_STR.as_str())
}

fn arg_no_highlight() -> Arg {
    Arg::new(A_L_NO_HIGHLIGHT)
        .help("Do not wrap the output in ANSI color escapes")
        .long_help(
            "Do not wrap the output in ANSI color escapes. \
Use this when the output goes to a file or a pipe \
rather than a terminal.",
        )
        .action(ArgAction::SetTrue)
        .long(A_L_NO_HIGHLIGHT)
}

fn arg_output() -> Arg {
    Arg::new(A_L_OUTPUT)
        .help("The file to write the rendering to; '-' for stdout")
        .num_args(1)
        .short(A_S_OUTPUT)
        .long(A_L_OUTPUT)
        .action(ArgAction::Set)
        .value_hint(ValueHint::FilePath)
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .default_value("-")
}

fn arg_quiet() -> Arg {
    Arg::new(A_L_QUIET)
        .help("Minimize or suppress output to stdout")
        .long_help("Minimize or suppress output to stdout, and only shows log output on stderr.")
        .action(ArgAction::SetTrue)
        .short(A_S_QUIET)
        .long(A_L_QUIET)
        .conflicts_with(A_L_VERBOSE)
}

fn arg_verbose() -> Arg {
    Arg::new(A_L_VERBOSE)
        .help("more verbose output (useful for debugging)")
        .short(A_S_VERBOSE)
        .long(A_L_VERBOSE)
        .action(ArgAction::SetTrue)
}

fn arg_version() -> Arg {
    Arg::new(A_L_VERSION)
        .help(formatcp!(
            "Print version information and exit. \
May be combined with -{A_S_QUIET},--{A_L_QUIET}, \
to really only output the version string."
        ))
        .short(A_S_VERSION)
        .long(A_L_VERSION)
        .action(ArgAction::SetTrue)
}

fn arg_src() -> Arg {
    Arg::new(A_L_SRC)
        .help("The JSON file to pretty print; '-' for stdin")
        .num_args(1)
        .value_name("FILE")
        .value_hint(ValueHint::FilePath)
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Set)
        .default_value("-")
}

fn args_matcher() -> Command {
    command!()
        .about("Pretty prints JSON")
        .long_about(
            "Takes a JSON document as input \
(commonly a compact blob from a log line or an HTTP response), \
and renders it with one value per line, \
indentation, \
and a distinct terminal color per token category: \
delimiters, keys, strings, numbers and booleans/null. \
 \
The rendering is meant for human eyes; \
it carries a trailing comma on every value line \
and is deliberately not re-parseable JSON.",
        )
        .bin_name(clap::crate_name!())
        .help_expected(true)
        .disable_version_flag(true)
        .arg(arg_indentation())
        .arg(arg_no_highlight())
        .arg(arg_output())
        .arg(arg_quiet())
        .arg(arg_verbose())
        .arg(arg_version())
        .arg(arg_src())
}

#[allow(clippy::print_stdout)]
fn print_version_and_exit(quiet: bool) {
    if !quiet {
        print!("{} ", clap::crate_name!());
    }
    println!("{}", prjson::VERSION);
    std::process::exit(0);
}

#[derive(Error, Debug)]
pub enum InitError {
    #[error("Failed to init logging system: {0}")]
    LogInit(#[from] tracing_subscriber::util::TryInitError),

    #[error("Failed to change the logging level: {0}")]
    LogChangeLevel(#[from] tracing_subscriber::reload::Error),
}

pub fn init() -> Result<(Settings, Option<PathBuf>, Option<PathBuf>), InitError> {
    let log_reload_handle = logging::setup(crate_name!())?;
    let args = args_matcher().get_matches();

    let quiet = args.get_flag(A_L_QUIET);
    let version = args.get_flag(A_L_VERSION);
    if version {
        print_version_and_exit(quiet);
    }

    let verbose = args.get_flag(A_L_VERBOSE);
    let log_level = if verbose {
        LevelFilter::TRACE
    } else if quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    logging::set_log_level_tracing(&log_reload_handle, log_level)?;

    let highlight = !args.get_flag(A_L_NO_HIGHLIGHT);
    let indent_amount = args
        .get_one::<u8>(A_L_INDENTATION)
        .copied()
        .unwrap_or(DEFAULT_INDENTATION)
        .into();

    let src = args
        .get_one::<PathBuf>(A_L_SRC)
        .filter(|path| path.as_os_str() != "-")
        .cloned();
    let output = args
        .get_one::<PathBuf>(A_L_OUTPUT)
        .filter(|path| path.as_os_str() != "-")
        .cloned();

    Ok((
        Settings {
            highlight,
            indent_amount,
            ..Settings::default()
        },
        src,
        output,
    ))
}
