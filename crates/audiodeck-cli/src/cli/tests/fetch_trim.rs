//! Tests for fetch and trim subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_fetch() {
    match parse(&[
        "audiodeck",
        "fetch",
        "https://www.youtube.com/watch?v=abc",
        "--name",
        "intro",
    ]) {
        CliCommand::Fetch { url, name } => {
            assert_eq!(url, "https://www.youtube.com/watch?v=abc");
            assert_eq!(name, "intro");
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_requires_name() {
    assert!(Cli::try_parse_from(["audiodeck", "fetch", "https://vimeo.com/1"]).is_err());
}

#[test]
fn cli_parse_trim() {
    match parse(&[
        "audiodeck",
        "trim",
        "1700000000000_song.mp3",
        "--start",
        "1.25",
        "--end",
        "9",
        "--name",
        "hook",
    ]) {
        CliCommand::Trim {
            file,
            start,
            end,
            name,
        } => {
            assert_eq!(file, "1700000000000_song.mp3");
            assert_eq!(start, 1.25);
            assert_eq!(end, 9.0);
            assert_eq!(name, "hook");
        }
        _ => panic!("expected Trim"),
    }
}

#[test]
fn cli_parse_trim_rejects_non_numeric_bounds() {
    assert!(Cli::try_parse_from([
        "audiodeck", "trim", "a.mp3", "--start", "soon", "--end", "9", "--name", "x",
    ])
    .is_err());
}
