//! Command-line argument parsing.

use anyhow::{Result, bail};
use std::path::PathBuf;

/// One `--set NAME=CONTENT` edit. `content` is `None` when no `=` was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub name: String,
    pub content: Option<String>,
}

impl Edit {
    /// Split at the first `=`, so `B1==A1+1` sets B1 to the formula `=A1+1`.
    fn parse(arg: &str) -> Edit {
        match arg.split_once('=') {
            Some((name, content)) => Edit {
                name: name.trim().to_string(),
                content: Some(content.to_string()),
            },
            None => Edit {
                name: arg.trim().to_string(),
                content: None,
            },
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Options {
    pub file: Option<PathBuf>,
    pub edits: Vec<Edit>,
    pub output: Option<PathBuf>,
    pub write_back: bool,
    pub config: Option<PathBuf>,
    pub no_config: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Run(Options),
}

pub fn parse<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-s" | "--set" => {
                let Some(value) = args.next() else {
                    bail!("--set requires NAME=CONTENT");
                };
                options.edits.push(Edit::parse(&value));
            }
            "-o" | "--output" => {
                let Some(value) = args.next() else {
                    bail!("--output requires a file path");
                };
                options.output = Some(PathBuf::from(value));
            }
            "-w" | "--write" => options.write_back = true,
            "--config" => {
                let Some(value) = args.next() else {
                    bail!("--config requires a file path");
                };
                options.config = Some(PathBuf::from(value));
            }
            "--no-config" => options.no_config = true,
            other if other.starts_with('-') => bail!("Unknown option: {}", other),
            _ => {
                if options.file.is_some() {
                    bail!("Unexpected argument: {}", arg);
                }
                options.file = Some(PathBuf::from(arg));
            }
        }
    }

    if options.write_back && options.file.is_none() {
        bail!("--write needs a FILE");
    }
    if options.write_back && options.output.is_some() {
        bail!("--write and --output cannot be combined");
    }

    Ok(Command::Run(options))
}
