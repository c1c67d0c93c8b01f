//! CLI entry point for the Ember-8 assembler binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use arch_core::standard_architecture;
use assembler::assembler::assemble;
use assembler::lexer::tokenize;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: ember-asm [source]

Assembles an Ember-8 source file and prints the code image to standard
output as a hex dump, 16 bytes per line. The source path defaults to
example.asm.

Options:
  -h, --help  Show this help message
";

const DEFAULT_SOURCE: &str = "example.asm";

#[derive(Debug, PartialEq, Eq)]
enum ParsedArgs {
    Help,
    Run(PathBuf),
}

fn parse_args(args: impl Iterator<Item = OsString>) -> Result<ParsedArgs, String> {
    let mut input: Option<PathBuf> = None;

    for arg in args {
        if arg == "-h" || arg == "--help" {
            return Ok(ParsedArgs::Help);
        }
        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }
        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    Ok(ParsedArgs::Run(
        input.unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE)),
    ))
}

fn hex_dump(image: &[u8]) -> String {
    image
        .chunks(16)
        .map(|row| {
            row.iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn run(path: &Path) -> Result<(), i32> {
    let source = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: failed to read {}: {e}", path.display());
        1
    })?;

    let arch = standard_architecture().map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let tokens = tokenize(&source, arch.catalog()).map_err(|e| {
        eprintln!("{e}");
        1
    })?;

    match assemble(arch.catalog(), &tokens) {
        Ok(image) => {
            if !image.is_empty() {
                println!("{}", hex_dump(&image));
            }
            Ok(())
        }
        Err(diagnostics) => {
            eprintln!("{}", diagnostics.format_for_stderr());
            Err(1)
        }
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParsedArgs::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParsedArgs::Run(path)) => match run(&path) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}
