//! CLI that generates the Ember-8 control store and instruction listing.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use arch_core::{standard_architecture, AddressingMode};
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: ember-archgen [output-dir]

Generates the Ember-8 microcode ROM image (microcode.bin) and the
instruction listing (instructions.txt) into the output directory
(default: outputs), and prints the instruction catalog to stdout.

Options:
  -h, --help  Show this help message
";

const DEFAULT_OUTPUT_DIR: &str = "outputs";

#[derive(Debug)]
enum ParsedArgs {
    Help,
    Run(PathBuf),
}

fn parse_args(args: impl Iterator<Item = OsString>) -> Result<ParsedArgs, String> {
    let mut output_dir: Option<PathBuf> = None;

    for arg in args {
        if arg == "-h" || arg == "--help" {
            return Ok(ParsedArgs::Help);
        }
        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }
        if output_dir.is_some() {
            return Err("multiple output directories provided".to_string());
        }
        output_dir = Some(PathBuf::from(arg));
    }

    Ok(ParsedArgs::Run(
        output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
    ))
}

const fn operand_marker(mode: AddressingMode) -> &'static str {
    match mode {
        AddressingMode::Implied => "      ",
        AddressingMode::Immediate => "<BYTE>",
        AddressingMode::Absolute => "<ADDR>",
        AddressingMode::Pointer => "<PNTR>",
    }
}

fn run(output_dir: &Path) -> Result<(), String> {
    let arch =
        standard_architecture().map_err(|e| format!("instruction-set generation failed: {e}"))?;

    for entry in arch.catalog().entries() {
        println!(
            "{:02x}: {} {} - {}",
            entry.opcode,
            entry.mnemonic,
            operand_marker(entry.mode),
            entry.description
        );
    }

    fs::create_dir_all(output_dir)
        .map_err(|e| format!("failed to create {}: {e}", output_dir.display()))?;

    let rom_path = output_dir.join("microcode.bin");
    fs::write(&rom_path, arch.rom_image())
        .map_err(|e| format!("failed to write {}: {e}", rom_path.display()))?;

    let listing_path = output_dir.join("instructions.txt");
    fs::write(&listing_path, arch.catalog().listing())
        .map_err(|e| format!("failed to write {}: {e}", listing_path.display()))?;

    println!(
        "Wrote {} and {}",
        rom_path.display(),
        listing_path.display()
    );

    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParsedArgs::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParsedArgs::Run(output_dir)) => match run(&output_dir) {
            Ok(()) => 0,
            Err(message) => {
                eprintln!("error: {message}");
                1
            }
        },
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::{parse_args, ParsedArgs};
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn default_output_directory() {
        let parsed = parse_args(std::iter::empty()).unwrap();
        assert!(matches!(
            parsed,
            ParsedArgs::Run(dir) if dir == PathBuf::from("outputs")
        ));
    }

    #[test]
    fn explicit_output_directory() {
        let parsed = parse_args([OsString::from("build/rom")].into_iter()).unwrap();
        assert!(matches!(
            parsed,
            ParsedArgs::Run(dir) if dir == PathBuf::from("build/rom")
        ));
    }

    #[test]
    fn help_flag_wins() {
        let parsed = parse_args([OsString::from("--help")].into_iter()).unwrap();
        assert!(matches!(parsed, ParsedArgs::Help));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let error = parse_args([OsString::from("--bogus")].into_iter()).unwrap_err();
        assert!(error.contains("unknown option"));
    }

    #[test]
    fn multiple_directories_are_rejected() {
        let error =
            parse_args([OsString::from("a"), OsString::from("b")].into_iter()).unwrap_err();
        assert!(error.contains("multiple output directories"));
    }
}
