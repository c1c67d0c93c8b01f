//! Ember-8 assembler library.

use arch_core as _;
#[cfg(test)]
use tempfile as _;

/// Two-pass assembly pipeline over a token sequence.
pub mod assembler;
/// Diagnostic types collected across assembler passes.
pub mod errors;
/// Label definition/reference tables for backpatching.
pub mod labels;
/// Tokenizer for assembly source text.
pub mod lexer;
