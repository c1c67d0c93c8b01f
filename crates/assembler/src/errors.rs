//! Diagnostics collected across both assembler passes.
//!
//! Syntax and semantic problems do not stop a pass — every problem in the
//! file is recorded so one run reports them all — but any recorded
//! diagnostic refuses the output image.
//!
//! # Format
//!
//! Diagnostics print to stderr in the standard style:
//! ```text
//! line 10: error: argument larger than 8 bits
//! ```

use std::fmt;

/// Classification of assembler-pass diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// No addressing mode of the mnemonic matches the operand shape.
    MnemonicMissingArgument,
    /// An identifier at statement position is not followed by `:`.
    LabelMissingColon,
    /// A byte operand or raw data byte exceeds 255.
    ArgumentTooLargeByte,
    /// An address operand exceeds 65535.
    ArgumentTooLargeAddr,
    /// A referenced label has no definition.
    LabelNotDefined(String),
    /// A token that cannot start a statement.
    UnexpectedToken,
    /// Emission ran past the end of the 64KB code image.
    ImageOverflow,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MnemonicMissingArgument => write!(f, "mnemonic missing argument"),
            Self::LabelMissingColon => write!(f, "label missing colon"),
            Self::ArgumentTooLargeByte => write!(f, "argument larger than 8 bits"),
            Self::ArgumentTooLargeAddr => write!(f, "argument larger than 16 bits"),
            Self::LabelNotDefined(name) => write!(f, "label not defined: {name}"),
            Self::UnexpectedToken => write!(f, "unexpected token"),
            Self::ImageOverflow => write!(f, "code image overflow"),
        }
    }
}

/// One diagnostic with its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Kind of problem.
    pub kind: DiagnosticKind,
    /// 1-indexed source line.
    pub line: u32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: error: {}", self.line, self.kind)
    }
}

impl std::error::Error for Diagnostic {}

/// An ordered collection of diagnostics from one assembly run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Records a diagnostic.
    pub fn push(&mut self, kind: DiagnosticKind, line: u32) {
        self.items.push(Diagnostic { kind, line });
    }

    /// True if nothing was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterates the diagnostics in record order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Formats all diagnostics for stderr output, one per line.
    #[must_use]
    pub fn format_for_stderr(&self) -> String {
        self.items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, DiagnosticKind, Diagnostics};

    #[test]
    fn diagnostic_formats_with_line_number() {
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::ArgumentTooLargeByte,
            line: 12,
        };
        assert_eq!(
            diagnostic.to_string(),
            "line 12: error: argument larger than 8 bits"
        );
    }

    #[test]
    fn undefined_label_names_the_label() {
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::LabelNotDefined("missing".to_string()),
            line: 3,
        };
        assert_eq!(
            diagnostic.to_string(),
            "line 3: error: label not defined: missing"
        );
    }

    #[test]
    fn collection_preserves_record_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticKind::UnexpectedToken, 1);
        diagnostics.push(DiagnosticKind::MnemonicMissingArgument, 2);

        assert_eq!(diagnostics.len(), 2);
        let lines: Vec<u32> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, [1, 2]);
    }

    #[test]
    fn stderr_format_joins_with_newlines() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticKind::LabelMissingColon, 4);
        diagnostics.push(DiagnosticKind::UnexpectedToken, 9);

        let output = diagnostics.format_for_stderr();
        assert_eq!(
            output,
            "line 4: error: label missing colon\nline 9: error: unexpected token"
        );
    }

    #[test]
    fn empty_collection_reports_empty() {
        let diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        assert_eq!(diagnostics.format_for_stderr(), "");
    }
}
