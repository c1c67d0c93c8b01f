//! Two-pass assembly: byte emission with label collection, then
//! backpatching.
//!
//! Pass 1 walks the token sequence, consults the catalog to pick an
//! addressing mode for each mnemonic, emits bytes into the code image, and
//! collects label definitions and references. Pass 2 patches every
//! reference with its definition's address. Diagnostics accumulate across
//! both passes; any diagnostic refuses the output image.

use arch_core::{AddressingMode, Catalog};

use crate::errors::{DiagnosticKind, Diagnostics};
use crate::labels::LabelTable;
use crate::lexer::{Token, TokenKind};

/// Size of the full 16-bit address space backing the code image.
pub const IMAGE_BYTES: usize = 1 << 16;

/// Byte image covering the address space, written strictly in increasing
/// order during pass 1.
#[derive(Debug, Clone)]
struct CodeImage {
    bytes: Box<[u8]>,
    cursor: usize,
}

impl CodeImage {
    fn new() -> Self {
        Self {
            bytes: vec![0; IMAGE_BYTES].into_boxed_slice(),
            cursor: 0,
        }
    }

    /// Appends one byte; false once the image is full.
    fn emit(&mut self, byte: u8) -> bool {
        if self.cursor >= IMAGE_BYTES {
            return false;
        }
        self.bytes[self.cursor] = byte;
        self.cursor += 1;
        true
    }

    /// Overwrites the two placeholder bytes at `offset`, high byte first.
    /// A placeholder clipped by image overflow is left alone; the overflow
    /// diagnostic already refuses the output.
    fn patch(&mut self, offset: u16, value: u16) {
        let index = usize::from(offset);
        if index + 1 >= IMAGE_BYTES {
            return;
        }
        let [hi, lo] = value.to_be_bytes();
        self.bytes[index] = hi;
        self.bytes[index + 1] = lo;
    }

    /// Current write position as a code offset.
    fn offset(&self) -> u16 {
        u16::try_from(self.cursor).unwrap_or(u16::MAX)
    }

    /// The written prefix of the image.
    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = Vec::from(self.bytes);
        bytes.truncate(self.cursor);
        bytes
    }
}

struct Assembly<'a, 'c> {
    catalog: &'c Catalog,
    tokens: &'a [Token<'a>],
    pos: usize,
    image: CodeImage,
    labels: LabelTable<'a>,
    diagnostics: Diagnostics,
    overflowed: bool,
}

impl<'a> Assembly<'a, '_> {
    fn peek_kind(&self, ahead: usize) -> Option<TokenKind<'a>> {
        self.tokens.get(self.pos + ahead).map(|token| token.kind)
    }

    fn diag(&mut self, kind: DiagnosticKind, line: u32) {
        self.diagnostics.push(kind, line);
    }

    fn emit_byte(&mut self, byte: u8, line: u32) {
        if !self.image.emit(byte) && !self.overflowed {
            self.overflowed = true;
            self.diag(DiagnosticKind::ImageOverflow, line);
        }
    }

    fn pass1(&mut self) {
        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos];
            self.pos += 1;
            match token.kind {
                TokenKind::End => break,
                TokenKind::Mnemonic(name) => self.statement_mnemonic(name, token.line),
                TokenKind::Label(name) => self.statement_label(name, token.line),
                TokenKind::Number(value) => self.statement_raw_byte(value, token.line),
                TokenKind::Str(text) => self.statement_string(text, token.line),
                TokenKind::Star | TokenKind::Colon => {
                    self.diag(DiagnosticKind::UnexpectedToken, token.line);
                }
            }
        }
    }

    /// Picks an addressing mode for a mnemonic from the following tokens,
    /// preferring pointer, then absolute, then immediate, then implied.
    fn statement_mnemonic(&mut self, name: &str, line: u32) {
        // catalog lookups go through the three-character prefix
        let key = name.get(..3).unwrap_or(name);

        // star + label/number: indirect through a pointer operand
        if self.peek_kind(0) == Some(TokenKind::Star)
            && matches!(
                self.peek_kind(1),
                Some(TokenKind::Label(_) | TokenKind::Number(_))
            )
        {
            if let Some(entry) = self.catalog.lookup(key, AddressingMode::Pointer) {
                let opcode = entry.opcode;
                self.emit_byte(opcode, line);
                self.pos += 1;
                self.address_operand();
                return;
            }
        }

        // label or number: absolute address
        if matches!(
            self.peek_kind(0),
            Some(TokenKind::Label(_) | TokenKind::Number(_))
        ) {
            if let Some(entry) = self.catalog.lookup(key, AddressingMode::Absolute) {
                let opcode = entry.opcode;
                self.emit_byte(opcode, line);
                self.address_operand();
                return;
            }
        }

        // number alone: immediate byte
        if let Some(TokenKind::Number(value)) = self.peek_kind(0) {
            if let Some(entry) = self.catalog.lookup(key, AddressingMode::Immediate) {
                let opcode = entry.opcode;
                let operand_line = self.tokens[self.pos].line;
                self.pos += 1;
                self.emit_byte(opcode, line);
                if value > 0xFF {
                    self.diag(DiagnosticKind::ArgumentTooLargeByte, operand_line);
                } else {
                    #[allow(clippy::cast_possible_truncation)]
                    self.emit_byte(value as u8, operand_line);
                }
                return;
            }
        }

        // no operand
        if let Some(entry) = self.catalog.lookup(key, AddressingMode::Implied) {
            let opcode = entry.opcode;
            self.emit_byte(opcode, line);
            return;
        }

        self.diag(DiagnosticKind::MnemonicMissingArgument, line);
    }

    /// Emits the 16-bit operand following a pointer- or absolute-mode
    /// opcode: a placeholder pair for a label, big-endian bytes for a
    /// literal.
    fn address_operand(&mut self) {
        let Some(token) = self.tokens.get(self.pos).copied() else {
            return;
        };
        match token.kind {
            TokenKind::Label(name) => {
                self.pos += 1;
                self.labels.reference(name, self.image.offset(), token.line);
                self.emit_byte(0, token.line);
                self.emit_byte(0, token.line);
            }
            TokenKind::Number(value) => {
                self.pos += 1;
                if value > 0xFFFF {
                    self.diag(DiagnosticKind::ArgumentTooLargeAddr, token.line);
                } else {
                    #[allow(clippy::cast_possible_truncation)]
                    let [hi, lo] = (value as u16).to_be_bytes();
                    self.emit_byte(hi, token.line);
                    self.emit_byte(lo, token.line);
                }
            }
            _ => {}
        }
    }

    fn statement_label(&mut self, name: &'a str, line: u32) {
        if self.peek_kind(0) == Some(TokenKind::Colon) {
            self.pos += 1;
            self.labels.define(name, self.image.offset(), line);
        } else {
            self.diag(DiagnosticKind::LabelMissingColon, line);
        }
    }

    fn statement_raw_byte(&mut self, value: u32, line: u32) {
        if value > 0xFF {
            self.diag(DiagnosticKind::ArgumentTooLargeByte, line);
        } else {
            #[allow(clippy::cast_possible_truncation)]
            self.emit_byte(value as u8, line);
        }
    }

    /// Emits the bytes between the quotes, then a NUL terminator.
    fn statement_string(&mut self, text: &str, line: u32) {
        let inner = &text[1..text.len() - 1];
        for byte in inner.bytes() {
            self.emit_byte(byte, line);
        }
        self.emit_byte(0, line);
    }

    fn pass2(&mut self) {
        let mut patches = Vec::new();
        let mut undefined = Vec::new();
        for reference in self.labels.references() {
            match self.labels.address_of(reference.name) {
                Some(address) => patches.push((reference.offset, address)),
                None => undefined.push((reference.name.to_string(), reference.line)),
            }
        }
        for (offset, address) in patches {
            self.image.patch(offset, address);
        }
        for (name, line) in undefined {
            self.diag(DiagnosticKind::LabelNotDefined(name), line);
        }
    }
}

/// Assembles a token sequence into a code image.
///
/// # Errors
///
/// Returns the collected diagnostics when the source contains syntax or
/// semantic errors; no image is produced in that case.
pub fn assemble<'a>(catalog: &Catalog, tokens: &'a [Token<'a>]) -> Result<Vec<u8>, Diagnostics> {
    let mut assembly = Assembly {
        catalog,
        tokens,
        pos: 0,
        image: CodeImage::new(),
        labels: LabelTable::new(),
        diagnostics: Diagnostics::new(),
        overflowed: false,
    };

    assembly.pass1();
    assembly.pass2();

    if assembly.diagnostics.is_empty() {
        Ok(assembly.image.into_bytes())
    } else {
        Err(assembly.diagnostics)
    }
}
