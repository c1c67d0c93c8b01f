//! Microcode control-store builder and the finished architecture artifact.
//!
//! The control store gives every opcode a fixed slot of [`MAX_STEPS`] words
//! at `opcode * MAX_STEPS`. The whole store starts out filled with
//! reset-step-only words, so any step past the last meaningful one of a
//! slot — and every step of an undefined opcode — wraps the hardware step
//! counter back to fetch.

use thiserror::Error;

use crate::catalog::{AddressingMode, Catalog, Instruction};
use crate::control::{
    AddrDest, AddrSource, AluFunction, ControlWord, DataDest, DataSource, CTL_PC_INC,
};

/// Size of the opcode space.
pub const MAX_OPCODES: usize = 256;
/// Microcode steps per opcode slot.
pub const MAX_STEPS: usize = 8;
/// Data instructions occupy opcodes `0..MAX_DATA_INSTRUCTIONS`.
pub const MAX_DATA_INSTRUCTIONS: u8 = 127;
/// Branch families occupy the high half of the opcode space, 8 slots each.
pub const MAX_BRANCH_FAMILIES: u8 = 15;
/// First opcode of the branch range.
pub const BRANCH_OPCODE_BASE: u8 = 0x80;
/// Total control words in the store.
pub const ROM_WORDS: usize = MAX_OPCODES * MAX_STEPS;
/// Size of the serialized control-store image (3 bytes per word).
pub const ROM_IMAGE_BYTES: usize = ROM_WORDS * 3;

/// Status flag positions carried in the low bits of a fetched branch opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum StatusBit {
    /// Carry flag, bit 0.
    Carry = 0,
    /// Zero flag, bit 1.
    Zero = 1,
}

/// One of the eight possible combinations of the three status bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct StatusVector(u8);

impl StatusVector {
    /// Every status vector, in opcode order.
    pub const ALL: [Self; 8] = [
        Self(0),
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
        Self(7),
    ];

    /// The raw 3-bit combination.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the given flag is set in this combination.
    #[must_use]
    pub const fn is_set(self, bit: StatusBit) -> bool {
        (self.0 >> bit as u8) & 1 == 1
    }
}

/// The flag test a branch family applies to each status vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BranchCondition {
    /// Which status flag is tested.
    pub flag: StatusBit,
    /// The value the flag must hold for the branch to be taken.
    pub required: bool,
}

impl BranchCondition {
    /// Whether a status vector satisfies this condition.
    #[must_use]
    pub const fn is_met(self, vector: StatusVector) -> bool {
        vector.is_set(self.flag) == self.required
    }
}

/// Reads the operand high byte through the program counter into MAR.
pub const OPERAND_TO_MAR_HI: ControlWord = ControlWord::new(
    DataSource::Ram,
    DataDest::MarHi,
    AddrSource::Pc,
    AddrDest::None,
    AluFunction::Default,
    CTL_PC_INC,
);

/// Reads the operand low byte through the program counter into MAR.
pub const OPERAND_TO_MAR_LO: ControlWord = ControlWord::new(
    DataSource::Ram,
    DataDest::MarLo,
    AddrSource::Pc,
    AddrDest::None,
    AluFunction::Default,
    CTL_PC_INC,
);

/// Transfers MAR into the program counter (jump and taken-branch tail).
pub const MAR_TO_PC: ControlWord = ControlWord::new(
    DataSource::None,
    DataDest::None,
    AddrSource::Mar,
    AddrDest::Pc,
    AluFunction::Default,
    CTL_PC_INC,
);

/// Taken side of a branch: load the 16-bit operand into the program counter.
pub const BRANCH_TAKEN: [ControlWord; 3] = [OPERAND_TO_MAR_HI, OPERAND_TO_MAR_LO, MAR_TO_PC];

/// Not-taken side of a branch: two no-op steps that still advance the
/// program counter past the 2-byte operand, keeping the instruction stream
/// synchronized with the taken side.
pub const OPERAND_SKIP: [ControlWord; 2] = [
    ControlWord::new(
        DataSource::None,
        DataDest::None,
        AddrSource::None,
        AddrDest::None,
        AluFunction::Default,
        CTL_PC_INC,
    ),
    ControlWord::new(
        DataSource::None,
        DataDest::None,
        AddrSource::None,
        AddrDest::None,
        AluFunction::Default,
        CTL_PC_INC,
    ),
];

/// Errors raised while defining the static instruction set.
///
/// Every variant indicates a bug in the instruction-set definition itself,
/// not in user input; generation treats them as unrecoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MicrocodeError {
    /// The data-instruction half of the opcode space is full.
    #[error("data instruction limit of 127 exceeded")]
    TooManyDataInstructions,
    /// The branch half of the opcode space is full.
    #[error("branch family limit of 15 exceeded")]
    TooManyBranchFamilies,
    /// An opcode slot would grow past its fixed eight-step size.
    #[error("opcode 0x{opcode:02x} exceeds 8 microcode steps")]
    TooManySteps {
        /// The slot that overflowed.
        opcode: u8,
    },
    /// Mnemonics are exactly three ASCII alphanumeric characters.
    #[error("mnemonic '{0}' is not a three-character identifier")]
    MalformedMnemonic(String),
}

/// Builds the instruction catalog and control store step by step.
///
/// Created by the caller and passed explicitly; several independent
/// architectures may be built in one process.
#[derive(Debug, Clone)]
pub struct ArchitectureBuilder {
    catalog: Catalog,
    rom: Vec<ControlWord>,
    opcode: u8,
    step: usize,
    data_count: u8,
    branch_count: u8,
}

impl Default for ArchitectureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchitectureBuilder {
    /// Creates a builder with an empty catalog and a reset-filled store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: Catalog::default(),
            rom: vec![ControlWord::RESET_STEP; ROM_WORDS],
            opcode: 0,
            step: 0,
            data_count: 0,
            branch_count: 0,
        }
    }

    /// Starts a new data instruction: assigns the next opcode in encounter
    /// order, appends the catalog entry, and emits the fetch word as step 0
    /// of the fresh slot.
    ///
    /// # Errors
    ///
    /// [`MicrocodeError::TooManyDataInstructions`] once 127 data
    /// instructions exist, or [`MicrocodeError::MalformedMnemonic`] for a
    /// mnemonic that is not a three-character identifier.
    pub fn define_instruction(
        &mut self,
        mnemonic: &str,
        mode: AddressingMode,
        description: &str,
    ) -> Result<(), MicrocodeError> {
        check_mnemonic(mnemonic)?;
        if self.data_count >= MAX_DATA_INSTRUCTIONS {
            return Err(MicrocodeError::TooManyDataInstructions);
        }
        self.opcode = self.data_count;
        self.step = 0;
        self.data_count += 1;
        self.catalog.push(Instruction {
            opcode: self.opcode,
            mnemonic: mnemonic.to_string(),
            mode,
            description: description.to_string(),
        });
        self.push_step(ControlWord::FETCH)
    }

    /// Appends one control word to the current opcode's slot.
    ///
    /// # Errors
    ///
    /// [`MicrocodeError::TooManySteps`] when the slot already holds its
    /// eight words.
    pub fn push_step(&mut self, word: ControlWord) -> Result<(), MicrocodeError> {
        if self.step >= MAX_STEPS {
            return Err(MicrocodeError::TooManySteps {
                opcode: self.opcode,
            });
        }
        self.rom[usize::from(self.opcode) * MAX_STEPS + self.step] = word;
        self.step += 1;
        Ok(())
    }

    /// Defines a conditional-branch family: one catalog entry at the base
    /// opcode, and eight opcode slots — one per status vector, since the
    /// fetched opcode always carries the live status flags in its low bits.
    ///
    /// Variants whose vector satisfies `condition` get the address-load
    /// sequence; the rest get the operand-skip sequence, so the program
    /// counter ends 2 bytes past the operand either way.
    ///
    /// # Errors
    ///
    /// [`MicrocodeError::TooManyBranchFamilies`] once 15 families exist, or
    /// [`MicrocodeError::MalformedMnemonic`].
    pub fn define_branch_family(
        &mut self,
        mnemonic: &str,
        condition: BranchCondition,
        description: &str,
    ) -> Result<(), MicrocodeError> {
        check_mnemonic(mnemonic)?;
        if self.branch_count >= MAX_BRANCH_FAMILIES {
            return Err(MicrocodeError::TooManyBranchFamilies);
        }
        let base = BRANCH_OPCODE_BASE + self.branch_count * 8;
        self.branch_count += 1;
        self.catalog.push(Instruction {
            opcode: base,
            mnemonic: mnemonic.to_string(),
            mode: AddressingMode::Absolute,
            description: description.to_string(),
        });

        for vector in StatusVector::ALL {
            self.opcode = base + vector.bits();
            self.step = 0;
            self.push_step(ControlWord::FETCH)?;
            if condition.is_met(vector) {
                for word in BRANCH_TAKEN {
                    self.push_step(word)?;
                }
            } else {
                for word in OPERAND_SKIP {
                    self.push_step(word)?;
                }
            }
        }
        self.step = 0;
        Ok(())
    }

    /// Consumes the builder, yielding the immutable architecture.
    #[must_use]
    pub fn finish(self) -> Architecture {
        Architecture {
            catalog: self.catalog,
            rom: self.rom,
        }
    }
}

fn check_mnemonic(mnemonic: &str) -> Result<(), MicrocodeError> {
    if mnemonic.len() == 3 && mnemonic.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(MicrocodeError::MalformedMnemonic(mnemonic.to_string()))
    }
}

/// Immutable result of generation: the opcode catalog plus the full
/// 256-slot control store.
#[derive(Debug, Clone)]
pub struct Architecture {
    catalog: Catalog,
    rom: Vec<ControlWord>,
}

impl Architecture {
    /// The instruction catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// All control words in store order (`opcode * MAX_STEPS + step`).
    #[must_use]
    pub fn rom_words(&self) -> &[ControlWord] {
        &self.rom
    }

    /// The control word at a slot position.
    #[must_use]
    pub fn word_at(&self, opcode: u8, step: usize) -> Option<ControlWord> {
        if step >= MAX_STEPS {
            return None;
        }
        Some(self.rom[usize::from(opcode) * MAX_STEPS + step])
    }

    /// Serializes the control store as the ROM image: 6144 bytes, one
    /// 24-bit big-endian word per step, at offset `(opcode*8 + step) * 3`.
    #[must_use]
    pub fn rom_image(&self) -> Vec<u8> {
        let mut image = Vec::with_capacity(ROM_IMAGE_BYTES);
        for word in &self.rom {
            image.extend_from_slice(&word.to_bytes());
        }
        image
    }
}
