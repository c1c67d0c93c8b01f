//! Instruction-set and microcode control-store model for the Ember-8 CPU.

/// Structured control-word model and the packed 24-bit encoding.
pub mod control;
pub use control::{
    AddrDest, AddrSource, AluFunction, ControlWord, DataDest, DataSource, CTL_CLR_CARRY, CTL_NONE,
    CTL_PC_INC, CTL_RESET_STEP, CTL_SET_CARRY, CTL_SET_STATUS, CTL_SP_DEC, CTL_SP_INC,
};

/// Instruction catalog and addressing modes.
pub mod catalog;
pub use catalog::{AddressingMode, Catalog, Instruction};

/// Microcode control-store builder and the finished architecture.
pub mod microcode;
pub use microcode::{
    Architecture, ArchitectureBuilder, BranchCondition, MicrocodeError, StatusBit, StatusVector,
    BRANCH_OPCODE_BASE, MAX_BRANCH_FAMILIES, MAX_DATA_INSTRUCTIONS, MAX_OPCODES, MAX_STEPS,
    ROM_IMAGE_BYTES, ROM_WORDS,
};

/// The canonical Ember-8 instruction-set definition.
pub mod isa;
pub use isa::standard_architecture;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
