//! The canonical Ember-8 instruction set.
//!
//! Pure generation: no external input, and two runs yield byte-identical
//! control-store images.

use crate::catalog::AddressingMode;
use crate::control::{
    AddrDest as Ad, AddrSource as As, AluFunction as Alu, ControlWord, DataDest as Dd,
    DataSource as Ds, CTL_CLR_CARRY, CTL_NONE, CTL_PC_INC, CTL_SET_CARRY, CTL_SET_STATUS,
    CTL_SP_DEC, CTL_SP_INC,
};
use crate::microcode::{
    Architecture, ArchitectureBuilder, BranchCondition, MicrocodeError, StatusBit,
    MAR_TO_PC, OPERAND_TO_MAR_HI, OPERAND_TO_MAR_LO,
};

const fn w(
    data_source: Ds,
    data_dest: Dd,
    addr_source: As,
    addr_dest: Ad,
    alu: Alu,
    lines: u8,
) -> ControlWord {
    ControlWord::new(data_source, data_dest, addr_source, addr_dest, alu, lines)
}

/// Transfers MAR into the program counter without advancing it
/// (subroutine call/return tail).
const MAR_TO_PC_HOLD: ControlWord = w(Ds::None, Dd::None, As::Mar, Ad::Pc, Alu::Default, CTL_NONE);

/// Defines a register load pair: an immediate-byte form and a pointer form
/// that dereferences a 16-bit address operand.
fn define_load(
    b: &mut ArchitectureBuilder,
    mnemonic: &str,
    dest: Dd,
    name: &str,
) -> Result<(), MicrocodeError> {
    b.define_instruction(
        mnemonic,
        AddressingMode::Immediate,
        &format!("Load immediate value to {name} register"),
    )?;
    b.push_step(w(Ds::Ram, dest, As::Pc, Ad::None, Alu::Default, CTL_PC_INC))?;

    b.define_instruction(
        mnemonic,
        AddressingMode::Pointer,
        &format!("Load contents of memory to {name} register"),
    )?;
    b.push_step(OPERAND_TO_MAR_HI)?;
    b.push_step(OPERAND_TO_MAR_LO)?;
    b.push_step(w(Ds::Ram, dest, As::Mar, Ad::None, Alu::Default, CTL_NONE))
}

/// Defines a register store: writes the register through a 16-bit absolute
/// address operand.
fn define_store(
    b: &mut ArchitectureBuilder,
    mnemonic: &str,
    source: Ds,
    name: &str,
) -> Result<(), MicrocodeError> {
    b.define_instruction(
        mnemonic,
        AddressingMode::Absolute,
        &format!("Store {name} register into memory"),
    )?;
    b.push_step(OPERAND_TO_MAR_HI)?;
    b.push_step(OPERAND_TO_MAR_LO)?;
    b.push_step(w(source, Dd::Ram, As::Mar, Ad::None, Alu::Default, CTL_NONE))
}

/// Defines a register-to-register transfer.
fn define_transfer(
    b: &mut ArchitectureBuilder,
    mnemonic: &str,
    source: Ds,
    dest: Dd,
    description: &str,
) -> Result<(), MicrocodeError> {
    b.define_instruction(mnemonic, AddressingMode::Implied, description)?;
    b.push_step(w(source, dest, As::None, Ad::None, Alu::Default, CTL_NONE))
}

/// Defines an ALU operation pair against the A register: an immediate-byte
/// form and a pointer form. Both stage the operand in the B latch, then
/// write the ALU result back to A and latch the status flags.
fn define_alu(
    b: &mut ArchitectureBuilder,
    mnemonic: &str,
    function: Alu,
    verb: &str,
    preposition: &str,
) -> Result<(), MicrocodeError> {
    b.define_instruction(
        mnemonic,
        AddressingMode::Immediate,
        &format!("{verb} immediate value {preposition} A register"),
    )?;
    b.push_step(w(Ds::Ram, Dd::RegB, As::Pc, Ad::None, Alu::Default, CTL_PC_INC))?;
    b.push_step(w(Ds::Alu, Dd::RegA, As::None, Ad::None, function, CTL_SET_STATUS))?;

    b.define_instruction(
        mnemonic,
        AddressingMode::Pointer,
        &format!("{verb} contents of memory {preposition} A register"),
    )?;
    b.push_step(OPERAND_TO_MAR_HI)?;
    b.push_step(OPERAND_TO_MAR_LO)?;
    b.push_step(w(Ds::Ram, Dd::RegB, As::Mar, Ad::None, Alu::Default, CTL_NONE))?;
    b.push_step(w(Ds::Alu, Dd::RegA, As::None, Ad::None, function, CTL_SET_STATUS))
}

/// Defines a push/pop pair for one register.
fn define_stack_ops(
    b: &mut ArchitectureBuilder,
    push: &str,
    pop: &str,
    source: Ds,
    dest: Dd,
    name: &str,
) -> Result<(), MicrocodeError> {
    b.define_instruction(
        push,
        AddressingMode::Implied,
        &format!("Push {name} register to stack"),
    )?;
    b.push_step(w(Ds::None, Dd::None, As::None, Ad::None, Alu::Default, CTL_SP_DEC))?;
    b.push_step(w(source, Dd::Ram, As::Sp, Ad::None, Alu::Default, CTL_NONE))?;

    b.define_instruction(
        pop,
        AddressingMode::Implied,
        &format!("Pop value off stack into {name} register"),
    )?;
    b.push_step(w(Ds::Ram, dest, As::Sp, Ad::None, Alu::Default, CTL_SP_INC))
}

/// Generates the complete Ember-8 architecture: the opcode catalog and the
/// 256-slot microcode control store.
///
/// # Errors
///
/// A [`MicrocodeError`] here means the static table above violated a
/// capacity invariant; it is not recoverable.
#[allow(clippy::too_many_lines)]
pub fn standard_architecture() -> Result<Architecture, MicrocodeError> {
    let mut b = ArchitectureBuilder::new();

    b.define_instruction("nop", AddressingMode::Implied, "No operation")?;

    // Load data from memory to registers
    define_load(&mut b, "lda", Dd::RegA, "A")?;
    define_load(&mut b, "ldx", Dd::RegX, "X")?;
    define_load(&mut b, "ldy", Dd::RegY, "Y")?;

    // Store data from registers to memory
    define_store(&mut b, "sta", Ds::RegA, "A")?;
    define_store(&mut b, "stx", Ds::RegX, "X")?;
    define_store(&mut b, "sty", Ds::RegY, "Y")?;

    // Transfer data between registers
    define_transfer(&mut b, "tax", Ds::RegA, Dd::RegX, "Transfer A register to X register")?;
    define_transfer(&mut b, "txa", Ds::RegX, Dd::RegA, "Transfer X register to A register")?;
    define_transfer(&mut b, "tay", Ds::RegA, Dd::RegY, "Transfer A register to Y register")?;
    define_transfer(&mut b, "tya", Ds::RegY, Dd::RegA, "Transfer Y register to A register")?;
    define_transfer(&mut b, "txy", Ds::RegX, Dd::RegY, "Transfer X register to Y register")?;
    define_transfer(&mut b, "tyx", Ds::RegY, Dd::RegX, "Transfer Y register to X register")?;

    // ALU operations
    define_alu(&mut b, "add", Alu::Add, "Add", "to")?;
    define_alu(&mut b, "sub", Alu::Sub, "Subtract", "from")?;

    // Set / clear status flags
    b.define_instruction("scf", AddressingMode::Implied, "Set Carry Flag")?;
    b.push_step(w(Ds::Status, Dd::Status, As::None, Ad::None, Alu::Default, CTL_SET_CARRY))?;

    b.define_instruction("ccf", AddressingMode::Implied, "Clear Carry Flag")?;
    b.push_step(w(Ds::Status, Dd::Status, As::None, Ad::None, Alu::Default, CTL_CLR_CARRY))?;

    // Stack operations
    b.define_instruction("lsp", AddressingMode::Absolute, "Set stack pointer to address")?;
    b.push_step(OPERAND_TO_MAR_HI)?;
    b.push_step(OPERAND_TO_MAR_LO)?;
    b.push_step(w(Ds::None, Dd::None, As::Mar, Ad::Sp, Alu::Default, CTL_NONE))?;

    define_stack_ops(&mut b, "psa", "ppa", Ds::RegA, Dd::RegA, "A")?;
    define_stack_ops(&mut b, "psx", "ppx", Ds::RegX, Dd::RegX, "X")?;
    define_stack_ops(&mut b, "psy", "ppy", Ds::RegY, Dd::RegY, "Y")?;

    // Jump
    b.define_instruction("jmp", AddressingMode::Absolute, "Jump to address")?;
    b.push_step(OPERAND_TO_MAR_HI)?;
    b.push_step(OPERAND_TO_MAR_LO)?;
    b.push_step(MAR_TO_PC)?;

    // Call/return from subroutine
    b.define_instruction("csr", AddressingMode::Absolute, "Call subroutine")?;
    b.push_step(w(Ds::None, Dd::None, As::Pc, Ad::Mar, Alu::Default, CTL_SP_DEC))?;
    b.push_step(w(Ds::MarHi, Dd::Ram, As::Sp, Ad::None, Alu::Default, CTL_SP_DEC))?;
    b.push_step(w(Ds::MarLo, Dd::Ram, As::Sp, Ad::None, Alu::Default, CTL_NONE))?;
    b.push_step(OPERAND_TO_MAR_HI)?;
    b.push_step(OPERAND_TO_MAR_LO)?;
    b.push_step(MAR_TO_PC_HOLD)?;

    b.define_instruction("ret", AddressingMode::Implied, "Return from subroutine")?;
    b.push_step(w(Ds::Ram, Dd::MarHi, As::Sp, Ad::None, Alu::Default, CTL_SP_INC))?;
    b.push_step(w(Ds::Ram, Dd::MarLo, As::Sp, Ad::None, Alu::Default, CTL_SP_INC))?;
    b.push_step(MAR_TO_PC_HOLD)?;

    // Branch families: one slot per live status-flag combination
    b.define_branch_family(
        "bcs",
        BranchCondition { flag: StatusBit::Carry, required: true },
        "Branch if carry set",
    )?;
    b.define_branch_family(
        "bcc",
        BranchCondition { flag: StatusBit::Carry, required: false },
        "Branch if carry clear",
    )?;
    b.define_branch_family(
        "bzs",
        BranchCondition { flag: StatusBit::Zero, required: true },
        "Branch if zero set",
    )?;
    b.define_branch_family(
        "bzc",
        BranchCondition { flag: StatusBit::Zero, required: false },
        "Branch if zero clear",
    )?;

    Ok(b.finish())
}

#[cfg(test)]
mod tests {
    use super::standard_architecture;
    use crate::catalog::AddressingMode;
    use crate::control::ControlWord;

    #[test]
    fn opcode_assignment_follows_encounter_order() {
        let arch = standard_architecture().unwrap();
        let catalog = arch.catalog();
        assert_eq!(catalog.lookup("nop", AddressingMode::Implied).unwrap().opcode, 0x00);
        assert_eq!(catalog.lookup("lda", AddressingMode::Immediate).unwrap().opcode, 0x01);
        assert_eq!(catalog.lookup("lda", AddressingMode::Pointer).unwrap().opcode, 0x02);
        assert_eq!(catalog.lookup("sta", AddressingMode::Absolute).unwrap().opcode, 0x07);
        assert_eq!(catalog.lookup("add", AddressingMode::Immediate).unwrap().opcode, 0x10);
        assert_eq!(catalog.lookup("jmp", AddressingMode::Absolute).unwrap().opcode, 0x1d);
        assert_eq!(catalog.lookup("csr", AddressingMode::Absolute).unwrap().opcode, 0x1e);
        assert_eq!(catalog.lookup("ret", AddressingMode::Implied).unwrap().opcode, 0x1f);
    }

    #[test]
    fn branch_families_occupy_the_high_half() {
        let arch = standard_architecture().unwrap();
        let catalog = arch.catalog();
        assert_eq!(catalog.lookup("bcs", AddressingMode::Absolute).unwrap().opcode, 0x80);
        assert_eq!(catalog.lookup("bcc", AddressingMode::Absolute).unwrap().opcode, 0x88);
        assert_eq!(catalog.lookup("bzs", AddressingMode::Absolute).unwrap().opcode, 0x90);
        assert_eq!(catalog.lookup("bzc", AddressingMode::Absolute).unwrap().opcode, 0x98);
    }

    #[test]
    fn catalog_lookup_roundtrips_through_opcodes() {
        let arch = standard_architecture().unwrap();
        let catalog = arch.catalog();
        for entry in catalog.entries() {
            let back = catalog.by_opcode(entry.opcode).unwrap();
            assert_eq!(back.mnemonic, entry.mnemonic);
            assert_eq!(back.mode, entry.mode);
        }
    }

    #[test]
    fn nop_slot_is_fetch_then_reset() {
        let arch = standard_architecture().unwrap();
        assert_eq!(arch.word_at(0x00, 0), Some(ControlWord::FETCH));
        for step in 1..8 {
            assert_eq!(arch.word_at(0x00, step), Some(ControlWord::RESET_STEP));
        }
    }

    #[test]
    fn generation_is_idempotent() {
        let first = standard_architecture().unwrap();
        let second = standard_architecture().unwrap();
        assert_eq!(first.rom_image(), second.rom_image());
        assert_eq!(first.catalog().listing(), second.catalog().listing());
    }
}
