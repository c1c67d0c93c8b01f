//! Structured control-word model for the microcode control store.
//!
//! One control word drives one step of the hardware's fetch/execute cycle.
//! In memory a word is a record with one field per control dimension; the
//! packed 24-bit layout exists only at the ROM-image boundary, produced and
//! consumed by the [`ControlWord::pack`] / [`ControlWord::from_packed`]
//! pair.

/// No control lines asserted.
pub const CTL_NONE: u8 = 0;
/// Increment the program counter.
pub const CTL_PC_INC: u8 = 1 << 0;
/// Increment the stack pointer.
pub const CTL_SP_INC: u8 = 1 << 1;
/// Decrement the stack pointer.
pub const CTL_SP_DEC: u8 = 1 << 2;
/// Latch the ALU status flags into the status register.
pub const CTL_SET_STATUS: u8 = 1 << 3;
/// Force the carry flag set.
pub const CTL_SET_CARRY: u8 = 1 << 4;
/// Force the carry flag clear.
pub const CTL_CLR_CARRY: u8 = 1 << 5;
/// Reset the step counter so the next cycle fetches a new instruction.
pub const CTL_RESET_STEP: u8 = 1 << 6;

/// Data-bus source select (4-bit field, bits 23..20 of the packed word).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum DataSource {
    None = 0,
    Ram = 1,
    RegA = 2,
    RegX = 3,
    RegY = 4,
    Status = 5,
    MarLo = 6,
    MarHi = 7,
    Alu = 8,
}

impl DataSource {
    /// Decodes a 4-bit field value; `None` for unassigned values.
    #[must_use]
    pub const fn from_u4(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Ram),
            2 => Some(Self::RegA),
            3 => Some(Self::RegX),
            4 => Some(Self::RegY),
            5 => Some(Self::Status),
            6 => Some(Self::MarLo),
            7 => Some(Self::MarHi),
            8 => Some(Self::Alu),
            _ => None,
        }
    }
}

/// Data-bus destination select (4-bit field, bits 19..16).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum DataDest {
    None = 0,
    Ram = 1,
    RegA = 2,
    RegX = 3,
    RegY = 4,
    Status = 5,
    MarLo = 6,
    MarHi = 7,
    RegB = 8,
    Instruction = 9,
}

impl DataDest {
    /// Decodes a 4-bit field value; `None` for unassigned values.
    #[must_use]
    pub const fn from_u4(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Ram),
            2 => Some(Self::RegA),
            3 => Some(Self::RegX),
            4 => Some(Self::RegY),
            5 => Some(Self::Status),
            6 => Some(Self::MarLo),
            7 => Some(Self::MarHi),
            8 => Some(Self::RegB),
            9 => Some(Self::Instruction),
            _ => None,
        }
    }
}

/// Address-bus source select (2-bit field, bits 15..14).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum AddrSource {
    None = 0,
    Pc = 1,
    Sp = 2,
    Mar = 3,
}

impl AddrSource {
    /// Decodes a 2-bit field value.
    #[must_use]
    pub const fn from_u2(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Pc),
            2 => Some(Self::Sp),
            3 => Some(Self::Mar),
            _ => None,
        }
    }
}

/// Address-bus destination select (2-bit field, bits 13..12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum AddrDest {
    None = 0,
    Pc = 1,
    Sp = 2,
    Mar = 3,
}

impl AddrDest {
    /// Decodes a 2-bit field value.
    #[must_use]
    pub const fn from_u2(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Pc),
            2 => Some(Self::Sp),
            3 => Some(Self::Mar),
            _ => None,
        }
    }
}

/// ALU function select (4-bit field, bits 11..8).
///
/// Values match the hardware's function-select wiring; the gaps are
/// unconnected inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum AluFunction {
    Default = 0,
    And = 1,
    Sub = 6,
    Add = 9,
    Or = 11,
}

impl AluFunction {
    /// Decodes a 4-bit field value; `None` for unconnected inputs.
    #[must_use]
    pub const fn from_u4(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Default),
            1 => Some(Self::And),
            6 => Some(Self::Sub),
            9 => Some(Self::Add),
            11 => Some(Self::Or),
            _ => None,
        }
    }
}

/// One microcode control word (24 significant bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ControlWord {
    /// Which device drives the data bus.
    pub data_source: DataSource,
    /// Which device latches the data bus.
    pub data_dest: DataDest,
    /// Which register drives the address bus.
    pub addr_source: AddrSource,
    /// Which register latches the address bus.
    pub addr_dest: AddrDest,
    /// ALU function select.
    pub alu: AluFunction,
    /// Control-line bitmask (`CTL_*` bits).
    pub lines: u8,
}

impl ControlWord {
    /// Step 0 of every slot: latch the opcode byte addressed by the program
    /// counter into the instruction register and advance the counter.
    pub const FETCH: Self = Self::new(
        DataSource::Ram,
        DataDest::Instruction,
        AddrSource::Pc,
        AddrDest::None,
        AluFunction::Default,
        CTL_PC_INC,
    );

    /// Word that only wraps the hardware step counter back to fetch.
    pub const RESET_STEP: Self = Self::new(
        DataSource::None,
        DataDest::None,
        AddrSource::None,
        AddrDest::None,
        AluFunction::Default,
        CTL_RESET_STEP,
    );

    /// Builds a control word from its six fields.
    #[must_use]
    pub const fn new(
        data_source: DataSource,
        data_dest: DataDest,
        addr_source: AddrSource,
        addr_dest: AddrDest,
        alu: AluFunction,
        lines: u8,
    ) -> Self {
        Self {
            data_source,
            data_dest,
            addr_source,
            addr_dest,
            alu,
            lines,
        }
    }

    /// Packs the word into its 24-bit control-store encoding.
    ///
    /// The result is always below `2^24`: the field types cannot express a
    /// wider value.
    #[must_use]
    pub const fn pack(self) -> u32 {
        ((self.data_source as u32) << 20)
            | ((self.data_dest as u32) << 16)
            | ((self.addr_source as u32) << 14)
            | ((self.addr_dest as u32) << 12)
            | ((self.alu as u32) << 8)
            | (self.lines as u32)
    }

    /// Decodes a packed control word.
    ///
    /// `None` if the value is wider than 24 bits or any field carries an
    /// unassigned value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_packed(word: u32) -> Option<Self> {
        if word >= 1 << 24 {
            return None;
        }
        let Some(data_source) = DataSource::from_u4(((word >> 20) & 0xF) as u8) else {
            return None;
        };
        let Some(data_dest) = DataDest::from_u4(((word >> 16) & 0xF) as u8) else {
            return None;
        };
        let Some(addr_source) = AddrSource::from_u2(((word >> 14) & 0x3) as u8) else {
            return None;
        };
        let Some(addr_dest) = AddrDest::from_u2(((word >> 12) & 0x3) as u8) else {
            return None;
        };
        let Some(alu) = AluFunction::from_u4(((word >> 8) & 0xF) as u8) else {
            return None;
        };
        Some(Self::new(
            data_source,
            data_dest,
            addr_source,
            addr_dest,
            alu,
            (word & 0xFF) as u8,
        ))
    }

    /// Serializes the word as 3 bytes, most significant byte first.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn to_bytes(self) -> [u8; 3] {
        let word = self.pack();
        [(word >> 16) as u8, (word >> 8) as u8, word as u8]
    }

    /// Decodes a 3-byte big-endian control word.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 3]) -> Option<Self> {
        Self::from_packed(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AddrDest, AddrSource, AluFunction, ControlWord, DataDest, DataSource, CTL_PC_INC,
        CTL_SET_STATUS,
    };

    #[test]
    fn fetch_word_packs_to_known_encoding() {
        assert_eq!(ControlWord::FETCH.pack(), 0x0019_4001);
    }

    #[test]
    fn reset_step_word_packs_to_known_encoding() {
        assert_eq!(ControlWord::RESET_STEP.pack(), 0x0000_0040);
    }

    #[test]
    fn pack_places_every_field() {
        let word = ControlWord::new(
            DataSource::Alu,
            DataDest::RegA,
            AddrSource::Mar,
            AddrDest::Sp,
            AluFunction::Add,
            CTL_PC_INC | CTL_SET_STATUS,
        );
        assert_eq!(word.pack(), 0x0082_E909);
    }

    #[test]
    fn packed_words_roundtrip() {
        let words = [
            ControlWord::FETCH,
            ControlWord::RESET_STEP,
            ControlWord::new(
                DataSource::Ram,
                DataDest::MarHi,
                AddrSource::Pc,
                AddrDest::None,
                AluFunction::Default,
                CTL_PC_INC,
            ),
        ];
        for word in words {
            assert_eq!(ControlWord::from_packed(word.pack()), Some(word));
            assert_eq!(ControlWord::from_bytes(word.to_bytes()), Some(word));
        }
    }

    #[test]
    fn from_packed_rejects_wide_words() {
        assert_eq!(ControlWord::from_packed(1 << 24), None);
        assert_eq!(ControlWord::from_packed(u32::MAX), None);
    }

    #[test]
    fn from_packed_rejects_unassigned_fields() {
        // data source 9 is unassigned
        assert_eq!(ControlWord::from_packed(9 << 20), None);
        // data destination 10 is unassigned
        assert_eq!(ControlWord::from_packed(10 << 16), None);
        // ALU function 2 is an unconnected input
        assert_eq!(ControlWord::from_packed(2 << 8), None);
    }

    #[test]
    fn byte_serialization_is_big_endian() {
        assert_eq!(ControlWord::FETCH.to_bytes(), [0x19, 0x40, 0x01]);
        assert_eq!(ControlWord::RESET_STEP.to_bytes(), [0x00, 0x00, 0x40]);
    }
}
