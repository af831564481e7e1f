//! Instruction operand fields: extraction, normalization, and rendering.
//!
//! A [`Field`] describes where an operand lives inside the raw instruction
//! word and what kind of value it is. Extraction pulls the encoded bits out;
//! normalization turns them into the form the rest of the disassembler works
//! with, so that every address-like operand ends up absolute.

use std::fmt;

use crate::chip::{register_name, Reg16, Reg8, CALLT_BASE, SADDR_BASE, SFR_BASE};
use crate::Address;

/// The 16-bit address space every normalized address lives in
pub const ADDRESS_MASK: u32 = 0xFFFF;

/// Operand kind, which decides the encoding width and the normalization rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// 8-bit immediate data (#byte)
    Imm8,
    /// 8-bit SFR address (sfr)
    Sfr,
    /// 8-bit short direct address (saddr/saddrp)
    SAddr,
    /// 8-bit PC-relative displacement ($addr16)
    JDisp,
    /// 5-bit CALLT table index ([addr5])
    Addr5,
    /// 3-bit 8-bit register index (r)
    Reg8,
    /// 2-bit register pair index (rp)
    Reg16,
    /// 3-bit bit index within a byte (.bit)
    Bit,
    /// 16-bit immediate data (#word)
    Imm16,
    /// 16-bit absolute data address (!addr16)
    Addr16,
    /// 16-bit absolute branch address (!addr16)
    JAddr16,
}

/// How a field is laid out in the instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Unaligned run of this many bits
    Bits(u8),
    /// Byte-aligned 16-bit little-endian data word
    Word,
}

impl FieldKind {
    pub fn encoding(&self) -> Encoding {
        match self {
            FieldKind::Imm8 | FieldKind::Sfr | FieldKind::SAddr | FieldKind::JDisp => {
                Encoding::Bits(8)
            }
            FieldKind::Addr5 => Encoding::Bits(5),
            FieldKind::Reg8 | FieldKind::Bit => Encoding::Bits(3),
            FieldKind::Reg16 => Encoding::Bits(2),
            FieldKind::Imm16 | FieldKind::Addr16 | FieldKind::JAddr16 => Encoding::Word,
        }
    }
}

/// One operand slot of an instruction definition.
///
/// Fields are plain configuration and are shared by every instruction decoded
/// from the same definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    pub kind: FieldKind,
    /// Bit offset of the field's least significant bit in the instruction word
    pub offset: u8,
}

impl Field {
    pub const fn new(kind: FieldKind, offset: u8) -> Self {
        Self { kind, offset }
    }

    pub const fn imm8(offset: u8) -> Self {
        Self::new(FieldKind::Imm8, offset)
    }

    pub const fn sfr(offset: u8) -> Self {
        Self::new(FieldKind::Sfr, offset)
    }

    pub const fn saddr(offset: u8) -> Self {
        Self::new(FieldKind::SAddr, offset)
    }

    pub const fn jdisp(offset: u8) -> Self {
        Self::new(FieldKind::JDisp, offset)
    }

    pub const fn addr5(offset: u8) -> Self {
        Self::new(FieldKind::Addr5, offset)
    }

    pub const fn reg8(offset: u8) -> Self {
        Self::new(FieldKind::Reg8, offset)
    }

    pub const fn reg16(offset: u8) -> Self {
        Self::new(FieldKind::Reg16, offset)
    }

    pub const fn bit(offset: u8) -> Self {
        Self::new(FieldKind::Bit, offset)
    }

    /// Word fields must sit on a byte boundary.
    pub const fn imm16(offset: u8) -> Self {
        assert!(offset % 8 == 0);
        Self::new(FieldKind::Imm16, offset)
    }

    pub const fn addr16(offset: u8) -> Self {
        assert!(offset % 8 == 0);
        Self::new(FieldKind::Addr16, offset)
    }

    pub const fn jaddr16(offset: u8) -> Self {
        assert!(offset % 8 == 0);
        Self::new(FieldKind::JAddr16, offset)
    }

    pub fn encoding(&self) -> Encoding {
        self.kind.encoding()
    }

    /// True iff the normalized value is an absolute address.
    pub fn is_addr(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::Sfr
                | FieldKind::SAddr
                | FieldKind::JDisp
                | FieldKind::Addr5
                | FieldKind::Addr16
                | FieldKind::JAddr16
        )
    }

    /// True iff the normalized value is an address that may be jumped to.
    pub fn is_branch(&self) -> bool {
        matches!(self.kind, FieldKind::JDisp | FieldKind::JAddr16)
    }

    /// Pull the encoded bits of this field out of the instruction word.
    pub fn extract(&self, word: u32) -> u32 {
        let offset = self.offset as u32;
        match self.encoding() {
            Encoding::Bits(width) => (word >> offset) & ((1u32 << width) - 1),
            Encoding::Word => {
                // The data word is stored low byte first, so in the
                // big-endian instruction word the low byte sits higher.
                let high = (word >> offset) & 0xFF;
                let low = (word >> (offset + 8)) & 0xFF;
                low | (high << 8)
            }
        }
    }

    /// Convert an extracted value into its semantic form.
    ///
    /// `pc` and `len` locate the owning instruction and only matter for
    /// PC-relative displacements.
    pub fn normalize(&self, raw: u32, pc: Address, len: u8) -> u32 {
        match self.kind {
            FieldKind::SAddr => {
                // Offsets below 20H land in the SFR area
                if raw < (SADDR_BASE & 0xFF) {
                    SFR_BASE + raw
                } else {
                    (SADDR_BASE & !0xFF) + raw
                }
            }
            FieldKind::Sfr => SFR_BASE + raw,
            FieldKind::JDisp => {
                // 0x80 itself stays positive.
                let disp = if raw > 0x80 {
                    raw as i64 - 0x100
                } else {
                    raw as i64
                };
                let pc_next = pc as i64 + len as i64;
                ((pc_next + disp) as u32) & ADDRESS_MASK
            }
            FieldKind::Addr5 => CALLT_BASE + (raw << 1),
            FieldKind::Imm8
            | FieldKind::Reg8
            | FieldKind::Reg16
            | FieldKind::Bit
            | FieldKind::Imm16
            | FieldKind::Addr16
            | FieldKind::JAddr16 => raw,
        }
    }

    /// Extract and normalize this field for the instruction at `pc`.
    pub fn operand(&self, word: u32, pc: Address, len: u8) -> Operand {
        Operand {
            field: *self,
            value: self.normalize(self.extract(word), pc, len),
        }
    }

    /// Render a normalized value as assembler text.
    ///
    /// Never fails: values the name tables don't know get a placeholder.
    pub fn render(&self, value: u32) -> String {
        match self.kind {
            FieldKind::Imm8 => format!("#{:02X}H", value),
            FieldKind::Imm16 => format!("#{:04X}H", value),
            FieldKind::SAddr => match register_name(value) {
                Some(name) => name.to_string(),
                None => format!("{:04X}H", value),
            },
            FieldKind::Sfr => match register_name(value) {
                Some(name) => name.to_string(),
                None => format!("SFR_{:04X}H?", value),
            },
            FieldKind::JDisp => format!("${:04X}H", value),
            FieldKind::Addr5 => format!("[{:02X}H]", value),
            FieldKind::Addr16 | FieldKind::JAddr16 => format!("!{:04X}H", value),
            FieldKind::Reg8 => match Reg8::from_index(value) {
                Some(reg) => reg.name().to_string(),
                None => format!("?{}?", value),
            },
            FieldKind::Reg16 => match Reg16::from_index(value) {
                Some(reg) => reg.name().to_string(),
                None => format!("?{}?", value),
            },
            FieldKind::Bit => value.to_string(),
        }
    }
}

/// A field instantiated for one specific instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operand {
    pub field: Field,
    /// Normalized value; addresses are always absolute
    pub value: u32,
}

impl Operand {
    pub fn render(&self) -> String {
        self.field.render(self.value)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Field::imm8(0), 0x12, 0x12)]
    #[case(Field::saddr(0), 0x1F, 0xFF1F)]
    #[case(Field::saddr(0), 0x20, 0xFE20)]
    #[case(Field::saddr(0), 0xFF, 0xFEFF)]
    #[case(Field::sfr(0), 0x48, 0xFF48)]
    #[case(Field::sfr(0), 0x00, 0xFF00)]
    #[case(Field::addr5(0), 0x03, 0x46)]
    #[case(Field::addr5(0), 0x00, 0x40)]
    #[case(Field::addr5(0), 0x1F, 0x7E)]
    #[case(Field::reg8(0), 0x05, 0x05)]
    #[case(Field::imm16(0), 0x1234, 0x1234)]
    #[case(Field::jaddr16(0), 0x0082, 0x0082)]
    fn test_normalize(#[case] field: Field, #[case] raw: u32, #[case] expected: u32) {
        assert_eq!(field.normalize(raw, 0x0100, 2), expected);
    }

    #[rstest]
    #[case(0x0100, 2, 0x05, 0x0107)]
    #[case(0x0100, 2, 0xFE, 0x0100)]
    #[case(0x0100, 2, 0x00, 0x0102)]
    #[case(0x0100, 2, 0x7F, 0x0181)]
    // 0x80 is kept positive
    #[case(0x0100, 2, 0x80, 0x0182)]
    #[case(0x0100, 2, 0x81, 0x0083)]
    #[case(0x0200, 4, 0xF0, 0x01F4)]
    fn test_jdisp(#[case] pc: Address, #[case] len: u8, #[case] raw: u32, #[case] target: u32) {
        assert_eq!(Field::jdisp(0).normalize(raw, pc, len), target);
    }

    #[test]
    fn test_extract_bits() {
        // MOV r, #byte: 0A F1|r<<1 byte
        let word = 0x0A_F7_12;
        assert_eq!(Field::reg8(9).extract(word), 3);
        assert_eq!(Field::imm8(0).extract(word), 0x12);
        // CALLT [addr5] index sits in bits 1..6
        assert_eq!(Field::addr5(1).extract(0x46), 0x03);
        // MOVW rp, #word: rp in bits 18..20
        assert_eq!(Field::reg16(18).extract(0xFC_34_12), 3);
    }

    #[test]
    fn test_extract_word_swaps_bytes() {
        // Bytes 22 34 12: the data word is 0x1234
        assert_eq!(Field::addr16(0).extract(0x22_34_12), 0x1234);
        // Word field one byte up in a 4-byte word
        assert_eq!(Field::imm16(8).extract(0xAA_CD_AB_00), 0xABCD);
    }

    #[test]
    fn test_extract_width_bounds() {
        let fields = [
            Field::imm8(0),
            Field::addr5(1),
            Field::reg8(4),
            Field::reg16(2),
            Field::bit(12),
        ];
        for field in fields {
            let Encoding::Bits(width) = field.encoding() else {
                unreachable!()
            };
            for word in [0u32, 0xFFFF_FFFF, 0xA5A5_A5A5, 0x5A5A_5A5A] {
                assert!(field.extract(word) < (1 << width));
            }
        }
    }

    #[test]
    fn test_operand_is_deterministic() {
        let field = Field::jdisp(0);
        let a = field.operand(0x30_FE, 0x0100, 2);
        let b = field.operand(0x30_FE, 0x0100, 2);
        assert_eq!(a, b);
        assert_eq!(a.value, 0x0100);
    }

    #[rstest]
    #[case(Field::imm8(0), 0x0A, "#0AH")]
    #[case(Field::imm16(0), 0x1234, "#1234H")]
    #[case(Field::saddr(0), 0xFE20, "FE20H")]
    #[case(Field::saddr(0), 0xFF1E, "PSW")]
    #[case(Field::saddr(0), 0xFF1C, "SP")]
    #[case(Field::saddr(0), 0xFF02, "P2")]
    #[case(Field::sfr(0), 0xFF48, "WDTM")]
    #[case(Field::sfr(0), 0xFF99, "SFR_FF99H?")]
    #[case(Field::jdisp(0), 0x0107, "$0107H")]
    #[case(Field::addr5(1), 0x46, "[46H]")]
    #[case(Field::addr16(0), 0xFE80, "!FE80H")]
    #[case(Field::jaddr16(0), 0x0082, "!0082H")]
    #[case(Field::reg8(1), 1, "A")]
    #[case(Field::reg8(1), 9, "?9?")]
    #[case(Field::reg16(2), 2, "DE")]
    #[case(Field::reg16(2), 5, "?5?")]
    #[case(Field::bit(4), 7, "7")]
    fn test_render(#[case] field: Field, #[case] value: u32, #[case] expected: &str) {
        assert_eq!(field.render(value), expected);
    }

    #[test]
    fn test_address_classification() {
        assert!(Field::saddr(0).is_addr());
        assert!(!Field::saddr(0).is_branch());
        assert!(Field::jdisp(0).is_branch());
        assert!(Field::jaddr16(0).is_branch());
        assert!(Field::addr16(0).is_addr());
        assert!(!Field::addr16(0).is_branch());
        assert!(!Field::imm16(0).is_addr());
    }
}
