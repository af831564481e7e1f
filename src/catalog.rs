//! Instruction definitions and the static 78K/0S catalog.
//!
//! There is one [`InstructionDef`] per row of the instruction code list in the
//! 78K/0S manual. Instruction words are compared most significant byte first,
//! the way the manual lists them; data words inside an instruction are little
//! endian and handled by the word fields.
//!
//! The catalog must never let two definitions match the same bytes. A few
//! manual rows (`MOV PSW, #byte`, `MOVW SP, AX`, `EI`, `DI`, the `PSW.bit`
//! forms) are the generic saddr encoding with a fixed address, so they are
//! covered by the saddr rows and show up through the register names of the
//! saddr field. `XCHW AX, rp` is split so that its `rp = AX` slot stays with
//! `XCH A, X`.

use crate::field::Field;
use crate::flow::Flow;

/// Static description of one instruction encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionDef {
    /// Abstract form with operand names, e.g. `MOV r, #byte`
    pub name: &'static str,
    /// Bits the instruction word must carry under `mask`
    pub pattern: u32,
    /// Bits of the instruction word that select this instruction
    pub mask: u32,
    /// Instruction length in bytes (1-4)
    pub len: u8,
    /// Operand fields, in template order
    pub fields: &'static [Field],
    /// How control continues after this instruction
    pub flow: Flow,
    /// Output text; `{n}` is replaced with the n-th rendered operand
    pub template: &'static str,
}

impl InstructionDef {
    pub const fn new(
        name: &'static str,
        pattern: u32,
        mask: u32,
        len: u8,
        fields: &'static [Field],
        template: &'static str,
    ) -> Self {
        assert!(len >= 1 && len as usize <= crate::MAX_INSTRUCTION_SIZE);
        Self {
            name,
            pattern,
            mask,
            len,
            fields,
            flow: Flow::Forward,
            template,
        }
    }

    pub const fn with_flow(self, flow: Flow) -> Self {
        Self { flow, ..self }
    }

    /// True if a `len`-byte instruction word is an instance of this definition
    pub fn matches(&self, word: u32) -> bool {
        (word & self.mask) == (self.pattern & self.mask)
    }

    /// The bare mnemonic, e.g. `MOV`
    pub fn mnemonic(&self) -> &'static str {
        self.name.split_whitespace().next().unwrap_or(self.name)
    }

    /// Fill the template with already rendered operands.
    ///
    /// Placeholders without a matching operand are left as they are.
    pub fn render(&self, operands: &[String]) -> String {
        let mut out = String::with_capacity(self.template.len() + 16);
        let mut rest = self.template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let operand = tail.find('}').and_then(|close| {
                let idx: usize = tail[1..close].parse().ok()?;
                Some((operands.get(idx)?, close))
            });
            match operand {
                Some((text, close)) => {
                    out.push_str(text);
                    rest = &tail[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Whether some byte sequence could match both definitions.
    ///
    /// Definitions of different lengths are compared on their common leading
    /// bytes, which is what the matcher sees at a given address.
    pub fn overlaps(&self, other: &InstructionDef) -> bool {
        let len = self.len.max(other.len);
        let widen = |def: &InstructionDef| {
            let shift = 8 * (len - def.len) as u32;
            (def.pattern << shift, def.mask << shift)
        };
        let (ma, ka) = widen(self);
        let (mb, kb) = widen(other);
        (ma ^ mb) & ka & kb == 0
    }
}

/// Every pair of definitions (by index) that can match the same bytes.
pub fn find_overlaps(defs: &[InstructionDef]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (i, a) in defs.iter().enumerate() {
        for (j, b) in defs.iter().enumerate().skip(i + 1) {
            if a.overlaps(b) {
                out.push((i, j));
            }
        }
    }
    out
}

/// The complete 78K/0S instruction catalog.
#[rustfmt::skip]
pub static CATALOG: &[InstructionDef] = &[
    InstructionDef::new("MOV r, #byte", 0x0A_F1_00, 0xFF_F1_00, 3, &[Field::reg8(9), Field::imm8(0)], "MOV {0}, {1}"),
    InstructionDef::new("MOV saddr, #byte", 0xF5_00_00, 0xFF_00_00, 3, &[Field::saddr(8), Field::imm8(0)], "MOV {0}, {1}"),
    InstructionDef::new("MOV sfr, #byte", 0xF7_00_00, 0xFF_00_00, 3, &[Field::sfr(8), Field::imm8(0)], "MOV {0}, {1}"),
    InstructionDef::new("MOV A, r", 0x0A_21, 0xFF_F1, 2, &[Field::reg8(1)], "MOV A, {0}"),
    InstructionDef::new("MOV r, A", 0x0A_E1, 0xFF_F1, 2, &[Field::reg8(1)], "MOV {0}, A"),
    InstructionDef::new("MOV A, saddr", 0x25_00, 0xFF_00, 2, &[Field::saddr(0)], "MOV A, {0}"),
    InstructionDef::new("MOV saddr, A", 0xE5_00, 0xFF_00, 2, &[Field::saddr(0)], "MOV {0}, A"),
    InstructionDef::new("MOV A, sfr", 0x27_00, 0xFF_00, 2, &[Field::sfr(0)], "MOV A, {0}"),
    InstructionDef::new("MOV sfr, A", 0xE7_00, 0xFF_00, 2, &[Field::sfr(0)], "MOV {0}, A"),
    InstructionDef::new("MOV A, !addr16", 0x29_00_00, 0xFF_00_00, 3, &[Field::addr16(0)], "MOV A, {0}"),
    InstructionDef::new("MOV !addr16, A", 0xE9_00_00, 0xFF_00_00, 3, &[Field::addr16(0)], "MOV {0}, A"),
    InstructionDef::new("MOV A, [DE]", 0x2B, 0xFF, 1, &[], "MOV A, [DE]"),
    InstructionDef::new("MOV [DE], A", 0xEB, 0xFF, 1, &[], "MOV [DE], A"),
    InstructionDef::new("MOV A, [HL]", 0x2F, 0xFF, 1, &[], "MOV A, [HL]"),
    InstructionDef::new("MOV [HL], A", 0xEF, 0xFF, 1, &[], "MOV [HL], A"),
    InstructionDef::new("MOV A, [HL + byte]", 0x2D_00, 0xFF_00, 2, &[Field::imm8(0)], "MOV A, [HL + {0}]"),
    InstructionDef::new("MOV [HL + byte], A", 0xED_00, 0xFF_00, 2, &[Field::imm8(0)], "MOV [HL + {0}], A"),
    InstructionDef::new("XCH A, X", 0xC0, 0xFF, 1, &[], "XCH A, X"),
    InstructionDef::new("XCH A, r", 0x0A_01, 0xFF_F1, 2, &[Field::reg8(1)], "XCH A, {0}"),
    InstructionDef::new("XCH A, saddr", 0x05_00, 0xFF_00, 2, &[Field::saddr(0)], "XCH A, {0}"),
    InstructionDef::new("XCH A, sfr", 0x07_00, 0xFF_00, 2, &[Field::sfr(0)], "XCH A, {0}"),
    InstructionDef::new("XCH A, [DE]", 0x0B, 0xFF, 1, &[], "XCH A, [DE]"),
    InstructionDef::new("XCH A, [HL]", 0x0F, 0xFF, 1, &[], "XCH A, [HL]"),
    InstructionDef::new("XCH A, [HL + byte]", 0x0D_00, 0xFF_00, 2, &[Field::imm8(0)], "XCH A, [HL + {0}]"),
    InstructionDef::new("MOVW rp, #word", 0xF0_00_00, 0xF3_00_00, 3, &[Field::reg16(18), Field::imm16(0)], "MOVW {0}, {1}"),
    InstructionDef::new("MOVW AX, saddrp", 0xD6_00, 0xFF_00, 2, &[Field::saddr(0)], "MOVW AX, {0}"),
    InstructionDef::new("MOVW saddrp, AX", 0xE6_00, 0xFF_00, 2, &[Field::saddr(0)], "MOVW {0}, AX"),
    InstructionDef::new("MOVW AX, rp", 0xD0, 0xF3, 1, &[Field::reg16(2)], "MOVW AX, {0}"),
    InstructionDef::new("MOVW rp, AX", 0xE0, 0xF3, 1, &[Field::reg16(2)], "MOVW {0}, AX"),
    InstructionDef::new("XCHW AX, rp", 0xC4, 0xF7, 1, &[Field::reg16(2)], "XCHW AX, {0}"),
    InstructionDef::new("XCHW AX, rp", 0xC8, 0xFF, 1, &[Field::reg16(2)], "XCHW AX, {0}"),
    InstructionDef::new("ADD A, #byte", 0x83_00, 0xFF_00, 2, &[Field::imm8(0)], "ADD A, {0}"),
    InstructionDef::new("ADD saddr, #byte", 0x81_00_00, 0xFF_00_00, 3, &[Field::saddr(8), Field::imm8(0)], "ADD {0}, {1}"),
    InstructionDef::new("ADD A, r", 0x0A_81, 0xFF_F1, 2, &[Field::reg8(1)], "ADD A, {0}"),
    InstructionDef::new("ADD A, saddr", 0x85_00, 0xFF_00, 2, &[Field::saddr(0)], "ADD A, {0}"),
    InstructionDef::new("ADD A, !addr16", 0x89_00_00, 0xFF_00_00, 3, &[Field::addr16(0)], "ADD A, {0}"),
    InstructionDef::new("ADD A, [HL]", 0x8F, 0xFF, 1, &[], "ADD A, [HL]"),
    InstructionDef::new("ADD A, [HL + byte]", 0x8D_00, 0xFF_00, 2, &[Field::imm8(0)], "ADD A, [HL + {0}]"),
    InstructionDef::new("ADDC A, #byte", 0xA3_00, 0xFF_00, 2, &[Field::imm8(0)], "ADDC A, {0}"),
    InstructionDef::new("ADDC saddr, #byte", 0xA1_00_00, 0xFF_00_00, 3, &[Field::saddr(8), Field::imm8(0)], "ADDC {0}, {1}"),
    InstructionDef::new("ADDC A, r", 0x0A_A1, 0xFF_F1, 2, &[Field::reg8(1)], "ADDC A, {0}"),
    InstructionDef::new("ADDC A, saddr", 0xA5_00, 0xFF_00, 2, &[Field::saddr(0)], "ADDC A, {0}"),
    InstructionDef::new("ADDC A, !addr16", 0xA9_00_00, 0xFF_00_00, 3, &[Field::addr16(0)], "ADDC A, {0}"),
    InstructionDef::new("ADDC A, [HL]", 0xAF, 0xFF, 1, &[], "ADDC A, [HL]"),
    InstructionDef::new("ADDC A, [HL + byte]", 0xAD_00, 0xFF_00, 2, &[Field::imm8(0)], "ADDC A, [HL + {0}]"),
    InstructionDef::new("SUB A, #byte", 0x93_00, 0xFF_00, 2, &[Field::imm8(0)], "SUB A, {0}"),
    InstructionDef::new("SUB saddr, #byte", 0x91_00_00, 0xFF_00_00, 3, &[Field::saddr(8), Field::imm8(0)], "SUB {0}, {1}"),
    InstructionDef::new("SUB A, r", 0x0A_91, 0xFF_F1, 2, &[Field::reg8(1)], "SUB A, {0}"),
    InstructionDef::new("SUB A, saddr", 0x95_00, 0xFF_00, 2, &[Field::saddr(0)], "SUB A, {0}"),
    InstructionDef::new("SUB A, !addr16", 0x99_00_00, 0xFF_00_00, 3, &[Field::addr16(0)], "SUB A, {0}"),
    InstructionDef::new("SUB A, [HL]", 0x9F, 0xFF, 1, &[], "SUB A, [HL]"),
    InstructionDef::new("SUB A, [HL + byte]", 0x9D_00, 0xFF_00, 2, &[Field::imm8(0)], "SUB A, [HL + {0}]"),
    InstructionDef::new("SUBC A, #byte", 0xB3_00, 0xFF_00, 2, &[Field::imm8(0)], "SUBC A, {0}"),
    InstructionDef::new("SUBC saddr, #byte", 0xB1_00_00, 0xFF_00_00, 3, &[Field::saddr(8), Field::imm8(0)], "SUBC {0}, {1}"),
    InstructionDef::new("SUBC A, r", 0x0A_B1, 0xFF_F1, 2, &[Field::reg8(1)], "SUBC A, {0}"),
    InstructionDef::new("SUBC A, saddr", 0xB5_00, 0xFF_00, 2, &[Field::saddr(0)], "SUBC A, {0}"),
    InstructionDef::new("SUBC A, !addr16", 0xB9_00_00, 0xFF_00_00, 3, &[Field::addr16(0)], "SUBC A, {0}"),
    InstructionDef::new("SUBC A, [HL]", 0xBF, 0xFF, 1, &[], "SUBC A, [HL]"),
    InstructionDef::new("SUBC A, [HL + byte]", 0xBD_00, 0xFF_00, 2, &[Field::imm8(0)], "SUBC A, [HL + {0}]"),
    InstructionDef::new("AND A, #byte", 0x63_00, 0xFF_00, 2, &[Field::imm8(0)], "AND A, {0}"),
    InstructionDef::new("AND saddr, #byte", 0x61_00_00, 0xFF_00_00, 3, &[Field::saddr(8), Field::imm8(0)], "AND {0}, {1}"),
    InstructionDef::new("AND A, r", 0x0A_61, 0xFF_F1, 2, &[Field::reg8(1)], "AND A, {0}"),
    InstructionDef::new("AND A, saddr", 0x65_00, 0xFF_00, 2, &[Field::saddr(0)], "AND A, {0}"),
    InstructionDef::new("AND A, !addr16", 0x69_00_00, 0xFF_00_00, 3, &[Field::addr16(0)], "AND A, {0}"),
    InstructionDef::new("AND A, [HL]", 0x6F, 0xFF, 1, &[], "AND A, [HL]"),
    InstructionDef::new("AND A, [HL + byte]", 0x6D_00, 0xFF_00, 2, &[Field::imm8(0)], "AND A, [HL + {0}]"),
    InstructionDef::new("OR A, #byte", 0x73_00, 0xFF_00, 2, &[Field::imm8(0)], "OR A, {0}"),
    InstructionDef::new("OR saddr, #byte", 0x71_00_00, 0xFF_00_00, 3, &[Field::saddr(8), Field::imm8(0)], "OR {0}, {1}"),
    InstructionDef::new("OR A, r", 0x0A_71, 0xFF_F1, 2, &[Field::reg8(1)], "OR A, {0}"),
    InstructionDef::new("OR A, saddr", 0x75_00, 0xFF_00, 2, &[Field::saddr(0)], "OR A, {0}"),
    InstructionDef::new("OR A, !addr16", 0x79_00_00, 0xFF_00_00, 3, &[Field::addr16(0)], "OR A, {0}"),
    InstructionDef::new("OR A, [HL]", 0x7F, 0xFF, 1, &[], "OR A, [HL]"),
    InstructionDef::new("OR A, [HL + byte]", 0x7D_00, 0xFF_00, 2, &[Field::imm8(0)], "OR A, [HL + {0}]"),
    InstructionDef::new("XOR A, #byte", 0x43_00, 0xFF_00, 2, &[Field::imm8(0)], "XOR A, {0}"),
    InstructionDef::new("XOR saddr, #byte", 0x41_00_00, 0xFF_00_00, 3, &[Field::saddr(8), Field::imm8(0)], "XOR {0}, {1}"),
    InstructionDef::new("XOR A, r", 0x0A_41, 0xFF_F1, 2, &[Field::reg8(1)], "XOR A, {0}"),
    InstructionDef::new("XOR A, saddr", 0x45_00, 0xFF_00, 2, &[Field::saddr(0)], "XOR A, {0}"),
    InstructionDef::new("XOR A, !addr16", 0x49_00_00, 0xFF_00_00, 3, &[Field::addr16(0)], "XOR A, {0}"),
    InstructionDef::new("XOR A, [HL]", 0x4F, 0xFF, 1, &[], "XOR A, [HL]"),
    InstructionDef::new("XOR A, [HL + byte]", 0x4D_00, 0xFF_00, 2, &[Field::imm8(0)], "XOR A, [HL + {0}]"),
    InstructionDef::new("CMP A, #byte", 0x13_00, 0xFF_00, 2, &[Field::imm8(0)], "CMP A, {0}"),
    InstructionDef::new("CMP saddr, #byte", 0x11_00_00, 0xFF_00_00, 3, &[Field::saddr(8), Field::imm8(0)], "CMP {0}, {1}"),
    InstructionDef::new("CMP A, r", 0x0A_11, 0xFF_F1, 2, &[Field::reg8(1)], "CMP A, {0}"),
    InstructionDef::new("CMP A, saddr", 0x15_00, 0xFF_00, 2, &[Field::saddr(0)], "CMP A, {0}"),
    InstructionDef::new("CMP A, !addr16", 0x19_00_00, 0xFF_00_00, 3, &[Field::addr16(0)], "CMP A, {0}"),
    InstructionDef::new("CMP A, [HL]", 0x1F, 0xFF, 1, &[], "CMP A, [HL]"),
    InstructionDef::new("CMP A, [HL + byte]", 0x1D_00, 0xFF_00, 2, &[Field::imm8(0)], "CMP A, [HL + {0}]"),
    InstructionDef::new("ADDW AX, #word", 0xD2_00_00, 0xFF_00_00, 3, &[Field::imm16(0)], "ADDW AX, {0}"),
    InstructionDef::new("SUBW AX, #word", 0xC2_00_00, 0xFF_00_00, 3, &[Field::imm16(0)], "SUBW AX, {0}"),
    InstructionDef::new("CMPW AX, #word", 0xE2_00_00, 0xFF_00_00, 3, &[Field::imm16(0)], "CMPW AX, {0}"),
    InstructionDef::new("INC r", 0x0A_C1, 0xFF_F1, 2, &[Field::reg8(1)], "INC {0}"),
    InstructionDef::new("INC saddr", 0xC5_00, 0xFF_00, 2, &[Field::saddr(0)], "INC {0}"),
    InstructionDef::new("DEC r", 0x0A_D1, 0xFF_F1, 2, &[Field::reg8(1)], "DEC {0}"),
    InstructionDef::new("DEC saddr", 0xD5_00, 0xFF_00, 2, &[Field::saddr(0)], "DEC {0}"),
    InstructionDef::new("INCW rp", 0x80, 0xF3, 1, &[Field::reg16(2)], "INCW {0}"),
    InstructionDef::new("DECW rp", 0x90, 0xF3, 1, &[Field::reg16(2)], "DECW {0}"),
    InstructionDef::new("ROR A, 1", 0x00, 0xFF, 1, &[], "ROR A, 1"),
    InstructionDef::new("ROL A, 1", 0x10, 0xFF, 1, &[], "ROL A, 1"),
    InstructionDef::new("RORC A, 1", 0x02, 0xFF, 1, &[], "RORC A, 1"),
    InstructionDef::new("ROLC A, 1", 0x12, 0xFF, 1, &[], "ROLC A, 1"),
    InstructionDef::new("SET1 saddr.bit", 0x0A_0A_00, 0xFF_8F_00, 3, &[Field::bit(12), Field::saddr(0)], "SET1 {1}.{0}"),
    InstructionDef::new("SET1 sfr.bit", 0x0A_06_00, 0xFF_8F_00, 3, &[Field::bit(12), Field::sfr(0)], "SET1 {1}.{0}"),
    InstructionDef::new("SET1 A.bit", 0x0A_02, 0xFF_8F, 2, &[Field::bit(4)], "SET1 A.{0}"),
    InstructionDef::new("SET1 [HL].bit", 0x0A_0E, 0xFF_8F, 2, &[Field::bit(4)], "SET1 [HL].{0}"),
    InstructionDef::new("CLR1 saddr.bit", 0x0A_8A_00, 0xFF_8F_00, 3, &[Field::bit(12), Field::saddr(0)], "CLR1 {1}.{0}"),
    InstructionDef::new("CLR1 sfr.bit", 0x0A_86_00, 0xFF_8F_00, 3, &[Field::bit(12), Field::sfr(0)], "CLR1 {1}.{0}"),
    InstructionDef::new("CLR1 A.bit", 0x0A_82, 0xFF_8F, 2, &[Field::bit(4)], "CLR1 A.{0}"),
    InstructionDef::new("CLR1 [HL].bit", 0x0A_8E, 0xFF_8F, 2, &[Field::bit(4)], "CLR1 [HL].{0}"),
    InstructionDef::new("SET1 CY", 0x14, 0xFF, 1, &[], "SET1 CY"),
    InstructionDef::new("CLR1 CY", 0x04, 0xFF, 1, &[], "CLR1 CY"),
    InstructionDef::new("NOT1 CY", 0x06, 0xFF, 1, &[], "NOT1 CY"),
    InstructionDef::new("CALL !addr16", 0x22_00_00, 0xFF_00_00, 3, &[Field::jaddr16(0)], "CALL {0}")
        .with_flow(Flow::CallReturn(0)),
    InstructionDef::new("CALLT [addr5]", 0x40, 0xC1, 1, &[Field::addr5(1)], "CALLT {0}")
        .with_flow(Flow::ComputedCallT(0)),
    InstructionDef::new("RET", 0x20, 0xFF, 1, &[], "RET")
        .with_flow(Flow::Return),
    InstructionDef::new("RETI", 0x24, 0xFF, 1, &[], "RETI")
        .with_flow(Flow::Return),
    InstructionDef::new("PUSH PSW", 0x2E, 0xFF, 1, &[], "PUSH PSW"),
    InstructionDef::new("PUSH rp", 0xA2, 0xF3, 1, &[Field::reg16(2)], "PUSH {0}"),
    InstructionDef::new("POP PSW", 0x2C, 0xFF, 1, &[], "POP PSW"),
    InstructionDef::new("POP rp", 0xA0, 0xF3, 1, &[Field::reg16(2)], "POP {0}"),
    InstructionDef::new("BR !addr16", 0xB2_00_00, 0xFF_00_00, 3, &[Field::jaddr16(0)], "BR {0}")
        .with_flow(Flow::UnconditionalBranch(0)),
    InstructionDef::new("BR $addr16", 0x30_00, 0xFF_00, 2, &[Field::jdisp(0)], "BR {0}")
        .with_flow(Flow::UnconditionalBranch(0)),
    InstructionDef::new("BR AX", 0xB0, 0xFF, 1, &[], "BR AX")
        .with_flow(Flow::ComputedUnknown),
    InstructionDef::new("BC $addr16", 0x38_00, 0xFF_00, 2, &[Field::jdisp(0)], "BC {0}")
        .with_flow(Flow::ConditionalBranch(0)),
    InstructionDef::new("BNC $addr16", 0x3A_00, 0xFF_00, 2, &[Field::jdisp(0)], "BNC {0}")
        .with_flow(Flow::ConditionalBranch(0)),
    InstructionDef::new("BZ $addr16", 0x3C_00, 0xFF_00, 2, &[Field::jdisp(0)], "BZ {0}")
        .with_flow(Flow::ConditionalBranch(0)),
    InstructionDef::new("BNZ $addr16", 0x3E_00, 0xFF_00, 2, &[Field::jdisp(0)], "BNZ {0}")
        .with_flow(Flow::ConditionalBranch(0)),
    InstructionDef::new("BT saddr.bit, $addr16", 0x0A_88_00_00, 0xFF_8F_00_00, 4, &[Field::bit(20), Field::saddr(8), Field::jdisp(0)], "BT {1}.{0}, {2}")
        .with_flow(Flow::ConditionalBranch(2)),
    InstructionDef::new("BT sfr.bit, $addr16", 0x0A_84_00_00, 0xFF_8F_00_00, 4, &[Field::bit(20), Field::sfr(8), Field::jdisp(0)], "BT {1}.{0}, {2}")
        .with_flow(Flow::ConditionalBranch(2)),
    InstructionDef::new("BT A.bit, $addr16", 0x0A_80_00, 0xFF_8F_00, 3, &[Field::bit(12), Field::jdisp(0)], "BT A.{0}, {1}")
        .with_flow(Flow::ConditionalBranch(1)),
    InstructionDef::new("BF saddr.bit, $addr16", 0x0A_08_00_00, 0xFF_8F_00_00, 4, &[Field::bit(20), Field::saddr(8), Field::jdisp(0)], "BF {1}.{0}, {2}")
        .with_flow(Flow::ConditionalBranch(2)),
    InstructionDef::new("BF sfr.bit, $addr16", 0x0A_04_00_00, 0xFF_8F_00_00, 4, &[Field::bit(20), Field::sfr(8), Field::jdisp(0)], "BF {1}.{0}, {2}")
        .with_flow(Flow::ConditionalBranch(2)),
    InstructionDef::new("BF A.bit, $addr16", 0x0A_00_00, 0xFF_8F_00, 3, &[Field::bit(12), Field::jdisp(0)], "BF A.{0}, {1}")
        .with_flow(Flow::ConditionalBranch(1)),
    InstructionDef::new("DBNZ B, $addr16", 0x36_00, 0xFF_00, 2, &[Field::jdisp(0)], "DBNZ B, {0}")
        .with_flow(Flow::ConditionalBranch(0)),
    InstructionDef::new("DBNZ C, $addr16", 0x34_00, 0xFF_00, 2, &[Field::jdisp(0)], "DBNZ C, {0}")
        .with_flow(Flow::ConditionalBranch(0)),
    InstructionDef::new("DBNZ saddr, $addr16", 0x32_00_00, 0xFF_00_00, 3, &[Field::saddr(8), Field::jdisp(0)], "DBNZ {0}, {1}")
        .with_flow(Flow::ConditionalBranch(1)),
    InstructionDef::new("NOP", 0x08, 0xFF, 1, &[], "NOP"),
    InstructionDef::new("HALT", 0x0C, 0xFF, 1, &[], "HALT"),
    InstructionDef::new("STOP", 0x0E, 0xFF, 1, &[], "STOP"),
];
