//! 78K/0S architecture constants and uPD78F9202 name tables.

use std::fmt;

use crate::Address;

/// Start of the reset/interrupt vector table
pub const VECT_BASE: Address = 0x00;
/// Start of the CALLT table
pub const CALLT_BASE: Address = 0x40;
/// Option byte
pub const OPT_BYTE_ADDR: Address = 0x80;
/// Protect byte
pub const PROT_BYTE_ADDR: Address = 0x81;
/// End (exclusive) of the scanned vector range
pub const VECT_END: Address = OPT_BYTE_ADDR;
/// First byte of program code
pub const PROG_BASE: Address = PROT_BYTE_ADDR + 1;
/// Start of the short direct addressing window
pub const SADDR_BASE: Address = 0xFE20;
/// Start of the special function register window
pub const SFR_BASE: Address = 0xFF00;

/// 8-bit single register (r) index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg8 {
    X = 0,
    A = 1,
    C = 2,
    B = 3,
    E = 4,
    D = 5,
    L = 6,
    H = 7,
}

impl Reg8 {
    pub fn from_index(idx: u32) -> Option<Self> {
        Some(match idx {
            0 => Reg8::X,
            1 => Reg8::A,
            2 => Reg8::C,
            3 => Reg8::B,
            4 => Reg8::E,
            5 => Reg8::D,
            6 => Reg8::L,
            7 => Reg8::H,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Reg8::X => "X",
            Reg8::A => "A",
            Reg8::C => "C",
            Reg8::B => "B",
            Reg8::E => "E",
            Reg8::D => "D",
            Reg8::L => "L",
            Reg8::H => "H",
        }
    }
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 16-bit register pair (rp) index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg16 {
    AX = 0,
    BC = 1,
    DE = 2,
    HL = 3,
}

impl Reg16 {
    pub fn from_index(idx: u32) -> Option<Self> {
        Some(match idx {
            0 => Reg16::AX,
            1 => Reg16::BC,
            2 => Reg16::DE,
            3 => Reg16::HL,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Reg16::AX => "AX",
            Reg16::BC => "BC",
            Reg16::DE => "DE",
            Reg16::HL => "HL",
        }
    }
}

impl fmt::Display for Reg16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Interrupt vector slot names, sorted by slot address.
static UPD78F9202_VECT: &[(Address, &str)] = &[
    (0x00, "Reset"),
    (0x02, "Unused1"),
    (0x04, "Unused2"),
    (0x06, "INTLVI"),
    (0x08, "INTP0"),
    (0x0A, "INTP1"),
    (0x0C, "INTTMH1"),
    (0x0E, "INTTM000"),
    (0x10, "INTTM010"),
    (0x12, "INTAD"),
];

/// Special function register names, sorted by address.
static UPD78F9202_SFR: &[(Address, &str)] = &[
    (0xFF02, "P2"),
    (0xFF03, "P3"),
    (0xFF04, "P4"),
    (0xFF0E, "CMP01"),
    (0xFF0F, "CMP11"),
    (0xFF12, "TM00"),
    (0xFF14, "CR000"),
    (0xFF16, "CR010"),
    (0xFF18, "ADCR"),
    (0xFF1A, "ADCRH"),
    (0xFF22, "PM2"),
    (0xFF23, "PM3"),
    (0xFF24, "PM4"),
    (0xFF32, "PU2"),
    (0xFF33, "PU3"),
    (0xFF34, "PU4"),
    (0xFF48, "WDTM"),
    (0xFF49, "WDTE"),
    (0xFF50, "LVIM"),
    (0xFF51, "LVIS"),
    (0xFF54, "RESF"),
    (0xFF58, "LSRCM"),
    (0xFF60, "TMC00"),
    (0xFF61, "PRM00"),
    (0xFF62, "CRC00"),
    (0xFF63, "TOC00"),
    (0xFF70, "TMHMD1"),
    (0xFF80, "ADM"),
    (0xFF81, "ADS"),
    (0xFF84, "PMC2"),
    (0xFFA0, "PFCMD"),
    (0xFFA1, "PFS"),
    (0xFFA2, "FLPMC"),
    (0xFFA3, "FLCMD"),
    (0xFFA4, "FLAPL"),
    (0xFFA5, "FLAPH"),
    (0xFFA6, "FLAPHC"),
    (0xFFA7, "FLAPLC"),
    (0xFFA8, "FLW"),
    (0xFFE0, "IF0"),
    (0xFFE4, "MK0"),
    (0xFFEC, "INTM0"),
    (0xFFF3, "PPCC"),
    (0xFFF4, "OSTS"),
    (0xFFFB, "PCC"),
];

/// CPU registers mapped into the saddr window.
static SPECIAL_REGS: &[(Address, &str)] = &[(0xFF1C, "SP"), (0xFF1E, "PSW")];

fn lookup(table: &'static [(Address, &'static str)], addr: Address) -> Option<&'static str> {
    table
        .binary_search_by_key(&addr, |&(a, _)| a)
        .ok()
        .map(|idx| table[idx].1)
}

/// Name of the interrupt source whose vector lives at `slot`
pub fn vector_name(slot: Address) -> Option<&'static str> {
    lookup(UPD78F9202_VECT, slot)
}

/// Name of the SFR at absolute address `addr`
pub fn sfr_name(addr: Address) -> Option<&'static str> {
    lookup(UPD78F9202_SFR, addr)
}

/// Name of any register (CPU or SFR) mapped at absolute address `addr`
pub fn register_name(addr: Address) -> Option<&'static str> {
    lookup(SPECIAL_REGS, addr).or_else(|| sfr_name(addr))
}
