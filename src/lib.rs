//! Core IR, traits, and errors for the k0s_decay 78K/0S disassembler.
//!
//! This library decodes raw flash images for the NEC 78K/0S instruction set and
//! recovers a flow-annotated listing. Instructions are matched against a static
//! catalog of encodings, operands are normalized into absolute addresses, and
//! control flow is followed from the reset and interrupt vectors to discover
//! every reachable instruction.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use k0s_decay::{
//!     decoder::CatalogDecoder,
//!     format::OutputFormat,
//!     image::Image,
//!     program::Program,
//!     strategy::Strategy,
//! };
//!
//! // Load the raw flash contents
//! let image = Image::open("path/to/firmware.bin").unwrap();
//! let mut program = Program::new(image);
//!
//! // Follow control flow from every populated interrupt vector
//! let decoder = CatalogDecoder::new();
//! Strategy::Recursive.run(&mut program, &decoder).unwrap();
//!
//! // Render the listing
//! let listing = OutputFormat::Text.get_formatter().format(&program).unwrap();
//! println!("{}", listing);
//! ```

pub mod image;
pub mod chip;
pub mod field;
pub mod flow;
pub mod catalog;
pub mod decoder;
pub mod program;
pub mod strategy;
pub mod format;
#[cfg(feature = "extension-module")]
pub mod python;

/// Represents an absolute byte address in the flash image
pub type Address = u32;

use std::fmt;

use catalog::InstructionDef;
use field::Operand;
use image::Image;

/// Maximum instruction size in bytes
pub const MAX_INSTRUCTION_SIZE: usize = 4;

/// Diagnostic attached to an instruction during flow analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    /// Informational remark (e.g. a statically read call table entry)
    Info(String),
    /// Control flow could not be fully resolved here
    Warning(String),
}

impl Note {
    /// Returns true if this note flags an incomplete control flow graph
    pub fn is_warning(&self) -> bool {
        matches!(self, Note::Warning(_))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Note::Info(text) => write!(f, "INFO: {}", text),
            Note::Warning(text) => write!(f, "WARNING: {}", text),
        }
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The catalog entry this instruction matched
    pub def: InstructionDef,
    /// Raw instruction word, most significant byte first
    pub word: u32,
    /// Address of the first byte of the instruction
    pub pc: Address,
    /// Operand values, in the order of `def.fields`
    pub operands: Vec<Operand>,
    /// Successor addresses; the fall-through comes first when present
    pub next: Vec<Address>,
    /// Notes or warnings from flow analysis
    pub notes: Vec<Note>,
    /// Raw bytes of the instruction (up to MAX_INSTRUCTION_SIZE)
    pub bytes: [u8; MAX_INSTRUCTION_SIZE],
}

impl Instruction {
    /// Build an instruction from a matched word, resolving every operand.
    ///
    /// Successors are left empty; the decoder fills them in by running the
    /// definition's flow once the instruction is complete.
    pub fn new(def: InstructionDef, word: u32, pc: Address) -> Self {
        let operands = def
            .fields
            .iter()
            .map(|field| field.operand(word, pc, def.len))
            .collect();

        let mut bytes = [0u8; MAX_INSTRUCTION_SIZE];
        let len = def.len as usize;
        for (i, byte) in bytes.iter_mut().enumerate().take(len) {
            *byte = (word >> (8 * (len - 1 - i))) as u8;
        }

        Self {
            def,
            word,
            pc,
            operands,
            next: Vec::new(),
            notes: Vec::new(),
            bytes,
        }
    }

    /// Size of the instruction in bytes
    pub fn size(&self) -> u8 {
        self.def.len
    }

    /// Returns the instruction bytes, up to the actual instruction size.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.def.len as usize]
    }

    /// Address of the linearly next instruction
    pub fn fall_through(&self) -> Address {
        self.pc + self.def.len as Address
    }

    /// Instruction mnemonic (e.g. "MOV", "BR")
    pub fn mnemonic(&self) -> &'static str {
        self.def.mnemonic()
    }

    /// Operand by position in the field list
    pub fn operand(&self, idx: usize) -> Option<&Operand> {
        self.operands.get(idx)
    }

    /// Render the instruction text with operand values filled in.
    pub fn render(&self) -> String {
        let rendered: Vec<String> = self.operands.iter().map(Operand::render).collect();
        self.def.render(&rendered)
    }

    /// Returns true if flow analysis left a warning on this instruction
    pub fn has_warnings(&self) -> bool {
        self.notes.iter().any(Note::is_warning)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Decoder trait: turns the bytes at one address into an instruction.
pub trait Decoder: Send + Sync {
    /// Decode a single instruction at `at`.
    ///
    /// # Arguments
    /// * `image` - The flash image to decode
    /// * `at` - Absolute address into the image
    ///
    /// # Returns
    /// The decoded instruction with its successors resolved, or the reason no
    /// single instruction could be decoded there
    fn decode(&self, image: &Image, at: Address) -> Result<Instruction, DisassemblyError>;
}

/// Format a byte run as space-separated uppercase hex
pub fn fmt_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Error type for disassembly operations
#[derive(Debug, thiserror::Error)]
pub enum DisassemblyError {
    /// A read reached past the end of the image
    #[error("Address OOB for {len}-byte read: 0x{addr:04X}")]
    OutOfBounds { addr: Address, len: usize },

    /// No catalog entry matches the bytes at this address
    #[error("Could not match instruction data at 0x{addr:04X}: {bytes} ...")]
    NoMatch { addr: Address, bytes: String },

    /// More than one catalog entry matches; the catalog itself is broken
    #[error("Multiple matches for instruction data at 0x{addr:04X}: {}", .candidates.join(" | "))]
    AmbiguousCatalog {
        addr: Address,
        candidates: Vec<&'static str>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Generic(String),
}

impl DisassemblyError {
    /// Returns true if the error only invalidates the current address.
    ///
    /// Traversal turns these into bad-data markers and keeps going; anything
    /// else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DisassemblyError::OutOfBounds { .. } | DisassemblyError::NoMatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::flow::Flow;

    const CALL: InstructionDef = InstructionDef::new(
        "CALL !addr16",
        0x22_00_00,
        0xFF_00_00,
        3,
        &[Field::jaddr16(0)],
        "CALL {0}",
    )
    .with_flow(Flow::CallReturn(0));

    #[test]
    fn test_instruction_bytes() {
        let insn = Instruction::new(CALL, 0x22_34_12, 0x0100);

        assert_eq!(insn.bytes(), &[0x22, 0x34, 0x12]);
        assert_eq!(insn.size(), 3);
        assert_eq!(insn.fall_through(), 0x0103);
    }

    #[test]
    fn test_instruction_render() {
        let insn = Instruction::new(CALL, 0x22_34_12, 0x0100);

        assert_eq!(insn.mnemonic(), "CALL");
        assert_eq!(insn.render(), "CALL !1234H");
        assert_eq!(insn.to_string(), "CALL !1234H");
        assert_eq!(insn.operand(0).map(|op| op.value), Some(0x1234));
        assert!(insn.operand(1).is_none());
    }

    #[test]
    fn test_notes() {
        let info = Note::Info("Initial CALLT[40H] -> !0082H".to_string());
        let warn = Note::Warning("Computed branch unknown.".to_string());

        assert_eq!(info.to_string(), "INFO: Initial CALLT[40H] -> !0082H");
        assert_eq!(warn.to_string(), "WARNING: Computed branch unknown.");
        assert!(!info.is_warning());
        assert!(warn.is_warning());
    }

    #[test]
    fn test_error_classification() {
        let oob = DisassemblyError::OutOfBounds { addr: 0x10, len: 2 };
        let no_match = DisassemblyError::NoMatch {
            addr: 0x10,
            bytes: "FF FF".to_string(),
        };
        let ambiguous = DisassemblyError::AmbiguousCatalog {
            addr: 0x10,
            candidates: vec!["NOP", "HALT"],
        };

        assert!(oob.is_recoverable());
        assert!(no_match.is_recoverable());
        assert!(!ambiguous.is_recoverable());
        assert_eq!(
            ambiguous.to_string(),
            "Multiple matches for instruction data at 0x0010: NOP | HALT"
        );
    }

    #[test]
    fn test_fmt_hex() {
        assert_eq!(fmt_hex(&[0x0A, 0xF1, 0x12]), "0A F1 12");
        assert_eq!(fmt_hex(&[]), "");
    }
}
