//! Catalog-driven instruction matcher.

use std::fmt;

use crate::catalog::{InstructionDef, CATALOG};
use crate::image::Image;
use crate::{fmt_hex, Address, Decoder, DisassemblyError, Instruction, MAX_INSTRUCTION_SIZE};

/// A decoder that matches image bytes against a table of instruction
/// definitions.
///
/// Exactly one definition has to match at an address. No match means the bytes
/// are not code; more than one means the table itself is wrong, and that is
/// reported instead of picking a winner.
#[derive(Debug, Clone)]
pub struct CatalogDecoder {
    defs: Vec<InstructionDef>,
}

impl CatalogDecoder {
    /// Decoder over the full 78K/0S catalog
    pub fn new() -> Self {
        Self::with_catalog(CATALOG.to_vec())
    }

    /// Decoder over a custom set of definitions
    pub fn with_catalog(defs: Vec<InstructionDef>) -> Self {
        Self { defs }
    }

    /// The definitions this decoder matches against
    pub fn definitions(&self) -> &[InstructionDef] {
        &self.defs
    }

    /// Every definition matching the bytes at `at`, with its instruction word.
    fn candidates(&self, image: &Image, at: Address) -> Vec<(&InstructionDef, u32)> {
        self.defs
            .iter()
            .filter_map(|def| {
                // Too few bytes left for this length is simply a miss
                let word = image.read_be(at, def.len)?;
                def.matches(word).then_some((def, word))
            })
            .collect()
    }
}

impl Default for CatalogDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CatalogDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CatalogDecoder ({} definitions)", self.defs.len())
    }
}

impl Decoder for CatalogDecoder {
    fn decode(&self, image: &Image, at: Address) -> Result<Instruction, DisassemblyError> {
        let mut found = self.candidates(image, at);

        let (def, word) = match found.len() {
            0 => {
                return Err(DisassemblyError::NoMatch {
                    addr: at,
                    bytes: fmt_hex(image.window(at, MAX_INSTRUCTION_SIZE)),
                })
            }
            1 => found.remove(0),
            _ => {
                return Err(DisassemblyError::AmbiguousCatalog {
                    addr: at,
                    candidates: found.iter().map(|(def, _)| def.name).collect(),
                })
            }
        };

        let mut insn = Instruction::new(*def, word, at);
        insn.next = def.flow.next(&mut insn, image)?;
        log::trace!("0x{:04X}: {} -> {:04X?}", at, insn, insn.next);

        Ok(insn)
    }
}
