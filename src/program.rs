//! Per-run disassembly state

use std::collections::{BTreeMap, HashMap};

use crate::image::Image;
use crate::{Address, Decoder, DisassemblyError, Instruction, MAX_INSTRUCTION_SIZE};

/// Bytes at an address that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadData {
    /// Up to `MAX_INSTRUCTION_SIZE` raw bytes starting at the address
    pub bytes: Vec<u8>,
    /// Why decoding stopped here
    pub reason: String,
}

/// Everything known about one image: the decoded instructions, the labels and
/// the places where decoding gave up.
///
/// The maps only ever grow. Strategies are the only writers.
#[derive(Debug, Clone)]
pub struct Program {
    image: Image,
    /// Implicit program counter used by `decode(.., None)`
    pub pc: Address,
    instrs: HashMap<Address, Instruction>,
    discovery: Vec<Address>,
    labels: HashMap<Address, String>,
    bad: BTreeMap<Address, BadData>,
}

impl Program {
    pub fn new(image: Image) -> Self {
        Self {
            image,
            pc: 0,
            instrs: HashMap::new(),
            discovery: Vec::new(),
            labels: HashMap::new(),
            bad: BTreeMap::new(),
        }
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Decode one instruction without recording it.
    ///
    /// With `at == None` the instruction is read at `self.pc` and the counter
    /// moves past it. An explicit address leaves the counter alone.
    pub fn decode(
        &mut self,
        decoder: &dyn Decoder,
        at: Option<Address>,
    ) -> Result<Instruction, DisassemblyError> {
        let addr = at.unwrap_or(self.pc);
        let insn = decoder.decode(&self.image, addr)?;
        if at.is_none() {
            self.pc += insn.size() as Address;
        }
        Ok(insn)
    }

    /// True if an instruction was already recorded at `addr`
    pub fn contains(&self, addr: Address) -> bool {
        self.instrs.contains_key(&addr)
    }

    /// True if any byte in `addr..addr + len` belongs to a recorded instruction
    pub fn overlaps(&self, addr: Address, len: usize) -> bool {
        let end = addr + len as Address;
        let first = addr.saturating_sub(MAX_INSTRUCTION_SIZE as Address - 1);
        (first..end).any(|start| {
            self.instrs
                .get(&start)
                .is_some_and(|insn| insn.fall_through() > addr)
        })
    }

    /// Record a decoded instruction.
    ///
    /// Returns false, leaving the existing entry in place, if the address was
    /// already decoded.
    pub fn insert(&mut self, insn: Instruction) -> bool {
        if self.instrs.contains_key(&insn.pc) {
            return false;
        }
        self.discovery.push(insn.pc);
        self.instrs.insert(insn.pc, insn);
        true
    }

    pub fn instruction(&self, addr: Address) -> Option<&Instruction> {
        self.instrs.get(&addr)
    }

    /// Decoded instructions in no particular order
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instrs.values()
    }

    /// Decoded instructions sorted by address
    pub fn sorted_instructions(&self) -> Vec<&Instruction> {
        let mut insns: Vec<_> = self.instrs.values().collect();
        insns.sort_by_key(|insn| insn.pc);
        insns
    }

    /// Addresses of decoded instructions in the order they were found
    pub fn discovery_order(&self) -> &[Address] {
        &self.discovery
    }

    /// Number of decoded instructions
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Attach a `label_XXXX` label to `addr`. Returns false if it already had one.
    pub fn add_label(&mut self, addr: Address) -> bool {
        if self.labels.contains_key(&addr) {
            return false;
        }
        self.labels.insert(addr, format!("label_{:04X}", addr));
        true
    }

    pub fn label(&self, addr: Address) -> Option<&str> {
        self.labels.get(&addr).map(String::as_str)
    }

    /// Labels sorted by address
    pub fn labels(&self) -> Vec<(Address, &str)> {
        let mut labels: Vec<_> = self
            .labels
            .iter()
            .map(|(&addr, name)| (addr, name.as_str()))
            .collect();
        labels.sort_by_key(|&(addr, _)| addr);
        labels
    }

    /// Record that decoding failed at `addr`. The first reason recorded wins.
    pub fn mark_bad(&mut self, addr: Address, err: &DisassemblyError) {
        let bytes = self.image.window(addr, MAX_INSTRUCTION_SIZE).to_vec();
        self.bad.entry(addr).or_insert_with(|| BadData {
            bytes,
            reason: err.to_string(),
        });
    }

    /// Bad-data markers sorted by address
    pub fn bad_data(&self) -> &BTreeMap<Address, BadData> {
        &self.bad
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::CatalogDecoder;

    fn program(bytes: &[u8]) -> Program {
        Program::new(Image::new(bytes.to_vec()))
    }

    #[test]
    fn test_implicit_pc_advances() {
        // NOP; ADD A, #12H; RET
        let mut program = program(&[0x08, 0x83, 0x12, 0x20]);
        let decoder = CatalogDecoder::new();

        assert_eq!(program.decode(&decoder, None).unwrap().render(), "NOP");
        assert_eq!(program.pc, 1);
        assert_eq!(
            program.decode(&decoder, None).unwrap().render(),
            "ADD A, #12H"
        );
        assert_eq!(program.pc, 3);
        assert_eq!(program.decode(&decoder, None).unwrap().render(), "RET");
        assert_eq!(program.pc, 4);
    }

    #[test]
    fn test_explicit_address_leaves_pc() {
        let mut program = program(&[0x08, 0x83, 0x12, 0x20]);
        let decoder = CatalogDecoder::new();

        let insn = program.decode(&decoder, Some(1)).unwrap();
        assert_eq!(insn.pc, 1);
        assert_eq!(program.pc, 0);
    }

    #[test]
    fn test_failed_decode_leaves_pc() {
        let mut program = program(&[0xFF]);
        let decoder = CatalogDecoder::new();

        assert!(program.decode(&decoder, None).is_err());
        assert_eq!(program.pc, 0);
    }

    #[test]
    fn test_insert_is_monotonic() {
        let mut program = program(&[0x08, 0x08]);
        let decoder = CatalogDecoder::new();

        let first = program.decode(&decoder, Some(1)).unwrap();
        let second = program.decode(&decoder, Some(0)).unwrap();
        assert!(program.insert(first.clone()));
        assert!(program.insert(second));
        assert!(!program.insert(first));

        assert_eq!(program.len(), 2);
        assert!(program.contains(0));
        assert_eq!(program.discovery_order(), &[1, 0]);
        let sorted: Vec<_> = program.sorted_instructions().iter().map(|i| i.pc).collect();
        assert_eq!(sorted, vec![0, 1]);
    }

    #[test]
    fn test_overlaps() {
        // CALL !0808H; RET
        let mut program = program(&[0x22, 0x08, 0x08, 0x20]);
        let decoder = CatalogDecoder::new();
        let call = program.decode(&decoder, Some(0)).unwrap();
        program.insert(call);

        assert!(program.overlaps(0, 1));
        assert!(program.overlaps(2, 1));
        assert!(!program.overlaps(3, 1));
        assert!(program.overlaps(1, 3));
        assert!(!program.overlaps(4, 2));
    }

    #[test]
    fn test_labels() {
        let mut program = program(&[]);

        assert!(program.add_label(0x0123));
        assert!(program.add_label(0x0082));
        assert!(!program.add_label(0x0123));

        assert_eq!(program.label(0x0082), Some("label_0082"));
        assert_eq!(
            program.labels(),
            vec![(0x0082, "label_0082"), (0x0123, "label_0123")]
        );
    }

    #[test]
    fn test_mark_bad_keeps_first_reason() {
        let mut program = program(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        let first = DisassemblyError::NoMatch {
            addr: 1,
            bytes: "FF FF FF FF".to_string(),
        };
        let second = DisassemblyError::OutOfBounds { addr: 1, len: 2 };

        program.mark_bad(1, &first);
        program.mark_bad(1, &second);

        let bad = &program.bad_data()[&1];
        assert_eq!(bad.bytes, vec![0xFF; 4]);
        assert_eq!(bad.reason, first.to_string());
        assert_eq!(program.bad_data().len(), 1);
    }
}
