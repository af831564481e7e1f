//! Disassembly strategies

use std::fmt;
use clap::ValueEnum;
use crate::chip::PROG_BASE;
use crate::program::Program;
use crate::{Address, Decoder, DisassemblyError};

/// Available disassembly strategies.
#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Recursive descent from the vector table (control flow analysis)
    #[default]
    Recursive,
    /// Linear sweep over the program area
    Linear,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Recursive => write!(f, "Recursive descent"),
            Strategy::Linear => write!(f, "Linear sweep"),
        }
    }
}

impl Strategy {
    /// Run the selected strategy over `program` from its default starting points.
    ///
    /// Recursive descent starts at every populated vector; the linear sweep
    /// starts at the beginning of program code.
    pub fn run(&self, program: &mut Program, decoder: &dyn Decoder) -> Result<(), DisassemblyError> {
        let entries = match self {
            Strategy::Recursive => program.image().entry_points(),
            Strategy::Linear => vec![PROG_BASE],
        };
        self.run_from(program, decoder, &entries)
    }

    /// Run the selected strategy from explicit start addresses
    pub fn run_from(
        &self,
        program: &mut Program,
        decoder: &dyn Decoder,
        entries: &[Address],
    ) -> Result<(), DisassemblyError> {
        match self {
            Strategy::Recursive => recursive::run(program, decoder, entries),
            Strategy::Linear => linear::run(program, decoder, entries),
        }
    }

    /// Return all available strategies
    pub fn all() -> &'static [Strategy] {
        &[Strategy::Recursive, Strategy::Linear]
    }
}

pub mod linear;
pub mod recursive;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::CatalogDecoder;
    use crate::image::Image;

    /// Reset vector to 0x0082, program NOP; RET, then padding
    fn image() -> Image {
        let mut bytes = vec![0xFF; 0x90];
        bytes[0x00..0x02].copy_from_slice(&[0x82, 0x00]);
        bytes[0x82] = 0x08;
        bytes[0x83] = 0x20;
        Image::new(bytes)
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Linear.to_string(), "Linear sweep");
        assert_eq!(Strategy::Recursive.to_string(), "Recursive descent");
        assert_eq!(Strategy::default(), Strategy::Recursive);
        assert_eq!(Strategy::all().len(), 2);
    }

    #[test]
    fn test_recursive_strategy_uses_vectors() {
        let mut program = Program::new(image());
        let decoder = CatalogDecoder::new();

        Strategy::Recursive.run(&mut program, &decoder).unwrap();

        assert_eq!(program.len(), 2);
        assert_eq!(program.instruction(0x82).unwrap().mnemonic(), "NOP");
        assert_eq!(program.instruction(0x83).unwrap().mnemonic(), "RET");
        assert!(program.bad_data().is_empty());
    }

    #[test]
    fn test_linear_strategy_starts_at_program_base() {
        let mut program = Program::new(image());
        let decoder = CatalogDecoder::new();

        Strategy::Linear.run(&mut program, &decoder).unwrap();

        // The vector table and option bytes are not swept
        assert!(!program.contains(0x00));
        assert!(program.contains(0x82));
        assert!(program.contains(0x83));
        // The 0xFF padding is one bad run
        assert_eq!(program.bad_data().keys().copied().collect::<Vec<_>>(), vec![0x84]);
    }
}
