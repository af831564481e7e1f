//! CSV output formatter

use serde::Serialize;

use crate::program::Program;
use crate::{fmt_hex, DisassemblyError};
use super::{listing, DisassemblyFormatter, Entry};

/// One CSV row. Labels are folded into the row of the address they mark.
#[derive(Serialize)]
struct CsvRow {
    kind: &'static str,
    address: String,
    label: String,
    size: usize,
    mnemonic: String,
    text: String,
    bytes: String,
    successors: String,
    notes: String,
}

fn csv_error<E: std::fmt::Display>(e: E) -> DisassemblyError {
    DisassemblyError::Generic(format!("CSV serialization error: {}", e))
}

impl DisassemblyFormatter for super::CsvFormatter {
    fn format(&self, program: &Program) -> Result<String, DisassemblyError> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        for entry in listing(program) {
            let row = match entry {
                // Emitted together with the instruction or marker that follows
                Entry::Label(..) => continue,
                Entry::Instruction(insn) => CsvRow {
                    kind: "instruction",
                    address: format!("0x{:04X}", insn.pc),
                    label: program.label(insn.pc).unwrap_or_default().to_string(),
                    size: insn.bytes().len(),
                    mnemonic: insn.mnemonic().to_string(),
                    text: insn.render(),
                    bytes: fmt_hex(insn.bytes()),
                    successors: insn
                        .next
                        .iter()
                        .map(|succ| format!("0x{:04X}", succ))
                        .collect::<Vec<_>>()
                        .join(" "),
                    notes: insn
                        .notes
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; "),
                },
                Entry::Bad(addr, bad) => CsvRow {
                    kind: "bad_data",
                    address: format!("0x{:04X}", addr),
                    label: program.label(addr).unwrap_or_default().to_string(),
                    size: bad.bytes.len(),
                    mnemonic: String::new(),
                    text: String::new(),
                    bytes: fmt_hex(&bad.bytes),
                    successors: String::new(),
                    notes: bad.reason.clone(),
                },
            };
            writer.serialize(row).map_err(csv_error)?;
        }

        let data = writer.into_inner().map_err(csv_error)?;
        String::from_utf8(data).map_err(csv_error)
    }
}
