//! Output format module implementation

mod json;
mod csv;

use crate::program::{BadData, Program};
use crate::{fmt_hex, Address, DisassemblyError, Instruction};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use clap::ValueEnum;

/// Supported output formats for disassembly results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Assembly listing (default)
    #[default]
    Text,
    /// JSON format (one document)
    Json,
    /// JSON Lines format (one JSON object per line)
    JsonLines,
    /// CSV format (comma-separated values)
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonLines => write!(f, "jsonl"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "jsonlines" | "json-lines" => Ok(OutputFormat::JsonLines),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl OutputFormat {
    /// Get all available output formats
    pub fn available_formats() -> &'static [Self] {
        &[
            OutputFormat::Text,
            OutputFormat::Json,
            OutputFormat::JsonLines,
            OutputFormat::Csv,
        ]
    }

    /// Get a formatter for this output format
    pub fn get_formatter(&self) -> Box<dyn DisassemblyFormatter> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::JsonLines => Box::new(JsonLinesFormatter),
            OutputFormat::Csv => Box::new(CsvFormatter),
        }
    }
}

/// Formatter trait for disassembly output
pub trait DisassemblyFormatter {
    /// Format everything recorded in `program`
    fn format(&self, program: &Program) -> Result<String, DisassemblyError>;
}

/// Format disassembly as an assembly listing
pub struct TextFormatter;

/// Format disassembly in JSON
pub struct JsonFormatter;

/// Format disassembly in JSON Lines
pub struct JsonLinesFormatter;

/// Format disassembly in CSV
pub struct CsvFormatter;

/// One line-level item of a listing.
pub(crate) enum Entry<'a> {
    Label(Address, &'a str),
    Instruction(&'a Instruction),
    Bad(Address, &'a BadData),
}

/// Labels, instructions and bad-data markers in address order.
///
/// At a shared address the label comes first, then the instruction, then the
/// marker.
pub(crate) fn listing(program: &Program) -> Vec<Entry<'_>> {
    let mut addrs: BTreeSet<Address> = program.instructions().map(|insn| insn.pc).collect();
    addrs.extend(program.labels().into_iter().map(|(addr, _)| addr));
    addrs.extend(program.bad_data().keys().copied());

    let mut entries = Vec::new();
    for addr in addrs {
        if let Some(name) = program.label(addr) {
            entries.push(Entry::Label(addr, name));
        }
        if let Some(insn) = program.instruction(addr) {
            entries.push(Entry::Instruction(insn));
        }
        if let Some(bad) = program.bad_data().get(&addr) {
            entries.push(Entry::Bad(addr, bad));
        }
    }
    entries
}

impl DisassemblyFormatter for TextFormatter {
    fn format(&self, program: &Program) -> Result<String, DisassemblyError> {
        let mut output = String::new();

        let vectors = program.image().vectors();
        if !vectors.is_empty() {
            output.push_str("; Vector table\n");
            for vector in &vectors {
                output.push_str(&format!(
                    ";   {:04X}  {:<10} -> !{:04X}H\n",
                    vector.slot,
                    vector.name().unwrap_or("-"),
                    vector.target
                ));
            }
            output.push('\n');
        }

        for entry in listing(program) {
            match entry {
                Entry::Label(_, name) => output.push_str(&format!("{}:\n", name)),
                Entry::Instruction(insn) => {
                    output.push_str(&format!(
                        "\t{:<30};{:04X}  {}\n",
                        insn.render(),
                        insn.pc,
                        fmt_hex(insn.bytes())
                    ));
                    for note in &insn.notes {
                        output.push_str(&format!("\t; {}\n", note));
                    }
                }
                Entry::Bad(addr, bad) => output.push_str(&format!(
                    "; BAD INSTRUCTION AT 0x{:04X}: {} ...\n",
                    addr,
                    fmt_hex(&bad.bytes)
                )),
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::CatalogDecoder;
    use crate::image::Image;
    use crate::strategy::Strategy;

    /// Reset to 0x0082: CALLT [40H]; BR AX. The table entry points at 0x0090: ADD A, #12H; RET
    pub(crate) fn sample_program() -> Program {
        let mut bytes = vec![0xFF; 0x98];
        bytes[0x00..0x02].copy_from_slice(&[0x82, 0x00]);
        bytes[0x40..0x42].copy_from_slice(&[0x90, 0x00]);
        bytes[0x82] = 0x40;
        bytes[0x83] = 0xB0;
        bytes[0x90..0x93].copy_from_slice(&[0x83, 0x12, 0x20]);

        let mut program = Program::new(Image::new(bytes));
        Strategy::Recursive
            .run(&mut program, &CatalogDecoder::new())
            .unwrap();
        program
    }

    #[test]
    fn test_listing_order() {
        let program = sample_program();
        let kinds: Vec<_> = listing(&program)
            .iter()
            .map(|entry| match entry {
                Entry::Label(addr, _) => format!("L{:04X}", addr),
                Entry::Instruction(insn) => format!("I{:04X}", insn.pc),
                Entry::Bad(addr, _) => format!("B{:04X}", addr),
            })
            .collect();

        assert_eq!(
            kinds,
            vec!["L0082", "I0082", "I0083", "L0090", "I0090", "I0092"]
        );
    }

    #[test]
    fn test_text_formatter() {
        let program = sample_program();
        let result = TextFormatter.format(&program).unwrap();

        assert!(result.contains(";   0000  Reset      -> !0082H\n"));
        assert!(result.contains("label_0082:\n"));
        assert!(result.contains(&format!("\t{:<30};0082  40\n", "CALLT [40H]")));
        assert!(result.contains("\t; INFO: Initial CALLT[40H] -> !0090H\n"));
        assert!(result.contains("\t; WARNING: Computed branch unknown.\n"));
        assert!(result.contains(&format!("\t{:<30};0090  83 12\n", "ADD A, #12H")));
        assert!(!result.contains("BAD INSTRUCTION"));
    }

    #[test]
    fn test_text_formatter_bad_marker() {
        // Reset vector into junk
        let mut bytes = vec![0xFF; 0x88];
        bytes[0x00..0x02].copy_from_slice(&[0x84, 0x00]);
        let mut program = Program::new(Image::new(bytes));
        Strategy::Recursive
            .run(&mut program, &CatalogDecoder::new())
            .unwrap();

        let result = TextFormatter.format(&program).unwrap();
        assert!(result.contains("label_0084:\n; BAD INSTRUCTION AT 0x0084: FF FF FF FF ...\n"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("JSONL".parse::<OutputFormat>(), Ok(OutputFormat::JsonLines));
        assert_eq!("jsonlines".parse::<OutputFormat>(), Ok(OutputFormat::JsonLines));
        assert_eq!("csv".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("ngram".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_format_selection() {
        let program = sample_program();

        for format in OutputFormat::available_formats() {
            let output = format.get_formatter().format(&program).unwrap();
            assert!(output.contains("0082"), "{} output lacks the entry point", format);
        }
    }
}
