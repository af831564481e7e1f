//! JSON and JSON Lines output formatters

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::program::{BadData, Program};
use crate::{fmt_hex, Address, DisassemblyError, Instruction};
use super::{listing, DisassemblyFormatter, Entry};

/// Serializable instruction for JSON output
#[derive(Serialize, Deserialize)]
struct InstructionJson {
    /// Address of the instruction
    address: String,
    /// Size of the instruction in bytes
    size: u8,
    /// Mnemonic (e.g., "MOV", "BR")
    mnemonic: String,
    /// Rendered instruction text
    text: String,
    /// Bytes of the instruction as hex string
    bytes: String,
    /// Successor addresses, fall-through first
    successors: Vec<String>,
    /// Flow analysis notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    notes: Vec<String>,
}

/// Serializable label for JSON output
#[derive(Serialize, Deserialize)]
struct LabelJson {
    address: String,
    name: String,
}

/// Serializable bad-data marker for JSON output
#[derive(Serialize, Deserialize)]
struct BadDataJson {
    address: String,
    bytes: String,
    reason: String,
}

/// Serializable vector table slot for JSON output
#[derive(Serialize, Deserialize)]
struct VectorJson {
    slot: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    name: Option<String>,
    target: String,
}

/// Serializable disassembly result for JSON output
#[derive(Serialize, Deserialize)]
struct ProgramJson {
    vectors: Vec<VectorJson>,
    labels: Vec<LabelJson>,
    instructions: Vec<InstructionJson>,
    bad_data: Vec<BadDataJson>,
}

fn addr_str(addr: Address) -> String {
    format!("0x{:04X}", addr)
}

fn json_error(e: serde_json::Error) -> DisassemblyError {
    DisassemblyError::Generic(format!("JSON serialization error: {}", e))
}

impl DisassemblyFormatter for super::JsonFormatter {
    fn format(&self, program: &Program) -> Result<String, DisassemblyError> {
        let result = ProgramJson {
            vectors: program
                .image()
                .vectors()
                .iter()
                .map(|v| VectorJson {
                    slot: addr_str(v.slot),
                    name: v.name().map(str::to_string),
                    target: addr_str(v.target),
                })
                .collect(),
            labels: program
                .labels()
                .into_iter()
                .map(|(addr, name)| LabelJson {
                    address: addr_str(addr),
                    name: name.to_string(),
                })
                .collect(),
            instructions: program
                .sorted_instructions()
                .into_iter()
                .map(instruction_to_json)
                .collect(),
            bad_data: program
                .bad_data()
                .iter()
                .map(|(&addr, bad)| bad_to_json(addr, bad))
                .collect(),
        };

        serde_json::to_string_pretty(&result).map_err(json_error)
    }
}

impl DisassemblyFormatter for super::JsonLinesFormatter {
    fn format(&self, program: &Program) -> Result<String, DisassemblyError> {
        let mut output = String::new();

        for entry in listing(program) {
            let line = match entry {
                Entry::Label(addr, name) => json!({
                    "type": "label",
                    "address": addr_str(addr),
                    "name": name,
                }),
                Entry::Instruction(insn) => {
                    let mut value = serde_json::to_value(instruction_to_json(insn)).map_err(json_error)?;
                    value["type"] = json!("instruction");
                    value
                }
                Entry::Bad(addr, bad) => {
                    let mut value = serde_json::to_value(bad_to_json(addr, bad)).map_err(json_error)?;
                    value["type"] = json!("bad_data");
                    value
                }
            };

            output.push_str(&serde_json::to_string(&line).map_err(json_error)?);
            output.push('\n');
        }

        Ok(output)
    }
}

/// Convert an instruction to JSON format
fn instruction_to_json(insn: &Instruction) -> InstructionJson {
    InstructionJson {
        address: addr_str(insn.pc),
        size: insn.size(),
        mnemonic: insn.mnemonic().to_string(),
        text: insn.render(),
        bytes: fmt_hex(insn.bytes()),
        successors: insn.next.iter().copied().map(addr_str).collect(),
        notes: insn.notes.iter().map(ToString::to_string).collect(),
    }
}

fn bad_to_json(addr: Address, bad: &BadData) -> BadDataJson {
    BadDataJson {
        address: addr_str(addr),
        bytes: fmt_hex(&bad.bytes),
        reason: bad.reason.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::tests::sample_program;
    use crate::format::{JsonFormatter, JsonLinesFormatter};
    use serde_json::Value;

    #[test]
    fn test_json_formatter() {
        let program = sample_program();
        let output = JsonFormatter.format(&program).unwrap();

        let parsed: ProgramJson = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.instructions.len(), 4);
        assert_eq!(parsed.labels.len(), 2);
        assert!(parsed.bad_data.is_empty());

        let callt = &parsed.instructions[0];
        assert_eq!(callt.address, "0x0082");
        assert_eq!(callt.text, "CALLT [40H]");
        assert_eq!(callt.successors, vec!["0x0083", "0x0090"]);
        assert_eq!(callt.notes, vec!["INFO: Initial CALLT[40H] -> !0090H"]);

        assert_eq!(parsed.vectors[0].name.as_deref(), Some("Reset"));
        assert_eq!(parsed.vectors[0].target, "0x0082");
    }

    #[test]
    fn test_json_lines_formatter() {
        let program = sample_program();
        let output = JsonLinesFormatter.format(&program).unwrap();

        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let types: Vec<_> = lines.iter().map(|v| v["type"].as_str().unwrap()).collect();
        assert_eq!(
            types,
            vec!["label", "instruction", "instruction", "label", "instruction", "instruction"]
        );

        assert_eq!(lines[0]["name"], "label_0082");
        assert_eq!(lines[2]["mnemonic"], "BR");
        assert_eq!(lines[2]["notes"][0], "WARNING: Computed branch unknown.");
        assert_eq!(lines[4]["bytes"], "83 12");
    }

    #[test]
    fn test_json_lines_bad_data() {
        let mut program = Program::new(crate::image::Image::new(vec![0xFF, 0xFF]));
        program.add_label(0);
        program.mark_bad(
            0,
            &DisassemblyError::NoMatch {
                addr: 0,
                bytes: "FF FF".to_string(),
            },
        );

        let output = JsonLinesFormatter.format(&program).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["type"], "bad_data");
        assert_eq!(lines[1]["bytes"], "FF FF");
    }
}
