//! Control flow variants and successor computation

use std::fmt;

use crate::image::Image;
use crate::{Address, DisassemblyError, Instruction, Note};

/// How execution continues after an instruction.
///
/// Variants that branch carry the index of the operand (in the definition's
/// field list) holding the already normalized target address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flow {
    /// Falls through to the next instruction
    #[default]
    Forward,
    /// Falls through or branches to the operand's address
    ConditionalBranch(usize),
    /// Always branches to the operand's address
    UnconditionalBranch(usize),
    /// Subroutine call; analyzed like a conditional branch
    CallReturn(usize),
    /// Subroutine return; the destination depends on the caller
    Return,
    /// Computed branch that static analysis cannot follow
    ComputedUnknown,
    /// Call through the CALLT table entry at the operand's address
    ComputedCallT(usize),
}

impl Flow {
    /// Compute the successor addresses of `insn`.
    ///
    /// Multiple successors list the fall-through first. Notes produced along
    /// the way are appended to `insn`. Only the call-table variant touches
    /// the image, to read the table entry.
    pub fn next(&self, insn: &mut Instruction, image: &Image) -> Result<Vec<Address>, DisassemblyError> {
        let forward = insn.fall_through();
        match *self {
            Flow::Forward => Ok(vec![forward]),
            Flow::ConditionalBranch(idx) | Flow::CallReturn(idx) => {
                Ok(vec![forward, branch_target(insn, idx)?])
            }
            Flow::UnconditionalBranch(idx) => Ok(vec![branch_target(insn, idx)?]),
            Flow::Return => Ok(Vec::new()),
            Flow::ComputedUnknown => {
                insn.notes
                    .push(Note::Warning("Computed branch unknown.".to_string()));
                Ok(Vec::new())
            }
            Flow::ComputedCallT(idx) => {
                let slot = branch_target(insn, idx)?;
                // The table lives in flash, so the program could in theory
                // rewrite it; only the value in the image is reported.
                let target = image.read_word16(slot)? as Address;
                insn.notes.push(Note::Info(format!(
                    "Initial CALLT[{:02X}H] -> !{:04X}H",
                    slot, target
                )));
                Ok(vec![forward, target])
            }
        }
    }

    /// True for subroutine calls (direct or through the call table)
    pub fn is_call(&self) -> bool {
        matches!(self, Flow::CallReturn(_) | Flow::ComputedCallT(_))
    }

    /// True for the branch family proper (calls excluded)
    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            Flow::ConditionalBranch(_) | Flow::UnconditionalBranch(_)
        )
    }

    /// True if the instruction never falls through to the next address
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Flow::UnconditionalBranch(_) | Flow::Return | Flow::ComputedUnknown
        )
    }
}

fn branch_target(insn: &Instruction, idx: usize) -> Result<Address, DisassemblyError> {
    insn.operand(idx).map(|op| op.value).ok_or_else(|| {
        DisassemblyError::Generic(format!(
            "{} has no operand {} to branch on",
            insn.def.name, idx
        ))
    })
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Forward => write!(f, "forward"),
            Flow::ConditionalBranch(_) => write!(f, "conditional branch"),
            Flow::UnconditionalBranch(_) => write!(f, "branch"),
            Flow::CallReturn(_) => write!(f, "call"),
            Flow::Return => write!(f, "return"),
            Flow::ComputedUnknown => write!(f, "computed branch"),
            Flow::ComputedCallT(_) => write!(f, "table call"),
        }
    }
}
