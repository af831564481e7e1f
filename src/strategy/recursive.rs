//! Recursive descent disassembly strategy

use crate::program::Program;
use crate::{Address, Decoder, DisassemblyError};

/// Follow control flow from `entries`, recording every reachable instruction.
///
/// Each worklist address is explored as one straight-line path: the first
/// successor is followed in place and any further successors are deferred onto
/// the worklist. A path ends at a dead end (return or computed branch), at an
/// address decoded earlier, or at bytes that do not decode. Undecodable bytes
/// become bad-data markers; only a broken catalog aborts the run.
///
/// Every worklist address gets a label, even if another path already decoded
/// it, so converging paths stay visible in the listing.
///
/// # Arguments
/// * `program` - The program to fill in
/// * `decoder` - The decoder to use for disassembly
/// * `entries` - Start addresses, explored in order
pub fn run(program: &mut Program, decoder: &dyn Decoder, entries: &[Address]) -> Result<(), DisassemblyError> {
    log::debug!("Starting recursive descent from {} entry points", entries.len());

    // Popped from the back, so reverse to explore entries in order
    let mut stack: Vec<Address> = entries.iter().rev().copied().collect();

    while let Some(start) = stack.pop() {
        program.add_label(start);
        let mut addr = start;

        loop {
            if program.contains(addr) {
                // Path rejoins code decoded earlier
                break;
            }

            let insn = match program.decode(decoder, Some(addr)) {
                Ok(insn) => insn,
                Err(e) if e.is_recoverable() => {
                    log::warn!("Bad instruction at 0x{:04X}: {}", addr, e);
                    program.mark_bad(addr, &e);
                    break;
                }
                Err(e) => return Err(e),
            };

            for note in &insn.notes {
                if note.is_warning() {
                    log::warn!("0x{:04X}: {}", addr, note);
                } else {
                    log::debug!("0x{:04X}: {}", addr, note);
                }
            }

            let fall_through = insn.fall_through();
            let next = insn.next.clone();
            program.insert(insn);

            // Side branches wait on the worklist
            stack.extend(next.iter().skip(1));

            match next.first() {
                None => break,
                Some(&succ) => {
                    if succ != fall_through {
                        program.add_label(succ);
                    }
                    addr = succ;
                }
            }
        }
    }

    log::debug!(
        "Recursive descent complete: {} instructions, {} labels, {} bad markers",
        program.len(),
        program.labels().len(),
        program.bad_data().len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InstructionDef;
    use crate::decoder::CatalogDecoder;
    use crate::image::Image;

    fn run_on(bytes: Vec<u8>, entries: &[Address]) -> Program {
        let mut program = Program::new(Image::new(bytes));
        run(&mut program, &CatalogDecoder::new(), entries).unwrap();
        program
    }

    fn label_addrs(program: &Program) -> Vec<Address> {
        program.labels().into_iter().map(|(addr, _)| addr).collect()
    }

    #[test]
    fn test_straight_line() {
        // NOP; NOP; RET
        let program = run_on(vec![0x08, 0x08, 0x20, 0xFF], &[0]);

        assert_eq!(program.len(), 3);
        assert_eq!(program.discovery_order(), &[0, 1, 2]);
        assert_eq!(label_addrs(&program), vec![0]);
        assert!(program.bad_data().is_empty());
    }

    #[test]
    fn test_converging_branch() {
        // 0: BZ $4      (fall-through 2, target 4)
        // 2: NOP
        // 3: NOP
        // 4: RET        (both paths end here)
        let program = run_on(vec![0x3C, 0x02, 0x08, 0x08, 0x20], &[0]);

        assert_eq!(program.len(), 4);
        let order = program.discovery_order();
        assert_eq!(order.iter().filter(|&&a| a == 4).count(), 1);
        assert_eq!(label_addrs(&program), vec![0, 4]);
    }

    #[test]
    fn test_side_branches_are_deferred() {
        // 0: BZ $5      defers 5
        // 2: BNZ $6     defers 6
        // 4: RET
        // 5: RET
        // 6: RET
        let program = run_on(vec![0x3C, 0x03, 0x3E, 0x02, 0x20, 0x20, 0x20], &[0]);

        assert_eq!(program.discovery_order(), &[0, 2, 4, 6, 5]);
        assert_eq!(label_addrs(&program), vec![0, 5, 6]);
    }

    #[test]
    fn test_self_loop_terminates() {
        // 0: BR $0
        let program = run_on(vec![0x30, 0xFE], &[0]);

        assert_eq!(program.len(), 1);
        assert_eq!(program.instruction(0).unwrap().next, vec![0]);
        assert_eq!(label_addrs(&program), vec![0]);
    }

    #[test]
    fn test_unconditional_branch_target_is_labelled() {
        // 0: BR $4; 2: junk; 4: RET
        let program = run_on(vec![0x30, 0x02, 0xFF, 0xFF, 0x20], &[0]);

        assert_eq!(program.len(), 2);
        assert!(!program.contains(2));
        assert_eq!(label_addrs(&program), vec![0, 4]);
    }

    #[test]
    fn test_bad_data_stops_only_one_path() {
        // 0: BZ $5      target is good
        // 2: NOP
        // 3: junk
        // 5: RET
        let program = run_on(vec![0x3C, 0x03, 0x08, 0xFF, 0xFF, 0x20], &[0]);

        assert_eq!(program.len(), 3);
        assert!(program.contains(5));
        let bad: Vec<_> = program.bad_data().keys().copied().collect();
        assert_eq!(bad, vec![3]);
        assert_eq!(program.bad_data()[&3].bytes, vec![0xFF, 0xFF, 0x20]);
    }

    #[test]
    fn test_running_off_the_end() {
        // NOP NOP with nothing after
        let program = run_on(vec![0x08, 0x08], &[0]);

        assert_eq!(program.len(), 2);
        assert!(program.bad_data().contains_key(&2));
        assert!(program.bad_data()[&2].bytes.is_empty());
    }

    #[test]
    fn test_calls_and_computed_branches() {
        let mut bytes = vec![0xFF; 0x100];
        // CALLT table entry 40H -> 0x00A0
        bytes[0x40..0x42].copy_from_slice(&[0xA0, 0x00]);
        // 0x82: CALL !0090H
        bytes[0x82..0x85].copy_from_slice(&[0x22, 0x90, 0x00]);
        // 0x85: CALLT [40H]
        bytes[0x85] = 0x40;
        // 0x86: BR AX
        bytes[0x86] = 0xB0;
        // 0x90: RET
        bytes[0x90] = 0x20;
        // 0xA0: RETI
        bytes[0xA0] = 0x24;

        let program = run_on(bytes, &[0x82]);

        let decoded: Vec<_> = program.sorted_instructions().iter().map(|i| i.pc).collect();
        assert_eq!(decoded, vec![0x82, 0x85, 0x86, 0x90, 0xA0]);
        assert_eq!(label_addrs(&program), vec![0x82, 0x90, 0xA0]);
        assert!(program.instruction(0x86).unwrap().has_warnings());
        assert!(program.bad_data().is_empty());
    }

    #[test]
    fn test_multiple_entries_share_code() {
        // Two entry points falling into the same RET
        let program = run_on(vec![0x08, 0x08, 0x20], &[0, 1]);

        assert_eq!(program.len(), 3);
        assert_eq!(label_addrs(&program), vec![0, 1]);
    }

    #[test]
    fn test_ambiguous_catalog_aborts() {
        let decoder = CatalogDecoder::with_catalog(vec![
            InstructionDef::new("NOP", 0x08, 0xFF, 1, &[], "NOP"),
            InstructionDef::new("ANY", 0x00, 0x00, 1, &[], "ANY"),
        ]);
        let mut program = Program::new(Image::new(vec![0x08]));

        let result = run(&mut program, &decoder, &[0]);
        assert!(matches!(result, Err(DisassemblyError::AmbiguousCatalog { .. })));
        assert!(program.is_empty());
    }
}
