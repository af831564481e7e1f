//! Linear-sweep disassembly strategy with parallel processing

use std::collections::HashMap;
use std::time::Instant;

use rayon::prelude::*;

use crate::image::Image;
use crate::program::Program;
use crate::{Address, Decoder, DisassemblyError, Instruction};

/// Maximum chunk size for parallel processing
const CHUNK_SIZE: usize = 4096;

/// Decode result at every address a chunk's own sweep visited
type ChunkSweep = HashMap<Address, Result<Instruction, DisassemblyError>>;

/// Linear-sweep disassembly with parallel processing
///
/// Every address from each start to the end of the image is decoded in
/// sequence, without regard for control flow. A byte that does not decode is
/// skipped; a run of such bytes gets a single bad-data marker at its first
/// address. A later start stops as soon as it reaches bytes an earlier sweep
/// already decoded, so kept instructions never overlap.
///
/// The range is split into chunks that are swept in parallel, each from its
/// own first byte. The merge walks the range again in order and takes the
/// chunk's result whenever it is aligned with the real sweep, decoding on
/// the spot where a chunk started in the middle of an instruction.
///
/// # Arguments
/// * `program` - The program to fill in
/// * `decoder` - The decoder to use for disassembly
/// * `entries` - Addresses to sweep from
pub fn run(program: &mut Program, decoder: &dyn Decoder, entries: &[Address]) -> Result<(), DisassemblyError> {
    for &start in entries {
        sweep(program, decoder, start)?;
    }
    Ok(())
}

fn sweep(program: &mut Program, decoder: &dyn Decoder, start: Address) -> Result<(), DisassemblyError> {
    let image_len = program.image().len();
    let start_time = Instant::now();

    // No need to process if nothing is left past the start
    if start as usize >= image_len {
        log::debug!("Linear sweep start 0x{:04X} is past the end of the image", start);
        return Ok(());
    }

    let range_len = image_len - start as usize;
    let num_chunks = range_len.div_ceil(CHUNK_SIZE);
    log::debug!(
        "Sweeping {} bytes from 0x{:04X} in {} chunks",
        range_len,
        start,
        num_chunks
    );

    let bounds = |chunk_idx: usize| {
        let chunk_start = start as usize + chunk_idx * CHUNK_SIZE;
        let chunk_end = std::cmp::min(chunk_start + CHUNK_SIZE, image_len);
        (chunk_start as Address, chunk_end as Address)
    };

    // Process each chunk in parallel
    let image = program.image();
    let mut chunks: Vec<ChunkSweep> = (0..num_chunks)
        .into_par_iter()
        .map(|chunk_idx| {
            let (chunk_start, chunk_end) = bounds(chunk_idx);
            process_chunk(image, decoder, chunk_start, chunk_end)
        })
        .collect();

    // Stitch the chunks together in address order
    let mut at = start;
    let mut in_bad_run = false;
    let mut resynced = 0usize;

    'merge: for (chunk_idx, chunk) in chunks.iter_mut().enumerate() {
        let (_, chunk_end) = bounds(chunk_idx);

        while at < chunk_end {
            // Stop where an earlier sweep already owns the bytes
            if program.overlaps(at, 1) {
                log::debug!("Linear sweep from 0x{:04X} joins decoded code at 0x{:04X}", start, at);
                break 'merge;
            }

            let result = match chunk.remove(&at) {
                Some(result) => result,
                None => {
                    // Chunk started mid-instruction; decode until it lines up
                    resynced += 1;
                    program.decode(decoder, Some(at))
                }
            };

            match result {
                Ok(insn) => {
                    if program.overlaps(insn.pc, insn.size() as usize) {
                        log::debug!("Linear sweep from 0x{:04X} runs into decoded code at 0x{:04X}", start, at);
                        break 'merge;
                    }
                    if at == start {
                        program.add_label(start);
                    }
                    in_bad_run = false;
                    at = insn.fall_through();
                    program.insert(insn);
                }
                Err(e) if e.is_recoverable() => {
                    if at == start {
                        program.add_label(start);
                    }
                    if !in_bad_run {
                        log::warn!("Bad instruction at 0x{:04X}: {}", at, e);
                        program.mark_bad(at, &e);
                        in_bad_run = true;
                    }
                    at += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    label_branch_targets(program);

    let elapsed = start_time.elapsed();
    log::info!(
        "Linear sweep completed in {:?}: {} instructions, {} bad runs, {} addresses resynced",
        elapsed,
        program.len(),
        program.bad_data().len(),
        resynced
    );

    Ok(())
}

/// Sweep a single chunk, recording the decode result at each visited address.
fn process_chunk(image: &Image, decoder: &dyn Decoder, chunk_start: Address, chunk_end: Address) -> ChunkSweep {
    let mut results = HashMap::new();
    let mut at = chunk_start;

    while at < chunk_end {
        let result = decoder.decode(image, at);
        let step = match &result {
            Ok(insn) => insn.size() as Address,
            // Couldn't decode an instruction, skip one byte
            Err(_) => 1,
        };
        results.insert(at, result);
        at += step;
    }

    results
}

/// Label every branch or call target that starts a swept instruction.
fn label_branch_targets(program: &mut Program) {
    let targets: Vec<Address> = program
        .instructions()
        .flat_map(|insn| {
            let fall_through = insn.fall_through();
            insn.next.iter().copied().filter(move |&succ| succ != fall_through)
        })
        .collect();

    for target in targets {
        if program.contains(target) {
            program.add_label(target);
        }
    }
}
