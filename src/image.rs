//! Flat flash image with bounds-checked reads and a vector-table view.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::chip::{vector_name, VECT_BASE, VECT_END};
use crate::{Address, DisassemblyError};

/// Slot value meaning "vector not populated"
pub const UNSET_VECTOR: u16 = 0xFFFF;

/// One populated reset/interrupt vector slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector {
    /// Address of the slot itself
    pub slot: Address,
    /// Handler address stored in the slot
    pub target: Address,
}

impl Vector {
    /// Interrupt source name for this slot, if the chip defines one
    pub fn name(&self) -> Option<&'static str> {
        vector_name(self.slot)
    }
}

/// The full flash contents, addressed from 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    bytes: Vec<u8>,
}

impl Image {
    /// Wrap raw flash bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Read a raw flash dump from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DisassemblyError> {
        let bytes = fs::read(path.as_ref())?;
        log::debug!(
            "Loaded {} bytes of flash from {}",
            bytes.len(),
            path.as_ref().display()
        );
        Ok(Self::new(bytes))
    }

    /// Size of the image in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the image holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The raw flash contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes in `[addr, addr + len)`, or `None` if any of them is missing.
    pub fn get(&self, addr: Address, len: usize) -> Option<&[u8]> {
        let start = addr as usize;
        let end = start.checked_add(len)?;
        self.bytes.get(start..end)
    }

    /// Up to `len` bytes starting at `addr`, truncated at the end of the image.
    pub fn window(&self, addr: Address, len: usize) -> &[u8] {
        let start = (addr as usize).min(self.bytes.len());
        let end = start.saturating_add(len).min(self.bytes.len());
        &self.bytes[start..end]
    }

    /// Read a 16-bit little-endian data word.
    pub fn read_word16(&self, addr: Address) -> Result<u16, DisassemblyError> {
        match self.get(addr, 2) {
            Some(&[lo, hi]) => Ok(u16::from_le_bytes([lo, hi])),
            _ => Err(DisassemblyError::OutOfBounds { addr, len: 2 }),
        }
    }

    /// Read `len` bytes as one big-endian instruction word.
    ///
    /// Returns `None` when fewer than `len` bytes remain, so a too-short tail
    /// simply fails to match instead of erroring.
    pub fn read_be(&self, addr: Address, len: u8) -> Option<u32> {
        let data = self.get(addr, len as usize)?;
        Some(data.iter().fold(0u32, |word, &b| (word << 8) | b as u32))
    }

    /// Every populated slot of the reset/interrupt vector table, in slot order.
    ///
    /// Slots past the end of a short image are treated as unset.
    pub fn vectors(&self) -> Vec<Vector> {
        (VECT_BASE..VECT_END)
            .step_by(2)
            .filter_map(|slot| {
                let target = self.read_word16(slot).ok()?;
                if target == UNSET_VECTOR {
                    return None;
                }
                Some(Vector {
                    slot,
                    target: target as Address,
                })
            })
            .collect()
    }

    /// Entry points found in the vector table, in ascending slot order.
    pub fn entry_points(&self) -> Vec<Address> {
        self.vectors().into_iter().map(|v| v.target).collect()
    }
}

impl From<Vec<u8>> for Image {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image ({} bytes)", self.bytes.len())
    }
}
