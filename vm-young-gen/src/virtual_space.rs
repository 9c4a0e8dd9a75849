//! Committed sub-range of a fixed address reservation
//!
//! [`VirtualSpace`] owns the reservation `[low_boundary, high_boundary)` and
//! the committed prefix `[low, high)` inside it. The committed size only ever
//! changes by whole alignment units, and every change is all-or-nothing.

use vm_osal::{ReservedMemory, VirtualMemory};

use crate::region::{MemRegion, align_up, is_aligned};
use crate::{GcError, GcResult};

/// Address range controller for the young generation
#[derive(Debug)]
pub struct VirtualSpace<M: VirtualMemory = ReservedMemory> {
    memory: M,
    reserved: MemRegion,
    committed_size: usize,
    alignment: usize,
}

impl VirtualSpace<ReservedMemory> {
    /// Reserve `total_bytes` (rounded up to `alignment`) of host address space
    ///
    /// # Errors
    ///
    /// Returns [`GcError::OutOfAddressSpace`] if the host refuses the
    /// reservation. There is no recovery from this.
    pub fn reserve(total_bytes: usize, alignment: usize) -> GcResult<Self> {
        check_alignment(alignment)?;
        let size = align_up(total_bytes, alignment);
        let memory = ReservedMemory::reserve(size).map_err(|source| GcError::OutOfAddressSpace {
            requested: size,
            source,
        })?;
        Self::with_memory(memory, alignment)
    }
}

impl<M: VirtualMemory> VirtualSpace<M> {
    /// Wrap an existing reservation; nothing is committed yet
    ///
    /// # Errors
    ///
    /// Fails if `alignment` is not a power of two or the reservation is not
    /// a whole number of alignment units.
    pub fn with_memory(memory: M, alignment: usize) -> GcResult<Self> {
        check_alignment(alignment)?;
        if memory.size() == 0 || !is_aligned(memory.size(), alignment) {
            return Err(GcError::invalid_config(format!(
                "reservation of {} bytes is not a positive multiple of alignment {alignment}",
                memory.size()
            )));
        }
        let reserved = MemRegion::with_size(memory.base(), memory.size())?;
        Ok(Self {
            memory,
            reserved,
            committed_size: 0,
            alignment,
        })
    }

    /// Commit `bytes` more at the high end
    ///
    /// Returns `false` without changing anything if `bytes` is unaligned,
    /// exceeds the remaining reservation, or the host refuses the commit.
    pub fn expand_by(&mut self, bytes: usize) -> bool {
        if bytes == 0 {
            return true;
        }
        if !is_aligned(bytes, self.alignment) || bytes > self.uncommitted_size() {
            log::debug!(
                "refusing expansion by {bytes} bytes (alignment {}, uncommitted {})",
                self.alignment,
                self.uncommitted_size()
            );
            return false;
        }

        match self.memory.commit(self.committed_size, bytes) {
            Ok(()) => {
                self.committed_size += bytes;
                true
            }
            Err(e) => {
                log::warn!("young generation expansion failed: {e}");
                false
            }
        }
    }

    /// Uncommit `bytes` from the high end
    ///
    /// Same all-or-nothing contract as [`expand_by`](Self::expand_by).
    pub fn shrink_by(&mut self, bytes: usize) -> bool {
        if bytes == 0 {
            return true;
        }
        if !is_aligned(bytes, self.alignment) || bytes > self.committed_size {
            log::debug!(
                "refusing shrink by {bytes} bytes (alignment {}, committed {})",
                self.alignment,
                self.committed_size
            );
            return false;
        }

        let new_size = self.committed_size - bytes;
        match self.memory.uncommit(new_size, bytes) {
            Ok(()) => {
                self.committed_size = new_size;
                true
            }
            Err(e) => {
                log::warn!("young generation shrink failed: {e}");
                false
            }
        }
    }

    pub fn committed_size(&self) -> usize {
        self.committed_size
    }

    pub fn reserved_size(&self) -> usize {
        self.reserved.byte_size()
    }

    pub fn uncommitted_size(&self) -> usize {
        self.reserved_size() - self.committed_size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Bottom of the reservation and of the committed range
    pub fn low(&self) -> usize {
        self.reserved.start()
    }

    /// One past the last committed byte
    pub fn high(&self) -> usize {
        self.reserved.start() + self.committed_size
    }

    /// One past the last reserved byte
    pub fn high_boundary(&self) -> usize {
        self.reserved.end()
    }

    pub fn reserved(&self) -> MemRegion {
        self.reserved
    }

    pub fn committed(&self) -> MemRegion {
        MemRegion::from_bounds(self.low(), self.high())
    }

    /// Whether `addr` lies in committed memory
    pub fn contains(&self, addr: usize) -> bool {
        self.low() <= addr && addr < self.high()
    }
}

fn check_alignment(alignment: usize) -> GcResult<()> {
    if alignment == 0 || !alignment.is_power_of_two() {
        return Err(GcError::invalid_config(format!(
            "alignment {alignment} is not a power of two"
        )));
    }
    Ok(())
}
