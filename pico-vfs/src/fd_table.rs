//! Global descriptor table
//!
//! Each slot is one `AtomicU64` holding the whole binding, so a descriptor
//! call reads its slot with a single load and never takes the lock. Binding
//! and clearing a slot happen under the table's [`VfsLock`].
//!
//! Slot layout:
//!
//! ```text
//!  63        62         47..32          31..0
//! +--------+-----------+--------------+------------+
//! |occupied| permanent | mount index  | local fd   |
//! +--------+-----------+--------------+------------+
//! ```

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use pico_api::sync::VfsLock;
use pico_api::{Error, Result};

use crate::types::{Fd, LocalFd};

const OCCUPIED: u64 = 1 << 63;
const PERMANENT: u64 = 1 << 62;
const MOUNT_SHIFT: u32 = 32;
const MOUNT_MASK: u64 = 0xFFFF;
const LOCAL_MASK: u64 = 0xFFFF_FFFF;

/// Where a descriptor points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdBinding {
    /// Registry slot of the owning mount
    pub mount: usize,
    /// Driver-local descriptor
    pub local: LocalFd,
    /// Reserved range member, never released by close
    pub permanent: bool,
}

impl FdBinding {
    fn encode(&self) -> u64 {
        let mut word = OCCUPIED
            | ((self.mount as u64 & MOUNT_MASK) << MOUNT_SHIFT)
            | (self.local as u32 as u64);
        if self.permanent {
            word |= PERMANENT;
        }
        word
    }
}

/// Decoded table slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdSlot {
    Unused,
    Bound(FdBinding),
}

impl FdSlot {
    fn decode(word: u64) -> Self {
        if word & OCCUPIED == 0 {
            return FdSlot::Unused;
        }
        FdSlot::Bound(FdBinding {
            mount: ((word >> MOUNT_SHIFT) & MOUNT_MASK) as usize,
            local: (word & LOCAL_MASK) as u32 as i32,
            permanent: word & PERMANENT != 0,
        })
    }
}

pub struct FdTable {
    slots: Box<[AtomicU64]>,
    lock: VfsLock,
}

impl FdTable {
    pub fn new(capacity: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| Error::OutOfMemory)?;
        slots.extend((0..capacity).map(|_| AtomicU64::new(0)));
        Ok(Self {
            slots: slots.into_boxed_slice(),
            lock: VfsLock::new(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current contents of a slot, `None` if `fd` is out of range
    pub fn slot(&self, fd: Fd) -> Option<FdSlot> {
        let index = usize::try_from(fd).ok()?;
        self.slots
            .get(index)
            .map(|word| FdSlot::decode(word.load(Ordering::Acquire)))
    }

    /// Lock-free lookup for descriptor calls
    pub fn get(&self, fd: Fd) -> Result<FdBinding> {
        match self.slot(fd) {
            Some(FdSlot::Bound(binding)) => Ok(binding),
            _ => Err(Error::BadDescriptor),
        }
    }

    /// Bind the first free slot to `(mount, local)`
    pub fn allocate(&self, mount: usize, local: LocalFd) -> Result<Fd> {
        let word = FdBinding { mount, local, permanent: false }.encode();

        let guard = self.lock.acquire();
        let free = self
            .slots
            .iter()
            .position(|slot| slot.load(Ordering::Acquire) == 0);
        if let Some(index) = free {
            self.slots[index].store(word, Ordering::Release);
        }
        VfsLock::release(guard);

        match free {
            Some(index) => Ok(index as Fd),
            None => Err(Error::TooManyOpenFiles),
        }
    }

    /// Clear an ephemeral slot if it still holds `binding`.
    ///
    /// Returns `false` for permanent bindings and for slots that changed
    /// since `binding` was read.
    pub fn release(&self, fd: Fd, binding: FdBinding) -> bool {
        if binding.permanent {
            return false;
        }
        let Some(slot) = usize::try_from(fd).ok().and_then(|i| self.slots.get(i)) else {
            return false;
        };

        let _guard = self.lock.acquire();
        slot.compare_exchange(binding.encode(), 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Bind every descriptor in `[min, max]` permanently to `mount`.
    ///
    /// Nothing is written unless the whole range is free. A permanent slot's
    /// local descriptor is the global descriptor itself.
    pub fn reserve_range(&self, mount: usize, min: Fd, max: Fd) -> Result<()> {
        let range = self.range(min, max)?;

        let _guard = self.lock.acquire();
        if self.slots[range.clone()]
            .iter()
            .any(|slot| slot.load(Ordering::Acquire) != 0)
        {
            return Err(Error::InvalidArgument);
        }
        for index in range {
            let binding = FdBinding {
                mount,
                local: index as LocalFd,
                permanent: true,
            };
            self.slots[index].store(binding.encode(), Ordering::Release);
        }
        Ok(())
    }

    /// Clear every permanent slot owned by `mount`; returns how many
    pub fn release_mount(&self, mount: usize) -> usize {
        let _guard = self.lock.acquire();
        let mut released = 0;
        for slot in self.slots.iter() {
            if let FdSlot::Bound(binding) = FdSlot::decode(slot.load(Ordering::Acquire)) {
                if binding.mount == mount && binding.permanent {
                    slot.store(0, Ordering::Release);
                    released += 1;
                }
            }
        }
        released
    }

    /// Ephemeral descriptors currently bound to `mount`
    pub fn count_open(&self, mount: usize) -> usize {
        self.slots
            .iter()
            .filter(|slot| {
                matches!(
                    FdSlot::decode(slot.load(Ordering::Acquire)),
                    FdSlot::Bound(binding) if binding.mount == mount && !binding.permanent
                )
            })
            .count()
    }

    fn range(&self, min: Fd, max: Fd) -> Result<core::ops::RangeInclusive<usize>> {
        let min = usize::try_from(min).map_err(|_| Error::InvalidArgument)?;
        let max = usize::try_from(max).map_err(|_| Error::InvalidArgument)?;
        if min > max || max >= self.slots.len() {
            return Err(Error::InvalidArgument);
        }
        Ok(min..=max)
    }
}
