//! Simulated user address space.
//!
//! Regions are mapped at increasing addresses with an unmapped guard page
//! between them, so running off the end of a buffer faults instead of
//! spilling into the next one.

use std::collections::BTreeMap;

use demo_driver::{UserMemory, UserPtr};

const FIRST_ADDR: usize = 0x1_0000;
const PAGE: usize = 0x1000;

#[derive(Default)]
pub struct AddressSpace {
    next: usize,
    regions: BTreeMap<usize, Vec<u8>>,
}

impl AddressSpace {
    pub fn new() -> Self {
        Self { next: FIRST_ADDR, regions: BTreeMap::new() }
    }

    /// Map `len` zeroed bytes and return their address.
    pub fn map(&mut self, len: usize) -> UserPtr {
        let base = self.next.max(FIRST_ADDR);
        let pages = len.div_ceil(PAGE).max(1);
        self.next = base + (pages + 1) * PAGE;
        self.regions.insert(base, vec![0; len]);
        UserPtr::new(base)
    }

    /// Map a copy of `bytes`.
    pub fn map_bytes(&mut self, bytes: &[u8]) -> UserPtr {
        let ptr = self.map(bytes.len());
        if let Some(region) = self.regions.get_mut(&ptr.addr()) {
            region.copy_from_slice(bytes);
        }
        ptr
    }

    /// `false` if `ptr` is not the start of a mapping.
    pub fn unmap(&mut self, ptr: UserPtr) -> bool {
        self.regions.remove(&ptr.addr()).is_some()
    }

    /// Read back `len` bytes at `ptr` if they are all mapped in one region.
    pub fn peek(&self, ptr: UserPtr, len: usize) -> Option<&[u8]> {
        let (base, region) = self.region_at(ptr.addr())?;
        let off = ptr.addr() - base;
        region.get(off..off.checked_add(len)?)
    }

    fn region_at(&self, addr: usize) -> Option<(usize, &Vec<u8>)> {
        let (&base, region) = self.regions.range(..=addr).next_back()?;
        (addr - base < region.len()).then_some((base, region))
    }
}

impl UserMemory for AddressSpace {
    /// Copies up to the end of the region `dst` falls in; the rest is reported
    /// as uncopied.
    fn copy_to_user(&mut self, dst: UserPtr, src: &[u8]) -> usize {
        let Some((&base, region)) = self.regions.range_mut(..=dst.addr()).next_back() else {
            return src.len();
        };
        let off = dst.addr() - base;
        if off >= region.len() {
            return src.len();
        }
        let fits = src.len().min(region.len() - off);
        region[off..off + fits].copy_from_slice(&src[..fits]);
        src.len() - fits
    }
}
