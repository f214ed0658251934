//! Access to caller-supplied memory.
//!
//! The driver never holds a reference into user space. It only sees a
//! [`UserPtr`] and asks the host's [`UserMemory`] to perform a checked copy,
//! which may refuse some or all of the bytes.

use core::fmt;

/// Address in the caller's (untrusted) address space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserPtr(usize);

impl UserPtr {
    pub const NULL: Self = Self(0);

    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    pub const fn addr(self) -> usize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// `None` if the offset would wrap the address space.
    pub const fn checked_add(self, offset: usize) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(addr) => Some(Self(addr)),
            None => None,
        }
    }
}

impl fmt::Debug for UserPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserPtr({:#x})", self.0)
    }
}

/// Checked copy primitive between driver memory and a caller's address space.
pub trait UserMemory {
    /// Copy `src` to `dst`. Returns the number of bytes that could **not**
    /// be copied; `0` means the whole slice landed.
    fn copy_to_user(&mut self, dst: UserPtr, src: &[u8]) -> usize;
}
