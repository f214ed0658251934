//! Packed `(major, minor)` device numbers.

use core::fmt;

use crate::consts::{MAJORMASK, MINORBITS, MINORMASK};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DevT(u32);

impl DevT {
    /// `MKDEV`: bits above the 20-bit minor field are dropped.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self(((major & MAJORMASK) << MINORBITS) | (minor & MINORMASK))
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn major(self) -> u32 {
        self.0 >> MINORBITS
    }

    pub const fn minor(self) -> u32 {
        self.0 & MINORMASK
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DevT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major(), self.minor())
    }
}

impl fmt::Debug for DevT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevT({self})")
    }
}
