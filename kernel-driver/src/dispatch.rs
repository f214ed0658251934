//! dispatch.rs
//! The operation table a host calls into once the device number is claimed.

use core::fmt;

use log::debug;

use crate::error::Errno;
use crate::transfer::Session;
use crate::uaccess::{UserMemory, UserPtr};

/// Entry points of the operation table, in the order hosts usually list them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MajorFunction {
    Open,
    Read,
    Write,
    Release,
}

impl fmt::Display for MajorFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Read => "read",
            Self::Write => "write",
            Self::Release => "release",
        })
    }
}

/// Character-device operation table.
///
/// Every slot has a default so a driver only fills in what it supports:
/// `open` and `release` succeed without doing anything, `read` and `write`
/// fail with `EINVAL`.
///
/// Hosts may call these from several threads at once; each call owns its
/// [`Session`] exclusively.
pub trait FileOperations: Send + Sync {
    fn open(&self) -> Result<Session, Errno> {
        Ok(Session::new())
    }

    fn release(&self, _session: Session) {}

    /// Copy up to `len` bytes to `buf` in the caller's memory.
    fn read(
        &self,
        _session: &mut Session,
        _mem: &mut dyn UserMemory,
        _buf: UserPtr,
        _len: usize,
    ) -> Result<usize, Errno> {
        Err(Errno::EINVAL)
    }

    /// Consume up to `len` bytes from `buf` in the caller's memory.
    fn write(&self, _session: &mut Session, _buf: UserPtr, _len: usize) -> Result<usize, Errno> {
        Err(Errno::EINVAL)
    }
}

// ------------------------------------------------------------
// Completion

/// Finish a request the way the calling convention expects: a byte count on
/// success, a negative errno on failure.
pub fn complete(major: MajorFunction, result: Result<usize, Errno>) -> isize {
    match result {
        Ok(n) => isize::try_from(n).unwrap_or(isize::MAX),
        Err(e) => {
            debug!("{major} completed with {e}");
            e.as_status()
        }
    }
}
