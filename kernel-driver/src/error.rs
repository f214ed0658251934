//! Error codes and the driver's two failure kinds.

use core::fmt;
use thiserror::Error;

use crate::consts::{EBADF, EBUSY, EEXIST, EFAULT, EINVAL, ENODEV, ENOENT, ENOMEM};
use crate::registration::RegistrationState;

/// A positive POSIX error number, as handed back by the host or to the caller.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("{} ({})", errno_name(.0), .0)]
pub struct Errno(i32);

const NAMES: [(i32, &str); 8] = [
    (ENOENT, "ENOENT"),
    (EBADF, "EBADF"),
    (ENOMEM, "ENOMEM"),
    (EFAULT, "EFAULT"),
    (EBUSY, "EBUSY"),
    (EEXIST, "EEXIST"),
    (ENODEV, "ENODEV"),
    (EINVAL, "EINVAL"),
];

fn errno_name(code: &i32) -> &'static str {
    NAMES
        .iter()
        .find(|(c, _)| c == code)
        .map_or("E?", |(_, name)| name)
}

impl Errno {
    pub const ENOENT: Self = Self(ENOENT);
    pub const EBADF: Self = Self(EBADF);
    pub const ENOMEM: Self = Self(ENOMEM);
    pub const EFAULT: Self = Self(EFAULT);
    pub const EBUSY: Self = Self(EBUSY);
    pub const EEXIST: Self = Self(EEXIST);
    pub const ENODEV: Self = Self(ENODEV);
    pub const EINVAL: Self = Self(EINVAL);

    /// Accepts either sign; the stored value is always positive.
    pub const fn from_raw(code: i32) -> Self {
        Self(code.wrapping_abs())
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Negative return value of the character-device calling convention.
    pub const fn as_status(self) -> isize {
        -(self.0 as isize)
    }

    pub fn name(self) -> &'static str {
        errno_name(&self.0)
    }

    /// Parse a symbolic name such as `"EBUSY"` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(code, _)| Self(*code))
    }
}

impl fmt::Debug for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Load failed; every resource acquired before the failing step has been released.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("failed to register a device number: {0}")]
    Identifier(Errno),

    #[error("failed to create device class: {0}")]
    Class(Errno),

    #[error("failed to create device node: {0}")]
    Node(Errno),
}

impl RegistrationError {
    /// Code reported to the loader.
    pub fn errno(&self) -> Errno {
        match *self {
            Self::Identifier(e) | Self::Class(e) | Self::Node(e) => e,
        }
    }

    /// State the load path had reached when the failing step ran.
    pub fn failed_in(&self) -> RegistrationState {
        match self {
            Self::Identifier(_) => RegistrationState::Unregistered,
            Self::Class(_) => RegistrationState::IdentifierAcquired,
            Self::Node(_) => RegistrationState::ClassCreated,
        }
    }
}

/// The destination of a read could not be written in full.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("copy to user faulted: {uncopied} of {requested} bytes not copied")]
pub struct TransferFault {
    pub requested: usize,
    pub uncopied: usize,
}

impl From<TransferFault> for Errno {
    fn from(_: TransferFault) -> Self {
        Errno::EFAULT
    }
}
