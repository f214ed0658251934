//! Assorted host ABI constants the driver relies on.

/*────────── errno numbers ─────────*/

pub const ENOENT: i32 = 2;
pub const EBADF:  i32 = 9;
pub const ENOMEM: i32 = 12;
pub const EFAULT: i32 = 14;
pub const EBUSY:  i32 = 16;
pub const EEXIST: i32 = 17;
pub const ENODEV: i32 = 19;
pub const EINVAL: i32 = 22;

/*────────── device numbers ─────────*/

pub const MINORBITS: u32 = 20;
pub const MINORMASK: u32 = (1 << MINORBITS) - 1;
pub const MAJORMASK: u32 = (1 << (32 - MINORBITS)) - 1;

/// Major `0` asks the host to pick a free number.
pub const DYNAMIC_MAJOR: u32 = 0;
