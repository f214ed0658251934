//! Open/read/write/release against the fixed message.
//!
//!  * Each open gets its own [`Session`]; its cursor starts at zero.
//!  * Reads drain the message once, then return `0` forever.
//!  * Writes are accepted and dropped.

use log::info;

use crate::dispatch::FileOperations;
use crate::error::{Errno, TransferFault};
use crate::uaccess::{UserMemory, UserPtr};

/*──────────────────────────────── message ───────────────────────────────*/

/// Read-only bytes served to every session. Copying the handle never copies
/// the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageBuffer {
    bytes: &'static [u8],
}

impl MessageBuffer {
    pub const fn new(bytes: &'static [u8]) -> Self {
        Self { bytes }
    }

    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub const fn as_bytes(&self) -> &'static [u8] {
        self.bytes
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new(demo_shared::constants::MESSAGE)
    }
}

/*──────────────────────────────── session ───────────────────────────────*/

/// Per-open state: how much of the message this caller already has.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Session {
    cursor: usize,
}

impl Session {
    pub const fn new() -> Self {
        Self { cursor: 0 }
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }
}

/*──────────────────────────────── device ────────────────────────────────*/

pub struct DemoDevice {
    message: MessageBuffer,
}

impl DemoDevice {
    pub const fn new(message: MessageBuffer) -> Self {
        Self { message }
    }

    pub fn message(&self) -> MessageBuffer {
        self.message
    }

    /// Move the next `min(len, remaining)` bytes to `buf`.
    ///
    /// The cursor only advances once the copy has fully succeeded.
    pub fn transfer(
        &self,
        session: &mut Session,
        mem: &mut dyn UserMemory,
        buf: UserPtr,
        len: usize,
    ) -> Result<usize, TransferFault> {
        let bytes = self.message.as_bytes();
        if session.cursor >= bytes.len() {
            return Ok(0);
        }

        let count = len.min(bytes.len() - session.cursor);
        if count == 0 {
            return Ok(0);
        }

        let chunk = &bytes[session.cursor..session.cursor + count];
        let uncopied = mem.copy_to_user(buf, chunk);
        if uncopied != 0 {
            return Err(TransferFault {
                requested: count,
                uncopied: uncopied.min(count),
            });
        }

        session.cursor += count;
        Ok(count)
    }

    /// Writes are a sink: the caller's buffer is never touched.
    pub fn sink(&self, _buf: UserPtr, len: usize) -> usize {
        len
    }
}

impl Default for DemoDevice {
    fn default() -> Self {
        Self::new(MessageBuffer::default())
    }
}

impl FileOperations for DemoDevice {
    fn open(&self) -> Result<Session, Errno> {
        info!("opened");
        Ok(Session::new())
    }

    fn release(&self, session: Session) {
        info!("closed (cursor {})", session.cursor());
    }

    fn read(
        &self,
        session: &mut Session,
        mem: &mut dyn UserMemory,
        buf: UserPtr,
        len: usize,
    ) -> Result<usize, Errno> {
        info!("read {len} bytes at offset {}", session.cursor());
        Ok(self.transfer(session, mem, buf, len)?)
    }

    fn write(&self, _session: &mut Session, buf: UserPtr, len: usize) -> Result<usize, Errno> {
        info!("write {len} bytes");
        Ok(self.sink(buf, len))
    }
}
