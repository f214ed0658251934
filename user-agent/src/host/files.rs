//! File-descriptor layer: `open(2)`/`read(2)`/`write(2)`/`close(2)` against
//! published nodes.
//!
//! An open file holds its own reference to the operation table plus the
//! driver's session, so each descriptor reads independently.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use demo_driver::{complete, Errno, FileOperations, MajorFunction, Session, UserMemory, UserPtr};
use log::debug;

use super::devices::DeviceManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fd(pub u32);

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd {}", self.0)
    }
}

struct OpenFile {
    path:    String,
    fops:    Arc<dyn FileOperations>,
    session: Session,
}

pub struct FileTable {
    next: u32,
    open: BTreeMap<Fd, OpenFile>,
}

impl FileTable {
    pub fn new() -> Self {
        // 0..=2 are the usual stdio slots.
        Self { next: 3, open: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Current read offset of `fd`.
    pub fn position(&self, fd: Fd) -> Option<usize> {
        self.open.get(&fd).map(|f| f.session.cursor())
    }

    pub fn open(&mut self, devices: &DeviceManager, path: &str) -> Result<Fd, Errno> {
        let node = devices.lookup(path).ok_or(Errno::ENOENT)?;
        let fops = devices.fops_for(node.devt).ok_or(Errno::ENODEV)?;
        let session = fops.open()?;
        let fd = Fd(self.next);
        self.next += 1;
        debug!("{fd} -> {path} ({})", node.devt);
        self.open.insert(fd, OpenFile { path: path.to_owned(), fops, session });
        Ok(fd)
    }

    pub fn read(&mut self, mem: &mut dyn UserMemory, fd: Fd, buf: UserPtr, len: usize) -> isize {
        let result = match self.open.get_mut(&fd) {
            Some(f) => f.fops.read(&mut f.session, mem, buf, len),
            None => Err(Errno::EBADF),
        };
        complete(MajorFunction::Read, result)
    }

    pub fn write(&mut self, fd: Fd, buf: UserPtr, len: usize) -> isize {
        let result = match self.open.get_mut(&fd) {
            Some(f) => f.fops.write(&mut f.session, buf, len),
            None => Err(Errno::EBADF),
        };
        complete(MajorFunction::Write, result)
    }

    pub fn close(&mut self, fd: Fd) -> Result<(), Errno> {
        let file = self.open.remove(&fd).ok_or(Errno::EBADF)?;
        debug!("{fd} closed ({})", file.path);
        file.fops.release(file.session);
        Ok(())
    }
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}
