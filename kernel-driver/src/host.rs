//! Device-management surface the driver registers itself with.

use alloc::sync::Arc;

use crate::devt::DevT;
use crate::dispatch::FileOperations;
use crate::error::Errno;

/// Host-issued handle for a device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassHandle(pub u32);

/// Host-issued handle for a published device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u32);

/// The calls a character-device driver makes against its host at load and
/// unload. Acquisitions fail with an [`Errno`]; releases may report one too,
/// but callers treat that as advisory.
pub trait DeviceHost {
    /// Claim `major` (or a free one when `major == 0`) for `name`, binding it
    /// to `fops`. Returns the major actually assigned.
    fn register_chrdev(
        &mut self,
        major: u32,
        name: &str,
        fops: Arc<dyn FileOperations>,
    ) -> Result<u32, Errno>;

    fn unregister_chrdev(&mut self, major: u32, name: &str) -> Result<(), Errno>;

    fn class_create(&mut self, name: &str) -> Result<ClassHandle, Errno>;

    fn class_destroy(&mut self, class: ClassHandle) -> Result<(), Errno>;

    /// Publish a node called `name` under `class`, addressed by `devt`.
    fn device_create(
        &mut self,
        class: ClassHandle,
        devt: DevT,
        name: &str,
    ) -> Result<NodeHandle, Errno>;

    fn device_destroy(&mut self, class: ClassHandle, devt: DevT) -> Result<(), Errno>;
}
