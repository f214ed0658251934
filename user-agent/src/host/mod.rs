//! Simulated operating system the driver is loaded into.
//!
//! Key responsibilities:
//! - Own the device manager the driver registers with.
//! - Own one user address space and a descriptor table for the client.
//! - Translate descriptor calls into operation-table calls.

pub mod devices;
pub mod files;
pub mod memory;

use demo_driver::{DemoDriver, Errno, RegistrationError, UserPtr};
use log::Level;

use crate::config::HostConfig;
pub use devices::{DeviceManager, Node};
pub use files::{Fd, FileTable};
pub use memory::AddressSpace;

pub struct SimHost {
    pub devices: DeviceManager,
    pub memory:  AddressSpace,
    pub files:   FileTable,
}

impl SimHost {
    pub fn new(cfg: &HostConfig) -> Self {
        Self {
            devices: DeviceManager::new(cfg),
            memory:  AddressSpace::new(),
            files:   FileTable::new(),
        }
    }

    /// `insmod`
    pub fn load(&mut self) -> Result<DemoDriver, RegistrationError> {
        let driver = DemoDriver::init(&mut self.devices)?;
        agent_log!(
            Level::Info,
            "host",
            "driver loaded at major {}",
            driver.registration().major()
        );
        Ok(driver)
    }

    /// `rmmod`
    pub fn unload(&mut self, driver: DemoDriver) {
        driver.exit(&mut self.devices);
        agent_log!(Level::Info, "host", "driver unloaded");
    }

    pub fn open(&mut self, path: &str) -> Result<Fd, Errno> {
        self.files.open(&self.devices, path)
    }

    /// Returns a byte count or a negative errno.
    pub fn read(&mut self, fd: Fd, buf: UserPtr, len: usize) -> isize {
        self.files.read(&mut self.memory, fd, buf, len)
    }

    /// Returns a byte count or a negative errno.
    pub fn write(&mut self, fd: Fd, buf: UserPtr, len: usize) -> isize {
        self.files.write(fd, buf, len)
    }

    pub fn close(&mut self, fd: Fd) -> Result<(), Errno> {
        self.files.close(fd)
    }
}
