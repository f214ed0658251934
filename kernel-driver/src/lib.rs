//! `driver_demo`: a character device that serves one fixed message.
//!
//! The crate is `no_std` and host-agnostic. A host implements
//! [`DeviceHost`] (number/class/node management) and [`UserMemory`] (checked
//! copies into a caller's memory); the driver supplies [`FileOperations`].
//!
//! ```text
//! init:  register_chrdev ─▶ class_create ─▶ device_create   (unwinds on error)
//! exit:  device_destroy  ─▶ class_destroy ─▶ unregister_chrdev
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::sync::Arc;

use log::info;

pub mod consts;
pub mod devt;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod registration;
pub mod transfer;
pub mod uaccess;

pub use devt::DevT;
pub use dispatch::{complete, FileOperations, MajorFunction};
pub use error::{Errno, RegistrationError, TransferFault};
pub use host::{ClassHandle, DeviceHost, NodeHandle};
pub use registration::{Registration, RegistrationState};
pub use transfer::{DemoDevice, MessageBuffer, Session};
pub use uaccess::{UserMemory, UserPtr};

/*------------ module ------------------------------------*/

/// A loaded driver: the registration plus the operation table it points at.
pub struct DemoDriver {
    registration: Registration,
    device: Arc<DemoDevice>,
}

impl DemoDriver {
    /// Module init. On error nothing stays registered with `host`.
    pub fn init<H: DeviceHost + ?Sized>(host: &mut H) -> Result<Self, RegistrationError> {
        info!("init");
        let device = Arc::new(DemoDevice::default());
        let registration = Registration::register(host, device.clone())?;
        Ok(Self { registration, device })
    }

    /// Module exit. Sessions still open keep their own reference to the
    /// operation table.
    pub fn exit<H: DeviceHost + ?Sized>(self, host: &mut H) {
        self.registration.unregister(host);
        info!("exit");
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn device(&self) -> &Arc<DemoDevice> {
        &self.device
    }
}
