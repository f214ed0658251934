//! Device number → class → node, acquired in order and released in reverse.
//!
//! A [`Registration`] only exists once all three resources are held. Any
//! failure on the way there releases what was already taken before the error
//! is returned, so a caller never has to clean up after a failed load.

use alloc::sync::Arc;
use core::fmt;

use demo_shared::constants::{CLASS_NAME, DEVICE_NAME, FIRST_MINOR};
use log::{error, info};

use crate::consts::DYNAMIC_MAJOR;
use crate::devt::DevT;
use crate::dispatch::FileOperations;
use crate::error::RegistrationError;
use crate::host::{ClassHandle, DeviceHost, NodeHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Unregistered,
    IdentifierAcquired,
    ClassCreated,
    /// Node published; the operation table is reachable from user space.
    Active,
    Failed,
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unregistered => "unregistered",
            Self::IdentifierAcquired => "identifier-acquired",
            Self::ClassCreated => "class-created",
            Self::Active => "active",
            Self::Failed => "failed",
        })
    }
}

fn transition(from: RegistrationState, to: RegistrationState, what: fmt::Arguments<'_>) {
    info!("{from} -> {to}: {what}");
}

/// The three held resources. Consumed by [`Registration::unregister`].
#[derive(Debug)]
pub struct Registration {
    major: u32,
    class: ClassHandle,
    node: NodeHandle,
}

impl Registration {
    /// Run the load path against `host`, binding the claimed number to `fops`.
    pub fn register<H>(host: &mut H, fops: Arc<dyn FileOperations>) -> Result<Self, RegistrationError>
    where
        H: DeviceHost + ?Sized,
    {
        use RegistrationState::*;

        let major = host
            .register_chrdev(DYNAMIC_MAJOR, DEVICE_NAME, fops)
            .map_err(|e| fail(RegistrationError::Identifier(e)))?;
        transition(Unregistered, IdentifierAcquired, format_args!("major {major}"));

        let class = match host.class_create(CLASS_NAME) {
            Ok(class) => class,
            Err(e) => {
                let err = fail(RegistrationError::Class(e));
                release_identifier(host, major);
                return Err(err);
            }
        };
        transition(IdentifierAcquired, ClassCreated, format_args!("class '{CLASS_NAME}'"));

        let devt = DevT::new(major, FIRST_MINOR);
        let node = match host.device_create(class, devt, DEVICE_NAME) {
            Ok(node) => node,
            Err(e) => {
                let err = fail(RegistrationError::Node(e));
                destroy_class(host, class);
                release_identifier(host, major);
                return Err(err);
            }
        };
        transition(ClassCreated, Active, format_args!("node '{DEVICE_NAME}' at {devt}"));

        Ok(Self { major, class, node })
    }

    /// Release node, class and number, in that order. Never fails; a release
    /// the host rejects is logged and the remaining ones still run.
    pub fn unregister<H>(self, host: &mut H)
    where
        H: DeviceHost + ?Sized,
    {
        destroy_node(host, self.class, self.devt());
        destroy_class(host, self.class);
        release_identifier(host, self.major);
        transition(
            RegistrationState::Active,
            RegistrationState::Unregistered,
            format_args!("released major {}", self.major),
        );
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn devt(&self) -> DevT {
        DevT::new(self.major, FIRST_MINOR)
    }

    pub fn class(&self) -> ClassHandle {
        self.class
    }

    pub fn node(&self) -> NodeHandle {
        self.node
    }

    /// Always [`RegistrationState::Active`]: partial states never escape `register`.
    pub fn state(&self) -> RegistrationState {
        RegistrationState::Active
    }
}

fn fail(err: RegistrationError) -> RegistrationError {
    error!("{} -> {}: {err}", err.failed_in(), RegistrationState::Failed);
    err
}

/*────────────────────────── best-effort releases ─────────────────────────*/

fn destroy_node<H: DeviceHost + ?Sized>(host: &mut H, class: ClassHandle, devt: DevT) {
    if let Err(e) = host.device_destroy(class, devt) {
        error!("device_destroy({devt}) failed: {e}");
    }
}

fn destroy_class<H: DeviceHost + ?Sized>(host: &mut H, class: ClassHandle) {
    if let Err(e) = host.class_destroy(class) {
        error!("class_destroy('{CLASS_NAME}') failed: {e}");
    }
}

fn release_identifier<H: DeviceHost + ?Sized>(host: &mut H, major: u32) {
    if let Err(e) = host.unregister_chrdev(major, DEVICE_NAME) {
        error!("unregister_chrdev({major}) failed: {e}");
    }
}
