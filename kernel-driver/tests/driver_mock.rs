//! Mock tests for the driver in a user-mode environment.
//!
//! Loading a real module is impractical in a test run, so this file provides
//! a recording mock of the device-management host and a flat user address
//! space, then drives the driver through them.
//!
//! Key responsibilities:
//! - Check acquisition order on load and release order on unload.
//! - Check that every failing load step leaves nothing behind.
//! - Exercise the operation table the way a host would after `open(2)`.
//!
//! Note: This module does not interact with a live kernel.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Once};
use std::thread;

use demo_driver::{
    ClassHandle, DemoDriver, DevT, DeviceHost, Errno, FileOperations, NodeHandle,
    RegistrationError, RegistrationState, UserMemory, UserPtr,
};
use demo_shared::constants::{CLASS_NAME, DEVICE_NAME, MESSAGE, MESSAGE_LEN};
use log::{Level, LevelFilter, Log, Metadata, Record};

/*──────────────────────────── mock host ─────────────────────────────────*/

#[derive(Default)]
struct MockHost {
    next_major: u32,
    next_handle: u32,
    chrdevs: BTreeMap<u32, (String, Arc<dyn FileOperations>)>,
    classes: BTreeMap<ClassHandle, String>,
    nodes: BTreeMap<DevT, (ClassHandle, String)>,
    fail_identifier: Option<Errno>,
    fail_class: Option<Errno>,
    fail_node: Option<Errno>,
    fail_release: bool,
    calls: Vec<&'static str>,
}

impl MockHost {
    fn new() -> Self {
        Self { next_major: 240, next_handle: 1, ..Self::default() }
    }

    fn is_empty(&self) -> bool {
        self.chrdevs.is_empty() && self.classes.is_empty() && self.nodes.is_empty()
    }

    fn fops(&self, major: u32) -> Arc<dyn FileOperations> {
        self.chrdevs[&major].1.clone()
    }

    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn release_result(&self) -> Result<(), Errno> {
        if self.fail_release { Err(Errno::EBUSY) } else { Ok(()) }
    }
}

impl DeviceHost for MockHost {
    fn register_chrdev(
        &mut self,
        major: u32,
        name: &str,
        fops: Arc<dyn FileOperations>,
    ) -> Result<u32, Errno> {
        self.calls.push("register_chrdev");
        if let Some(e) = self.fail_identifier {
            return Err(e);
        }
        assert_eq!(major, 0, "driver should ask for a dynamic major");
        let major = self.next_major;
        self.next_major += 1;
        self.chrdevs.insert(major, (name.to_owned(), fops));
        Ok(major)
    }

    fn unregister_chrdev(&mut self, major: u32, name: &str) -> Result<(), Errno> {
        self.calls.push("unregister_chrdev");
        assert_eq!(self.chrdevs.get(&major).map(|(n, _)| n.as_str()), Some(name));
        self.chrdevs.remove(&major);
        self.release_result()
    }

    fn class_create(&mut self, name: &str) -> Result<ClassHandle, Errno> {
        self.calls.push("class_create");
        if let Some(e) = self.fail_class {
            return Err(e);
        }
        let class = ClassHandle(self.handle());
        self.classes.insert(class, name.to_owned());
        Ok(class)
    }

    fn class_destroy(&mut self, class: ClassHandle) -> Result<(), Errno> {
        self.calls.push("class_destroy");
        assert!(
            self.nodes.values().all(|(c, _)| *c != class),
            "class destroyed while it still has nodes"
        );
        self.classes.remove(&class);
        self.release_result()
    }

    fn device_create(
        &mut self,
        class: ClassHandle,
        devt: DevT,
        name: &str,
    ) -> Result<NodeHandle, Errno> {
        self.calls.push("device_create");
        if let Some(e) = self.fail_node {
            return Err(e);
        }
        assert!(self.classes.contains_key(&class));
        assert!(self.chrdevs.contains_key(&devt.major()));
        self.nodes.insert(devt, (class, name.to_owned()));
        Ok(NodeHandle(self.handle()))
    }

    fn device_destroy(&mut self, class: ClassHandle, devt: DevT) -> Result<(), Errno> {
        self.calls.push("device_destroy");
        assert_eq!(self.nodes.get(&devt).map(|(c, _)| *c), Some(class));
        self.nodes.remove(&devt);
        self.release_result()
    }
}

/*──────────────────────────── user memory ───────────────────────────────*/

/// `[BASE, BASE + len)` is mapped; everything else faults.
struct Flat(Vec<u8>);

const BASE: usize = 0x4000;
const AT: UserPtr = UserPtr::new(BASE);

impl UserMemory for Flat {
    fn copy_to_user(&mut self, dst: UserPtr, src: &[u8]) -> usize {
        match dst.addr().checked_sub(BASE) {
            Some(off) if off + src.len() <= self.0.len() => {
                self.0[off..off + src.len()].copy_from_slice(src);
                0
            }
            _ => src.len(),
        }
    }
}

/*──────────────────────────── log capture ───────────────────────────────*/

struct Capture {
    records: Mutex<Vec<(Level, String)>>,
}

static CAPTURE: Capture = Capture { records: Mutex::new(Vec::new()) };
static INSTALL: Once = Once::new();

impl Log for Capture {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut records = self.records.lock().unwrap();
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

fn capture_logs() {
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Info);
    });
}

/*──────────────────────────── lifecycle ─────────────────────────────────*/

#[test]
fn load_acquires_in_order_and_unload_releases_in_reverse() {
    let mut host = MockHost::new();
    let driver = DemoDriver::init(&mut host).unwrap();

    assert_eq!(host.calls, ["register_chrdev", "class_create", "device_create"]);
    let reg = driver.registration();
    assert_eq!(reg.state(), RegistrationState::Active);
    assert_eq!(reg.major(), 240);
    assert_eq!(reg.devt(), DevT::new(240, 0));
    assert_eq!(host.chrdevs[&240].0, DEVICE_NAME);
    assert_eq!(host.classes[&reg.class()], CLASS_NAME);
    assert_eq!(host.nodes[&reg.devt()].1, DEVICE_NAME);

    host.calls.clear();
    driver.exit(&mut host);
    assert_eq!(host.calls, ["device_destroy", "class_destroy", "unregister_chrdev"]);
    assert!(host.is_empty());
}

#[test]
fn identifier_failure_creates_nothing() {
    let mut host = MockHost::new();
    host.fail_identifier = Some(Errno::EBUSY);

    let err = DemoDriver::init(&mut host).err().unwrap();
    assert_eq!(err, RegistrationError::Identifier(Errno::EBUSY));
    assert_eq!(err.errno().as_status(), -16);
    assert_eq!(host.calls, ["register_chrdev"]);
    assert!(host.is_empty());
}

#[test]
fn class_failure_releases_identifier() {
    let mut host = MockHost::new();
    host.fail_class = Some(Errno::ENOMEM);

    let err = DemoDriver::init(&mut host).err().unwrap();
    assert_eq!(err, RegistrationError::Class(Errno::ENOMEM));
    assert_eq!(host.calls, ["register_chrdev", "class_create", "unregister_chrdev"]);
    assert!(host.is_empty());
}

#[test]
fn node_failure_destroys_class_then_releases_identifier() {
    let mut host = MockHost::new();
    host.fail_node = Some(Errno::EEXIST);

    let err = DemoDriver::init(&mut host).err().unwrap();
    assert_eq!(err, RegistrationError::Node(Errno::EEXIST));
    assert_eq!(err.failed_in(), RegistrationState::ClassCreated);
    assert_eq!(
        host.calls,
        ["register_chrdev", "class_create", "device_create", "class_destroy", "unregister_chrdev"]
    );
    assert!(host.is_empty());
}

#[test]
fn rejected_releases_do_not_stop_teardown() {
    let mut host = MockHost::new();
    let driver = DemoDriver::init(&mut host).unwrap();
    host.fail_release = true;
    host.calls.clear();

    driver.exit(&mut host);
    assert_eq!(host.calls, ["device_destroy", "class_destroy", "unregister_chrdev"]);
    assert!(host.is_empty());
}

#[test]
fn rejected_unwind_steps_do_not_stop_unwinding() {
    let mut host = MockHost::new();
    host.fail_node = Some(Errno::ENOMEM);
    host.fail_release = true;

    assert!(DemoDriver::init(&mut host).is_err());
    assert_eq!(&host.calls[3..], ["class_destroy", "unregister_chrdev"]);
    assert!(host.is_empty());
}

#[test]
fn reload_after_failed_load_succeeds() {
    let mut host = MockHost::new();
    host.fail_class = Some(Errno::ENOMEM);
    assert!(DemoDriver::init(&mut host).is_err());

    host.fail_class = None;
    let driver = DemoDriver::init(&mut host).unwrap();
    assert_eq!(host.nodes.len(), 1);
    driver.exit(&mut host);
    assert!(host.is_empty());
}

#[test]
fn load_failure_is_logged_at_error_level() {
    capture_logs();
    let mut host = MockHost::new();
    host.fail_class = Some(Errno::ENOMEM);
    let _ = DemoDriver::init(&mut host);

    let records = CAPTURE.records.lock().unwrap();
    assert!(
        records
            .iter()
            .any(|(lvl, msg)| *lvl == Level::Error && msg.contains("failed to create device class")),
        "no error record in {records:?}"
    );
}

/*──────────────────────────── transfers ─────────────────────────────────*/

#[test]
fn table_bound_to_major_serves_the_message() {
    let mut host = MockHost::new();
    let driver = DemoDriver::init(&mut host).unwrap();
    let fops = host.fops(driver.registration().major());

    let mut session = fops.open().unwrap();
    let mut mem = Flat(vec![0; 100]);
    assert_eq!(fops.read(&mut session, &mut mem, AT, 100), Ok(MESSAGE_LEN));
    assert_eq!(&mem.0[..MESSAGE_LEN], MESSAGE);
    assert_eq!(session.cursor(), MESSAGE_LEN);
    assert_eq!(fops.read(&mut session, &mut mem, AT, 100), Ok(0));

    assert_eq!(fops.write(&mut session, UserPtr::NULL, 10), Ok(10));
    fops.release(session);
    driver.exit(&mut host);
}

#[test]
fn chunked_reads_return_five_five_fifteen() {
    let mut host = MockHost::new();
    let driver = DemoDriver::init(&mut host).unwrap();
    let fops = host.fops(driver.registration().major());

    let mut session = fops.open().unwrap();
    let mut mem = Flat(vec![0; 100]);
    let mut got = Vec::new();
    for (len, want) in [(5, 5), (5, 5), (100, 15)] {
        assert_eq!(fops.read(&mut session, &mut mem, AT, len), Ok(want));
        got.extend_from_slice(&mem.0[..want]);
    }
    assert_eq!(got, MESSAGE);
    driver.exit(&mut host);
}

#[test]
fn faulting_read_is_efault_and_retryable() {
    let mut host = MockHost::new();
    let driver = DemoDriver::init(&mut host).unwrap();
    let fops = host.fops(driver.registration().major());

    let mut session = fops.open().unwrap();
    let mut mem = Flat(vec![0; 8]);
    assert_eq!(fops.read(&mut session, &mut mem, AT, 9), Err(Errno::EFAULT));
    assert_eq!(session.cursor(), 0);
    assert_eq!(fops.read(&mut session, &mut mem, AT, 8), Ok(8));
    assert_eq!(&mem.0[..], &MESSAGE[..8]);
    driver.exit(&mut host);
}

#[test]
fn concurrent_sessions_each_drain_the_whole_message() {
    let mut host = MockHost::new();
    let driver = DemoDriver::init(&mut host).unwrap();
    let fops = host.fops(driver.registration().major());

    let workers: Vec<_> = (1..=6)
        .map(|chunk| {
            let fops = fops.clone();
            thread::spawn(move || {
                let mut session = fops.open().unwrap();
                let mut mem = Flat(vec![0; chunk]);
                let mut got = Vec::new();
                loop {
                    let n = fops.read(&mut session, &mut mem, AT, chunk).unwrap();
                    if n == 0 {
                        break;
                    }
                    got.extend_from_slice(&mem.0[..n]);
                }
                fops.release(session);
                got
            })
        })
        .collect();

    for worker in workers {
        assert_eq!(worker.join().unwrap(), MESSAGE);
    }
    driver.exit(&mut host);
}
