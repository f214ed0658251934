//! In-process device manager: the host side of `register_chrdev`,
//! `class_create` and `device_create`.
//!
//! Dynamic majors are handed out from 254 downward, the way Linux scans its
//! dynamic range. Nodes are published under `/dev/<name>` and listed under
//! `/sys/class/<class>/<name>`.

use std::collections::BTreeMap;
use std::sync::Arc;

use demo_driver::{ClassHandle, DevT, DeviceHost, Errno, FileOperations, NodeHandle};
use demo_shared::constants::{CLASS_DIR, DEV_DIR};
use log::{debug, warn};

use crate::config::{FaultPlan, HostConfig};

const DYNAMIC_MAJOR_END: u32 = 254;

struct Chrdev {
    name: String,
    fops: Arc<dyn FileOperations>,
}

struct Class {
    name: String,
}

/// One published node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub handle: NodeHandle,
    pub class:  ClassHandle,
    pub devt:   DevT,
    pub name:   String,
}

pub struct DeviceManager {
    lowest_major: u32,
    faults:       FaultPlan,
    next_handle:  u32,
    chrdevs:      BTreeMap<u32, Chrdev>,
    classes:      BTreeMap<ClassHandle, Class>,
    nodes:        BTreeMap<DevT, Node>,
}

impl DeviceManager {
    pub fn new(cfg: &HostConfig) -> Self {
        let span = cfg.dynamic_majors.clamp(1, DYNAMIC_MAJOR_END);
        Self {
            lowest_major: DYNAMIC_MAJOR_END + 1 - span,
            faults:       cfg.faults.clone(),
            next_handle:  0,
            chrdevs:      BTreeMap::new(),
            classes:      BTreeMap::new(),
            nodes:        BTreeMap::new(),
        }
    }

    /// Change which calls fail from now on.
    pub fn set_faults(&mut self, faults: FaultPlan) {
        self.faults = faults;
    }

    /// Nothing registered, no class, no node.
    pub fn is_idle(&self) -> bool {
        self.chrdevs.is_empty() && self.classes.is_empty() && self.nodes.is_empty()
    }

    pub fn chrdev_count(&self) -> usize {
        self.chrdevs.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Paths of every published node, sorted.
    pub fn dev_entries(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.nodes.values().map(|n| format!("{DEV_DIR}/{}", n.name)).collect();
        paths.sort();
        paths
    }

    /// `/sys/class/<class>/<node>` entries, sorted.
    pub fn class_entries(&self) -> Vec<String> {
        let mut paths: Vec<_> = self
            .nodes
            .values()
            .filter_map(|n| {
                let class = self.classes.get(&n.class)?;
                Some(format!("{CLASS_DIR}/{}/{}", class.name, n.name))
            })
            .collect();
        paths.sort();
        paths
    }

    /// Resolve a `/dev` path to its node.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let name = path.strip_prefix(DEV_DIR)?.strip_prefix('/')?;
        self.nodes.values().find(|n| n.name == name)
    }

    /// Operation table bound to `devt`'s major, if any.
    pub fn fops_for(&self, devt: DevT) -> Option<Arc<dyn FileOperations>> {
        self.chrdevs.get(&devt.major()).map(|c| c.fops.clone())
    }

    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn released(&self, what: &str) -> Result<(), Errno> {
        if self.faults.release {
            warn!("injected failure releasing {what}");
            Err(Errno::EBUSY)
        } else {
            Ok(())
        }
    }

    fn free_dynamic_major(&self) -> Option<u32> {
        (self.lowest_major..=DYNAMIC_MAJOR_END)
            .rev()
            .find(|m| !self.chrdevs.contains_key(m))
    }
}

impl DeviceHost for DeviceManager {
    fn register_chrdev(
        &mut self,
        major: u32,
        name: &str,
        fops: Arc<dyn FileOperations>,
    ) -> Result<u32, Errno> {
        if let Some(e) = self.faults.identifier {
            warn!("injected register_chrdev failure: {e}");
            return Err(e);
        }
        if self.chrdevs.values().any(|c| c.name == name) {
            return Err(Errno::EBUSY);
        }
        let major = match major {
            0 => self.free_dynamic_major().ok_or(Errno::EBUSY)?,
            m if self.chrdevs.contains_key(&m) => return Err(Errno::EBUSY),
            m => m,
        };
        self.chrdevs.insert(major, Chrdev { name: name.to_owned(), fops });
        debug!("chrdev {major} -> '{name}'");
        Ok(major)
    }

    fn unregister_chrdev(&mut self, major: u32, name: &str) -> Result<(), Errno> {
        match self.chrdevs.get(&major) {
            Some(c) if c.name == name => {
                self.chrdevs.remove(&major);
                debug!("chrdev {major} released");
                self.released("chrdev")
            }
            _ => Err(Errno::EINVAL),
        }
    }

    fn class_create(&mut self, name: &str) -> Result<ClassHandle, Errno> {
        if let Some(e) = self.faults.class {
            warn!("injected class_create failure: {e}");
            return Err(e);
        }
        if self.classes.values().any(|c| c.name == name) {
            return Err(Errno::EEXIST);
        }
        let class = ClassHandle(self.handle());
        self.classes.insert(class, Class { name: name.to_owned() });
        debug!("class '{name}' created");
        Ok(class)
    }

    /// Destroying a class also drops any node still listed under it.
    fn class_destroy(&mut self, class: ClassHandle) -> Result<(), Errno> {
        let Some(removed) = self.classes.remove(&class) else {
            return Err(Errno::EINVAL);
        };
        self.nodes.retain(|_, n| n.class != class);
        debug!("class '{}' destroyed", removed.name);
        self.released("class")
    }

    fn device_create(
        &mut self,
        class: ClassHandle,
        devt: DevT,
        name: &str,
    ) -> Result<NodeHandle, Errno> {
        if let Some(e) = self.faults.node {
            warn!("injected device_create failure: {e}");
            return Err(e);
        }
        if !self.classes.contains_key(&class) {
            return Err(Errno::EINVAL);
        }
        if self.nodes.contains_key(&devt) || self.nodes.values().any(|n| n.name == name) {
            return Err(Errno::EEXIST);
        }
        let handle = NodeHandle(self.handle());
        self.nodes.insert(devt, Node { handle, class, devt, name: name.to_owned() });
        debug!("node {DEV_DIR}/{name} at {devt}");
        Ok(handle)
    }

    fn device_destroy(&mut self, class: ClassHandle, devt: DevT) -> Result<(), Errno> {
        match self.nodes.get(&devt) {
            Some(n) if n.class == class => {
                self.nodes.remove(&devt);
                debug!("node at {devt} removed");
                self.released("node")
            }
            _ => Err(Errno::ENOENT),
        }
    }
}
