//! Names and fixed data shared by the driver and user space.

/// Name the driver claims its major number under and publishes its node as.
pub const DEVICE_NAME: &str = "driver_demo";
/// Device class the node is grouped under.
pub const CLASS_NAME: &str = "demo";

/// Minor number of the single published node.
pub const FIRST_MINOR: u32 = 0;

/// Message served to every session. The trailing NUL is part of the payload.
pub const MESSAGE: &[u8] = b"Hello from driver-demo!\n\0";
pub const MESSAGE_LEN: usize = MESSAGE.len();

pub const DEV_DIR: &str = "/dev";
pub const CLASS_DIR: &str = "/sys/class";

/// `/dev/driver_demo`
pub const NODE_PATH: &str = "/dev/driver_demo";
/// `/sys/class/demo/driver_demo`
pub const CLASS_NODE_PATH: &str = "/sys/class/demo/driver_demo";
