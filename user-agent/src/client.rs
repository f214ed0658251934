//! Demo client run against the simulated host.
//!
//! 1. Load the driver (`insmod`)
//! 2. For each configured session: open the node, read it dry in
//!    `read_chunk` steps, write the payload, close
//! 3. Unload the driver (`rmmod`) even if a session failed
//! 4. Check that no node is left behind

use demo_driver::{Errno, RegistrationError};
use demo_shared::constants::NODE_PATH;
use log::Level;
use thiserror::Error;

use crate::config::{ClientConfig, Config};
use crate::host::{Fd, SimHost};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("driver failed to load: {0}")]
    Load(#[from] RegistrationError),

    #[error("{op} on {target} failed: {errno}")]
    Syscall {
        op:     &'static str,
        target: String,
        errno:  Errno,
    },

    #[error("write accepted {accepted} of {requested} bytes")]
    ShortWrite { requested: usize, accepted: usize },

    #[error("{0} still present after unload")]
    Leftover(String),
}

/// What one open/read/write/close cycle observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Size of every non-zero read, in order.
    pub reads:   Vec<usize>,
    pub data:    Vec<u8>,
    pub written: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub major:    u32,
    pub sessions: Vec<SessionReport>,
}

pub fn run(cfg: &Config) -> Result<Report, ClientError> {
    let mut host = SimHost::new(&cfg.host);
    run_on(&mut host, &cfg.client)
}

/// Same as [`run`] against a caller-owned host, so tests can inspect it after.
pub fn run_on(host: &mut SimHost, cfg: &ClientConfig) -> Result<Report, ClientError> {
    let driver = host.load()?;
    let major = driver.registration().major();

    let sessions: Result<Vec<_>, _> = (0..cfg.sessions).map(|_| run_session(host, cfg)).collect();
    host.unload(driver);
    let sessions = sessions?;

    if let Some(path) = host.devices.dev_entries().into_iter().next() {
        return Err(ClientError::Leftover(path));
    }
    Ok(Report { major, sessions })
}

fn run_session(host: &mut SimHost, cfg: &ClientConfig) -> Result<SessionReport, ClientError> {
    let fd = host.open(NODE_PATH).map_err(|errno| syscall("open", NODE_PATH, errno))?;
    agent_log!(Level::Info, "client", "opened {} as {}", NODE_PATH, fd);

    let outcome = drain(host, fd, cfg.read_chunk).and_then(|(reads, data)| {
        let written = write_payload(host, fd, cfg.write_payload.as_bytes())?;
        Ok(SessionReport { reads, data, written })
    });

    host.close(fd).map_err(|errno| syscall("close", &fd.to_string(), errno))?;
    outcome
}

/// Read until the driver reports end of data.
fn drain(host: &mut SimHost, fd: Fd, chunk: usize) -> Result<(Vec<usize>, Vec<u8>), ClientError> {
    let buf = host.memory.map(chunk);
    let mut reads = Vec::new();
    let mut data = Vec::new();

    let result = loop {
        let n = host.read(fd, buf, chunk);
        if n < 0 {
            break Err(syscall("read", &fd.to_string(), Errno::from_raw(n as i32)));
        }
        if n == 0 {
            break Ok(());
        }
        let n = n as usize;
        agent_log!(Level::Debug, "client", "{}: read {} bytes", fd, n);
        reads.push(n);
        if let Some(bytes) = host.memory.peek(buf, n) {
            data.extend_from_slice(bytes);
        }
    };

    host.memory.unmap(buf);
    result.map(|()| (reads, data))
}

fn write_payload(host: &mut SimHost, fd: Fd, payload: &[u8]) -> Result<usize, ClientError> {
    let buf = host.memory.map_bytes(payload);
    let status = host.write(fd, buf, payload.len());
    host.memory.unmap(buf);

    if status < 0 {
        return Err(syscall("write", &fd.to_string(), Errno::from_raw(status as i32)));
    }
    let accepted = status as usize;
    if accepted != payload.len() {
        return Err(ClientError::ShortWrite { requested: payload.len(), accepted });
    }
    agent_log!(Level::Debug, "client", "{}: wrote {} bytes", fd, accepted);
    Ok(accepted)
}

fn syscall(op: &'static str, target: &str, errno: Errno) -> ClientError {
    ClientError::Syscall { op, target: target.to_owned(), errno }
}
