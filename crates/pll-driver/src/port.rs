//! Port I/O backends.
//!
//! The SMBus host controller sits in x86 I/O space. [`DevPort`] reaches it
//! through the Linux `/dev/port` character device, where the file offset is
//! the port number. The transaction layer only sees the [`PortIo`] trait, so
//! a software model (see [`crate::sim`]) can stand in for hardware.

use crate::error::{PllError, Result};
use rustix::io::{pread, pwrite};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Byte-wide access to I/O ports.
pub trait PortIo {
    /// Read one byte from `port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot access the port.
    fn inb(&mut self, port: u16) -> io::Result<u8>;

    /// Write one byte to `port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot access the port.
    fn outb(&mut self, port: u16, value: u8) -> io::Result<()>;
}

impl<T: PortIo + ?Sized> PortIo for &mut T {
    fn inb(&mut self, port: u16) -> io::Result<u8> {
        (**self).inb(port)
    }

    fn outb(&mut self, port: u16, value: u8) -> io::Result<()> {
        (**self).outb(port, value)
    }
}

impl<T: PortIo + ?Sized> PortIo for Box<T> {
    fn inb(&mut self, port: u16) -> io::Result<u8> {
        (**self).inb(port)
    }

    fn outb(&mut self, port: u16, value: u8) -> io::Result<()> {
        (**self).outb(port, value)
    }
}

/// `/dev/port` backend.
///
/// Requires `CAP_SYS_RAWIO` (in practice, root).
#[derive(Debug)]
pub struct DevPort {
    file: File,
    path: PathBuf,
}

impl DevPort {
    /// Default port device.
    pub const DEFAULT_PATH: &'static str = "/dev/port";

    /// Open `/dev/port`.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened read-write.
    pub fn open() -> Result<Self> {
        Self::open_path(Self::DEFAULT_PATH)
    }

    /// Open a port device at `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened read-write.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| PllError::port_device(path, e))?;
        debug!("Opened port device {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path this backend was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PortIo for DevPort {
    fn inb(&mut self, port: u16) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        let n = pread(&self.file, &mut buf, u64::from(port))?;
        if n != 1 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("port {port:#06x} not readable"),
            ));
        }
        Ok(buf[0])
    }

    fn outb(&mut self, port: u16, value: u8) -> io::Result<()> {
        let n = pwrite(&self.file, &[value], u64::from(port))?;
        if n != 1 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("port {port:#06x} not writable"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_offset_is_port_number() {
        let mut scratch = tempfile::NamedTempFile::new().unwrap();
        scratch.write_all(&[0u8; 0x20]).unwrap();
        scratch.flush().unwrap();

        let mut port = DevPort::open_path(scratch.path()).unwrap();
        port.outb(0x15, 0xA5).unwrap();
        assert_eq!(port.inb(0x15).unwrap(), 0xA5);
        assert_eq!(port.inb(0x14).unwrap(), 0x00);

        let on_disk = std::fs::read(scratch.path()).unwrap();
        assert_eq!(on_disk[0x15], 0xA5);
    }

    #[test]
    fn read_past_end_is_an_error() {
        let scratch = tempfile::NamedTempFile::new().unwrap();
        let mut port = DevPort::open_path(scratch.path()).unwrap();
        let err = port.inb(0x400).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn missing_device_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("port");
        let err = DevPort::open_path(&missing).unwrap_err();
        assert!(matches!(err, PllError::PortDevice { ref path, .. } if *path == missing));
    }
}
