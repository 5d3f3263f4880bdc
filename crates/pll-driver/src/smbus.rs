//! SMBus transaction layer.
//!
//! One [`SmBus`] owns a port backend and the controller's base address. Every
//! public operation runs exactly one transaction through the same sequence:
//!
//! ```text
//! clear stale status ─► program CMD/DAT/ADD ─► CNT = START | protocol
//!        │                                              │
//!   still set? ResetFailed                   poll STS until !HOST_BUSY
//!                                                       │
//!                        Timeout ◄── cap reached ───────┤
//!                                                       ▼
//!                              classify faults, write-1-to-clear STS
//!                                                       │
//!                                         drain DAT0/DAT1/BLK_DAT
//! ```
//!
//! Nothing is retried here; the caller decides. Concurrent use of one
//! controller from several threads must be serialized by the caller, which
//! `&mut self` on every operation already enforces within one `SmBus`.

use crate::error::{BusFault, PllError, Result};
use crate::port::PortIo;
use pll_chip::smbus::{
    address_byte, control, probe_with_receive_byte, status, Direction, Protocol, BLK_DAT,
    BLOCK_MAX, HST_ADD, HST_CMD, HST_CNT, HST_DAT0, HST_DAT1, HST_STS, SCAN_FIRST, SCAN_LAST,
};
use std::time::Duration;
use tracing::{debug, trace, warn, Level};

/// Transaction layer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// I/O base address of the host controller.
    pub base: u16,
    /// Sleep between status polls.
    pub poll_interval: Duration,
    /// Polls before a busy host is declared timed out.
    pub max_polls: u32,
}

impl BusConfig {
    /// Default sleep between status polls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
    /// Default poll cap; with the default interval the worst case is one second.
    pub const DEFAULT_MAX_POLLS: u32 = 10;

    /// Configuration for the controller at `base` with default polling.
    pub const fn new(base: u16) -> Self {
        Self {
            base,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_polls: Self::DEFAULT_MAX_POLLS,
        }
    }

    /// Set the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the poll cap. Zero is treated as one.
    #[must_use]
    pub const fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }
}

/// SMBus host controller driver.
#[derive(Debug)]
pub struct SmBus<P> {
    io: P,
    config: BusConfig,
}

impl<P: PortIo> SmBus<P> {
    /// Drive the controller described by `config` through `io`.
    pub const fn new(io: P, config: BusConfig) -> Self {
        Self { io, config }
    }

    /// Active configuration.
    pub const fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Port backend.
    pub const fn io(&self) -> &P {
        &self.io
    }

    /// Mutable port backend.
    pub fn io_mut(&mut self) -> &mut P {
        &mut self.io
    }

    /// Give back the port backend.
    pub fn into_inner(self) -> P {
        self.io
    }

    fn port(&self, offset: u16) -> u16 {
        self.config.base.wrapping_add(offset)
    }

    fn inb(&mut self, offset: u16) -> Result<u8> {
        let port = self.port(offset);
        Ok(self.io.inb(port)?)
    }

    fn outb(&mut self, offset: u16, value: u8) -> Result<()> {
        let port = self.port(offset);
        Ok(self.io.outb(port, value)?)
    }

    /// Trace-level register dump. Skipped entirely unless tracing wants it,
    /// since reading `HST_CNT` rewinds the block pointer.
    fn dump_registers(&mut self, when: &str) -> Result<()> {
        if tracing::enabled!(Level::TRACE) {
            let sts = self.inb(HST_STS)?;
            let cnt = self.inb(HST_CNT)?;
            let add = self.inb(HST_ADD)?;
            let dat0 = self.inb(HST_DAT0)?;
            trace!("{when}: STS={sts:#04x} CNT={cnt:#04x} ADD={add:#04x} DAT0={dat0:#04x}");
        }
        Ok(())
    }

    /// Run the programmed transaction and classify the outcome.
    fn transact(&mut self, protocol: Protocol) -> Result<()> {
        self.dump_registers("txn pre")?;

        let stale = self.inb(HST_STS)?;
        if stale & status::ALL != 0 {
            debug!("SMBus busy ({stale:#04x}), resetting");
            self.outb(HST_STS, stale)?;
            let after = self.inb(HST_STS)?;
            if after & status::ALL != 0 {
                debug!("SMBus reset failed ({after:#04x})");
                return Err(BusFault::ResetFailed { status: after }.into());
            }
        }

        self.outb(HST_CNT, control::START | protocol.bits())?;

        let max_polls = self.config.max_polls.max(1);
        let mut polls = 0;
        let sts = loop {
            std::thread::sleep(self.config.poll_interval);
            let sts = self.inb(HST_STS)?;
            polls += 1;
            if sts & status::HOST_BUSY == 0 || polls >= max_polls {
                break sts;
            }
        };

        let fault = if sts & status::HOST_BUSY != 0 {
            Some(BusFault::Timeout { status: sts })
        } else {
            BusFault::from_completion_status(sts)
        };

        if sts & status::ALL != 0 {
            self.outb(HST_STS, sts)?;
        }
        self.dump_registers("txn post")?;

        match fault {
            Some(fault) => {
                debug!("{protocol} transaction: {fault}");
                Err(fault.into())
            }
            None => {
                trace!("{protocol} transaction done after {polls} polls");
                Ok(())
            }
        }
    }

    fn select(&mut self, slave: u8, direction: Direction) -> Result<()> {
        self.outb(HST_ADD, address_byte(slave, direction))
    }

    /// Quick write: address only, R/W = write.
    ///
    /// # Errors
    ///
    /// Returns the bus fault or port error of the transaction.
    pub fn write_quick(&mut self, slave: u8) -> Result<()> {
        debug!("write_quick({slave:#04x})");
        self.select(slave, Direction::Write)?;
        self.transact(Protocol::Quick)
    }

    /// Quick read: address only, R/W = read.
    ///
    /// # Errors
    ///
    /// Returns the bus fault or port error of the transaction.
    pub fn read_quick(&mut self, slave: u8) -> Result<()> {
        debug!("read_quick({slave:#04x})");
        self.select(slave, Direction::Read)?;
        self.transact(Protocol::Quick)
    }

    /// Receive one byte without a command.
    ///
    /// # Errors
    ///
    /// Returns the bus fault or port error of the transaction.
    pub fn read_byte(&mut self, slave: u8) -> Result<u8> {
        self.select(slave, Direction::Read)?;
        self.transact(Protocol::Byte)?;
        let value = self.inb(HST_DAT0)?;
        debug!("read_byte({slave:#04x}) = {value:#04x}");
        Ok(value)
    }

    /// Send one byte without a command; the byte travels in `HST_CMD`.
    ///
    /// # Errors
    ///
    /// Returns the bus fault or port error of the transaction.
    pub fn write_byte(&mut self, slave: u8, value: u8) -> Result<()> {
        debug!("write_byte({slave:#04x}, {value:#04x})");
        self.outb(HST_CMD, value)?;
        self.select(slave, Direction::Write)?;
        self.transact(Protocol::Byte)
    }

    /// Read the byte at `command`.
    ///
    /// # Errors
    ///
    /// Returns the bus fault or port error of the transaction.
    pub fn read_byte_data(&mut self, slave: u8, command: u8) -> Result<u8> {
        self.outb(HST_CMD, command)?;
        self.select(slave, Direction::Read)?;
        self.transact(Protocol::ByteData)?;
        let value = self.inb(HST_DAT0)?;
        debug!("read_byte_data({slave:#04x}, {command:#04x}) = {value:#04x}");
        Ok(value)
    }

    /// Write `value` at `command`.
    ///
    /// # Errors
    ///
    /// Returns the bus fault or port error of the transaction.
    pub fn write_byte_data(&mut self, slave: u8, command: u8, value: u8) -> Result<()> {
        debug!("write_byte_data({slave:#04x}, {command:#04x}, {value:#04x})");
        self.outb(HST_CMD, command)?;
        self.outb(HST_DAT0, value)?;
        self.select(slave, Direction::Write)?;
        self.transact(Protocol::ByteData)
    }

    /// Read the little-endian word at `command`.
    ///
    /// # Errors
    ///
    /// Returns the bus fault or port error of the transaction.
    pub fn read_word_data(&mut self, slave: u8, command: u8) -> Result<u16> {
        self.outb(HST_CMD, command)?;
        self.select(slave, Direction::Read)?;
        self.transact(Protocol::WordData)?;
        let lo = self.inb(HST_DAT0)?;
        let hi = self.inb(HST_DAT1)?;
        let value = u16::from_le_bytes([lo, hi]);
        debug!("read_word_data({slave:#04x}, {command:#04x}) = {value:#06x}");
        Ok(value)
    }

    /// Write the little-endian word `value` at `command`.
    ///
    /// # Errors
    ///
    /// Returns the bus fault or port error of the transaction.
    pub fn write_word_data(&mut self, slave: u8, command: u8, value: u16) -> Result<()> {
        debug!("write_word_data({slave:#04x}, {command:#04x}, {value:#06x})");
        let [lo, hi] = value.to_le_bytes();
        self.outb(HST_CMD, command)?;
        self.outb(HST_DAT0, lo)?;
        self.outb(HST_DAT1, hi)?;
        self.select(slave, Direction::Write)?;
        self.transact(Protocol::WordData)
    }

    /// Block read into `buf`.
    ///
    /// The slave's declared length replaces whatever `buf` can hold. It is
    /// clamped to [`BLOCK_MAX`] and exactly that many bytes are drained from
    /// the block port; bytes that do not fit in `buf` are discarded.
    ///
    /// Returns the number of bytes stored in `buf`.
    ///
    /// # Errors
    ///
    /// Returns the bus fault or port error of the transaction.
    pub fn read_block_data(&mut self, slave: u8, command: u8, buf: &mut [u8]) -> Result<usize> {
        self.outb(HST_CMD, command)?;
        self.select(slave, Direction::Read)?;
        self.transact(Protocol::BlockData)?;

        let declared = usize::from(self.inb(HST_DAT0)?);
        let len = if declared > BLOCK_MAX {
            warn!("Slave {slave:#04x} declared {declared} block bytes, clamping to {BLOCK_MAX}");
            BLOCK_MAX
        } else {
            declared
        };

        // Reading HST_CNT rewinds the block data pointer.
        self.inb(HST_CNT)?;
        let mut stored = 0;
        for i in 0..len {
            let byte = self.inb(BLK_DAT)?;
            if let Some(slot) = buf.get_mut(i) {
                *slot = byte;
                stored += 1;
            }
        }
        if stored < len {
            warn!("Block read of {len} bytes truncated to {stored}");
        }
        debug!("read_block_data({slave:#04x}, {command:#04x}) = {len} bytes");
        Ok(stored)
    }

    /// Block write of `data`, at most [`BLOCK_MAX`] bytes.
    ///
    /// The length goes to `HST_DAT0` and the payload to the block port before
    /// the transaction starts. Returns the number of bytes sent.
    ///
    /// # Errors
    ///
    /// Returns the bus fault or port error of the transaction.
    pub fn write_block_data(&mut self, slave: u8, command: u8, data: &[u8]) -> Result<usize> {
        let data = if data.len() > BLOCK_MAX {
            warn!("Block write of {} bytes truncated to {BLOCK_MAX}", data.len());
            &data[..BLOCK_MAX]
        } else {
            data
        };
        debug!("write_block_data({slave:#04x}, {command:#04x}, {} bytes)", data.len());

        let len = u8::try_from(data.len()).unwrap_or(u8::MAX);
        self.outb(HST_CMD, command)?;
        self.outb(HST_DAT0, len)?;
        self.inb(HST_CNT)?;
        for &byte in data {
            self.outb(BLK_DAT, byte)?;
        }
        self.select(slave, Direction::Write)?;
        self.transact(Protocol::BlockData)?;
        Ok(data.len())
    }

    /// Whether `slave` acknowledges a quick write.
    ///
    /// Bus faults mean "absent"; port errors are propagated.
    ///
    /// # Errors
    ///
    /// Returns error if the port backend fails.
    pub fn probe_present(&mut self, slave: u8) -> Result<bool> {
        match self.write_quick(slave) {
            Ok(()) => Ok(true),
            Err(PllError::Bus(fault)) => {
                trace!("{slave:#04x} absent: {fault}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Addresses that answer on the bus.
    ///
    /// EEPROM ranges are probed with a receive byte, everything else with a
    /// quick write. Reserved addresses are skipped.
    ///
    /// # Errors
    ///
    /// Returns error if the port backend fails.
    pub fn scan(&mut self) -> Result<Vec<u8>> {
        debug!("Scanning SMBus at {:#06x}", self.config.base);
        let mut found = Vec::new();
        for slave in SCAN_FIRST..=SCAN_LAST {
            let probe = if probe_with_receive_byte(slave) {
                self.read_byte(slave).map(drop)
            } else {
                self.write_quick(slave)
            };
            match probe {
                Ok(()) => {
                    debug!("Found slave {slave:#04x}");
                    found.push(slave);
                }
                Err(PllError::Bus(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(found)
    }
}
