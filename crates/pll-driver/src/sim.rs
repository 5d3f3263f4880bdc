//! Software model of a PIIX4/VIA SMBus host controller.
//!
//! [`SimulatedBus`] decodes the eight controller ports at a base address and
//! executes transactions against attached slave images the moment `START` is
//! written. It exists for tests and for `--simulate` runs on machines without
//! the hardware, so it records everything a test might want to assert on.
//!
//! Fault knobs:
//!
//! | Knob | Effect |
//! |------|--------|
//! | [`with_busy_polls`](SimulatedBus::with_busy_polls) | `HOST_BUSY` for the first N status reads after start |
//! | [`stuck_busy`](SimulatedBus::stuck_busy) | `HOST_BUSY` never clears (timeout) |
//! | [`inject_fault`](SimulatedBus::inject_fault) | completion status of the next transaction |
//! | [`with_stuck_status`](SimulatedBus::with_stuck_status) | status bits write-1-to-clear cannot clear (reset failure) |
//! | [`declare_block_length`](SimulatedBus::declare_block_length) | length byte a block read reports |

use crate::port::PortIo;
use pll_chip::smbus::{
    control, status, Direction, Protocol, BLK_DAT, BLOCK_MAX, HST_ADD, HST_CMD, HST_CNT,
    HST_DAT0, HST_DAT1, HST_STS, PORT_COUNT,
};
use std::collections::BTreeMap;
use std::io;
use tracing::trace;

/// One transaction the simulated controller executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// 7-bit slave address.
    pub slave: u8,
    /// R/W bit.
    pub direction: Direction,
    /// Size class.
    pub protocol: Protocol,
    /// `HST_CMD` at start.
    pub command: u8,
    /// Bytes written to the slave, or returned by it.
    pub data: Vec<u8>,
    /// Completion status (before any clear).
    pub status: u8,
}

/// Simulated SMBus host controller.
#[derive(Debug, Clone)]
pub struct SimulatedBus {
    base: u16,
    sts: u8,
    cnt: u8,
    cmd: u8,
    add: u8,
    dat0: u8,
    dat1: u8,
    block: [u8; BLOCK_MAX],
    block_index: usize,
    devices: BTreeMap<u8, Vec<u8>>,
    busy_polls: u32,
    busy_remaining: u32,
    stuck_busy: bool,
    stuck_status: u8,
    pending_fault: Option<u8>,
    declared_length: Option<u8>,
    log: Vec<Transaction>,
    block_reads: usize,
    block_writes: usize,
}

impl SimulatedBus {
    /// Idle controller at `base` with no slaves attached.
    pub fn new(base: u16) -> Self {
        Self {
            base,
            sts: 0,
            cnt: 0,
            cmd: 0,
            add: 0,
            dat0: 0,
            dat1: 0,
            block: [0; BLOCK_MAX],
            block_index: 0,
            devices: BTreeMap::new(),
            busy_polls: 0,
            busy_remaining: 0,
            stuck_busy: false,
            stuck_status: 0,
            pending_fault: None,
            declared_length: None,
            log: Vec::new(),
            block_reads: 0,
            block_writes: 0,
        }
    }

    /// Attach a slave holding `image`.
    #[must_use]
    pub fn with_device(mut self, slave: u8, image: impl Into<Vec<u8>>) -> Self {
        self.attach(slave, image);
        self
    }

    /// Attach (or replace) a slave holding `image`.
    pub fn attach(&mut self, slave: u8, image: impl Into<Vec<u8>>) {
        self.devices.insert(slave & 0x7F, image.into());
    }

    /// Keep `HOST_BUSY` set for the first `polls` status reads of each transaction.
    #[must_use]
    pub const fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Never finish a transaction.
    #[must_use]
    pub const fn stuck_busy(mut self) -> Self {
        self.stuck_busy = true;
        self
    }

    /// Status bits that survive write-1-to-clear.
    #[must_use]
    pub const fn with_stuck_status(mut self, bits: u8) -> Self {
        self.stuck_status = bits;
        self
    }

    /// Length byte reported by every block read, instead of the image length.
    #[must_use]
    pub const fn declare_block_length(mut self, length: u8) -> Self {
        self.declared_length = Some(length);
        self
    }

    /// Complete the next transaction with `bits` instead of success.
    pub fn inject_fault(&mut self, bits: u8) {
        self.pending_fault = Some(bits);
    }

    /// Image held by `slave`.
    pub fn device(&self, slave: u8) -> Option<&[u8]> {
        self.devices.get(&slave).map(Vec::as_slice)
    }

    /// Every transaction started so far, in order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Transactions that wrote to a slave.
    pub fn writes(&self) -> impl Iterator<Item = &Transaction> {
        self.log
            .iter()
            .filter(|t| t.direction == Direction::Write && t.protocol != Protocol::Quick)
    }

    /// Block data port reads.
    pub const fn block_reads(&self) -> usize {
        self.block_reads
    }

    /// Block data port writes.
    pub const fn block_writes(&self) -> usize {
        self.block_writes
    }

    /// Forget recorded transactions and counters.
    pub fn clear_log(&mut self) {
        self.log.clear();
        self.block_reads = 0;
        self.block_writes = 0;
    }

    fn offset(&self, port: u16) -> io::Result<u16> {
        port.checked_sub(self.base)
            .filter(|&offset| offset < PORT_COUNT)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("port {port:#06x} not decoded by controller at {:#06x}", self.base),
                )
            })
    }

    fn start(&mut self) {
        let slave = self.add >> 1;
        let direction = if self.add & 1 == 1 {
            Direction::Read
        } else {
            Direction::Write
        };
        let Some(protocol) = Protocol::from_control(self.cnt) else {
            self.sts = status::FAILED;
            return;
        };

        let (data, completion) = if let Some(bits) = self.pending_fault.take() {
            (Vec::new(), bits)
        } else if let Some(image) = self.devices.get_mut(&slave) {
            let data = Self::execute(
                image,
                protocol,
                direction,
                self.cmd,
                self.declared_length,
                &mut self.dat0,
                &mut self.dat1,
                &mut self.block,
            );
            (data, status::INTR)
        } else {
            (Vec::new(), status::DEV_ERR)
        };

        trace!("sim {protocol} {direction:?} slave={slave:#04x} cmd={:#04x} -> {completion:#04x}", self.cmd);
        self.log.push(Transaction {
            slave,
            direction,
            protocol,
            command: self.cmd,
            data,
            status: completion,
        });
        self.sts = completion;
        self.busy_remaining = if self.stuck_busy {
            u32::MAX
        } else {
            self.busy_polls
        };
    }

    #[allow(clippy::too_many_arguments)]
    fn execute(
        image: &mut Vec<u8>,
        protocol: Protocol,
        direction: Direction,
        cmd: u8,
        declared_length: Option<u8>,
        dat0: &mut u8,
        dat1: &mut u8,
        block: &mut [u8; BLOCK_MAX],
    ) -> Vec<u8> {
        let at = usize::from(cmd);
        match (protocol, direction) {
            (Protocol::Quick, _) => Vec::new(),
            (Protocol::Byte, Direction::Read) => {
                *dat0 = image.first().copied().unwrap_or(0xFF);
                vec![*dat0]
            }
            (Protocol::Byte, Direction::Write) => vec![cmd],
            (Protocol::ByteData, Direction::Read) => {
                *dat0 = image.get(at).copied().unwrap_or(0xFF);
                vec![*dat0]
            }
            (Protocol::ByteData, Direction::Write) => {
                store(image, at, &[*dat0]);
                vec![*dat0]
            }
            (Protocol::WordData, Direction::Read) => {
                *dat0 = image.get(at).copied().unwrap_or(0xFF);
                *dat1 = image.get(at + 1).copied().unwrap_or(0xFF);
                vec![*dat0, *dat1]
            }
            (Protocol::WordData, Direction::Write) => {
                store(image, at, &[*dat0, *dat1]);
                vec![*dat0, *dat1]
            }
            (Protocol::BlockData, Direction::Read) => {
                let len = image.len().min(BLOCK_MAX);
                *dat0 = declared_length.unwrap_or_else(|| u8::try_from(len).unwrap_or(u8::MAX));
                block.fill(0);
                block[..len].copy_from_slice(&image[..len]);
                image[..len].to_vec()
            }
            (Protocol::BlockData, Direction::Write) => {
                let len = usize::from(*dat0).min(BLOCK_MAX);
                let payload = block[..len].to_vec();
                store(image, 0, &payload);
                payload
            }
        }
    }

    fn read_status(&mut self) -> u8 {
        if self.busy_remaining > 0 {
            if !self.stuck_busy {
                self.busy_remaining -= 1;
            }
            return status::HOST_BUSY | self.stuck_status;
        }
        self.sts | self.stuck_status
    }
}

fn store(image: &mut Vec<u8>, at: usize, bytes: &[u8]) {
    let end = at + bytes.len();
    if image.len() < end {
        image.resize(end, 0);
    }
    image[at..end].copy_from_slice(bytes);
}

impl PortIo for SimulatedBus {
    fn inb(&mut self, port: u16) -> io::Result<u8> {
        let value = match self.offset(port)? {
            HST_STS => self.read_status(),
            HST_CNT => {
                self.block_index = 0;
                self.cnt & !control::START
            }
            HST_CMD => self.cmd,
            HST_ADD => self.add,
            HST_DAT0 => self.dat0,
            HST_DAT1 => self.dat1,
            BLK_DAT => {
                self.block_reads += 1;
                let byte = self.block.get(self.block_index).copied().unwrap_or(0);
                self.block_index += 1;
                byte
            }
            _ => 0xFF,
        };
        Ok(value)
    }

    fn outb(&mut self, port: u16, value: u8) -> io::Result<()> {
        match self.offset(port)? {
            HST_STS => self.sts &= !value,
            HST_CNT => {
                self.cnt = value;
                if value & control::START != 0 {
                    self.start();
                }
            }
            HST_CMD => self.cmd = value,
            HST_ADD => self.add = value,
            HST_DAT0 => self.dat0 = value,
            HST_DAT1 => self.dat1 = value,
            BLK_DAT => {
                self.block_writes += 1;
                if let Some(slot) = self.block.get_mut(self.block_index) {
                    *slot = value;
                }
                self.block_index += 1;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pll_chip::smbus::address_byte;

    const BASE: u16 = 0x0400;

    #[test]
    fn status_is_write_one_to_clear() {
        let mut sim = SimulatedBus::new(BASE);
        sim.outb(BASE + HST_ADD, address_byte(0x10, Direction::Write))
            .unwrap();
        sim.outb(BASE + HST_CNT, control::START | Protocol::Quick.bits())
            .unwrap();
        assert_eq!(sim.inb(BASE + HST_STS).unwrap(), status::DEV_ERR);
        sim.outb(BASE + HST_STS, status::INTR).unwrap();
        assert_eq!(sim.inb(BASE + HST_STS).unwrap(), status::DEV_ERR);
        sim.outb(BASE + HST_STS, status::DEV_ERR).unwrap();
        assert_eq!(sim.inb(BASE + HST_STS).unwrap(), 0);
    }

    #[test]
    fn stuck_bits_survive_clear() {
        let mut sim = SimulatedBus::new(BASE).with_stuck_status(status::BUS_ERR);
        sim.outb(BASE + HST_STS, status::ALL).unwrap();
        assert_eq!(sim.inb(BASE + HST_STS).unwrap(), status::BUS_ERR);
    }

    #[test]
    fn ports_outside_window_are_rejected() {
        let mut sim = SimulatedBus::new(BASE);
        assert!(sim.inb(BASE + PORT_COUNT).is_err());
        assert!(sim.outb(BASE - 1, 0).is_err());
    }

    #[test]
    fn reading_control_rewinds_block_port() {
        let mut sim = SimulatedBus::new(BASE).with_device(0x69, vec![7, 8, 9]);
        sim.outb(BASE + HST_ADD, address_byte(0x69, Direction::Read))
            .unwrap();
        sim.outb(BASE + HST_CNT, control::START | Protocol::BlockData.bits())
            .unwrap();
        assert_eq!(sim.inb(BASE + HST_DAT0).unwrap(), 3);
        sim.inb(BASE + HST_CNT).unwrap();
        assert_eq!(sim.inb(BASE + BLK_DAT).unwrap(), 7);
        assert_eq!(sim.inb(BASE + BLK_DAT).unwrap(), 8);
        sim.inb(BASE + HST_CNT).unwrap();
        assert_eq!(sim.inb(BASE + BLK_DAT).unwrap(), 7);
        assert_eq!(sim.block_reads(), 3);
    }
}
