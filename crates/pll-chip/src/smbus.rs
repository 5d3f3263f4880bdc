//! SMBus host controller register map (PIIX4 / VIA VT82C686 family).
//!
//! The controller exposes eight byte-wide I/O ports starting at a base
//! address that the southbridge publishes in PCI config space. Offsets below
//! are relative to that base.
//!
//! ```text
//! +0  HST_STS   status, write-1-to-clear
//! +2  HST_CNT   control: START | protocol; reading it rewinds BLK_DAT
//! +3  HST_CMD   command byte
//! +4  HST_ADD   slave address << 1 | R/W
//! +5  HST_DAT0  data 0 / block length
//! +6  HST_DAT1  data 1
//! +7  BLK_DAT   block data port (auto-incrementing)
//! ```

// ── Register offsets ─────────────────────────────────────────────────────────

/// Host status register.
pub const HST_STS: u16 = 0x00;
/// Host control register.
pub const HST_CNT: u16 = 0x02;
/// Host command register.
pub const HST_CMD: u16 = 0x03;
/// Transmit slave address register.
pub const HST_ADD: u16 = 0x04;
/// Host data 0 register; carries the length byte for block transfers.
pub const HST_DAT0: u16 = 0x05;
/// Host data 1 register (high byte of word transfers).
pub const HST_DAT1: u16 = 0x06;
/// Block data port.
pub const BLK_DAT: u16 = 0x07;

/// Number of I/O ports the controller decodes.
pub const PORT_COUNT: u16 = 8;

/// Largest payload a block transfer may carry.
pub const BLOCK_MAX: usize = 32;

// ── Status register bit definitions ──────────────────────────────────────────

/// Status register bits.
pub mod status {
    /// Transaction in progress.
    pub const HOST_BUSY: u8 = 1 << 0;
    /// Transaction completed.
    pub const INTR: u8 = 1 << 1;
    /// Slave did not acknowledge.
    pub const DEV_ERR: u8 = 1 << 2;
    /// Arbitration lost on the bus.
    pub const BUS_ERR: u8 = 1 << 3;
    /// General transaction failure.
    pub const FAILED: u8 = 1 << 4;
    /// The five low-order fault/busy bits cleared before every transaction.
    pub const ALL: u8 = HOST_BUSY | INTR | DEV_ERR | BUS_ERR | FAILED;
}

// ── Control register bit definitions ─────────────────────────────────────────

/// Control register bits.
pub mod control {
    /// Start the programmed transaction.
    pub const START: u8 = 1 << 6;
    /// Protocol selection field.
    pub const PROTOCOL_MASK: u8 = 0x1C;
}

// ── Protocols ────────────────────────────────────────────────────────────────

/// Transaction size class written into the control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Address-only transaction, used as a presence probe.
    Quick,
    /// Send/receive byte, no command.
    Byte,
    /// Command plus one data byte.
    ByteData,
    /// Command plus two data bytes.
    WordData,
    /// Command plus length-framed payload.
    BlockData,
}

impl Protocol {
    /// Control register encoding.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Quick => 0x00,
            Self::Byte => 0x04,
            Self::ByteData => 0x08,
            Self::WordData => 0x0C,
            Self::BlockData => 0x14,
        }
    }

    /// Decode the protocol field of a control register value.
    #[must_use]
    pub const fn from_control(value: u8) -> Option<Self> {
        match value & control::PROTOCOL_MASK {
            0x00 => Some(Self::Quick),
            0x04 => Some(Self::Byte),
            0x08 => Some(Self::ByteData),
            0x0C => Some(Self::WordData),
            0x14 => Some(Self::BlockData),
            _ => None,
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quick => write!(f, "quick"),
            Self::Byte => write!(f, "byte"),
            Self::ByteData => write!(f, "byte-data"),
            Self::WordData => write!(f, "word-data"),
            Self::BlockData => write!(f, "block-data"),
        }
    }
}

/// Transfer direction, the low bit of `HST_ADD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Master writes to slave.
    Write,
    /// Master reads from slave.
    Read,
}

/// Value for `HST_ADD`: 7-bit slave address shifted left, R/W in bit 0.
#[must_use]
pub const fn address_byte(slave: u8, direction: Direction) -> u8 {
    let rw = match direction {
        Direction::Write => 0,
        Direction::Read => 1,
    };
    ((slave & 0x7F) << 1) | rw
}

// ── Slave addresses ──────────────────────────────────────────────────────────

/// SMBus address every supported clock generator answers on.
pub const PLL_SLAVE_ADDRESS: u8 = 0x69;

/// Command byte used for PLL block transfers.
pub const PLL_COMMAND: u8 = 0x00;

/// First address probed by a bus scan; lower ones are reserved.
pub const SCAN_FIRST: u8 = 0x03;

/// Last address probed by a bus scan; higher ones are reserved.
pub const SCAN_LAST: u8 = 0x77;

/// Whether a scan should probe `slave` with a receive-byte instead of a quick
/// write. Quick writes can corrupt the write-protect state of some EEPROMs.
#[must_use]
pub const fn probe_with_receive_byte(slave: u8) -> bool {
    matches!(slave, 0x30..=0x37 | 0x50..=0x5F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_byte_packs_direction() {
        assert_eq!(address_byte(PLL_SLAVE_ADDRESS, Direction::Write), 0xD2);
        assert_eq!(address_byte(PLL_SLAVE_ADDRESS, Direction::Read), 0xD3);
        // 8-bit input is masked to 7 bits
        assert_eq!(address_byte(0xE9, Direction::Read), 0xD3);
    }

    #[test]
    fn protocol_control_encoding_round_trips() {
        for p in [
            Protocol::Quick,
            Protocol::Byte,
            Protocol::ByteData,
            Protocol::WordData,
            Protocol::BlockData,
        ] {
            assert_eq!(Protocol::from_control(control::START | p.bits()), Some(p));
        }
        assert_eq!(Protocol::from_control(0x10), None);
    }

    #[test]
    fn eeprom_ranges_use_receive_byte() {
        assert!(probe_with_receive_byte(0x50));
        assert!(probe_with_receive_byte(0x37));
        assert!(!probe_with_receive_byte(PLL_SLAVE_ADDRESS));
        assert!(!probe_with_receive_byte(0x2F));
    }

    #[test]
    fn status_mask_covers_low_five_bits() {
        assert_eq!(status::ALL, 0x1F);
    }
}
