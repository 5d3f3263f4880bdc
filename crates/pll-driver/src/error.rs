//! Error types for SMBus and PLL operations

use pll_chip::smbus::status;
use pll_chip::DescriptorError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for PLL operations
pub type Result<T> = std::result::Result<T, PllError>;

/// Fault reported by one SMBus transaction.
///
/// Every variant carries the status register value that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusFault {
    /// Status bits stayed set after the pre-transaction write-back
    #[error("SMBus reset failed (status {status:#04x})")]
    ResetFailed {
        /// Status register after the clear attempt
        status: u8,
    },

    /// Host stayed busy for every poll
    #[error("SMBus timeout (status {status:#04x})")]
    Timeout {
        /// Last status register value polled
        status: u8,
    },

    /// Controller flagged a general failure
    #[error("SMBus transaction failed (status {status:#04x})")]
    TransactionFailed {
        /// Completion status
        status: u8,
    },

    /// Arbitration lost
    #[error("SMBus collision (status {status:#04x})")]
    Collision {
        /// Completion status
        status: u8,
    },

    /// Slave did not acknowledge
    #[error("SMBus no response (status {status:#04x})")]
    NoResponse {
        /// Completion status
        status: u8,
    },
}

impl BusFault {
    /// Classify the status register after the host went idle.
    ///
    /// Several fault bits may be set at once; the highest-priority one wins:
    /// failure, then collision, then no response.
    pub const fn from_completion_status(value: u8) -> Option<Self> {
        if value & status::FAILED != 0 {
            Some(Self::TransactionFailed { status: value })
        } else if value & status::BUS_ERR != 0 {
            Some(Self::Collision { status: value })
        } else if value & status::DEV_ERR != 0 {
            Some(Self::NoResponse { status: value })
        } else {
            None
        }
    }

    /// Status register value that produced the fault.
    pub const fn status(&self) -> u8 {
        match *self {
            Self::ResetFailed { status }
            | Self::Timeout { status }
            | Self::TransactionFailed { status }
            | Self::Collision { status }
            | Self::NoResponse { status } => status,
        }
    }

    /// Short human-readable description.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ResetFailed { .. } => "SMBus reset failed",
            Self::Timeout { .. } => "SMBus timeout",
            Self::TransactionFailed { .. } => "SMBus transaction failed",
            Self::Collision { .. } => "SMBus collision",
            Self::NoResponse { .. } => "SMBus no response",
        }
    }
}

/// Errors that can occur during PLL operations
#[derive(Debug, Error)]
pub enum PllError {
    /// Bus transaction fault
    #[error(transparent)]
    Bus(#[from] BusFault),

    /// Requested frequency is not in the chip's table
    #[error("{chip} does not support FSB {fsb:.2} MHz{}", pci_suffix(.pci))]
    UnsupportedFrequency {
        /// Chip name
        chip: &'static str,
        /// Requested FSB in MHz
        fsb: f32,
        /// Requested PCI in MHz, if constrained
        pci: Option<f32>,
    },

    /// Chip cannot be read back
    #[error("{chip} does not support reading")]
    ReadUnsupported {
        /// Chip name
        chip: &'static str,
    },

    /// Chip does not answer presence probes
    #[error("{chip} does not support probing")]
    ProbeUnsupported {
        /// Chip name
        chip: &'static str,
    },

    /// No chip with this name in the catalog
    #[error("Unknown PLL chip: {name}")]
    UnknownChip {
        /// Name as given
        name: String,
    },

    /// Chip descriptor failed validation
    #[error("Invalid descriptor for {chip}: {reason}")]
    InvalidDescriptor {
        /// Chip name
        chip: &'static str,
        /// What is inconsistent
        #[source]
        reason: DescriptorError,
    },

    /// Block read returned fewer bytes than decoding needs
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Bytes needed
        expected: usize,
        /// Bytes returned
        actual: usize,
    },

    /// Port device could not be opened
    #[error("Cannot open port device {}: {source}", .path.display())]
    PortDevice {
        /// Path that was opened
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error during port access
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl PllError {
    /// Create an unknown chip error
    pub fn unknown_chip(name: impl Into<String>) -> Self {
        Self::UnknownChip { name: name.into() }
    }

    /// Create an invalid descriptor error
    pub const fn invalid_descriptor(chip: &'static str, reason: DescriptorError) -> Self {
        Self::InvalidDescriptor { chip, reason }
    }

    /// Create a port device error
    pub fn port_device(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PortDevice {
            path: path.into(),
            source,
        }
    }

    /// Bus fault behind this error, if any.
    pub const fn bus_fault(&self) -> Option<BusFault> {
        match self {
            Self::Bus(fault) => Some(*fault),
            _ => None,
        }
    }
}

fn pci_suffix(pci: &Option<f32>) -> String {
    pci.map_or_else(String::new, |pci| format!(" / PCI {pci:.2} MHz"))
}
