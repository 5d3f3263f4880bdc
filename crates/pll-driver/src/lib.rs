//! SMBus driver and register codec for front-side bus clock generators.
//!
//! The silicon model (register map, chip tables, key arithmetic) lives in
//! `pll-chip`. This crate adds everything that touches a bus:
//!
//! ```text
//! PllCodec       read image, decode key, encode key, write image
//!   └─ SmBus     one transaction at a time on a PIIX4/VIA host controller
//!        └─ PortIo
//!             ├─ DevPort        /dev/port (real hardware, root only)
//!             └─ SimulatedBus   software controller with attachable slaves
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use pll_driver::{BusConfig, DevPort, PllCodec, SmBus};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let chip = pll_chip::lookup("ICS94211").ok_or("unknown chip")?;
//! let bus = SmBus::new(DevPort::open()?, BusConfig::new(0x5000));
//! let mut codec = PllCodec::new(bus);
//!
//! if let Some(current) = codec.get_frequency(chip)? {
//!     println!("{}: {current} MHz", chip.name);
//! }
//! codec.set_frequency(chip, 132.99, None, true)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! All operations take `&mut self`. Sharing one controller between threads
//! needs a `Mutex` around the codec or bus.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod codec;
mod error;
pub mod port;
pub mod sim;
pub mod smbus;

pub use codec::PllCodec;
pub use error::{BusFault, PllError, Result};
pub use port::{DevPort, PortIo};
pub use sim::{SimulatedBus, Transaction};
pub use smbus::{BusConfig, SmBus};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        BusConfig, BusFault, DevPort, PllCodec, PllError, PortIo, Result, SimulatedBus, SmBus,
    };
    pub use pll_chip::{ChipDescriptor, FrequencyEntry, FrequencyPlan, RegisterImage};
}
