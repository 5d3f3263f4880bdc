//! Silicon model for SMBus-programmable front-side bus clock generators.
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure model of the parts involved in reprogramming an FSB PLL: the SMBus
//! host controller register map, the per-chip register layouts, their
//! frequency tables, and the bit arithmetic that turns a frequency into a
//! register image and back.
//!
//! Bus access lives in `pll-driver`; everything here can be exercised
//! against an in-memory byte buffer.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`smbus`] | Host controller register offsets, status/control bits, protocols |
//! | [`descriptor`] | `ChipDescriptor`, `BitLocation`, key encode/decode, validation |
//! | [`image`] | `RegisterImage`, the owned byte buffer an operation works on |
//! | [`frequency`] | `FrequencyEntry`, PCI divider, safe-frequency selection |
//! | [`catalog`] | Case-insensitive lookup over the compiled-in chips |
//! | [`chips`] | The register layouts and frequency tables themselves |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod chips;
pub mod descriptor;
pub mod frequency;
pub mod image;
pub mod smbus;

pub use catalog::{lookup, Catalog, CATALOG};
pub use descriptor::{BitLocation, ChipDescriptor, DescriptorError, KEY_BITS};
pub use frequency::{pci_divider, FrequencyEntry, FrequencyPlan};
pub use image::RegisterImage;
