//! Generic PLL register codec.
//!
//! Every supported chip is programmed the same way: block-read its register
//! image, locate the frequency-select key through its [`ChipDescriptor`], and
//! block-write the image back with new select bits. The bit arithmetic lives
//! in `pll-chip`; this module adds the bus traffic around it.
//!
//! Two flavours of `set`:
//!
//! - [`PllCodec::set_frequency`] starts from the chip's compiled-in template.
//! - [`PllCodec::apply_frequency`] modifies an image the caller already holds,
//!   typically one returned by [`PllCodec::read_image`].

use crate::error::{PllError, Result};
use crate::port::PortIo;
use crate::smbus::SmBus;
use pll_chip::smbus::{PLL_COMMAND, PLL_SLAVE_ADDRESS};
use pll_chip::{ChipDescriptor, DescriptorError, FrequencyEntry, RegisterImage};
use tracing::{debug, info, warn};

/// Reads and writes PLL register images over one SMBus controller.
#[derive(Debug)]
pub struct PllCodec<P> {
    bus: SmBus<P>,
    slave: u8,
    command: u8,
}

impl<P: PortIo> PllCodec<P> {
    /// Codec talking to the standard PLL address on `bus`.
    pub const fn new(bus: SmBus<P>) -> Self {
        Self {
            bus,
            slave: PLL_SLAVE_ADDRESS,
            command: PLL_COMMAND,
        }
    }

    /// Use a non-standard slave address.
    #[must_use]
    pub const fn with_slave_address(mut self, slave: u8) -> Self {
        self.slave = slave;
        self
    }

    /// Use a non-standard block command byte.
    #[must_use]
    pub const fn with_command(mut self, command: u8) -> Self {
        self.command = command;
        self
    }

    /// Slave address in use.
    pub const fn slave_address(&self) -> u8 {
        self.slave
    }

    /// Underlying transaction layer.
    pub const fn bus(&self) -> &SmBus<P> {
        &self.bus
    }

    /// Mutable transaction layer.
    pub fn bus_mut(&mut self) -> &mut SmBus<P> {
        &mut self.bus
    }

    /// Give back the transaction layer.
    pub fn into_bus(self) -> SmBus<P> {
        self.bus
    }

    /// Frequency rows of `chip`, in table order.
    #[allow(clippy::unused_self)]
    pub fn list_supported<'c>(
        &self,
        chip: &'c ChipDescriptor,
    ) -> std::slice::Iter<'c, FrequencyEntry> {
        chip.list_supported()
    }

    /// Whether something acknowledges a quick write at the PLL address.
    ///
    /// # Errors
    ///
    /// Returns error if the port backend fails.
    pub fn probe_present(&mut self) -> Result<bool> {
        self.bus.probe_present(self.slave)
    }

    /// Presence check for `chip`.
    ///
    /// # Errors
    ///
    /// Returns [`PllError::ProbeUnsupported`] if the chip does not answer
    /// probes, otherwise any port error.
    pub fn probe_chip(&mut self, chip: &ChipDescriptor) -> Result<bool> {
        if !chip.supports_probe() {
            return Err(PllError::ProbeUnsupported { chip: chip.name });
        }
        let present = self.probe_present()?;
        info!("{} {}", chip.name, if present { "present" } else { "not found" });
        Ok(present)
    }

    /// Block-read the chip's register image.
    ///
    /// The image is seeded from the template, so bytes the chip does not
    /// return keep their template values.
    ///
    /// # Errors
    ///
    /// Returns the bus fault, or [`PllError::ShortRead`] when the chip
    /// returned too few bytes to cover its key bits.
    pub fn read_image(&mut self, chip: &ChipDescriptor) -> Result<RegisterImage> {
        let mut image = RegisterImage::seed(chip);
        let read = self
            .bus
            .read_block_data(self.slave, self.command, image.as_bytes_mut())?;
        debug!("{}: read {read} bytes: {image}", chip.name);

        let needed = key_span(chip);
        if read < needed {
            return Err(PllError::ShortRead {
                expected: needed,
                actual: read,
            });
        }
        if read < image.len() {
            warn!(
                "{}: read {read} of {} bytes, keeping template for the rest",
                chip.name,
                image.len()
            );
        }
        Ok(image)
    }

    /// Current frequency of `chip`.
    ///
    /// `Ok(None)` means the key read back has no table row.
    ///
    /// # Errors
    ///
    /// Returns [`PllError::ReadUnsupported`] without touching the bus if the
    /// chip cannot be read, otherwise any error from [`Self::read_image`].
    pub fn get_frequency(&mut self, chip: &ChipDescriptor) -> Result<Option<FrequencyEntry>> {
        if !chip.supports_read() {
            return Err(PllError::ReadUnsupported { chip: chip.name });
        }
        let image = self.read_image(chip)?;
        Ok(decode(chip, &image))
    }

    /// Program `fsb` (and `pci`, when given) starting from the template.
    ///
    /// Returns the image that was, or in a dry run would have been, written.
    ///
    /// # Errors
    ///
    /// Returns [`PllError::UnsupportedFrequency`] before any bus traffic if
    /// the table has no such row, otherwise the first bus fault.
    pub fn set_frequency(
        &mut self,
        chip: &ChipDescriptor,
        fsb: f32,
        pci: Option<f32>,
        dry_run: bool,
    ) -> Result<RegisterImage> {
        let mut image = RegisterImage::seed(chip);
        self.apply_frequency(chip, &mut image, fsb, pci, dry_run)?;
        Ok(image)
    }

    /// Program `fsb` (and `pci`, when given) on top of `image`.
    ///
    /// Chips with a byte-count field get the length stamped in and a
    /// write/read-back cycle first, which resets their internal pointer.
    /// A dry run performs every image edit but no bus traffic.
    ///
    /// Returns the table row that was selected.
    ///
    /// # Errors
    ///
    /// Returns [`PllError::UnsupportedFrequency`] before any bus traffic if
    /// the table has no such row, otherwise the first bus fault.
    pub fn apply_frequency(
        &mut self,
        chip: &ChipDescriptor,
        image: &mut RegisterImage,
        fsb: f32,
        pci: Option<f32>,
        dry_run: bool,
    ) -> Result<FrequencyEntry> {
        let entry = *chip
            .entry_for(fsb, pci)
            .ok_or(PllError::UnsupportedFrequency {
                chip: chip.name,
                fsb,
                pci,
            })?;
        debug!("{}: key for {entry} is {:02X} ({:06b})", chip.name, entry.key, entry.key);

        if let Some(byte) = chip.byte_count_field {
            let count = u8::try_from(chip.register_image_length).map_err(|_| {
                PllError::invalid_descriptor(
                    chip.name,
                    DescriptorError::ImageLength {
                        length: chip.register_image_length,
                    },
                )
            })?;
            image.set(byte, count);
            debug!("{}: byte count {count} stamped at byte {byte}", chip.name);
            if !dry_run {
                self.commit(chip, image)?;
                let read = self
                    .bus
                    .read_block_data(self.slave, self.command, image.as_bytes_mut())?;
                debug!("{}: read back {read} bytes: {image}", chip.name);
            }
        }

        chip.write_key(image.as_bytes_mut(), entry.key);
        debug!("{}: writing {image}", chip.name);

        if dry_run {
            info!("{}: dry run, {entry} not written", chip.name);
        } else {
            self.commit(chip, image)?;
            info!("{}: FSB set to {entry}", chip.name);
        }
        Ok(entry)
    }

    fn commit(&mut self, chip: &ChipDescriptor, image: &RegisterImage) -> Result<()> {
        let sent = self
            .bus
            .write_block_data(self.slave, self.command, image.as_bytes())?;
        if sent < image.len() {
            warn!("{}: only {sent} of {} bytes written", chip.name, image.len());
        }
        Ok(())
    }
}

/// Decode `image` for `chip`, logging the key path.
pub fn decode(chip: &ChipDescriptor, image: &RegisterImage) -> Option<FrequencyEntry> {
    let bytes = image.as_bytes();
    let source = if chip.uses_select_bits(bytes) {
        "select bits"
    } else {
        "latches"
    };
    let key = chip.read_key(bytes);
    let entry = chip.decode(bytes).copied();
    match entry {
        Some(entry) => debug!("{}: key {key:06b} from {source} is {entry}", chip.name),
        None => debug!("{}: key {key:06b} from {source} has no table row", chip.name),
    }
    entry
}

/// Bytes a read must cover for the key to be decodable.
fn key_span(chip: &ChipDescriptor) -> usize {
    chip.select_flag
        .iter()
        .chain(chip.select_bits.iter().flatten())
        .chain(chip.latch_bits.iter().flatten())
        .map(|loc| loc.byte + 1)
        .max()
        .unwrap_or(0)
}
