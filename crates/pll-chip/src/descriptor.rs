//! Chip descriptors: where each frequency-select bit lives in a register image.
//!
//! Clock generator vendors wire the same logical FS0..FS5 select bits to
//! different physical register positions. A [`ChipDescriptor`] records those
//! positions so one generic encoder/decoder can serve every family.
//!
//! ## Select vs. latch bits
//!
//! ```text
//! select flag set   → key comes from the live select bits (software-set)
//! select flag clear → key comes from the latch bits (pin straps, maybe inverted)
//! ```
//!
//! Writing always targets the select bits and sets the select flag, so the
//! chip stops following its pin straps.

use crate::frequency::FrequencyEntry;
use crate::smbus::BLOCK_MAX;

/// Maximum number of key bits any supported chip uses.
pub const KEY_BITS: usize = 6;

/// Byte/bit coordinate inside a register image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitLocation {
    /// Byte index into the image.
    pub byte: usize,
    /// Bit index within the byte, 0 = LSB.
    pub bit: u8,
}

impl BitLocation {
    /// Create a location.
    #[must_use]
    pub const fn new(byte: usize, bit: u8) -> Self {
        Self { byte, bit }
    }

    /// Read the bit as `0` or `1`; bytes past the end of `image` read as `0`.
    #[must_use]
    pub fn read(self, image: &[u8]) -> u8 {
        image.get(self.byte).map_or(0, |b| (b >> self.bit) & 1)
    }

    /// Set or clear the bit; bytes past the end of `image` are left alone.
    pub fn write(self, image: &mut [u8], value: bool) {
        if let Some(b) = image.get_mut(self.byte) {
            let mask = 1u8 << self.bit;
            if value {
                *b |= mask;
            } else {
                *b &= !mask;
            }
        }
    }
}

impl std::fmt::Display for BitLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "byte {} bit {}", self.byte, self.bit)
    }
}

/// Positions of key bits 0..5; `None` where the chip has no such bit.
pub type KeyBits = [Option<BitLocation>; KEY_BITS];

/// Key bits that all live in one byte, listed FS0 first.
#[must_use]
pub const fn bits_in_byte(byte: usize, bits: [Option<u8>; KEY_BITS]) -> KeyBits {
    let mut out = [None; KEY_BITS];
    let mut i = 0;
    while i < KEY_BITS {
        out[i] = match bits[i] {
            Some(bit) => Some(BitLocation::new(byte, bit)),
            None => None,
        };
        i += 1;
    }
    out
}

/// Key bits scattered across bytes, listed FS0 first as `(byte, bit)`.
#[must_use]
pub const fn bits_at(locations: [Option<(usize, u8)>; KEY_BITS]) -> KeyBits {
    let mut out = [None; KEY_BITS];
    let mut i = 0;
    while i < KEY_BITS {
        out[i] = match locations[i] {
            Some((byte, bit)) => Some(BitLocation::new(byte, bit)),
            None => None,
        };
        i += 1;
    }
    out
}

/// Immutable description of one PLL family's register layout.
#[derive(Debug, Clone)]
pub struct ChipDescriptor {
    /// Unique chip name, e.g. `"ICS94211"`.
    pub name: &'static str,
    /// Bytes in the addressable register set.
    pub register_image_length: usize,
    /// Frequency rows in declaration order (not sorted, keys may repeat).
    pub frequency_table: &'static [FrequencyEntry],
    /// Byte the image length must be stamped into before a transfer.
    pub byte_count_field: Option<usize>,
    /// "Use select bits, not latched pins" flag.
    pub select_flag: Option<BitLocation>,
    /// Software-settable key bits.
    pub select_bits: KeyBits,
    /// Pin-strap key bits.
    pub latch_bits: KeyBits,
    /// Latched bits read inverted.
    pub latch_bits_inverted: bool,
    /// Chip answers a quick-write presence probe.
    pub supports_probe: bool,
    /// Chip supports block reads.
    pub supports_read: bool,
    /// Template image used before any read.
    pub initial_register_image: &'static [u8],
}

impl ChipDescriptor {
    /// Frequency rows in table order. Finite and restartable.
    pub fn list_supported(&self) -> std::slice::Iter<'_, FrequencyEntry> {
        self.frequency_table.iter()
    }

    /// Whether the chip answers a presence probe.
    #[must_use]
    pub const fn supports_probe(&self) -> bool {
        self.supports_probe
    }

    /// Whether the chip's register image can be read back.
    #[must_use]
    pub const fn supports_read(&self) -> bool {
        self.supports_read
    }

    /// Number of populated select bits.
    #[must_use]
    pub fn key_width(&self) -> usize {
        self.select_bits.iter().flatten().count()
    }

    /// Bits needed to express the largest key in the table.
    #[must_use]
    pub fn required_key_width(&self) -> usize {
        let max = self.list_supported().map(|e| e.key).max().unwrap_or(0);
        (u8::BITS - max.leading_zeros()).max(1) as usize
    }

    /// First row matching `fsb` and, when given, `pci`.
    ///
    /// `pci = None` means "any PCI frequency". Declaration order breaks ties.
    #[must_use]
    pub fn entry_for(&self, fsb: f32, pci: Option<f32>) -> Option<&FrequencyEntry> {
        self.list_supported().find(|entry| entry.matches(fsb, pci))
    }

    /// First row carrying `key`.
    #[must_use]
    pub fn entry_for_key(&self, key: u8) -> Option<&FrequencyEntry> {
        self.list_supported().find(|entry| entry.key == key)
    }

    /// Whether the image says the live select bits are in charge.
    ///
    /// Chips without a select flag always run from the select bits.
    #[must_use]
    pub fn uses_select_bits(&self, image: &[u8]) -> bool {
        self.select_flag.map_or(true, |flag| flag.read(image) == 1)
    }

    /// Recompose the current key from `image`.
    ///
    /// Absent locations contribute `0`. Latch inversion applies only to bits
    /// actually read from a present location.
    #[must_use]
    pub fn read_key(&self, image: &[u8]) -> u8 {
        let (locations, invert) = if self.uses_select_bits(image) {
            (&self.select_bits, false)
        } else {
            (&self.latch_bits, self.latch_bits_inverted)
        };

        locations
            .iter()
            .enumerate()
            .fold(0u8, |key, (i, location)| match location {
                Some(loc) => key | ((loc.read(image) ^ u8::from(invert)) << i),
                None => key,
            })
    }

    /// Store `key` into the select bits and raise the select flag.
    ///
    /// Bits the chip does not have are never touched.
    pub fn write_key(&self, image: &mut [u8], key: u8) {
        if let Some(flag) = self.select_flag {
            flag.write(image, true);
        }
        for (i, location) in self.select_bits.iter().enumerate() {
            if let Some(loc) = location {
                loc.write(image, (key >> i) & 1 == 1);
            }
        }
    }

    /// Decode `image` into the first table row whose key matches.
    ///
    /// `None` means the current frequency is unknown, not a failure.
    #[must_use]
    pub fn decode(&self, image: &[u8]) -> Option<&FrequencyEntry> {
        self.entry_for_key(self.read_key(image))
    }

    /// Check the descriptor's internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found: template length, image size,
    /// out-of-range or overlapping bit locations, keys too wide for the
    /// populated select bits, or a readable chip with nothing to read from.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let len = self.register_image_length;
        if len == 0 || len > BLOCK_MAX {
            return Err(DescriptorError::ImageLength { length: len });
        }
        if self.initial_register_image.len() != len {
            return Err(DescriptorError::TemplateLength {
                expected: len,
                actual: self.initial_register_image.len(),
            });
        }
        if self.frequency_table.is_empty() {
            return Err(DescriptorError::EmptyTable);
        }
        if let Some(entry) = self.list_supported().find(|e| usize::from(e.key) >= 1 << KEY_BITS) {
            return Err(DescriptorError::KeyOutOfRange { key: entry.key });
        }
        if let Some(byte) = self.byte_count_field.filter(|&b| b >= len) {
            return Err(DescriptorError::ByteCountOutOfRange { byte });
        }

        let all = self
            .select_flag
            .iter()
            .chain(self.select_bits.iter().flatten())
            .chain(self.latch_bits.iter().flatten());
        for loc in all {
            if loc.byte >= len || loc.bit >= 8 {
                return Err(DescriptorError::LocationOutOfRange { location: *loc });
            }
        }

        let mut written: Vec<BitLocation> = self.select_flag.into_iter().collect();
        for loc in self.select_bits.iter().flatten() {
            if written.contains(loc) {
                return Err(DescriptorError::OverlappingBits { location: *loc });
            }
            written.push(*loc);
        }

        // Select bits are positional: FS0..FSn with no gaps.
        let populated = self.key_width();
        if self.select_bits[..populated].iter().any(Option::is_none) {
            return Err(DescriptorError::SparseSelectBits);
        }
        let required = self.required_key_width();
        if populated != required {
            return Err(DescriptorError::KeyWidth {
                required,
                populated,
            });
        }

        let latches = self.latch_bits.iter().flatten().count();
        if latches > populated {
            return Err(DescriptorError::LatchWidth {
                latch: latches,
                select: populated,
            });
        }
        if self.supports_read && latches == 0 && self.select_flag.is_some() {
            return Err(DescriptorError::NoLatchBits);
        }
        Ok(())
    }
}

/// Inconsistency found by [`ChipDescriptor::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    /// Image length is zero or exceeds one block transfer.
    ImageLength {
        /// Declared length.
        length: usize,
    },
    /// Template image does not have the declared length.
    TemplateLength {
        /// Declared length.
        expected: usize,
        /// Template length.
        actual: usize,
    },
    /// Frequency table has no rows.
    EmptyTable,
    /// A key does not fit in six bits.
    KeyOutOfRange {
        /// Offending key.
        key: u8,
    },
    /// Byte-count field lies outside the image.
    ByteCountOutOfRange {
        /// Offending byte index.
        byte: usize,
    },
    /// A bit location lies outside the image.
    LocationOutOfRange {
        /// Offending location.
        location: BitLocation,
    },
    /// Two written bits share a location.
    OverlappingBits {
        /// Shared location.
        location: BitLocation,
    },
    /// Select bits have a gap before the last populated one.
    SparseSelectBits,
    /// Populated select bits cannot address every key, or exceed what is needed.
    KeyWidth {
        /// Bits needed by the table.
        required: usize,
        /// Bits populated.
        populated: usize,
    },
    /// More latch bits than select bits.
    LatchWidth {
        /// Latch bits populated.
        latch: usize,
        /// Select bits populated.
        select: usize,
    },
    /// Chip claims read support but has no latch bits to decode from.
    NoLatchBits,
}

impl std::fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageLength { length } => {
                write!(f, "register image length {length} outside 1..={BLOCK_MAX}")
            }
            Self::TemplateLength { expected, actual } => {
                write!(f, "template has {actual} bytes, expected {expected}")
            }
            Self::EmptyTable => write!(f, "frequency table is empty"),
            Self::KeyOutOfRange { key } => write!(f, "key {key:#04x} does not fit in six bits"),
            Self::ByteCountOutOfRange { byte } => {
                write!(f, "byte-count field {byte} lies outside the image")
            }
            Self::LocationOutOfRange { location } => {
                write!(f, "{location} lies outside the image")
            }
            Self::OverlappingBits { location } => write!(f, "{location} is used twice"),
            Self::SparseSelectBits => write!(f, "select bits have a gap"),
            Self::KeyWidth {
                required,
                populated,
            } => write!(
                f,
                "table needs {required} key bits but {populated} select bits are populated"
            ),
            Self::LatchWidth { latch, select } => {
                write!(f, "{latch} latch bits exceed {select} select bits")
            }
            Self::NoLatchBits => write!(f, "readable chip has no latch bits"),
        }
    }
}

impl std::error::Error for DescriptorError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::{ICS94211, ICS950405, W83194BR_39B};
    use crate::image::RegisterImage;

    #[test]
    fn bit_location_read_write() {
        let mut image = [0u8; 2];
        let loc = BitLocation::new(1, 3);
        loc.write(&mut image, true);
        assert_eq!(image, [0x00, 0x08]);
        assert_eq!(loc.read(&image), 1);
        loc.write(&mut image, false);
        assert_eq!(loc.read(&image), 0);

        // Past the end: reads 0, writes are dropped
        let far = BitLocation::new(9, 0);
        assert_eq!(far.read(&image), 0);
        far.write(&mut image, true);
        assert_eq!(image, [0, 0]);
    }

    #[test]
    fn encode_key_sets_flag_and_select_bits() {
        let mut image = RegisterImage::seed(&ICS94211);
        ICS94211.write_key(image.as_bytes_mut(), 0x07);
        // 0x02 | flag(bit3) | FS0..FS2 (bits 4..6); FS3 (bit7) and FS4 (bit2) clear
        assert_eq!(image.get(0), Some(0x7A));
        assert_eq!(ICS94211.read_key(image.as_bytes()), 0x07);
    }

    #[test]
    fn encode_clears_stale_select_bits() {
        let mut image = [0xFFu8; 21];
        ICS94211.write_key(&mut image, 0x00);
        assert_eq!(image[0], 0b0000_1011);
        assert_eq!(image[1], 0xFF);
    }

    #[test]
    fn latch_path_inverts_only_present_bits() {
        // ICS94211 latches: FS0 byte3.6, FS1 byte4.3, FS2 byte1.7, FS3 byte4.1, FS4 absent
        let mut image = [0u8; 21];
        image[0] = 0x00; // select flag clear
        // All present latch bits read 0, so inverted they are 1; FS4 stays 0
        assert_eq!(ICS94211.read_key(&image), 0x0F);

        image[3] = 1 << 6; // FS0 latched high → inverted to 0
        assert_eq!(ICS94211.read_key(&image), 0x0E);
    }

    #[test]
    fn select_path_ignores_latches() {
        let mut image = [0u8; 21];
        image[0] = 0x08 | 0x04; // flag + FS4
        image[3] = 0xFF;
        assert_eq!(ICS94211.read_key(&image), 0x10);
    }

    #[test]
    fn chip_without_select_flag_reads_select_bits() {
        let mut image = RegisterImage::seed(&ICS950405);
        ICS950405.write_key(image.as_bytes_mut(), 0x0B);
        assert_eq!(image.get(0), Some(0xBB));
        assert_eq!(ICS950405.decode(image.as_bytes()).map(|e| e.fsb), Some(240.0));
    }

    #[test]
    fn decode_takes_first_duplicate() {
        // W83194BR-39B lists 140.00/35.00 twice with keys 0x0C and 0x17
        let entry = W83194BR_39B.entry_for(140.0, Some(35.0)).map(|e| e.key);
        assert_eq!(entry, Some(0x0C));
        let mut image = RegisterImage::seed(&W83194BR_39B);
        W83194BR_39B.write_key(image.as_bytes_mut(), 0x17);
        let decoded = W83194BR_39B.decode(image.as_bytes()).copied();
        assert_eq!(decoded.map(|e| (e.fsb, e.key)), Some((140.0, 0x17)));
    }

    #[test]
    fn unknown_key_decodes_to_none() {
        let chip = ChipDescriptor {
            frequency_table: &ICS94211.frequency_table[..1],
            ..ICS94211.clone()
        };
        let mut image = [0u8; 21];
        chip.write_key(&mut image, 0x1F);
        assert!(chip.decode(&image).is_none());
    }

    #[test]
    fn validation_rejects_narrow_select_bits() {
        let chip = ChipDescriptor {
            select_bits: bits_in_byte(0, [Some(4), Some(5), Some(6), Some(7), None, None]),
            ..ICS94211.clone()
        };
        assert_eq!(
            chip.validate(),
            Err(DescriptorError::KeyWidth {
                required: 5,
                populated: 4
            })
        );
    }

    #[test]
    fn validation_rejects_overlap_and_range() {
        let chip = ChipDescriptor {
            select_flag: Some(BitLocation::new(0, 4)),
            ..ICS94211.clone()
        };
        assert_eq!(
            chip.validate(),
            Err(DescriptorError::OverlappingBits {
                location: BitLocation::new(0, 4)
            })
        );

        let chip = ChipDescriptor {
            byte_count_field: Some(40),
            ..ICS94211.clone()
        };
        assert_eq!(
            chip.validate(),
            Err(DescriptorError::ByteCountOutOfRange { byte: 40 })
        );

        let chip = ChipDescriptor {
            initial_register_image: &[0x00; 4],
            ..ICS94211.clone()
        };
        assert!(matches!(
            chip.validate(),
            Err(DescriptorError::TemplateLength { expected: 21, actual: 4 })
        ));
    }

}
