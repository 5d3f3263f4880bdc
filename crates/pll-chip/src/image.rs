//! Register image buffer.

use crate::descriptor::ChipDescriptor;

/// The bytes making up a chip's addressable register set.
///
/// An image is owned by exactly one read or write operation; nothing caches
/// or shares it between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterImage {
    bytes: Vec<u8>,
}

impl RegisterImage {
    /// Start from the chip's template image.
    ///
    /// The template is padded or truncated to `register_image_length` so the
    /// image always has the declared size.
    #[must_use]
    pub fn seed(chip: &ChipDescriptor) -> Self {
        let mut bytes = chip.initial_register_image.to_vec();
        bytes.resize(chip.register_image_length, 0);
        Self { bytes }
    }

    /// Wrap raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Number of bytes in the image.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the image has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read-only view.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable view.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Byte at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Overwrite the byte at `index`; out-of-range writes are ignored.
    pub fn set(&mut self, index: usize, value: u8) {
        if let Some(byte) = self.bytes.get_mut(index) {
            *byte = value;
        }
    }
}

impl std::fmt::Display for RegisterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::ICS94211;

    #[test]
    fn seed_matches_declared_length() {
        let image = RegisterImage::seed(&ICS94211);
        assert_eq!(image.len(), 21);
        assert_eq!(image.get(0), Some(0x02));
        assert_eq!(image.get(8), Some(0x08));
    }

    #[test]
    fn hex_display() {
        let image = RegisterImage::from_bytes([0x02, 0xFF, 0x0A]);
        assert_eq!(image.to_string(), "02 FF 0A");
    }

    #[test]
    fn out_of_range_set_is_ignored() {
        let mut image = RegisterImage::from_bytes([0u8; 2]);
        image.set(5, 0xAA);
        assert_eq!(image.as_bytes(), &[0, 0]);
    }
}
