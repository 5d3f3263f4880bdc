//! Chip catalog: name → descriptor.
//!
//! The catalog is fixed at compile time and never mutated, so it can be shared
//! freely. Names match case-insensitively and exactly; there is no fuzzy
//! matching.

use crate::chips;
use crate::descriptor::{ChipDescriptor, DescriptorError};

static CHIPS: [&ChipDescriptor; 13] = [
    &chips::CY28316,
    &chips::ICS9148_37,
    &chips::ICS9248_127,
    &chips::ICS94211,
    &chips::ICS94215,
    &chips::ICS94241,
    &chips::ICS950405,
    &chips::ICS950908,
    &chips::PLL205_03,
    &chips::W124,
    &chips::W156C,
    &chips::W230_03H,
    &chips::W83194BR_39B,
];

/// Every compiled-in chip, in listing order.
pub static CATALOG: Catalog = Catalog::new(&CHIPS);

/// Read-only list of chip descriptors.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    chips: &'static [&'static ChipDescriptor],
}

impl Catalog {
    /// Wrap a static descriptor list.
    #[must_use]
    pub const fn new(chips: &'static [&'static ChipDescriptor]) -> Self {
        Self { chips }
    }

    /// Descriptor named `name`, ignoring ASCII case.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&'static ChipDescriptor> {
        self.chips
            .iter()
            .copied()
            .find(|chip| chip.name.eq_ignore_ascii_case(name))
    }

    /// Descriptors in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &'static ChipDescriptor> {
        self.chips.iter().copied()
    }

    /// Chip names in listing order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.iter().map(|chip| chip.name)
    }

    /// Number of chips.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.chips.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Validate every descriptor.
    ///
    /// # Errors
    ///
    /// Returns the first failing chip's name with its [`DescriptorError`].
    pub fn validate_all(&self) -> Result<(), (&'static str, DescriptorError)> {
        for chip in self.iter() {
            chip.validate().map_err(|e| (chip.name, e))?;
        }
        Ok(())
    }
}

/// Look `name` up in [`CATALOG`].
#[must_use]
pub fn lookup(name: &str) -> Option<&'static ChipDescriptor> {
    CATALOG.lookup(name)
}
