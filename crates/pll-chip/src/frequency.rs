//! Frequency table rows and the PCI-divider safety filter.
//!
//! Every chip table row pairs an FSB/PCI frequency with the key that selects
//! it. Rows whose divider differs from the one the board currently runs at
//! can push PCI, AGP and IDE clocks far out of tolerance, so by default only rows
//! with the current divider are offered.

// Table frequencies are exact decimal literals and callers pass values parsed
// from the same decimal text, so exact comparison is the intended match.
#![allow(clippy::float_cmp)]

use crate::descriptor::ChipDescriptor;

/// One row of a chip's frequency table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyEntry {
    /// Front-side bus frequency in MHz.
    pub fsb: f32,
    /// Derived PCI bus frequency in MHz.
    pub pci: f32,
    /// Chip-specific select key (5 or 6 bits).
    pub key: u8,
    /// Integer FSB:PCI ratio.
    pub pci_divider: u32,
}

impl FrequencyEntry {
    /// Create a table row.
    #[must_use]
    pub const fn new(fsb: f32, pci: f32, key: u8, pci_divider: u32) -> Self {
        Self {
            fsb,
            pci,
            key,
            pci_divider,
        }
    }

    /// Whether this row matches `fsb` and, when given, `pci`.
    #[must_use]
    pub fn matches(&self, fsb: f32, pci: Option<f32>) -> bool {
        self.fsb == fsb && pci.map_or(true, |pci| self.pci == pci)
    }
}

impl std::fmt::Display for FrequencyEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}/{:.2}", self.fsb, self.pci)
    }
}

/// FSB:PCI ratio rounded to the nearest integer; `0` when `pci` is not positive.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pci_divider(fsb: f32, pci: f32) -> u32 {
    if pci <= 0.0 {
        return 0;
    }
    (fsb / pci).round() as u32
}

/// Which table rows a caller may switch to, given the current frequency.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyPlan<'a> {
    chip: &'a ChipDescriptor,
    divider: Option<u32>,
}

impl<'a> FrequencyPlan<'a> {
    /// Build a plan for `chip`.
    ///
    /// Rows are restricted to the divider of `current` unless `unsafe_mode`
    /// is set, the current frequency is unknown, or the chip cannot be read.
    #[must_use]
    pub fn new(chip: &'a ChipDescriptor, current: Option<&FrequencyEntry>, unsafe_mode: bool) -> Self {
        let divider = if unsafe_mode || !chip.supports_read {
            None
        } else {
            current.map(|entry| pci_divider(entry.fsb, entry.pci))
        };
        Self { chip, divider }
    }

    /// The divider rows must share, or `None` when every row is allowed.
    #[must_use]
    pub const fn divider(&self) -> Option<u32> {
        self.divider
    }

    /// Whether `entry` passes the divider restriction.
    #[must_use]
    pub fn allows(&self, entry: &FrequencyEntry) -> bool {
        self.divider.map_or(true, |d| entry.pci_divider == d)
    }

    /// Allowed rows in table order.
    pub fn supported(&self) -> impl Iterator<Item = &'a FrequencyEntry> + '_ {
        self.chip.list_supported().filter(move |entry| self.allows(entry))
    }

    /// First allowed row for `fsb`, constrained to `pci` when given.
    #[must_use]
    pub fn resolve(&self, fsb: f32, pci: Option<f32>) -> Option<&'a FrequencyEntry> {
        self.chip
            .list_supported()
            .find(|entry| entry.matches(fsb, pci) && self.allows(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::{ICS94211, W124};

    #[test]
    fn divider_rounds_to_nearest() {
        assert_eq!(pci_divider(100.23, 33.41), 3);
        assert_eq!(pci_divider(66.82, 33.41), 2);
        assert_eq!(pci_divider(150.0, 37.5), 4);
        assert_eq!(pci_divider(100.0, 0.0), 0);
    }

    #[test]
    fn plan_restricts_to_current_divider() {
        let current = ICS94211.entry_for(100.23, Some(33.41)).copied();
        let plan = FrequencyPlan::new(&ICS94211, current.as_ref(), false);
        assert_eq!(plan.divider(), Some(3));
        assert!(plan.supported().all(|e| e.pci_divider == 3));
        assert_eq!(plan.supported().count(), 12);

        // 150 MHz needs divider 4
        assert!(plan.resolve(150.0, None).is_none());
        let found = plan.resolve(120.0, None).map(|e| e.key);
        assert_eq!(found, Some(0x08));
    }

    #[test]
    fn unsafe_mode_allows_every_row() {
        let current = ICS94211.entry_for(100.23, None).copied();
        let plan = FrequencyPlan::new(&ICS94211, current.as_ref(), true);
        assert_eq!(plan.divider(), None);
        assert_eq!(plan.supported().count(), ICS94211.frequency_table.len());
        assert_eq!(plan.resolve(150.0, Some(37.5)).map(|e| e.key), Some(0x0D));
    }

    #[test]
    fn unknown_current_or_write_only_chip_is_unrestricted() {
        let plan = FrequencyPlan::new(&ICS94211, None, false);
        assert_eq!(plan.divider(), None);

        let current = W124.entry_for(100.0, None).copied();
        let plan = FrequencyPlan::new(&W124, current.as_ref(), false);
        assert_eq!(plan.divider(), None);
    }

    #[test]
    fn pci_constraint_must_match_exactly() {
        let entry = FrequencyEntry::new(120.0, 40.0, 0x0A, 3);
        assert!(entry.matches(120.0, None));
        assert!(entry.matches(120.0, Some(40.0)));
        assert!(!entry.matches(120.0, Some(30.0)));
        assert_eq!(entry.to_string(), "120.00/40.00");
    }
}
