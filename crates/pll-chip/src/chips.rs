//! Register layouts and frequency tables for every supported clock generator.
//!
//! Tables keep the vendor datasheet order. Some keys repeat, and some
//! FSB/PCI pairs appear under two keys; lookups take the first match.

use crate::descriptor::{bits_at, bits_in_byte, BitLocation, ChipDescriptor, KeyBits, KEY_BITS};
use crate::frequency::FrequencyEntry;

const NO_LATCHES: KeyBits = [None; KEY_BITS];

const fn row(fsb: f32, pci: f32, key: u8, pci_divider: u32) -> FrequencyEntry {
    FrequencyEntry::new(fsb, pci, key, pci_divider)
}

// ── ICS94211 ─────────────────────────────────────────────────────────────────

const ICS94211_TABLE: [FrequencyEntry; 32] = [
    row(66.82, 33.41, 0x03, 2),
    row(68.01, 34.01, 0x06, 2),
    row(75.00, 37.50, 0x01, 2),
    row(80.00, 40.00, 0x00, 2),
    row(83.31, 41.65, 0x02, 2),
    row(85.01, 28.34, 0x17, 3),
    row(90.00, 30.00, 0x16, 3),
    row(95.00, 31.67, 0x15, 3),
    row(100.23, 33.41, 0x07, 3),
    row(103.00, 34.33, 0x04, 3),
    row(105.00, 35.00, 0x0B, 3),
    row(109.99, 36.66, 0x0A, 3),
    row(112.01, 37.34, 0x05, 3),
    row(114.99, 38.33, 0x09, 3),
    row(115.98, 38.66, 0x14, 3),
    row(118.00, 39.33, 0x13, 3),
    row(120.00, 40.00, 0x08, 3),
    row(124.00, 31.00, 0x0E, 4),
    row(126.00, 31.50, 0x12, 4),
    row(129.99, 32.50, 0x11, 4),
    row(132.99, 33.25, 0x0F, 4),
    row(135.00, 33.75, 0x10, 4),
    row(138.01, 34.50, 0x1F, 4),
    row(140.00, 35.00, 0x0C, 4),
    row(141.99, 35.50, 0x1E, 4),
    row(143.98, 35.99, 0x1D, 4),
    row(145.98, 36.50, 0x1C, 4),
    row(147.95, 36.99, 0x1B, 4),
    row(150.00, 37.50, 0x0D, 4),
    row(154.99, 38.75, 0x1A, 4),
    row(160.01, 40.00, 0x19, 4),
    row(166.00, 41.50, 0x18, 4),
];

/// ICS94211: 21-byte image, byte-count stamp at byte 8, inverted latches.
pub static ICS94211: ChipDescriptor = ChipDescriptor {
    name: "ICS94211",
    register_image_length: 21,
    frequency_table: &ICS94211_TABLE,
    byte_count_field: Some(8),
    select_flag: Some(BitLocation::new(0, 3)),
    select_bits: bits_in_byte(0, [Some(4), Some(5), Some(6), Some(7), Some(2), None]),
    latch_bits: bits_at([Some((3, 6)), Some((4, 3)), Some((1, 7)), Some((4, 1)), None, None]),
    latch_bits_inverted: true,
    supports_probe: true,
    supports_read: true,
    initial_register_image: &[
        0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x06, 0x3F,
        0x08, 0x00, 0x10, 0xFF, 0xFF, 0xFF, 0xFF, 0x00,
        0x3F, 0x00, 0x00, 0xFF, 0xFF,
    ],
};

// ── CY28316 ──────────────────────────────────────────────────────────────────

const CY28316_TABLE: [FrequencyEntry; 32] = [
    row(67.20, 33.60, 0x0C, 2),
    row(67.00, 33.50, 0x10, 2),
    row(66.60, 33.30, 0x1C, 2),
    row(66.80, 33.40, 0x14, 2),
    row(75.00, 37.50, 0x1E, 2),
    row(78.00, 39.00, 0x1B, 2),
    row(85.00, 28.30, 0x1A, 3),
    row(90.00, 30.00, 0x19, 3),
    row(100.20, 33.40, 0x15, 3),
    row(100.50, 33.50, 0x11, 3),
    row(100.80, 33.60, 0x0D, 3),
    row(100.00, 33.30, 0x1D, 3),
    row(105.00, 35.00, 0x18, 3),
    row(110.00, 36.70, 0x16, 3),
    row(115.00, 38.30, 0x12, 3),
    row(118.00, 39.30, 0x0E, 3),
    row(124.00, 31.00, 0x0B, 4),
    row(130.00, 32.50, 0x0A, 4),
    row(133.60, 33.40, 0x17, 4),
    row(134.00, 33.50, 0x13, 4),
    row(134.40, 33.60, 0x0F, 4),
    row(133.30, 33.30, 0x1F, 4),
    row(136.00, 34.00, 0x09, 4),
    row(140.00, 35.00, 0x08, 4),
    row(145.00, 36.30, 0x07, 4),
    row(150.00, 37.50, 0x06, 4),
    row(160.00, 32.00, 0x05, 5),
    row(166.00, 33.20, 0x04, 5),
    row(170.00, 34.00, 0x03, 5),
    row(180.00, 36.00, 0x02, 5),
    row(190.00, 38.00, 0x01, 5),
    row(200.00, 33.30, 0x00, 6),
];

/// Cypress CY28316.
pub static CY28316: ChipDescriptor = ChipDescriptor {
    name: "CY28316",
    register_image_length: 18,
    frequency_table: &CY28316_TABLE,
    byte_count_field: None,
    select_flag: Some(BitLocation::new(0, 3)),
    select_bits: bits_in_byte(0, [Some(4), Some(5), Some(6), Some(1), Some(2), None]),
    latch_bits: bits_at([Some((1, 3)), Some((1, 4)), Some((1, 5)), Some((1, 6)), Some((1, 7)), None]),
    latch_bits_inverted: false,
    supports_probe: true,
    supports_read: true,
    initial_register_image: &[
        0x00, 0xFE, 0xFF, 0xBF, 0x00, 0x03, 0x3E, 0x60,
        0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03,
        0x00, 0x00,
    ],
};

// ── ICS9148-37 ───────────────────────────────────────────────────────────────

const ICS9148_37_TABLE: [FrequencyEntry; 8] = [
    row(60.00, 30.00, 0x00, 2),
    row(66.80, 33.40, 0x01, 2),
    row(68.50, 34.25, 0x02, 2),
    row(75.00, 30.00, 0x04, 3),
    row(75.00, 37.50, 0x03, 2),
    row(83.30, 33.30, 0x05, 3),
    row(95.25, 31.75, 0x06, 3),
    row(100.00, 33.30, 0x07, 3),
];

/// ICS9148-37: three select bits, no byte-count field.
pub static ICS9148_37: ChipDescriptor = ChipDescriptor {
    name: "ICS9148-37",
    register_image_length: 6,
    frequency_table: &ICS9148_37_TABLE,
    byte_count_field: None,
    select_flag: Some(BitLocation::new(0, 3)),
    select_bits: bits_in_byte(0, [Some(4), Some(5), Some(6), None, None, None]),
    latch_bits: bits_at([Some((0, 4)), Some((0, 5)), Some((0, 6)), None, None, None]),
    latch_bits_inverted: false,
    supports_probe: true,
    supports_read: true,
    initial_register_image: &[
        0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    ],
};

// ── ICS9248-127 ──────────────────────────────────────────────────────────────

const ICS9248_127_TABLE: [FrequencyEntry; 16] = [
    row(60.00, 30.00, 0x0F, 2),
    row(66.82, 33.41, 0x0E, 2),
    row(70.00, 35.00, 0x0D, 2),
    row(75.00, 37.50, 0x07, 2),
    row(80.00, 40.00, 0x06, 2),
    row(83.31, 41.65, 0x05, 2),
    row(83.31, 27.77, 0x0A, 3),
    row(90.00, 30.00, 0x0C, 3),
    row(95.19, 31.73, 0x09, 3),
    row(97.00, 32.33, 0x0B, 3),
    row(100.00, 33.33, 0x08, 3),
    row(105.00, 35.00, 0x04, 3),
    row(109.99, 36.66, 0x03, 3),
    row(114.99, 38.33, 0x02, 3),
    row(120.00, 40.00, 0x01, 3),
    row(124.00, 41.33, 0x00, 3),
];

/// ICS9248-127.
pub static ICS9248_127: ChipDescriptor = ChipDescriptor {
    name: "ICS9248-127",
    register_image_length: 6,
    frequency_table: &ICS9248_127_TABLE,
    byte_count_field: None,
    select_flag: Some(BitLocation::new(0, 3)),
    select_bits: bits_in_byte(0, [Some(2), Some(4), Some(5), Some(6), None, None]),
    latch_bits: bits_at([Some((2, 7)), Some((4, 3)), Some((1, 7)), Some((4, 1)), None, None]),
    latch_bits_inverted: true,
    supports_probe: true,
    supports_read: true,
    initial_register_image: &[
        0x82, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    ],
};

// ── ICS94215 ─────────────────────────────────────────────────────────────────

const ICS94215_TABLE: [FrequencyEntry; 32] = [
    row(90.00, 30.00, 0x00, 3),
    row(95.00, 31.67, 0x01, 3),
    row(100.00, 33.33, 0x17, 3),
    row(101.00, 33.67, 0x02, 3),
    row(100.90, 33.57, 0x04, 3),
    row(100.00, 33.33, 0x07, 3),
    row(102.00, 34.00, 0x03, 3),
    row(103.00, 34.33, 0x05, 3),
    row(105.00, 35.00, 0x06, 3),
    row(107.00, 35.67, 0x08, 3),
    row(109.00, 36.33, 0x09, 3),
    row(110.00, 36.67, 0x0A, 3),
    row(111.00, 37.00, 0x0B, 3),
    row(113.00, 37.67, 0x0C, 3),
    row(115.00, 38.33, 0x0D, 3),
    row(117.00, 39.00, 0x0E, 3),
    row(120.00, 40.00, 0x10, 3),
    row(125.00, 31.25, 0x11, 4),
    row(130.00, 32.50, 0x12, 4),
    row(133.73, 33.43, 0x13, 4),
    row(133.00, 33.33, 0x0F, 4),
    row(133.33, 33.33, 0x1F, 4),
    row(135.00, 33.75, 0x14, 4),
    row(137.00, 34.25, 0x15, 4),
    row(139.00, 34.75, 0x16, 4),
    row(140.00, 35.00, 0x18, 4),
    row(143.00, 35.75, 0x19, 4),
    row(145.00, 36.25, 0x1A, 4),
    row(148.00, 37.00, 0x1B, 4),
    row(150.00, 37.50, 0x1C, 4),
    row(155.00, 38.75, 0x1D, 4),
    row(166.66, 41.67, 0x1E, 4),
];

/// ICS94215.
pub static ICS94215: ChipDescriptor = ChipDescriptor {
    name: "ICS94215",
    register_image_length: 21,
    frequency_table: &ICS94215_TABLE,
    byte_count_field: Some(8),
    select_flag: Some(BitLocation::new(0, 3)),
    select_bits: bits_in_byte(0, [Some(4), Some(5), Some(6), Some(7), Some(2), None]),
    latch_bits: bits_at([Some((2, 7)), Some((5, 3)), Some((1, 7)), Some((1, 4)), None, None]),
    latch_bits_inverted: true,
    supports_probe: true,
    supports_read: true,
    initial_register_image: &[
        0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x06, 0x3F,
        0x08, 0x00, 0x10, 0xFF, 0xFF, 0xFF, 0xFF, 0x00,
        0xFF, 0xEA, 0xAA, 0xFF, 0xFF,
    ],
};

// ── ICS94241 ─────────────────────────────────────────────────────────────────

const ICS94241_TABLE: [FrequencyEntry; 32] = [
    row(66.67, 33.33, 0x00, 2),
    row(66.67, 33.33, 0x01, 2),
    row(68.67, 34.33, 0x02, 2),
    row(71.34, 35.66, 0x03, 2),
    row(73.34, 36.66, 0x04, 2),
    row(76.67, 38.33, 0x05, 2),
    row(90.00, 30.00, 0x0F, 3),
    row(100.90, 33.63, 0x0E, 3),
    row(100.00, 33.33, 0x08, 3),
    row(100.00, 33.33, 0x09, 3),
    row(103.00, 34.33, 0x0A, 3),
    row(107.00, 35.67, 0x0B, 3),
    row(110.00, 36.67, 0x0C, 3),
    row(115.00, 38.33, 0x0D, 3),
    row(120.00, 30.00, 0x1F, 4),
    row(133.90, 33.48, 0x1E, 4),
    row(133.33, 33.33, 0x19, 4),
    row(133.33, 33.33, 0x18, 4),
    row(137.33, 34.33, 0x1A, 4),
    row(142.67, 35.67, 0x1B, 4),
    row(146.67, 36.67, 0x1C, 4),
    row(150.00, 30.00, 0x06, 5),
    row(153.33, 38.33, 0x1D, 4),
    row(166.67, 33.33, 0x07, 5),
    row(180.00, 30.00, 0x17, 6),
    row(200.00, 33.33, 0x11, 6),
    row(200.00, 33.33, 0x10, 6),
    row(201.80, 33.63, 0x16, 6),
    row(206.00, 34.33, 0x12, 6),
    row(214.00, 35.67, 0x13, 6),
    row(220.00, 36.67, 0x14, 6),
    row(230.00, 38.33, 0x15, 6),
];

/// ICS94241: five latch bits.
pub static ICS94241: ChipDescriptor = ChipDescriptor {
    name: "ICS94241",
    register_image_length: 21,
    frequency_table: &ICS94241_TABLE,
    byte_count_field: Some(8),
    select_flag: Some(BitLocation::new(0, 3)),
    select_bits: bits_in_byte(0, [Some(4), Some(5), Some(6), Some(7), Some(2), None]),
    latch_bits: bits_at([Some((3, 6)), Some((4, 3)), Some((1, 7)), Some((4, 1)), Some((4, 2)), None]),
    latch_bits_inverted: true,
    supports_probe: true,
    supports_read: true,
    initial_register_image: &[
        0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F, 0x3F,
        0x08, 0x00, 0x10, 0xFF, 0xFF, 0xFF, 0xFF, 0x66,
        0x00, 0xAA, 0xAA, 0xFF, 0xFF,
    ],
};

// ── ICS950405 ────────────────────────────────────────────────────────────────

const ICS950405_TABLE: [FrequencyEntry; 16] = [
    row(100.20, 33.40, 0x04, 3),
    row(100.90, 33.63, 0x00, 3),
    row(133.50, 33.38, 0x05, 4),
    row(133.90, 33.48, 0x01, 4),
    row(150.00, 30.00, 0x08, 5),
    row(166.70, 33.34, 0x06, 5),
    row(168.00, 33.60, 0x02, 5),
    row(180.00, 30.00, 0x09, 6),
    row(200.40, 33.40, 0x07, 6),
    row(202.00, 33.67, 0x03, 6),
    row(210.00, 35.00, 0x0A, 6),
    row(233.33, 33.33, 0x0D, 7),
    row(240.00, 30.00, 0x0B, 8),
    row(266.67, 33.33, 0x0E, 8),
    row(270.00, 33.75, 0x0C, 8),
    row(300.00, 37.50, 0x0F, 8),
];

/// ICS950405: no select flag, so the key always comes from byte 0 bits 0..3.
pub static ICS950405: ChipDescriptor = ChipDescriptor {
    name: "ICS950405",
    register_image_length: 15,
    frequency_table: &ICS950405_TABLE,
    byte_count_field: Some(6),
    select_flag: None,
    select_bits: bits_in_byte(0, [Some(0), Some(1), Some(2), Some(3), None, None]),
    latch_bits: bits_at([Some((0, 0)), Some((0, 1)), Some((0, 2)), Some((0, 3)), None, None]),
    latch_bits_inverted: false,
    supports_probe: true,
    supports_read: true,
    initial_register_image: &[
        0xB0, 0xFF, 0xFF, 0xF5, 0x7F, 0xFF, 0x06, 0x01,
        0xCC, 0x77, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
    ],
};

// ── ICS950908 ────────────────────────────────────────────────────────────────

const ICS950908_TABLE: [FrequencyEntry; 32] = [
    row(66.80, 33.40, 0x18, 2),
    row(66.60, 32.30, 0x1C, 2),
    row(100.90, 33.63, 0x19, 3),
    row(100.00, 33.30, 0x1D, 3),
    row(102.00, 34.00, 0x00, 3),
    row(105.00, 35.00, 0x01, 3),
    row(108.00, 36.00, 0x02, 3),
    row(111.00, 27.00, 0x03, 4),
    row(114.00, 38.00, 0x04, 3),
    row(117.00, 39.00, 0x05, 3),
    row(120.00, 40.00, 0x06, 3),
    row(123.00, 41.00, 0x07, 3),
    row(126.00, 36.00, 0x08, 4),
    row(130.00, 37.10, 0x09, 4),
    row(133.90, 33.48, 0x0A, 4),
    row(133.30, 33.30, 0x1F, 4),
    row(133.60, 33.40, 0x1A, 4),
    row(140.00, 35.00, 0x0B, 4),
    row(144.00, 36.00, 0x0C, 4),
    row(148.00, 37.00, 0x0D, 4),
    row(152.00, 38.00, 0x0E, 4),
    row(156.00, 39.00, 0x0F, 4),
    row(160.00, 40.00, 0x10, 4),
    row(164.00, 41.00, 0x11, 4),
    row(166.60, 33.30, 0x12, 5),
    row(170.00, 34.00, 0x13, 5),
    row(175.00, 35.00, 0x14, 5),
    row(180.00, 36.00, 0x15, 5),
    row(185.00, 37.00, 0x16, 5),
    row(190.00, 38.00, 0x17, 5),
    row(200.40, 33.40, 0x1B, 6),
    row(200.00, 33.30, 0x1E, 6),
];

/// ICS950908: 24-byte image.
pub static ICS950908: ChipDescriptor = ChipDescriptor {
    name: "ICS950908",
    register_image_length: 24,
    frequency_table: &ICS950908_TABLE,
    byte_count_field: Some(8),
    select_flag: Some(BitLocation::new(0, 3)),
    select_bits: bits_in_byte(0, [Some(4), Some(5), Some(6), Some(7), Some(2), None]),
    latch_bits: bits_at([Some((4, 4)), Some((4, 5)), Some((4, 6)), Some((4, 7)), None, None]),
    latch_bits_inverted: false,
    supports_probe: true,
    supports_read: true,
    initial_register_image: &[
        0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xF1, 0x17,
        0x0F, 0x10, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x55,
        0x50, 0x09, 0xAB, 0x88, 0x88, 0x55, 0x55, 0x55,
    ],
};

// ── PLL205-03 ────────────────────────────────────────────────────────────────

const PLL205_03_TABLE: [FrequencyEntry; 32] = [
    row(66.80, 33.40, 0x03, 2),
    row(75.00, 37.50, 0x01, 2),
    row(83.30, 41.70, 0x02, 2),
    row(90.00, 30.00, 0x10, 3),
    row(92.50, 30.80, 0x11, 3),
    row(95.00, 31.70, 0x12, 3),
    row(97.50, 32.50, 0x13, 3),
    row(100.00, 33.30, 0x17, 3),
    row(100.00, 33.30, 0x07, 3),
    row(101.50, 33.80, 0x14, 3),
    row(103.00, 34.30, 0x04, 3),
    row(105.00, 35.00, 0x0B, 3),
    row(107.50, 35.80, 0x1B, 3),
    row(110.00, 36.70, 0x0A, 3),
    row(112.00, 37.30, 0x05, 3),
    row(115.00, 38.30, 0x09, 3),
    row(117.50, 39.20, 0x19, 3),
    row(120.00, 40.00, 0x18, 3),
    row(120.00, 40.00, 0x08, 3),
    row(122.00, 40.70, 0x1A, 3),
    row(124.00, 31.00, 0x0E, 4),
    row(124.00, 41.30, 0x00, 3),
    row(127.00, 42.30, 0x15, 3),
    row(130.00, 32.50, 0x1E, 4),
    row(133.30, 33.30, 0x1F, 4),
    row(133.30, 33.30, 0x0F, 4),
    row(133.30, 44.40, 0x06, 3),
    row(136.50, 34.10, 0x16, 4),
    row(140.00, 35.00, 0x0C, 4),
    row(145.00, 36.30, 0x1C, 4),
    row(150.00, 37.50, 0x0D, 4),
    row(155.00, 38.70, 0x1D, 4),
];

/// PhaseLink PLL205-03.
pub static PLL205_03: ChipDescriptor = ChipDescriptor {
    name: "PLL205-03",
    register_image_length: 9,
    frequency_table: &PLL205_03_TABLE,
    byte_count_field: None,
    select_flag: Some(BitLocation::new(0, 3)),
    select_bits: bits_in_byte(0, [Some(4), Some(5), Some(6), Some(7), Some(2), None]),
    latch_bits: bits_at([Some((5, 4)), Some((5, 5)), Some((5, 6)), Some((5, 7)), None, None]),
    latch_bits_inverted: true,
    supports_probe: true,
    supports_read: true,
    initial_register_image: &[
        0x42, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x03, 0x00,
        0x02,
    ],
};

// ── W124 ─────────────────────────────────────────────────────────────────────

const W124_TABLE: [FrequencyEntry; 8] = [
    row(66.80, 33.40, 0x03, 2),
    row(75.00, 37.50, 0x01, 2),
    row(83.30, 41.60, 0x02, 2),
    row(100.00, 33.30, 0x07, 3),
    row(103.00, 34.25, 0x04, 3),
    row(112.00, 37.30, 0x05, 3),
    row(124.00, 41.30, 0x00, 3),
    row(133.30, 44.43, 0x06, 3),
];

/// Winbond W124: write-only, cannot be read back or probed.
pub static W124: ChipDescriptor = ChipDescriptor {
    name: "W124",
    register_image_length: 7,
    frequency_table: &W124_TABLE,
    byte_count_field: None,
    select_flag: Some(BitLocation::new(3, 3)),
    select_bits: bits_in_byte(3, [Some(4), Some(5), Some(6), None, None, None]),
    latch_bits: NO_LATCHES,
    latch_bits_inverted: false,
    supports_probe: false,
    supports_read: false,
    initial_register_image: &[
        0x00, 0x00, 0x00, 0x00, 0x45, 0xEF, 0x23,
    ],
};

// ── W156C ────────────────────────────────────────────────────────────────────

const W156C_TABLE: [FrequencyEntry; 16] = [
    row(60.00, 30.00, 0x0F, 2),
    row(66.80, 33.40, 0x0E, 2),
    row(70.00, 35.00, 0x0D, 2),
    row(75.00, 37.50, 0x07, 2),
    row(75.00, 25.00, 0x0C, 3),
    row(83.30, 27.70, 0x0A, 3),
    row(83.30, 41.70, 0x05, 2),
    row(95.25, 31.75, 0x09, 3),
    row(97.00, 32.30, 0x0B, 3),
    row(96.20, 32.00, 0x06, 3),
    row(100.00, 33.30, 0x08, 3),
    row(105.00, 35.00, 0x04, 3),
    row(110.00, 36.70, 0x03, 3),
    row(115.00, 38.30, 0x02, 3),
    row(120.00, 40.00, 0x01, 3),
    row(124.00, 41.30, 0x00, 3),
];

/// Winbond W156C: write-only.
pub static W156C: ChipDescriptor = ChipDescriptor {
    name: "W156C",
    register_image_length: 8,
    frequency_table: &W156C_TABLE,
    byte_count_field: None,
    select_flag: Some(BitLocation::new(0, 3)),
    select_bits: bits_in_byte(0, [Some(4), Some(5), Some(6), Some(7), None, None]),
    latch_bits: NO_LATCHES,
    latch_bits_inverted: false,
    supports_probe: false,
    supports_read: false,
    initial_register_image: &[
        0x00, 0x0F, 0x5F, 0x3F, 0x00, 0x03, 0x00, 0x00,
    ],
};

// ── W230-03H ─────────────────────────────────────────────────────────────────

const W230_03H_TABLE: [FrequencyEntry; 32] = [
    row(95.00, 31.70, 0x1C, 3),
    row(100.00, 33.30, 0x1F, 3),
    row(100.00, 33.30, 0x1E, 3),
    row(100.00, 33.30, 0x1D, 3),
    row(102.00, 34.00, 0x18, 4),
    row(104.00, 34.60, 0x17, 4),
    row(106.00, 35.30, 0x16, 4),
    row(107.00, 35.60, 0x15, 3),
    row(108.00, 36.00, 0x14, 3),
    row(109.00, 36.30, 0x13, 3),
    row(110.00, 36.60, 0x12, 3),
    row(111.00, 37.00, 0x11, 3),
    row(112.00, 37.30, 0x10, 3),
    row(113.00, 37.60, 0x0F, 3),
    row(114.00, 38.00, 0x0E, 3),
    row(115.00, 38.30, 0x0D, 3),
    row(116.00, 38.60, 0x0C, 3),
    row(118.00, 39.30, 0x0B, 3),
    row(120.00, 40.00, 0x0A, 3),
    row(124.00, 31.00, 0x09, 3),
    row(127.00, 31.70, 0x08, 3),
    row(130.00, 32.50, 0x07, 3),
    row(133.30, 33.30, 0x1B, 4),
    row(133.30, 33.30, 0x1A, 4),
    row(133.30, 33.30, 0x19, 4),
    row(136.00, 34.00, 0x06, 4),
    row(140.00, 35.00, 0x05, 4),
    row(145.00, 36.20, 0x04, 4),
    row(150.00, 37.50, 0x03, 4),
    row(155.00, 38.70, 0x02, 4),
    row(160.00, 40.00, 0x01, 4),
    row(166.00, 41.60, 0x00, 4),
];

/// Winbond W230-03H: write-only.
pub static W230_03H: ChipDescriptor = ChipDescriptor {
    name: "W230-03H",
    register_image_length: 8,
    frequency_table: &W230_03H_TABLE,
    byte_count_field: None,
    select_flag: Some(BitLocation::new(0, 3)),
    select_bits: bits_in_byte(0, [Some(4), Some(5), Some(6), Some(1), Some(2), None]),
    latch_bits: NO_LATCHES,
    latch_bits_inverted: false,
    supports_probe: false,
    supports_read: false,
    initial_register_image: &[
        0x04, 0x0F, 0x5F, 0x37, 0x00, 0x13, 0x00, 0x00,
    ],
};

// ── W83194BR-39B ─────────────────────────────────────────────────────────────

const W83194BR_39B_TABLE: [FrequencyEntry; 64] = [
    row(66.82, 33.41, 0x03, 2),
    row(68.01, 34.01, 0x06, 2),
    row(75.00, 37.50, 0x01, 2),
    row(80.00, 40.00, 0x00, 2),
    row(83.30, 41.65, 0x02, 2),
    row(100.23, 33.41, 0x07, 3),
    row(103.00, 34.33, 0x04, 3),
    row(105.00, 35.00, 0x0B, 3),
    row(112.00, 37.34, 0x05, 3),
    row(115.00, 38.33, 0x09, 3),
    row(120.00, 30.00, 0x08, 4),
    row(120.00, 40.00, 0x0A, 3),
    row(124.00, 31.00, 0x0E, 4),
    row(127.00, 31.75, 0x11, 4),
    row(130.00, 32.50, 0x12, 4),
    row(133.30, 33.30, 0x0F, 4),
    row(135.00, 33.75, 0x13, 4),
    row(136.00, 34.00, 0x14, 4),
    row(137.00, 34.25, 0x15, 4),
    row(139.00, 34.75, 0x16, 4),
    row(140.00, 35.00, 0x0C, 4),
    row(140.00, 35.00, 0x17, 4),
    row(141.00, 35.25, 0x18, 4),
    row(142.00, 35.50, 0x19, 4),
    row(143.00, 35.75, 0x1A, 4),
    row(144.00, 36.00, 0x1B, 4),
    row(145.00, 36.25, 0x1C, 4),
    row(146.00, 36.50, 0x1D, 4),
    row(148.00, 37.00, 0x1E, 4),
    row(149.00, 37.25, 0x1F, 4),
    row(151.00, 37.75, 0x20, 4),
    row(152.00, 38.00, 0x21, 4),
    row(153.00, 38.25, 0x22, 4),
    row(154.00, 38.50, 0x23, 4),
    row(155.00, 38.75, 0x0D, 4),
    row(155.00, 38.75, 0x24, 4),
    row(156.00, 39.00, 0x25, 4),
    row(157.00, 39.25, 0x26, 4),
    row(158.00, 39.50, 0x27, 4),
    row(159.00, 39.75, 0x28, 4),
    row(160.00, 40.00, 0x10, 4),
    row(162.00, 40.50, 0x29, 4),
    row(163.00, 32.60, 0x2A, 5),
    row(164.00, 32.80, 0x2B, 5),
    row(165.00, 33.00, 0x2C, 5),
    row(167.00, 33.40, 0x2D, 5),
    row(168.00, 33.60, 0x2E, 5),
    row(169.00, 33.80, 0x2F, 5),
    row(170.00, 34.00, 0x30, 5),
    row(172.00, 34.40, 0x31, 5),
    row(174.00, 34.80, 0x32, 5),
    row(176.00, 35.20, 0x33, 5),
    row(178.00, 35.60, 0x34, 5),
    row(180.00, 36.00, 0x35, 5),
    row(182.00, 36.40, 0x36, 5),
    row(184.00, 36.80, 0x37, 5),
    row(186.00, 37.20, 0x38, 5),
    row(188.00, 37.60, 0x39, 5),
    row(190.00, 38.00, 0x3A, 5),
    row(192.00, 38.40, 0x3B, 5),
    row(194.00, 38.80, 0x3C, 5),
    row(196.00, 39.20, 0x3D, 5),
    row(198.00, 39.60, 0x3E, 5),
    row(200.00, 40.00, 0x3F, 5),
];

/// Winbond W83194BR-39B: six-bit keys, select flag at byte 0 bit 1.
pub static W83194BR_39B: ChipDescriptor = ChipDescriptor {
    name: "W83194BR-39B",
    register_image_length: 13,
    frequency_table: &W83194BR_39B_TABLE,
    byte_count_field: None,
    select_flag: Some(BitLocation::new(0, 1)),
    select_bits: bits_in_byte(0, [Some(2), Some(3), Some(4), Some(5), Some(6), Some(7)]),
    latch_bits: bits_at([Some((4, 3)), Some((4, 4)), Some((4, 5)), Some((4, 6)), None, None]),
    latch_bits_inverted: false,
    supports_probe: true,
    supports_read: true,
    initial_register_image: &[
        0x00, 0xCF, 0xFF, 0xFF, 0xFF, 0x93, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x62, 0x51,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::pci_divider;

    static ALL: [&ChipDescriptor; 13] = [
        &CY28316,
        &ICS9148_37,
        &ICS9248_127,
        &ICS94211,
        &ICS94215,
        &ICS94241,
        &ICS950405,
        &ICS950908,
        &PLL205_03,
        &W124,
        &W156C,
        &W230_03H,
        &W83194BR_39B,
    ];

    #[test]
    fn every_chip_validates() {
        for chip in ALL {
            assert_eq!(chip.validate(), Ok(()), "{}", chip.name);
        }
    }

    #[test]
    fn stored_divider_is_authoritative() {
        // W230-03H stores 102/34 under divider 4; the plan filters on the stored value
        let entry = W230_03H.entry_for(102.0, Some(34.0));
        assert_eq!(entry.map(|e| (e.key, e.pci_divider)), Some((0x18, 4)));
        assert_eq!(pci_divider(102.0, 34.0), 3);
    }

    #[test]
    fn write_only_chips_have_no_latches() {
        for chip in [&W124, &W156C, &W230_03H] {
            assert!(!chip.supports_read());
            assert!(!chip.supports_probe());
            assert!(chip.latch_bits.iter().all(Option::is_none));
        }
    }
}
