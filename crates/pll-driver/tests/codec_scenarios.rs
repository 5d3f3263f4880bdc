//! Generic register codec against the simulated controller
//!
//! End-to-end set/get for every catalog chip, plus the bus-traffic guarantees:
//! unsupported frequencies never write, unreadable chips never touch the bus.

use pll_chip::chips::{ICS94211, ICS950405, W124};
use pll_chip::smbus::{status, Direction, Protocol, PLL_SLAVE_ADDRESS};
use pll_chip::{FrequencyPlan, RegisterImage, CATALOG};
use pll_driver::{BusConfig, BusFault, PllCodec, PllError, SimulatedBus, SmBus};
use std::time::Duration;

const BASE: u16 = 0x5000;

fn codec_with(image: &[u8]) -> PllCodec<SimulatedBus> {
    let sim = SimulatedBus::new(BASE).with_device(PLL_SLAVE_ADDRESS, image.to_vec());
    let config = BusConfig::new(BASE).with_poll_interval(Duration::ZERO);
    PllCodec::new(SmBus::new(sim, config))
}

fn sim(codec: &PllCodec<SimulatedBus>) -> &SimulatedBus {
    codec.bus().io()
}

#[test]
fn ics94211_set_100_23() {
    let mut codec = codec_with(ICS94211.initial_register_image);
    let image = codec
        .set_frequency(&ICS94211, 100.23, Some(33.41), false)
        .unwrap();

    // 0x02 | select flag (bit 3) | key 0x07 on bits 4..6
    assert_eq!(image.get(0), Some(0x7A));
    assert_eq!(image.get(8), Some(21));

    // Byte-count cycle (write + read-back), then the commit
    let writes: Vec<_> = sim(&codec).writes().cloned().collect();
    assert_eq!(writes.len(), 2);
    let commit = &writes[1];
    assert_eq!(commit.protocol, Protocol::BlockData);
    assert_eq!(commit.slave, PLL_SLAVE_ADDRESS);
    assert_eq!(commit.data.len(), 21);
    assert_eq!(commit.data, image.as_bytes());
    assert_eq!(sim(&codec).block_writes(), 42);

    let device = sim(&codec).device(PLL_SLAVE_ADDRESS).unwrap();
    assert_eq!(device[0], 0x7A);
}

#[test]
fn set_then_get_reports_new_frequency() {
    let mut codec = codec_with(ICS94211.initial_register_image);
    codec.set_frequency(&ICS94211, 150.0, None, false).unwrap();
    let current = codec.get_frequency(&ICS94211).unwrap().unwrap();
    assert_eq!((current.fsb, current.pci, current.key), (150.0, 37.5, 0x0D));
    assert_eq!(current.pci_divider, 4);
}

#[test]
fn unsupported_frequency_writes_nothing() {
    let mut codec = codec_with(ICS94211.initial_register_image);
    let err = codec
        .set_frequency(&ICS94211, 123.45, None, false)
        .unwrap_err();
    assert!(matches!(
        err,
        PllError::UnsupportedFrequency { chip: "ICS94211", .. }
    ));
    assert!(sim(&codec).transactions().is_empty());

    // A known FSB with the wrong PCI is just as unsupported
    let err = codec
        .set_frequency(&ICS94211, 100.23, Some(40.0), false)
        .unwrap_err();
    assert!(matches!(err, PllError::UnsupportedFrequency { .. }));
    assert_eq!(sim(&codec).writes().count(), 0);
}

#[test]
fn read_unsupported_never_touches_bus() {
    let mut codec = codec_with(W124.initial_register_image);
    let err = codec.get_frequency(&W124).unwrap_err();
    assert!(matches!(err, PllError::ReadUnsupported { chip: "W124" }));
    assert!(sim(&codec).transactions().is_empty());
    assert_eq!(sim(&codec).block_reads(), 0);
}

#[test]
fn dry_run_edits_image_only() {
    let mut codec = codec_with(ICS94211.initial_register_image);
    let image = codec
        .set_frequency(&ICS94211, 100.23, None, true)
        .unwrap();
    assert_eq!(image.get(0), Some(0x7A));
    assert_eq!(image.get(8), Some(21));
    assert!(sim(&codec).transactions().is_empty());
}

#[test]
fn write_only_chip_is_written_once() {
    let mut codec = codec_with(W124.initial_register_image);
    let image = codec.set_frequency(&W124, 100.0, None, false).unwrap();
    let writes: Vec<_> = sim(&codec).writes().collect();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].data, image.as_bytes());
    assert_eq!(W124.decode(image.as_bytes()).map(|e| e.fsb), Some(100.0));
}

#[test]
fn latched_key_is_inverted_on_present_bits_only() {
    // Select flag clear and every latch pin low
    let mut image = ICS94211.initial_register_image.to_vec();
    image[0] &= !0x08;
    image[1] &= !0x80;
    image[3] &= !0x40;
    image[4] &= !0x0A;

    let mut codec = codec_with(&image);
    let current = codec.get_frequency(&ICS94211).unwrap().unwrap();
    // Four inverted latch bits read 1, absent FS4 stays 0
    assert_eq!(current.key, 0x0F);
}

#[test]
fn unknown_key_is_not_an_error() {
    // ICS950405 has no select flag: byte 0 low nibble is the key
    let mut image = ICS950405.initial_register_image.to_vec();
    image[0] = 0xB0 | 0x0B;
    let mut codec = codec_with(&image);
    let current = codec.get_frequency(&ICS950405).unwrap();
    assert_eq!(current.map(|e| e.fsb), Some(240.0));

    let chip = pll_chip::ChipDescriptor {
        frequency_table: &ICS950405.frequency_table[..1],
        ..ICS950405.clone()
    };
    assert!(codec.get_frequency(&chip).unwrap().is_none());
}

#[test]
fn apply_on_read_image_keeps_live_bytes() {
    let mut live = ICS94211.initial_register_image.to_vec();
    live[10] = 0x5A;
    let mut codec = codec_with(&live);

    let mut image = codec.read_image(&ICS94211).unwrap();
    assert_eq!(image.get(10), Some(0x5A));
    let entry = codec
        .apply_frequency(&ICS94211, &mut image, 132.99, None, false)
        .unwrap();
    assert_eq!(entry.key, 0x0F);

    let device = sim(&codec).device(PLL_SLAVE_ADDRESS).unwrap();
    assert_eq!(device[10], 0x5A);
    assert_eq!(device, image.as_bytes());
}

#[test]
fn bus_fault_during_commit_propagates() {
    let mut codec = codec_with(W124.initial_register_image);
    codec.bus_mut().io_mut().inject_fault(status::DEV_ERR);
    let err = codec.set_frequency(&W124, 100.0, None, false).unwrap_err();
    assert!(matches!(
        err.bus_fault(),
        Some(BusFault::NoResponse { .. })
    ));
}

#[test]
fn every_readable_chip_round_trips() {
    for chip in CATALOG.iter().filter(|c| c.supports_read()) {
        for row in chip.list_supported() {
            let mut codec = codec_with(chip.initial_register_image);
            let expected = chip.entry_for(row.fsb, Some(row.pci)).unwrap();
            codec
                .set_frequency(chip, row.fsb, Some(row.pci), false)
                .unwrap();

            let got = codec.get_frequency(chip).unwrap().unwrap();
            assert_eq!(got.key, expected.key, "{} {row}", chip.name);

            // Rows sharing a key decode to the first of them
            let first = chip.entry_for_key(expected.key).unwrap();
            assert_eq!(got, *first, "{} {row}", chip.name);
        }
    }
}

#[test]
fn every_write_only_chip_encodes_decodably() {
    for chip in CATALOG.iter().filter(|c| !c.supports_read()) {
        for row in chip.list_supported() {
            let mut image = RegisterImage::seed(chip);
            chip.write_key(image.as_bytes_mut(), row.key);
            assert_eq!(chip.read_key(image.as_bytes()), row.key, "{} {row}", chip.name);
        }
    }
}

#[test]
fn plan_drives_codec() {
    let mut codec = codec_with(ICS94211.initial_register_image);
    codec.set_frequency(&ICS94211, 100.23, None, false).unwrap();
    let current = codec.get_frequency(&ICS94211).unwrap();

    let plan = FrequencyPlan::new(&ICS94211, current.as_ref(), false);
    assert!(plan.resolve(150.0, None).is_none());
    let target = plan.resolve(112.01, None).unwrap();
    let mut image = codec.read_image(&ICS94211).unwrap();
    codec
        .apply_frequency(&ICS94211, &mut image, target.fsb, Some(target.pci), false)
        .unwrap();
    let now = codec.get_frequency(&ICS94211).unwrap().unwrap();
    assert_eq!(now.fsb, 112.01);
    assert_eq!(now.pci_divider, 3);
}

#[test]
fn probe_reports_presence() {
    let mut codec = codec_with(ICS94211.initial_register_image);
    assert!(codec.probe_chip(&ICS94211).unwrap());
    let quick = sim(&codec).transactions().last().cloned().unwrap();
    assert_eq!(quick.protocol, Protocol::Quick);
    assert_eq!(quick.direction, Direction::Write);

    let mut empty = PllCodec::new(SmBus::new(
        SimulatedBus::new(BASE),
        BusConfig::new(BASE).with_poll_interval(Duration::ZERO),
    ));
    assert!(!empty.probe_chip(&ICS94211).unwrap());
}
