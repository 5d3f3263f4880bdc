//! Live hardware checks
//!
//! Need root, a PIIX4/VIA SMBus controller and `PLL_SMBUS_BASE` (hex) set to
//! its I/O base. Read-only: nothing here programs the PLL.

use pll_driver::{BusConfig, DevPort, PllCodec, SmBus};

fn base() -> u16 {
    std::env::var("PLL_SMBUS_BASE")
        .ok()
        .and_then(|v| u16::from_str_radix(v.trim_start_matches("0x"), 16).ok())
        .unwrap_or(0x5000)
}

#[test]
#[ignore] // Requires hardware
fn test_scan_finds_pll() {
    let port = DevPort::open().expect("open /dev/port");
    let mut bus = SmBus::new(port, BusConfig::new(base()));
    let found = bus.scan().expect("scan");
    println!("SMBus slaves: {found:02x?}");
    assert!(found.contains(&0x69), "no clock generator at 0x69");
}

#[test]
#[ignore] // Requires hardware
fn test_read_current_fsb() {
    let name = std::env::var("PLL_CHIP").unwrap_or_else(|_| "ICS94211".into());
    let chip = pll_chip::lookup(&name).expect("known chip");
    let port = DevPort::open().expect("open /dev/port");
    let mut codec = PllCodec::new(SmBus::new(port, BusConfig::new(base())));

    let image = codec.read_image(chip).expect("block read");
    println!("{}: {image}", chip.name);
    match chip.decode(image.as_bytes()) {
        Some(entry) => println!("  FSB {entry} MHz (divider {})", entry.pci_divider),
        None => println!("  FSB unknown"),
    }
}
