//! Transaction layer behaviour against the simulated controller
//!
//! Fault classification, status clearing and block-length clamping.

use pll_chip::smbus::{status, BLOCK_MAX, PLL_SLAVE_ADDRESS};
use pll_driver::{BusConfig, BusFault, PllError, SimulatedBus, SmBus};
use std::time::Duration;

const BASE: u16 = 0x5000;
const SLAVE: u8 = PLL_SLAVE_ADDRESS;

fn bus(sim: SimulatedBus) -> SmBus<SimulatedBus> {
    SmBus::new(
        sim,
        BusConfig::new(BASE)
            .with_poll_interval(Duration::ZERO)
            .with_max_polls(3),
    )
}

fn fault(result: pll_driver::Result<()>) -> Option<BusFault> {
    result.err().as_ref().and_then(PllError::bus_fault)
}

#[test]
fn collision_outranks_no_response() {
    let mut bus = bus(SimulatedBus::new(BASE).with_device(SLAVE, vec![0u8; 4]));
    bus.io_mut().inject_fault(status::DEV_ERR | status::BUS_ERR);
    assert_eq!(
        fault(bus.write_quick(SLAVE)),
        Some(BusFault::Collision { status: 0x0C })
    );
}

#[test]
fn failure_outranks_collision() {
    let mut bus = bus(SimulatedBus::new(BASE).with_device(SLAVE, vec![0u8; 4]));
    bus.io_mut()
        .inject_fault(status::FAILED | status::BUS_ERR | status::DEV_ERR);
    assert_eq!(
        fault(bus.write_quick(SLAVE)),
        Some(BusFault::TransactionFailed { status: 0x1C })
    );
}

#[test]
fn stuck_busy_times_out_then_reset_fails() {
    let mut bus = bus(
        SimulatedBus::new(BASE)
            .with_device(SLAVE, vec![0u8; 4])
            .stuck_busy(),
    );
    assert_eq!(
        fault(bus.write_quick(SLAVE)),
        Some(BusFault::Timeout {
            status: status::HOST_BUSY
        })
    );

    // The host never went idle, so the next transaction cannot start
    assert_eq!(
        fault(bus.write_quick(SLAVE)),
        Some(BusFault::ResetFailed {
            status: status::HOST_BUSY
        })
    );
    assert_eq!(bus.io().transactions().len(), 1);
}

#[test]
fn stale_status_that_will_not_clear_blocks_start() {
    let mut bus = bus(
        SimulatedBus::new(BASE)
            .with_device(SLAVE, vec![0u8; 4])
            .with_stuck_status(status::FAILED),
    );
    assert_eq!(
        fault(bus.write_quick(SLAVE)),
        Some(BusFault::ResetFailed {
            status: status::FAILED
        })
    );
    assert!(bus.io().transactions().is_empty());
}

#[test]
fn busy_within_poll_cap_succeeds() {
    let mut bus = bus(
        SimulatedBus::new(BASE)
            .with_device(SLAVE, vec![0u8; 4])
            .with_busy_polls(2),
    );
    bus.write_quick(SLAVE).unwrap();
}

#[test]
fn busy_past_poll_cap_times_out() {
    let mut bus = bus(
        SimulatedBus::new(BASE)
            .with_device(SLAVE, vec![0u8; 4])
            .with_busy_polls(3),
    );
    assert!(matches!(
        fault(bus.write_quick(SLAVE)),
        Some(BusFault::Timeout { .. })
    ));
}

#[test]
fn fault_is_cleared_before_returning() {
    let mut bus = bus(SimulatedBus::new(BASE).with_device(SLAVE, vec![0u8; 4]));
    bus.io_mut().inject_fault(status::DEV_ERR);
    assert!(bus.write_quick(SLAVE).is_err());
    bus.write_quick(SLAVE).unwrap();
    assert_eq!(bus.io().transactions().len(), 2);
}

#[test]
fn declared_length_is_clamped_to_block_max() {
    let mut bus = bus(
        SimulatedBus::new(BASE)
            .with_device(SLAVE, (0u8..40).collect::<Vec<_>>())
            .declare_block_length(40),
    );
    let mut buf = [0u8; 64];
    let read = bus.read_block_data(SLAVE, 0, &mut buf).unwrap();
    assert_eq!(read, BLOCK_MAX);
    assert_eq!(bus.io().block_reads(), BLOCK_MAX);
    assert_eq!(buf[31], 31);
    assert_eq!(buf[32], 0);
}

#[test]
fn declared_length_replaces_requested_length() {
    let mut bus = bus(
        SimulatedBus::new(BASE)
            .with_device(SLAVE, vec![0xAB; 21])
            .declare_block_length(5),
    );
    let mut buf = [0u8; 21];
    let read = bus.read_block_data(SLAVE, 0, &mut buf).unwrap();
    assert_eq!(read, 5);
    assert_eq!(bus.io().block_reads(), 5);
    assert_eq!(&buf[..6], &[0xAB, 0xAB, 0xAB, 0xAB, 0xAB, 0x00]);
}

#[test]
fn block_drain_continues_past_small_buffer() {
    let mut bus = bus(SimulatedBus::new(BASE).with_device(SLAVE, vec![0x11; 8]));
    let mut buf = [0u8; 3];
    let read = bus.read_block_data(SLAVE, 0, &mut buf).unwrap();
    assert_eq!(read, 3);
    assert_eq!(bus.io().block_reads(), 8);
}

#[test]
fn register_dump_does_not_disturb_block_transfers() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();

    let mut bus = bus(SimulatedBus::new(BASE).with_device(SLAVE, vec![0u8; 6]));
    bus.write_block_data(SLAVE, 0, &[1, 2, 3, 4, 5, 6]).unwrap();
    let mut buf = [0u8; 6];
    assert_eq!(bus.read_block_data(SLAVE, 0, &mut buf).unwrap(), 6);
    assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
}
