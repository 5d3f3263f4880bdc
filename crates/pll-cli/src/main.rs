//! `pllfsb`: front-side bus utility for SMBus clock generators.
//!
//! ```text
//! USAGE:
//!   pllfsb list                            List supported PLL chips
//!   pllfsb show <chip>                     Register layout and frequency table
//!   pllfsb get <chip>                      Current FSB and safe alternatives
//!   pllfsb set <chip> <fsb[/pci]> [-u]     Program a new FSB
//!   pllfsb probe <chip>                    Check the PLL answers on the bus
//!   pllfsb scan                            List responding SMBus slaves
//!
//! GLOBAL:
//!   --base <hex>        SMBus host I/O base (required on hardware)
//!   --simulate          Run against a simulated controller
//!   -d, --debug         Debug logging (RUST_LOG overrides)
//! ```
//!
//! Only rows sharing the current PCI divider are offered unless `--unsafe`
//! is given; other dividers push PCI/AGP/IDE clocks out of tolerance.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pll_chip::smbus::{BLOCK_MAX, PLL_SLAVE_ADDRESS};
use pll_chip::{ChipDescriptor, FrequencyEntry, FrequencyPlan, RegisterImage, CATALOG};
use pll_driver::{BusConfig, DevPort, PllCodec, PllError, PortIo, SimulatedBus, SmBus};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// I/O base used by `--simulate` when `--base` is not given.
const SIMULATED_BASE: u16 = 0x5000;

#[derive(Parser)]
#[command(name = "pllfsb", about = "FSB utility for SMBus PLL clock generators", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// SMBus host controller I/O base, hex (e.g. 0x5000).
    #[arg(long, global = true, value_parser = parse_hex_u16)]
    base: Option<u16>,

    /// PLL slave address, hex.
    #[arg(long, global = true, default_value = "0x69", value_parser = parse_hex_u8)]
    slave: u8,

    /// Milliseconds between status polls [default: 100, 0 with --simulate].
    #[arg(long, global = true)]
    poll_ms: Option<u64>,

    /// Status polls before a transaction times out.
    #[arg(long, global = true, default_value_t = BusConfig::DEFAULT_MAX_POLLS)]
    max_polls: u32,

    /// Port I/O device.
    #[arg(long, global = true, default_value = DevPort::DEFAULT_PATH)]
    port_device: PathBuf,

    /// Use a simulated SMBus controller instead of hardware.
    #[arg(long, global = true)]
    simulate: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Cmd {
    /// List supported PLL chips.
    List,
    /// Print a chip's register layout and frequency table.
    Show {
        /// PLL chip name (case-insensitive).
        chip: String,
    },
    /// Read the current FSB and list safe alternatives.
    Get {
        /// PLL chip name (case-insensitive).
        chip: String,
        /// List rows for every PCI divider.
        #[arg(short, long = "unsafe")]
        unsafe_mode: bool,
    },
    /// Program a new FSB.
    Set {
        /// PLL chip name (case-insensitive).
        chip: String,
        /// Target frequency, `fsb` or `fsb/pci` in MHz (e.g. 100.23/33.41).
        target: Target,
        /// Allow rows with a different PCI divider.
        #[arg(short, long = "unsafe")]
        unsafe_mode: bool,
        /// Build the new register image but do not write it.
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Check that the PLL acknowledges on the bus.
    Probe {
        /// PLL chip name (case-insensitive).
        chip: String,
    },
    /// List every SMBus slave that responds.
    Scan,
}

/// `fsb[/pci]` as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Target {
    fsb: f32,
    pci: Option<f32>,
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse = |v: &str| {
            v.trim()
                .parse::<f32>()
                .ok()
                .filter(|f| f.is_finite() && *f > 0.0)
                .ok_or_else(|| format!("invalid frequency '{v}'"))
        };
        match s.split_once('/') {
            Some((fsb, pci)) => Ok(Self {
                fsb: parse(fsb)?,
                pci: Some(parse(pci)?),
            }),
            None => Ok(Self {
                fsb: parse(s)?,
                pci: None,
            }),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pci {
            Some(pci) => write!(f, "{:.2}/{pci:.2}", self.fsb),
            None => write!(f, "{:.2}", self.fsb),
        }
    }
}

fn parse_hex_u16(s: &str) -> std::result::Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}

fn parse_hex_u8(s: &str) -> std::result::Result<u8, String> {
    let value = parse_hex_u16(s)?;
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 0x7F)
        .ok_or_else(|| format!("'{s}' is not a 7-bit slave address"))
}

type Codec = PllCodec<Box<dyn PortIo>>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    CATALOG
        .validate_all()
        .map_err(|(chip, reason)| PllError::invalid_descriptor(chip, reason))?;

    match &cli.command {
        Cmd::List => cmd_list(),
        Cmd::Show { chip } => cmd_show(find_chip(chip)?),
        Cmd::Get { chip, unsafe_mode } => cmd_get(&cli, find_chip(chip)?, *unsafe_mode)?,
        Cmd::Set {
            chip,
            target,
            unsafe_mode,
            dry_run,
        } => cmd_set(&cli, find_chip(chip)?, *target, *unsafe_mode, *dry_run)?,
        Cmd::Probe { chip } => cmd_probe(&cli, find_chip(chip)?)?,
        Cmd::Scan => cmd_scan(&cli)?,
    }

    Ok(())
}

fn find_chip(name: &str) -> Result<&'static ChipDescriptor> {
    pll_chip::lookup(name)
        .ok_or_else(|| PllError::unknown_chip(name))
        .with_context(|| {
            format!(
                "Supported PLL: {}",
                CATALOG.names().collect::<Vec<_>>().join(" ")
            )
        })
}

/// Open the port backend and wrap it in a codec.
///
/// A simulated controller gets `chip`'s template image attached at the PLL
/// address, so reads return something decodable.
fn open_codec(cli: &Cli, chip: Option<&ChipDescriptor>) -> Result<Codec> {
    let (io, base, poll_ms): (Box<dyn PortIo>, u16, u64) = if cli.simulate {
        let base = cli.base.unwrap_or(SIMULATED_BASE);
        let image = chip.map_or_else(
            || vec![0u8; BLOCK_MAX],
            |chip| chip.initial_register_image.to_vec(),
        );
        info!("Simulating SMBus controller at {base:#06x}");
        let sim = SimulatedBus::new(base).with_device(cli.slave, image);
        (Box::new(sim), base, cli.poll_ms.unwrap_or(0))
    } else {
        let base = cli
            .base
            .context("--base is required for hardware access (SMBus I/O BAR of the southbridge)")?;
        let port = DevPort::open_path(&cli.port_device)
            .context("Port I/O needs root; try --simulate for a dry run")?;
        (Box::new(port), base, cli.poll_ms.unwrap_or(100))
    };

    let config = BusConfig::new(base)
        .with_poll_interval(Duration::from_millis(poll_ms))
        .with_max_polls(cli.max_polls);
    debug!("{config:?}");
    Ok(PllCodec::new(SmBus::new(io, config)).with_slave_address(cli.slave))
}

fn cmd_list() {
    for chip in CATALOG.iter() {
        let mut caps = Vec::new();
        if chip.supports_read() {
            caps.push("read");
        }
        if chip.supports_probe() {
            caps.push("probe");
        }
        println!(
            "{:<14} {:>2} FSB  {}",
            chip.name,
            chip.frequency_table.len(),
            if caps.is_empty() {
                "write-only".to_string()
            } else {
                caps.join(" ")
            }
        );
    }
}

fn cmd_show(chip: &ChipDescriptor) {
    println!("PLL          : {}", chip.name);
    println!("Image length : {} bytes", chip.register_image_length);
    match chip.byte_count_field {
        Some(byte) => println!("Byte count   : byte {byte}"),
        None => println!("Byte count   : -"),
    }
    match chip.select_flag {
        Some(flag) => println!("Select flag  : {flag}"),
        None => println!("Select flag  : - (always select bits)"),
    }
    println!("Select bits  : {}", describe_bits(&chip.select_bits));
    println!(
        "Latch bits   : {}{}",
        describe_bits(&chip.latch_bits),
        if chip.latch_bits_inverted { " (inverted)" } else { "" }
    );
    println!("Readable     : {}", yes_no(chip.supports_read()));
    println!("Probe        : {}", yes_no(chip.supports_probe()));
    println!("Template     : {}", RegisterImage::seed(chip));
    println!();
    println!("   FSB      PCI    key     div");
    for entry in chip.list_supported() {
        println!(
            "{:>7.2}  {:>6.2}   {:06b}  {}",
            entry.fsb, entry.pci, entry.key, entry.pci_divider
        );
    }
}

fn describe_bits(bits: &pll_chip::descriptor::KeyBits) -> String {
    let parts: Vec<String> = bits
        .iter()
        .enumerate()
        .filter_map(|(i, loc)| loc.map(|loc| format!("FS{i}={}.{}", loc.byte, loc.bit)))
        .collect();
    if parts.is_empty() {
        "-".into()
    } else {
        parts.join(" ")
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn print_supported(chip: &ChipDescriptor, plan: &FrequencyPlan<'_>) {
    match plan.divider() {
        Some(div) => println!("Supported FSB for {} (PCI divider {div}):", chip.name),
        None => println!("Supported FSB for {} (all PCI dividers):", chip.name),
    }
    for entry in plan.supported() {
        println!("  {entry}");
    }
}

/// Check the PLL is there before touching it, when the chip allows probing.
fn require_present(codec: &mut Codec, chip: &ChipDescriptor) -> Result<()> {
    if !chip.supports_probe() {
        debug!("{} does not support probing, skipping", chip.name);
        return Ok(());
    }
    if !codec.probe_chip(chip)? {
        bail!(
            "Cannot contact PLL {} at SMBus address {:#04x}",
            chip.name,
            codec.slave_address()
        );
    }
    Ok(())
}

fn cmd_get(cli: &Cli, chip: &'static ChipDescriptor, unsafe_mode: bool) -> Result<()> {
    let mut codec = open_codec(cli, Some(chip))?;
    require_present(&mut codec, chip)?;

    let current = match codec.get_frequency(chip) {
        Ok(current) => current,
        Err(PllError::ReadUnsupported { .. }) => {
            println!("FSB unknown: {} does not support reading", chip.name);
            print_supported(chip, &FrequencyPlan::new(chip, None, true));
            return Ok(());
        }
        Err(e) => return Err(e).context(format!("Reading FSB from {}", chip.name)),
    };

    match &current {
        Some(entry) => println!("FSB currently at {entry} MHz"),
        None => println!("FSB unknown: key read from {} has no table entry", chip.name),
    }
    print_supported(chip, &FrequencyPlan::new(chip, current.as_ref(), unsafe_mode));
    Ok(())
}

fn cmd_set(
    cli: &Cli,
    chip: &'static ChipDescriptor,
    target: Target,
    unsafe_mode: bool,
    dry_run: bool,
) -> Result<()> {
    if unsafe_mode {
        println!("UNSAFE MODE ENABLED!");
    }
    let mut codec = open_codec(cli, Some(chip))?;
    require_present(&mut codec, chip)?;

    let (mut image, current) = if chip.supports_read() {
        let image = codec
            .read_image(chip)
            .with_context(|| format!("Reading FSB from {}", chip.name))?;
        let current = pll_driver::codec::decode(chip, &image);
        (image, current)
    } else {
        debug!("{} does not support reading, starting from template", chip.name);
        (RegisterImage::seed(chip), None)
    };
    if let Some(entry) = &current {
        println!("FSB currently at {entry} MHz");
    }

    let plan = FrequencyPlan::new(chip, current.as_ref(), unsafe_mode);
    let Some(entry) = plan.resolve(target.fsb, target.pci) else {
        print_supported(chip, &plan);
        bail!("Requested FSB {target} is not supported by {}", chip.name);
    };
    if is_current(current.as_ref(), target) {
        bail!("Requested FSB {target} is the current FSB");
    }

    let written = codec
        .apply_frequency(chip, &mut image, entry.fsb, Some(entry.pci), dry_run)
        .with_context(|| format!("Setting FSB {entry} on {}", chip.name))?;

    if dry_run {
        println!("Dry run: FSB {written} MHz not written");
        println!("Image: {image}");
    } else {
        println!("FSB set to {written} MHz");
    }
    Ok(())
}

fn is_current(current: Option<&FrequencyEntry>, target: Target) -> bool {
    current.is_some_and(|entry| entry.matches(target.fsb, target.pci))
}

fn cmd_probe(cli: &Cli, chip: &'static ChipDescriptor) -> Result<()> {
    let mut codec = open_codec(cli, Some(chip))?;
    match codec.probe_chip(chip) {
        Ok(true) => println!("{} found at {:#04x}", chip.name, codec.slave_address()),
        Ok(false) => bail!("No response at {:#04x}", codec.slave_address()),
        Err(PllError::ProbeUnsupported { .. }) => {
            println!("{} does not support probing", chip.name);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn cmd_scan(cli: &Cli) -> Result<()> {
    let mut codec = open_codec(cli, None)?;
    let found = codec.bus_mut().scan()?;
    if found.is_empty() {
        println!("No SMBus slaves found");
    }
    for slave in found {
        let note = if slave == PLL_SLAVE_ADDRESS {
            "  (clock generator)"
        } else {
            ""
        };
        println!("{slave:#04x}{note}");
    }
    Ok(())
}
