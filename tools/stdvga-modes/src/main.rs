#![forbid(unsafe_code)]

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use stdvga_display::{
    Adapter, DeviceInfo, DeviceLimits, DispiIndex, DisplayConfig, DisplayInfo, HostMapper,
    MemoryResource, MmioWindow, DISPI_MMIO_OFFSET, VBE_DISPI_ID5,
};
use stdvga_edid::{serial_number, PciLocation, EDID_BLOCK_SIZE};
use tracing_subscriber::EnvFilter;

const FB_BASE: u64 = 0xE000_0000;
const MMIO_BASE: u64 = 0xFEBF_0000;
const MMIO_LEN: u64 = 0x1000;
const MIB: u64 = 1024 * 1024;

#[derive(Parser, Debug)]
#[command(
    name = "stdvga-modes",
    about = "Inspect the mode catalog, DISPI programming and EDID of a simulated Bochs/QEMU Standard VGA adapter."
)]
struct Args {
    /// Video memory reported through DISPI, in MiB (QEMU's `vgamem_mb`)
    #[arg(long, value_name = "MIB", default_value_t = 16)]
    vram_mib: u16,

    /// Size of the framebuffer BAR in MiB (defaults to --vram-mib)
    #[arg(long, value_name = "MIB")]
    fb_bar_mib: Option<u64>,

    /// Display left behind by the firmware, e.g. 1024x768
    #[arg(long, value_name = "WxH", value_parser = parse_resolution)]
    boot: Option<(u32, u32)>,

    /// Largest width the host allows
    #[arg(long, value_name = "PIXELS")]
    max_width: Option<u32>,

    /// Largest height the host allows
    #[arg(long, value_name = "PIXELS")]
    max_height: Option<u32>,

    /// PCI location of the adapter, e.g. 00:02.0
    #[arg(long, value_name = "BUS:DEV.FN", value_parser = parse_pci_location)]
    pci: Option<PciLocation>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the mode catalog
    Modes,
    /// Program a catalog entry and print the DISPI register writes
    SetMode {
        /// Catalog index
        index: usize,
    },
    /// Hex-dump the EDID served for a child output
    Edid {
        #[arg(long, default_value_t = 0)]
        target: u32,
    },
}

fn parse_resolution(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width = w.parse().map_err(|_| format!("invalid width {w:?}"))?;
    let height = h.parse().map_err(|_| format!("invalid height {h:?}"))?;
    Ok((width, height))
}

fn parse_pci_location(s: &str) -> Result<PciLocation, String> {
    let invalid = || format!("expected BUS:DEV.FN in hex, got {s:?}");
    let (bus, rest) = s.split_once(':').ok_or_else(invalid)?;
    let (device, function) = rest.split_once('.').ok_or_else(invalid)?;
    Ok(PciLocation {
        bus: u8::from_str_radix(bus, 16).map_err(|_| invalid())?,
        device: u8::from_str_radix(device, 16).map_err(|_| invalid())?,
        function: u8::from_str_radix(function, 16).map_err(|_| invalid())?,
    })
}

/// DISPI register file of an idle QEMU `-device VGA`.
#[derive(Debug)]
struct SimulatedDispi {
    regs: [u16; 11],
    writes: Vec<(DispiIndex, u16)>,
}

impl SimulatedDispi {
    fn new(video_memory_64k: u16) -> Self {
        let mut regs = [0; 11];
        regs[DispiIndex::Id as usize] = VBE_DISPI_ID5;
        regs[DispiIndex::VideoMemory64K as usize] = video_memory_64k;
        Self {
            regs,
            writes: Vec::new(),
        }
    }
}

fn dispi_index(offset: u64) -> Option<DispiIndex> {
    offset
        .checked_sub(DISPI_MMIO_OFFSET)
        .filter(|rel| rel % 2 == 0)
        .and_then(|rel| u16::try_from(rel / 2).ok())
        .and_then(DispiIndex::from_raw)
}

impl MmioWindow for SimulatedDispi {
    fn read_u16(&mut self, offset: u64) -> u16 {
        match dispi_index(offset) {
            Some(index) => self.regs[index as usize],
            None => {
                tracing::warn!("read of {offset:#x} outside the DISPI block");
                0xFFFF
            }
        }
    }

    fn write_u16(&mut self, offset: u64, value: u16) {
        let Some(index) = dispi_index(offset) else {
            tracing::warn!("write of {value:#06x} to {offset:#x} outside the DISPI block");
            return;
        };
        if !matches!(index, DispiIndex::Id | DispiIndex::VideoMemory64K) {
            self.regs[index as usize] = value;
        }
        self.writes.push((index, value));
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> anyhow::Result<()> {
    let Some(video_memory_64k) = args.vram_mib.checked_mul(16) else {
        bail!("--vram-mib {} does not fit the VIDEO_MEMORY_64K register", args.vram_mib);
    };
    let fb_len = args
        .fb_bar_mib
        .unwrap_or(u64::from(args.vram_mib))
        .checked_mul(MIB)
        .context("--fb-bar-mib is too large")?;

    let mut device = DeviceInfo::stdvga(
        MemoryResource {
            start: FB_BASE,
            len: fb_len,
        },
        MemoryResource {
            start: MMIO_BASE,
            len: MMIO_LEN,
        },
    );
    device.location = args.pci;
    device.limits = DeviceLimits {
        max_width: args.max_width,
        max_height: args.max_height,
        max_bits_per_pixel: None,
    };
    let boot = args.boot.map(|(width, height)| DisplayInfo {
        width,
        height,
        pitch: width * 4,
        bits_per_pixel: 32,
        physical_base: FB_BASE,
        target_id: 0,
    });

    let mut adapter = Adapter::start(
        device,
        boot,
        SimulatedDispi::new(video_memory_64k),
        HostMapper::default(),
        DisplayConfig::default(),
    )
    .context("start simulated adapter")?;

    match args.command {
        Command::Modes => {
            println!("video memory: {} KiB", adapter.video_memory() / 1024);
            let catalog = adapter.catalog();
            for (index, mode) in catalog.iter().enumerate() {
                let tag = if index == 0 && catalog.has_boot_mode() {
                    "  (boot)"
                } else {
                    ""
                };
                println!(
                    "{index:>3}  {:>4}x{:<4}  {}bpp  pitch {:>5}  {:>9} bytes{tag}",
                    mode.width,
                    mode.height,
                    mode.bits_per_pixel,
                    mode.pitch,
                    mode.footprint()
                );
            }
        }
        Command::SetMode { index } => {
            adapter
                .set_mode(index)
                .with_context(|| format!("set mode {index}"))?;
            for (register, value) in &adapter.registers().writes {
                println!("{:<16} <- {value:#06x}", format!("{register:?}"));
            }
        }
        Command::Edid { target } => {
            let mut block = [0u8; EDID_BLOCK_SIZE];
            adapter
                .query_device_descriptor(target, 0, &mut block)
                .with_context(|| format!("EDID for target {target}"))?;
            println!("serial {:#010x}", serial_number(args.pci, target));
            for (row, chunk) in block.chunks(16).enumerate() {
                let bytes: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
                println!("{:02x}: {}", row * 16, bytes.join(" "));
            }
        }
    }
    Ok(())
}
