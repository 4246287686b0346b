//! Shared fakes for `stdvga-display` integration tests.

#![allow(dead_code)]

use stdvga_display::{
    Adapter, DeviceInfo, DisplayConfig, DisplayError, DisplayInfo, DispiIndex, FrameBufferMapper,
    FrameBufferMemory, MemoryResource, MmioWindow, Result, DISPI_MMIO_OFFSET, VBE_DISPI_ID5,
};

pub const FB_BASE: u64 = 0xE000_0000;
pub const FB_LEN: u64 = 16 * 1024 * 1024;
pub const MMIO_BASE: u64 = 0xFEBF_0000;
pub const MMIO_LEN: u64 = 0x1000;

/// DISPI register file of a QEMU `-device VGA`, with a log of every register write.
#[derive(Debug, Clone)]
pub struct FakeStdVga {
    pub regs: [u16; 11],
    pub writes: Vec<(DispiIndex, u16)>,
    pub stray_accesses: usize,
}

impl FakeStdVga {
    pub fn new(video_memory_64k: u16) -> Self {
        let mut regs = [0; 11];
        regs[DispiIndex::Id as usize] = VBE_DISPI_ID5;
        regs[DispiIndex::VideoMemory64K as usize] = video_memory_64k;
        Self {
            regs,
            writes: Vec::new(),
            stray_accesses: 0,
        }
    }

    pub fn with_id(mut self, id: u16) -> Self {
        self.regs[DispiIndex::Id as usize] = id;
        self
    }

    pub fn reg(&self, index: DispiIndex) -> u16 {
        self.regs[index as usize]
    }

    fn index(&mut self, offset: u64) -> Option<DispiIndex> {
        let index = offset
            .checked_sub(DISPI_MMIO_OFFSET)
            .filter(|rel| rel % 2 == 0)
            .and_then(|rel| u16::try_from(rel / 2).ok())
            .and_then(DispiIndex::from_raw);
        if index.is_none() {
            self.stray_accesses += 1;
        }
        index
    }
}

impl MmioWindow for FakeStdVga {
    fn read_u16(&mut self, offset: u64) -> u16 {
        match self.index(offset) {
            Some(index) => self.regs[index as usize],
            None => 0xFFFF,
        }
    }

    fn write_u16(&mut self, offset: u64, value: u16) {
        if let Some(index) = self.index(offset) {
            // ID and memory size are read-only on real hardware.
            if !matches!(index, DispiIndex::Id | DispiIndex::VideoMemory64K) {
                self.regs[index as usize] = value;
            }
            self.writes.push((index, value));
        }
    }
}

/// Host-memory framebuffer that counts how often it was opened for writing.
#[derive(Debug)]
pub struct CountingFrameBuffer {
    pub physical_base: u64,
    pub bytes: Vec<u8>,
    pub write_borrows: usize,
}

impl FrameBufferMemory for CountingFrameBuffer {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.write_borrows += 1;
        &mut self.bytes
    }
}

#[derive(Debug, Default)]
pub struct CountingMapper {
    pub maps: usize,
    pub unmaps: usize,
    /// Fill byte of new mappings, so tests can tell zeroed bytes from untouched ones.
    pub fill: u8,
    pub fail_next: bool,
}

impl FrameBufferMapper for CountingMapper {
    type Mapping = CountingFrameBuffer;

    fn map_frame_buffer(&mut self, physical_base: u64, len: usize) -> Result<CountingFrameBuffer> {
        if std::mem::take(&mut self.fail_next) {
            return Err(DisplayError::InsufficientResources(format!(
                "cannot map {len:#x} bytes at {physical_base:#x}"
            )));
        }
        self.maps += 1;
        Ok(CountingFrameBuffer {
            physical_base,
            bytes: vec![self.fill; len],
            write_borrows: 0,
        })
    }

    fn unmap_frame_buffer(&mut self, _mapping: CountingFrameBuffer) {
        self.unmaps += 1;
    }
}

pub type TestAdapter = Adapter<FakeStdVga, CountingMapper>;

pub fn stdvga_device() -> DeviceInfo {
    DeviceInfo::stdvga(
        MemoryResource {
            start: FB_BASE,
            len: FB_LEN,
        },
        MemoryResource {
            start: MMIO_BASE,
            len: MMIO_LEN,
        },
    )
}

/// 1024x768x32 left behind by the firmware at the start of the framebuffer.
pub fn boot_mode() -> DisplayInfo {
    DisplayInfo {
        width: 1024,
        height: 768,
        pitch: 4096,
        bits_per_pixel: 32,
        physical_base: FB_BASE,
        target_id: 0,
    }
}

pub fn start_with(
    registers: FakeStdVga,
    boot: Option<DisplayInfo>,
    fill: u8,
) -> Result<TestAdapter> {
    Adapter::start(
        stdvga_device(),
        boot,
        registers,
        CountingMapper {
            fill,
            ..CountingMapper::default()
        },
        DisplayConfig::default(),
    )
}

/// A started adapter with 16 MiB of video memory and the 1024x768 boot mode.
pub fn started_adapter() -> TestAdapter {
    start_with(FakeStdVga::new(256), Some(boot_mode()), 0xAA).expect("adapter starts")
}

/// Pixel `(x, y)` of a `width`-wide 32bpp surface as `[b, g, r, a]`, unique per coordinate.
pub fn pattern_pixel(x: u32, y: u32) -> [u8; 4] {
    let v = (y << 16) | x;
    [v as u8, (v >> 8) as u8, (v >> 16) as u8, 0xFF]
}

pub fn pattern_surface(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            bytes.extend_from_slice(&pattern_pixel(x, y));
        }
    }
    bytes
}
