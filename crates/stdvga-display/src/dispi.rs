//! Bochs VBE "DISPI" register access through the Standard VGA MMIO BAR.
//!
//! QEMU's `-device VGA` exposes the DISPI register file in BAR2 at offset `0x500`, one 16-bit
//! register per index (`0x500 + index * 2`), so no index/data port dance is needed.

/// Byte offset of the DISPI register block inside the MMIO BAR.
pub const DISPI_MMIO_OFFSET: u64 = 0x500;

/// DISPI interface version 5; the first to report `VIDEO_MEMORY_64K`.
pub const VBE_DISPI_ID5: u16 = 0xB0C5;

pub const VBE_DISPI_DISABLED: u16 = 0x00;
pub const VBE_DISPI_ENABLED: u16 = 0x01;
pub const VBE_DISPI_LFB_ENABLED: u16 = 0x40;

/// Granularity of the `VIDEO_MEMORY_64K` register.
pub const VIDEO_MEMORY_UNIT: u64 = 64 * 1024;

/// DISPI register indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum DispiIndex {
    Id = 0x0,
    Xres = 0x1,
    Yres = 0x2,
    Bpp = 0x3,
    Enable = 0x4,
    Bank = 0x5,
    VirtWidth = 0x6,
    VirtHeight = 0x7,
    XOffset = 0x8,
    YOffset = 0x9,
    VideoMemory64K = 0xA,
}

impl DispiIndex {
    pub const ALL: [DispiIndex; 11] = [
        DispiIndex::Id,
        DispiIndex::Xres,
        DispiIndex::Yres,
        DispiIndex::Bpp,
        DispiIndex::Enable,
        DispiIndex::Bank,
        DispiIndex::VirtWidth,
        DispiIndex::VirtHeight,
        DispiIndex::XOffset,
        DispiIndex::YOffset,
        DispiIndex::VideoMemory64K,
    ];

    pub fn from_raw(index: u16) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }
}

/// A mapped MMIO window (to be provided by the host I/O layer).
///
/// Accesses are uncached, fire-and-forget stores and side-effecting loads; offsets are relative to
/// the start of the window.
pub trait MmioWindow {
    fn read_u16(&mut self, offset: u64) -> u16;
    fn write_u16(&mut self, offset: u64, value: u16);
}

impl<W: MmioWindow + ?Sized> MmioWindow for &mut W {
    fn read_u16(&mut self, offset: u64) -> u16 {
        (**self).read_u16(offset)
    }

    fn write_u16(&mut self, offset: u64, value: u16) {
        (**self).write_u16(offset, value)
    }
}

impl<W: MmioWindow + ?Sized> MmioWindow for Box<W> {
    fn read_u16(&mut self, offset: u64) -> u16 {
        (**self).read_u16(offset)
    }

    fn write_u16(&mut self, offset: u64, value: u16) {
        (**self).write_u16(offset, value)
    }
}

/// DISPI register file on top of an [`MmioWindow`].
#[derive(Debug)]
pub struct Dispi<W> {
    window: W,
    base: u64,
}

impl<W: MmioWindow> Dispi<W> {
    pub fn new(window: W) -> Self {
        Self::with_base(window, DISPI_MMIO_OFFSET)
    }

    pub fn with_base(window: W, base: u64) -> Self {
        Self { window, base }
    }

    fn offset(&self, index: DispiIndex) -> u64 {
        self.base + u64::from(index as u16) * 2
    }

    pub fn read(&mut self, index: DispiIndex) -> u16 {
        let offset = self.offset(index);
        self.window.read_u16(offset)
    }

    pub fn write(&mut self, index: DispiIndex, value: u16) {
        let offset = self.offset(index);
        self.window.write_u16(offset, value);
    }

    pub fn id(&mut self) -> u16 {
        self.read(DispiIndex::Id)
    }

    /// Video memory reported by the device, in bytes.
    pub fn video_memory_bytes(&mut self) -> u64 {
        u64::from(self.read(DispiIndex::VideoMemory64K)) * VIDEO_MEMORY_UNIT
    }

    pub fn window(&self) -> &W {
        &self.window
    }
}
