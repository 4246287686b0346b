//! Display modes and the mode catalog.
//!
//! The catalog is rebuilt from scratch on every enumeration: an optional boot (POST) mode first,
//! followed by the standard resolutions that fit the device.

use crate::{DisplayError, Result};

/// The only pixel depth this engine drives (B8G8R8X8).
pub const BITS_PER_PIXEL: u16 = 32;
pub const BYTES_PER_PIXEL: u32 = BITS_PER_PIXEL as u32 / 8;

pub const STANDARD_RESOLUTION_COUNT: usize = 37;

/// Upper bound on catalog entries: every standard resolution plus the boot mode.
pub const MAX_MODES: usize = STANDARD_RESOLUTION_COUNT + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u16,
    pub height: u16,
}

const fn res(width: u16, height: u16) -> Resolution {
    Resolution { width, height }
}

/// Standard resolutions offered in addition to the boot mode, in catalog order.
pub const STANDARD_RESOLUTIONS: [Resolution; STANDARD_RESOLUTION_COUNT] = [
    res(640, 480),
    res(800, 480),
    res(800, 600),
    res(832, 624),
    res(960, 640),
    res(1024, 600),
    res(1024, 768),
    res(1152, 864),
    res(1152, 870),
    res(1280, 720),
    res(1280, 760),
    res(1280, 768),
    res(1280, 800),
    res(1280, 960),
    res(1280, 1024),
    res(1360, 768),
    res(1366, 768),
    res(1400, 1050),
    res(1440, 900),
    res(1600, 900),
    res(1600, 1200),
    res(1680, 1050),
    res(1920, 1080),
    res(1920, 1200),
    res(1920, 1440),
    res(2000, 2000),
    res(2048, 1536),
    res(2048, 2048),
    res(2560, 1440),
    res(2560, 1600),
    res(2560, 2048),
    res(2800, 2100),
    res(3200, 2400),
    res(3840, 2160),
    res(4096, 2160),
    res(7680, 4320),
    res(8192, 4320),
];

/// Scanout description as exchanged with the host framework.
///
/// This is what firmware leaves behind at boot (the POST display) and what is handed back when
/// the driver releases display ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayInfo {
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub bits_per_pixel: u32,
    pub physical_base: u64,
    pub target_id: u32,
}

impl DisplayInfo {
    pub fn footprint(&self) -> u64 {
        u64::from(self.height) * u64::from(self.pitch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayMode {
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u16,
    pub pitch: u16,
    pub physical_base: u64,
    pub mode_index: u16,
}

impl DisplayMode {
    fn new(width: u16, height: u16, physical_base: u64, mode_index: u16) -> Option<Self> {
        let pitch = u32::from(width) * u32::from(BITS_PER_PIXEL) / 8;
        Some(Self {
            width,
            height,
            bits_per_pixel: BITS_PER_PIXEL,
            pitch: u16::try_from(pitch).ok()?,
            physical_base,
            mode_index,
        })
    }

    /// Bytes of framebuffer the mode scans out.
    pub fn footprint(&self) -> u64 {
        u64::from(self.height) * u64::from(self.pitch)
    }

    pub fn display_info(&self, target_id: u32) -> DisplayInfo {
        DisplayInfo {
            width: u32::from(self.width),
            height: u32::from(self.height),
            pitch: u32::from(self.pitch),
            bits_per_pixel: u32::from(self.bits_per_pixel),
            physical_base: self.physical_base,
            target_id,
        }
    }
}

/// Device facts that bound the catalog.
///
/// `None` maxima mean the device did not report a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeLimits {
    /// Usable video memory in bytes.
    pub video_memory: u64,
    /// Physical base of the linear framebuffer.
    pub framebuffer_base: u64,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub max_bits_per_pixel: Option<u32>,
}

impl ModeLimits {
    fn exceeds_device_maximum(&self, width: u16, height: u16) -> bool {
        let over = |value: u32, max: Option<u32>| max.is_some_and(|max| value > max);
        over(u32::from(width), self.max_width)
            || over(u32::from(height), self.max_height)
            || over(u32::from(BITS_PER_PIXEL), self.max_bits_per_pixel)
    }
}

fn required_memory(width: u16, height: u16) -> u64 {
    u64::from(width) * u64::from(height) * u64::from(BYTES_PER_PIXEL)
}

/// Ordered list of modes the adapter can be programmed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeCatalog {
    modes: Vec<DisplayMode>,
    has_boot_mode: bool,
}

impl ModeCatalog {
    /// Builds the catalog from the standard resolution table.
    pub fn enumerate(boot_mode: Option<&DisplayInfo>, limits: &ModeLimits) -> Result<Self> {
        Self::enumerate_from(&STANDARD_RESOLUTIONS, boot_mode, limits)
    }

    /// Builds the catalog from `table` instead of the standard resolutions.
    pub fn enumerate_from(
        table: &[Resolution],
        boot_mode: Option<&DisplayInfo>,
        limits: &ModeLimits,
    ) -> Result<Self> {
        let mut catalog = ModeCatalog {
            modes: Vec::with_capacity(MAX_MODES),
            has_boot_mode: false,
        };

        if let Some(boot) = boot_mode.filter(|boot| boot.width != 0) {
            catalog.admit_boot_mode(boot, limits);
        }

        for resolution in table {
            if catalog.modes.len() >= MAX_MODES {
                break;
            }
            let Resolution { width, height } = *resolution;

            if width % 8 != 0 || height % 8 != 0 {
                tracing::debug!("skipped standard resolution {width}x{height} (ratio)");
                continue;
            }

            let required = required_memory(width, height);
            if required == 0 || required > limits.video_memory {
                tracing::debug!("skipped standard resolution {width}x{height} (too big)");
                continue;
            }

            if limits.exceeds_device_maximum(width, height) {
                tracing::debug!("skipped standard resolution {width}x{height} (above device limit)");
                continue;
            }

            if catalog.duplicates_boot_mode(width, height) {
                continue;
            }

            let index = catalog.modes.len() as u16;
            let Some(mode) = DisplayMode::new(width, height, limits.framebuffer_base, index) else {
                tracing::debug!("skipped standard resolution {width}x{height} (pitch overflow)");
                continue;
            };
            tracing::trace!("adding standard resolution {width}x{height} as mode {index}");
            catalog.modes.push(mode);
        }

        tracing::debug!("added {} modes", catalog.modes.len());
        if catalog.modes.is_empty() {
            return Err(DisplayError::NoModesAvailable);
        }
        Ok(catalog)
    }

    fn admit_boot_mode(&mut self, boot: &DisplayInfo, limits: &ModeLimits) {
        if boot.bits_per_pixel != u32::from(BITS_PER_PIXEL) {
            tracing::info!(
                "ignoring boot mode {}x{} at {} bpp",
                boot.width,
                boot.height,
                boot.bits_per_pixel
            );
            return;
        }
        let (Ok(width), Ok(height)) = (u16::try_from(boot.width), u16::try_from(boot.height))
        else {
            tracing::warn!("boot mode {}x{} is out of range", boot.width, boot.height);
            return;
        };
        let required = required_memory(width, height);
        if required == 0 || required > limits.video_memory {
            tracing::warn!(
                "boot mode {width}x{height} does not fit in {} bytes of video memory",
                limits.video_memory
            );
            return;
        }
        let Some(mode) = DisplayMode::new(width, height, boot.physical_base, 0) else {
            return;
        };
        tracing::trace!("adding boot resolution {width}x{height} as mode 0");
        self.modes.push(mode);
        self.has_boot_mode = true;
    }

    fn duplicates_boot_mode(&self, width: u16, height: u16) -> bool {
        self.has_boot_mode
            && self.modes.first().is_some_and(|boot| {
                boot.width == width && boot.height == height && boot.bits_per_pixel == BITS_PER_PIXEL
            })
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Whether entry 0 came from the boot mode.
    pub fn has_boot_mode(&self) -> bool {
        self.has_boot_mode
    }

    pub fn get(&self, index: usize) -> Option<&DisplayMode> {
        self.modes.get(index)
    }

    pub fn modes(&self) -> &[DisplayMode] {
        &self.modes
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayMode> {
        self.modes.iter()
    }

    /// Index of the first mode matching the given resolution and depth.
    pub fn find_matching(&self, width: u32, height: u32, bits_per_pixel: u32) -> Option<usize> {
        self.modes.iter().position(|mode| {
            u32::from(mode.width) == width
                && u32::from(mode.height) == height
                && u32::from(mode.bits_per_pixel) == bits_per_pixel
        })
    }
}
