//! Display-only driver core for the Bochs/QEMU "Standard VGA" PCI adapter (`1234:1111`).
//!
//! The device is driven entirely through the Bochs VBE "DISPI" registers exposed in its MMIO BAR
//! and a linear framebuffer BAR; there is no acceleration. This crate covers:
//!
//! - DISPI register access and device bring-up ([`Dispi`], [`Adapter::start`])
//! - the mode catalog built from the boot display and a table of standard resolutions
//! - programming a mode ([`set_mode`])
//! - software presentation of dirty and moved rectangles with 0/90/180/270 degree rotation and
//!   centering ([`blt_rect`], [`SourceState::present`])
//! - lazy screen blanking ([`SourceState::blank`])
//!
//! Host facilities (register window, framebuffer mapping) are abstracted behind [`MmioWindow`]
//! and [`FrameBufferMapper`] so the engine runs unchanged against real hardware or a test fake.

#![forbid(unsafe_code)]

mod adapter;
mod blank;
mod blit;
mod caps;
mod child;
mod config;
mod device;
mod dispi;
mod error;
mod framebuffer;
mod mode;
mod modeset;
mod present;
mod source;

pub use adapter::{
    Adapter, DevicePowerState, PowerTarget, SourceModeRequest, SourceSelector, MAX_CHILDREN,
    MAX_SOURCES,
};
pub use blank::PhysRange;
pub use blit::{blt_rect, Point, Rect, Rotation, Surface, SurfaceLayout, SurfaceMut};
pub use caps::{DriverCaps, VidPnHwCapabilities, DRIVER_CAPS, VIDPN_HW_CAPABILITIES};
pub use child::{ChildDescriptor, ChildStatusQuery, OutputTechnology};
pub use config::{DisplayConfig, HardwareInfo};
pub use device::{
    DeviceInfo, DeviceLimits, MemoryResource, PciIdentity, FRAMEBUFFER_RESOURCE, MMIO_RESOURCE,
    PCI_CLASS_DISPLAY, PCI_SUBCLASS_OTHER, PCI_SUBCLASS_VGA, STDVGA_PCI_DEVICE_ID,
    STDVGA_PCI_VENDOR_ID,
};
pub use dispi::{
    Dispi, DispiIndex, MmioWindow, DISPI_MMIO_OFFSET, VBE_DISPI_DISABLED, VBE_DISPI_ENABLED,
    VBE_DISPI_ID5, VBE_DISPI_LFB_ENABLED, VIDEO_MEMORY_UNIT,
};
pub use error::{ConfigurationError, DisplayError, Result};
pub use framebuffer::{FrameBufferMapper, FrameBufferMemory, HostMapper, VecFrameBuffer};
pub use mode::{
    DisplayInfo, DisplayMode, ModeCatalog, ModeLimits, Resolution, BITS_PER_PIXEL,
    BYTES_PER_PIXEL, MAX_MODES, STANDARD_RESOLUTIONS, STANDARD_RESOLUTION_COUNT,
};
pub use modeset::set_mode;
pub use present::{MoveRect, PresentRequest, MAX_BYTES_PER_PIXEL, MIN_BYTES_PER_PIXEL};
pub use source::{Scaling, SourceFlags, SourceState};
pub use stdvga_edid::PciLocation;
