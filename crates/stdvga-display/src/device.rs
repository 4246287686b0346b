//! What the host framework tells us about the PCI function at start time.

use stdvga_edid::PciLocation;

use crate::error::ConfigurationError;

// -----------------------------------------------------------------------------
// Bochs/QEMU "Standard VGA" PCI identity.
// -----------------------------------------------------------------------------

pub const STDVGA_PCI_VENDOR_ID: u16 = 0x1234;
pub const STDVGA_PCI_DEVICE_ID: u16 = 0x1111;
/// PCI base class: display controller.
pub const PCI_CLASS_DISPLAY: u8 = 0x03;
/// PCI subclass: VGA-compatible controller (`-device VGA`).
pub const PCI_SUBCLASS_VGA: u8 = 0x00;
/// PCI subclass: other display controller (`-device secondary-vga`).
pub const PCI_SUBCLASS_OTHER: u8 = 0x80;

/// Memory resource index of the linear framebuffer (BAR0).
pub const FRAMEBUFFER_RESOURCE: usize = 0;
/// Memory resource index of the MMIO register BAR (BAR2).
pub const MMIO_RESOURCE: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PciIdentity {
    pub vendor_id: u16,
    pub device_id: u16,
    pub base_class: u8,
    pub sub_class: u8,
}

impl PciIdentity {
    pub const STDVGA: PciIdentity = PciIdentity {
        vendor_id: STDVGA_PCI_VENDOR_ID,
        device_id: STDVGA_PCI_DEVICE_ID,
        base_class: PCI_CLASS_DISPLAY,
        sub_class: PCI_SUBCLASS_VGA,
    };

    /// Accepts only the Standard VGA function, as primary or secondary display controller.
    pub fn check(&self) -> Result<(), ConfigurationError> {
        if self.vendor_id != STDVGA_PCI_VENDOR_ID || self.device_id != STDVGA_PCI_DEVICE_ID {
            return Err(ConfigurationError::IdentityMismatch {
                vendor_id: self.vendor_id,
                device_id: self.device_id,
            });
        }
        match (self.base_class, self.sub_class) {
            (PCI_CLASS_DISPLAY, PCI_SUBCLASS_VGA | PCI_SUBCLASS_OTHER) => Ok(()),
            (base_class, sub_class) => Err(ConfigurationError::ClassMismatch {
                base_class,
                sub_class,
            }),
        }
    }
}

/// A translated memory resource (decoded BAR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemoryResource {
    pub start: u64,
    pub len: u64,
}

/// Optional maxima reported by the host; `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceLimits {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub max_bits_per_pixel: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub identity: PciIdentity,
    pub location: Option<PciLocation>,
    /// Memory resources in the order the bus reported them.
    pub memory_resources: Vec<MemoryResource>,
    pub limits: DeviceLimits,
}

impl DeviceInfo {
    /// A Standard VGA function with the usual QEMU BAR layout.
    pub fn stdvga(framebuffer: MemoryResource, mmio: MemoryResource) -> Self {
        Self {
            identity: PciIdentity::STDVGA,
            location: None,
            memory_resources: vec![framebuffer, mmio],
            limits: DeviceLimits::default(),
        }
    }

    /// The `index`-th non-empty memory resource.
    pub fn memory_resource(&self, index: usize) -> Result<MemoryResource, ConfigurationError> {
        self.memory_resources
            .get(index)
            .copied()
            .filter(|r| r.len != 0)
            .ok_or(ConfigurationError::MissingMemoryResource { index })
    }
}
