use std::ops::RangeInclusive;

use crate::dispi::{DISPI_MMIO_OFFSET, VBE_DISPI_ID5};

/// Strings the driver publishes as the adapter's hardware information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareInfo {
    pub chip_type: String,
    pub dac_type: String,
    pub adapter_string: String,
    pub bios_string: String,
    /// Dedicated video memory reported to the OS; the display-only driver claims none.
    pub memory_size: u32,
}

impl Default for HardwareInfo {
    fn default() -> Self {
        Self {
            chip_type: "QEMU/Bochs Standard VGA".to_string(),
            dac_type: "QEMU/Bochs Standard VGA".to_string(),
            adapter_string: "XCP-ng Standard VGA Display Adapter".to_string(),
            bios_string: "QEMU/Bochs Standard VGA".to_string(),
            memory_size: 0,
        }
    }
}

/// Tunables for [`crate::Adapter`].
///
/// The defaults describe QEMU's `-device VGA`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Offset of the DISPI register block in the MMIO BAR.
    pub dispi_mmio_offset: u64,
    /// Smallest acceptable MMIO BAR.
    pub min_mmio_len: u64,
    /// DISPI ID register values the engine can drive.
    ///
    /// Mode negotiation needs `VIDEO_MEMORY_64K`, which only ID5 provides.
    pub supported_dispi_ids: RangeInclusive<u16>,
    pub hardware_info: HardwareInfo,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            dispi_mmio_offset: DISPI_MMIO_OFFSET,
            min_mmio_len: 0x1000,
            supported_dispi_ids: VBE_DISPI_ID5..=VBE_DISPI_ID5,
            hardware_info: HardwareInfo::default(),
        }
    }
}
