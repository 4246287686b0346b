//! Static capabilities reported to the display framework.

/// Which VidPN transforms the driver performs itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VidPnHwCapabilities {
    pub driver_rotation: bool,
    pub driver_scaling: bool,
    pub driver_cloning: bool,
    pub driver_color_convert: bool,
    pub driver_linked_adapter_output: bool,
    pub driver_remote_display: bool,
}

/// Rotation and colour conversion happen in software; nothing else is offered.
pub const VIDPN_HW_CAPABILITIES: VidPnHwCapabilities = VidPnHwCapabilities {
    driver_rotation: true,
    driver_scaling: false,
    driver_cloning: false,
    driver_color_convert: true,
    driver_linked_adapter_output: false,
    driver_remote_display: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverCaps {
    pub highest_acceptable_address: u64,
    pub supports_non_vga: bool,
    pub supports_smooth_rotation: bool,
    pub supports_virtual_modes: bool,
}

pub const DRIVER_CAPS: DriverCaps = DriverCaps {
    highest_acceptable_address: u64::MAX,
    supports_non_vga: true,
    supports_smooth_rotation: true,
    supports_virtual_modes: true,
};
